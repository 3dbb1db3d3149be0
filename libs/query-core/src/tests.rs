#[cfg(test)]
#[allow(clippy::module_inception)]
mod tests {
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::{
        assemble_page, inferred_total, CountStrategy, NullsOrder, OrderKey, Page, PageError,
        PageRequest, SortDir, SortSpec,
    };

    fn request(page_index: i64, page_size: i64) -> PageRequest {
        PageRequest::new(page_index, page_size).expect("valid request")
    }

    #[test]
    fn test_page_request_offset_and_limit() {
        let req = request(1, 2);
        assert_eq!(req.offset(), 2);
        assert_eq!(req.limit(), 2);
        assert!(req.sort().is_empty());
    }

    #[test]
    fn test_page_request_rejects_negative_values() {
        assert_eq!(
            PageRequest::new(-1, 10),
            Err(PageError::InvalidPageRequest {
                page_index: -1,
                page_size: 10
            })
        );
        assert!(matches!(
            PageRequest::new(0, -5),
            Err(PageError::InvalidPageRequest { .. })
        ));
    }

    #[test]
    fn test_page_request_rejects_offset_overflow() {
        assert!(matches!(
            PageRequest::new(i64::MAX, 2),
            Err(PageError::InvalidPageRequest { .. })
        ));
    }

    #[test]
    fn test_page_request_deserialize_validates() {
        let req: PageRequest = serde_json::from_str(
            r#"{"page_index": 2, "page_size": 5, "sort": [{"field": "age", "dir": "desc"}]}"#,
        )
        .unwrap();
        assert_eq!(req.offset(), 10);
        assert_eq!(req.sort().to_signed_tokens(), "-age");

        let overflow = serde_json::from_str::<PageRequest>(
            r#"{"page_index": 9223372036854775807, "page_size": 10}"#,
        )
        .unwrap_err();
        assert!(overflow.to_string().contains("invalid page request"), "{overflow}");

        assert!(serde_json::from_str::<PageRequest>(r#"{"page_index": -1, "page_size": 10}"#).is_err());
        assert!(serde_json::from_str::<PageRequest>(r#"{"page_index": 0, "page_size": -3}"#).is_err());
    }

    #[test]
    fn test_page_offset_saturates() {
        let page = Page::<u8> {
            content: Vec::new(),
            total: 0,
            page_index: u64::MAX,
            page_size: 10,
        };
        assert_eq!(page.offset(), u64::MAX);
        assert!(!page.has_next());
    }

    #[test]
    fn test_page_request_zero_size_is_legal() {
        let req = request(3, 0);
        assert_eq!(req.offset(), 0);
        assert_eq!(req.limit(), 0);
    }

    #[test]
    fn test_page_request_max_size() {
        assert!(request(0, 100).check_max_size(100).is_ok());
        assert!(matches!(
            request(0, 101).check_max_size(100),
            Err(PageError::InvalidPageRequest {
                page_index: 0,
                page_size: 101
            })
        ));
    }

    #[test]
    fn test_page_metadata() {
        let page = Page::new(vec!["b", "c"], &request(1, 2), 5);
        assert_eq!(page.offset(), 2);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        assert!(page.has_previous());
        assert!(!page.is_first());
        assert!(!page.is_last());

        let last = Page::new(vec!["e"], &request(2, 2), 5);
        assert!(last.is_last());
        assert!(!last.has_next());
    }

    #[test]
    fn test_page_map_content_keeps_metadata() {
        let page = Page::new(vec![1, 2], &request(0, 2), 7).map_content(|n| n * 10);
        assert_eq!(page.content, vec![10, 20]);
        assert_eq!(page.total, 7);
        assert_eq!(page.page_size, 2);
    }

    #[test]
    fn test_inferred_total_rules() {
        // short first page
        assert_eq!(inferred_total(0, 10, 3), Some(3));
        // short page further in
        assert_eq!(inferred_total(20, 10, 4), Some(24));
        // full page proves nothing
        assert_eq!(inferred_total(0, 10, 10), None);
        // empty page past the end proves nothing
        assert_eq!(inferred_total(40, 10, 0), None);
        // empty first page: nothing matched at all
        assert_eq!(inferred_total(0, 10, 0), Some(0));
        // zero limit never infers
        assert_eq!(inferred_total(0, 0, 0), None);
    }

    #[tokio::test]
    async fn test_assemble_page_skips_supplier_on_short_page() {
        let calls = AtomicUsize::new(0);
        let req = request(1, 10);

        let page = assemble_page(vec!["x", "y", "z"], &req, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Infallible>(999)
        })
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(page.total, 13);
        assert_eq!(page.content.len(), 3);
    }

    #[tokio::test]
    async fn test_assemble_page_invokes_supplier_once_on_full_page() {
        let calls = AtomicUsize::new(0);
        let req = request(1, 2);

        let page = assemble_page(vec![2, 3], &req, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Infallible>(4)
        })
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(page.total, 4);
        assert_eq!(page.content, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_assemble_page_propagates_supplier_error() {
        let req = request(0, 1);
        let result = assemble_page(vec![1], &req, || async { Err::<u64, _>("count failed") }).await;
        assert_eq!(result, Err("count failed"));
    }

    #[test]
    fn test_sort_tokens_round_trip() {
        let spec = SortSpec::empty()
            .then(OrderKey::desc("age"))
            .then(OrderKey::asc("username").nulls_last());
        let tokens = spec.to_signed_tokens();
        assert_eq!(tokens, "-age,+username nulls last");
        assert_eq!(SortSpec::from_signed_tokens(&tokens).unwrap(), spec);
    }

    #[test]
    fn test_sort_tokens_parsing() {
        let spec = SortSpec::from_signed_tokens(" username , -id NULLS FIRST ").unwrap();
        assert_eq!(spec.keys().len(), 2);
        assert_eq!(spec.keys()[0].dir, SortDir::Asc);
        assert_eq!(spec.keys()[1].field, "id");
        assert_eq!(spec.keys()[1].dir, SortDir::Desc);
        assert_eq!(spec.keys()[1].nulls, Some(NullsOrder::First));

        assert!(SortSpec::from_signed_tokens("").unwrap().is_empty());
        assert!(matches!(
            SortSpec::from_signed_tokens("+"),
            Err(PageError::InvalidSort(_))
        ));
        assert!(matches!(
            SortSpec::from_signed_tokens("age nulls middle"),
            Err(PageError::InvalidSort(_))
        ));
    }

    #[test]
    fn test_ensure_tiebreaker() {
        let spec = SortSpec::from(vec![OrderKey::desc("age")]).ensure_tiebreaker("id", SortDir::Asc);
        assert_eq!(spec.to_signed_tokens(), "-age,+id");

        let already = SortSpec::from(vec![OrderKey::desc("ID")]).ensure_tiebreaker("id", SortDir::Asc);
        assert_eq!(already.keys().len(), 1);
    }

    #[test]
    fn test_count_strategy_serde() {
        let s: CountStrategy = serde_json::from_str("\"combined\"").unwrap();
        assert_eq!(s, CountStrategy::Combined);
        assert_eq!(CountStrategy::default(), CountStrategy::Separate);
    }
}
