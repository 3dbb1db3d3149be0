use serde::{Deserialize, Serialize};

use crate::PageError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

/// Explicit placement of NULL values. `None` on an [`OrderKey`] leaves it to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullsOrder {
    First,
    Last,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderKey {
    pub field: String,
    pub dir: SortDir,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nulls: Option<NullsOrder>,
}

impl OrderKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            dir: SortDir::Asc,
            nulls: None,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            dir: SortDir::Desc,
            nulls: None,
        }
    }

    #[must_use]
    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(NullsOrder::Last);
        self
    }

    #[must_use]
    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(NullsOrder::First);
        self
    }

    fn to_signed_token(&self) -> String {
        let sign = match self.dir {
            SortDir::Asc => '+',
            SortDir::Desc => '-',
        };
        match self.nulls {
            Some(NullsOrder::First) => format!("{sign}{} nulls first", self.field),
            Some(NullsOrder::Last) => format!("{sign}{} nulls last", self.field),
            None => format!("{sign}{}", self.field),
        }
    }
}

/// Ordered list of sort keys; the first key is the primary one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec(pub Vec<OrderKey>);

impl SortSpec {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> &[OrderKey] {
        &self.0
    }

    #[must_use]
    pub fn then(mut self, key: OrderKey) -> Self {
        self.0.push(key);
        self
    }

    /// Append `field` as the last key unless some key already sorts on it.
    #[must_use]
    pub fn ensure_tiebreaker(mut self, field: &str, dir: SortDir) -> Self {
        if !self.0.iter().any(|k| k.field.eq_ignore_ascii_case(field)) {
            self.0.push(OrderKey {
                field: field.to_string(),
                dir,
                nulls: None,
            });
        }
        self
    }

    /// Render as `"-age,+username nulls last"`.
    pub fn to_signed_tokens(&self) -> String {
        self.0
            .iter()
            .map(OrderKey::to_signed_token)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Parse the format produced by [`SortSpec::to_signed_tokens`].
    ///
    /// A missing sign means ascending. Field names are only checked for
    /// emptiness here; whether they exist is decided by the store layer.
    pub fn from_signed_tokens(s: &str) -> Result<Self, PageError> {
        let mut keys = Vec::new();
        for raw in s.split(',') {
            let token = raw.trim();
            if token.is_empty() {
                continue;
            }

            let mut parts = token.split_whitespace();
            let head = parts.next().unwrap_or_default();
            let (dir, field) = match head.as_bytes().first() {
                Some(b'+') => (SortDir::Asc, &head[1..]),
                Some(b'-') => (SortDir::Desc, &head[1..]),
                _ => (SortDir::Asc, head),
            };
            if field.is_empty() {
                return Err(PageError::InvalidSort(token.to_string()));
            }

            let rest: Vec<String> = parts.map(str::to_ascii_lowercase).collect();
            let nulls = match rest.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
                [] => None,
                ["nulls", "first"] => Some(NullsOrder::First),
                ["nulls", "last"] => Some(NullsOrder::Last),
                _ => return Err(PageError::InvalidSort(token.to_string())),
            };

            keys.push(OrderKey {
                field: field.to_string(),
                dir,
                nulls,
            });
        }
        Ok(Self(keys))
    }
}

impl From<Vec<OrderKey>> for SortSpec {
    fn from(keys: Vec<OrderKey>) -> Self {
        Self(keys)
    }
}

impl FromIterator<OrderKey> for SortSpec {
    fn from_iter<I: IntoIterator<Item = OrderKey>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
