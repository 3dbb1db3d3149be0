use query_core::CountStrategy;
use serde::{Deserialize, Serialize};

use crate::domain::service::ServiceConfig;

/// Configuration for the members module (`modules.members` in the app config)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MembersConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
    #[serde(default)]
    pub count_strategy: CountStrategy,
}

impl Default for MembersConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            count_strategy: CountStrategy::default(),
        }
    }
}

fn default_page_size() -> u64 {
    20
}

fn default_max_page_size() -> u64 {
    1000
}

impl From<MembersConfig> for ServiceConfig {
    fn from(cfg: MembersConfig) -> Self {
        Self {
            default_page_size: cfg.default_page_size,
            max_page_size: cfg.max_page_size,
            count_strategy: cfg.count_strategy,
        }
    }
}
