// === PUBLIC CONTRACT ===
// Only the contract module should be public for other modules to consume
pub mod contract;

// Re-export the public contract components
pub use contract::{client, error, model};

pub mod config;
pub use config::MembersConfig;

// === INTERNAL MODULES ===
// Exposed for wiring in binaries and for integration tests; other modules
// should go through `contract`.
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;
