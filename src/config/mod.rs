//! Configuration for scrape runs
//!
//! This module provides the `SiteBotConfig` struct, its builder and the
//! environment loader used by the binary.

pub mod builder;
pub mod env;
pub mod getters;
pub mod types;

pub use builder::SiteBotConfigBuilder;
pub use types::{ConfigError, SiteBotConfig};
