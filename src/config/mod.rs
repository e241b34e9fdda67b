//! Configuration module for gitpulse
//!
//! This module handles:
//! - Walk limits for the analyzers
//! - Terminal UI settings (tick rate, colors)

mod user_config;

pub use user_config::{
    UiConfig, UserConfig, ENV_AHEAD_LIMIT, ENV_HISTORY_LIMIT, ENV_SHARED_LIMIT,
};
