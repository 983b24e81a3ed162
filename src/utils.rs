//! Utility functions and helpers.

pub mod preflight;
pub mod settings;

pub use preflight::{check_ai_credentials, check_github_token};
pub use settings::{get_env_var, get_env_vars, Settings};
