//! Configuration module

mod contact;
mod site;

pub use contact::{ContactSettings, API_KEY_VAR, RECEIVER_VAR};
pub use site::{ContactConfig, HighlightConfig, SiteConfig};
