//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,

    // URL
    pub url: String,

    // Directory
    pub posts_dir: String,
    pub extension: String,
    pub public_dir: String,
    pub static_dir: String,

    // Writing
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Contact form relay (secrets come from the environment, see ContactSettings)
    #[serde(default)]
    pub contact: ContactConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            description: String::new(),
            author: "Tyler Knibbs".to_string(),

            url: "http://localhost:3000".to_string(),

            posts_dir: "posts".to_string(),
            extension: "mdx".to_string(),
            public_dir: "public".to_string(),
            static_dir: "public".to_string(),

            highlight: HighlightConfig::default(),
            contact: ContactConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Host part of the site URL, used to tell internal links from external ones
    pub fn host(&self) -> Option<String> {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// Non-secret contact relay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Fixed sender identity on outbound messages
    pub sender: String,
    /// Relay API endpoint
    pub endpoint: String,
    /// Upper bound on a single relay call
    pub timeout_secs: u64,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            sender: "Portfolio Contact Form <onboarding@resend.dev>".to_string(),
            endpoint: "https://api.resend.com/emails".to_string(),
            timeout_secs: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.posts_dir, "posts");
        assert_eq!(config.extension, "mdx");
        assert_eq!(config.contact.timeout_secs, 5);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Portfolio
url: https://Example.com/
posts_dir: content/blog
extension: md
contact:
  timeout_secs: 3
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Portfolio");
        assert_eq!(config.posts_dir, "content/blog");
        assert_eq!(config.extension, "md");
        assert_eq!(config.contact.timeout_secs, 3);
        assert_eq!(
            config.contact.endpoint,
            ContactConfig::default().endpoint,
            "unset nested fields keep their defaults"
        );
        assert_eq!(config.host().as_deref(), Some("example.com"));
    }
}
