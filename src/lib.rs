//! portfolio-rs: content pipeline and contact relay for a personal portfolio
//!
//! Blog posts are MDX-style documents with YAML front matter. They are listed
//! newest first, compiled into a render tree on request and served over HTTP
//! together with a contact form endpoint that relays submissions by email.

pub mod commands;
pub mod config;
pub mod contact;
pub mod content;
pub mod error;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// The main portfolio application
#[derive(Clone)]
pub struct Portfolio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory holding the post documents
    pub posts_dir: PathBuf,
    /// Public (output and static) directory
    pub public_dir: PathBuf,
}

impl Portfolio {
    /// Create a new instance from a directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let posts_dir = base_dir.join(&config.posts_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            posts_dir,
            public_dir,
        })
    }

    /// Content pipeline for this site
    pub fn blog(&self) -> content::Blog {
        content::Blog::new(&self.config, &self.base_dir)
    }

    /// Body renderer configured from `highlight`
    pub fn renderer(&self) -> content::HtmlRenderer {
        content::HtmlRenderer::with_options(&self.config.highlight)
    }

    /// Contact service configured from the environment
    pub fn contact_service(&self) -> contact::ContactService {
        let settings = config::ContactSettings::from_env(&self.config.contact);
        contact::ContactService::from_settings(&settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_config_file() {
        let dir = TempDir::new().unwrap();
        let site = Portfolio::new(dir.path()).unwrap();
        assert_eq!(site.posts_dir, dir.path().join("posts"));
        assert_eq!(site.public_dir, dir.path().join("public"));
    }

    #[test]
    fn test_reads_config_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("_config.yml"),
            "title: My Site\nposts_dir: content/blog\n",
        )
        .unwrap();
        let site = Portfolio::new(dir.path()).unwrap();
        assert_eq!(site.config.title, "My Site");
        assert_eq!(site.posts_dir, dir.path().join("content/blog"));
    }

    #[test]
    fn test_broken_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("_config.yml"), "title: [unclosed\n").unwrap();
        assert!(Portfolio::new(dir.path()).is_err());
    }
}
