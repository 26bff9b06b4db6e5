//! List site content

use anyhow::Result;

use crate::content::tag_index;
use crate::Portfolio;

/// List site content by type
pub fn run(portfolio: &Portfolio, content_type: &str) -> Result<()> {
    let summaries = portfolio.blog().summaries();

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", summaries.len());
            for post in &summaries {
                println!(
                    "  {} - {} [{}]",
                    post.published.format("%Y-%m-%d"),
                    post.title,
                    post.slug
                );
            }
        }
        "tag" | "tags" => {
            let tags = tag_index(&summaries);
            println!("Tags ({}):", tags.len());
            for tag in tags {
                println!("  {} ({})", tag.name, tag.count);
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, tag", content_type);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unknown_type_is_an_error() {
        let dir = TempDir::new().unwrap();
        let site = Portfolio::new(dir.path()).unwrap();
        assert!(run(&site, "post").is_ok());
        assert!(run(&site, "tags").is_ok());
        assert!(run(&site, "category").is_err());
    }
}
