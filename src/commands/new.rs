//! Create a new post

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::Portfolio;

#[derive(Serialize)]
struct Scaffold<'a> {
    title: &'a str,
    date: String,
    description: &'a str,
    tags: &'a [String],
}

/// Scaffold a post with every required front-matter key filled in
pub fn create_post(portfolio: &Portfolio, title: &str, tags: &[String]) -> Result<PathBuf> {
    if title.trim().is_empty() {
        anyhow::bail!("Title must not be empty");
    }

    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from title: {:?}", title);
    }

    fs::create_dir_all(&portfolio.posts_dir)?;
    let file_path = portfolio
        .posts_dir
        .join(format!("{}.{}", slug, portfolio.config.extension));

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let scaffold = Scaffold {
        title,
        date: chrono::Local::now().format("%Y-%m-%d").to_string(),
        description: "",
        tags,
    };
    let front_matter = serde_yaml::to_string(&scaffold)?;
    let content = format!("---\n{}---\n\n", front_matter);

    fs::write(&file_path, content)?;
    println!("Created: {:?}", file_path);

    Ok(file_path)
}
