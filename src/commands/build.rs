//! Static export of the blog

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::Path;

use crate::content::{by_tag, neighbours, tag_index, tag_key};
use crate::templates;
use crate::Portfolio;

/// What a build produced
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildStats {
    pub posts: usize,
    pub skipped: usize,
    pub tags: usize,
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))
}

/// A tag can become a directory name as-is
fn is_safe_dir_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && !name.chars().any(|c| c.is_control())
}

/// Write the blog index, one page per post, tag pages and `api/posts.json`
pub fn run(portfolio: &Portfolio) -> Result<BuildStats> {
    let start = std::time::Instant::now();

    let blog = portfolio.blog();
    let renderer = portfolio.renderer();
    let config = &portfolio.config;
    let out = &portfolio.public_dir;

    let summaries = blog.summaries();
    tracing::info!("Loaded {} posts", summaries.len());

    let refs: Vec<_> = summaries.iter().collect();
    write_file(
        &out.join("blog").join("index.html"),
        &templates::render_index(config, "Blog Posts", &refs),
    )?;
    write_file(
        &out.join("api").join("posts.json"),
        &serde_json::to_string_pretty(&summaries)?,
    )?;

    let written: Vec<bool> = summaries
        .par_iter()
        .map(|summary| -> Result<bool> {
            let Some(post) = blog.find_post(&summary.slug) else {
                return Ok(false);
            };
            let (newer, older) = neighbours(&summaries, &summary.slug);
            let body = renderer.render(&post.body);
            let page = templates::render_post(config, &post, &body, newer, older);
            write_file(
                &out.join("blog").join(&summary.slug).join("index.html"),
                &page,
            )?;
            Ok(true)
        })
        .collect::<Result<_>>()?;

    let mut tags = 0;
    for tag in tag_index(&summaries) {
        // Page links use the same key, see templates::tag_list
        let key = tag_key(&tag.name);
        if !is_safe_dir_name(&key) {
            tracing::warn!("Skipping tag page for {:?}", tag.name);
            continue;
        }
        let posts = by_tag(&summaries, &tag.name);
        let heading = format!("Posts tagged \"{}\"", tag.name);
        write_file(
            &out.join("blog").join("tags").join(&key).join("index.html"),
            &templates::render_index(config, &heading, &posts),
        )?;
        tags += 1;
    }

    let stats = BuildStats {
        posts: written.iter().filter(|w| **w).count(),
        skipped: written.iter().filter(|w| !**w).count(),
        tags,
    };

    tracing::info!(
        "Built {} posts ({} skipped) in {:.2}s",
        stats.posts,
        stats.skipped,
        start.elapsed().as_secs_f64()
    );

    Ok(stats)
}
