//! Post listings: sorted summaries, tag index and neighbours

use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use super::frontmatter::{decode_metadata, parse};
use super::store::ContentStore;
use super::validate::{validate, FrontMatter};
use crate::error::PostError;

/// What an index view needs to know about a post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(skip)]
    pub published: NaiveDateTime,
}

impl PostSummary {
    pub fn new(slug: &str, fm: &FrontMatter) -> Self {
        Self {
            slug: slug.to_string(),
            title: fm.title.clone(),
            date: fm.date.clone(),
            description: fm.description.clone(),
            tags: fm.tags.clone(),
            published: fm.published,
        }
    }

    /// Case-insensitive tag membership
    pub fn has_tag(&self, tag: &str) -> bool {
        let key = tag_key(tag);
        self.tags.iter().any(|t| tag_key(t) == key)
    }
}

/// Normalised form of a tag; spellings that differ only in case share it.
///
/// Used wherever a tag becomes part of a URL or a path.
pub fn tag_key(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// A tag and the number of posts carrying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub name: String,
    pub count: usize,
}

/// Read, parse and validate the front-matter of one document
pub fn load_front_matter(
    store: &ContentStore,
    slug: &str,
) -> Result<(FrontMatter, String), PostError> {
    let raw = store.read_raw(slug)?;
    let (block, body) = parse(&raw);
    let metadata = decode_metadata(block.unwrap_or_default())?;
    let fm = validate(&metadata)?;
    Ok((fm, body.to_string()))
}

/// Summaries of every publishable post, newest first.
///
/// Documents that cannot be read or fail validation are logged and left out.
pub fn build_sorted_summaries(store: &ContentStore) -> Vec<PostSummary> {
    let mut summaries: Vec<PostSummary> = store
        .list_identifiers()
        .into_iter()
        .filter_map(|slug| match load_front_matter(store, &slug) {
            Ok((fm, _)) => Some(PostSummary::new(&slug, &fm)),
            Err(PostError::Invalid(e)) => {
                tracing::warn!("Post {:?} is missing required front-matter: {}", slug, e);
                None
            }
            Err(e) => {
                tracing::error!("Error reading or parsing post {:?}: {}", slug, e);
                None
            }
        })
        .collect();

    sort_summaries(&mut summaries);
    summaries
}

/// Newest first; posts published at the same moment are ordered by slug
pub fn sort_summaries(summaries: &mut [PostSummary]) {
    summaries.sort_by(newest_first);
}

fn newest_first(a: &PostSummary, b: &PostSummary) -> Ordering {
    b.published
        .cmp(&a.published)
        .then_with(|| a.slug.cmp(&b.slug))
}

/// Tags with post counts, most used first then alphabetical
pub fn tag_index(summaries: &[PostSummary]) -> Vec<TagCount> {
    let mut counts: HashMap<String, (String, usize)> = HashMap::new();
    for summary in summaries {
        for tag in &summary.tags {
            let entry = counts
                .entry(tag_key(tag))
                .or_insert_with(|| (tag.clone(), 0));
            entry.1 += 1;
        }
    }

    let mut tags: Vec<TagCount> = counts
        .into_values()
        .map(|(name, count)| TagCount { name, count })
        .collect();
    tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    tags
}

/// Posts carrying a tag, keeping listing order
pub fn by_tag<'a>(summaries: &'a [PostSummary], tag: &str) -> Vec<&'a PostSummary> {
    summaries.iter().filter(|s| s.has_tag(tag)).collect()
}

/// The newer and older posts around `slug` in a sorted listing
pub fn neighbours<'a>(
    summaries: &'a [PostSummary],
    slug: &str,
) -> (Option<&'a PostSummary>, Option<&'a PostSummary>) {
    let Some(pos) = summaries.iter().position(|s| s.slug == slug) else {
        return (None, None);
    };
    let newer = pos.checked_sub(1).and_then(|i| summaries.get(i));
    let older = summaries.get(pos + 1);
    (newer, older)
}
