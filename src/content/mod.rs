//! Content module - the blog's content pipeline
//!
//! Documents are discovered in the [`ContentStore`], split by the
//! front-matter parser, checked by the validator and then either summarized
//! for listings or compiled into a [`RenderTree`] for a single post view.

mod compile;
mod frontmatter;
mod listing;
mod render;
mod store;
mod validate;

use serde::Serialize;

use crate::config::SiteConfig;
use crate::error::PostError;

pub use compile::{
    classify_link, placeholder_data_uri, Align, BodyCompiler, LinkKind, Node, NodeRules,
    RenderTree, SiteRules,
};
pub use frontmatter::{decode_metadata, parse, Metadata};
pub use listing::{
    build_sorted_summaries, by_tag, load_front_matter, neighbours, sort_summaries, tag_index,
    tag_key, PostSummary, TagCount,
};
pub use render::{html_escape, HtmlRenderer};
pub use store::ContentStore;
pub use validate::{parse_date_string, validate, FrontMatter, RESERVED_KEYS};

/// Average adult reading speed used for the reading-time estimate
const WORDS_PER_MINUTE: usize = 200;

/// A single post, ready to render
#[derive(Debug, Clone, Serialize)]
pub struct CompiledPost {
    pub slug: String,
    #[serde(rename = "frontmatter")]
    pub front_matter: FrontMatter,
    #[serde(rename = "content")]
    pub body: RenderTree,
    pub reading_minutes: usize,
}

/// Entry point to the content pipeline for one site
pub struct Blog {
    store: ContentStore,
    compiler: BodyCompiler<SiteRules>,
}

impl Blog {
    /// Build the pipeline for a site rooted at `base_dir`
    pub fn new(config: &SiteConfig, base_dir: &std::path::Path) -> Self {
        let store = ContentStore::new(base_dir.join(&config.posts_dir), &config.extension);
        let rules = SiteRules::new(config.host(), Some(base_dir.join(&config.static_dir)));
        Self {
            store,
            compiler: BodyCompiler::with_rules(rules),
        }
    }

    /// Pipeline over an explicit store and rules
    pub fn with_store(store: ContentStore, rules: SiteRules) -> Self {
        Self {
            store,
            compiler: BodyCompiler::with_rules(rules),
        }
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Every publishable post, newest first
    pub fn summaries(&self) -> Vec<PostSummary> {
        build_sorted_summaries(&self.store)
    }

    /// Load and compile one post
    pub fn post(&self, slug: &str) -> Result<CompiledPost, PostError> {
        let (front_matter, body) = load_front_matter(&self.store, slug)?;
        let tree = self.compiler.compile(&body)?;
        let reading_minutes = tree.word_count().div_ceil(WORDS_PER_MINUTE).max(1);

        Ok(CompiledPost {
            slug: slug.to_string(),
            front_matter,
            body: tree,
            reading_minutes,
        })
    }

    /// Like [`Blog::post`], but collapses every failure into "unavailable".
    ///
    /// The specific reason is logged; readers only ever see a missing post.
    pub fn find_post(&self, slug: &str) -> Option<CompiledPost> {
        match self.post(slug) {
            Ok(post) => Some(post),
            Err(e) if e.is_not_found() => {
                tracing::debug!("Post {:?} not found", slug);
                None
            }
            Err(e) => {
                tracing::warn!("Post {:?} is unavailable: {}", slug, e);
                None
            }
        }
    }
}
