//! Minimal HTML pages for the blog
//!
//! Site chrome (navigation, theming, animation) lives in the front-end; these
//! pages only carry the content so the blog works without it.

use chrono::NaiveDateTime;

use crate::config::SiteConfig;
use crate::content::{html_escape, tag_key, CompiledPost, PostSummary};

/// Human-readable date, e.g. "March 10, 2024"
pub fn display_date(date: &NaiveDateTime) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn layout(config: &SiteConfig, title: &str, description: &str, main: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<meta name="description" content="{description}">
</head>
<body>
<main>
{main}
</main>
<footer>&copy; {author}</footer>
</body>
</html>
"#,
        title = html_escape(title),
        description = html_escape(description),
        main = main,
        author = html_escape(&config.author),
    )
}

fn tag_list(tags: &[String]) -> String {
    let items: String = tags
        .iter()
        .map(|tag| {
            format!(
                r#"<a class="tag" href="/blog/tags/{}">{}</a>"#,
                percent_encoding::utf8_percent_encode(
                    &tag_key(tag),
                    percent_encoding::NON_ALPHANUMERIC
                ),
                html_escape(tag)
            )
        })
        .collect();
    format!(r#"<div class="tags">{}</div>"#, items)
}

/// Blog index: one preview per post, newest first
pub fn render_index(config: &SiteConfig, heading: &str, posts: &[&PostSummary]) -> String {
    let mut main = format!("<h1>{}</h1>\n", html_escape(heading));

    if posts.is_empty() {
        main.push_str(r#"<p class="empty">No blog posts yet. Stay tuned!</p>"#);
    }

    for post in posts {
        main.push_str(&format!(
            r#"<article class="post-preview">
<h2><a href="/blog/{slug}">{title}</a></h2>
<time datetime="{date}">{display}</time>
<p>{description}</p>
{tags}
<a href="/blog/{slug}">Read More &rarr;</a>
</article>
"#,
            slug = html_escape(&post.slug),
            title = html_escape(&post.title),
            date = html_escape(&post.date),
            display = display_date(&post.published),
            description = html_escape(&post.description),
            tags = tag_list(&post.tags),
        ));
    }

    let title = format!("{} - {}", heading, config.title);
    layout(config, &title, &config.description, &main)
}

/// A single post page
pub fn render_post(
    config: &SiteConfig,
    post: &CompiledPost,
    body_html: &str,
    newer: Option<&PostSummary>,
    older: Option<&PostSummary>,
) -> String {
    let fm = &post.front_matter;

    let mut nav = String::new();
    if let Some(newer) = newer {
        nav.push_str(&format!(
            r#"<a class="newer" href="/blog/{}">&larr; {}</a>"#,
            html_escape(&newer.slug),
            html_escape(&newer.title)
        ));
    }
    if let Some(older) = older {
        nav.push_str(&format!(
            r#"<a class="older" href="/blog/{}">{} &rarr;</a>"#,
            html_escape(&older.slug),
            html_escape(&older.title)
        ));
    }

    let main = format!(
        r#"<article class="post">
<h1>{title}</h1>
<time datetime="{date}">{display}</time> &middot; <span>{minutes} min read</span>
{tags}
<div class="post-content">
{body}
</div>
</article>
<nav class="post-nav">{nav}</nav>"#,
        title = html_escape(&fm.title),
        date = html_escape(&fm.date),
        display = display_date(&fm.published),
        minutes = post.reading_minutes,
        tags = tag_list(&fm.tags),
        body = body_html,
        nav = nav,
    );

    layout(config, &fm.title, &fm.description, &main)
}

/// Page shown for unknown or unavailable posts
pub fn render_not_found(config: &SiteConfig) -> String {
    layout(
        config,
        "Post Not Found",
        "The requested blog post could not be found.",
        r#"<h1>Post not found</h1>
<p><a href="/blog">Back to the blog</a></p>"#,
    )
}
