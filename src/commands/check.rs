//! Report documents that would not be published or would not compile

use anyhow::Result;

use crate::content::Blog;
use crate::error::PostError;
use crate::Portfolio;

/// Every document under the posts directory that fails to load or compile
pub fn find_problems(blog: &Blog) -> Vec<(String, PostError)> {
    blog.store()
        .list_identifiers()
        .into_iter()
        .filter_map(|slug| match blog.post(&slug) {
            Ok(_) => None,
            Err(e) => Some((slug, e)),
        })
        .collect()
}

/// Run the check command
pub fn run(portfolio: &Portfolio) -> Result<()> {
    let blog = portfolio.blog();
    let total = blog.store().list_identifiers().len();
    let problems = find_problems(&blog);

    for (slug, error) in &problems {
        println!("  {} - {}", slug, error);
    }

    if !problems.is_empty() {
        anyhow::bail!("{} of {} documents have problems", problems.len(), total);
    }

    println!("All {} documents are valid.", total);
    Ok(())
}
