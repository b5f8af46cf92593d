//! # Seeding
//!
//! Articles are never created through the API. This tool writes them straight into the
//! store so the server has something to serve.
//!
//! ## Commands
//!
//! Seed the default articles, resetting their votes and comments.
//! ```sh
//! blog-seed seed
//! ```
//!
//! Seed specific articles.
//! ```sh
//! blog-seed seed learn-rust learn-axum
//! ```
//!
//! Show what is stored.
//! ```sh
//! blog-seed list
//! ```
//!
//! Remove everything that was seeded.
//! ```sh
//! blog-seed reset
//! ```
use blog_server::{database::RedisStore, error::DbError, models::Article};
use tracing::debug;

pub const DEFAULT_ARTICLES: [&str; 3] = ["learn-react", "learn-node", "my-thoughts-on-resumes"];

/// Names to seed, falling back to [`DEFAULT_ARTICLES`] when none are given.
pub fn article_names(requested: Vec<String>) -> Vec<String> {
    if requested.is_empty() {
        DEFAULT_ARTICLES.iter().map(|name| name.to_string()).collect()
    } else {
        let mut names = Vec::with_capacity(requested.len());
        for name in requested {
            let name = name.trim().to_string();
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

pub async fn seed_articles(store: &RedisStore, names: &[String]) -> Result<(), DbError> {
    for name in names {
        debug!("Seeding {name}");
        store.seed(&Article::new(name.as_str())).await?;
        println!("Seeded {name}");
    }

    println!("\nTotal Seeded: {}", names.len());

    Ok(())
}

pub async fn list_articles(store: &RedisStore) -> Result<(), DbError> {
    let articles = store.list().await?;

    if articles.is_empty() {
        println!("No articles seeded.");
        return Ok(());
    }

    for article in &articles {
        let pretty = serde_json::to_string_pretty(article)
            .map_err(|e| DbError::malformed(&article.name, e.to_string()))?;
        println!("{pretty}");
    }

    println!("\nTotal Articles: {}", articles.len());

    Ok(())
}

pub async fn reset_articles(store: &RedisStore) -> Result<(), DbError> {
    let removed = store.reset().await?;
    println!("Removed Articles: {removed}");

    Ok(())
}
