//! # Articles
//!
//! The only persisted entity. Articles are seeded out-of-band and the API only
//! ever touches `upvotes` and `comments`.
//!
//! ## Storage Layout
//!
//! - Hash `<db>:articles:<name>` holding `name` and `upvotes`
//! - List `<db>:comments:<name>` holding one JSON encoded [`Comment`] per entry, oldest first
//! - Set `<db>:articles` holding every seeded name
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::DbError;

pub const ARTICLE_NAME: &str = "name";
pub const ARTICLE_UPVOTES: &str = "upvotes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub name: String,
    pub upvotes: u64,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub username: String,
    pub text: String,
}

impl Article {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            upvotes: 0,
            comments: Vec::new(),
        }
    }

    /// Rebuilds an article from its hash fields and raw comment entries.
    ///
    /// An empty hash means the article was never seeded.
    pub fn from_stored(
        key_name: &str,
        fields: HashMap<String, String>,
        raw_comments: Vec<String>,
    ) -> Result<Option<Self>, DbError> {
        if fields.is_empty() {
            return Ok(None);
        }

        let name = fields
            .get(ARTICLE_NAME)
            .cloned()
            .unwrap_or_else(|| key_name.to_string());

        let upvotes = match fields.get(ARTICLE_UPVOTES) {
            Some(raw) => raw
                .parse()
                .map_err(|e| DbError::malformed(key_name, format!("upvotes {raw:?}: {e}")))?,
            None => 0,
        };

        let comments = raw_comments
            .iter()
            .map(|raw| serde_json::from_str(raw))
            .collect::<Result<Vec<Comment>, _>>()
            .map_err(|e| DbError::malformed(key_name, format!("comment: {e}")))?;

        Ok(Some(Self {
            name,
            upvotes,
            comments,
        }))
    }
}
