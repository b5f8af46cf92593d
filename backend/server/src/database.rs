//! # Redis
//!
//! Document store for articles.
//!
//! ## Requirements
//!
//! - Lookup by exact article name
//! - Upvotes and comments must never be lost to concurrent requests
//! - Requests for an article that was never seeded must not create one
//!
//! ## Implementation
//!
//! - One hash per article plus one list per article for comments, see [`crate::models`]
//! - Reads are a `MULTI` pipeline so the counter and comment list come from the same instant
//! - Mutations are Lua scripts: existence check and `HINCRBY`/`RPUSH` run as one atomic unit
//! - One multiplexed connection per request, acquired and released by [`RedisStore::with_db`]
use std::{collections::HashMap, future::Future, time::Duration};

use async_trait::async_trait;
use redis::{Client, Script, aio::MultiplexedConnection};
use tokio::time::timeout;
use tracing::debug;

use crate::{
    config::Config,
    error::DbError,
    models::{ARTICLE_NAME, ARTICLE_UPVOTES, Article, Comment},
    utils::{article_key, comments_key, index_key},
};

const UPVOTE_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return 0
end
redis.call('HINCRBY', KEYS[1], ARGV[1], 1)
return 1
"#;

const ADD_COMMENT_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return 0
end
redis.call('RPUSH', KEYS[2], ARGV[1])
return 1
"#;

/// Article persistence used by the route handlers.
///
/// Every operation yields `Ok(None)` when no article with that name exists.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn find(&self, name: &str) -> Result<Option<Article>, DbError>;

    /// Adds one upvote and returns the article as stored afterwards.
    async fn upvote(&self, name: &str) -> Result<Option<Article>, DbError>;

    /// Appends a comment and returns the article as stored afterwards.
    async fn add_comment(&self, name: &str, comment: Comment) -> Result<Option<Article>, DbError>;
}

pub struct RedisStore {
    client: Client,
    address: String,
    db_name: String,
    connect_timeout: Duration,
    upvote_script: Script,
    add_comment_script: Script,
}

impl RedisStore {
    /// Validates the address without connecting; connections are made per call.
    pub fn open(address: &str, db_name: &str, connect_timeout: Duration) -> Result<Self, DbError> {
        Ok(Self {
            client: Client::open(address)?,
            address: address.to_string(),
            db_name: db_name.to_string(),
            connect_timeout,
            upvote_script: Script::new(UPVOTE_SCRIPT),
            add_comment_script: Script::new(ADD_COMMENT_SCRIPT),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, DbError> {
        Self::open(
            &config.db_address,
            &config.db_name,
            config.db_connect_timeout,
        )
    }

    /// Runs `operations` against a freshly acquired connection.
    ///
    /// The connection is moved into the operation and dropped with it, on success or failure.
    pub async fn with_db<T, F, Fut>(&self, operations: F) -> Result<T, DbError>
    where
        F: FnOnce(MultiplexedConnection) -> Fut,
        Fut: Future<Output = Result<T, DbError>>,
    {
        let connection = timeout(
            self.connect_timeout,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| DbError::ConnectTimeout {
            address: self.address.clone(),
            timeout_ms: self.connect_timeout.as_millis(),
        })??;

        debug!("Connected to {}", self.address);

        operations(connection).await
    }

    async fn read(
        &self,
        connection: &mut MultiplexedConnection,
        name: &str,
    ) -> Result<Option<Article>, DbError> {
        let (fields, raw_comments): (HashMap<String, String>, Vec<String>) = redis::pipe()
            .atomic()
            .hgetall(article_key(&self.db_name, name))
            .lrange(comments_key(&self.db_name, name), 0, -1)
            .query_async(connection)
            .await?;

        Article::from_stored(name, fields, raw_comments)
    }

    /// Writes `article` as a whole, replacing any previous counter and comments.
    pub async fn seed(&self, article: &Article) -> Result<(), DbError> {
        let raw_comments = article
            .comments
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<String>, _>>()
            .map_err(|e| DbError::malformed(&article.name, e.to_string()))?;

        self.with_db(|mut connection| async move {
            let hash_key = article_key(&self.db_name, &article.name);
            let list_key = comments_key(&self.db_name, &article.name);

            let mut pipe = redis::pipe();
            pipe.atomic()
                .del(&hash_key)
                .ignore()
                .del(&list_key)
                .ignore()
                .hset_multiple(
                    &hash_key,
                    &[
                        (ARTICLE_NAME, article.name.clone()),
                        (ARTICLE_UPVOTES, article.upvotes.to_string()),
                    ],
                )
                .ignore()
                .sadd(index_key(&self.db_name), &article.name)
                .ignore();

            if !raw_comments.is_empty() {
                pipe.rpush(&list_key, raw_comments).ignore();
            }

            let () = pipe.query_async(&mut connection).await?;

            Ok(())
        })
        .await
    }

    /// Every seeded article, sorted by name.
    pub async fn list(&self) -> Result<Vec<Article>, DbError> {
        self.with_db(|mut connection| async move {
            let mut names: Vec<String> = redis::cmd("SMEMBERS")
                .arg(index_key(&self.db_name))
                .query_async(&mut connection)
                .await?;
            names.sort();

            let mut articles = Vec::with_capacity(names.len());
            for name in names {
                if let Some(article) = self.read(&mut connection, &name).await? {
                    articles.push(article);
                }
            }

            Ok(articles)
        })
        .await
    }

    /// Removes every seeded article and returns how many were removed.
    pub async fn reset(&self) -> Result<usize, DbError> {
        self.with_db(|mut connection| async move {
            let names: Vec<String> = redis::cmd("SMEMBERS")
                .arg(index_key(&self.db_name))
                .query_async(&mut connection)
                .await?;

            let mut pipe = redis::pipe();
            pipe.atomic();
            for name in &names {
                pipe.del(article_key(&self.db_name, name))
                    .ignore()
                    .del(comments_key(&self.db_name, name))
                    .ignore();
            }
            pipe.del(index_key(&self.db_name)).ignore();
            let () = pipe.query_async(&mut connection).await?;

            Ok(names.len())
        })
        .await
    }
}

#[async_trait]
impl ArticleStore for RedisStore {
    async fn find(&self, name: &str) -> Result<Option<Article>, DbError> {
        self.with_db(|mut connection| async move { self.read(&mut connection, name).await })
            .await
    }

    async fn upvote(&self, name: &str) -> Result<Option<Article>, DbError> {
        self.with_db(|mut connection| async move {
            let applied: i64 = self
                .upvote_script
                .key(article_key(&self.db_name, name))
                .arg(ARTICLE_UPVOTES)
                .invoke_async(&mut connection)
                .await?;

            if applied == 0 {
                return Ok(None);
            }

            self.read(&mut connection, name).await
        })
        .await
    }

    async fn add_comment(&self, name: &str, comment: Comment) -> Result<Option<Article>, DbError> {
        let raw_comment =
            serde_json::to_string(&comment).map_err(|e| DbError::malformed(name, e.to_string()))?;

        self.with_db(|mut connection| async move {
            let applied: i64 = self
                .add_comment_script
                .key(article_key(&self.db_name, name))
                .key(comments_key(&self.db_name, name))
                .arg(raw_comment)
                .invoke_async(&mut connection)
                .await?;

            if applied == 0 {
                return Ok(None);
            }

            self.read(&mut connection, name).await
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_address() {
        let result = RedisStore::open("not a url", "my-blog", Duration::from_millis(100));
        assert!(matches!(result, Err(DbError::Redis(_))));
    }

    #[tokio::test]
    async fn test_unreachable_store_fails_every_call() {
        // nothing listens on port 1
        let store = RedisStore::open("redis://127.0.0.1:1", "my-blog", Duration::from_millis(500))
            .unwrap();

        assert!(store.find("learn-react").await.is_err());
        assert!(store.upvote("learn-react").await.is_err());
        assert!(
            store
                .add_comment(
                    "learn-react",
                    Comment {
                        username: "alice".to_string(),
                        text: "hi".to_string(),
                    },
                )
                .await
                .is_err()
        );
    }
}
