use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State as AxumState, rejection::JsonRejection},
};
use serde::Deserialize;
use tracing::info;

use crate::{
    error::AppError,
    models::{Article, Comment},
    state::State,
};

#[derive(Deserialize)]
pub struct CommentPayload {
    username: String,
    text: String,
}

pub async fn article_handler(
    AxumState(state): AxumState<Arc<State>>,
    Path(name): Path<String>,
) -> Result<Json<Article>, AppError> {
    let article = state.store.find(&name).await?;

    found(name, article)
}

pub async fn upvote_handler(
    AxumState(state): AxumState<Arc<State>>,
    Path(name): Path<String>,
) -> Result<Json<Article>, AppError> {
    let article = state.store.upvote(&name).await?;

    #[cfg(feature = "verbose")]
    info!("Upvoted {name}");

    found(name, article)
}

pub async fn add_comment_handler(
    AxumState(state): AxumState<Arc<State>>,
    Path(name): Path<String>,
    payload: Result<Json<CommentPayload>, JsonRejection>,
) -> Result<Json<Article>, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::MalformedPayload(e.body_text()))?;

    let comment = Comment {
        username: payload.username,
        text: payload.text,
    };

    let article = state.store.add_comment(&name, comment).await?;

    #[cfg(feature = "verbose")]
    info!("Comment added to {name}");

    found(name, article)
}

fn found(name: String, article: Option<Article>) -> Result<Json<Article>, AppError> {
    article.map(Json).ok_or_else(|| {
        info!("No article named {name}");
        AppError::NotFound(name)
    })
}
