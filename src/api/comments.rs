//! Comment API endpoints.

use axum::extract::{Path, State};

use super::{created, success, ApiJson, ApiQuery, ApiResult};
use crate::errors::AppError;
use crate::models::{Comment, CommentQuery, CreateCommentRequest};
use crate::AppState;

/// GET /api/comentarios?game= - List comments for a game, oldest first.
pub async fn list_comments(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CommentQuery>,
) -> ApiResult<Vec<Comment>> {
    let Some(game) = query.game.as_deref().map(str::trim).filter(|g| !g.is_empty()) else {
        return Err(AppError::invalid_field("game", "game is required"));
    };

    success(state.repo.list_comments(game).await?)
}

/// POST /api/comentarios - Post a comment.
pub async fn create_comment(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateCommentRequest>,
) -> ApiResult<Comment> {
    let comment = request.validate(&state.config.email_domain)?;

    created(state.repo.create_comment(&comment).await?)
}

/// DELETE /api/comentarios/:id - Delete a comment.
pub async fn delete_comment(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.delete_comment(&id).await?;
    tracing::info!("Deleted comment {}", id);
    success(())
}
