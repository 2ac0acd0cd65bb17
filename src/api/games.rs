//! Game catalog API endpoints.

use axum::extract::{Path, State};
use serde_json::Value;

use super::{created, success, ApiJson, ApiQuery, ApiResult};
use crate::catalog::{map_sheet, to_dto, ProjectionError};
use crate::errors::AppError;
use crate::models::{CatalogPage, GameDto, ListingQuery};
use crate::AppState;

/// Upper bound for a client-chosen page size.
const MAX_PAGE_SIZE: usize = 100;

/// Every game in the catalog: sheet rows first, then manually created games.
///
/// Sheet rows that fail validation are skipped with a warning. A contract
/// violation aborts the whole listing.
pub async fn load_catalog(state: &AppState) -> Result<Vec<GameDto>, AppError> {
    let values = state.sheet.fetch().await?;
    let rows = map_sheet(&values, Some(state.images.as_ref()));

    let mut games = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;
    for (i, row) in rows.iter().enumerate() {
        match to_dto(&row.to_value()) {
            Ok(game) => games.push(game),
            Err(ProjectionError::Validation(e)) => {
                skipped += 1;
                // +2: one for the header, one for 1-based sheet rows.
                tracing::warn!(row = i + 2, "Skipping invalid sheet row: {}", e);
            }
            Err(e) => return Err(e.into()),
        }
    }
    if skipped > 0 {
        tracing::info!("Catalog loaded with {} sheet rows skipped", skipped);
    }

    games.extend(state.repo.list_games().await?);
    Ok(games)
}

/// GET /api/juegos - List one page of the catalog.
pub async fn list_games(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListingQuery>,
) -> ApiResult<CatalogPage> {
    let games = load_catalog(&state).await?;
    let per_page = query
        .per_page
        .unwrap_or(state.config.page_size)
        .clamp(1, MAX_PAGE_SIZE);

    success(CatalogPage::paginate(games, query.page, per_page))
}

/// GET /api/juegos/:nombre - Get a single game by name.
pub async fn get_game(
    State(state): State<AppState>,
    Path(nombre): Path<String>,
) -> ApiResult<GameDto> {
    let games = load_catalog(&state).await?;

    match games.into_iter().find(|g| g.matches_name(&nombre)) {
        Some(game) => success(game),
        None => Err(AppError::NotFound(format!("Game {} not found", nombre.trim()))),
    }
}

/// POST /api/juegos - Create a game from a submitted draft.
pub async fn create_game(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<Value>,
) -> ApiResult<GameDto> {
    let game = to_dto(&draft)?;
    state.repo.insert_game(&game).await?;

    tracing::info!("Created game {}", game.nombre);
    created(game)
}
