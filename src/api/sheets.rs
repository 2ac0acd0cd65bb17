//! Raw sheet endpoint.

use axum::extract::State;

use super::{success, ApiResult};
use crate::catalog::Cell;
use crate::AppState;

/// GET /api/sheets - Raw sheet cells, header row first.
pub async fn get_sheet(State(state): State<AppState>) -> ApiResult<Vec<Vec<Cell>>> {
    success(state.sheet.fetch().await?)
}
