//! Game record normalization.
//!
//! Raw spreadsheet rows and submitted JSON both end up here:
//!
//! ```text
//! row / request body -> GameDraft::parse -> normalize -> GameDto::check -> GameDto
//! ```
//!
//! Everything in this module is synchronous and free of I/O.

mod normalize;
mod rows;
mod schema;

pub use normalize::to_dto;
pub use rows::*;
pub use schema::{ContractViolation, FieldIssue, ValidationError};

/// Why a draft could not be projected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectionError {
    /// The caller sent data that does not fit the draft schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The normalizer produced a non-canonical record. This is a bug.
    #[error(transparent)]
    Contract(ContractViolation),
}
