//! Comment model for the per-game comment board.

use serde::{Deserialize, Serialize};

use crate::catalog::{FieldIssue, ValidationError};

/// Kind of comment a user can leave on a game.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CommentCategory {
    #[default]
    Review,
    SimilarGame,
    Warning,
}

impl CommentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentCategory::Review => "review",
            CommentCategory::SimilarGame => "similar-game",
            CommentCategory::Warning => "warning",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "review" => Some(CommentCategory::Review),
            "similar-game" => Some(CommentCategory::SimilarGame),
            "warning" => Some(CommentCategory::Warning),
            _ => None,
        }
    }
}

/// A stored comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub game: String,
    pub email: String,
    pub category: CommentCategory,
    pub text: String,
    pub created_at: String,
}

/// Request body for posting a comment.
///
/// Every field is optional so that missing values surface as field issues.
/// Values of the wrong JSON type are rejected as a bad request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub game: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl CreateCommentRequest {
    /// Check the request at the boundary. Every offending field is reported.
    pub fn validate(self, email_domain: &str) -> Result<NewComment, ValidationError> {
        let mut issues = Vec::new();

        let game = non_blank(self.game);
        if game.is_none() {
            issues.push(FieldIssue::new("game", "game is required"));
        }

        let email = non_blank(self.email);
        match &email {
            None => issues.push(FieldIssue::new("email", "email is required")),
            Some(email) if !is_institutional(email, email_domain) => issues.push(FieldIssue::new(
                "email",
                format!("email must be an institutional address ending in {}", email_domain),
            )),
            Some(_) => {}
        }

        let category = match non_blank(self.category) {
            None => Some(CommentCategory::default()),
            Some(raw) => {
                let parsed = CommentCategory::from_str(&raw.to_lowercase());
                if parsed.is_none() {
                    issues.push(FieldIssue::new(
                        "category",
                        "category must be one of review, similar-game, warning",
                    ));
                }
                parsed
            }
        };

        let text = non_blank(self.comment);
        if text.is_none() {
            issues.push(FieldIssue::new("comment", "comment is required"));
        }

        match (game, email, category, text) {
            (Some(game), Some(email), Some(category), Some(text)) if issues.is_empty() => {
                Ok(NewComment {
                    game,
                    email,
                    category,
                    text,
                })
            }
            _ => Err(ValidationError::new(issues)),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// The address needs a local part and the configured domain suffix.
fn is_institutional(email: &str, domain: &str) -> bool {
    let email = email.to_lowercase();
    let domain = domain.trim().to_lowercase();
    match email.strip_suffix(&domain) {
        Some(local) => !local.is_empty() && !local.contains('@') && !local.contains(char::is_whitespace),
        None => false,
    }
}

/// A comment request that passed boundary checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub game: String,
    pub email: String,
    pub category: CommentCategory,
    pub text: String,
}

/// Query string for listing comments.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentQuery {
    #[serde(default)]
    pub game: Option<String>,
}
