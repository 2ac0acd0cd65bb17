//! Database repository for comments and manually created games.
//!
//! Uses prepared statements for every query.

use chrono::{SecondsFormat, Utc};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{Comment, CommentCategory, GameDto, NewComment};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== COMMENT OPERATIONS ====================

    /// Create a comment on a game.
    pub async fn create_comment(&self, comment: &NewComment) -> Result<Comment, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp();

        sqlx::query(
            "INSERT INTO comments (id, game, email, category, body, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&comment.game)
        .bind(&comment.email)
        .bind(comment.category.as_str())
        .bind(&comment.text)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Comment {
            id,
            game: comment.game.clone(),
            email: comment.email.clone(),
            category: comment.category,
            text: comment.text.clone(),
            created_at: now,
        })
    }

    /// List comments for a game, oldest first.
    pub async fn list_comments(&self, game: &str) -> Result<Vec<Comment>, AppError> {
        let rows = sqlx::query(
            "SELECT id, game, email, category, body, created_at FROM comments WHERE game = ? ORDER BY created_at, rowid",
        )
        .bind(game)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(comment_from_row).collect())
    }

    /// Delete a comment.
    pub async fn delete_comment(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Comment {} not found", id)));
        }

        Ok(())
    }

    // ==================== GAME OPERATIONS ====================

    /// Store a canonical game record.
    pub async fn insert_game(&self, game: &GameDto) -> Result<(), AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp();
        let dto = serde_json::to_string(game)
            .map_err(|e| AppError::Internal(format!("Failed to encode game: {}", e)))?;

        sqlx::query("INSERT INTO games (id, nombre, dto, created_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(&game.nombre)
            .bind(&dto)
            .bind(&now)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// List stored games in creation order.
    pub async fn list_games(&self) -> Result<Vec<GameDto>, AppError> {
        let rows = sqlx::query("SELECT id, dto FROM games ORDER BY created_at, rowid")
            .fetch_all(&self.pool)
            .await?;

        let mut games = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: String = row.get("id");
            let dto: String = row.get("dto");
            match serde_json::from_str::<GameDto>(&dto) {
                Ok(game) => games.push(game),
                Err(e) => tracing::warn!("Skipping unreadable stored game {}: {}", id, e),
            }
        }
        Ok(games)
    }
}

/// Fixed-width RFC 3339 so stored timestamps sort as text.
fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn comment_from_row(row: &sqlx::sqlite::SqliteRow) -> Comment {
    let category: String = row.get("category");
    Comment {
        id: row.get("id"),
        game: row.get("game"),
        email: row.get("email"),
        category: CommentCategory::from_str(&category).unwrap_or_default(),
        text: row.get("body"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::models::{Complexity, Span};
    use tempfile::TempDir;

    async fn repo() -> (Repository, TempDir) {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("test.sqlite")).await.unwrap();
        (Repository::new(pool), dir)
    }

    fn new_comment(game: &str, text: &str) -> NewComment {
        NewComment {
            game: game.to_string(),
            email: "ana@alumnos.uach.cl".to_string(),
            category: CommentCategory::Warning,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_comment_lifecycle() {
        let (repo, _dir) = repo().await;

        let first = repo.create_comment(&new_comment("Catan", "Faltan piezas")).await.unwrap();
        repo.create_comment(&new_comment("Catan", "Muy bueno")).await.unwrap();
        repo.create_comment(&new_comment("Azul", "Otro juego")).await.unwrap();

        let comments = repo.list_comments("Catan").await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, "Faltan piezas");
        assert_eq!(comments[0].category, CommentCategory::Warning);
        assert_eq!(comments[1].text, "Muy bueno");

        repo.delete_comment(&first.id).await.unwrap();
        assert_eq!(repo.list_comments("Catan").await.unwrap().len(), 1);

        let err = repo.delete_comment(&first.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_games_round_trip_in_order() {
        let (repo, _dir) = repo().await;

        for name in ["Catan", "Azul"] {
            let game = GameDto {
                id: None,
                imagen: None,
                nombre: name.to_string(),
                jugadores: Span { min: 2, max: 4 },
                autor: "Autor".to_string(),
                ilustrador: "Ilustrador".to_string(),
                creacion: "2000".to_string(),
                genero: "Familiar".to_string(),
                complejidad: Complexity::High,
                edificio: "Biblioteca".to_string(),
                tiempo: Span { min: 30, max: 30 },
                tags: vec!["dados".to_string()],
                desc: vec!["Texto".to_string()],
            };
            repo.insert_game(&game).await.unwrap();
        }

        let games = repo.list_games().await.unwrap();
        let names: Vec<&str> = games.iter().map(|g| g.nombre.as_str()).collect();
        assert_eq!(names, vec!["Catan", "Azul"]);
        assert_eq!(games[0].complejidad, Complexity::High);
    }
}
