//! Game record model matching the catalog frontend's `juego` shape.

use serde::{Deserialize, Serialize};

/// Closed complexity scale. Serialized with the catalog's labels.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Complexity {
    #[serde(rename = "baja")]
    Low,
    #[default]
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "alta")]
    High,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Low => "baja",
            Complexity::Medium => "media",
            Complexity::High => "alta",
        }
    }
}

/// Inclusive `{min, max}` range used for player counts and play time (minutes).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    pub min: u32,
    pub max: u32,
}

/// Canonical game record served to every consumer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameDto {
    #[serde(default)]
    pub id: Option<String>,
    pub imagen: Option<String>,
    pub nombre: String,
    pub jugadores: Span,
    pub autor: String,
    pub ilustrador: String,
    pub creacion: String,
    pub genero: String,
    pub complejidad: Complexity,
    pub edificio: String,
    pub tiempo: Span,
    pub tags: Vec<String>,
    pub desc: Vec<String>,
}

impl GameDto {
    /// Whether `name` refers to this game, ignoring case and surrounding whitespace.
    pub fn matches_name(&self, name: &str) -> bool {
        self.nombre.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

/// Query parameters for the catalog listing.
///
/// The page is remembered by the client and passed back explicitly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub per_page: Option<usize>,
}

/// One page of the catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    pub games: Vec<GameDto>,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

impl CatalogPage {
    /// Slice `games` into the requested page, clamping the page into `1..=total_pages`.
    pub fn paginate(games: Vec<GameDto>, page: Option<usize>, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let total = games.len();
        let total_pages = total.div_ceil(per_page).max(1);
        let page = page.unwrap_or(1).clamp(1, total_pages);

        let games = games
            .into_iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .collect();

        Self {
            games,
            page,
            total_pages,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(name: &str) -> GameDto {
        GameDto {
            id: None,
            imagen: None,
            nombre: name.to_string(),
            jugadores: Span { min: 2, max: 4 },
            autor: "Autor".to_string(),
            ilustrador: "Ilustrador".to_string(),
            creacion: "2001".to_string(),
            genero: "Estrategia".to_string(),
            complejidad: Complexity::Medium,
            edificio: "Biblioteca".to_string(),
            tiempo: Span { min: 30, max: 60 },
            tags: vec![],
            desc: vec!["Texto".to_string()],
        }
    }

    #[test]
    fn test_complexity_serializes_catalog_labels() {
        assert_eq!(serde_json::to_value(Complexity::Low).unwrap(), "baja");
        assert_eq!(serde_json::to_value(Complexity::Medium).unwrap(), "media");
        assert_eq!(serde_json::to_value(Complexity::High).unwrap(), "alta");
    }

    #[test]
    fn test_missing_id_serializes_as_null() {
        let value = serde_json::to_value(game("Catan")).unwrap();
        assert_eq!(value["id"], serde_json::Value::Null);
        assert_eq!(value["imagen"], serde_json::Value::Null);
    }

    #[test]
    fn test_matches_name_ignores_case_and_whitespace() {
        let g = game("Catan");
        assert!(g.matches_name("  catan "));
        assert!(!g.matches_name("Carcassonne"));
    }

    #[test]
    fn test_paginate_clamps_page() {
        let games: Vec<GameDto> = (0..25).map(|i| game(&format!("G{}", i))).collect();

        let page = CatalogPage::paginate(games.clone(), Some(3), 12);
        assert_eq!(page.page, 3);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.games.len(), 1);
        assert_eq!(page.games[0].nombre, "G24");

        let beyond = CatalogPage::paginate(games.clone(), Some(99), 12);
        assert_eq!(beyond.page, 3);

        let zero = CatalogPage::paginate(games, Some(0), 12);
        assert_eq!(zero.page, 1);
        assert_eq!(zero.games.len(), 12);
    }

    #[test]
    fn test_paginate_empty_catalog_has_one_page() {
        let page = CatalogPage::paginate(Vec::new(), None, 12);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 1);
        assert!(page.games.is_empty());
    }
}
