//! Field cleanup turning a [`GameDraft`] into a canonical [`GameDto`].

use serde_json::Value;

use super::schema::{ContractViolation, GameDraft};
use super::ProjectionError;
use crate::models::{Complexity, GameDto};

/// Labels accepted for each complexity level, compared after lower-casing.
const LOW_LABELS: [&str; 6] = ["baja", "bajo", "low", "easy", "facil", "fácil"];
const MEDIUM_LABELS: [&str; 6] = ["media", "medio", "medium", "intermedia", "intermedio", "normal"];
const HIGH_LABELS: [&str; 6] = ["alta", "alto", "high", "hard", "dificil", "difícil"];

impl Complexity {
    /// Map a free-text label onto the closed scale. Unknown labels are medium.
    pub fn from_label(label: &str) -> Self {
        let label = norm_text(label).to_lowercase();
        let label = label.as_str();
        if LOW_LABELS.contains(&label) {
            Complexity::Low
        } else if HIGH_LABELS.contains(&label) {
            Complexity::High
        } else {
            // Covers MEDIUM_LABELS and anything unrecognised.
            Complexity::Medium
        }
    }

    /// Whether `label` is one of the known synonyms.
    pub fn is_known_label(label: &str) -> bool {
        let label = norm_text(label).to_lowercase();
        let label = label.as_str();
        LOW_LABELS.contains(&label) || MEDIUM_LABELS.contains(&label) || HIGH_LABELS.contains(&label)
    }
}

fn norm_text(s: &str) -> &str {
    s.trim()
}

fn norm_optional(s: Option<String>) -> Option<String> {
    s.map(|s| norm_text(&s).to_string()).filter(|s| !s.is_empty())
}

fn norm_list(items: Vec<String>, lower: bool) -> Vec<String> {
    items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| {
            if lower {
                item.to_lowercase()
            } else {
                item.to_string()
            }
        })
        .collect()
}

/// Apply the cleanup rules. The result still has to pass [`GameDto::check`].
pub(crate) fn normalize(draft: GameDraft) -> GameDto {
    GameDto {
        id: norm_optional(draft.id),
        imagen: norm_optional(draft.imagen),
        nombre: norm_text(&draft.nombre).to_string(),
        jugadores: draft.jugadores,
        autor: norm_text(&draft.autor).to_string(),
        ilustrador: norm_text(&draft.ilustrador).to_string(),
        creacion: norm_text(&draft.creacion).to_string(),
        genero: norm_text(&draft.genero).to_string(),
        complejidad: Complexity::from_label(&draft.complejidad),
        edificio: norm_text(&draft.edificio).to_string(),
        tiempo: draft.tiempo,
        // Duplicates are kept; only case and whitespace are folded.
        tags: norm_list(draft.tags, true),
        desc: norm_list(draft.desc, false),
    }
}

/// Project an arbitrary draft onto the canonical game record.
///
/// Input problems come back as [`ProjectionError::Validation`]. A record the
/// normalizer itself gets wrong comes back as [`ProjectionError::Contract`]
/// and is never patched up.
pub fn to_dto(input: &Value) -> Result<GameDto, ProjectionError> {
    let draft = GameDraft::parse(input)?;
    if !Complexity::is_known_label(&draft.complejidad) {
        tracing::debug!(label = %draft.complejidad, "Unrecognized complexity label, using media");
    }
    let dto = normalize(draft);

    if let Err(issues) = dto.check() {
        let violation = ContractViolation { issues };
        tracing::error!(game = %dto.nombre, "{}", violation);
        return Err(ProjectionError::Contract(violation));
    }

    Ok(dto)
}
