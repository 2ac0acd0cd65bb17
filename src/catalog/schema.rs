//! Accepted shapes of game records.
//!
//! Drafts are checked leniently and coerced ([`GameDraft::parse`]); canonical
//! records are checked strictly ([`GameDto::check`]).

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{GameDto, Span};

/// Fields with a meaning in the draft. Everything else is passed through.
const KNOWN_FIELDS: [&str; 13] = [
    "id",
    "imagen",
    "nombre",
    "autor",
    "ilustrador",
    "creacion",
    "genero",
    "complejidad",
    "edificio",
    "jugadores",
    "tiempo",
    "tags",
    "desc",
];

/// Minimum length of the creation year once turned into text.
const MIN_YEAR_LEN: usize = 4;

/// A single offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// Dotted path of the field, empty for the record itself.
    pub path: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Caller-supplied data does not have an accepted shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        Self { issues }
    }

    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldIssue::new(path, message)])
    }

    /// Whether any issue points at `path`.
    pub fn has_path(&self, path: &str) -> bool {
        self.issues.iter().any(|i| i.path == path)
    }
}

/// The normalizer produced a record that is not canonical.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("normalized game violates the canonical shape: {}", join_issues(.issues))]
pub struct ContractViolation {
    pub issues: Vec<FieldIssue>,
}

/// A draft that passed the lenient schema. Text is not yet trimmed and
/// complexity is still free text.
#[derive(Debug, Clone, PartialEq)]
pub struct GameDraft {
    pub id: Option<String>,
    pub imagen: Option<String>,
    pub nombre: String,
    pub autor: String,
    pub ilustrador: String,
    pub creacion: String,
    pub genero: String,
    pub complejidad: String,
    pub edificio: String,
    pub jugadores: Span,
    pub tiempo: Span,
    pub tags: Vec<String>,
    pub desc: Vec<String>,
    /// Unknown fields, kept untouched.
    pub extra: Map<String, Value>,
}

impl GameDraft {
    /// Check `input` against the draft schema, collecting every issue.
    pub fn parse(input: &Value) -> Result<Self, ValidationError> {
        let Some(obj) = input.as_object() else {
            return Err(ValidationError::single("", "game must be a JSON object"));
        };

        let mut issues = Vec::new();

        let id = optional_text(obj, "id", &mut issues);
        let imagen = optional_text(obj, "imagen", &mut issues);
        let nombre = required_text(obj, "nombre", &mut issues);
        let autor = required_text(obj, "autor", &mut issues);
        let ilustrador = required_text(obj, "ilustrador", &mut issues);
        let creacion = year_text(obj, &mut issues);
        let genero = required_text(obj, "genero", &mut issues);
        let complejidad = required_text(obj, "complejidad", &mut issues);
        let edificio = required_text(obj, "edificio", &mut issues);
        let jugadores = span(obj, "jugadores", &mut issues);
        let tiempo = span(obj, "tiempo", &mut issues);
        let tags = tag_list(obj, &mut issues);
        let desc = paragraphs(obj, &mut issues);

        let extra: Map<String, Value> = obj
            .iter()
            .filter(|(k, _)| !KNOWN_FIELDS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let (
            Some(id),
            Some(imagen),
            Some(nombre),
            Some(autor),
            Some(ilustrador),
            Some(creacion),
            Some(genero),
            Some(complejidad),
            Some(edificio),
            Some(jugadores),
            Some(tiempo),
            Some(tags),
            Some(desc),
        ) = (
            id,
            imagen,
            nombre,
            autor,
            ilustrador,
            creacion,
            genero,
            complejidad,
            edificio,
            jugadores,
            tiempo,
            tags,
            desc,
        )
        else {
            return Err(ValidationError::new(issues));
        };

        Ok(Self {
            id,
            imagen,
            nombre,
            autor,
            ilustrador,
            creacion,
            genero,
            complejidad,
            edificio,
            jugadores,
            tiempo,
            tags,
            desc,
            extra,
        })
    }
}

/// `Some(None)` when absent or null, `None` on a type error.
fn optional_text(
    obj: &Map<String, Value>,
    field: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<Option<String>> {
    match obj.get(field) {
        None | Some(Value::Null) => Some(None),
        Some(Value::String(s)) => Some(Some(s.clone())),
        Some(_) => {
            issues.push(FieldIssue::new(field, format!("{} must be a string", field)));
            None
        }
    }
}

fn required_text(
    obj: &Map<String, Value>,
    field: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<String> {
    match obj.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        None | Some(Value::Null) | Some(Value::String(_)) => {
            issues.push(FieldIssue::new(field, format!("{} is required", field)));
            None
        }
        Some(_) => {
            issues.push(FieldIssue::new(field, format!("{} must be a string", field)));
            None
        }
    }
}

/// The creation year may arrive as a number or as text; it is kept as text.
fn year_text(obj: &Map<String, Value>, issues: &mut Vec<FieldIssue>) -> Option<String> {
    let text = match obj.get("creacion") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => number_text(n),
        None | Some(Value::Null) => {
            issues.push(FieldIssue::new("creacion", "creacion is required"));
            return None;
        }
        Some(_) => {
            issues.push(FieldIssue::new(
                "creacion",
                "creacion must be a year as text or number",
            ));
            return None;
        }
    };

    if text.trim().chars().count() < MIN_YEAR_LEN {
        issues.push(FieldIssue::new("creacion", "creacion is not a valid year"));
        return None;
    }
    Some(text)
}

/// Whole floats such as `1995.0` print without the fraction.
fn number_text(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

fn span(obj: &Map<String, Value>, field: &str, issues: &mut Vec<FieldIssue>) -> Option<Span> {
    let inner = match obj.get(field) {
        Some(Value::Object(inner)) => inner,
        None | Some(Value::Null) => {
            issues.push(FieldIssue::new(field, format!("{} is required", field)));
            return None;
        }
        Some(_) => {
            issues.push(FieldIssue::new(
                field,
                format!("{} must be an object with min and max", field),
            ));
            return None;
        }
    };

    let min_path = format!("{}.min", field);
    let max_path = format!("{}.max", field);
    let min = positive_int(inner.get("min"), &min_path, issues);
    let max = positive_int(inner.get("max"), &max_path, issues);

    let (min, max) = (min?, max?);
    if max < min {
        issues.push(FieldIssue::new(
            max_path,
            format!("{}.max must be >= {}.min", field, field),
        ));
        return None;
    }
    Some(Span { min, max })
}

/// Coercive integer parsing: numbers and numeric strings are accepted.
fn positive_int(value: Option<&Value>, path: &str, issues: &mut Vec<FieldIssue>) -> Option<u32> {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        None | Some(Value::Null) => {
            issues.push(FieldIssue::new(path, format!("{} is required", path)));
            return None;
        }
        Some(_) => None,
    };

    let Some(number) = number.filter(|n| n.is_finite()) else {
        issues.push(FieldIssue::new(path, format!("{} must be a number", path)));
        return None;
    };

    if number.fract() != 0.0 {
        issues.push(FieldIssue::new(path, format!("{} must be an integer", path)));
        return None;
    }
    if number <= 0.0 {
        issues.push(FieldIssue::new(path, format!("{} must be positive", path)));
        return None;
    }
    if number > f64::from(u32::MAX) {
        issues.push(FieldIssue::new(path, format!("{} is too large", path)));
        return None;
    }
    Some(number as u32)
}

fn tag_list(obj: &Map<String, Value>, issues: &mut Vec<FieldIssue>) -> Option<Vec<String>> {
    match obj.get("tags") {
        None | Some(Value::Null) => Some(Vec::new()),
        Some(Value::Array(items)) => string_items(items, "tags", issues),
        Some(_) => {
            issues.push(FieldIssue::new("tags", "tags must be a list of strings"));
            None
        }
    }
}

/// A single string counts as one paragraph.
fn paragraphs(obj: &Map<String, Value>, issues: &mut Vec<FieldIssue>) -> Option<Vec<String>> {
    let paragraphs = match obj.get("desc") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => string_items(items, "desc", issues)?,
        _ => Vec::new(),
    };

    if paragraphs.iter().all(|p| p.trim().is_empty()) {
        issues.push(FieldIssue::new(
            "desc",
            "desc needs at least one paragraph of description",
        ));
        return None;
    }
    Some(paragraphs)
}

fn string_items(items: &[Value], field: &str, issues: &mut Vec<FieldIssue>) -> Option<Vec<String>> {
    let mut out = Vec::with_capacity(items.len());
    let mut ok = true;
    for (i, item) in items.iter().enumerate() {
        match item {
            Value::String(s) => out.push(s.clone()),
            _ => {
                let path = format!("{}.{}", field, i);
                issues.push(FieldIssue::new(&path, format!("{} must be a string", path)));
                ok = false;
            }
        }
    }
    ok.then_some(out)
}

impl GameDto {
    /// Strict check of the canonical shape. Nothing is coerced here.
    pub fn check(&self) -> Result<(), Vec<FieldIssue>> {
        let mut issues = Vec::new();

        for (field, value) in [
            ("nombre", &self.nombre),
            ("autor", &self.autor),
            ("ilustrador", &self.ilustrador),
            ("creacion", &self.creacion),
            ("genero", &self.genero),
            ("edificio", &self.edificio),
        ] {
            canonical_text(field, value, &mut issues);
        }
        if let Some(id) = &self.id {
            canonical_text("id", id, &mut issues);
        }
        if let Some(imagen) = &self.imagen {
            canonical_text("imagen", imagen, &mut issues);
        }

        for (field, span) in [("jugadores", self.jugadores), ("tiempo", self.tiempo)] {
            if span.min == 0 {
                issues.push(FieldIssue::new(format!("{}.min", field), "must be positive"));
            }
            if span.max < span.min {
                issues.push(FieldIssue::new(format!("{}.max", field), "must be >= min"));
            }
        }

        for (i, tag) in self.tags.iter().enumerate() {
            let path = format!("tags.{}", i);
            canonical_text(&path, tag, &mut issues);
            if *tag != tag.to_lowercase() {
                issues.push(FieldIssue::new(path, "must be lower-case"));
            }
        }

        if self.desc.is_empty() {
            issues.push(FieldIssue::new("desc", "must have at least one paragraph"));
        }
        for (i, paragraph) in self.desc.iter().enumerate() {
            canonical_text(&format!("desc.{}", i), paragraph, &mut issues);
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

fn canonical_text(path: &str, value: &str, issues: &mut Vec<FieldIssue>) {
    if value.is_empty() {
        issues.push(FieldIssue::new(path, "must not be empty"));
    } else if value.trim() != value {
        issues.push(FieldIssue::new(path, "must be trimmed"));
    }
}
