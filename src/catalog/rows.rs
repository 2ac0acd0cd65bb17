//! Spreadsheet row adapter.
//!
//! Turns a row of raw cells into a [`RawGame`] draft. Nothing is rejected
//! here; bad values become `None` and are reported by the draft schema.

use std::collections::HashMap;

use serde_json::Value;

/// One spreadsheet cell. Missing and empty cells are both `None`.
pub type Cell = Option<String>;

/// Base URL for images hosted on Google Drive.
pub const DRIVE_IMAGE_URL: &str = "https://drive.google.com/uc?export=view&id=";

/// Columns the catalog sheet is expected to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Nombre,
    Autor,
    Ilustrador,
    Creacion,
    Genero,
    Complejidad,
    Edificio,
    JugadoresMin,
    JugadoresMax,
    TiempoMin,
    TiempoMax,
    Tags,
    Desc,
}

impl Column {
    pub const ALL: [Column; 14] = [
        Column::Id,
        Column::Nombre,
        Column::Autor,
        Column::Ilustrador,
        Column::Creacion,
        Column::Genero,
        Column::Complejidad,
        Column::Edificio,
        Column::JugadoresMin,
        Column::JugadoresMax,
        Column::TiempoMin,
        Column::TiempoMax,
        Column::Tags,
        Column::Desc,
    ];

    /// Header text of the column in the sheet.
    pub fn header(&self) -> &'static str {
        match self {
            Column::Id => "ID",
            Column::Nombre => "Nombre",
            Column::Autor => "Autor",
            Column::Ilustrador => "Ilustrador",
            Column::Creacion => "Creacion",
            Column::Genero => "Genero",
            Column::Complejidad => "Complejidad",
            Column::Edificio => "Edificio",
            Column::JugadoresMin => "Jugadores_Min",
            Column::JugadoresMax => "Jugadores_Max",
            Column::TiempoMin => "Tiempo_Min",
            Column::TiempoMax => "Tiempo_Max",
            Column::Tags => "Tags",
            Column::Desc => "Desc",
        }
    }

    fn from_header(header: &str) -> Option<Self> {
        let header = header.trim();
        Column::ALL
            .into_iter()
            .find(|c| c.header().eq_ignore_ascii_case(header))
    }
}

/// Header lookup built once per header row.
#[derive(Debug, Clone, Default)]
pub struct SheetColumns {
    positions: HashMap<Column, usize>,
}

impl SheetColumns {
    /// Index the header row. Unknown headers are ignored; on duplicates the
    /// first occurrence wins.
    pub fn from_header(header: &[Cell]) -> Self {
        let mut positions = HashMap::new();
        for (i, cell) in header.iter().enumerate() {
            if let Some(column) = cell.as_deref().and_then(Column::from_header) {
                positions.entry(column).or_insert(i);
            }
        }
        Self { positions }
    }

    /// Expected columns absent from the header.
    pub fn missing(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|c| !self.positions.contains_key(c))
            .collect()
    }

    fn cell<'a>(&self, row: &'a [Cell], column: Column) -> Option<&'a str> {
        let index = *self.positions.get(&column)?;
        row.get(index)?.as_deref()
    }

    fn text(&self, row: &[Cell], column: Column) -> Option<String> {
        self.cell(row, column)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// External identifier to Drive file id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageTable {
    files: HashMap<String, String>,
}

impl ImageTable {
    pub fn new(files: HashMap<String, String>) -> Self {
        let files = files
            .into_iter()
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .collect();
        Self { files }
    }

    /// Build the table from a JSON object. Numeric values are accepted as ids.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let files = obj
            .iter()
            .filter_map(|(k, v)| match v {
                Value::String(s) => Some((k.clone(), s.clone())),
                Value::Number(n) => Some((k.clone(), n.to_string())),
                _ => None,
            })
            .collect();
        Some(Self::new(files))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Image URL for the game with the given identifier.
    pub fn image_url(&self, id: &str) -> Option<String> {
        self.files
            .get(id.trim())
            .map(|file| format!("{}{}", DRIVE_IMAGE_URL, file))
    }
}

/// Unvalidated `{min, max}` pair read from two columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawSpan {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

/// Draft built from a spreadsheet row, shaped like a submitted game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGame {
    pub id: Option<String>,
    pub imagen: Option<String>,
    pub nombre: Option<String>,
    pub autor: Option<String>,
    pub ilustrador: Option<String>,
    pub creacion: Option<String>,
    pub genero: Option<String>,
    pub complejidad: Option<String>,
    pub edificio: Option<String>,
    pub jugadores: RawSpan,
    pub tiempo: RawSpan,
    pub tags: Vec<String>,
    pub desc: Vec<String>,
}

impl RawGame {
    /// JSON form fed to [`to_dto`](super::to_dto).
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "imagen": self.imagen,
            "nombre": self.nombre,
            "autor": self.autor,
            "ilustrador": self.ilustrador,
            "creacion": self.creacion,
            "genero": self.genero,
            "complejidad": self.complejidad,
            "edificio": self.edificio,
            "jugadores": { "min": self.jugadores.min, "max": self.jugadores.max },
            "tiempo": { "min": self.tiempo.min, "max": self.tiempo.max },
            "tags": self.tags,
            "desc": self.desc,
        })
    }
}

/// Map one data row. Never fails.
pub fn map_row(row: &[Cell], columns: &SheetColumns, images: Option<&ImageTable>) -> RawGame {
    let id = columns
        .cell(row, Column::Id)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let imagen = match (&id, images) {
        (Some(id), Some(images)) => images.image_url(id),
        _ => None,
    };

    RawGame {
        imagen,
        nombre: columns.text(row, Column::Nombre),
        autor: columns.text(row, Column::Autor),
        ilustrador: columns.text(row, Column::Ilustrador),
        creacion: columns.text(row, Column::Creacion),
        genero: columns.text(row, Column::Genero),
        complejidad: columns.text(row, Column::Complejidad),
        edificio: columns.text(row, Column::Edificio),
        jugadores: RawSpan {
            min: columns.cell(row, Column::JugadoresMin).and_then(leading_int),
            max: columns.cell(row, Column::JugadoresMax).and_then(leading_int),
        },
        tiempo: RawSpan {
            min: columns.cell(row, Column::TiempoMin).and_then(leading_int),
            max: columns.cell(row, Column::TiempoMax).and_then(leading_int),
        },
        tags: columns
            .cell(row, Column::Tags)
            .map(split_tags)
            .unwrap_or_default(),
        desc: columns
            .cell(row, Column::Desc)
            .map(split_paragraphs)
            .unwrap_or_default(),
        id,
    }
}

/// Map every data row of a sheet whose first row is the header.
pub fn map_sheet(values: &[Vec<Cell>], images: Option<&ImageTable>) -> Vec<RawGame> {
    let Some((header, rows)) = values.split_first() else {
        return Vec::new();
    };

    let columns = SheetColumns::from_header(header);
    let missing = columns.missing();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(Column::header).collect();
        tracing::warn!("Sheet header is missing columns: {}", names.join(", "));
    }

    rows.iter()
        .map(|row| map_row(row, &columns, images))
        .collect()
}

/// Comma-separated tags, trimmed and lower-cased.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Paragraphs separated by a blank line. Blank paragraphs are dropped.
pub fn split_paragraphs(raw: &str) -> Vec<String> {
    raw.replace("\r\n", "\n")
        .split("\n\n")
        .filter(|p| !p.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Leading integer of a cell such as `"4"` or `"45 min"`. Zero counts as absent.
fn leading_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: i64 = digits[..end].parse().ok()?;
    Some(sign * value).filter(|v| *v != 0)
}
