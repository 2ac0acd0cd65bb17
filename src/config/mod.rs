//! Configuration module for the catalog backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default range read from the catalog sheet.
pub const DEFAULT_SHEET_RANGE: &str = "Hoja1!A:N";
/// Default institutional suffix for comment authors.
pub const DEFAULT_EMAIL_DOMAIN: &str = "@alumnos.uach.cl";
/// Default number of games per catalog page.
pub const DEFAULT_PAGE_SIZE: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Where the catalog sheet is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetConfig {
    /// No sheet configured; only manually created games are listed.
    None,
    /// Local JSON file shaped like a Sheets `ValueRange`.
    File(PathBuf),
    /// Google Sheets v4 values API.
    Google {
        sheet_id: String,
        api_key: String,
        range: String,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key guarding write endpoints (required in production)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub log_json: bool,
    /// Catalog sheet source
    pub sheet: SheetConfig,
    /// JSON object mapping game ids to Drive file ids
    pub image_map_path: Option<PathBuf>,
    /// Required suffix of comment author emails
    pub email_domain: String,
    /// Games per catalog page
    pub page_size: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let api_psk = non_empty_var("LUDOTECA_API_PSK");

        let db_path = env::var("LUDOTECA_DB_PATH")
            .unwrap_or_else(|_| "./data/ludoteca.sqlite".to_string())
            .into();

        let bind_addr = env::var("LUDOTECA_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                var: "LUDOTECA_BIND_ADDR",
                reason: e.to_string(),
            })?;

        let log_level = env::var("LUDOTECA_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = match non_empty_var("LUDOTECA_LOG_FORMAT").as_deref() {
            None | Some("text") => false,
            Some("json") => true,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "LUDOTECA_LOG_FORMAT",
                    reason: format!("expected text or json, got {:?}", other),
                })
            }
        };

        let sheet = match (
            non_empty_var("LUDOTECA_SHEET_FILE"),
            non_empty_var("GOOGLE_SHEET_ID"),
            non_empty_var("GOOGLE_SHEETS_API_KEY"),
        ) {
            (Some(path), _, _) => SheetConfig::File(path.into()),
            (None, Some(sheet_id), Some(api_key)) => SheetConfig::Google {
                sheet_id,
                api_key,
                range: non_empty_var("LUDOTECA_SHEET_RANGE")
                    .unwrap_or_else(|| DEFAULT_SHEET_RANGE.to_string()),
            },
            (None, Some(_), None) => {
                return Err(ConfigError::Invalid {
                    var: "GOOGLE_SHEETS_API_KEY",
                    reason: "required when GOOGLE_SHEET_ID is set".to_string(),
                })
            }
            _ => SheetConfig::None,
        };

        let image_map_path = non_empty_var("LUDOTECA_IMAGE_MAP").map(PathBuf::from);

        let email_domain = non_empty_var("LUDOTECA_EMAIL_DOMAIN")
            .unwrap_or_else(|| DEFAULT_EMAIL_DOMAIN.to_string());

        let page_size = match non_empty_var("LUDOTECA_PAGE_SIZE") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    var: "LUDOTECA_PAGE_SIZE",
                    reason: format!("expected a positive integer, got {:?}", raw),
                })?,
            None => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
            log_json,
            sheet,
            image_map_path,
            email_domain,
            page_size,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
