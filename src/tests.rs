//! Integration tests for the Ludoteca backend.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::catalog::{ImageTable, DRIVE_IMAGE_URL};
use crate::config::{Config, SheetConfig, DEFAULT_EMAIL_DOMAIN};
use crate::db::{init_database, Repository};
use crate::sheets::FileSheet;
use crate::{create_router, AppState};

const PSK: &str = "test-api-key";

/// Sheet export used by every test: two valid rows and one missing its author.
fn sheet_fixture() -> Value {
    json!({
        "range": "Hoja1!A1:N4",
        "majorDimension": "ROWS",
        "values": [
            ["ID", "Nombre", "Autor", "Ilustrador", "Creacion", "Genero", "Complejidad",
             "Edificio", "Jugadores_Min", "Jugadores_Max", "Tiempo_Min", "Tiempo_Max",
             "Tags", "Desc"],
            ["7", " Catan ", "Klaus Teuber", "Michael Menzel", "1995", "Estrategia", "Alta",
             "Biblioteca Central", "3", "4", "60", "120",
             "Comercio, NEGOCIACION, comercio", "Coloniza la isla.\n\nComercia recursos."],
            ["8", "Dixit", "", "Marie Cardouat", "2008", "Party", "facil",
             "Biblioteca Central", "3", "8", "30", "30", "cartas", "Cuenta historias."],
            ["9", "Azul", "Michael Kiesling", "Chris Quilliams", 2017, "Abstracto", "desconocida",
             "Sala de estudio", "2", "4", "30 min", "45 min", "", "Coloca azulejos."]
        ]
    })
}

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_psk(Some(PSK.to_string())).await
    }

    async fn with_psk(psk: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");
        let sheet_path = temp_dir.path().join("sheet.json");
        std::fs::write(&sheet_path, sheet_fixture().to_string()).expect("Failed to write sheet");

        // Initialize database
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));

        let images = ImageTable::from_json(&json!({ "7": "driveFileXYZ" })).unwrap();

        // Create config
        let config = Config {
            api_psk: psk,
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            log_json: false,
            sheet: SheetConfig::File(sheet_path.clone()),
            image_map_path: None,
            email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
            page_size: 2,
        };

        let state = AppState {
            repo,
            sheet: Arc::new(FileSheet::new(sheet_path)),
            images: Arc::new(images),
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str) -> (u16, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn post_json(&self, path: &str, body: &Value, key: Option<&str>) -> (u16, Value) {
        let mut req = self.client.post(self.url(path)).json(body);
        if let Some(key) = key {
            req = req.header("x-api-key", key);
        }
        let resp = req.send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }
}

fn new_game() -> Value {
    json!({
        "nombre": "  Terraforming Mars ",
        "autor": "Jacob Fryxelius",
        "ilustrador": "Isaac Fryxelius",
        "creacion": 2016,
        "genero": "Estrategia",
        "complejidad": "Difícil",
        "edificio": "Biblioteca Central",
        "jugadores": { "min": "1", "max": 5 },
        "tiempo": { "min": 120, "max": 180 },
        "tags": ["Espacio", " CARTAS "],
        "desc": "Convierte Marte en un planeta habitable."
    })
}

fn comment_body(game: &str, email: &str) -> Value {
    json!({
        "game": game,
        "email": email,
        "category": "review",
        "comment": "Muy entretenido"
    })
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_list_games_skips_invalid_rows() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get_json("/api/juegos?perPage=10").await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["page"], 1);
    assert_eq!(body["data"]["totalPages"], 1);

    let games = body["data"]["games"].as_array().unwrap();
    let names: Vec<&str> = games.iter().map(|g| g["nombre"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Catan", "Azul"]);
}

#[tokio::test]
async fn test_sheet_rows_are_normalized() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get_json("/api/juegos/catan").await;
    assert_eq!(status, 200);
    let catan = &body["data"];
    assert_eq!(catan["id"], "7");
    assert_eq!(catan["imagen"], format!("{}driveFileXYZ", DRIVE_IMAGE_URL));
    assert_eq!(catan["complejidad"], "alta");
    assert_eq!(catan["jugadores"], json!({ "min": 3, "max": 4 }));
    assert_eq!(catan["tags"], json!(["comercio", "negociacion", "comercio"]));
    assert_eq!(catan["desc"], json!(["Coloniza la isla.", "Comercia recursos."]));

    let (_, body) = fixture.get_json("/api/juegos/Azul").await;
    let azul = &body["data"];
    assert_eq!(azul["imagen"], Value::Null);
    assert_eq!(azul["complejidad"], "media");
    assert_eq!(azul["creacion"], "2017");
    assert_eq!(azul["tiempo"], json!({ "min": 30, "max": 45 }));
    assert_eq!(azul["tags"], json!([]));
}

#[tokio::test]
async fn test_list_games_paginates() {
    let fixture = TestFixture::new().await;

    // Configured page size is 2, so one manual game spills onto page 2.
    let (status, _) = fixture.post_json("/api/juegos", &new_game(), Some(PSK)).await;
    assert_eq!(status, 201);

    let (_, body) = fixture.get_json("/api/juegos").await;
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["totalPages"], 2);
    assert_eq!(body["data"]["games"].as_array().unwrap().len(), 2);

    let (_, body) = fixture.get_json("/api/juegos?page=2").await;
    assert_eq!(body["data"]["page"], 2);
    let games = body["data"]["games"].as_array().unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0]["nombre"], "Terraforming Mars");

    // Out-of-range pages are clamped.
    let (_, body) = fixture.get_json("/api/juegos?page=40").await;
    assert_eq!(body["data"]["page"], 2);
}

#[tokio::test]
async fn test_get_game_not_found() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get_json("/api/juegos/Dixit").await;
    assert_eq!(status, 404);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_create_game_returns_canonical_record() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.post_json("/api/juegos", &new_game(), Some(PSK)).await;
    assert_eq!(status, 201);
    assert_eq!(body["success"], true);

    let game = &body["data"];
    assert_eq!(game["nombre"], "Terraforming Mars");
    assert_eq!(game["creacion"], "2016");
    assert_eq!(game["complejidad"], "alta");
    assert_eq!(game["jugadores"], json!({ "min": 1, "max": 5 }));
    assert_eq!(game["tags"], json!(["espacio", "cartas"]));
    assert_eq!(game["desc"], json!(["Convierte Marte en un planeta habitable."]));
    // The shape is fixed: a missing id is sent as null.
    assert_eq!(game["id"], Value::Null);

    let (status, body) = fixture.get_json("/api/juegos/terraforming%20mars").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"], *game);
}

#[tokio::test]
async fn test_create_game_reports_every_invalid_field() {
    let fixture = TestFixture::new().await;

    let mut draft = new_game();
    draft["autor"] = json!("   ");
    draft["tiempo"] = json!({ "min": 90, "max": 30 });
    draft["jugadores"] = json!({ "min": 0, "max": 4 });

    let (status, body) = fixture.post_json("/api/juegos", &draft, Some(PSK)).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let paths: Vec<&str> = body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["path"].as_str().unwrap())
        .collect();
    assert!(paths.contains(&"autor"));
    assert!(paths.contains(&"tiempo.max"));
    assert!(paths.contains(&"jugadores.min"));

    // Nothing was stored.
    let (_, body) = fixture.get_json("/api/juegos").await;
    assert_eq!(body["data"]["total"], 2);
}

#[tokio::test]
async fn test_create_game_requires_psk() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.post_json("/api/juegos", &new_game(), None).await;
    assert_eq!(status, 401);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, _) = fixture
        .post_json("/api/juegos", &new_game(), Some("wrong-key"))
        .await;
    assert_eq!(status, 401);

    // Bearer tokens are accepted too.
    let resp = fixture
        .client
        .post(fixture.url("/api/juegos"))
        .bearer_auth(PSK)
        .json(&new_game())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
}

#[tokio::test]
async fn test_no_psk_allows_writes() {
    let fixture = TestFixture::with_psk(None).await;

    let (status, _) = fixture.post_json("/api/juegos", &new_game(), None).await;
    assert_eq!(status, 201);
}

#[tokio::test]
async fn test_reads_do_not_need_psk() {
    let fixture = TestFixture::new().await;

    let (status, _) = fixture.get_json("/api/juegos").await;
    assert_eq!(status, 200);
    let (status, _) = fixture.get_json("/api/comentarios?game=Catan").await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_raw_sheet_endpoint() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get_json("/api/sheets").await;
    assert_eq!(status, 200);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0][0], "ID");
    // Empty cells come back as null, numbers as text.
    assert_eq!(rows[2][2], Value::Null);
    assert_eq!(rows[3][4], "2017");
}

#[tokio::test]
async fn test_comment_lifecycle() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post_json(
            "/api/comentarios",
            &comment_body("Catan", "ana@alumnos.uach.cl"),
            None,
        )
        .await;
    assert_eq!(status, 201);
    let first = body["data"].clone();
    assert_eq!(first["game"], "Catan");
    assert_eq!(first["category"], "review");
    assert_eq!(first["text"], "Muy entretenido");
    assert!(first["createdAt"].is_string());

    let mut second = comment_body("Catan", "luis@alumnos.uach.cl");
    second["category"] = json!("warning");
    second["comment"] = json!("Faltan piezas");
    let (status, _) = fixture.post_json("/api/comentarios", &second, None).await;
    assert_eq!(status, 201);

    let (_, body) = fixture
        .post_json(
            "/api/comentarios",
            &comment_body("Azul", "ana@alumnos.uach.cl"),
            None,
        )
        .await;
    assert_eq!(body["success"], true);

    let (status, body) = fixture.get_json("/api/comentarios?game=Catan").await;
    assert_eq!(status, 200);
    let comments = body["data"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["id"], first["id"]);
    assert_eq!(comments[1]["category"], "warning");

    // Deleting needs the PSK.
    let id = first["id"].as_str().unwrap();
    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/comentarios/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/comentarios/{}", id)))
        .header("x-api-key", PSK)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let (_, body) = fixture.get_json("/api/comentarios?game=Catan").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/comentarios/{}", id)))
        .header("x-api-key", PSK)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_comment_requires_institutional_email() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post_json(
            "/api/comentarios",
            &comment_body("Catan", "ana@gmail.com"),
            None,
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"][0]["path"], "email");

    let (_, body) = fixture.get_json("/api/comentarios?game=Catan").await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_list_comments_requires_game() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get_json("/api/comentarios").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["details"][0]["path"], "game");

    let (status, _) = fixture.get_json("/api/comentarios?game=%20%20").await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_malformed_game_body_uses_error_envelope() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/juegos"))
        .header("x-api-key", PSK)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn test_mistyped_comment_field_uses_error_envelope() {
    let fixture = TestFixture::new().await;

    let mut comment = comment_body("Catan", "ana@alumnos.uach.cl");
    comment["email"] = json!(5);
    let (status, body) = fixture.post_json("/api/comentarios", &comment, None).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (_, body) = fixture.get_json("/api/comentarios?game=Catan").await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_invalid_query_string_uses_error_envelope() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get_json("/api/juegos?page=abc").await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid query string"));
}
