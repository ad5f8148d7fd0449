//! Static host for the built app (`trunk build` output).
//!
//! Scripts and media are served from their own directories so a missing file
//! is a real 404 rather than the SPA shell; everything else falls back to
//! `index.html`.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::Response,
    Router,
};
use std::{
    net::SocketAddr,
    path::PathBuf,
    sync::atomic::{AtomicU64, Ordering as AtomicOrdering},
    sync::Arc,
    time::Instant,
};
use tower_http::services::{ServeDir, ServeFile};

use crate::catalog::{self, Catalog};
use crate::telemetry::{event_record, now_unix_millis, LogLevel};

const DEFAULT_PORT: u64 = 8080;
const DEFAULT_ASSET_ROOT: &str = "dist";
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;
const DEFAULT_SCRIPT_MAX_AGE_SECONDS: u64 = 0;

const PORT_BOUNDS: (u64, u64) = (1, 65_535);
const SCRIPT_MAX_AGE_SECONDS_BOUNDS: (u64, u64) = (0, 86_400);
const REQUEST_ID_HEADER: &str = "x-request-id";

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Clone)]
struct ServerConfig {
    port: u16,
    asset_root: PathBuf,
    log_level: LogLevel,
    script_max_age_seconds: u64,
}

impl ServerConfig {
    fn from_env() -> Self {
        let port = parse_env_u64_with_bounds("PORT", DEFAULT_PORT, PORT_BOUNDS) as u16;
        let asset_root = parse_env_non_empty_string("ASSET_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSET_ROOT));
        let log_level = parse_log_level("LOG_LEVEL", DEFAULT_LOG_LEVEL);
        let script_max_age_seconds = parse_env_u64_with_bounds(
            "SCRIPT_MAX_AGE_SECONDS",
            DEFAULT_SCRIPT_MAX_AGE_SECONDS,
            SCRIPT_MAX_AGE_SECONDS_BOUNDS,
        );

        Self {
            port,
            asset_root,
            log_level,
            script_max_age_seconds,
        }
    }
}

#[derive(Clone)]
struct AppState {
    config: Arc<ServerConfig>,
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env();
    let catalog = catalog::load()?;
    report_missing_assets(&config, &catalog);

    let bind_address = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    log_event(
        &config,
        LogLevel::Info,
        "server_listening",
        serde_json::json!({
            "url": format!("http://127.0.0.1:{}", config.port),
            "asset_root": config.asset_root.display().to_string(),
        }),
    );

    axum::serve(listener, build_router(config)).await?;
    Ok(())
}

fn build_router(config: ServerConfig) -> Router {
    let root = config.asset_root.clone();
    let state = AppState {
        config: Arc::new(config),
    };

    let app_shell = ServeDir::new(&root).fallback(ServeFile::new(root.join("index.html")));

    Router::new()
        .nest_service("/code", ServeDir::new(root.join("code")))
        .nest_service("/media", ServeDir::new(root.join("media")))
        .fallback_service(app_shell)
        .layer(middleware::from_fn_with_state(state, observe_request))
}

async fn observe_request(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let request_id = resolve_request_id(request.headers());
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;
    let status = response.status();

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    if path.starts_with("/code/") && status.is_success() {
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            script_cache_control(state.config.script_max_age_seconds),
        );
    }

    log_event(
        &state.config,
        request_log_level(status),
        "asset_request",
        serde_json::json!({
            "request_id": request_id.as_str(),
            "method": method.as_str(),
            "path": path,
            "status": status.as_u16(),
            "duration_ms": started_at.elapsed().as_millis() as u64,
        }),
    );

    response
}

fn request_log_level(status: StatusCode) -> LogLevel {
    if status.is_server_error() {
        LogLevel::Error
    } else if status.is_client_error() {
        LogLevel::Warn
    } else {
        LogLevel::Debug
    }
}

fn script_cache_control(max_age_seconds: u64) -> HeaderValue {
    if max_age_seconds == 0 {
        return HeaderValue::from_static("no-cache");
    }

    HeaderValue::from_str(&format!("public, max-age={max_age_seconds}"))
        .unwrap_or_else(|_| HeaderValue::from_static("no-cache"))
}

/// Logs every catalog asset that is absent from the asset root. Missing
/// files are not fatal: the app degrades to an inline error for each one.
fn report_missing_assets(config: &ServerConfig, catalog: &Catalog) -> Vec<String> {
    let missing: Vec<String> = catalog
        .asset_paths()
        .into_iter()
        .filter(|path| !config.asset_root.join(path).is_file())
        .collect();

    for path in &missing {
        log_event(
            config,
            LogLevel::Warn,
            "catalog_asset_missing",
            serde_json::json!({ "path": path.as_str() }),
        );
    }

    missing
}

fn parse_env_u64_with_bounds(name: &str, default: u64, bounds: (u64, u64)) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn parse_env_non_empty_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_log_level(name: &str, default: LogLevel) -> LogLevel {
    parse_env_non_empty_string(name)
        .and_then(|value| LogLevel::parse(&value))
        .unwrap_or(default)
}

fn generate_request_id() -> String {
    let counter = REQUEST_ID_COUNTER.fetch_add(1, AtomicOrdering::Relaxed);
    format!("req-{}-{counter}", now_unix_millis())
}

fn resolve_request_id(headers: &HeaderMap) -> String {
    let value = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|raw| raw.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string);

    value.unwrap_or_else(generate_request_id)
}

fn log_event(config: &ServerConfig, level: LogLevel, event: &str, fields: serde_json::Value) {
    if level < config.log_level {
        return;
    }

    println!("{}", event_record(level, event, fields));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{fetch_script, script_url, FetchError, FetchState, MAX_SCRIPT_BYTES};
    use crate::viewer::{ScriptFileSet, ScriptViewer};
    use std::{fs, path::Path};

    const INDEX_HTML: &str = "<!doctype html><div id=\"app\"></div>";
    const SCRIPT_A: &str = "local Dungeon = {}\nreturn Dungeon\n";
    const SCRIPT_B: &str = "-- generator\nprint(\"rooms\")\n";

    fn test_config(asset_root: &Path) -> ServerConfig {
        ServerConfig {
            port: 0,
            asset_root: asset_root.to_path_buf(),
            log_level: LogLevel::Error,
            script_max_age_seconds: DEFAULT_SCRIPT_MAX_AGE_SECONDS,
        }
    }

    fn write_asset(root: &Path, relative: &str, contents: &[u8]) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().expect("asset has a parent")).expect("create asset dir");
        fs::write(path, contents).expect("write asset");
    }

    fn seeded_asset_root() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("temp dir");
        write_asset(dir.path(), "index.html", INDEX_HTML.as_bytes());
        write_asset(dir.path(), "code/Demo/a.lua", SCRIPT_A.as_bytes());
        write_asset(dir.path(), "code/Demo/b.lua", SCRIPT_B.as_bytes());
        write_asset(dir.path(), "media/clip.mp4", b"not really a video");
        dir
    }

    async fn spawn_server(config: ServerConfig) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let address = listener.local_addr().expect("local address");

        tokio::spawn(async move {
            let _ = axum::serve(listener, build_router(config)).await;
        });

        format!("http://{address}")
    }

    #[tokio::test]
    async fn existing_script_is_served_verbatim() {
        let dir = seeded_asset_root();
        let base = spawn_server(test_config(dir.path())).await;

        let url = script_url(&format!("{base}/code/Demo"), "a.lua");
        let body = fetch_script(&url, "a.lua").await.expect("script is served");
        assert_eq!(body, SCRIPT_A);
    }

    #[tokio::test]
    async fn missing_script_is_a_404_naming_the_file() {
        let dir = seeded_asset_root();
        let base = spawn_server(test_config(dir.path())).await;

        let url = script_url(&format!("{base}/code/Demo"), "missing.lua");
        let error = fetch_script(&url, "missing.lua")
            .await
            .expect_err("missing script must not fall back to index.html");

        assert_eq!(
            error,
            FetchError::Status {
                filename: "missing.lua".to_string(),
                status: 404,
            }
        );
        assert!(error.to_string().contains("missing.lua"));
    }

    #[tokio::test]
    async fn oversized_script_is_reported_as_too_large() {
        let dir = seeded_asset_root();
        write_asset(dir.path(), "code/Demo/huge.lua", &vec![b'-'; MAX_SCRIPT_BYTES + 1]);
        let base = spawn_server(test_config(dir.path())).await;

        let url = script_url(&format!("{base}/code/Demo"), "huge.lua");
        let error = fetch_script(&url, "huge.lua").await.expect_err("body over the cap");
        assert_eq!(error, FetchError::TooLarge { filename: "huge.lua".to_string() });
    }

    #[tokio::test]
    async fn unknown_route_serves_the_app_shell() {
        let dir = seeded_asset_root();
        let base = spawn_server(test_config(dir.path())).await;

        let response = reqwest::get(format!("{base}/scripts")).await.expect("request succeeds");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(response.text().await.expect("body"), INDEX_HTML);
    }

    #[tokio::test]
    async fn missing_media_is_a_404() {
        let dir = seeded_asset_root();
        let base = spawn_server(test_config(dir.path())).await;

        let found = reqwest::get(format!("{base}/media/clip.mp4")).await.expect("request");
        let missing = reqwest::get(format!("{base}/media/nope.mp4")).await.expect("request");
        assert_eq!(found.status(), reqwest::StatusCode::OK);
        assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn responses_echo_or_assign_a_request_id() {
        let dir = seeded_asset_root();
        let base = spawn_server(test_config(dir.path())).await;
        let client = reqwest::Client::new();

        let echoed = client
            .get(format!("{base}/code/Demo/a.lua"))
            .header(REQUEST_ID_HEADER, "trace-42")
            .send()
            .await
            .expect("request");
        assert_eq!(
            echoed.headers().get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok()),
            Some("trace-42")
        );

        let assigned = client.get(format!("{base}/")).send().await.expect("request");
        let assigned_id = assigned
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .expect("generated id");
        assert!(assigned_id.starts_with("req-"));
    }

    #[tokio::test]
    async fn scripts_are_revalidated_by_default() {
        let dir = seeded_asset_root();
        let base = spawn_server(test_config(dir.path())).await;

        let response = reqwest::get(format!("{base}/code/Demo/b.lua")).await.expect("request");
        assert_eq!(
            response.headers().get(reqwest::header::CACHE_CONTROL).and_then(|v| v.to_str().ok()),
            Some("no-cache")
        );
    }

    #[tokio::test]
    async fn viewer_keeps_latest_tab_when_older_fetch_resolves_last() {
        let dir = seeded_asset_root();
        let base = spawn_server(test_config(dir.path())).await;
        let files = ScriptFileSet::new(["a.lua", "b.lua"]).expect("valid files");
        let mut viewer = ScriptViewer::new(format!("{base}/code/Demo"), files);

        let first = viewer.open().expect("fetch a");
        let second = viewer.select("b.lua").expect("fetch b");
        let (first_outcome, second_outcome) = futures_util::future::join(
            fetch_script(&first.url, &first.filename),
            fetch_script(&second.url, &second.filename),
        )
        .await;

        viewer.resolve(&second, second_outcome);
        viewer.resolve(&first, first_outcome);
        assert_eq!(viewer.fetch_state(), &FetchState::Loaded(SCRIPT_B.to_string()));
    }

    #[tokio::test]
    async fn file_names_with_spaces_reach_the_served_script() {
        let dir = seeded_asset_root();
        write_asset(dir.path(), "code/Demo/My Script.lua", SCRIPT_A.as_bytes());
        let base = spawn_server(test_config(dir.path())).await;
        let files = ScriptFileSet::new(["My Script.lua"]).expect("spaces are allowed");
        let mut viewer = ScriptViewer::new(format!("{base}/code/Demo"), files);

        let ticket = viewer.open().expect("fetch");
        let outcome = fetch_script(&ticket.url, &ticket.filename).await;
        viewer.resolve(&ticket, outcome);
        assert_eq!(viewer.fetch_state(), &FetchState::Loaded(SCRIPT_A.to_string()));
    }

    #[test]
    fn missing_catalog_assets_are_reported() {
        let dir = seeded_asset_root();
        let catalog = catalog::load().expect("shipped catalog");
        write_asset(dir.path(), "media/DungeonGeneration.png", b"png");

        let missing = report_missing_assets(&test_config(dir.path()), &catalog);
        assert!(!missing.contains(&"media/DungeonGeneration.png".to_string()));
        assert!(missing.contains(&"code/DungeonGenerator/GenerateDungeon.lua".to_string()));
        assert_eq!(missing.len(), catalog.asset_paths().len() - 1);
    }

    #[test]
    fn cache_control_uses_max_age_when_configured() {
        assert_eq!(script_cache_control(0), HeaderValue::from_static("no-cache"));
        assert_eq!(script_cache_control(60), HeaderValue::from_static("public, max-age=60"));
    }

    #[test]
    fn request_id_header_is_trimmed_or_generated() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("  abc  "));
        assert_eq!(resolve_request_id(&headers), "abc");

        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("   "));
        assert!(resolve_request_id(&headers).starts_with("req-"));
    }

    #[test]
    fn request_log_level_escalates_with_status() {
        assert_eq!(request_log_level(StatusCode::OK), LogLevel::Debug);
        assert_eq!(request_log_level(StatusCode::NOT_FOUND), LogLevel::Warn);
        assert_eq!(request_log_level(StatusCode::INTERNAL_SERVER_ERROR), LogLevel::Error);
    }
}
