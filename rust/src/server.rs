use anyhow::{anyhow, Context, Result};
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::TcpListener;
use std::path::Path;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;
use tokio::sync::oneshot;
use tower_http::cors::CorsLayer;

use crate::catalog::{GalleryCatalog, GalleryItem};
use crate::composer::EnhanceOptions;
use crate::config_store::ConfigStore;
use crate::library_store::LibraryStore;
use crate::main_ui_html::build_main_ui_html;
use crate::path_utils::{get_base_dir, resolve_config_path};
use crate::session::SessionState;

pub struct AppState {
    pub config: Mutex<ConfigStore>,
    pub library: Mutex<LibraryStore>,
    pub catalog: GalleryCatalog,
    pub session: Mutex<SessionState>,
    pub copy_state: Mutex<CopyState>,
    pub server_port: AtomicU16,
}

type ApiResponse = (StatusCode, Json<Value>);

pub struct CopyState {
    pub last_prompt: String,
    pub last_copy_time: Option<Instant>,
}

impl AppState {
    pub fn new(config: ConfigStore, library: LibraryStore, catalog: GalleryCatalog) -> Self {
        let mut session = SessionState::new(&config);
        session.gallery_sample = catalog.sample(config.gallery_display_limit());
        if let Some(warning) = catalog.load_warning() {
            session.notices.post(warning);
        }

        Self {
            config: Mutex::new(config),
            library: Mutex::new(library),
            catalog,
            session: Mutex::new(session),
            copy_state: Mutex::new(CopyState {
                last_prompt: String::new(),
                last_copy_time: None,
            }),
            server_port: AtomicU16::new(0),
        }
    }
}

/// Builds the stores, the app state and the running server. Shared by the
/// Windows shell and the headless entry point.
pub fn launch(config_arg: Option<String>) -> Result<(Arc<AppState>, AppServer)> {
    let base_dir = get_base_dir();
    let config_path = resolve_config_path(config_arg, &base_dir);

    let config = ConfigStore::new(config_path.clone())
        .with_context(|| format!("config error: {}", config_path.display()))?;
    let preferred_port = config.server_port();

    let library =
        LibraryStore::new(base_dir.clone()).context("failed to initialize prompt library")?;
    let catalog = GalleryCatalog::load(&base_dir);

    let state = Arc::new(AppState::new(config, library, catalog));
    let server =
        AppServer::start(state.clone(), preferred_port).context("failed to start local server")?;

    {
        let library = state
            .library
            .lock()
            .map_err(|_| anyhow!("library lock error"))?;
        library
            .regenerate_html()
            .context("failed to write initial Library.html")?;
    }

    Ok((state, server))
}

pub struct AppServer {
    port: u16,
    shutdown_tx: Option<oneshot::Sender<()>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl AppServer {
    pub fn start(state: Arc<AppState>, preferred_port: u16) -> Result<Self> {
        let listener = bind_listener(preferred_port)?;
        let port = listener
            .local_addr()
            .context("failed to inspect server local address")?
            .port();
        listener
            .set_nonblocking(true)
            .context("failed to set listener non-blocking")?;

        state.server_port.store(port, Ordering::Relaxed);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let thread_handle = thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build();
            let Ok(runtime) = runtime else {
                return;
            };

            runtime.block_on(async move {
                let listener = match tokio::net::TcpListener::from_std(listener) {
                    Ok(listener) => listener,
                    Err(_) => return,
                };

                let app = build_router(state);
                let server = axum::serve(listener, app).with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                });
                let _ = server.await;
            });
        });

        Ok(Self {
            port,
            shutdown_tx: Some(shutdown_tx),
            thread_handle: Some(thread_handle),
        })
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }

    /// Blocks until the server thread exits. Used by the headless entry
    /// point, where no window close event drives shutdown.
    pub fn wait(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Drop for AppServer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Debug, Clone, Serialize)]
struct SelectorRow {
    key: String,
    label: String,
    choices: Vec<String>,
    selected: String,
}

#[derive(Debug, Serialize)]
struct UiSnapshot {
    rows: Vec<SelectorRow>,
    free_text: String,
    preview: String,
    composed: String,
    library: Vec<String>,
    gallery: Vec<GalleryItem>,
    expanded: bool,
    theme: String,
    notice: Option<String>,
    notice_seq: u64,
}

#[derive(Debug, Deserialize)]
struct SelectReq {
    axis: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct FreeTextReq {
    value: String,
}

#[derive(Debug, Deserialize)]
struct EnhanceReq {
    text: String,
    #[serde(default)]
    negative: String,
    #[serde(default)]
    aspect_ratio: String,
    #[serde(default)]
    engine: String,
}

#[derive(Debug, Deserialize)]
struct SaveReq {
    prompt: String,
}

#[derive(Debug, Deserialize)]
struct CopyReq {
    prompt: String,
}

#[derive(Debug, Deserialize)]
struct RemixReq {
    id: u32,
}

#[derive(Debug, Deserialize)]
struct ThemeReq {
    theme: String,
}

#[derive(Debug, Deserialize)]
struct NavigateReq {
    url: String,
}

fn build_router(state: Arc<AppState>) -> Router {
    let port = state.server_port.load(Ordering::Relaxed);
    let local_origin = HeaderValue::from_str(&format!("http://127.0.0.1:{port}"))
        .expect("127.0.0.1 origin should be valid");
    let localhost_origin = HeaderValue::from_str(&format!("http://localhost:{port}"))
        .expect("localhost origin should be valid");

    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("null"),
            local_origin,
            localhost_origin,
        ])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(get_main_page))
        .route("/ping", get(get_ping))
        .route("/app/init", get(get_app_init))
        .route("/app/select", post(post_app_select))
        .route("/app/free-text", post(post_app_free_text))
        .route("/app/enhance", post(post_app_enhance))
        .route("/app/save", post(post_app_save))
        .route("/app/copy", post(post_app_copy))
        .route("/app/gallery/refresh", post(post_app_gallery_refresh))
        .route("/app/gallery/toggle", post(post_app_gallery_toggle))
        .route("/app/remix", post(post_app_remix))
        .route("/app/theme", post(post_app_theme))
        .route("/app/navigate", post(post_app_navigate))
        .route("/app/open-library", post(post_app_open_library))
        .layer(cors)
        .with_state(state)
}

async fn get_main_page() -> Html<String> {
    Html(build_main_ui_html())
}

async fn get_ping() -> ApiResponse {
    ok_json(json!({}))
}

async fn get_app_init(State(state): State<Arc<AppState>>) -> ApiResponse {
    snapshot_response(&state)
}

async fn post_app_select(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SelectReq>,
) -> ApiResponse {
    {
        let config = match state.config.lock() {
            Ok(guard) => guard,
            Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "config lock error"),
        };
        let mut session = match state.session.lock() {
            Ok(guard) => guard,
            Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "session lock error"),
        };

        let axis = payload.axis.trim();
        let value = payload.value.trim();
        let known = config
            .selectors()
            .iter()
            .any(|s| s.key == axis && s.choices.iter().any(|c| c == value));

        if known {
            session.draft.set_value(axis, value.to_string());
        } else {
            session.notices.post("That choice is not available.");
        }
    }

    snapshot_response(&state)
}

async fn post_app_free_text(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FreeTextReq>,
) -> ApiResponse {
    {
        let mut session = match state.session.lock() {
            Ok(guard) => guard,
            Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "session lock error"),
        };
        session.draft.free_text = payload.value.trim().to_string();
    }

    snapshot_response(&state)
}

async fn post_app_enhance(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EnhanceReq>,
) -> ApiResponse {
    {
        let config = match state.config.lock() {
            Ok(guard) => guard,
            Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "config lock error"),
        };
        let tables = config.classifier_tables();
        drop(config);

        let mut session = match state.session.lock() {
            Ok(guard) => guard,
            Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "session lock error"),
        };

        let options = EnhanceOptions {
            negative: payload.negative,
            aspect_ratio: payload.aspect_ratio,
            engine: payload.engine,
        };
        if session.enhance_into(&tables, &payload.text, &options) {
            session.notices.post("Prompt enhanced.");
        }
    }

    snapshot_response(&state)
}

async fn post_app_save(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SaveReq>,
) -> ApiResponse {
    {
        let mut session = match state.session.lock() {
            Ok(guard) => guard,
            Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "session lock error"),
        };

        let prompt = payload.prompt.trim();
        if prompt.is_empty() {
            session.notices.post("Nothing to save yet.");
        } else {
            let mut library = match state.library.lock() {
                Ok(guard) => guard,
                Err(_) => {
                    return err_json(StatusCode::INTERNAL_SERVER_ERROR, "library lock error")
                }
            };

            if let Err(err) = library.save(prompt) {
                return err_json(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("library save error: {err}"),
                );
            }
            if let Err(err) = library.regenerate_html() {
                return err_json(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("library render error: {err}"),
                );
            }
            session.notices.post("Saved to your library.");
        }
    }

    snapshot_response(&state)
}

async fn post_app_copy(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CopyReq>,
) -> ApiResponse {
    let debounce = {
        let config = match state.config.lock() {
            Ok(guard) => guard,
            Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "config lock error"),
        };
        config.copy_debounce_sec()
    };

    {
        let mut session = match state.session.lock() {
            Ok(guard) => guard,
            Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "session lock error"),
        };

        let prompt = payload.prompt.trim().to_string();
        if prompt.is_empty() {
            session.notices.post("Nothing to copy yet.");
        } else {
            let mut copy_state = match state.copy_state.lock() {
                Ok(guard) => guard,
                Err(_) => {
                    return err_json(StatusCode::INTERNAL_SERVER_ERROR, "copy state lock error")
                }
            };

            let debounced = copy_state.last_prompt == prompt
                && copy_state
                    .last_copy_time
                    .map(|at| at.elapsed().as_secs_f64() <= debounce)
                    .unwrap_or(false);

            if !debounced {
                match copy_to_system_clipboard(&prompt) {
                    Ok(()) => {
                        copy_state.last_prompt = prompt;
                        copy_state.last_copy_time = Some(Instant::now());
                        session.notices.post("Prompt copied to clipboard.");
                    }
                    Err(err) => {
                        session.notices.post(format!("Clipboard copy failed: {err}"));
                    }
                }
            }
        }
    }

    snapshot_response(&state)
}

async fn post_app_gallery_refresh(State(state): State<Arc<AppState>>) -> ApiResponse {
    {
        let config = match state.config.lock() {
            Ok(guard) => guard,
            Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "config lock error"),
        };
        let limit = config.gallery_display_limit();
        drop(config);

        let mut session = match state.session.lock() {
            Ok(guard) => guard,
            Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "session lock error"),
        };
        session.gallery_expanded = false;
        session.gallery_sample = state.catalog.sample(limit);
    }

    snapshot_response(&state)
}

async fn post_app_gallery_toggle(State(state): State<Arc<AppState>>) -> ApiResponse {
    {
        let config = match state.config.lock() {
            Ok(guard) => guard,
            Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "config lock error"),
        };
        let limit = config.gallery_display_limit();
        drop(config);

        let mut session = match state.session.lock() {
            Ok(guard) => guard,
            Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "session lock error"),
        };
        session.gallery_expanded = !session.gallery_expanded;
        if !session.gallery_expanded {
            // Collapsing draws a fresh sample; no ordering is memoized.
            session.gallery_sample = state.catalog.sample(limit);
        }
    }

    snapshot_response(&state)
}

async fn post_app_remix(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RemixReq>,
) -> ApiResponse {
    {
        let mut session = match state.session.lock() {
            Ok(guard) => guard,
            Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "session lock error"),
        };

        match state.catalog.find(payload.id) {
            Some(item) => session.remix(item),
            None => session.notices.post("That gallery entry is gone."),
        }
    }

    snapshot_response(&state)
}

async fn post_app_theme(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ThemeReq>,
) -> ApiResponse {
    {
        let mut config = match state.config.lock() {
            Ok(guard) => guard,
            Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "config lock error"),
        };
        let mut session = match state.session.lock() {
            Ok(guard) => guard,
            Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "session lock error"),
        };

        let theme = payload.theme.trim().to_string();
        if theme != "light" && theme != "dark" {
            session.notices.post("Unknown theme.");
        } else if let Err(err) = config.set_theme(&theme) {
            return err_json(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("save error: {err}"),
            );
        } else {
            session.notices.post(format!("Switched to {theme} theme."));
        }
    }

    snapshot_response(&state)
}

async fn post_app_navigate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NavigateReq>,
) -> ApiResponse {
    let mut session = match state.session.lock() {
        Ok(guard) => guard,
        Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "session lock error"),
    };

    let url = payload.url.trim();
    if url.is_empty() {
        session.notices.post("Enter a URL first.");
        return ok_json(json!({
            "url": Value::Null,
            "notice": session.notices.current(),
        }));
    }

    let normalized = normalize_url(url);
    session.notices.post("Loading page...");
    ok_json(json!({
        "url": normalized,
        "notice": session.notices.current(),
    }))
}

async fn post_app_open_library(State(state): State<Arc<AppState>>) -> ApiResponse {
    let path = {
        let library = match state.library.lock() {
            Ok(guard) => guard,
            Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "library lock error"),
        };

        if let Err(err) = library.regenerate_html() {
            return err_json(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("library render error: {err}"),
            );
        }
        library.library_html_path().to_path_buf()
    };

    if let Err(err) = open_file_in_browser(&path) {
        return err_json(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("open library failed: {err}"),
        );
    }

    {
        let mut session = match state.session.lock() {
            Ok(guard) => guard,
            Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "session lock error"),
        };
        session.notices.post("Library page ready.");
    }

    ok_json(json!({ "path": path.display().to_string() }))
}

fn ok_json(payload: Value) -> ApiResponse {
    let mut body = serde_json::Map::new();
    body.insert("ok".to_string(), Value::Bool(true));

    if let Some(obj) = payload.as_object() {
        for (key, value) in obj {
            body.insert(key.clone(), value.clone());
        }
    } else if !payload.is_null() {
        body.insert("data".to_string(), payload);
    }

    (StatusCode::OK, Json(Value::Object(body)))
}

fn ok_snapshot(snapshot: UiSnapshot) -> ApiResponse {
    (
        StatusCode::OK,
        Json(json!({
            "ok": true,
            "rows": snapshot.rows,
            "free_text": snapshot.free_text,
            "preview": snapshot.preview,
            "composed": snapshot.composed,
            "library": snapshot.library,
            "gallery": snapshot.gallery,
            "expanded": snapshot.expanded,
            "theme": snapshot.theme,
            "notice": snapshot.notice,
            "notice_seq": snapshot.notice_seq,
        })),
    )
}

fn err_json(status: StatusCode, message: &str) -> ApiResponse {
    (
        status,
        Json(json!({
            "ok": false,
            "error": message,
        })),
    )
}

fn snapshot_response(state: &AppState) -> ApiResponse {
    let config = match state.config.lock() {
        Ok(guard) => guard,
        Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "config lock error"),
    };
    let session = match state.session.lock() {
        Ok(guard) => guard,
        Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "session lock error"),
    };
    let library = match state.library.lock() {
        Ok(guard) => guard,
        Err(_) => return err_json(StatusCode::INTERNAL_SERVER_ERROR, "library lock error"),
    };

    ok_snapshot(build_ui_snapshot(
        &config,
        &session,
        &library,
        &state.catalog,
    ))
}

fn build_ui_snapshot(
    config: &ConfigStore,
    session: &SessionState,
    library: &LibraryStore,
    catalog: &GalleryCatalog,
) -> UiSnapshot {
    let rows: Vec<SelectorRow> = config
        .selectors()
        .into_iter()
        .map(|selector| {
            let current = session
                .draft
                .value_for(&selector.key)
                .filter(|value| selector.choices.iter().any(|c| c == value))
                .map(ToOwned::to_owned);
            let selected =
                current.unwrap_or_else(|| selector.choices.first().cloned().unwrap_or_default());

            SelectorRow {
                key: selector.key,
                label: selector.label,
                choices: selector.choices,
                selected,
            }
        })
        .collect();

    let gallery = if session.gallery_expanded {
        catalog.items().to_vec()
    } else {
        session.gallery_sample.clone()
    };

    UiSnapshot {
        rows,
        free_text: session.draft.free_text.clone(),
        preview: session.preview(),
        composed: session.last_composed.clone(),
        library: library.prompts().to_vec(),
        gallery,
        expanded: session.gallery_expanded,
        theme: config.theme(),
        notice: session.notices.current().map(ToOwned::to_owned),
        notice_seq: session.notices.seq(),
    }
}

fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

fn bind_listener(preferred_port: u16) -> Result<TcpListener> {
    for offset in 0..200u16 {
        let port = preferred_port.saturating_add(offset);
        if port == 0 {
            continue;
        }

        if let Ok(listener) = TcpListener::bind(("127.0.0.1", port)) {
            return Ok(listener);
        }
    }

    Err(anyhow!("failed to bind server port"))
}

#[cfg(target_os = "windows")]
fn copy_to_system_clipboard(text: &str) -> Result<()> {
    clipboard_win::set_clipboard_string(text)
        .map_err(|err| anyhow!("failed to write clipboard: {err}"))
}

#[cfg(not(target_os = "windows"))]
fn copy_to_system_clipboard(_text: &str) -> Result<()> {
    Ok(())
}

#[cfg(target_os = "windows")]
fn to_wide_null(value: &std::ffi::OsStr) -> Vec<u16> {
    use std::os::windows::ffi::OsStrExt;
    value
        .encode_wide()
        .chain(std::iter::once(0))
        .collect::<Vec<u16>>()
}

#[cfg(target_os = "windows")]
fn open_file_in_browser(path: &Path) -> Result<()> {
    let operation = to_wide_null(std::ffi::OsStr::new("open"));
    let file = to_wide_null(path.as_os_str());

    let result = unsafe {
        windows_sys::Win32::UI::Shell::ShellExecuteW(
            std::ptr::null_mut(),
            operation.as_ptr(),
            file.as_ptr(),
            std::ptr::null(),
            std::ptr::null(),
            windows_sys::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL,
        )
    };
    let result_code = result as isize;
    if result_code <= 32 {
        return Err(anyhow!(
            "ShellExecuteW failed (code: {result_code}) for {}",
            path.display()
        ));
    }

    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn open_file_in_browser(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{build_ui_snapshot, normalize_url, AppState};
    use crate::catalog::GalleryCatalog;
    use crate::config_store::ConfigStore;
    use crate::library_store::LibraryStore;
    use std::fs;
    use std::sync::atomic::{AtomicU64, Ordering};

    static NEXT_FIXTURE_ID: AtomicU64 = AtomicU64::new(1);

    fn fixture_base() -> std::path::PathBuf {
        let mut base = std::env::temp_dir();
        let sequence = NEXT_FIXTURE_ID.fetch_add(1, Ordering::Relaxed);
        base.push(format!(
            "prompt_studio_server_test_{}_{}",
            std::process::id(),
            sequence
        ));
        let _ = fs::remove_dir_all(&base);
        fs::create_dir_all(&base).expect("mkdir fixture");
        base
    }

    fn fixture_state(base: &std::path::Path) -> AppState {
        let config = ConfigStore::new(base.join("config.toml")).expect("create config");
        let library = LibraryStore::new(base.to_path_buf()).expect("create library");
        let catalog = GalleryCatalog::load(base);
        AppState::new(config, library, catalog)
    }

    #[test]
    fn normalize_url_prepends_scheme_when_missing() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url("  example.com/a?b=c  "), "https://example.com/a?b=c");
        assert_eq!(normalize_url("https://example.com"), "https://example.com");
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
    }

    #[test]
    fn snapshot_reflects_draft_and_collapsed_sample() {
        let base = fixture_base();
        let state = fixture_state(&base);

        let config = state.config.lock().expect("config lock");
        let mut session = state.session.lock().expect("session lock");
        session.draft.subject = "a majestic dragon".to_string();
        let library = state.library.lock().expect("library lock");

        let snapshot = build_ui_snapshot(&config, &session, &library, &state.catalog);
        assert_eq!(snapshot.rows[0].selected, "a majestic dragon");
        assert!(!snapshot.expanded);
        assert_eq!(
            snapshot.gallery.len(),
            config.gallery_display_limit().min(state.catalog.items().len())
        );
        assert!(snapshot
            .preview
            .starts_with("a majestic dragon, oil painting, golden hour"));

        fs::remove_dir_all(base).ok();
    }

    #[test]
    fn snapshot_falls_back_to_first_choice_for_unknown_draft_value() {
        let base = fixture_base();
        let state = fixture_state(&base);

        let config = state.config.lock().expect("config lock");
        let mut session = state.session.lock().expect("session lock");
        session.draft.style = "not a configured choice".to_string();
        let library = state.library.lock().expect("library lock");

        let snapshot = build_ui_snapshot(&config, &session, &library, &state.catalog);
        let style_row = snapshot
            .rows
            .iter()
            .find(|row| row.key == "style")
            .expect("style row");
        assert_eq!(style_row.selected, style_row.choices[0]);

        fs::remove_dir_all(base).ok();
    }

    #[test]
    fn expanded_snapshot_returns_full_catalog_in_order() {
        let base = fixture_base();
        let state = fixture_state(&base);

        let config = state.config.lock().expect("config lock");
        let mut session = state.session.lock().expect("session lock");
        session.gallery_expanded = true;
        let library = state.library.lock().expect("library lock");

        let snapshot = build_ui_snapshot(&config, &session, &library, &state.catalog);
        let ids: Vec<u32> = snapshot.gallery.iter().map(|item| item.id).collect();
        let expected: Vec<u32> = state.catalog.items().iter().map(|item| item.id).collect();
        assert_eq!(ids, expected);

        fs::remove_dir_all(base).ok();
    }
}
