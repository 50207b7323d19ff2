use crate::{
    config::Config,
    cors::cors,
    engine::{
        emit::emit_events,
        frame::FrameFormat,
        heartbeat::run_heartbeats,
        response::render_text,
        ExecutionResult, Executor, PythonExecutor,
    },
    error::AppError,
    execution_id::ExecutionId,
    mcp::{
        prompts, resources,
        tools::{call_builtin, ExecuteArgs},
        CallToolResult, Catalog, CatalogError, PromptRequest, Tool, ToolCall,
    },
    sinks::{channel::into_body, FrameSink},
};

use anyhow::Context;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::{any::Any, net::SocketAddr, sync::Arc, time::Duration, time::Instant};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{Instrument, Span};

const EXECUTION_ID_HEADER: HeaderName = HeaderName::from_static("x-execution-id");

/* ---------------- state ---------------- */

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<dyn Executor>,
    pub catalog: Arc<Catalog>,
    pub server_name: Arc<str>,
    pub heartbeat_interval: Duration,
    /// Cancelled on server shutdown; persistent streams hang child tokens off it.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(cfg: &Config, shutdown: CancellationToken) -> Self {
        Self::with_executor(
            Arc::new(PythonExecutor::new(&cfg.executor)),
            cfg,
            shutdown,
        )
    }

    pub fn with_executor(
        executor: Arc<dyn Executor>,
        cfg: &Config,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            executor,
            catalog: Arc::new(Catalog::new()),
            server_name: Arc::from(cfg.server.name.as_str()),
            heartbeat_interval: cfg.streaming.heartbeat_interval(),
            shutdown,
        }
    }
}

/* ---------------- server ---------------- */

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(describe).fallback(not_found))
        .route("/tools", get(list_tools).fallback(not_found))
        .route("/tools/call", post(call_tool).fallback(not_found))
        .route("/stream/execute", post(stream_execute).fallback(not_found))
        .route("/stream/persistent", get(stream_persistent).fallback(not_found))
        .route("/prompts", get(list_prompts).fallback(not_found))
        .route("/prompts/get", post(get_prompt).fallback(not_found))
        .route("/resources", get(list_resources).fallback(not_found))
        .route(
            "/resources/templates",
            get(list_resource_templates).fallback(not_found),
        )
        .route("/resources/read", post(read_resource).fallback(not_found))
        .fallback(not_found)
        .with_state(state);

    with_layers(routes)
}

fn with_layers(routes: Router) -> Router {
    routes
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn(cors))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<Body>| {
                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        path = %req.uri().path(),
                    )
                })
                .on_response(|res: &Response, latency: Duration, _span: &Span| {
                    tracing::info!(
                        status = res.status().as_u16(),
                        latency_ms = latency.as_millis() as u64,
                        "request completed"
                    );
                }),
        )
}

pub async fn serve(cfg: &Config) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    let app = router(AppState::new(cfg, shutdown.clone()));

    let socket: SocketAddr = cfg
        .server
        .addr
        .parse()
        .with_context(|| format!("Invalid listen address: {}", cfg.server.addr))?;
    let listener = TcpListener::bind(socket)
        .await
        .with_context(|| format!("Failed to bind {}", socket))?;

    tracing::info!("{} listening on http://{}", cfg.server.name, listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("HTTP server error")?;

    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }

    tracing::info!("shutdown requested");
    shutdown.cancel();
}

/* ---------------- request models ---------------- */

#[derive(Debug, Deserialize)]
struct StreamExecuteRequest {
    #[serde(default)]
    code: Option<String>,
}

/// Bodies are parsed here rather than by the `Json` extractor so that a
/// malformed body is reported as a dispatch fault.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    let parsed = serde_json::from_slice(body).context("Invalid JSON request body")?;
    Ok(parsed)
}

/* ---------------- endpoints ---------------- */

async fn not_found() -> AppError {
    AppError::NotFound
}

async fn describe(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": &*state.server_name,
        "version": env!("CARGO_PKG_VERSION"),
        "description": "MCP tool server executing Python code with streaming output",
        "endpoints": [
            {"method": "GET", "path": "/", "description": "Server descriptor"},
            {"method": "GET", "path": "/tools", "description": "List tools"},
            {"method": "POST", "path": "/tools/call", "description": "Call a tool; set arguments.stream for ND-JSON events"},
            {"method": "POST", "path": "/stream/execute", "description": "Stream execution events for {code}"},
            {"method": "GET", "path": "/stream/persistent", "description": "Long-lived heartbeat stream"},
            {"method": "GET", "path": "/prompts", "description": "List prompts"},
            {"method": "POST", "path": "/prompts/get", "description": "Render a prompt"},
            {"method": "GET", "path": "/resources", "description": "List resources"},
            {"method": "GET", "path": "/resources/templates", "description": "List resource templates"},
            {"method": "POST", "path": "/resources/read", "description": "Read a resource"}
        ]
    }))
}

async fn list_tools(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "tools": state.catalog.tools }))
}

async fn call_tool(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let call: ToolCall = parse_body(&body)?;

    match call.resolve()? {
        Tool::ExecuteCode => {
            let args = ExecuteArgs::parse(&call.arguments)?;
            let code = args.code().ok_or_else(|| {
                CatalogError::InvalidArguments("Error: No code provided".to_string())
            })?;

            if args.stream {
                Ok(stream_execution(&state, code.to_string(), FrameFormat::negotiate(&headers)))
            } else {
                execute_sync(&state, code).await
            }
        }
        tool => {
            let text = call_builtin(tool, &call.arguments)?;
            Ok(Json(CallToolResult::text(text)).into_response())
        }
    }
}

async fn stream_execute(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let req: StreamExecuteRequest = parse_body(&body)?;

    let code = req
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("No code provided".to_string()))?;

    Ok(stream_execution(&state, code, FrameFormat::negotiate(&headers)))
}

async fn stream_persistent(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let format = FrameFormat::negotiate(&headers);
    let (mut sink, rx) = FrameSink::channel(format);

    let cancel = state.shutdown.child_token();
    sink.cancel_on_close(cancel.clone());

    let interval = state.heartbeat_interval;
    tokio::spawn(
        async move {
            run_heartbeats(interval, cancel, &mut sink).await;
        }
        .instrument(tracing::info_span!("persistent_stream")),
    );

    streaming_response(format, into_body(rx), true)
}

async fn list_prompts(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "prompts": state.catalog.prompts }))
}

async fn get_prompt(body: Bytes) -> Result<Response, AppError> {
    let req: PromptRequest = parse_body(&body)?;
    Ok(Json(prompts::render(&req)?).into_response())
}

async fn list_resources() -> impl IntoResponse {
    Json(json!({ "resources": [] }))
}

async fn list_resource_templates(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "resourceTemplates": state.catalog.resource_templates }))
}

async fn read_resource(body: Bytes) -> Result<Response, AppError> {
    let req: resources::ReadResourceRequest = parse_body(&body)?;
    Ok(Json(resources::read(&req.uri)?).into_response())
}

/* ---------------- execution paths ---------------- */

async fn execute_sync(state: &AppState, code: &str) -> Result<Response, AppError> {
    let execution_id = ExecutionId::new();
    let span = tracing::info_span!("execution", execution_id = %execution_id, mode = "sync");

    async {
        let started = Instant::now();
        let outcome = state.executor.execute(code).await?;
        let result = ExecutionResult::from(outcome);

        tracing::info!(
            success = result.success,
            duration_ms = started.elapsed().as_millis() as u64,
            "execution finished"
        );

        // Faults in submitted code are still a 200: the text carries them.
        let mut res = Json(CallToolResult::text(render_text(&result))).into_response();
        set_execution_id(&mut res, &execution_id);
        Ok::<_, AppError>(res)
    }
    .instrument(span)
    .await
}

fn stream_execution(state: &AppState, code: String, format: FrameFormat) -> Response {
    let execution_id = ExecutionId::new();
    let (mut sink, rx) = FrameSink::channel(format);
    let executor = Arc::clone(&state.executor);

    let span = tracing::info_span!("execution", execution_id = %execution_id, mode = "stream");
    let id = execution_id.clone();
    tokio::spawn(
        async move {
            emit_events(executor.as_ref(), &code, &id, &mut sink).await;
        }
        .instrument(span),
    );

    let mut res = streaming_response(format, into_body(rx), false);
    set_execution_id(&mut res, &execution_id);
    res
}

fn streaming_response(format: FrameFormat, body: Body, keep_alive: bool) -> Response {
    let mut res = (StatusCode::OK, body).into_response();
    let headers = res.headers_mut();

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(format.content_type()),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    if keep_alive {
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    }

    res
}

fn set_execution_id(res: &mut Response, execution_id: &ExecutionId) {
    if let Ok(value) = HeaderValue::from_str(&execution_id.0) {
        res.headers_mut().insert(EXECUTION_ID_HEADER, value);
    }
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(panic = %detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "Internal server error",
            "traceback": detail,
        })),
    )
        .into_response()
}
