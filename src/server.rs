use axum::{
    extract::{DefaultBodyLimit, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::SecurityConfig;
use crate::handlers;
use crate::middleware::{authenticate, require_admin};
use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Authenticated
        .merge(finance_routes(&state))
        // Authenticated + admin
        .merge(admin_routes(&state))
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes));

    if let Some(cors) = cors_layer(&state.config.security) {
        router = router.layer(cors);
    }
    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let bind_addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Finance API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
}

fn finance_routes(state: &AppState) -> Router<AppState> {
    use handlers::protected::finance;

    Router::new()
        .route("/finance/submit", post(finance::submit_post))
        .route_layer(from_fn_with_state(state.clone(), authenticate))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    use handlers::elevated::admin;

    // Layers run outermost-last: authenticate, then require_admin
    Router::new()
        .route("/admin/users", get(admin::users_get))
        .route("/admin/users/:id", put(admin::user_put).delete(admin::user_delete))
        .route("/admin/users/:id/role", put(admin::user_role_put))
        .route("/admin/finance/financial-inputs", get(admin::financial_inputs_get))
        .route(
            "/admin/finance/financial-inputs/:id",
            put(admin::financial_inputs_put).delete(admin::financial_inputs_delete),
        )
        .route_layer(from_fn_with_state(state.clone(), require_admin))
        .route_layer(from_fn_with_state(state.clone(), authenticate))
}

/// Explicit origins when configured, any origin otherwise
fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }
    if security.cors_origins.is_empty() {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE]),
    )
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Finance API",
            "version": version,
            "description": "Revenue and profit submissions with an admin management surface",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/auth/register, /auth/login (public - account creation and token acquisition)",
                "finance": "/finance/submit (protected)",
                "admin_users": "/admin/users[/:id[/role]] (admin)",
                "admin_finance": "/admin/finance/financial-inputs[/:id] (admin)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": true,
                    "message": "Database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
