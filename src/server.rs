//! # Server Configuration
//!
//! Router assembly, shared state and the HTTP listener for the Inventory API.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router, middleware,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post, put},
};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{TokenService, auth_middleware};
use crate::config::AppConfig;
use crate::handlers;
use crate::telemetry::trace_id_middleware;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    /// Builds state from validated configuration and an open pool.
    pub fn new(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<Self> {
        let tokens = TokenService::from_config(&config).context("Invalid token configuration")?;
        Ok(Self {
            config: Arc::new(config),
            db,
            tokens: Arc::new(tokens),
        })
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/signup", post(handlers::accounts::signup))
        .route("/login", post(handlers::accounts::login))
        .route("/companies", get(handlers::accounts::list_companies));

    let protected = Router::new()
        .route("/users/pending", get(handlers::users::list_pending_users))
        .route("/users/{id}/verify", put(handlers::users::verify_user))
        .route("/users/{id}/reject", delete(handlers::users::reject_user))
        .route(
            "/items",
            post(handlers::items::create_item).get(handlers::items::list_items),
        )
        .route(
            "/items/{id}",
            get(handlers::items::get_item)
                .put(handlers::items::update_item)
                .delete(handlers::items::delete_item),
        )
        .route(
            "/categories",
            post(handlers::categories::create_category)
                .get(handlers::categories::list_categories),
        )
        .route(
            "/categories/{id}",
            get(handlers::categories::get_category)
                .put(handlers::categories::update_category)
                .delete(handlers::categories::delete_category),
        )
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.tokens),
            auth_middleware,
        ));

    let cors = cors_layer(&state.config.cors_allowed_origins);

    public
        .merge(protected)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(trace_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// CORS policy. An empty origin list allows any origin without credentials;
/// an explicit list allows credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    layer
        .allow_origin(AllowOrigin::list(parsed))
        .allow_credentials(true)
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<()> {
    let addr = config
        .bind_addr()
        .with_context(|| format!("Invalid server address: {}", config.api_bind_addr))?;
    let profile = config.profile.clone();

    let app = create_app(AppState::new(config, db)?);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::accounts::signup,
        crate::handlers::accounts::login,
        crate::handlers::accounts::list_companies,
        crate::handlers::users::verify_user,
        crate::handlers::users::reject_user,
        crate::handlers::users::list_pending_users,
        crate::handlers::items::create_item,
        crate::handlers::items::list_items,
        crate::handlers::items::get_item,
        crate::handlers::items::update_item,
        crate::handlers::items::delete_item,
        crate::handlers::categories::create_category,
        crate::handlers::categories::list_categories,
        crate::handlers::categories::get_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::error::ApiError,
            crate::auth::Role,
            crate::handlers::HealthResponse,
            crate::handlers::types::MessageResponse,
            crate::handlers::types::UserDto,
            crate::handlers::types::CompanyDto,
            crate::handlers::accounts::SignupRequestDto,
            crate::handlers::accounts::SignupResponse,
            crate::handlers::accounts::LoginRequestDto,
            crate::handlers::accounts::LoginResponse,
            crate::handlers::accounts::LoginUserDto,
            crate::handlers::users::VerifyUserResponse,
            crate::handlers::users::PendingUsersResponse,
            crate::handlers::items::ItemRequest,
            crate::handlers::items::ItemDto,
            crate::handlers::items::ItemsPageResponse,
            crate::handlers::categories::CreateCategoryRequest,
            crate::handlers::categories::UpdateCategoryRequest,
            crate::handlers::categories::CategoryDto,
        )
    ),
    modifiers(&BearerSecurity),
    info(
        title = "Inventory API",
        description = "Multi-tenant inventory management with company-scoped access control",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_protected_routes_with_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).unwrap();

        assert!(json["paths"]["/items/{id}"]["put"].is_object());
        assert!(json["paths"]["/users/{id}/verify"]["put"].is_object());
        assert_eq!(
            json["components"]["securitySchemes"]["bearer_auth"]["scheme"],
            "bearer"
        );
    }

    #[test]
    fn cors_layer_accepts_explicit_origins() {
        use tower::Layer;

        // Credentials with a wildcard origin panics when layered.
        let _ = cors_layer(&["http://localhost:3000".to_string()]).layer(());
        let _ = cors_layer(&[]).layer(());
    }
}
