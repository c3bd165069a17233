//! # Server Configuration
//!
//! Router assembly, middleware ordering and the serve loop for the ShipStack
//! API.
//!
//! Request pipeline, outermost first:
//!
//! 1. tenant prefix normalization (wraps the router so routing sees the
//!    rewritten path)
//! 2. trace context
//! 3. HTTP tracing
//! 4. CORS
//! 5. request context (session + tenant resolution)
//! 6. per-route access gate
//! 7. handler

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router, ServiceExt,
    extract::Request,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    routing::get,
};
use sea_orm::DatabaseConnection;
use tower::Layer;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::access::{AccessTier, access_gate};
use crate::config::{AppConfig, ConfigError};
use crate::context::context_middleware;
use crate::db;
use crate::handlers::{self, procedures};
use crate::repositories::{SessionRepository, TenantRepository};
use crate::session::{DatabaseSessionProvider, SessionProvider, SessionTokenReader};
use crate::telemetry::trace_context_middleware;
use crate::tenant::{IdentifierChain, TenantPrefix, TenantPrefixLayer, TenantResolver};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub sessions: Arc<dyn SessionProvider>,
    pub identifiers: Arc<IdentifierChain>,
    pub resolver: TenantResolver,
}

impl AppState {
    /// Wires the database-backed session provider and tenant resolver.
    pub fn new(config: Arc<AppConfig>, db: DatabaseConnection) -> Result<Self, ConfigError> {
        let shared = Arc::new(db.clone());
        let reader = SessionTokenReader::from_config(&config)?;
        let sessions = DatabaseSessionProvider::new(reader, SessionRepository::new(shared.clone()));
        let identifiers = IdentifierChain::new(&config.tenancy)?;
        let resolver = TenantResolver::new(Arc::new(TenantRepository::new(shared)));

        Ok(Self {
            config,
            db,
            sessions: Arc::new(sessions),
            identifiers: Arc::new(identifiers),
            resolver,
        })
    }
}

/// The routed application wrapped in tenant prefix normalization.
pub type App = TenantPrefix<Router>;

/// Creates and configures the application service
pub fn create_app(state: AppState) -> App {
    let reserved = state.identifiers.reserved_segments().clone();
    let cors = cors_layer(&state.config);

    let tenant_scoped = Router::new()
        .route(
            "/rpc/privateData",
            get(procedures::private_data).post(procedures::private_data),
        )
        .route("/api/private-data", get(procedures::private_data))
        .route_layer(middleware::from_fn_with_state(
            AccessTier::TenantScoped,
            access_gate,
        ));

    let router = Router::new()
        .route("/", get(handlers::root))
        .route("/session", get(handlers::current_session))
        .route("/readyz", get(handlers::readyz))
        .route(
            "/rpc/healthCheck",
            get(procedures::health_check).post(procedures::health_check),
        )
        .route("/api/health-check", get(procedures::health_check))
        .merge(tenant_scoped)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            context_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_context_middleware))
        .with_state(state);

    TenantPrefixLayer::new(reserved).layer(router)
}

/// CORS policy. Credentials are only allowed with an explicit origin list.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let mut headers = vec![header::CONTENT_TYPE, header::AUTHORIZATION];
    headers.extend(
        [&config.tenancy.id_header, &config.tenancy.slug_header]
            .into_iter()
            .filter_map(|name| HeaderName::from_bytes(name.as_bytes()).ok()),
    );

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(headers);

    if config.cors_allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}

/// Connects to the database, applies migrations when asked and serves until
/// a shutdown signal arrives.
pub async fn run_server(config: AppConfig, migrate_only: bool) -> anyhow::Result<()> {
    let db = db::init_pool(&config).await?;

    if config.run_migrations || migrate_only {
        db::run_migrations(&db).await?;
    }

    if migrate_only {
        tracing::info!("Migrations complete; exiting");
        return Ok(());
    }

    let addr = config.bind_addr().context("Invalid server address")?;
    let config = Arc::new(config);
    let state = AppState::new(config.clone(), db).context("Failed to build application state")?;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, profile = %config.profile, "Server listening");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::current_session,
        crate::handlers::readyz,
        crate::handlers::procedures::health_check,
        crate::handlers::procedures::private_data,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::models::TenantRole,
            crate::error::ApiError,
            crate::handlers::types::SessionResponse,
            crate::handlers::types::SessionInfo,
            crate::handlers::types::UserInfo,
            crate::handlers::types::TenantInfo,
            crate::handlers::types::MembershipInfo,
            crate::handlers::types::PrivateDataResponse,
        )
    ),
    info(
        title = "ShipStack API",
        description = "Multi-tenant API with session-based access control",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
