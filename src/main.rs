use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::MatchedPath;
use dotenvy::dotenv;
use http::HeaderValue;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use project_api::bootstrap::app_context::{AppContext, AppServices};
use project_api::bootstrap::config::Config;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            project_api::presentation::http::admin::manage_projects,
            project_api::presentation::http::admin::create_project_form,
            project_api::presentation::http::admin::do_create_project,
            project_api::presentation::http::admin::modify_project_form,
            project_api::presentation::http::admin::do_modify_project,
            project_api::presentation::http::admin::confirm_remove_project,
            project_api::presentation::http::admin::do_remove_project,
            project_api::presentation::http::admin::reference_list,
            project_api::presentation::http::admin::download_file,
            project_api::presentation::http::portal::list_projects,
            project_api::presentation::http::portal::get_project,
            project_api::presentation::http::portal::create_project_form,
            project_api::presentation::http::portal::do_create_project,
            project_api::presentation::http::portal::modify_project_form,
            project_api::presentation::http::portal::do_modify_project,
            project_api::presentation::http::portal::confirm_remove_project,
            project_api::presentation::http::portal::do_remove_project,
            project_api::presentation::http::portal::download_file,
            project_api::presentation::http::health::health,
        ),
        components(schemas(
            project_api::presentation::http::forms::ProjectForm,
            project_api::presentation::http::forms::ProjectResponse,
            project_api::presentation::http::forms::ProjectFileResponse,
            project_api::presentation::http::forms::ReferenceItemResponse,
            project_api::presentation::http::admin::ManageProjectsResponse,
            project_api::presentation::http::admin::ProjectFormResponse,
            project_api::presentation::http::admin::RemoveConfirmation,
            project_api::presentation::http::portal::ProjectListResponse,
            project_api::presentation::http::health::HealthResp,
        )),
        tags(
            (name = "Admin Projects", description = "Back-office project management"),
            (name = "Projects", description = "Public project pages"),
            (name = "Health", description = "System health checks")
        )
    )]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "project_api=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(?cfg, "Starting project backend");

    // Database
    let pool = project_api::infrastructure::db::connect_pool(&cfg.database_url).await?;
    project_api::infrastructure::db::migrate(&pool).await?;

    // Ensure uploads dir exists
    if let Err(e) = tokio::fs::create_dir_all(&cfg.uploads_dir).await {
        tracing::warn!(error = ?e, dir = %cfg.uploads_dir, "Failed to create uploads dir");
    }

    let project_repo = Arc::new(
        project_api::infrastructure::db::repositories::project_repository_sqlx::SqlxProjectRepository::new(
            pool.clone(),
        ),
    );
    let file_store = Arc::new(project_api::infrastructure::storage::FsFileStore::new(
        std::path::PathBuf::from(&cfg.uploads_dir),
        cfg.public_base_url.clone(),
    ));
    let token_service = Arc::new(project_api::infrastructure::security::AesTokenService::new(
        &cfg.token_secret,
        cfg.token_ttl_secs,
    ));

    let services = AppServices::new(project_repo, file_store, token_service);
    let ctx = AppContext::new(cfg.clone(), services);

    // Build CORS
    let cors = if let Some(origin) = cfg.frontend_url.clone() {
        match HeaderValue::from_str(&origin) {
            Ok(v) => CorsLayer::new()
                .allow_origin(v)
                .allow_methods([
                    http::Method::GET,
                    http::Method::POST,
                    http::Method::PUT,
                    http::Method::DELETE,
                    http::Method::OPTIONS,
                ])
                .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
                .allow_credentials(true),
            Err(_) => CorsLayer::new()
                .allow_origin(AllowOrigin::mirror_request())
                .allow_methods([
                    http::Method::GET,
                    http::Method::POST,
                    http::Method::PUT,
                    http::Method::DELETE,
                    http::Method::OPTIONS,
                ])
                .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
                .allow_credentials(true),
        }
    } else if cfg.is_production {
        // In production, FRONTEND_URL is mandatory (enforced earlier), but fallback defensively to deny all
        CorsLayer::new()
            .allow_origin(AllowOrigin::exact(HeaderValue::from_static(
                "http://invalid",
            )))
            .allow_methods([
                http::Method::GET,
                http::Method::POST,
                http::Method::PUT,
                http::Method::DELETE,
                http::Method::OPTIONS,
            ])
            .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
    } else {
        // Development convenience
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods([
                http::Method::GET,
                http::Method::POST,
                http::Method::PUT,
                http::Method::DELETE,
                http::Method::OPTIONS,
            ])
            .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
            .allow_credentials(true)
    };

    // Build API router
    let app = Router::new()
        .nest(
            "/api",
            project_api::presentation::http::health::routes(pool.clone()),
        )
        .nest(
            "/api/admin",
            project_api::presentation::http::admin::routes(ctx.clone()),
        )
        .nest(
            "/api",
            project_api::presentation::http::portal::routes(ctx.clone()),
        )
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        // Global body size limit for uploads (configurable)
        .layer(DefaultBodyLimit::max(cfg.upload_max_bytes))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
