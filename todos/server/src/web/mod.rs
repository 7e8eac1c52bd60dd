use axum::Router;
use axum::response::Json;
use axum::routing::get;
use migration::MigratorTrait;
use sea_orm::Database;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::Config;
use crate::todo::SeaOrmTodoStore;
use crate::todo::api::v1::TodoState;

pub mod api;

/// OpenAPI description of the JSON API.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::todo::api::v1::list_todos_handler,
        crate::todo::api::v1::create_todo_handler,
        crate::todo::api::v1::update_todo_handler,
        crate::todo::api::v1::delete_todo_handler,
    ),
    components(schemas(
        crate::todo::api::v1::TodoJson,
        crate::todo::api::v1::CreateTodoRequest,
        crate::todo::api::v1::UpdateTodoRequest,
        api::v1::ErrorResponse,
        api::v1::MessageResponse,
    )),
    tags((name = "Todos", description = "Task tracking"))
)]
pub struct ApiDoc;

/// Builds the full application router: JSON API, health check and OpenAPI document,
/// wrapped in tracing, panic recovery and permissive CORS.
pub fn create_app(todo_state: Arc<TodoState>) -> Router {
    let router = Router::new()
        .route("/health", get(health_check_handler))
        .route("/api-docs/openapi.json", get(openapi_handler))
        .merge(api::create_api_router(todo_state));
    apply_layers(router)
}

/// Wraps `router` in the middleware shared by every route.
fn apply_layers(router: Router) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::new())
            .layer(CorsLayer::permissive()),
    )
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let db = Database::connect(&config.db_url).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let todo_state = Arc::new(TodoState::new(Arc::new(SeaOrmTodoStore::new(db))));
    let app = create_app(todo_state);

    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}

pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
