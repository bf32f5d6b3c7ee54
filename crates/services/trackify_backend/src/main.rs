// File: services/trackify_backend/src/main.rs
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use trackify_config::load_config;
use trackify_gpslogger::routes as gpslogger_routes;
use trackify_gpslogger::store::{JsonFileStore, MemoryStore, SnapshotStore};

#[tokio::main]
async fn main() {
    trackify_common::logging::init();

    let config = Arc::new(load_config().expect("Failed to load config"));

    // Tracker state survives restarts only with a configured state path
    let state_path = config
        .gpslogger
        .as_ref()
        .and_then(|gpslogger| gpslogger.state_path.clone());
    let store: Arc<dyn SnapshotStore> = match state_path {
        Some(path) => {
            Arc::new(JsonFileStore::open(path).expect("Failed to open snapshot store"))
        }
        None => {
            warn!("no gpslogger.state_path configured; tracker state will not survive restarts");
            Arc::new(MemoryStore::new())
        }
    };

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to Trackify API!" }))
        .merge(gpslogger_routes::routes(config.clone(), store));

    #[allow(unused_mut)] // for the openapi feature it needs to be mutable
    let mut app = Router::new().nest("/api", api_router);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use trackify_gpslogger::doc::GpsloggerApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Trackify API",
                version = "0.1.0",
                description = "Trackify Service API Docs",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            tags( (name = "Trackify", description = "Core service endpoints")),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(GpsloggerApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui =
            SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc.clone());
        app = app.merge(swagger_ui);
    }

    let app = app.layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await.unwrap();
    info!("Starting server at http://{}", addr);
    info!("Webhook endpoint available under http://{}/api/gpslogger", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .unwrap();
}
