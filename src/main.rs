use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use provider_match::config::Settings;
use provider_match::core::Matcher;
use provider_match::routes::{self, matches::AppState};
use provider_match::services::{Catalogue, CityGazetteer, CosineSimilarity};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// JSON error response for malformed request payloads
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)).json(self)
    }
}

fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

fn handle_query_payload_error(err: error::QueryPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("Query error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }

    info!("Starting provider matching service...");

    // Nothing is scored until the whole policy validates
    let scoring = settings
        .scoring_config()
        .map_err(|e| startup_error("Invalid scoring configuration", e))?;
    let classifier = settings
        .impact_classifier()
        .map_err(|e| startup_error("Invalid impact table", e))?;

    info!(
        "Scoring policy loaded: {} impact entries, default level {}, min score {}, top {}",
        classifier.len(),
        classifier.default_level(),
        scoring.ranking.min_score(),
        scoring.ranking.max_results()
    );

    let gazetteer = match &settings.data.gazetteer_path {
        Some(path) => CityGazetteer::load(path),
        None => CityGazetteer::builtin(),
    }
    .map_err(|e| startup_error("Failed to load gazetteer", e))?;

    info!("Gazetteer loaded with {} cities", gazetteer.len());

    let catalogue = Catalogue::load(&settings.data.catalogue_path)
        .map_err(|e| startup_error("Failed to load catalogue", e))?;

    info!(
        "Catalogue loaded from {}: {} needs, {} providers",
        settings.data.catalogue_path,
        catalogue.needs.len(),
        catalogue.providers.len()
    );

    let domain_filter = settings
        .domain_filter()
        .map_err(|e| startup_error("Invalid domain rules", e))?;

    let mut matcher = Matcher::new(scoring, classifier, Arc::new(gazetteer), Arc::new(CosineSimilarity));
    if let Some(filter) = domain_filter {
        info!("Expertise-domain pre-filter enabled");
        matcher = matcher.with_domain_filter(filter);
    }

    let app_state = AppState {
        catalogue: Arc::new(catalogue),
        matcher,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
