//! `wqmon` — water quality classification API server.
//!
//! Loads configuration, loads the model once at startup (degrading to the
//! threshold classifier if that fails), prints the startup banner, and
//! serves until the listening socket fails.

use std::process::ExitCode;
use std::sync::Arc;

use wqmon_service::classify::{DecisionTreeModel, ModelError, Predictor, RemoteModel};
use wqmon_service::config::{Config, ModelConfig};
use wqmon_service::handler::ClassifierService;
use wqmon_service::logging::{self, Component};
use wqmon_service::server::HttpServer;

fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };

    let level = match config.log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init_logger(
        level,
        config.logging.file.as_deref(),
        config.logging.console_timestamps,
    );

    let model = load_model(&config.model);
    let service = Arc::new(ClassifierService::new(model));

    let server = match HttpServer::bind(&config.bind_address()) {
        Ok(server) => server,
        Err(e) => {
            logging::error(
                Component::System,
                None,
                &format!("failed to bind {}: {}", config.bind_address(), e),
            );
            return ExitCode::FAILURE;
        }
    };

    print_banner(&config, &service);
    server.run(config.server.workers, service);
    ExitCode::SUCCESS
}

/// Loads the configured model. A configured sidecar takes precedence over
/// the local tree; any failure leaves the service in threshold-only mode.
fn load_model(config: &ModelConfig) -> Option<Box<dyn Predictor>> {
    let loaded: Result<Box<dyn Predictor>, ModelError> = match (&config.remote_url, &config.path) {
        (Some(url), _) => {
            logging::info(Component::Model, None, &format!("Using remote model at: {}", url));
            RemoteModel::new(url, config.timeout()).map(|m| Box::new(m) as Box<dyn Predictor>)
        }
        (None, Some(path)) => {
            logging::info(
                Component::Model,
                None,
                &format!("Loading model from: {}", path.display()),
            );
            DecisionTreeModel::load(path).map(|m| Box::new(m) as Box<dyn Predictor>)
        }
        (None, None) => {
            logging::info(
                Component::Model,
                None,
                "No model configured, using threshold classification",
            );
            return None;
        }
    };

    match loaded {
        Ok(model) => {
            logging::info(
                Component::Model,
                None,
                &format!("✅ Model loaded successfully: {}", model.describe()),
            );
            Some(model)
        }
        Err(e) => {
            logging::error(
                Component::Model,
                None,
                &format!("Error loading model, falling back to thresholds: {}", e),
            );
            None
        }
    }
}

fn print_banner(config: &Config, service: &ClassifierService) {
    let rule = "=".repeat(60);
    println!("\n{}", rule);
    println!("🚀 Water Quality Classification API");
    println!("{}", rule);
    println!("API running on: http://{}", config.bind_address());
    match service.model_description() {
        Some(model) => println!("Model: {}", model),
        None => println!("Model: not loaded (threshold classification)"),
    }
    println!("\nEndpoints:");
    println!("  GET  /health    - Health check");
    println!("  POST /classify  - Classify water quality");
    println!("\nExample request:");
    println!("  POST http://{}/classify", config.bind_address());
    println!(r#"  {{"ph": 7.0, "tds": 200, "suhu": 24, "do": 5.0}}"#);
    println!("{}\n", rule);
}
