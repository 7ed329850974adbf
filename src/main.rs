use std::sync::Arc;

use pagekit::config::Config;
use pagekit::handler::Router;
use pagekit::logger;
use pagekit::server::{self, connection::ConnectionSettings};

/// Config file used when none is given (extension optional)
const DEFAULT_CONFIG: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let cfg = Config::load_from(&config_path)?;

    // Tokio runtime sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    logger::init(&cfg)?;
    match cfg.to_toml() {
        Ok(text) => logger::log_debug(&format!("Effective configuration:\n{text}")),
        Err(e) => logger::log_warning(&format!("Cannot render configuration: {e}")),
    }

    let router = match Router::from_config(&cfg) {
        Ok(router) => Arc::new(router),
        Err(e) => {
            logger::log_error(&format!("Failed to load page templates: {}", e.chain()));
            return Err(e.into());
        }
    };

    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &cfg);

    server::run(listener, router, ConnectionSettings::from(&cfg.performance)).await
}
