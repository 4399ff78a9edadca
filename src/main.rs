use std::sync::Arc;

use spa_server::config::{AppState, Config};
use spa_server::logger;
use spa_server::server::{wait_for_shutdown, Server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;
    logger::init(&cfg)?;

    // Tokio runtime sized by the `workers` setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::new(&cfg)?);
    let server = Server::bind(Arc::clone(&state))?;

    logger::log_server_start(&server.local_addr()?, &state);
    server.run(wait_for_shutdown()).await;
    Ok(())
}
