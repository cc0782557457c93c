use std::sync::Arc;

mod config;
mod files;
mod handler;
mod http;
mod logger;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional config file path as the only argument
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg.logging)?;

    // Multi-threaded runtime, worker count from config or CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    // Root directories are fixed here for the whole process lifetime
    let state = Arc::new(config::AppState::new(cfg)?);
    let listener = server::create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &state);

    let signals = server::signal::SignalHandler::new();
    server::signal::start_signal_handler(&signals);

    server::start_server_loop(listener, state, Arc::clone(&signals.shutdown)).await;
    Ok(())
}
