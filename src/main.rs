use std::sync::Arc;

mod chat;
mod config;
mod handler;
mod http;
mod inference;
mod logger;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

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
    let listener = server::create_reusable_listener(addr)?;

    let backend = Arc::new(inference::WorkersAiClient::new(cfg.inference.clone())?);
    let state = Arc::new(config::AppState::new(&cfg, backend));

    logger::log_server_start(&addr, &cfg);
    server::run(listener, state).await?;
    Ok(())
}
