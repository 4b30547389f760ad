use crate::config::Config;
use crate::db::{init_db, Database};
use crate::state::AppState;
use astra::Server;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod db;
mod domain;
mod errors;
mod responses;
mod router;
mod spreadsheets;
mod state;
mod templates;

#[cfg(test)]
mod tests;

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() {
    let cfg = Config::parse();
    init_tracing(&cfg.log_level);

    let db = Database::new(cfg.database_path.clone());
    if let Err(e) = init_db(&db, &cfg.schema_path) {
        error!(error = %e, "database initialization failed");
        std::process::exit(1);
    }

    let addr = match cfg.bind_addr() {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, "invalid bind address");
            std::process::exit(1);
        }
    };

    let state = AppState::new(db, cfg.strict_transitions);
    info!(
        %addr,
        workers = cfg.max_workers,
        strict_transitions = cfg.strict_transitions,
        "starting server"
    );

    let server = Server::bind(&addr).max_workers(cfg.max_workers);
    let result = server.serve(move |req, _info| router::respond(req, &state));

    if let Err(e) = result {
        error!(error = %e, "server ended with error");
        std::process::exit(1);
    }

    info!("server shut down cleanly");
}
