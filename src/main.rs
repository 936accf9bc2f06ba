//! # minihttp - Entry Point
//! src/main.rs

use minihttp::config::Config;
use minihttp::error::ServerError;
use minihttp::logging;
use minihttp::server::Server;

fn run(config: &Config) -> Result<(), ServerError> {
    let server = Server::bind(config)?;
    server.run()
}

fn main() {
    let config = Config::new();
    logging::init(&config.log_level);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "minihttp starting");

    if let Err(e) = run(&config) {
        tracing::error!(error = %e, "fatal error");
        std::process::exit(1);
    }
}
