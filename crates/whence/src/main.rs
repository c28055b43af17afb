//! CLI entry point.

mod app;
mod render;

use std::process::ExitCode;

use clap::Parser;

use crate::app::App;

fn main() -> ExitCode {
    let app = App::parse();
    if app.debug {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    match app::run(app) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
