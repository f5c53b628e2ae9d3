//! Serve command - run the HTTP lookup form and JSON endpoint.

use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the serve command until Ctrl+C.
pub fn run(runner: &CliRunner, bind: Option<SocketAddr>) -> Result<(), CliError> {
    runner.log_startup("serve");

    let bind = bind.unwrap_or(runner.config().server.bind);
    let app = runner.start_app(None)?;

    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("Received shutdown signal, stopping server...");
        shutdown_clone.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    println!(
        "Serving stock lookups from {} source(s) on http://{}",
        app.registry().len(),
        bind
    );
    println!("Press Ctrl+C to stop.");
    info!(%bind, "HTTP server starting");

    let served = app.runtime_handle().block_on(stockfan::server::serve(
        bind,
        app.lookup_service(),
        shutdown,
    ));

    let metrics = app.metrics().snapshot();
    app.shutdown_sync();
    served.map_err(|e| CliError::Serve(format!("{}: {}", bind, e)))?;

    println!();
    println!("Session Statistics");
    println!("──────────────────");
    println!("{}", metrics);
    Ok(())
}
