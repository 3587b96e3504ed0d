//! Tic-tac-toe server for the browser client.
//!
//! `GRIDDUEL_ADDR` sets the listen address (default `0.0.0.0:3000`);
//! `RUST_LOG` sets the log filter (default `info`).

use gridduel::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

fn listen_addr(configured: Option<String>) -> String {
    configured
        .filter(|addr| !addr.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ADDR.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = listen_addr(std::env::var("GRIDDUEL_ADDR").ok());

    let server = GridduelServer::builder().bind(&addr).build().await?;
    tracing::info!(addr = %server.local_addr()?, "tic-tac-toe server listening");

    server.run().await?;
    Ok(())
}
