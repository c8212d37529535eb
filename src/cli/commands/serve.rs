//! Web stub server command.

use crate::cli::Output;
use crate::config::Settings;
use crate::web;

/// Run the web stub until interrupted.
pub async fn run_serve(host: Option<&str>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    let host = host.unwrap_or(&settings.server.host);
    let port = port.unwrap_or(settings.server.port);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("docquery web");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Landing page", "GET  /");
    Output::kv("Form echo", "POST /post");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, web::router()).await?;

    Ok(())
}
