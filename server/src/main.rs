use anyhow::Result;
use axum::Router;
use clap::Parser;
use clients::{GeminiJudge, SearchApiClient, ServiceArgs};
use server::{build_app, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[command(flatten)]
    services: ServiceArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let search = SearchApiClient::new(&args.services.search_config()?)?;
    let judge_config = args.services.judge_config()?;
    let (model_name, _) = clients::config::describe_model(&judge_config.model);
    tracing::info!(model = model_name, search_url = %args.services.search_url, "collaborators configured");
    let judge = GeminiJudge::new(&judge_config)?;

    let state = AppState::new(Arc::new(search), Arc::new(judge), judge_config.timeout);
    let app: Router = build_app(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
