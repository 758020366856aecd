use std::time::Duration;

use clap::Parser;
use cli::{HttpComparisonService, parse_point, replay_clicks, report::render_text};
use frontend::{ComparisonService, ComparisonSession, SessionConfig, SessionError};
use shared::GeoPoint;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Compare candidate routes between two map points"
)]
struct Args {
    /// Root URL of the comparison service (defaults to ROUTE_COMPARE_API or http://localhost:8000)
    #[arg(long)]
    api: Option<String>,

    /// Margin added around the fitted viewport, in degrees
    #[arg(long)]
    padding: Option<f64>,

    /// Timeout of each HTTP request, in seconds
    #[arg(long, default_value_t = 20)]
    timeout_secs: u64,

    /// Map click as `lat,lon`; repeat it, two clicks pick start and end
    #[arg(long = "click", value_parser = parse_point)]
    clicks: Vec<GeoPoint>,

    /// Candidate to select once routes are loaded
    #[arg(long)]
    select: Option<String>,

    /// Print the session snapshot as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Only query the service health endpoint
    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cli=info,frontend=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let mut config = SessionConfig::from_env();
    if let Some(api) = args.api {
        config = config.with_api_root(api);
    }
    if let Some(padding) = args.padding {
        config.fit_padding = padding;
    }

    let service = HttpComparisonService::new(&config, Duration::from_secs(args.timeout_secs))?;
    tracing::info!("using comparison service at {}", config.api_root);

    if args.health {
        let status = service.check_health().await?;
        println!("service ok={}", status.ok);
        return Ok(());
    }

    let mut session = ComparisonSession::new(config);
    let outcomes = replay_clicks(&mut session, &service, &args.clicks).await;
    if outcomes.is_empty() {
        return Err(SessionError::InvalidRequest.into());
    }

    if let Some(id) = &args.select {
        if !session.select_route(id) {
            tracing::warn!(
                "no candidate named {id}, keeping {}",
                session.route_set().selected_id().unwrap_or("no selection")
            );
        }
    }

    let snapshot = session.snapshot();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", render_text(&snapshot));
    }

    match outcomes.into_iter().last() {
        Some(Err(err)) => Err(err.into()),
        _ => Ok(()),
    }
}
