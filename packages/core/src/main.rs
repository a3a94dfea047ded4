use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;

use trip_dashboard::cli::{parse_command, Cli, Command, HELP};
use trip_dashboard::config::Config;
use trip_dashboard::dashboard::{Dashboard, DashboardSurface};
use trip_dashboard::error::AppError;
use trip_dashboard::insights::provider::provider_for;
use trip_dashboard::logging::init_logging;
use trip_dashboard::services::trips_api::{TripsApiClient, TripsSource};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = Config::from_env().map_err(AppError::Config)?;
    config.apply_cli(&cli).map_err(AppError::Config)?;

    tracing::info!("Dashboard started with config: {:?}", config);

    let client = TripsApiClient::new(config.api_url.clone(), config.request_timeout())
        .map_err(|err| AppError::Client(err.to_string()))?;
    tracing::info!("Reading trips from {}", client.base_url());
    let source: Arc<dyn TripsSource> = Arc::new(client);
    let insights = provider_for(config.insights_source, source.clone());
    let dashboard = Dashboard::new(
        source,
        insights,
        DashboardSurface::default(),
        config.dashboard_options(),
    );

    let outcome = dashboard
        .load_page(cli.page.max(1), config.default_per_page, cli.filters())
        .await;
    tracing::debug!("Initial load: {:?}", outcome);
    print_surface(&dashboard).await;

    if cli.once {
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout()
            .flush()
            .map_err(|err| AppError::Io(err.to_string()))?;

        let line = tokio::select! {
            line = lines.next_line() => line.map_err(|err| AppError::Io(err.to_string()))?,
            _ = signal::ctrl_c() => {
                tracing::info!("Shutdown signal received.");
                None
            }
        };
        let Some(line) = line else {
            break;
        };

        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => println!("{}", HELP),
            Ok(Command::Show) => print_surface(&dashboard).await,
            Ok(Command::Action(action)) => {
                if dashboard.dispatch(action).await.is_none() {
                    println!("Nothing to do.");
                }
                print_surface(&dashboard).await;
            }
            Err(message) => println!("{}", message),
        }
    }

    Ok(())
}

async fn print_surface(dashboard: &Dashboard<DashboardSurface>) {
    let text = dashboard.with_surface(|surface| surface.to_string()).await;
    println!("{}", text);
}
