mod repl;
mod route;
mod search;
mod terminal_map;
mod view;

use clap::{Args, Parser, Subcommand};
use talkmap_client::{ApiClient, TravelMode};
use talkmap_core::{AppConfig, GeoPoint, SAMPLE_QUERIES};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "talkmap")]
#[command(about = "Natural-language place search on the command line")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one search and print the ranked results
    Search {
        /// Free-text query, e.g. "东方明珠塔附近1公里内的星巴克"
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Interactive search session
    Repl {
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Plan a route between two points
    Route {
        #[arg(long, allow_negative_numbers = true)]
        from_lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        from_lng: f64,
        #[arg(long, allow_negative_numbers = true)]
        to_lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        to_lng: f64,
        /// walking, driving or transit
        #[arg(long, default_value_t = TravelMode::Walking)]
        mode: TravelMode,
    },
    /// Check that the backend is reachable
    Health,
    /// Print example queries
    Samples,
}

/// Where the user is. Both or neither must be given.
#[derive(Debug, Default, Args)]
struct LocationArgs {
    /// Reference latitude (defaults to `TALKMAP_DEFAULT_LAT`)
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,
    /// Reference longitude (defaults to `TALKMAP_DEFAULT_LNG`)
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,
}

impl LocationArgs {
    /// Resolves the reference point, falling back to the configured default.
    fn resolve(&self, config: &AppConfig) -> anyhow::Result<GeoPoint> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Ok(GeoPoint::new(lat, lng)?),
            _ => {
                tracing::info!(
                    reference = %config.default_location,
                    "no position given; using the default reference location"
                );
                Ok(config.default_location)
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = talkmap_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let api = ApiClient::from_config(&config)?;
    tracing::debug!(env = %config.env, api = %api.base_url(), "talkmap starting");

    let command = cli.command.unwrap_or(Commands::Repl {
        location: LocationArgs::default(),
    });
    match command {
        Commands::Search { text, location } => {
            let reference = location.resolve(&config)?;
            search::run_search(&config, &api, &text.join(" "), reference).await?;
        }
        Commands::Repl { location } => {
            let reference = location.resolve(&config)?;
            repl::run_repl(&config, &api, reference).await?;
        }
        Commands::Route {
            from_lat,
            from_lng,
            to_lat,
            to_lng,
            mode,
        } => {
            let origin = GeoPoint::new(from_lat, from_lng)?;
            let destination = GeoPoint::new(to_lat, to_lng)?;
            route::run_route(&api, origin, destination, mode).await?;
        }
        Commands::Health => {
            let status = api.health().await?;
            println!("{}: {status}", api.base_url());
        }
        Commands::Samples => print_samples(),
    }

    Ok(())
}

fn print_samples() {
    for (i, query) in SAMPLE_QUERIES.iter().enumerate() {
        println!("{:>2}. {query}", i + 1);
    }
}
