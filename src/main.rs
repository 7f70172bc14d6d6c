use clap::{Parser, Subcommand};
use raincast::{
    ConditionsRequest, PowerClient, Raincast, RaincastError, DEFAULT_SIMILARITY_CUTOFF,
};
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "raincast", version, about = "Weather estimation for a place and date")]
struct Cli {
    /// Directory holding trained model artifacts.
    #[arg(long, global = true)]
    artifacts_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train the weather estimator from a region-indexed CSV.
    Train {
        #[arg(long, default_value = "data/weather.csv")]
        dataset: PathBuf,
    },
    /// Train the rain classifier from the downloaded master CSV.
    TrainClassifier {
        #[arg(long, default_value = "data/weather_master.csv")]
        dataset: PathBuf,
    },
    /// Estimate the weather for a location and date.
    Predict {
        /// Free-text place name; fuzzy-matched against the trained catalog.
        #[arg(required_unless_present = "json")]
        location: Option<String>,
        /// Date as YYYY-MM-DD.
        #[arg(required_unless_present = "json")]
        date: Option<String>,
        /// JSON conditions request (lat/lon, readings); uses the classifier.
        #[arg(long, conflicts_with_all = ["location", "date"])]
        json: Option<String>,
        /// Minimum fuzzy-match similarity before falling back to the
        /// character-set heuristic.
        #[arg(long, default_value_t = DEFAULT_SIMILARITY_CUTOFF)]
        cutoff: f64,
        /// Disable the month-dependent temperature correction.
        #[arg(long)]
        no_seasonal_adjustment: bool,
    },
    /// Download daily weather history from NASA POWER into a master CSV.
    Download {
        #[arg(long, default_value = "data")]
        out: PathBuf,
        #[arg(long, default_value_t = 2015)]
        start_year: i32,
        #[arg(long, default_value_t = 2024)]
        end_year: i32,
    },
}

fn build_client(
    artifacts_dir: Option<PathBuf>,
    cutoff: Option<f64>,
    seasonal_adjustment: Option<bool>,
) -> Result<Raincast, RaincastError> {
    Raincast::builder()
        .maybe_artifacts_dir(artifacts_dir)
        .maybe_similarity_cutoff(cutoff)
        .maybe_seasonal_adjustment(seasonal_adjustment)
        .build()
}

fn fail(message: String) -> i32 {
    println!("{}", json!({ "success": false, "error": message }));
    1
}

async fn run(cli: Cli) -> i32 {
    match cli.command {
        Command::Train { dataset } => {
            let client = match build_client(cli.artifacts_dir, None, None) {
                Ok(client) => client,
                Err(e) => return fail(e.to_string()),
            };
            match client.train(&dataset) {
                Ok(summary) => {
                    println!(
                        "{}",
                        json!({
                            "success": true,
                            "rows": summary.rows,
                            "locations": summary.locations,
                            "feature_columns": summary.feature_columns,
                        })
                    );
                    0
                }
                Err(e) => fail(e.to_string()),
            }
        }
        Command::TrainClassifier { dataset } => {
            let client = match build_client(cli.artifacts_dir, None, None) {
                Ok(client) => client,
                Err(e) => return fail(e.to_string()),
            };
            match client.train_classifier(&dataset) {
                Ok(summary) => {
                    println!(
                        "{}",
                        json!({
                            "success": true,
                            "rows": summary.rows,
                            "locations": summary.locations,
                            "feature_columns": summary.feature_columns,
                        })
                    );
                    0
                }
                Err(e) => fail(e.to_string()),
            }
        }
        Command::Predict {
            location,
            date,
            json: request_json,
            cutoff,
            no_seasonal_adjustment,
        } => {
            let client = match build_client(
                cli.artifacts_dir,
                Some(cutoff),
                Some(!no_seasonal_adjustment),
            ) {
                Ok(client) => client,
                Err(e) => return fail(e.to_string()),
            };
            let prediction = if let Some(request_json) = request_json {
                let request: ConditionsRequest = match serde_json::from_str(&request_json) {
                    Ok(request) => request,
                    Err(e) => return fail(format!("invalid request JSON: {e}")),
                };
                client.predict_conditions(&request)
            } else {
                // clap guarantees both are present without --json.
                client.predict(&location.unwrap_or_default(), &date.unwrap_or_default())
            };
            match serde_json::to_string_pretty(&prediction) {
                Ok(out) => {
                    println!("{out}");
                    0
                }
                Err(e) => fail(e.to_string()),
            }
        }
        Command::Download {
            out,
            start_year,
            end_year,
        } => {
            let client = PowerClient::new();
            match client.download_master(&out, start_year, end_year).await {
                Ok(path) => {
                    println!("{}", json!({ "success": true, "dataset": path }));
                    0
                }
                Err(e) => fail(e.to_string()),
            }
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();
    std::process::exit(run(cli).await);
}
