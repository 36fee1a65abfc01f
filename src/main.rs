use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing::info;

use stroke_risk::data_access::{CollectionSource, CsvCollectionSource, MongoCollectionSource};
use stroke_risk::predict_pipeline::HeartStrokeClassifier;
use stroke_risk::server::{run_server, AppState, IndexTemplate, ServerConfig};
use stroke_risk::train_pipeline::{TrainPipeline, TrainRunner};

#[derive(Parser, Debug)]
#[command(author, version, about = "Stroke risk training pipeline and prediction service")]
struct Cli {
    /// Read the collection from a raw CSV snapshot instead of MongoDB
    #[arg(long, global = true, env = "STROKE_CSV")]
    csv: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the form page, /train and predictions (default)
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run the full training pipeline once
    Train,
    /// Run data ingestion only
    Ingest,
}

fn collection_source(csv: Option<PathBuf>) -> Arc<dyn CollectionSource> {
    match csv {
        Some(path) => Arc::new(CsvCollectionSource::new(path)),
        None => Arc::new(MongoCollectionSource::from_env()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stroke_risk=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let start_time = Instant::now();

    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => {
            let mut config = ServerConfig::default();
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            // The database is only contacted when /train is hit.
            let state = AppState::new(
                Arc::new(TrainPipeline::new(collection_source(cli.csv))),
                Arc::new(HeartStrokeClassifier::from_env()),
                IndexTemplate::from_dir(&config.template_dir),
            );
            run_server(config, Arc::new(state)).await?;
        }
        Commands::Train => {
            let pipeline = TrainPipeline::new(collection_source(cli.csv));
            let summary = pipeline.run_pipeline().await?;
            info!(
                run = %summary.run,
                train_accuracy = summary.metrics.train_accuracy,
                test_accuracy = summary.metrics.test_accuracy,
                cv_accuracy = ?summary.metrics.cv_accuracy,
                model = %summary.saved_model_path.display(),
                elapsed = ?start_time.elapsed(),
                "Training complete"
            );
        }
        Commands::Ingest => {
            let pipeline = TrainPipeline::new(collection_source(cli.csv));
            let artifact = pipeline.run_ingestion().await?;
            info!(
                train = %artifact.trained_file_path.display(),
                test = %artifact.test_file_path.display(),
                elapsed = ?start_time.elapsed(),
                "Ingestion complete"
            );
        }
    }

    Ok(())
}
