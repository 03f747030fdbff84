//! CLI entry point for the ad-click model pipeline.

use adclick_learning::{
    DEFAULT_ARTIFACT_PATH, LogNotifier, NotificationConfig, NotificationOutcome, OutboxNotifier,
    Pipeline, PipelineRun, SelectionConfig, predict_first,
};
use adclick_processing::{
    PipelineConfig, ReportWriter, default_candidate_paths, load_data, preprocess,
};
use anyhow::{Context, Result, anyhow};
use clap::Parser;
use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use tracing::{error, info, warn};

const SENDER_VAR: &str = "ADCLICK_NOTIFY_SENDER";
const RECIPIENTS_VAR: &str = "ADCLICK_NOTIFY_RECIPIENTS";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Ad-click model comparison pipeline",
    long_about = "Trains logistic regression, random forest and decision tree classifiers on the \
                  advertising click dataset and keeps the most accurate one.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  ADCLICK_NOTIFY_SENDER       Sender address of the success message\n  \
                  ADCLICK_NOTIFY_RECIPIENTS   Comma separated recipients; enables notification\n\n\
                  EXAMPLES:\n  \
                  # Train with the default dataset locations\n  \
                  adclick\n\n  \
                  # Explicit dataset and artifact path\n  \
                  adclick --data data/advertising.csv --model out/model.sav\n\n  \
                  # Reuse a saved model on the test split\n  \
                  adclick --predict"
)]
struct Args {
    /// Candidate dataset path, tried in the order given (repeatable)
    ///
    /// Defaults to dags/data/advertising.csv, data/advertising.csv, advertising.csv
    #[arg(short, long = "data")]
    data: Vec<PathBuf>,

    /// Where the selected model is written (or read with --predict)
    #[arg(short, long, default_value = DEFAULT_ARTIFACT_PATH)]
    model: PathBuf,

    /// Seed for the train/test shuffle and the random candidates
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of a human-readable summary
    ///
    /// Disables all logs; only the final JSON document is written.
    #[arg(long)]
    json: bool,

    /// Write notifications as JSON files into this directory instead of the log
    #[arg(long)]
    notify_outbox: Option<PathBuf>,

    /// Write dataset_report.json and selection_report.json into this directory
    #[arg(short = 'r', long)]
    report_dir: Option<PathBuf>,

    /// Skip training: reload the saved model and predict the first test row
    #[arg(long)]
    predict: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled so stdout
/// only carries JSON.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    dotenv().ok();

    let candidate_paths = if args.data.is_empty() {
        default_candidate_paths()
    } else {
        args.data.clone()
    };
    let data_config = PipelineConfig::builder()
        .candidate_paths(candidate_paths)
        .random_seed(args.seed)
        .build()?;

    if args.predict {
        return run_predict(&args, &data_config);
    }

    let selection = SelectionConfig::builder()
        .artifact_path(&args.model)
        .random_seed(args.seed)
        .build()?;

    let mut builder = Pipeline::builder().config(data_config).selection(selection);
    builder = match notification_from_env() {
        Some(notification) => {
            let builder = builder.notification(notification);
            match &args.notify_outbox {
                Some(dir) => builder.notifier(OutboxNotifier::new(dir)),
                None => builder.notifier(LogNotifier),
            }
        }
        None => {
            info!("{} not set, notification disabled", RECIPIENTS_VAR);
            builder
        }
    };

    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage,
                update.message
            );
        });
    }

    let pipeline = builder.build()?;
    match pipeline.run() {
        Ok(run) => {
            if let Some(dir) = &args.report_dir {
                let writer = ReportWriter::new(dir);
                writer.write(&run.summary, "dataset")?;
                writer.write(&run.selection, "selection")?;
            }
            print_run(&run, args.json)
        }
        Err(e) => {
            error!("Pipeline failed: {}", e);
            Err(anyhow!("Pipeline failed: {}", e))
        }
    }
}

/// Enabled notification settings when recipients are configured.
fn notification_from_env() -> Option<NotificationConfig> {
    let recipients = NotificationConfig::parse_recipients(&env::var(RECIPIENTS_VAR).ok()?);
    if recipients.is_empty() {
        warn!("{} is set but lists no recipients", RECIPIENTS_VAR);
        return None;
    }

    let sender = env::var(SENDER_VAR).unwrap_or_else(|_| "adclick@localhost".to_string());
    Some(NotificationConfig::enabled(sender, recipients))
}

fn run_predict(args: &Args, config: &PipelineConfig) -> Result<()> {
    let df = load_data(&config.candidate_paths)?;
    let split = preprocess(&df, config)?;
    let prediction = predict_first(&split, &args.model)
        .with_context(|| format!("Cannot predict with {}", args.model.display()))?;

    if args.json {
        let output = serde_json::json!({
            "model_path": args.model,
            "prediction": prediction,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Prediction for the first test row: {}", prediction);
    }
    Ok(())
}

/// Print the run summary.
///
/// Uses `println!` so the result stays visible regardless of log level.
fn print_run(run: &PipelineRun, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(run)?);
        return Ok(());
    }

    let selection = &run.selection;
    println!("\n{}", "=".repeat(60));
    println!("MODEL COMPARISON");
    println!("{}", "-".repeat(60));
    for score in &selection.all_scores {
        let marker = if score.name == selection.best_model_name {
            "*"
        } else {
            " "
        };
        println!("{} {:<24} {:>8.4}", marker, score.name, score.accuracy);
    }
    println!("{}", "-".repeat(60));
    println!("Best model: {}", selection.best_model_name);
    println!("Accuracy:   {:.4}", selection.accuracy);
    println!("Trained:    {}", selection.trained_at);
    println!("Saved to:   {}", selection.artifact_path.display());
    match &run.notification {
        NotificationOutcome::Sent => println!("Notification: sent"),
        NotificationOutcome::Skipped => println!("Notification: skipped"),
        NotificationOutcome::Failed(reason) => println!("Notification: failed ({})", reason),
    }
    println!("{}", "=".repeat(60));
    Ok(())
}
