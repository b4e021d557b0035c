use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use env_logger::{Builder, Env};
use log::{LevelFilter, error, info};
use tabreg::io::{load_csv, save_plot_series};
use tabreg::{Pipeline, PipelineConfig, PipelineReport, Result};

#[derive(Parser)]
#[command(name = "tabreg")]
#[command(about = "Fit a linear regression to a CSV table and report test accuracy")]
#[command(version)]
struct Cli {
    /// CSV file with a header row
    data: PathBuf,

    /// JSON pipeline configuration; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Target column
    #[arg(short, long)]
    target: Option<String>,

    /// Comma-separated feature columns (default: every other column)
    #[arg(long, value_delimiter = ',')]
    features: Option<Vec<String>>,

    #[arg(long)]
    test_fraction: Option<f64>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(short, long)]
    epochs: Option<usize>,

    #[arg(long)]
    learning_rate: Option<f64>,

    /// Write (y_true, y_pred) sorted by y_true to this CSV file
    #[arg(long)]
    series_out: Option<PathBuf>,

    /// Print metrics as JSON instead of text
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(target) = &self.target {
            config.target = target.clone();
        }
        if let Some(features) = &self.features {
            config.features = Some(features.clone());
        }
        if let Some(test_fraction) = self.test_fraction {
            config.test_fraction = test_fraction;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(epochs) = self.epochs {
            config.epochs = epochs;
        }
        if let Some(learning_rate) = self.learning_rate {
            config.adam.learning_rate = learning_rate;
        }
        Ok(config)
    }
}

fn print_report(report: &PipelineReport, as_json: bool) -> Result<()> {
    let metrics = report.metrics();
    if as_json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        return Ok(());
    }

    println!("Results:");
    println!("  Train rows: {}", report.n_train);
    println!("  Test rows:  {}", report.n_test);
    println!("  Test MSE:   {:.4}", metrics.mse);
    println!("  Test MAE:   {:.4}", metrics.mae);
    println!("  Test R²:    {:.4}", metrics.r2);
    println!("  Coefficients (scaled units):");
    for (name, weight) in report.feature_names.iter().zip(report.trained.model.weights.iter()) {
        println!("    {:<12} {:>10.4}", name, weight);
    }
    println!("    {:<12} {:>10.4}", "bias", report.trained.model.bias);
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let pipeline = Pipeline::new(cli.pipeline_config()?)?;
    let raw = load_csv(&cli.data)?;
    let report = pipeline.run(&raw)?;

    print_report(&report, cli.json)?;

    if let Some(path) = &cli.series_out {
        save_plot_series(path, &report.plot_series())?;
        info!("wrote plot series to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    if cli.verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
