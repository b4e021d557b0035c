use tabreg::io::load_csv;
use tabreg::{
    DataPreparer, Evaluator, GradientDescentTrainer, RawTable, Splitter, StandardScaler,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Step 1: Load CSV data, or fall back to a small synthetic table
    let raw = match std::env::args().nth(1) {
        Some(path) => load_csv(path)?,
        None => synthetic_table(),
    };

    // Step 2: Clean and separate the target
    let table = DataPreparer::new("MEDV").prepare(&raw)?;
    let dataset = table.into_dataset("MEDV", None)?;
    println!("Dataset: {} samples, {} features", dataset.n_samples(), dataset.n_features());

    // Step 3: Split into train/test
    let split = Splitter::new(0.2, 42)?.split(dataset.n_samples())?;
    let (train_data, test_data) = dataset.partition(&split);

    // Step 4: Standardize, fitting on the training rows only
    let feature_state = StandardScaler::new().fit(&train_data.features)?;
    let target_state = StandardScaler::new().fit_target(&train_data.labels)?;
    let train_features_scaled = feature_state.transform(&train_data.features)?;
    let test_features_scaled = feature_state.transform(&test_data.features)?;
    let train_target_scaled = target_state.transform(&train_data.labels);

    // Step 5: Train
    let trained = GradientDescentTrainer::new()
        .epochs(100)
        .train(&train_features_scaled, &train_target_scaled)?;

    // Step 6: Evaluate in original units
    let evaluation = Evaluator::evaluate(
        &trained.model,
        &test_features_scaled,
        &test_data.labels,
        &target_state,
    )?;

    println!("Results:");
    println!("  Final training loss (scaled): {:.4}", trained.final_loss().unwrap_or(f64::NAN));
    println!("  Test MSE: {:.4}", evaluation.metrics.mse);
    println!("  Test MAE: {:.4}", evaluation.metrics.mae);
    println!("  Test R² score: {:.4}", evaluation.metrics.r2);

    let series = evaluation.plot_series();
    println!("\nLowest five test targets vs predictions:");
    for (actual, pred) in series.y_true.iter().zip(series.y_pred.iter()).take(5) {
        println!("  Actual={:.2}, Predicted={:.2}", actual, pred);
    }

    Ok(())
}

fn synthetic_table() -> RawTable {
    let mut table = RawTable::new(vec!["RM".into(), "LSTAT".into(), "MEDV".into()]);
    for i in 0..50 {
        let rm = 4.0 + (i % 10) as f64 * 0.4;
        let lstat = 2.0 + ((i * 7) % 30) as f64;
        let medv = 9.0 * rm - 0.6 * lstat - 10.0 + ((i * 3) % 5) as f64 * 0.3;
        table.push_row([rm.to_string(), lstat.to_string(), medv.to_string()]);
    }
    table
}
