use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tabreg::io::read_raw_table;
use tabreg::{DataPreparer, Error, Pipeline, PipelineConfig, RawTable};

const FEATURES: [&str; 13] = [
    "CRIM", "ZN", "INDUS", "CHAS", "NOX", "RM", "AGE", "DIS", "RAD", "TAX", "PTRATIO", "B",
    "LSTAT",
];

fn housing_like_table(n_rows: usize, seed: u64) -> RawTable {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut columns: Vec<String> = FEATURES.iter().map(|c| c.to_string()).collect();
    columns.push("MEDV".to_string());

    let mut table = RawTable::new(columns);
    for _ in 0..n_rows {
        let features: Vec<f64> = (0..FEATURES.len())
            .map(|j| rng.gen_range(0.0..10.0) * (j + 1) as f64)
            .collect();
        let target = 22.0 + 0.8 * features[5] - 0.05 * features[12] + 0.1 * features[0]
            + rng.gen_range(-1.0..1.0);

        let mut row: Vec<String> = features.iter().map(|v| v.to_string()).collect();
        row.push(target.to_string());
        table.push_row(row);
    }
    table
}

#[test]
fn end_to_end_506_rows() {
    let raw = housing_like_table(506, 7);
    let pipeline = Pipeline::new(PipelineConfig::new("MEDV")).unwrap();

    let report = pipeline.run(&raw).unwrap();
    assert_eq!(report.n_test, 102);
    assert_eq!(report.n_train, 404);
    assert_eq!(report.feature_names.len(), 13);
    assert_eq!(report.trained.loss_history.len(), 100);

    let metrics = report.metrics();
    assert!(metrics.mse.is_finite());
    assert!(metrics.mae >= 0.0);
    assert!(metrics.r2 <= 1.0);

    let series = report.plot_series();
    assert_eq!(series.len(), 102);
    assert!(series.y_true.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn runs_are_reproducible() {
    let raw = housing_like_table(120, 1);
    let pipeline = Pipeline::new(PipelineConfig::new("MEDV").epochs(20)).unwrap();

    let a = pipeline.run(&raw).unwrap();
    let b = pipeline.run(&raw).unwrap();
    assert_eq!(a.trained.model, b.trained.model);
    assert_eq!(a.metrics(), b.metrics());
}

#[test]
fn longer_training_fits_well() {
    let raw = housing_like_table(506, 11);
    let config = PipelineConfig::new("MEDV")
        .epochs(3000)
        .adam(tabreg::AdamConfig::default().learning_rate(0.01));
    let report = Pipeline::new(config).unwrap().run(&raw).unwrap();

    assert!(report.metrics().r2 > 0.9, "r2 = {}", report.metrics().r2);
}

#[test]
fn cleaning_removes_only_bad_rows() {
    let mut raw = housing_like_table(30, 3);
    raw.rows[4][2] = "n/a".to_string();
    raw.rows[17][13] = "inf".to_string();

    let cleaned = DataPreparer::new("MEDV").prepare(&raw).unwrap();
    assert_eq!(cleaned.n_rows(), 28);
    assert!(!cleaned.source_rows.contains(&4));
    assert!(!cleaned.source_rows.contains(&17));

    for (k, &src) in cleaned.source_rows.iter().enumerate() {
        let expected: Vec<f64> = raw.rows[src].iter().map(|c| c.parse().unwrap()).collect();
        assert_eq!(cleaned.data.row(k).to_vec(), expected);
    }
}

#[test]
fn missing_target_is_schema_error() {
    let raw = housing_like_table(10, 3);
    let pipeline = Pipeline::new(PipelineConfig::new("PRICE")).unwrap();
    assert!(matches!(pipeline.run(&raw), Err(Error::Schema(_))));
}

#[test]
fn csv_input_runs_through_pipeline() {
    let mut csv = String::from("x1,x2,y\n");
    for i in 0..50 {
        let x1 = i as f64;
        let x2 = ((i * 13) % 7) as f64;
        csv.push_str(&format!("{},{},{}\n", x1, x2, 2.0 * x1 - x2 + 1.0));
    }
    csv.push_str("oops,1,2\n");

    let raw = read_raw_table(csv.as_bytes()).unwrap();
    let report = Pipeline::new(PipelineConfig::new("y").epochs(10))
        .unwrap()
        .run(&raw)
        .unwrap();
    assert_eq!(report.n_train + report.n_test, 50);
}
