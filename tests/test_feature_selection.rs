//! Integration tests for feature selection feeding a report

use polars::prelude::*;
use tabreport::prelude::*;

fn create_dataset() -> DataFrame {
    let n = 80;
    let signal: Vec<f64> = (0..n).map(|i| i as f64 / 4.0).collect();
    let weak: Vec<f64> = (0..n).map(|i| ((i * 7) % 10) as f64).collect();
    let noise_a: Vec<f64> = (0..n).map(|i| ((i * 37) % 11) as f64).collect();
    let noise_b: Vec<f64> = (0..n).map(|i| ((i * 53) % 13) as f64).collect();
    let target: Vec<f64> = (0..n).map(|i| 4.0 * signal[i] + 0.3 * weak[i] + 1.0).collect();

    df!(
        "signal" => &signal,
        "weak" => &weak,
        "noise_a" => &noise_a,
        "noise_b" => &noise_b,
        "target" => &target
    )
    .unwrap()
}

fn feature_names() -> Vec<String> {
    ["signal", "weak", "noise_a", "noise_b"].iter().map(|s| s.to_string()).collect()
}

fn emitter() -> DataEmitter {
    DataHandler::new(create_dataset())
        .train_test_emitter("target", &feature_names())
        .unwrap()
}

fn assert_consistent(selection: &Selection) {
    assert_eq!(selection.support().len(), selection.all_features().len());
    let masked: Vec<&String> = selection
        .all_features()
        .iter()
        .zip(selection.support())
        .filter(|&(_, &keep)| keep)
        .map(|(f, _)| f)
        .collect();
    let selected: Vec<&String> = selection.selected_features().iter().collect();
    assert_eq!(masked, selected);
}

#[test]
fn test_kbest_selection_is_consistent() {
    let emitter = emitter();
    for score_func in [ScoreFunc::FRegression, ScoreFunc::RRegression, ScoreFunc::MutualInfoRegression] {
        for k in 0..=4 {
            let mut selector = KBestSelector::new(score_func, k);
            let selection = selector.select(&emitter).unwrap();
            assert_consistent(&selection);
            assert_eq!(selection.n_selected(), k);
            assert_eq!(selector.selected_feature_scores().unwrap().len(), k);
        }
    }
}

#[test]
fn test_kbest_with_all_features_selects_everything() {
    let mut selector = KBestSelector::new(ScoreFunc::FRegression, 4);
    let selection = selector.select(&emitter()).unwrap();
    assert!(selection.support().iter().all(|&s| s));
    assert_eq!(selection.selected_features(), feature_names().as_slice());
}

#[test]
fn test_kbest_rejects_k_above_feature_count() {
    let mut selector = KBestSelector::new(ScoreFunc::FRegression, 5);
    assert!(matches!(
        selector.select(&emitter()),
        Err(ReportError::InvalidParameter { .. })
    ));
    assert!(selector.support().is_none());
}

#[test]
fn test_lasso_selection_is_consistent() {
    let emitter = emitter();
    for max_n in 0..=4 {
        let mut selector = LassoSelector::new(max_n);
        let selection = selector.select(&emitter).unwrap();
        assert_consistent(&selection);
        assert!(selection.n_selected() <= max_n);
    }

    let mut selector = LassoSelector::new(1).with_alpha(0.01);
    let selection = selector.select(&emitter).unwrap();
    assert_eq!(selection.selected_features(), &["signal".to_string()][..]);
}

#[test]
fn test_selected_features_drive_a_report() {
    let data = DataHandler::new(create_dataset());
    let emitter = data.train_test_emitter("target", &feature_names()).unwrap();
    let mut selector = KBestSelector::new(ScoreFunc::RRegression, 2);
    let selection = selector.select(&emitter).unwrap();
    assert!(selection.selected_features().contains(&"signal".to_string()));

    let x_vars: Vec<&str> = selection.selected_features().iter().map(String::as_str).collect();
    let config = ReportConfig::new("target", &x_vars).with_verbose(false);
    let models = vec![RegressionModel::new(LinearRegression::new()).boxed()];
    let report = MLRegressionReport::new(models, &data, config).unwrap();

    let table = report.fit_statistics(Dataset::Test).unwrap();
    assert!(table.get("r2", "OLS").unwrap() > 0.99);
}
