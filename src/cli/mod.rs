//! tabreport CLI Module
//!
//! Fits models on a CSV file and prints their fit statistics.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use colored::*;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{ReportConfig, DEFAULT_OUTER_CV_SEED};
use crate::data::{load_csv, DataHandler, DEFAULT_TEST_SIZE};
use crate::feature_selection::{FeatureSelector, KBestSelector, LassoSelector, ScoreFunc, Selection};
use crate::metrics::StatsTable;
use crate::models::{
    ClassificationModel, DynClassificationModel, DynRegressionModel, LassoRegression, LinearRegression,
    LogisticClassifier, RegressionModel,
};
use crate::plotting::DEFAULT_FIGSIZE;
use crate::report::{Availability, Dataset, MLClassificationReport, MLRegressionReport};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn kv(key: &str, val: &str) {
    println!("  {:<12} {}", muted(key), val.white());
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn print_table(table: &StatsTable) {
    for line in table.to_string().lines() {
        println!("  {}", line);
    }
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "tabreport")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fit statistics, diagnostic plots and feature selection for tabular models")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report on regression models
    Regress(ReportArgs),

    /// Report on classification models
    Classify(ReportArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Input CSV file with a header row
    #[arg(short, long)]
    pub data: PathBuf,

    /// Target column name
    #[arg(short, long)]
    pub target: Option<String>,

    /// Comma-separated predictor columns (default: every other column)
    #[arg(short, long, value_delimiter = ',')]
    pub features: Vec<String>,

    /// Comma-separated models, e.g. `ols,ridge:1.0,lasso:0.1` or `logistic:0.01`
    #[arg(short, long, value_delimiter = ',')]
    pub models: Vec<String>,

    /// Number of outer cross-validation folds
    #[arg(long)]
    pub outer_cv: Option<usize>,

    /// Seed for the train/test split and the outer folds
    #[arg(long, default_value_t = DEFAULT_OUTER_CV_SEED)]
    pub seed: u64,

    /// Fraction of rows held out for testing
    #[arg(long, default_value_t = DEFAULT_TEST_SIZE)]
    pub test_size: f64,

    /// Feature selection before fitting: `kbest:<score>:<k>` or `lasso:<n>:<alpha>`
    #[arg(long)]
    pub select: Option<String>,

    /// JSON report configuration; replaces target, features, outer-cv and seed
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory to write SVG plots into
    #[arg(long)]
    pub plot_dir: Option<PathBuf>,

    /// Print statistics as JSON instead of tables
    #[arg(long)]
    pub json: bool,
}

// ─── Argument parsing ──────────────────────────────────────────────────────────

/// Feature selection requested on the command line
#[derive(Debug, Clone, PartialEq)]
pub enum SelectSpec {
    KBest { score_func: ScoreFunc, k: usize },
    Lasso { max_n_features: usize, alpha: f64 },
}

impl SelectSpec {
    pub fn parse(spec: &str) -> anyhow::Result<Self> {
        let parts: Vec<&str> = spec.split(':').collect();
        match parts.as_slice() {
            ["kbest", score, k] => Ok(SelectSpec::KBest {
                score_func: score.parse()?,
                k: k.parse().with_context(|| format!("invalid k in '{}'", spec))?,
            }),
            ["lasso", n, alpha] => Ok(SelectSpec::Lasso {
                max_n_features: n.parse().with_context(|| format!("invalid feature count in '{}'", spec))?,
                alpha: alpha.parse().with_context(|| format!("invalid alpha in '{}'", spec))?,
            }),
            _ => bail!("invalid selection '{}': expected kbest:<score>:<k> or lasso:<n>:<alpha>", spec),
        }
    }

    fn selector(&self) -> Box<dyn FeatureSelector> {
        match *self {
            SelectSpec::KBest { score_func, k } => Box::new(KBestSelector::new(score_func, k)),
            SelectSpec::Lasso { max_n_features, alpha } => {
                Box::new(LassoSelector::new(max_n_features).with_alpha(alpha))
            }
        }
    }
}

fn split_model_spec(spec: &str) -> anyhow::Result<(&str, Option<f64>)> {
    match spec.split_once(':') {
        Some((kind, alpha)) => {
            let alpha = alpha
                .parse()
                .with_context(|| format!("invalid alpha in model '{}'", spec))?;
            Ok((kind, Some(alpha)))
        }
        None => Ok((spec, None)),
    }
}

/// Build a regression model from `ols`, `ridge[:alpha]` or `lasso[:alpha]`
pub fn parse_regressor(spec: &str) -> anyhow::Result<Box<DynRegressionModel>> {
    let (kind, alpha) = split_model_spec(spec)?;
    Ok(match kind {
        "ols" | "linear" => RegressionModel::new(LinearRegression::new()).boxed(),
        "ridge" => RegressionModel::new(LinearRegression::ridge(alpha.unwrap_or(1.0))).boxed(),
        "lasso" => RegressionModel::new(LassoRegression::new(alpha.unwrap_or(1.0))).boxed(),
        _ => bail!("unknown regression model '{}'", kind),
    })
}

/// Build a classification model from `logistic[:alpha]`
pub fn parse_classifier(spec: &str) -> anyhow::Result<Box<DynClassificationModel>> {
    let (kind, alpha) = split_model_spec(spec)?;
    Ok(match kind {
        "logistic" | "logit" => {
            let mut clf = LogisticClassifier::new();
            if let Some(alpha) = alpha {
                clf = clf.with_alpha(alpha);
            }
            ClassificationModel::new(clf).boxed()
        }
        _ => bail!("unknown classification model '{}'", kind),
    })
}

// ─── Commands ──────────────────────────────────────────────────────────────────

/// Data, configuration and optional selection shared by both commands
struct Prepared {
    handler: DataHandler,
    config: ReportConfig,
    selection: Option<Selection>,
}

fn prepare(args: &ReportArgs) -> anyhow::Result<Prepared> {
    let quiet = args.json;
    if !quiet {
        step_run("Loading data");
    }
    let start = Instant::now();
    let df = load_csv(&args.data)?;
    if !quiet {
        step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));
    }

    let mut config = match &args.config {
        Some(path) => ReportConfig::from_json_file(path)?,
        None => {
            let Some(target) = args.target.clone() else {
                bail!("--target is required when no --config is given");
            };
            let x_vars = if args.features.is_empty() {
                df.get_column_names()
                    .into_iter()
                    .map(|c| c.to_string())
                    .filter(|c| *c != target)
                    .collect()
            } else {
                args.features.clone()
            };
            ReportConfig {
                y_var: target,
                x_vars,
                outer_cv: args.outer_cv,
                outer_cv_seed: args.seed,
                verbose: true,
            }
        }
    };
    config.verbose &= !quiet;
    config.validate()?;

    let handler = DataHandler::new(df)
        .with_test_size(args.test_size)
        .with_split_seed(config.outer_cv_seed);

    let selection = match &args.select {
        Some(spec) => {
            let mut selector = SelectSpec::parse(spec)?.selector();
            let emitter = handler.train_test_emitter(&config.y_var, &config.x_vars)?;
            let selection = selector.select(&emitter)?;
            if selection.selected_features().is_empty() {
                bail!("{} selected no features", selector.name());
            }
            if !quiet {
                kv("Selector", selector.name());
                kv("Selected", &selection.selected_features().join(", "));
            }
            config.x_vars = selection.selected_features().to_vec();
            Some(selection)
        }
        None => None,
    };

    Ok(Prepared {
        handler,
        config,
        selection,
    })
}

fn plot_path(dir: &Path, model: &str, kind: &str) -> PathBuf {
    let stem: String = model
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    dir.join(format!("{}_{}.svg", stem, kind))
}

fn print_results(
    args: &ReportArgs,
    train: &StatsTable,
    test: &StatsTable,
    cv: Option<StatsTable>,
    selection: Option<&Selection>,
) -> anyhow::Result<()> {
    if args.json {
        let out = json!({
            "train": train,
            "test": test,
            "cv": cv,
            "selection": selection,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    section("Train");
    print_table(train);
    section("Test");
    print_table(test);
    if let Some(cv) = cv {
        section("Cross-validated (train)");
        print_table(&cv);
    }
    println!();
    Ok(())
}

pub fn cmd_regress(args: &ReportArgs) -> anyhow::Result<()> {
    let Prepared {
        handler,
        config,
        selection,
    } = prepare(args)?;

    let specs = if args.models.is_empty() {
        vec!["ols".to_string()]
    } else {
        args.models.clone()
    };
    let models = specs
        .iter()
        .map(|s| parse_regressor(s))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let report = MLRegressionReport::new(models, &handler, config)?;
    let cv = match report.config().outer_cv {
        Some(_) => report.cv_fit_statistics(true).into_option(),
        None => None,
    };
    print_results(
        args,
        &report.fit_statistics(Dataset::Train)?,
        &report.fit_statistics(Dataset::Test)?,
        cv,
        selection.as_ref(),
    )?;

    if let Some(dir) = &args.plot_dir {
        std::fs::create_dir_all(dir)?;
        for name in report.model_names() {
            let path = plot_path(dir, name, "obs_vs_pred");
            report[name].test_report().plot_obs_vs_pred(DEFAULT_FIGSIZE)?.save(&path)?;
            if !args.json {
                kv("Plot", &path.display().to_string());
            }
        }
    }
    Ok(())
}

pub fn cmd_classify(args: &ReportArgs) -> anyhow::Result<()> {
    let Prepared {
        handler,
        config,
        selection,
    } = prepare(args)?;

    let specs = if args.models.is_empty() {
        vec!["logistic".to_string()]
    } else {
        args.models.clone()
    };
    let models = specs
        .iter()
        .map(|s| parse_classifier(s))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let report = MLClassificationReport::new(models, &handler, config)?;
    let cv = match report.config().outer_cv {
        Some(_) => report.cv_fit_statistics(true).into_option(),
        None => None,
    };
    print_results(
        args,
        &report.fit_statistics(Dataset::Train)?,
        &report.fit_statistics(Dataset::Test)?,
        cv,
        selection.as_ref(),
    )?;

    if let Some(dir) = &args.plot_dir {
        std::fs::create_dir_all(dir)?;
        for name in report.model_names() {
            if let Availability::Available(fig) = report[name].train_report().plot_roc_curve(DEFAULT_FIGSIZE)? {
                let path = plot_path(dir, name, "roc");
                fig.save(&path)?;
                if !args.json {
                    kv("Plot", &path.display().to_string());
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_select_spec() {
        assert_eq!(
            SelectSpec::parse("kbest:f_regression:3").unwrap(),
            SelectSpec::KBest {
                score_func: ScoreFunc::FRegression,
                k: 3
            }
        );
        assert_eq!(
            SelectSpec::parse("lasso:2:0.5").unwrap(),
            SelectSpec::Lasso {
                max_n_features: 2,
                alpha: 0.5
            }
        );
        assert!(SelectSpec::parse("kbest:chi2:3").is_err());
        assert!(SelectSpec::parse("pca:2").is_err());
    }

    #[test]
    fn test_parse_models() {
        assert_eq!(parse_regressor("ols").unwrap().name(), "OLS");
        assert_eq!(parse_regressor("lasso:0.5").unwrap().name(), "Lasso(alpha=0.5)");
        assert!(parse_regressor("ridge:abc").is_err());
        assert!(parse_regressor("forest").is_err());
        assert!(parse_classifier("logistic:0.1").is_ok());
        assert!(parse_classifier("svm").is_err());
    }

    #[test]
    fn test_plot_path_sanitizes_name() {
        let path = plot_path(Path::new("/tmp"), "Ridge(alpha=1)", "obs_vs_pred");
        assert_eq!(path, PathBuf::from("/tmp/Ridge_alpha_1__obs_vs_pred.svg"));
    }

    #[test]
    fn test_cli_parses_regress() {
        let cli = Cli::try_parse_from([
            "tabreport", "regress", "--data", "d.csv", "--target", "y", "--models", "ols,lasso:0.1",
            "--outer-cv", "5",
        ])
        .unwrap();
        let Commands::Regress(args) = cli.command else {
            panic!("expected regress");
        };
        assert_eq!(args.models, vec!["ols", "lasso:0.1"]);
        assert_eq!(args.outer_cv, Some(5));
        assert_eq!(args.seed, DEFAULT_OUTER_CV_SEED);
    }
}
