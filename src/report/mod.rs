//! Model reports
//!
//! Reports are read-only views over fitted models, arranged in three levels:
//! - dataset reports ([`RegressionDatasetReport`], [`ClassificationDatasetReport`])
//!   format the statistics and plots of one model on one partition
//! - model reports ([`RegressionModelReport`], [`ClassificationModelReport`])
//!   route to a fresh dataset report for `train` or `test`
//! - multi-model reports ([`MLRegressionReport`], [`MLClassificationReport`])
//!   fit a collection of models against shared data and combine their tables
//!
//! Optional views that do not apply to a configuration (per-class statistics
//! on a binary task, cross-validated statistics without outer folds, ...)
//! return [`Availability::Unavailable`] instead of failing.
//!
//! [`HoldoutRegressionReport`] is a lighter variant over already trained
//! estimators and a held-out split.

mod availability;
mod classification;
mod dataset;
mod holdout;
mod regression;

pub use availability::{Availability, Unavailable};
pub use classification::{ClassificationDatasetReport, ClassificationModelReport, MLClassificationReport};
pub use dataset::Dataset;
pub use holdout::{HoldoutModelReport, HoldoutRegressionReport, ReportKey};
pub use regression::{MLRegressionReport, RegressionDatasetReport, RegressionModelReport};

use crate::config::ReportConfig;
use crate::data::{DataEmitter, DataHandler};
use crate::error::{ReportError, Result};
use crate::metrics::Scorer;
use crate::models::Model;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Models fitted by a multi-model report, in input order, with their name
/// index
pub(crate) struct FittedModels<S: Scorer + 'static> {
    pub models: Vec<Arc<dyn Model<Scorer = S>>>,
    pub index: HashMap<String, usize>,
}

/// Fit every model against the shared train/test emitter and, when outer
/// cross-validation is configured, the per-fold emitters.
///
/// Models are fitted sequentially in the order given. Duplicate names are
/// rejected before any model is fitted.
pub(crate) fn fit_models<S: Scorer + 'static>(
    models: Vec<Box<dyn Model<Scorer = S>>>,
    data: &DataHandler,
    config: &ReportConfig,
) -> Result<FittedModels<S>> {
    config.validate()?;

    let mut index = HashMap::with_capacity(models.len());
    for (i, model) in models.iter().enumerate() {
        if index.insert(model.name().to_string(), i).is_some() {
            return Err(ReportError::DuplicateModel(model.name().to_string()));
        }
    }

    let emitter = Arc::new(data.train_test_emitter(&config.y_var, &config.x_vars)?);
    let emitters: Option<Arc<[DataEmitter]>> = match config.outer_cv {
        Some(n_folds) => Some(
            data.kfold_emitters(&config.y_var, &config.x_vars, n_folds, true, config.outer_cv_seed)?
                .into(),
        ),
        None => None,
    };

    let mut fitted = Vec::with_capacity(models.len());
    for mut model in models {
        if config.verbose {
            info!("Fitting model {}.", model.name());
        }
        model.specify_data(Arc::clone(&emitter), emitters.clone());
        model.fit()?;
        if config.verbose {
            info!("Fitted model {}.", model.name());
        }
        fitted.push(Arc::from(model));
    }

    Ok(FittedModels {
        models: fitted,
        index,
    })
}
