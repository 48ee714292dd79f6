//! Data access for reports and feature selectors
//!
//! - [`DataHandler`] owns a polars frame and its train/test partition
//! - [`DataEmitter`] carries aligned ndarray train/test matrices for one
//!   target and predictor set
//! - [`KFold`] rotates folds over the training partition

mod emitter;
mod handler;
pub mod split;

pub use emitter::DataEmitter;
pub use handler::{load_csv, DataHandler, DEFAULT_SPLIT_SEED, DEFAULT_TEST_SIZE};
pub use split::{FoldSplit, KFold};
