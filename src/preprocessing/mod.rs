//! Preprocessing helpers used by reports

mod scaler;

pub use scaler::{ScalerType, TargetScaler};
