//! Soft-failure results for optional report views

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Why an optional view does not apply to a report's configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unavailable {
    /// The model was fitted without outer cross-validation
    NotCrossValidated,
    /// Per-class breakdowns are not produced for two-class tasks
    BinaryTask,
    /// Cross-validated statistics exist only for the train partition
    TestPartition,
    /// ROC curves need a two-class task
    NotBinary,
    /// ROC curves need both classes present in the partition
    SingleClass,
}

impl Unavailable {
    pub fn message(&self) -> &'static str {
        match self {
            Unavailable::NotCrossValidated => "Cross validation statistics are not available for models that are not cross-validated.",
            Unavailable::BinaryTask => "Fit statistics by class are not available for binary classification.",
            Unavailable::TestPartition => "Cross validation statistics are not available for test data.",
            Unavailable::NotBinary => "ROC curve is not available for multiclass classification.",
            Unavailable::SingleClass => "ROC curve is not available when only one class is present.",
        }
    }
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// The result of an optional report view: either the value or the reason
/// it does not apply.
///
/// Building the unavailable variant through [`Availability::unavailable`]
/// logs one warning carrying the reason.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Availability<T> {
    Available(T),
    Unavailable(Unavailable),
}

impl<T> Availability<T> {
    /// Log the reason at warn level and return the unavailable variant
    pub fn unavailable(reason: Unavailable) -> Self {
        warn!(reason = ?reason, "{}", reason);
        Availability::Unavailable(reason)
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available(_))
    }

    pub fn reason(&self) -> Option<Unavailable> {
        match self {
            Availability::Available(_) => None,
            Availability::Unavailable(r) => Some(*r),
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Availability::Available(v) => Some(v),
            Availability::Unavailable(_) => None,
        }
    }

    pub fn as_ref(&self) -> Availability<&T> {
        match self {
            Availability::Available(v) => Availability::Available(v),
            Availability::Unavailable(r) => Availability::Unavailable(*r),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Availability<U> {
        match self {
            Availability::Available(v) => Availability::Available(f(v)),
            Availability::Unavailable(r) => Availability::Unavailable(r),
        }
    }

    pub fn unwrap_or_else<F: FnOnce(Unavailable) -> T>(self, f: F) -> T {
        match self {
            Availability::Available(v) => v,
            Availability::Unavailable(r) => f(r),
        }
    }
}

impl<T> From<Availability<T>> for Option<T> {
    fn from(a: Availability<T>) -> Self {
        a.into_option()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available() {
        let a = Availability::Available(3);
        assert!(a.is_available());
        assert_eq!(a.reason(), None);
        assert_eq!(a.map(|v| v * 2).into_option(), Some(6));
    }

    #[test]
    fn test_unavailable_carries_reason() {
        let a: Availability<i32> = Availability::unavailable(Unavailable::TestPartition);
        assert!(!a.is_available());
        assert_eq!(a.reason(), Some(Unavailable::TestPartition));
        assert_eq!(a.as_ref().into_option(), None);
        assert_eq!(a.unwrap_or_else(|_| -1), -1);
    }

    #[test]
    fn test_messages() {
        assert!(Unavailable::BinaryTask.to_string().contains("binary"));
        assert!(Unavailable::NotBinary.to_string().contains("multiclass"));
        assert!(Unavailable::SingleClass.to_string().contains("one class"));
    }
}
