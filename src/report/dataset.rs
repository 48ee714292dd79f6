//! Dataset partition selector

use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which partition a dataset-scoped report reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Train,
    Test,
}

impl Dataset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dataset::Train => "train",
            Dataset::Test => "test",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dataset {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "train" => Ok(Dataset::Train),
            "test" => Ok(Dataset::Test),
            other => Err(ReportError::ValidationError(format!(
                "invalid dataset '{}': expected 'train' or 'test'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("train".parse::<Dataset>().unwrap(), Dataset::Train);
        assert_eq!("test".parse::<Dataset>().unwrap(), Dataset::Test);
        assert_eq!(Dataset::Test.to_string(), "test");
    }

    #[test]
    fn test_invalid_dataset() {
        let err = "validation".parse::<Dataset>().unwrap_err();
        assert!(matches!(err, ReportError::ValidationError(_)));
    }
}
