//! Projection error taxonomy.

use crate::domain::{LotKey, VestingParamsError};
use crate::reader::ReaderError;
use thiserror::Error;

/// How the ingestor must react to a failed projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The single event fails; later events are still accepted.
    Fatal,
    /// Decoded on-chain data the engine does not understand. Ingestion halts.
    ContractViolation,
}

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("authoritative read failed: {0}")]
    MissingRead(#[from] ReaderError),

    #[error("lot {0} not found")]
    LotNotFound(LotKey),

    #[error("module extension for lot {0} not found")]
    ExtensionNotFound(LotKey),

    #[error("unknown {module} status code {code}")]
    UnknownStatus { module: &'static str, code: u8 },

    #[error("unknown keycode {0:?}")]
    UnknownKeycode(String),

    #[error("lot {lot} is governed by {expected}, extension is {found}")]
    ModuleMismatch {
        lot: LotKey,
        expected: String,
        found: String,
    },

    #[error("{event} is not supported by {module}")]
    Unsupported {
        event: &'static str,
        module: &'static str,
    },

    #[error("invalid derivative params: {0}")]
    DerivativeParams(#[from] VestingParamsError),

    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl ProjectionError {
    pub fn severity(&self) -> Severity {
        match self {
            ProjectionError::UnknownStatus { .. }
            | ProjectionError::UnknownKeycode(_)
            | ProjectionError::ModuleMismatch { .. }
            | ProjectionError::Unsupported { .. }
            | ProjectionError::DerivativeParams(_) => Severity::ContractViolation,
            ProjectionError::MissingRead(_)
            | ProjectionError::LotNotFound(_)
            | ProjectionError::ExtensionNotFound(_)
            | ProjectionError::Arithmetic(_)
            | ProjectionError::Db(_) => Severity::Fatal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_classification() {
        assert_eq!(
            ProjectionError::LotNotFound(LotKey::from_raw("x")).severity(),
            Severity::Fatal
        );
        assert_eq!(
            ProjectionError::MissingRead(ReaderError::RateLimited).severity(),
            Severity::Fatal
        );
        assert_eq!(
            ProjectionError::UnknownStatus {
                module: "EMPA",
                code: 9
            }
            .severity(),
            Severity::ContractViolation
        );
        assert_eq!(
            ProjectionError::UnknownKeycode("XYZ".to_string()).severity(),
            Severity::ContractViolation
        );
    }

    #[test]
    fn test_error_messages() {
        let err = ProjectionError::UnknownStatus {
            module: "FPBA",
            code: 4,
        };
        assert_eq!(err.to_string(), "unknown FPBA status code 4");
    }
}
