//! Engine errors
//!
//! Only configuration and registration return errors. Turn processing
//! recovers locally and never surfaces one.

use thiserror::Error;

use crate::map::Tripoint;

/// Errors raised while configuring an engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("ability '{0}' is already registered")]
    DuplicateAbility(String),

    #[error("no ability named '{0}'")]
    UnknownAbility(String),

    #[error("position {0} is outside the map")]
    OutOfBounds(Tripoint),
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = EngineError::DuplicateAbility("bite".into());
        assert_eq!(err.to_string(), "ability 'bite' is already registered");
        let err = EngineError::OutOfBounds(Tripoint::new(1, 2, 3));
        assert!(err.to_string().contains("(1,2,3)"));
    }

    #[test]
    fn test_from_json_error() {
        let bad: Result<u32, _> = serde_json::from_str("nope");
        let err: EngineError = bad.unwrap_err().into();
        assert!(matches!(err, EngineError::Parse(_)));
    }
}
