use thiserror::Error;

/// Failure taxonomy of a verification run.
///
/// Per-case kinds (`Parse`, `Runtime`, `Structure`) are recorded on the
/// affected `CaseResult` and never abort the batch. Everything else is an
/// infrastructure failure: the report carries `success = false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarnessError {
    #[error("ParseError: {0}")]
    Parse(String),

    #[error("NoCandidateFound: {0}")]
    NoCandidateFound(String),

    #[error("RuntimeException: {0}")]
    Runtime(String),

    #[error("StructureError: {0}")]
    Structure(String),

    #[error("Timeout")]
    Timeout,

    #[error("OutputDecodeError: {0}")]
    OutputDecode(String),

    #[error("CandidateLoadError: {0}")]
    CandidateLoad(String),

    #[error("InputTooLarge: {0}")]
    InputTooLarge(String),

    #[error("NoTestCases: {0}")]
    NoTestCases(String),

    #[error("ExecutionError: {0}")]
    Execution(String),
}

impl HarnessError {
    /// True when the failure means "we couldn't run your code" rather than
    /// "your code is wrong".
    pub fn is_infrastructure(&self) -> bool {
        !matches!(
            self,
            HarnessError::Parse(_)
                | HarnessError::Runtime(_)
                | HarnessError::Structure(_)
                | HarnessError::NoTestCases(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_renders_bare() {
        assert_eq!(HarnessError::Timeout.to_string(), "Timeout");
    }

    #[test]
    fn test_kind_prefix() {
        let err = HarnessError::NoCandidateFound("nothing defined".into());
        assert_eq!(err.to_string(), "NoCandidateFound: nothing defined");
    }

    #[test]
    fn test_infrastructure_split() {
        assert!(HarnessError::Timeout.is_infrastructure());
        assert!(HarnessError::OutputDecode(String::new()).is_infrastructure());
        assert!(HarnessError::CandidateLoad(String::new()).is_infrastructure());
        assert!(!HarnessError::Parse(String::new()).is_infrastructure());
        assert!(!HarnessError::Runtime(String::new()).is_infrastructure());
        assert!(!HarnessError::NoTestCases(String::new()).is_infrastructure());
    }
}
