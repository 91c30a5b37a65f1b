//! LogFilter trait - per-destination predicate over the record type

use crate::ContractError;

/// Decides whether records of a given type are queued for a writer
///
/// An `Err` is treated as a rejection for that writer only.
pub trait LogFilter: Send + Sync {
    /// Whether records of `log_type` are accepted
    fn accept(&self, log_type: &str) -> Result<bool, ContractError>;
}

impl<F> LogFilter for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn accept(&self, log_type: &str) -> Result<bool, ContractError> {
        Ok(self(log_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_filter() {
        let filter = |log_type: &str| log_type != "debug";
        assert!(!filter.accept("debug").unwrap());
        assert!(filter.accept("info").unwrap());
    }
}
