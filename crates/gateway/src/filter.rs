//! TypeFilter - include/exclude lists over record types

use std::collections::HashSet;

use contracts::{ContractError, FilterConfig, LogFilter};

/// Filter accepting types by explicit lists
///
/// An excluded type is always rejected. With an empty include list every
/// other type is accepted.
#[derive(Debug, Clone, Default)]
pub struct TypeFilter {
    include: HashSet<String>,
    exclude: HashSet<String>,
}

impl TypeFilter {
    pub fn new<I, E>(include: I, exclude: E) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            include: include.into_iter().map(Into::into).collect(),
            exclude: exclude.into_iter().map(Into::into).collect(),
        }
    }

    /// Accept everything except `types`
    pub fn excluding<E>(types: E) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self::new(Vec::<String>::new(), types)
    }

    /// Accept only `types`
    pub fn including<I>(types: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new(types, Vec::<String>::new())
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.include.iter().cloned(), config.exclude.iter().cloned())
    }
}

impl LogFilter for TypeFilter {
    fn accept(&self, log_type: &str) -> Result<bool, ContractError> {
        if self.exclude.contains(log_type) {
            return Ok(false);
        }
        Ok(self.include.is_empty() || self.include.contains(log_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excluding() {
        let filter = TypeFilter::excluding(["debug"]);
        assert!(!filter.accept("debug").unwrap());
        assert!(filter.accept("info").unwrap());
    }

    #[test]
    fn test_including() {
        let filter = TypeFilter::including(["alarm", "error"]);
        assert!(filter.accept("alarm").unwrap());
        assert!(!filter.accept("info").unwrap());
    }

    #[test]
    fn test_exclude_wins() {
        let config = FilterConfig {
            include: vec!["error".to_string()],
            exclude: vec!["error".to_string()],
        };
        let filter = TypeFilter::from_config(&config);
        assert!(!filter.accept("error").unwrap());
    }
}
