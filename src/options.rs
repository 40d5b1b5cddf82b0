use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_HEURISTIC_GROUP_MAX_LEN: usize = 1000;
pub const DEFAULT_HEURISTIC_MAX_LEN_LIMIT: usize = 4096;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineOptions {
    /// Register `int`/`integer` and `str`/`string` on construction.
    pub register_default_types: bool,
    /// Upper length assumed for a single group when summarising a pattern.
    pub heuristic_group_max_len: usize,
    /// Cap applied to every per-pattern maximum length.
    pub heuristic_max_len_limit: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            register_default_types: true,
            heuristic_group_max_len: DEFAULT_HEURISTIC_GROUP_MAX_LEN,
            heuristic_max_len_limit: DEFAULT_HEURISTIC_MAX_LEN_LIMIT,
        }
    }
}

impl EngineOptions {
    pub fn builder() -> EngineOptionsBuilder {
        EngineOptionsBuilder::default()
    }

    pub fn validate(&self) -> Result<(), EngineOptionsError> {
        if self.heuristic_group_max_len == 0 {
            return Err(EngineOptionsError::GroupMaxLenInvalid { provided: 0 });
        }
        if self.heuristic_max_len_limit == 0 {
            return Err(EngineOptionsError::MaxLenLimitInvalid { provided: 0 });
        }
        if self.heuristic_group_max_len > self.heuristic_max_len_limit {
            return Err(EngineOptionsError::GroupMaxLenAboveLimit {
                group_max_len: self.heuristic_group_max_len,
                limit: self.heuristic_max_len_limit,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct EngineOptionsBuilder {
    options: EngineOptions,
}

impl EngineOptionsBuilder {
    pub fn register_default_types(mut self, value: bool) -> Self {
        self.options.register_default_types = value;
        self
    }

    pub fn heuristic_group_max_len(mut self, value: usize) -> Self {
        self.options.heuristic_group_max_len = value;
        self
    }

    pub fn heuristic_max_len_limit(mut self, value: usize) -> Self {
        self.options.heuristic_max_len_limit = value;
        self
    }

    pub fn build(self) -> Result<EngineOptions, EngineOptionsError> {
        let options = self.options;
        options.validate()?;
        Ok(options)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineOptionsError {
    #[error("heuristic_group_max_len must be at least 1 (got {provided})")]
    GroupMaxLenInvalid { provided: usize },
    #[error("heuristic_max_len_limit must be at least 1 (got {provided})")]
    MaxLenLimitInvalid { provided: usize },
    #[error("heuristic_group_max_len {group_max_len} exceeds heuristic_max_len_limit {limit}")]
    GroupMaxLenAboveLimit { group_max_len: usize, limit: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = EngineOptions::default();
        assert!(options.register_default_types);
        assert_eq!(options.validate(), Ok(()));
    }

    #[test]
    fn builder_rejects_inconsistent_limits() {
        assert_eq!(
            EngineOptions::builder().heuristic_group_max_len(0).build(),
            Err(EngineOptionsError::GroupMaxLenInvalid { provided: 0 })
        );
        assert_eq!(
            EngineOptions::builder()
                .heuristic_group_max_len(200)
                .heuristic_max_len_limit(100)
                .build(),
            Err(EngineOptionsError::GroupMaxLenAboveLimit {
                group_max_len: 200,
                limit: 100
            })
        );
    }

    #[test]
    fn options_deserialize_from_json() {
        let options: EngineOptions = serde_json::from_str(
            r#"{"register_default_types":false,"heuristic_group_max_len":10,"heuristic_max_len_limit":20}"#,
        )
        .expect("valid options");
        assert!(!options.register_default_types);
        assert_eq!(options.heuristic_max_len_limit, 20);
    }
}
