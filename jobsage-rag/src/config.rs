//! Configuration for the query pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};
use crate::prompt;

/// Configuration parameters for [`QueryPipeline`](crate::QueryPipeline).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Number of nearest postings retrieved per query.
    pub top_k: usize,
    /// Maximum assembled prompt size in characters.
    pub max_prompt_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { top_k: 5, max_prompt_chars: prompt::DEFAULT_MAX_CHARS }
    }
}

impl PipelineConfig {
    /// Create a new builder for constructing a [`PipelineConfig`].
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`PipelineConfig`].
#[derive(Debug, Clone)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the number of nearest postings retrieved per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the maximum assembled prompt size in characters.
    pub fn max_prompt_chars(mut self, chars: usize) -> Self {
        self.config.max_prompt_chars = chars;
        self
    }

    /// Build the [`PipelineConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `top_k` or `max_prompt_chars` is zero.
    pub fn build(self) -> Result<PipelineConfig> {
        if self.config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        if self.config.max_prompt_chars == 0 {
            return Err(RagError::Config("max_prompt_chars must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self { config: PipelineConfig::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_zero_top_k() {
        assert!(matches!(
            PipelineConfig::builder().top_k(0).build(),
            Err(RagError::Config(_))
        ));
    }

    #[test]
    fn builder_accepts_defaults() {
        let config = PipelineConfig::builder().build().unwrap();
        assert_eq!(config.top_k, 5);
    }
}
