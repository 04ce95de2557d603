//! Reasoning parameters: use case loop control.
//!
//! [`ReasoningParams`] groups the static parameters that control the
//! [`ReasoningLoopUseCase`](crate::use_cases::reasoning_loop::ReasoningLoopUseCase)
//! and the approval handling around it.

use std::time::Duration;
use toolgate_domain::reasoning::observation::DEFAULT_ERROR_INDICATORS;
use toolgate_domain::{
    ComplexityPolicy, DEFAULT_MAX_ITERATIONS, ObservationCheck, TaskComplexityClassifier,
};

/// Reply used when the model produced nothing user-visible
pub const DEFAULT_EMPTY_RESPONSE_FALLBACK: &str = "I'm here. Let me know how I can help.";

/// Reasoning loop control parameters.
#[derive(Debug, Clone)]
pub struct ReasoningParams {
    /// Hard cap on model calls per loop invocation
    pub max_iterations: usize,
    /// Deadline for a single model call; elapsed → backend error
    pub model_timeout: Option<Duration>,
    /// Stream model output token by token
    pub stream: bool,
    /// Reply substituted when the model's visible output is empty
    pub empty_response_fallback: String,
    /// How long a pending approval stays valid
    pub approval_timeout: Option<Duration>,
    /// Keyword list and word threshold for the classifier
    pub complexity: ComplexityPolicy,
    /// Case-insensitive substrings that mark an observation as failed
    pub error_indicators: Vec<String>,
}

impl Default for ReasoningParams {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            model_timeout: Some(Duration::from_secs(120)),
            stream: true,
            empty_response_fallback: DEFAULT_EMPTY_RESPONSE_FALLBACK.to_string(),
            approval_timeout: Some(Duration::from_secs(300)),
            complexity: ComplexityPolicy::default(),
            error_indicators: DEFAULT_ERROR_INDICATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ReasoningParams {
    // ==================== Builder Methods ====================

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    pub fn with_model_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.model_timeout = timeout;
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_empty_response_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.empty_response_fallback = fallback.into();
        self
    }

    pub fn with_approval_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.approval_timeout = timeout;
        self
    }

    pub fn with_complexity(mut self, policy: ComplexityPolicy) -> Self {
        self.complexity = policy;
        self
    }

    pub fn with_error_indicators(mut self, indicators: Vec<String>) -> Self {
        self.error_indicators = indicators;
        self
    }

    // ==================== Derived Domain Objects ====================

    pub fn classifier(&self) -> TaskComplexityClassifier {
        TaskComplexityClassifier::new(self.complexity.clone())
    }

    pub fn observation_check(&self) -> ObservationCheck {
        ObservationCheck::new(self.error_indicators.clone())
    }
}
