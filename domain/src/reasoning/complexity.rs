//! Task complexity classification.
//!
//! Decides whether a query goes through the iterative tool loop or gets a
//! single model call. Pure heuristic: it never fails, and a misclassification
//! only costs either one extra iteration or a missed tool opportunity.

use serde::{Deserialize, Serialize};

/// Outcome of classifying a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskComplexity {
    Simple,
    Complex,
}

impl TaskComplexity {
    pub fn is_complex(&self) -> bool {
        matches!(self, TaskComplexity::Complex)
    }
}

impl std::fmt::Display for TaskComplexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskComplexity::Simple => write!(f, "simple"),
            TaskComplexity::Complex => write!(f, "complex"),
        }
    }
}

/// Why a query was classified the way it was
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationReason {
    /// A configured complexity phrase occurs in the query
    Keyword(String),
    /// The query has more words than the threshold
    WordCount(usize),
    /// Short query without complexity phrases
    ShortQuery(usize),
}

/// Classification result with its reason (for logging)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub complexity: TaskComplexity,
    pub reason: ClassificationReason,
}

/// Phrases that mark a query as needing tools or multi-step reasoning.
pub const DEFAULT_COMPLEXITY_KEYWORDS: &[&str] = &[
    // comparative / analytical
    "compare",
    "analyze",
    "analyse",
    "calculate",
    "compute",
    "evaluate",
    "summarize",
    "find the largest",
    "find the smallest",
    "largest",
    "smallest",
    "biggest",
    // counting / quantity
    "how many",
    "how much",
    "count",
    "total",
    "sum",
    "average",
    // local actions
    "list",
    "read",
    "write",
    "create",
    "delete",
    "execute",
    "run",
    "search",
    "find",
    "check",
    "directory",
    "folder",
    "file",
    "files",
];

/// Default word count above which a query is complex
pub const DEFAULT_WORD_THRESHOLD: usize = 6;

/// Tunable classifier parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityPolicy {
    /// Complexity-indicating phrases, matched on whole words
    pub keywords: Vec<String>,
    /// A query with more words than this is complex
    pub word_threshold: usize,
}

impl Default for ComplexityPolicy {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_COMPLEXITY_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            word_threshold: DEFAULT_WORD_THRESHOLD,
        }
    }
}

/// Classifies user queries as simple or complex.
#[derive(Debug, Clone)]
pub struct TaskComplexityClassifier {
    /// Keywords pre-split into lowercase word sequences
    phrases: Vec<(String, Vec<String>)>,
    word_threshold: usize,
}

impl TaskComplexityClassifier {
    pub fn new(policy: ComplexityPolicy) -> Self {
        let phrases = policy
            .keywords
            .iter()
            .map(|k| (k.clone(), normalized_words(k)))
            .filter(|(_, words)| !words.is_empty())
            .collect();

        Self {
            phrases,
            word_threshold: policy.word_threshold,
        }
    }

    pub fn classify(&self, query: &str) -> TaskComplexity {
        self.explain(query).complexity
    }

    /// Classify and report the deciding rule
    pub fn explain(&self, query: &str) -> Classification {
        let words = normalized_words(query);

        if let Some((keyword, _)) = self
            .phrases
            .iter()
            .find(|(_, phrase)| contains_sequence(&words, phrase))
        {
            return Classification {
                complexity: TaskComplexity::Complex,
                reason: ClassificationReason::Keyword(keyword.clone()),
            };
        }

        let word_count = query.split_whitespace().count();
        if word_count > self.word_threshold {
            Classification {
                complexity: TaskComplexity::Complex,
                reason: ClassificationReason::WordCount(word_count),
            }
        } else {
            Classification {
                complexity: TaskComplexity::Simple,
                reason: ClassificationReason::ShortQuery(word_count),
            }
        }
    }
}

impl Default for TaskComplexityClassifier {
    fn default() -> Self {
        Self::new(ComplexityPolicy::default())
    }
}

/// Lowercase alphanumeric words; punctuation acts as a separator.
fn normalized_words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

fn contains_sequence(haystack: &[String], needle: &[String]) -> bool {
    if needle.len() > haystack.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|window| window == needle)
}
