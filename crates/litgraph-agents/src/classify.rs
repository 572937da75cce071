//! Keyword classifier for incoming queries.

use litgraph_core::config::ClassifierSettings;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Research,
    Theory,
    Coding,
    /// Nothing matched. Handled by the coding handler.
    Planning,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Theory => "theory",
            Self::Coding => "coding",
            Self::Planning => "planning",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Substring match over the lowercased query. Research terms win over
/// theory terms, which win over coding terms.
#[derive(Clone, Debug)]
pub struct Classifier {
    research: Vec<String>,
    theory: Vec<String>,
    coding: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ClassifierSettings::default())
    }
}

impl Classifier {
    pub fn new(settings: &ClassifierSettings) -> Self {
        let lower = |words: &[String]| -> Vec<String> {
            words
                .iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect()
        };
        Self {
            research: lower(settings.research.as_slice()),
            theory: lower(settings.theory.as_slice()),
            coding: lower(settings.coding.as_slice()),
        }
    }

    pub fn classify(&self, query: &str) -> QueryType {
        let q = query.to_lowercase();
        let hit = |words: &[String]| words.iter().any(|w| q.contains(w.as_str()));
        if hit(self.research.as_slice()) {
            QueryType::Research
        } else if hit(self.theory.as_slice()) {
            QueryType::Theory
        } else if hit(self.coding.as_slice()) {
            QueryType::Coding
        } else {
            QueryType::Planning
        }
    }
}
