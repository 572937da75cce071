//! Value objects produced by the pipeline.
//!
//! `Plan` and `Summary` are parsed strictly from model output: missing,
//! unknown, or mistyped fields fail at construction.

use litgraph_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Search plan emitted by the plan stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    /// Distinct, non-empty search terms in the order the model gave them.
    pub keywords: Vec<String>,
    pub min_year: i32,
    pub need_author_stats: bool,
}

impl Plan {
    /// Parse and validate model output. Any failure is a `Planning` error
    /// carrying the raw text.
    pub fn parse(raw: &str) -> Result<Self> {
        let plan: Plan = serde_json::from_str(raw.trim()).map_err(|e| Error::planning(e.to_string(), raw))?;
        plan.normalized().map_err(|reason| Error::planning(reason, raw))
    }

    fn normalized(mut self) -> std::result::Result<Self, String> {
        let mut seen = Vec::with_capacity(self.keywords.len());
        for keyword in self.keywords.drain(..) {
            let keyword = keyword.trim().to_string();
            if !keyword.is_empty() && !seen.contains(&keyword) {
                seen.push(keyword);
            }
        }
        if seen.is_empty() {
            return Err("plan has no keywords".into());
        }
        self.keywords = seen;
        Ok(self)
    }
}

/// Structured literature summary emitted by the synthesize stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Summary {
    pub topic: String,
    pub trends: Vec<String>,
    #[serde(rename = "notable_papers")]
    pub notable_items: Vec<String>,
    pub open_questions: Vec<String>,
}

impl Summary {
    pub fn parse(raw: &str) -> Result<Self> {
        let summary: Summary =
            serde_json::from_str(raw.trim()).map_err(|e| Error::synthesis(e.to_string(), raw))?;
        if summary.topic.trim().is_empty() {
            return Err(Error::synthesis("summary topic is empty", raw));
        }
        Ok(summary)
    }
}

/// One retrieved work, normalized from the search service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub title: String,
    pub authors: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub year: Option<i32>,
    /// DOI, when the service has one.
    pub external_id: Option<String>,
    pub source_url: String,
    /// Ranking signal; records are ordered by it, highest first.
    pub cited_by_count: u64,
}

/// Free-form author reputation data.
pub type AuthorStats = serde_json::Map<String, serde_json::Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_keywords_are_trimmed_and_deduplicated() {
        let plan = Plan::parse(r#"{"keywords":[" qubit ","qubit","","error correction"],"min_year":2019,"need_author_stats":false}"#)
            .unwrap();
        assert_eq!(plan.keywords, vec!["qubit", "error correction"]);
    }

    #[test]
    fn summary_uses_notable_papers_on_the_wire() {
        let s = Summary {
            topic: "t".into(),
            trends: vec![],
            notable_items: vec!["x".into()],
            open_questions: vec![],
        };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["notable_papers"][0], "x");
    }
}
