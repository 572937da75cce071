//! System prompts and the structured inputs handed to the model.

use crate::models::{AuthorStats, Plan, Record, Summary};
use litgraph_core::Result;
use serde_json::json;

pub const PLAN_PROMPT: &str = "\
You plan literature searches. Read the user's request and reply with one JSON object \
and nothing else, with exactly these fields:
  \"keywords\": array of short search terms,
  \"min_year\": integer, the earliest publication year of interest,
  \"need_author_stats\": boolean, true only if the user asks about authors or their impact.
Do not add other fields.";

pub const SYNTHESIS_PROMPT: &str = "\
You write structured literature summaries. You receive a JSON document with the search \
plan, the retrieved papers, and optional author statistics. Reply with one JSON object \
and nothing else, with exactly these fields:
  \"topic\": string,
  \"trends\": array of strings,
  \"notable_papers\": array of strings, each naming a paper and why it matters,
  \"open_questions\": array of strings.
Base every statement on the papers provided.";

pub const FORMAT_PROMPT: &str = "\
You turn a structured literature summary into a short report for a reader. Write a \
single flowing paragraph of plain prose. Do not use lists, bullet points, headings, or \
the names of the JSON fields.";

/// JSON document given to the synthesize stage.
pub fn synthesis_input(plan: &Plan, records: &[Record], author_stats: Option<&AuthorStats>) -> Result<String> {
    let stats = match author_stats {
        Some(stats) => serde_json::Value::Object(stats.clone()),
        None => serde_json::Value::String("N/A".into()),
    };
    let doc = json!({
        "plan": plan,
        "papers": records,
        "author_stats": stats,
    });
    Ok(serde_json::to_string_pretty(&doc)?)
}

pub fn format_input(summary: &Summary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}
