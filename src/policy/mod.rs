//! Reimbursement policy documents: text extraction, cleaning and reporting
//!
//! Three independent steps, each usable on its own:
//! 1. `pdf_extractor` pulls raw text out of a policy PDF
//! 2. `cleaner` collapses whitespace, isolates the PURPOSE..Codes section and strips boilerplate
//! 3. `report` renders extracted rule data as an HTML report

pub mod pdf_extractor;
pub mod cleaner;
pub mod report;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Structured rule data for one policy document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyData {
    #[serde(default)]
    pub policy_name: Option<Value>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// One reimbursement rule
///
/// Fields come from model output and are kept as loose JSON values, so a
/// `"Valid"` where a boolean was expected still renders instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub rule_name: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub sql: Option<Value>,
    /// Whether the generated SQL passed validation
    #[serde(default)]
    pub sql_valid: Option<Value>,
    /// Codes referenced by the rule that were not found in the policy
    #[serde(default)]
    pub invalid_codes: Option<Value>,
    /// Either a numeric score or a label like "High"
    #[serde(default)]
    pub logic_confidence: Option<Value>,
    #[serde(default)]
    pub classification: Option<Value>,
    /// Verbatim supporting quote from the policy text
    #[serde(default)]
    pub quote: Option<Value>,
    #[serde(default)]
    pub quote_valid: Option<Value>,
}

/// `null`, `false`, `0`, `""`, `[]` and `{}` carry no report
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

impl PolicyData {
    /// Parse policy data from JSON. Blank input and falsy values such as
    /// `null` or `{}` yield `None`; any other object is a report, even one
    /// without a name or rules.
    pub fn from_json_str(json: &str) -> Result<Option<PolicyData>> {
        if json.trim().is_empty() {
            return Ok(None);
        }
        let value: Value = serde_json::from_str(json)?;
        if is_falsy(&value) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }

    pub fn from_json_file(path: &Path) -> Result<Option<PolicyData>> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json_str(&content)
    }
}
