//! Parser for the structured tags inside a route's documentation block.
//!
//! A block is split into free-text description lines and `@key value` tag lines:
//!
//! ```text
//! Fetch a single user.
//!
//! @tag Users
//! @param {string} user_id.path.required - User ID
//! @param {integer} verbose.query - Include audit fields
//! @returns {object} 200 - The user
//! @returns {Error} 404 - No such user
//! ```
//!
//! `@param` and `@returns` have their own grammars and always collect into sequences.
//! Every other tag is a scalar that escalates to a sequence the second time its key shows
//! up. Lines that do not match their grammar are skipped; parsing never fails.

use crate::extractor::{Metadata, MetadataValue, Parameter, ParameterLocation, ReturnEntry};
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

/// `@param {type} name.location[.required] - description`
static PARAM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^@param\s+\{([^}]+)\}\s+([A-Za-z_][A-Za-z0-9_]*)\.(path|query|body|header|formData)(\.required)?(?:\s+-\s*(.*?)|\s*)$",
    )
    .expect("valid param pattern")
});

/// `@returns {type} NNN - description`
static RETURNS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@returns\s+\{([^}]+)\}\s+(\d{3})(?:\s+-\s*(.*?)|\s*)$")
        .expect("valid returns pattern")
});

/// `@key value`
static GENERIC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@([A-Za-z_][A-Za-z0-9_.-]*)(?:\s+(.*?))?\s*$").expect("valid tag pattern")
});

/// Description and metadata recovered from one documentation block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocBlock {
    pub description: String,
    pub metadata: Metadata,
}

/// Parses a documentation block into its description and tag metadata.
///
/// An absent or empty block yields an empty description and empty metadata.
pub fn parse_doc_block(doc: Option<&str>) -> DocBlock {
    let Some(doc) = doc else {
        return DocBlock::default();
    };

    let mut description_lines: Vec<&str> = Vec::new();
    let mut params: Vec<Parameter> = Vec::new();
    let mut returns: Vec<ReturnEntry> = Vec::new();
    let mut metadata = Metadata::new();

    for line in doc.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }
        if !line.starts_with('@') {
            description_lines.push(line);
            continue;
        }

        match tag_name(line) {
            "param" => match parse_param(line) {
                Some(param) => params.push(param),
                None => debug!("Dropping malformed @param tag: {}", line),
            },
            "returns" => match parse_returns(line) {
                Some(entry) => returns.push(entry),
                None => debug!("Dropping malformed @returns tag: {}", line),
            },
            _ => match parse_generic(line) {
                Some((key, value)) => insert_scalar(&mut metadata, key, value),
                None => debug!("Skipping malformed tag line: {}", line),
            },
        }
    }

    if !params.is_empty() {
        metadata.insert("param".to_string(), MetadataValue::Params(params));
    }
    if !returns.is_empty() {
        metadata.insert("returns".to_string(), MetadataValue::Returns(returns));
    }

    DocBlock {
        description: description_lines.join(" "),
        metadata,
    }
}

/// The word right after `@`, used to pick a grammar
fn tag_name(line: &str) -> &str {
    line[1..].split_whitespace().next().unwrap_or("")
}

fn parse_param(line: &str) -> Option<Parameter> {
    let caps = PARAM_PATTERN.captures(line)?;
    let location = ParameterLocation::parse(&caps[3])?;

    Some(Parameter {
        name: caps[2].to_string(),
        location,
        param_type: caps[1].trim().to_string(),
        required: caps.get(4).is_some() || location == ParameterLocation::Path,
        description: caps
            .get(5)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
        format: None,
    })
}

fn parse_returns(line: &str) -> Option<ReturnEntry> {
    let caps = RETURNS_PATTERN.captures(line)?;

    Some(ReturnEntry {
        return_type: caps[1].trim().to_string(),
        status_code: caps[2].parse().ok()?,
        description: caps
            .get(3)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
    })
}

fn parse_generic(line: &str) -> Option<(String, String)> {
    let caps = GENERIC_PATTERN.captures(line)?;
    let value = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    Some((caps[1].to_string(), value.to_string()))
}

/// First occurrence stores a string; each later one turns it into (or extends) a list.
fn insert_scalar(metadata: &mut Metadata, key: String, value: String) {
    match metadata.remove(&key) {
        None => {
            metadata.insert(key, MetadataValue::Text(value));
        }
        Some(MetadataValue::Text(first)) => {
            metadata.insert(key, MetadataValue::List(vec![first, value]));
        }
        Some(MetadataValue::List(mut values)) => {
            values.push(value);
            metadata.insert(key, MetadataValue::List(values));
        }
        Some(other) => {
            // structured keys never reach here; keep whatever was stored
            metadata.insert(key, other);
        }
    }
}
