//! Route extraction module for parsing web framework route declarations.
//!
//! This module provides a unified interface for finding route sites in different web
//! frameworks, plus the framework-independent route record every backend produces. Each
//! framework has its own extractor that knows how its routes are declared.
//!
//! # Supported Frameworks
//!
//! - **Flask**: See [`flask::FlaskExtractor`]
//! - **Express**: See [`express::ExpressExtractor`]
//!
//! # Example
//!
//! ```no_run
//! use route_docgen::extractor::{flask::FlaskExtractor, ExtractorConfig, RouteExtractor};
//! use route_docgen::parser::AstParser;
//! use std::path::Path;
//!
//! let parsed = AstParser::parse_file(Path::new("app.py"), route_docgen::Framework::Flask).unwrap();
//! let extractor = FlaskExtractor::new(ExtractorConfig::default());
//! let sites = extractor.extract_sites(&[parsed]);
//! println!("Found {} route sites", sites.len());
//! ```

pub mod express;
pub mod flask;

use crate::error::Error;
use crate::parser::ParsedFile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Verb used when a routing call does not list its methods
pub const DEFAULT_METHOD: HttpMethod = HttpMethod::Get;

/// Type tag given to parameters whose type cannot be inferred
pub const DEFAULT_PARAM_TYPE: &str = "string";

/// Terminal attribute name of the routing decorator (`@app.route`, `@bp.route`)
pub const DEFAULT_ROUTE_ATTRIBUTE: &str = "route";

/// Placeholder path used when a routing call's path argument is not a string literal
pub const UNKNOWN_PATH: &str = "<unknown>";

/// Trait for finding route declarations in parsed source files.
///
/// Implementations know how one framework declares routes and turn each declaration into
/// a raw [`RouteSite`]. Normalization and record assembly happen later, in
/// [`crate::assembler`].
pub trait RouteExtractor {
    /// The framework whose declaration style this extractor understands
    fn framework(&self) -> Framework;

    /// Finds the route sites of a single parsed file, in source order.
    fn extract_file(&self, parsed_file: &ParsedFile) -> Vec<RouteSite>;

    /// Finds the route sites of every parsed file, preserving file order.
    fn extract_sites(&self, parsed_files: &[ParsedFile]) -> Vec<RouteSite> {
        parsed_files
            .iter()
            .flat_map(|parsed_file| self.extract_file(parsed_file))
            .collect()
    }
}

/// Web frameworks with a known route declaration style and dynamic-path grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Framework {
    /// Python decorators: `@app.route("/users/<int:id>", methods=["GET"])`
    Flask,
    /// JavaScript router calls: `router.get("/users/:id", auth, handler)`
    Express,
}

impl Framework {
    pub fn name(&self) -> &'static str {
        match self {
            Framework::Flask => "flask",
            Framework::Express => "express",
        }
    }

    /// File extensions holding this framework's sources
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Framework::Flask => &["py"],
            Framework::Express => &["js", "mjs", "cjs"],
        }
    }

    /// Directory names never descended into while scanning
    pub fn excluded_dirs(&self) -> &'static [&'static str] {
        match self {
            Framework::Flask => &["__pycache__"],
            Framework::Express => &["node_modules"],
        }
    }

    /// The tree-sitter grammar for this framework's source language
    pub fn language(&self) -> tree_sitter::Language {
        match self {
            Framework::Flask => tree_sitter_python::LANGUAGE.into(),
            Framework::Express => tree_sitter_javascript::LANGUAGE.into(),
        }
    }

    pub fn all() -> &'static [Framework] {
        &[Framework::Flask, Framework::Express]
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Framework {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flask" => Ok(Framework::Flask),
            "express" => Ok(Framework::Express),
            _ => Err(Error::UnsupportedFramework(s.to_string())),
        }
    }
}

/// Defaults threaded explicitly into the site detectors and the path normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    pub default_method: HttpMethod,
    pub default_param_type: String,
    pub route_attribute: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            default_method: DEFAULT_METHOD,
            default_param_type: DEFAULT_PARAM_TYPE.to_string(),
            route_attribute: DEFAULT_ROUTE_ATTRIBUTE.to_string(),
        }
    }
}

/// A route declaration as found in the source, before any normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSite {
    /// Handler function name, or `<anonymous>` for inline handlers
    pub handler: String,
    /// Declared verbs in declaration order, duplicates preserved
    pub methods: Vec<HttpMethod>,
    /// Path literal in framework-native syntax
    pub path: String,
    /// Attached decorators/callbacks other than the routing call itself
    pub middlewares: Vec<String>,
    /// Raw attached documentation (docstring or JSDoc body)
    pub doc: Option<String>,
    /// One-based source line of the declaration
    pub line: usize,
}

/// One HTTP-method/path binding, the canonical output of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub method: HttpMethod,
    pub path: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub middlewares: Vec<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Open tag-name → value mapping attached to each route.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A metadata value: scalar tags escalate to [`MetadataValue::List`] on repetition, while
/// `param` and `returns` are always structured sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    List(Vec<String>),
    Params(Vec<Parameter>),
    Returns(Vec<ReturnEntry>),
    /// Anything else an external backend emits; passed through untouched
    Other(serde_json::Value),
}

impl MetadataValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_params(&self) -> Option<&[Parameter]> {
        match self {
            MetadataValue::Params(params) => Some(params),
            _ => None,
        }
    }

    pub fn as_returns(&self) -> Option<&[ReturnEntry]> {
        match self {
            MetadataValue::Returns(entries) => Some(entries),
            _ => None,
        }
    }
}

/// HTTP methods a route record can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Parses a verb case-insensitively (`"get"`, `"GET"`).
    pub fn parse(method: &str) -> Option<Self> {
        match method.to_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "patch" => Some(HttpMethod::Patch),
            "delete" => Some(HttpMethod::Delete),
            "head" => Some(HttpMethod::Head),
            "options" => Some(HttpMethod::Options),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        HttpMethod::parse(&value).ok_or_else(|| format!("unknown HTTP method: {}", value))
    }
}

/// Where a request parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    Path,
    Query,
    Body,
    Header,
    FormData,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Body => "body",
            ParameterLocation::Header => "header",
            ParameterLocation::FormData => "formData",
        }
    }

    /// Parses the exact location token used in `@param` tags.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "path" => Some(ParameterLocation::Path),
            "query" => Some(ParameterLocation::Query),
            "body" => Some(ParameterLocation::Body),
            "header" => Some(ParameterLocation::Header),
            "formData" => Some(ParameterLocation::FormData),
            _ => None,
        }
    }
}

/// One request parameter of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(rename = "type", default = "default_param_type")]
    pub param_type: String,
    /// Path parameters are always required
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
    /// Refinement of `param_type`; only `"uuid"` is produced today
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

fn default_param_type() -> String {
    DEFAULT_PARAM_TYPE.to_string()
}

impl Parameter {
    /// Create a required path parameter with an empty description
    pub fn path(name: impl Into<String>, param_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: ParameterLocation::Path,
            param_type: param_type.into(),
            required: true,
            description: String::new(),
            format: None,
        }
    }
}

/// One documented response of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnEntry {
    #[serde(rename = "type")]
    pub return_type: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(default)]
    pub description: String,
}
