//! Rewrites framework-native dynamic path segments into `{name}` placeholders.
//!
//! - Express: `/users/:id` → `/users/{id}`, every parameter typed with the default type.
//! - Flask: `/users/<int:id>` → `/users/{id}` with the converter mapped to a type tag
//!   (`int` → `integer`, `float` → `number`, `uuid` → `string` + `format: uuid`).
//!
//! Express regex constraints (`:id(\d+)`) and optional markers (`:tab?`) are consumed along
//! with the name. Path parameters stay required either way.
//!
//! Already-canonical `{name}` segments match neither grammar, so normalizing twice is a
//! no-op. The `<unknown>` placeholder for non-literal paths is returned as is.

use crate::error::Result;
use crate::extractor::{ExtractorConfig, Framework, Parameter, UNKNOWN_PATH};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static EXPRESS_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r":([A-Za-z_][A-Za-z0-9_]*)(?:\((?:[^()]|\([^()]*\))*\))?\??")
        .expect("valid express param pattern")
});

static FLASK_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?:([A-Za-z_][A-Za-z0-9_]*):)?([A-Za-z_][A-Za-z0-9_]*)>")
        .expect("valid flask param pattern")
});

/// A path parameter recovered from the path string itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedParam {
    pub parameter: Parameter,
    /// Whether the path syntax carried an explicit type token (`<int:id>`)
    pub typed: bool,
}

/// Canonical path plus the parameters found in it, in occurrence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPath {
    pub path: String,
    pub params: Vec<ExtractedParam>,
}

/// Normalizes `path` using `framework`'s dynamic segment grammar.
pub fn normalize(path: &str, framework: Framework, config: &ExtractorConfig) -> NormalizedPath {
    if path == UNKNOWN_PATH {
        return NormalizedPath {
            path: path.to_string(),
            params: Vec::new(),
        };
    }

    match framework {
        Framework::Express => normalize_express(path, config),
        Framework::Flask => normalize_flask(path, config),
    }
}

/// Normalizes `path` for a framework given by name.
///
/// # Errors
///
/// Returns [`crate::Error::UnsupportedFramework`] when no dynamic-path grammar is known for
/// `framework`.
pub fn normalize_path_parameters(path: &str, framework: &str) -> Result<NormalizedPath> {
    let framework: Framework = framework.parse()?;
    Ok(normalize(path, framework, &ExtractorConfig::default()))
}

fn normalize_express(path: &str, config: &ExtractorConfig) -> NormalizedPath {
    let mut params = Vec::new();

    let normalized = EXPRESS_PARAM.replace_all(path, |caps: &Captures| {
        let name = &caps[1];
        params.push(ExtractedParam {
            parameter: Parameter::path(name, config.default_param_type.as_str()),
            typed: false,
        });
        format!("{{{}}}", name)
    });

    NormalizedPath {
        path: normalized.into_owned(),
        params,
    }
}

fn normalize_flask(path: &str, config: &ExtractorConfig) -> NormalizedPath {
    let mut params = Vec::new();

    let normalized = FLASK_PARAM.replace_all(path, |caps: &Captures| {
        let converter = caps.get(1).map(|m| m.as_str());
        let name = &caps[2];

        let mut parameter = Parameter::path(name, flask_type(converter, config));
        if converter == Some("uuid") {
            parameter.format = Some("uuid".to_string());
        }
        params.push(ExtractedParam {
            parameter,
            typed: converter.is_some(),
        });
        format!("{{{}}}", name)
    });

    NormalizedPath {
        path: normalized.into_owned(),
        params,
    }
}

/// Maps a Flask URL converter to a parameter type tag
fn flask_type(converter: Option<&str>, config: &ExtractorConfig) -> String {
    match converter {
        Some("int") => "integer".to_string(),
        Some("float") => "number".to_string(),
        Some("string" | "uuid" | "path") => "string".to_string(),
        _ => config.default_param_type.clone(),
    }
}
