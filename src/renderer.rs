//! Rendering of route lists into Markdown, HTML, JSON or YAML.
//!
//! JSON and YAML are the plain serde form of [`RouteRecord`], the same shape an external
//! parser prints. Markdown and HTML are human-oriented pages with one section per route;
//! [`OutputFormat::Both`] produces the two pages together, written as `API_DOCS.md` and
//! `index.html` into an output directory.

use crate::error::{Error, Result};
use crate::extractor::{MetadataValue, Parameter, ReturnEntry, RouteRecord};
use log::debug;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Html,
    /// Markdown and HTML pages side by side
    Both,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Html => "html",
            OutputFormat::Both => "both",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }

    /// Single-document formats and the file names they get inside an output directory
    pub fn documents(&self) -> &'static [(OutputFormat, &'static str)] {
        match self {
            OutputFormat::Markdown => &[(OutputFormat::Markdown, "API_DOCS.md")],
            OutputFormat::Html => &[(OutputFormat::Html, "index.html")],
            OutputFormat::Both => &[
                (OutputFormat::Markdown, "API_DOCS.md"),
                (OutputFormat::Html, "index.html"),
            ],
            OutputFormat::Json => &[(OutputFormat::Json, "routes.json")],
            OutputFormat::Yaml => &[(OutputFormat::Yaml, "routes.yaml")],
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "html" => Ok(OutputFormat::Html),
            "both" => Ok(OutputFormat::Both),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(format!(
                "unknown output format '{}' (expected markdown, html, both, json or yaml)",
                other
            )),
        }
    }
}

/// Renders `records` in the requested format.
///
/// [`OutputFormat::Both`] yields the Markdown page followed by the HTML page.
pub fn render(records: &[RouteRecord], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Markdown => Ok(render_markdown(records)),
        OutputFormat::Html => Ok(render_html(records)),
        OutputFormat::Both => Ok(format!(
            "{}\n{}",
            render_markdown(records),
            render_html(records)
        )),
        OutputFormat::Json => serialize_json(records),
        OutputFormat::Yaml => serialize_yaml(records),
    }
}

/// Renders every document of `format` into `dir`, returning the written paths.
///
/// # Errors
///
/// Returns [`Error::Io`] if the directory or a file cannot be written.
pub fn write_documents(
    records: &[RouteRecord],
    format: OutputFormat,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for &(document, file_name) in format.documents() {
        let path = dir.join(file_name);
        write_to_file(&render(records, document)?, &path)?;
        written.push(path);
    }
    Ok(written)
}

/// Serializes the route list to YAML.
///
/// # Errors
///
/// Returns [`Error::SerializationError`] if serialization fails.
pub fn serialize_yaml(records: &[RouteRecord]) -> Result<String> {
    debug!("Serializing {} routes to YAML", records.len());
    Ok(serde_yaml::to_string(records)?)
}

/// Serializes the route list to JSON with pretty printing.
///
/// # Errors
///
/// Returns [`Error::SerializationError`] if serialization fails.
pub fn serialize_json(records: &[RouteRecord]) -> Result<String> {
    debug!("Serializing {} routes to JSON", records.len());
    Ok(serde_json::to_string_pretty(records)?)
}

/// Renders the route list as a Markdown page.
///
/// Each record becomes a `## METHOD path` section holding, when present, the description,
/// the middleware chain, a parameter table, a response table and every other tag as a
/// `**name:** value` line.
pub fn render_markdown(records: &[RouteRecord]) -> String {
    let mut out = String::from("# API Documentation\n");

    if records.is_empty() {
        out.push_str("\n_No routes found._\n");
        return out;
    }

    for record in records {
        render_record(&mut out, record);
    }
    out
}

fn render_record(out: &mut String, record: &RouteRecord) {
    let _ = writeln!(out, "\n## {} {}", record.method, record.path);

    if !record.description.is_empty() {
        let _ = writeln!(out, "\n{}", record.description);
    }

    if !record.middlewares.is_empty() {
        let names: Vec<String> = record.middlewares.iter().map(|m| format!("`{}`", m)).collect();
        let _ = writeln!(out, "\n**Middlewares:** {}", names.join(", "));
    }

    if let Some(params) = record.metadata.get("param").and_then(MetadataValue::as_params) {
        render_parameters(out, params);
    }

    if let Some(entries) = record.metadata.get("returns").and_then(MetadataValue::as_returns) {
        render_responses(out, entries);
    }

    let mut tags = record
        .metadata
        .iter()
        .filter(|(name, value)| !is_table(name, value))
        .peekable();
    if tags.peek().is_some() {
        out.push('\n');
        for (name, value) in tags {
            let _ = writeln!(out, "**{}:** {}", name, tag_value(value));
        }
    }
}

/// Renders the route list as a standalone HTML page.
///
/// Sections mirror [`render_markdown`]: heading, description, middlewares, parameter and
/// response tables, then the remaining tags as a definition list.
pub fn render_html(records: &[RouteRecord]) -> String {
    let mut out = String::from(HTML_HEAD);

    if records.is_empty() {
        out.push_str("<p><em>No routes found.</em></p>\n");
    }
    for record in records {
        render_html_record(&mut out, record);
    }

    out.push_str("</body>\n</html>\n");
    out
}

const HTML_HEAD: &str = "<!DOCTYPE html>
<html lang=\"en\">
<head>
<meta charset=\"utf-8\">
<title>API Documentation</title>
<style>
body { font-family: sans-serif; max-width: 960px; margin: 2em auto; }
.method { font-weight: bold; text-transform: uppercase; }
table { border-collapse: collapse; }
th, td { border: 1px solid #ccc; padding: 4px 8px; text-align: left; }
</style>
</head>
<body>
<h1>API Documentation</h1>
";

fn render_html_record(out: &mut String, record: &RouteRecord) {
    let method = record.method.as_str();
    let _ = writeln!(out, "<section class=\"route\">");
    let _ = writeln!(
        out,
        "<h2><span class=\"method method-{}\">{}</span> <code>{}</code></h2>",
        method.to_ascii_lowercase(),
        method,
        escape_html(&record.path)
    );

    if !record.description.is_empty() {
        let _ = writeln!(out, "<p>{}</p>", escape_html(&record.description));
    }

    if !record.middlewares.is_empty() {
        let names: Vec<String> = record
            .middlewares
            .iter()
            .map(|m| format!("<code>{}</code>", escape_html(m)))
            .collect();
        let _ = writeln!(out, "<p><strong>Middlewares:</strong> {}</p>", names.join(", "));
    }

    if let Some(params) = record.metadata.get("param").and_then(MetadataValue::as_params) {
        out.push_str("<h3>Parameters</h3>\n<table>\n");
        out.push_str("<tr><th>Name</th><th>In</th><th>Type</th><th>Required</th><th>Description</th></tr>\n");
        for param in params {
            let _ = writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&param.name),
                param.location.as_str(),
                escape_html(&param_type_label(param)),
                if param.required { "yes" } else { "no" },
                escape_html(&param.description)
            );
        }
        out.push_str("</table>\n");
    }

    if let Some(entries) = record.metadata.get("returns").and_then(MetadataValue::as_returns) {
        out.push_str("<h3>Responses</h3>\n<table>\n");
        out.push_str("<tr><th>Status</th><th>Type</th><th>Description</th></tr>\n");
        for entry in entries {
            let _ = writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                entry.status_code,
                escape_html(&entry.return_type),
                escape_html(&entry.description)
            );
        }
        out.push_str("</table>\n");
    }

    let tags: Vec<(&String, &MetadataValue)> = record
        .metadata
        .iter()
        .filter(|(name, value)| !is_table(name, value))
        .collect();
    if !tags.is_empty() {
        out.push_str("<dl>\n");
        for (name, value) in tags {
            let _ = writeln!(
                out,
                "<dt>{}</dt><dd>{}</dd>",
                escape_html(name),
                escape_html(&tag_value(value))
            );
        }
        out.push_str("</dl>\n");
    }

    out.push_str("</section>\n");
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn param_type_label(param: &Parameter) -> String {
    match &param.format {
        Some(format) => format!("{} ({})", param.param_type, format),
        None => param.param_type.clone(),
    }
}

fn is_table(name: &str, value: &MetadataValue) -> bool {
    matches!(
        (name, value),
        ("param", MetadataValue::Params(_)) | ("returns", MetadataValue::Returns(_))
    )
}

fn render_parameters(out: &mut String, params: &[Parameter]) {
    out.push_str("\n**Parameters**\n\n");
    out.push_str("| Name | In | Type | Required | Description |\n");
    out.push_str("|------|----|------|----------|-------------|\n");
    for param in params {
        let param_type = param_type_label(param);
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            cell(&param.name),
            param.location.as_str(),
            cell(&param_type),
            if param.required { "yes" } else { "no" },
            cell(&param.description)
        );
    }
}

fn render_responses(out: &mut String, entries: &[ReturnEntry]) {
    out.push_str("\n**Responses**\n\n");
    out.push_str("| Status | Type | Description |\n");
    out.push_str("|--------|------|-------------|\n");
    for entry in entries {
        let _ = writeln!(
            out,
            "| {} | {} | {} |",
            entry.status_code,
            cell(&entry.return_type),
            cell(&entry.description)
        );
    }
}

fn tag_value(value: &MetadataValue) -> String {
    match value {
        MetadataValue::Text(text) => text.clone(),
        MetadataValue::List(items) => items.join(", "),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

// Table cells cannot hold pipes or line breaks
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Writes string content to a file.
///
/// Creates the file if it doesn't exist, or overwrites it if it does. Parent directories
/// are created as needed.
///
/// # Errors
///
/// Returns [`Error::Io`] if a directory or the file cannot be written.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }

    fs::write(path, content).map_err(|e| Error::io(path, e))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
