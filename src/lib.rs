//! Route documentation extractor for Flask and Express code bases.
//!
//! This library statically analyzes web application sources and produces one record per
//! HTTP-method/path binding, enriched with the documentation attached to each handler
//! (Python docstrings or JSDoc blocks). Nothing is executed: routes are found in the syntax
//! trees built by tree-sitter.
//!
//! # Supported Frameworks
//!
//! - **Flask**: `@app.route(...)` and the `@bp.get(...)`-style shortcuts
//! - **Express**: `app.get(path, ...)` calls and `router.route(path).get(...)` chains
//!
//! # Architecture
//!
//! 1. [`scanner`] - Walks the input root for the framework's source files
//! 2. [`parser`] - Parses each file with the framework's tree-sitter grammar
//! 3. [`detector`] - Finds which frameworks a tree imports
//! 4. [`extractor`] - Locates route sites and defines the record model
//! 5. [`doc_tags`] - Parses `@tag` lines out of attached documentation
//! 6. [`path_normalizer`] - Rewrites dynamic segments to `{name}` form
//! 7. [`param_merger`] - Reconciles path-derived and documented parameters
//! 8. [`assembler`] - Turns route sites into route records
//! 9. [`backend`] - In-process and external-process pipelines behind one trait
//! 10. [`renderer`] - Markdown, JSON and YAML output
//!
//! # Example Usage
//!
//! ```no_run
//! use route_docgen::{extract_routes, renderer::render_markdown, Framework};
//!
//! let routes = extract_routes("./my-app", Framework::Flask).unwrap();
//! println!("{}", render_markdown(&routes));
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod assembler;
pub mod backend;
pub mod cli;
pub mod detector;
pub mod doc_tags;
pub mod error;
pub mod extractor;
pub mod param_merger;
pub mod parser;
pub mod path_normalizer;
pub mod renderer;
pub mod scanner;
pub mod syntax;

pub use error::{Error, Result};
pub use extractor::{
    ExtractorConfig, Framework, HttpMethod, Metadata, MetadataValue, Parameter,
    ParameterLocation, ReturnEntry, RouteRecord,
};

use backend::{Backend, SourceBackend};
use std::path::Path;

/// Extracts every route of `framework` under `input_root` with the default configuration.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the root does not exist, or the first IO/parse failure
/// met while reading sources.
pub fn extract_routes(input_root: impl AsRef<Path>, framework: Framework) -> Result<Vec<RouteRecord>> {
    SourceBackend::new(framework).parse(input_root.as_ref())
}
