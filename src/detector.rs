use crate::error::Result;
use crate::extractor::Framework;
use crate::parser::{AstParser, ParsedFile};
use crate::scanner::FileScanner;
use crate::syntax;
use log::debug;
use std::collections::BTreeSet;
use std::path::Path;
use tree_sitter::Node;

/// Framework detector for identifying the web frameworks used in a source tree.
///
/// The `FrameworkDetector` parses the candidate sources of every supported framework and
/// looks at their imports:
///
/// - Flask: `import flask`, `from flask import Flask`
/// - Express: `require("express")`, `import express from "express"`
pub struct FrameworkDetector;

/// Result of framework detection.
pub struct DetectionResult {
    /// Detected frameworks, in a fixed order
    pub frameworks: Vec<Framework>,
}

impl FrameworkDetector {
    /// Detects the frameworks imported anywhere under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if `root` does not exist, or any IO error met while
    /// reading sources.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use route_docgen::detector::FrameworkDetector;
    /// use std::path::Path;
    ///
    /// let result = FrameworkDetector::detect(Path::new("./my-app")).unwrap();
    /// println!("Detected {} framework(s)", result.frameworks.len());
    /// ```
    pub fn detect(root: &Path) -> Result<DetectionResult> {
        let mut detected = BTreeSet::new();

        for &framework in Framework::all() {
            let scan_result = FileScanner::for_framework(root.to_path_buf(), framework).scan()?;
            let parsed_files = AstParser::parse_files(&scan_result.files, framework)?;

            if Self::detect_in(&parsed_files) {
                detected.insert(framework);
            }
        }

        let frameworks: Vec<Framework> = detected.into_iter().collect();
        debug!("Detected frameworks: {:?}", frameworks);

        Ok(DetectionResult { frameworks })
    }

    /// Whether any of the parsed files imports its framework
    pub fn detect_in(parsed_files: &[ParsedFile]) -> bool {
        parsed_files.iter().any(|parsed_file| {
            let source = parsed_file.source.as_str();
            let mut found = false;
            syntax::visit_all(&parsed_file.tree.root_node(), |node| {
                if found {
                    return;
                }
                found = match parsed_file.framework {
                    Framework::Flask => imports_flask(node, source),
                    Framework::Express => imports_express(node, source),
                };
            });
            found
        })
    }
}

fn imports_flask(node: &Node, source: &str) -> bool {
    let modules: Vec<Node> = match node.kind() {
        "import_from_statement" => node.child_by_field_name("module_name").into_iter().collect(),
        "import_statement" => {
            let mut cursor = node.walk();
            node.children_by_field_name("name", &mut cursor).collect()
        }
        _ => return false,
    };

    modules.iter().any(|module| {
        // `import flask as f` wraps the dotted name in an aliased_import
        let module = match module.kind() {
            "aliased_import" => match module.child_by_field_name("name") {
                Some(name) => name,
                None => return false,
            },
            _ => *module,
        };
        syntax::node_text(&module, source).split('.').next() == Some("flask")
    })
}

fn imports_express(node: &Node, source: &str) -> bool {
    match node.kind() {
        "import_statement" => node
            .child_by_field_name("source")
            .map(|s| string_value(&s, source) == "express")
            .unwrap_or(false),
        "call_expression" => {
            let is_require = node
                .child_by_field_name("function")
                .map(|f| f.kind() == "identifier" && syntax::node_text(&f, source) == "require")
                .unwrap_or(false);
            is_require
                && node
                    .child_by_field_name("arguments")
                    .and_then(|args| syntax::named_children(&args).into_iter().next())
                    .map(|arg| arg.kind() == "string" && string_value(&arg, source) == "express")
                    .unwrap_or(false)
        }
        _ => false,
    }
}

fn string_value<'a>(node: &Node, source: &'a str) -> &'a str {
    syntax::node_text(node, source).trim_matches(|c| c == '"' || c == '\'' || c == '`')
}
