use crate::error::{Error, Result};
use crate::extractor::Framework;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Syntax-tree parser for framework source files.
///
/// The `AstParser` wraps a tree-sitter parser loaded with the grammar of one framework's
/// source language (Python for Flask, JavaScript for Express). The resulting trees are
/// walked by the extractors in [`crate::extractor`].
///
/// # Example
///
/// ```no_run
/// use route_docgen::parser::AstParser;
/// use route_docgen::Framework;
/// use std::path::Path;
///
/// let parsed = AstParser::parse_file(Path::new("app.py"), Framework::Flask).unwrap();
/// println!("Root node: {}", parsed.tree.root_node().kind());
/// ```
pub struct AstParser {
    parser: tree_sitter::Parser,
    framework: Framework,
}

/// A successfully parsed source file with its syntax tree.
///
/// The source text is kept alongside the tree because tree-sitter nodes only carry byte
/// ranges into it.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// Full source text
    pub source: String,
    /// The parsed syntax tree
    pub tree: tree_sitter::Tree,
    /// Framework whose grammar produced the tree
    pub framework: Framework,
}

impl AstParser {
    /// Creates a parser loaded with `framework`'s grammar.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the grammar is incompatible with the linked tree-sitter
    /// runtime.
    pub fn new(framework: Framework) -> Result<Self> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&framework.language())
            .map_err(|e| Error::Parse {
                file: PathBuf::from(format!("<{} grammar>", framework)),
                message: e.to_string(),
            })?;
        Ok(Self { parser, framework })
    }

    /// Parses in-memory source text attributed to `path`.
    ///
    /// Syntax errors do not fail the parse: tree-sitter recovers and the extractors simply
    /// see fewer well-formed nodes.
    pub fn parse_source(&mut self, path: &Path, source: String) -> Result<ParsedFile> {
        let tree = self.parser.parse(&source, None).ok_or_else(|| Error::Parse {
            file: path.to_path_buf(),
            message: "parser produced no syntax tree".to_string(),
        })?;

        if tree.root_node().has_error() {
            debug!("Recovered from syntax errors in {}", path.display());
        }

        Ok(ParsedFile {
            path: path.to_path_buf(),
            source,
            tree,
            framework: self.framework,
        })
    }

    /// Reads and parses a single source file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the file does not exist, [`Error::Io`] if it cannot be
    /// read, or [`Error::Parse`] if no tree could be produced.
    pub fn parse_file(path: &Path, framework: Framework) -> Result<ParsedFile> {
        Self::new(framework)?.read_and_parse(path)
    }

    /// Parses multiple files with one parser, stopping at the first failure.
    ///
    /// File-system failures abort the whole run, so no partial list is returned.
    pub fn parse_files(paths: &[PathBuf], framework: Framework) -> Result<Vec<ParsedFile>> {
        debug!("Parsing {} {} files", paths.len(), framework);

        let mut parser = Self::new(framework)?;
        let parsed = paths
            .iter()
            .map(|path| parser.read_and_parse(path))
            .collect::<Result<Vec<_>>>()?;

        debug!("Parsing complete: {} files", parsed.len());
        Ok(parsed)
    }

    fn read_and_parse(&mut self, path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        self.parse_source(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    /// Helper function to create a temporary file with content
    fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        let mut file = fs::File::create(&file_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file_path
    }

    #[test]
    fn test_parse_valid_python_file() {
        let temp_dir = TempDir::new().unwrap();
        let code = r#"
from flask import Flask
app = Flask(__name__)

@app.route("/hello")
def hello():
    return "Hello"
"#;

        let file_path = create_temp_file(&temp_dir, "app.py", code);
        let parsed = AstParser::parse_file(&file_path, Framework::Flask).unwrap();

        assert_eq!(parsed.path, file_path);
        assert_eq!(parsed.framework, Framework::Flask);
        assert_eq!(parsed.tree.root_node().kind(), "module");
        assert!(!parsed.tree.root_node().has_error());
    }

    #[test]
    fn test_parse_valid_javascript_file() {
        let temp_dir = TempDir::new().unwrap();
        let code = r#"
const express = require('express');
const app = express();
app.get('/users', (req, res) => res.send('Users'));
"#;

        let file_path = create_temp_file(&temp_dir, "app.js", code);
        let parsed = AstParser::parse_file(&file_path, Framework::Express).unwrap();

        assert_eq!(parsed.tree.root_node().kind(), "program");
    }

    #[test]
    fn test_parse_broken_file_still_yields_tree() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = create_temp_file(&temp_dir, "broken.py", "def broken(:\n    x = \n");

        let parsed = AstParser::parse_file(&file_path, Framework::Flask).unwrap();
        assert!(parsed.tree.root_node().has_error());
    }

    #[test]
    fn test_parse_nonexistent_file() {
        let result = AstParser::parse_file(Path::new("/nonexistent/app.py"), Framework::Flask);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_parse_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = create_temp_file(&temp_dir, "empty.js", "");

        let parsed = AstParser::parse_file(&file_path, Framework::Express).unwrap();
        assert_eq!(parsed.tree.root_node().named_child_count(), 0);
    }

    #[test]
    fn test_parse_files_batch() {
        let temp_dir = TempDir::new().unwrap();
        let file1 = create_temp_file(&temp_dir, "a.py", "def a(): pass");
        let file2 = create_temp_file(&temp_dir, "b.py", "def b(): pass");

        let parsed = AstParser::parse_files(&[file1.clone(), file2.clone()], Framework::Flask)
            .unwrap();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].path, file1);
        assert_eq!(parsed[1].path, file2);
    }

    #[test]
    fn test_parse_files_aborts_on_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let file1 = create_temp_file(&temp_dir, "a.py", "def a(): pass");
        let missing = temp_dir.path().join("gone.py");

        let result = AstParser::parse_files(&[file1, missing.clone()], Framework::Flask);
        assert!(matches!(result, Err(Error::NotFound(ref p)) if p == &missing));
    }

    #[test]
    fn test_parse_files_empty_list() {
        let parsed = AstParser::parse_files(&[], Framework::Express).unwrap();
        assert!(parsed.is_empty());
    }
}
