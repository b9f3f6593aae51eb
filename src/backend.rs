//! Backends turn an input root into the canonical route list.
//!
//! In-process backends walk, parse and extract with tree-sitter. The external backend
//! hands the whole root to another program and reads the same route list back from its
//! standard output, for source languages that cannot be parsed here.

use crate::assembler::RouteAssembler;
use crate::error::{Error, Result};
use crate::extractor::express::ExpressExtractor;
use crate::extractor::flask::FlaskExtractor;
use crate::extractor::{ExtractorConfig, Framework, RouteExtractor, RouteRecord};
use crate::parser::AstParser;
use crate::scanner::FileScanner;
use log::{debug, info};
use std::path::Path;
use std::process::Command;

/// Anything that can produce route records for an input root.
pub trait Backend {
    /// Human-readable backend name for logs
    fn name(&self) -> String;

    /// Extracts every route under `input_root`.
    ///
    /// Runs synchronously; a failure aborts the whole run with no partial output.
    fn parse(&self, input_root: &Path) -> Result<Vec<RouteRecord>>;
}

/// Backend that parses sources in-process with tree-sitter
pub struct SourceBackend {
    extractor: Box<dyn RouteExtractor>,
    config: ExtractorConfig,
}

impl SourceBackend {
    pub fn new(framework: Framework) -> Self {
        Self::with_config(framework, ExtractorConfig::default())
    }

    pub fn with_config(framework: Framework, config: ExtractorConfig) -> Self {
        let extractor: Box<dyn RouteExtractor> = match framework {
            Framework::Flask => Box::new(FlaskExtractor::new(config.clone())),
            Framework::Express => Box::new(ExpressExtractor::new(config.clone())),
        };
        Self { extractor, config }
    }

    pub fn framework(&self) -> Framework {
        self.extractor.framework()
    }
}

impl Backend for SourceBackend {
    fn name(&self) -> String {
        self.framework().to_string()
    }

    fn parse(&self, input_root: &Path) -> Result<Vec<RouteRecord>> {
        let framework = self.framework();

        info!("Scanning {} for {} sources...", input_root.display(), framework);
        let scan_result = FileScanner::for_framework(input_root.to_path_buf(), framework).scan()?;
        info!("Found {} source files", scan_result.files.len());

        let parsed_files = AstParser::parse_files(&scan_result.files, framework)?;

        let sites = self.extractor.extract_sites(&parsed_files);
        debug!("Detected {} route sites", sites.len());

        let records = RouteAssembler::new(framework, self.config.clone()).assemble(&sites);
        info!("Extracted {} routes", records.len());
        Ok(records)
    }
}

/// Backend that delegates to an external parser process.
///
/// The process is invoked once as `<program> <args...> <input_root>`, with no timeout and
/// no retry. It must print the route list as JSON on stdout and signal failure through its
/// exit status, with the cause on stderr.
pub struct ExternalBackend {
    program: String,
    args: Vec<String>,
}

impl ExternalBackend {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Builds a backend from a command line such as `["node", "parser.js"]`.
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    fn command_line(&self, input_root: &Path) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.push(input_root.display().to_string());
        parts.join(" ")
    }
}

impl Backend for ExternalBackend {
    fn name(&self) -> String {
        format!("external ({})", self.program)
    }

    fn parse(&self, input_root: &Path) -> Result<Vec<RouteRecord>> {
        if !input_root.exists() {
            return Err(Error::NotFound(input_root.to_path_buf()));
        }

        let command = self.command_line(input_root);
        info!("Running external parser: {}", command);

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(input_root)
            .output()
            .map_err(|e| Error::ExternalParser {
                command: command.clone(),
                message: format!("failed to start: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(Error::ExternalParser {
                command,
                message: format!("{}: {}", output.status, stderr),
            });
        }

        let records: Vec<RouteRecord> =
            serde_json::from_slice(&output.stdout).map_err(|e| Error::ExternalParser {
                command: command.clone(),
                message: format!("malformed output: {}", e),
            })?;

        info!("External parser returned {} routes", records.len());
        Ok(records)
    }
}
