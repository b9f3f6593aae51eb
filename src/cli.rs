use crate::backend::{Backend, ExternalBackend, SourceBackend};
use crate::detector::FrameworkDetector;
use crate::extractor::{Framework, RouteRecord};
use crate::renderer::{self, OutputFormat};
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::path::PathBuf;

/// Route documentation extractor - Generate API documentation from Flask and Express sources
#[derive(Parser, Debug)]
#[command(name = "route-docgen")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the source tree (or a single source file)
    #[arg(value_name = "INPUT_PATH")]
    pub input_path: PathBuf,

    /// Output format (markdown, html, json, yaml, or both for markdown plus html)
    #[arg(short = 'f', long = "format", default_value = "markdown")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout). With `--format both` this is
    /// a directory that receives API_DOCS.md and index.html
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output_path: Option<PathBuf>,

    /// Web framework to parse: flask or express (if not specified, auto-detect)
    #[arg(short = 'w', long = "framework")]
    pub framework: Option<String>,

    /// Delegate parsing to an external program; it receives INPUT_PATH as last argument
    /// and must print the route list as JSON
    #[arg(long = "parser-command", value_name = "CMD", num_args = 1.., allow_hyphen_values = true, conflicts_with = "framework")]
    pub parser_command: Option<Vec<String>>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.input_path.exists() {
        anyhow::bail!("Input path does not exist: {}", args.input_path.display());
    }

    if let Some(ref command) = args.parser_command {
        if command.is_empty() {
            anyhow::bail!("--parser-command needs at least a program name");
        }
    }

    info!("Input path: {}", args.input_path.display());
    info!("Output format: {}", args.output_format.name());
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }
    if let Some(ref command) = args.parser_command {
        info!("Parser: external ({})", command.join(" "));
    } else if let Some(ref framework) = args.framework {
        info!("Framework: {}", framework);
    } else {
        info!("Framework: auto-detect");
    }

    Ok(args)
}

/// Picks the backends for this run: the external parser when one is given, otherwise the
/// requested framework, otherwise every framework the tree imports.
fn select_backends(args: &CliArgs) -> Result<Vec<Box<dyn Backend>>> {
    if let Some(ref command) = args.parser_command {
        let backend = ExternalBackend::from_command(command)
            .context("--parser-command needs at least a program name")?;
        return Ok(vec![Box::new(backend)]);
    }

    let frameworks = match args.framework {
        Some(ref name) => vec![name.parse::<Framework>()?],
        None => {
            info!("Detecting web frameworks...");
            let detection = FrameworkDetector::detect(&args.input_path)?;
            if detection.frameworks.is_empty() {
                anyhow::bail!(
                    "No supported web framework detected. Please specify a framework using --framework option.\n\
                     Supported frameworks: flask, express"
                );
            }
            info!("Detected frameworks: {:?}", detection.frameworks);
            detection.frameworks
        }
    };

    Ok(frameworks
        .into_iter()
        .map(|framework| Box::new(SourceBackend::new(framework)) as Box<dyn Backend>)
        .collect())
}

/// Runs the selected backends over the input path and concatenates their routes.
pub fn collect_routes(args: &CliArgs) -> Result<Vec<RouteRecord>> {
    let mut all_routes = Vec::new();

    for backend in select_backends(args)? {
        debug!("Extracting routes with backend: {}", backend.name());
        let routes = backend
            .parse(&args.input_path)
            .with_context(|| format!("{} backend failed", backend.name()))?;
        debug!("Extracted {} routes with {}", routes.len(), backend.name());
        all_routes.extend(routes);
    }

    Ok(all_routes)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting route extraction...");

    let routes = collect_routes(&args)?;
    info!("Extracted {} total routes", routes.len());

    if routes.is_empty() {
        warn!("No routes found under {}", args.input_path.display());
    }

    if let (OutputFormat::Both, Some(output_dir)) = (args.output_format, &args.output_path) {
        info!("Writing documentation into: {}", output_dir.display());
        for path in renderer::write_documents(&routes, args.output_format, output_dir)? {
            info!("Successfully wrote {}", path.display());
        }
        return Ok(());
    }

    info!("Rendering {} output...", args.output_format.name());
    let content = renderer::render(&routes, args.output_format)?;

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        renderer::write_to_file(&content, output_path)?;
        info!("Successfully wrote documentation to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    Ok(())
}
