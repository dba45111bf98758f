use crate::decoder::KeyPolicy;
use crate::pipeline::{BuildConfig, DEFAULT_MAX_CONCURRENCY};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

/// Generate a Swagger document from @swagger annotations in source comments
#[derive(Parser, Debug)]
#[command(name = "openapi-from-comments")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Source files or directories to scan
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// File extensions to pick up when scanning directories
    #[arg(short = 'e', long = "ext", value_name = "EXT", default_value = "js")]
    pub extensions: Vec<String>,

    /// Tag name (without @) that marks annotation comments
    #[arg(short = 'm', long = "marker", default_value = "swagger")]
    pub marker: String,

    /// Maximum number of files processed concurrently
    #[arg(short = 'j', long = "jobs", default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub jobs: usize,

    /// How annotations with zero or several top-level paths are handled
    #[arg(long = "key-policy", value_enum, default_value = "first-key")]
    pub key_policy: KeyPolicyArg,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Base document (YAML or JSON) providing info, tags, schemes and other metadata
    #[arg(short = 'b', long = "base", value_name = "FILE")]
    pub base_path: Option<PathBuf>,

    /// Output only the aggregated paths mapping
    #[arg(long = "paths-only")]
    pub paths_only: bool,

    /// Do not generate a tag per input file
    #[arg(long = "no-file-tags")]
    pub no_file_tags: bool,

    /// Write the per-file success/failure report as JSON to this file
    #[arg(long = "report", value_name = "FILE")]
    pub report_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Key policy options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyPolicyArg {
    /// Reject annotations that do not hold exactly one path
    Strict,
    /// Ignore empty annotations and use the first path of multi-path ones
    FirstKey,
}

impl From<KeyPolicyArg> for KeyPolicy {
    fn from(arg: KeyPolicyArg) -> Self {
        match arg {
            KeyPolicyArg::Strict => KeyPolicy::Strict,
            KeyPolicyArg::FirstKey => KeyPolicy::FirstKey,
        }
    }
}

impl CliArgs {
    /// Library settings derived from the arguments
    pub fn build_config(&self) -> BuildConfig {
        BuildConfig::default()
            .with_marker(self.marker.clone())
            .with_max_concurrency(self.jobs)
            .with_key_policy(self.key_policy.into())
    }
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    for input in &args.inputs {
        if !input.exists() {
            anyhow::bail!("Input path does not exist: {}", input.display());
        }
    }

    if let Some(ref base) = args.base_path {
        if !base.is_file() {
            anyhow::bail!("Base document is not a file: {}", base.display());
        }
    }

    args.build_config().validate()?;

    info!("Inputs: {}", args.inputs.len());
    info!("Marker: @{}", args.marker);
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Expands directories into the matching files they contain; files are kept as given.
pub fn collect_files(args: &CliArgs) -> Result<Vec<PathBuf>> {
    use crate::scanner::FileScanner;

    let mut files = Vec::new();

    for input in &args.inputs {
        if input.is_dir() {
            debug!("Scanning directory: {}", input.display());
            let scan_result = FileScanner::new(input.clone())
                .with_extensions(&args.extensions)
                .scan()?;
            for warning in &scan_result.warnings {
                warn!("{}", warning);
            }
            files.extend(scan_result.files);
        } else {
            files.push(input.clone());
        }
    }

    Ok(files)
}

/// Run the main workflow
pub async fn run(args: CliArgs) -> Result<()> {
    use crate::document::{load_base, DocumentBuilder};
    use crate::pipeline::build;
    use crate::serializer::{serialize_json, serialize_yaml, write_to_file};

    info!("Starting document generation...");

    // Step 1: Enumerate source files
    let files = collect_files(&args)?;
    info!("Found {} source files", files.len());

    if files.is_empty() {
        warn!("No source files found in the given inputs");
    }

    // Step 2: Extract, decode and aggregate annotations
    let config = args.build_config();
    let aggregated = build(files.clone(), &config).await?;

    for failure in &aggregated.failures {
        if let Some(e) = failure.error() {
            warn!("{}: {}", failure.source_file.display(), e);
        }
    }

    if aggregated.successes.is_empty() {
        warn!("No file produced usable annotations; the document is not available yet");
    }

    // Step 3: Serialize the paths alone or the full document
    info!("Serializing to {:?} format...", args.output_format);
    let content = if args.paths_only {
        match args.output_format {
            OutputFormat::Yaml => serialize_yaml(&aggregated.paths)?,
            OutputFormat::Json => serialize_json(&aggregated.paths)?,
        }
    } else {
        let mut builder = DocumentBuilder::new();
        if let Some(ref base) = args.base_path {
            builder = builder.with_base(load_base(base)?);
        }
        if !args.no_file_tags {
            builder = builder.with_file_tags(&files);
        }
        let document = builder.build(&aggregated);

        match args.output_format {
            OutputFormat::Yaml => serialize_yaml(&document)?,
            OutputFormat::Json => serialize_json(&document)?,
        }
    };

    // Step 4: Output to file or stdout
    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
    } else {
        println!("{}", content);
    }

    // Step 5: Optional diagnostics report
    if let Some(report_path) = &args.report_path {
        let report = serialize_json(&aggregated.report())?;
        write_to_file(&report, report_path)?;
        info!("Wrote build report to {}", report_path.display());
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Files processed: {}", files.len());
    info!("  - Files with annotations: {}", aggregated.successes.len());
    info!("  - Files failed: {}", aggregated.failures.len());
    info!("  - Paths: {}", aggregated.paths.len());

    Ok(())
}
