//! openapi-from-comments - Command-line tool for generating Swagger documentation.
//!
//! Scans source files for `/** ... */` comments carrying an `@swagger` tag, decodes the
//! YAML under each tag and merges the results into the `paths` of a Swagger document.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-comments [OPTIONS] <INPUT>...
//! ```
//!
//! # Examples
//!
//! Generate YAML documentation from a controllers directory:
//! ```bash
//! openapi-from-comments ./api/controllers -o swagger.yaml
//! ```
//!
//! Generate JSON with custom metadata and a failure report:
//! ```bash
//! openapi-from-comments ./api -f json --base base.yaml --report report.json
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_comments::cli;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("openapi-from-comments starting...");

    let args = cli::parse_args_from_parsed(args)?;

    cli::run(args).await?;

    info!("Document generation completed successfully");

    Ok(())
}
