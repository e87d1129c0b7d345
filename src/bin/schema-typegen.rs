//! Schema Type Generator CLI
//!
//! Command-line interface for resolving hyper-schema documents into types
//! and links.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use schema_typegen::{
    load_schema_auto, resolve_document, validate_example, GenerateError, Link, ResolveOptions,
    ResolvedDocument, Root, ValidateError,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-typegen")]
#[command(about = "Resolve JSON Hyper-Schema documents into template-ready types")]
#[command(version)]
struct Cli {
    /// Log resolution progress to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Schema source: file path or URL (http:// or https://)
    schema: String,

    /// Base URL of the API (default: the document's rel="self" link)
    #[arg(long)]
    base_url: Option<String>,

    /// Reject nodes declaring more than one non-null type
    #[arg(long)]
    strict_types: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a document and print its types and links as JSON
    Resolve {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print an example HTTP exchange for every link
    Links {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print the example value of one definition
    Example {
        #[command(flatten)]
        source: SourceArgs,

        /// Definition name (key under definitions / $defs)
        #[arg(long, short)]
        definition: String,

        /// Request view: omit readOnly properties instead of writeOnly ones
        #[arg(long)]
        request: bool,

        /// Validate the example against its schema
        #[arg(long)]
        check: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Resolve {
            source,
            output,
            pretty,
        } => run_resolve(&source, output, pretty),
        Commands::Links { source } => run_links(&source),
        Commands::Example {
            source,
            definition,
            request,
            check,
        } => run_example(&source, &definition, request, check),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn report(e: GenerateError) -> u8 {
    eprintln!("Error: {}", e);
    e.exit_code() as u8
}

/// Load the document named by `source` and wrap it with its options.
fn load_root(source: &SourceArgs) -> Result<Root, u8> {
    let document = load_schema_auto(&source.schema).map_err(|e| report(e.into()))?;

    let mut options = ResolveOptions::new().strict_types(source.strict_types);
    if let Some(url) = &source.base_url {
        options = options.base_url(url);
    }

    Root::new(document, &options).map_err(|e| report(e.into()))
}

fn resolve_root(root: &Root) -> Result<ResolvedDocument<'_>, u8> {
    resolve_document(root).map_err(report)
}

fn run_resolve(source: &SourceArgs, output: Option<PathBuf>, pretty: bool) -> Result<(), u8> {
    let root = load_root(source)?;
    let resolved = resolve_root(&root)?;

    let json_output = if pretty {
        serde_json::to_string_pretty(&resolved)
    } else {
        serde_json::to_string(&resolved)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_links(source: &SourceArgs) -> Result<(), u8> {
    let root = load_root(source)?;
    let resolved = resolve_root(&root)?;

    for (i, link) in resolved.links.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_exchange(link);
    }
    Ok(())
}

fn print_exchange(link: &Link<'_>) {
    if !link.title.is_empty() {
        println!("### {}", link.title);
    }
    println!("{} {} HTTP/1.1", link.method, link.request_target());
    for header in link.req_headers() {
        println!("{}: {}", header.key, header.value);
    }
    let req_body = link.req_body();
    if !req_body.is_empty() {
        println!();
        println!("{}", req_body);
    }

    println!();
    println!(
        "HTTP/1.1 {} {}",
        link.res_status_code(),
        link.res_reason_phrase()
    );
    for header in link.res_headers() {
        println!("{}: {}", header.key, header.value);
    }
    let res_body = link.res_body();
    if !res_body.is_empty() {
        println!();
        println!("{}", res_body);
    }
}

fn run_example(source: &SourceArgs, definition: &str, request: bool, check: bool) -> Result<(), u8> {
    let root = load_root(source)?;
    let resolved = resolve_root(&root)?;

    let Some(ty) = resolved.definition(definition) else {
        eprintln!("Error: no definition named \"{}\"", definition);
        return Err(2);
    };

    let example = ty.example(request);
    let rendered = serde_json::to_string_pretty(&example).map_err(|e| {
        eprintln!("Error serializing example: {}", e);
        2u8
    })?;
    println!("{}", rendered);

    if check {
        match validate_example(&root, ty, &example) {
            Ok(()) => eprintln!("Valid"),
            Err(ValidateError::Invalid { errors }) => {
                eprintln!("Example failed validation:");
                for error in errors {
                    eprintln!("  {}", error);
                }
                return Err(1);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return Err(e.exit_code() as u8);
            }
        }
    }

    Ok(())
}
