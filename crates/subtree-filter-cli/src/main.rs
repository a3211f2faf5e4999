use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use subtree_filter::{netconf, prefix_of, Document, SubtreeFilter};

#[derive(Debug, Parser)]
#[command(
    name = "subtree-filter",
    version,
    about = "Inspect and apply RFC 6241 subtree filters"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
    /// Output file (defaults to stdout)
    #[arg(short, long, global = true, value_name = "OUTPUT")]
    output: Option<PathBuf>,
    /// More log output (-v debug, -vv trace); RUST_LOG applies otherwise
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a <filter> as an indented tree
    Pretty {
        /// Filter file (defaults to stdin)
        #[arg(value_name = "FILTER")]
        filter: Option<PathBuf>,
        /// Dump the filter model as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Read a <filter> and print it back in wire form
    Check {
        /// Filter file (defaults to stdin)
        #[arg(value_name = "FILTER")]
        filter: Option<PathBuf>,
    },
    /// Filter an <rpc-reply> with the subtree filter of its request
    Rpc {
        /// The <rpc> request
        #[arg(long, value_name = "REQUEST")]
        request: PathBuf,
        /// The unfiltered <rpc-reply>
        #[arg(long, value_name = "REPLY")]
        reply: PathBuf,
        /// Indent the output
        #[arg(long)]
        pretty: bool,
    },
    /// Filter a <notification> with a subscription filter
    Notification {
        /// The <filter> element
        #[arg(long, value_name = "FILTER")]
        filter: PathBuf,
        /// Notification file (defaults to stdin)
        #[arg(value_name = "NOTIFICATION")]
        notification: Option<PathBuf>,
        /// Indent the output
        #[arg(long)]
        pretty: bool,
    },
    /// Print the namespace prefixes generated for the given indices
    Prefix {
        #[arg(value_name = "INDEX", required = true)]
        indices: Vec<usize>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let output = match args.command {
        Command::Pretty { filter, json } => {
            let filter = read_filter(filter.as_deref())?;
            if json {
                serde_json::to_string_pretty(&filter).context("failed to encode filter as JSON")?
            } else {
                filter.pretty_tree()
            }
        }
        Command::Check { filter } => read_filter(filter.as_deref())?.to_xml_string(),
        Command::Rpc {
            request,
            reply,
            pretty,
        } => {
            let request = read_document(Some(&request))?;
            let reply = read_document(Some(&reply))?;
            let filtered = netconf::apply_rpc_subtree_filter(&request, reply)
                .context("failed to filter reply")?;
            render(&filtered, pretty)
        }
        Command::Notification {
            filter,
            notification,
            pretty,
        } => {
            let filter = read_document(Some(&filter))?;
            let notification = read_document(notification.as_deref())?;
            match netconf::apply_subtree_notification_filter(&filter.root, notification)
                .context("failed to filter notification")?
            {
                Some(document) => render(&document, pretty),
                None => {
                    eprintln!("notification filtered out");
                    return Ok(());
                }
            }
        }
        Command::Prefix { indices } => indices
            .iter()
            .map(|&index| prefix_of(index))
            .collect::<Vec<_>>()
            .join("\n"),
    };

    let mut output_data = output;
    output_data.push('\n');
    write_output(&args.output, output_data.as_bytes())?;
    Ok(())
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn render(document: &Document, pretty: bool) -> String {
    if pretty {
        document.to_pretty_string()
    } else {
        document.to_xml_string()
    }
}

fn read_filter(path: Option<&Path>) -> Result<SubtreeFilter> {
    let document = read_document(path)?;
    SubtreeFilter::read_from(&document.root).context("invalid subtree filter")
}

fn read_document(path: Option<&Path>) -> Result<Document> {
    let text = read_input(path)?;
    debug!("Parsing {} bytes", text.len());
    let label = path.map_or_else(|| "stdin".to_string(), |p| p.display().to_string());
    Document::parse_str(&text).with_context(|| format!("failed to parse XML from {label}"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.trim().is_empty() {
                bail!("no input provided on stdin");
            }
            Ok(buffer)
        }
    }
}

fn write_output(path: &Option<PathBuf>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(data).context("failed to write stdout")?;
            Ok(())
        }
    }
}
