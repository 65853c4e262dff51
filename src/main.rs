use clap::{Parser, Subcommand};
use pagetree::{config, output, scan, store::Store};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::Level;

/// Where a tree comes from.
#[derive(clap::Args, Clone)]
struct TreeArgs {
    /// Tree JSON file, or a content directory to scan
    tree: PathBuf,
}

#[derive(Parser)]
#[command(name = "pagetree")]
#[command(about = "Derive navigation and URLs from a content tree")]
#[command(long_about = "\
Derive navigation and URLs from a content tree

The tree is either a JSON document (an array of page objects, each with an
optional `children` array) or a content directory:

  content/
  ├── index.md                     # Root frontmatter (optional)
  ├── 010-Docs/                    # Numbered = shown in navigation
  │   ├── index.md                 # +++ template = \"section\" +++
  │   ├── 010-Introduction.md      # First child of a section = redirect
  │   └── 020-Getting-Started.md   # → /Docs/Getting_Started/
  └── drafts.md                    # Unnumbered = hidden

Run 'pagetree gen-config' to generate a documented pagetree.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding pagetree.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a tree without printing navigation
    Check(TreeArgs),
    /// Print the navigation tree with resolved targets
    Nav {
        #[command(flatten)]
        source: TreeArgs,
        /// Write the derived manifest as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Scan a content directory into a tree JSON document
    Scan {
        /// Content directory
        dir: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print a stock pagetree.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Check(args) => {
            let mut store = open_store(&cli.config_dir)?;
            let outcome = store.replace_tree(load_tree(&args.tree)?);
            output::print_outcome(outcome);
            if store.is_reset() {
                std::process::exit(1);
            }
        }
        Command::Nav { source, json } => {
            let mut store = open_store(&cli.config_dir)?;
            let outcome = store.replace_tree(load_tree(&source.tree)?);
            let Some(site) = store.navigation() else {
                output::print_outcome(outcome);
                std::process::exit(1);
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&site.manifest())?);
            } else {
                output::print_nav(site);
            }
        }
        Command::Scan { dir, output: target } => {
            let tree = scan::scan(&dir)?;
            let json = serde_json::to_string_pretty(&tree)?;
            match target {
                Some(path) => std::fs::write(path, json)?,
                None => println!("{}", json),
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(config_dir: &Path) -> Result<Store, Box<dyn std::error::Error>> {
    let config = config::load_config(config_dir)?;
    Ok(Store::from_config(&config)?)
}

/// Read a tree from a JSON file, or scan it from a directory.
fn load_tree(path: &Path) -> Result<Vec<Value>, Box<dyn std::error::Error>> {
    if path.is_dir() {
        return Ok(scan::scan(path)?);
    }
    let content = std::fs::read_to_string(path)?;
    Ok(match serde_json::from_str(&content)? {
        Value::Array(items) => items,
        other => vec![other],
    })
}
