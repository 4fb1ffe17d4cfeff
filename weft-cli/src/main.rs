use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use weft_cli::{compile_cmd, parse_assignment, render_cmd, Assignment};

#[derive(Parser)]
#[command(name = "weft", version, about = "Weft template compiler")]
struct Cli {
    /// More log output (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a template and print its build ops and refresh steps.
    Compile {
        /// Path to the template markup
        input: PathBuf,
        /// Adopt an existing root instead of creating one
        #[arg(long)]
        adopt_root: bool,
        /// Template name used in listings (default: file stem)
        #[arg(long)]
        name: Option<String>,
    },
    /// Build a template into a headless document and print its markup.
    Render {
        /// Path to the template markup
        input: PathBuf,
        /// Initial component property, NAME=VALUE
        #[arg(long = "set", value_parser = parse_assignment_arg)]
        props: Vec<Assignment>,
        /// Property change applied after build, NAME=VALUE
        #[arg(long = "update", value_parser = parse_assignment_arg)]
        updates: Vec<Assignment>,
        /// Build into a pre-created root element
        #[arg(long)]
        adopt_root: bool,
    },
}

fn parse_assignment_arg(raw: &str) -> Result<Assignment, String> {
    parse_assignment(raw).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let output = match cli.command {
        Commands::Compile {
            input,
            adopt_root,
            name,
        } => compile_cmd(&input, adopt_root, name.as_deref())?,
        Commands::Render {
            input,
            props,
            updates,
            adopt_root,
        } => render_cmd(&input, &props, &updates, adopt_root)?,
    };
    print!("{output}");
    Ok(())
}
