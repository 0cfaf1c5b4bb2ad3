use anyhow::Result;
use bindiff_core::model::Role;
use bindiff_core::services::Column;
use bindiff_viewer::commands::{
    locate_command, match_info_command, port_symbols_command, show_matches_command,
    SessionOptions,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Browse BinDiff function matches and port names between the two binaries.
///
/// This CLI is a thin wrapper around `bindiff-core` (exposed in code as
/// `bindiff_core`). The symbol file passed with `--symbols` stands in for the
/// symbol table of the binary currently open in a disassembler.
#[derive(Parser, Debug)]
#[command(
    name = "bindiff-viewer",
    version,
    about = "BinDiff match viewer and symbol porter",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Options shared by every command that opens a diff session.
#[derive(Args, Debug)]
struct SessionArgs {
    /// Path to the match database (`*.BinDiff`).
    #[arg(long)]
    db: String,

    /// Which side of the diff the symbol file belongs to: none, primary or secondary.
    #[arg(long, default_value = "none")]
    role: Role,

    /// JSON/YAML symbol file of the live binary.
    #[arg(long)]
    symbols: Option<String>,

    /// Optional viewer config (JSON/YAML).
    #[arg(long)]
    config: Option<String>,

    /// Sort column (similarity, confidence, p-address, p-name, s-address, s-name, algorithm).
    #[arg(long)]
    sort: Option<Column>,

    /// Sort descending instead of ascending.
    #[arg(long)]
    descending: bool,
}

impl From<SessionArgs> for SessionOptions {
    fn from(args: SessionArgs) -> Self {
        Self {
            db: args.db,
            role: args.role,
            symbols: args.symbols,
            config: args.config,
            sort: args.sort,
            descending: args.descending,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the match table with resolved function names.
    Show {
        #[command(flatten)]
        session: SessionArgs,

        /// Emit JSON instead of a text table.
        #[arg(long)]
        json: bool,

        /// Paint score cells with their red-to-green background.
        #[arg(long)]
        color: bool,

        /// Only show the first N rows.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Port names from the other side into the symbol file.
    ///
    /// Only addresses that have no name yet (or only an auto-generated one)
    /// are renamed.
    Port {
        #[command(flatten)]
        session: SessionArgs,

        /// Comma-separated row indices as printed by `show`.
        #[arg(long, value_delimiter = ',')]
        rows: Vec<usize>,

        /// Port every row.
        #[arg(long)]
        all: bool,

        /// Report what would be ported without writing the symbol file.
        #[arg(long)]
        dry_run: bool,

        /// Emit JSON reports.
        #[arg(long)]
        json: bool,
    },

    /// Print the live-side address of a row.
    Locate {
        #[command(flatten)]
        session: SessionArgs,

        /// Row index as printed by `show`.
        #[arg(long)]
        row: usize,
    },

    /// Show metadata, file records and export summaries of a match database.
    Info {
        /// Path to the match database (`*.BinDiff`).
        #[arg(long)]
        db: String,

        /// Optional viewer config (JSON/YAML).
        #[arg(long)]
        config: Option<String>,

        /// Binary to check against the hash recorded for `--role`.
        #[arg(long)]
        binary: Option<String>,

        /// Side the `--binary` belongs to.
        #[arg(long, default_value = "none")]
        role: Role,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Show { session, json, color, limit } => {
            show_matches_command(&session.into(), json, color, limit)?
        }
        Command::Port { session, rows, all, dry_run, json } => {
            port_symbols_command(&session.into(), &rows, all, dry_run, json)?;
        }
        Command::Locate { session, row } => locate_command(&session.into(), row)?,
        Command::Info { db, config, binary, role } => {
            match_info_command(&db, config.as_deref(), binary.as_deref(), role)?
        }
    }

    Ok(())
}
