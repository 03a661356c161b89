//! legisnet CLI
//!
//! Command-line interface for:
//! - Building the co-authorship network from a data directory (GEXF)
//! - Building the co-voting network over divisive roll calls (GEXF)
//! - Pre-filtering roll-call details down to divisive events
//! - Projecting both networks onto node costs and blended edge weights (CSV)

use anyhow::Result;
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod export;

#[derive(Parser)]
#[command(name = "legisnet")]
#[command(
    author,
    version,
    about = "Co-authorship and co-voting networks of the Chamber of Deputies"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the co-authorship network → GEXF
    Coauthorship {
        /// Directory holding the snapshot CSVs
        #[arg(long, default_value = "data")]
        data: PathBuf,
        /// Output GEXF file
        #[arg(short, long)]
        out: PathBuf,
        /// Emit every edge with weight 1
        #[arg(long)]
        unweighted: bool,
        /// Weight tables JSON (defaults built in)
        #[arg(long)]
        tables: Option<PathBuf>,
        /// Only load these proposal types (e.g. PL,PEC)
        #[arg(long, value_delimiter = ',')]
        types: Option<Vec<String>>,
        /// Date ages are computed against (default: today)
        #[arg(long)]
        reference_date: Option<NaiveDate>,
        /// Also write the data-quality counters as JSON
        #[arg(long)]
        diagnostics: Option<PathBuf>,
    },

    /// Build the co-voting network → GEXF
    Covoting {
        /// Directory holding the snapshot CSVs
        #[arg(long, default_value = "data")]
        data: PathBuf,
        /// Roll-call detail file (default: <data>/votes_detail_info.csv)
        #[arg(long)]
        details: Option<PathBuf>,
        /// Output GEXF file
        #[arg(short, long)]
        out: PathBuf,
        /// Minimum identical votes for an edge
        #[arg(long, default_value_t = 1)]
        min_common_votes: u32,
        /// Vote values that count as agreement
        #[arg(long, value_delimiter = ',', default_value = "Sim,Não")]
        consider: Vec<String>,
        /// Only legislators who cast a considered value become nodes
        #[arg(long)]
        voters_only: bool,
        /// Date ages are computed against (default: today)
        #[arg(long)]
        reference_date: Option<NaiveDate>,
        /// Also write the data-quality counters as JSON
        #[arg(long)]
        diagnostics: Option<PathBuf>,
    },

    /// Keep only the roll-call detail rows of divisive events
    Divisive {
        /// Per-event tally file (votacoes-*.csv layout)
        #[arg(long)]
        summary: PathBuf,
        /// Per-legislator vote file (votacoesVotos-*.csv layout)
        #[arg(long)]
        detail: PathBuf,
        /// Output CSV
        #[arg(short, long)]
        out: PathBuf,
        /// Minimum Yes + No votes
        #[arg(long, default_value_t = 20)]
        min_total: u32,
        /// Maximum winning-side share
        #[arg(long, default_value_t = 0.60)]
        threshold: f64,
    },

    /// Project both networks onto node costs and blended edge weights → CSV
    Project {
        /// Co-voting network (GEXF)
        #[arg(long)]
        vote: PathBuf,
        /// Co-authorship network (GEXF)
        #[arg(long)]
        auth: PathBuf,
        /// Directory receiving nodes.csv and edges.csv
        #[arg(long)]
        out_dir: PathBuf,
        /// Node-degree blend toward co-voting
        #[arg(long, default_value_t = 0.035)]
        alpha: f64,
        /// Edge-weight blend toward co-voting
        #[arg(long, default_value_t = 0.035)]
        gamma: f64,
        /// Denominator floor
        #[arg(long, default_value_t = 1e-6)]
        epsilon: f64,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Coauthorship {
            data,
            out,
            unweighted,
            tables,
            types,
            reference_date,
            diagnostics,
        } => commands::cmd_coauthorship(commands::CoauthorshipArgs {
            data,
            out,
            weighted: !unweighted,
            tables,
            types,
            reference_date,
            diagnostics,
        }),
        Commands::Covoting {
            data,
            details,
            out,
            min_common_votes,
            consider,
            voters_only,
            reference_date,
            diagnostics,
        } => commands::cmd_covoting(commands::CovotingArgs {
            data,
            details,
            out,
            min_common_votes,
            consider,
            voters_only,
            reference_date,
            diagnostics,
        }),
        Commands::Divisive {
            summary,
            detail,
            out,
            min_total,
            threshold,
        } => commands::cmd_divisive(&summary, &detail, &out, min_total, threshold),
        Commands::Project {
            vote,
            auth,
            out_dir,
            alpha,
            gamma,
            epsilon,
        } => commands::cmd_project(&vote, &auth, &out_dir, alpha, gamma, epsilon),
    }
}
