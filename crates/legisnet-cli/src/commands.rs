use crate::export;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use colored::Colorize;
use legisnet_ingest::{
    load_authors, load_deputies, load_parties, load_proposals, load_roles, load_vote_details,
    load_vote_summaries, load_weight_tables, write_vote_details, DataDir, DivisiveFilter,
};
use legisnet_model::{VoteValue, WeightTables};
use legisnet_network::{
    build_coauthorship, build_covoting, project, read_gexf_file, sanitize, write_gexf_file,
    CoauthorshipInputs, CoauthorshipOptions, CovotingOptions, NodeUniverse, ProjectionParams,
    SanitizePolicy,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub struct CoauthorshipArgs {
    pub data: PathBuf,
    pub out: PathBuf,
    pub weighted: bool,
    pub tables: Option<PathBuf>,
    pub types: Option<Vec<String>>,
    pub reference_date: Option<NaiveDate>,
    pub diagnostics: Option<PathBuf>,
}

pub struct CovotingArgs {
    pub data: PathBuf,
    pub details: Option<PathBuf>,
    pub out: PathBuf,
    pub min_common_votes: u32,
    pub consider: Vec<String>,
    pub voters_only: bool,
    pub reference_date: Option<NaiveDate>,
    pub diagnostics: Option<PathBuf>,
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Load an auxiliary table, or its empty default when the file is absent.
fn load_optional<T: Default>(
    path: &Path,
    what: &str,
    load: impl FnOnce(&Path) -> legisnet_ingest::Result<T>,
) -> Result<T> {
    if !path.exists() {
        warn!(path = %path.display(), "no {what} file; continuing without it");
        return Ok(T::default());
    }
    load(path).with_context(|| format!("loading {what} from {}", path.display()))
}

fn write_diagnostics<D: Serialize>(path: Option<&PathBuf>, diagnostics: &D) -> Result<()> {
    if let Some(path) = path {
        fs::write(path, serde_json::to_string_pretty(diagnostics)?)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("  {} {}", "→".cyan(), path.display());
    }
    Ok(())
}

pub fn cmd_coauthorship(args: CoauthorshipArgs) -> Result<()> {
    println!(
        "{} co-authorship network from {}",
        "Building".green().bold(),
        args.data.display()
    );

    let dir = DataDir::new(&args.data);
    let tables = match &args.tables {
        Some(path) => load_weight_tables(path)
            .with_context(|| format!("loading weight tables from {}", path.display()))?,
        None => WeightTables::default(),
    };
    let types: Option<BTreeSet<String>> = args.types.map(|t| t.into_iter().collect());

    let directory = load_deputies(&dir.deputies())
        .with_context(|| format!("loading deputies from {}", dir.deputies().display()))?;
    let proposals = load_proposals(&dir.proposals(), types.as_ref())
        .with_context(|| format!("loading proposals from {}", dir.proposals().display()))?;
    let authorship = load_authors(&dir.authors())
        .with_context(|| format!("loading authors from {}", dir.authors().display()))?;
    let roles = load_optional(&dir.roles(), "roles", load_roles)?;
    let parties = load_optional(&dir.parties(), "parties", load_parties)?;

    let inputs = CoauthorshipInputs {
        directory: &directory,
        proposals: &proposals,
        authorship: &authorship,
        roles: &roles,
        parties: &parties,
        tables: &tables,
    };
    let options = CoauthorshipOptions {
        weighted: args.weighted,
        reference_date: args.reference_date.unwrap_or_else(today),
    };
    let network = build_coauthorship(inputs, options);

    let graph = sanitize(&network.graph, SanitizePolicy::EmptyString);
    write_gexf_file(&graph, &args.out)
        .with_context(|| format!("writing {}", args.out.display()))?;

    println!(
        "{} {} (nodes={}, edges={})",
        "wrote".green().bold(),
        args.out.display().to_string().bold(),
        graph.node_count(),
        graph.edge_count()
    );
    if network.diagnostics.legacy_legislators > 0 {
        println!(
            "  {} {} authors missing from the deputies file",
            "info:".yellow().bold(),
            network.diagnostics.legacy_legislators
        );
    }
    write_diagnostics(args.diagnostics.as_ref(), &network.diagnostics)
}

pub fn cmd_covoting(args: CovotingArgs) -> Result<()> {
    println!(
        "{} co-voting network from {}",
        "Building".green().bold(),
        args.data.display()
    );

    let dir = DataDir::new(&args.data);
    let details_path = args.details.unwrap_or_else(|| dir.vote_details());

    let directory = load_deputies(&dir.deputies())
        .with_context(|| format!("loading deputies from {}", dir.deputies().display()))?;
    let details = load_vote_details(&details_path)
        .with_context(|| format!("loading roll calls from {}", details_path.display()))?;

    let options = CovotingOptions {
        considered_values: args.consider.iter().map(|v| VoteValue::parse(v)).collect(),
        min_common_votes: args.min_common_votes,
        node_universe: if args.voters_only {
            NodeUniverse::VotersOnly
        } else {
            NodeUniverse::Broad
        },
        reference_date: args.reference_date.unwrap_or_else(today),
    };
    let network = build_covoting(&directory, &details, options)
        .with_context(|| format!("building co-voting network from {}", details_path.display()))?;

    let graph = sanitize(&network.graph, SanitizePolicy::Drop);
    write_gexf_file(&graph, &args.out)
        .with_context(|| format!("writing {}", args.out.display()))?;

    println!(
        "{} {} (nodes={}, edges={}, events={})",
        "wrote".green().bold(),
        args.out.display().to_string().bold(),
        graph.node_count(),
        graph.edge_count(),
        network.diagnostics.vote_events
    );
    write_diagnostics(args.diagnostics.as_ref(), &network.diagnostics)
}

pub fn cmd_divisive(
    summary: &Path,
    detail: &Path,
    out: &Path,
    min_total: u32,
    threshold: f64,
) -> Result<()> {
    println!(
        "{} divisive roll calls from {}",
        "Filtering".green().bold(),
        summary.display()
    );

    let summaries = load_vote_summaries(summary)
        .with_context(|| format!("loading vote summaries from {}", summary.display()))?;
    let details = load_vote_details(detail)
        .with_context(|| format!("loading vote details from {}", detail.display()))?;

    let filter = DivisiveFilter {
        min_total_votes: min_total,
        division_threshold: threshold,
    };
    let kept = filter.restrict(&details, &summaries);
    write_vote_details(out, &kept).with_context(|| format!("writing {}", out.display()))?;

    println!(
        "{} {} (rows={} of {})",
        "wrote".green().bold(),
        out.display().to_string().bold(),
        kept.rows.len(),
        details.rows.len()
    );
    Ok(())
}

pub fn cmd_project(
    vote: &Path,
    auth: &Path,
    out_dir: &Path,
    alpha: f64,
    gamma: f64,
    epsilon: f64,
) -> Result<()> {
    println!(
        "{} {} + {}",
        "Projecting".green().bold(),
        vote.display(),
        auth.display()
    );

    let vote_graph =
        read_gexf_file(vote).with_context(|| format!("reading {}", vote.display()))?;
    let auth_graph =
        read_gexf_file(auth).with_context(|| format!("reading {}", auth.display()))?;

    let params = ProjectionParams {
        alpha,
        gamma,
        epsilon,
    };
    let projection = project(&vote_graph, &auth_graph, params)?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let nodes_path = out_dir.join(export::NODES_FILE);
    let edges_path = out_dir.join(export::EDGES_FILE);
    export::write_rows(&nodes_path, export::NODES_HEADER, &projection.nodes)?;
    export::write_rows(&edges_path, export::EDGES_HEADER, &projection.edges)?;

    println!(
        "{} {} (rows={})",
        "wrote".green().bold(),
        nodes_path.display().to_string().bold(),
        projection.nodes.len()
    );
    println!(
        "{} {} (rows={})",
        "wrote".green().bold(),
        edges_path.display().to_string().bold(),
        projection.edges.len()
    );
    Ok(())
}
