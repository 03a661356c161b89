//! Legislative network construction
//!
//! Builds undirected, attributed graphs over legislators:
//! - [`coauthorship`]: weighted co-authorship of bills, with node influence scores
//! - [`covoting`]: agreement counts over divisive roll calls
//! - [`projection`]: per-node cost and blended edge weight over both graphs
//!
//! Builders own their state and borrow the immutable inputs from
//! `legisnet_model`; there is no shared mutable state between them. Graph
//! exchange goes through [`gexf`].

pub mod accumulator;
pub mod coauthorship;
pub mod covoting;
pub mod diagnostics;
pub mod gexf;
pub mod graph;
pub mod projection;

pub use accumulator::{unordered_pairs, PairAccumulator, PairKey};
pub use coauthorship::{
    build_coauthorship, CoauthorshipBuilder, CoauthorshipInputs, CoauthorshipNetwork,
    CoauthorshipOptions,
};
pub use covoting::{build_covoting, CovotingBuilder, CovotingNetwork, CovotingOptions, NodeUniverse};
pub use diagnostics::{CoauthorshipDiagnostics, CovotingDiagnostics};
pub use gexf::{read_gexf, read_gexf_file, to_gexf_string, write_gexf, write_gexf_file};
pub use graph::{sanitize, AttrKind, AttrValue, AttributedGraph, Attributes, SanitizePolicy, WEIGHT};
pub use projection::{project, Projection, ProjectionEdgeRow, ProjectionNodeRow, ProjectionParams};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("roll-call table is missing required columns {missing:?} (available: {available:?})")]
    MissingColumns {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("invalid parameter `{name}`: {message}")]
    InvalidParameter { name: &'static str, message: String },

    #[error("{element} has no value for attribute `{attribute}`; sanitize the graph before export")]
    MissingAttribute { element: String, attribute: String },

    #[error("malformed GEXF: {0}")]
    InvalidGexf(String),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, NetworkError>;
