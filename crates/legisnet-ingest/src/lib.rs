//! CSV ingestion for legisnet
//!
//! Reads the open-data snapshots (deputies, proposals, authorship, roles,
//! parties, roll calls) from a data directory into `legisnet_model` types,
//! and hosts the divisive roll-call pre-filter.

pub mod divisive;
pub mod layout;
pub mod loaders;
pub mod table;

pub use divisive::DivisiveFilter;
pub use layout::DataDir;
pub use loaders::{
    load_authors, load_deputies, load_parties, load_proposals, load_roles, load_vote_details,
    load_vote_summaries, write_vote_details,
};
pub use table::{detect_delimiter, Columns, CsvTable, Field};

use legisnet_model::{ModelError, WeightTables};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} is missing required columns {missing:?} (available: {available:?})", path.display())]
    MissingColumns {
        path: PathBuf,
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, IngestError>;

/// Read and validate a weight-tables JSON file.
pub fn load_weight_tables(path: &Path) -> Result<WeightTables> {
    let json = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(WeightTables::from_json(&json)?)
}
