//! File names inside a data directory.

use std::path::{Path, PathBuf};

pub const DEPUTIES: &str = "deputies_info.csv";
pub const PROPOSALS: &str = "proposals_info.csv";
pub const AUTHORS: &str = "authors_info.csv";
pub const ROLES: &str = "roles_info.csv";
pub const PARTIES: &str = "parties_info.csv";
pub const VOTE_SUMMARIES: &str = "votes_info.csv";
pub const VOTE_DETAILS: &str = "votes_detail_info.csv";

/// A directory holding the snapshot CSVs under their conventional names.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn deputies(&self) -> PathBuf {
        self.root.join(DEPUTIES)
    }

    pub fn proposals(&self) -> PathBuf {
        self.root.join(PROPOSALS)
    }

    pub fn authors(&self) -> PathBuf {
        self.root.join(AUTHORS)
    }

    pub fn roles(&self) -> PathBuf {
        self.root.join(ROLES)
    }

    pub fn parties(&self) -> PathBuf {
        self.root.join(PARTIES)
    }

    pub fn vote_summaries(&self) -> PathBuf {
        self.root.join(VOTE_SUMMARIES)
    }

    pub fn vote_details(&self) -> PathBuf {
        self.root.join(VOTE_DETAILS)
    }
}
