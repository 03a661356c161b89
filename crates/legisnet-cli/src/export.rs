//! Flat CSV output for the projection rows.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

pub const NODES_FILE: &str = "nodes.csv";
pub const EDGES_FILE: &str = "edges.csv";

/// Column names of `ProjectionNodeRow`, in field order.
pub const NODES_HEADER: &[&str] = &["id", "c", "v"];
/// Column names of `ProjectionEdgeRow`, in field order.
pub const EDGES_HEADER: &[&str] = &["u", "v", "w_vote", "w_auth", "w_comb"];

/// Write `rows` with a header derived from the row type's field names.
/// The serializer only emits a header alongside the first row, so an empty
/// slice gets `header` written explicitly.
pub fn write_rows<R: Serialize>(path: &Path, header: &[&str], rows: &[R]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    if rows.is_empty() {
        writer
            .write_record(header)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use legisnet_network::{ProjectionEdgeRow, ProjectionNodeRow};
    use tempfile::TempDir;

    #[test]
    fn rows_are_written_with_headers() {
        let dir = TempDir::new().unwrap();
        let nodes = dir.path().join(NODES_FILE);
        let edges = dir.path().join(EDGES_FILE);

        write_rows(&nodes, NODES_HEADER, &[ProjectionNodeRow { id: 7, c: 0.5, v: 1.0 }]).unwrap();
        write_rows(
            &edges,
            EDGES_HEADER,
            &[ProjectionEdgeRow {
                u: 1,
                v: 2,
                w_vote: 3.0,
                w_auth: 1.0,
                w_comb: 1.07,
            }],
        )
        .unwrap();

        assert_eq!(std::fs::read_to_string(&nodes).unwrap(), "id,c,v\n7,0.5,1.0\n");
        assert_eq!(
            std::fs::read_to_string(&edges).unwrap(),
            "u,v,w_vote,w_auth,w_comb\n1,2,3.0,1.0,1.07\n"
        );
    }

    #[test]
    fn empty_rows_still_get_a_header() {
        let dir = TempDir::new().unwrap();
        let nodes = dir.path().join(NODES_FILE);
        let edges = dir.path().join(EDGES_FILE);

        write_rows::<ProjectionNodeRow>(&nodes, NODES_HEADER, &[]).unwrap();
        write_rows::<ProjectionEdgeRow>(&edges, EDGES_HEADER, &[]).unwrap();

        assert_eq!(std::fs::read_to_string(&nodes).unwrap(), "id,c,v\n");
        assert_eq!(
            std::fs::read_to_string(&edges).unwrap(),
            "u,v,w_vote,w_auth,w_comb\n"
        );
    }
}
