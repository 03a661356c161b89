//! Header-normalized CSV tables.
//!
//! Portal snapshots spell the same field several ways (`idVotacao`,
//! `id_votacao`, ...) and use `;` where derived files use `,`. Loaders
//! declare each logical [`Field`] with its accepted aliases and read cells
//! through the resolved [`Columns`].

use crate::{IngestError, Result};
use csv::StringRecord;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A logical column and the header spellings that map onto it.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub required: bool,
}

impl Field {
    pub const fn required(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self {
            name,
            aliases,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self {
            name,
            aliases,
            required: false,
        }
    }
}

/// Pick `;` or `,` from whichever is more frequent in the header line.
pub fn detect_delimiter(header_line: &str) -> u8 {
    let semicolons = header_line.matches(';').count();
    let commas = header_line.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

#[derive(Debug, Clone)]
pub struct CsvTable {
    path: PathBuf,
    headers: Vec<String>,
    records: Vec<StringRecord>,
}

impl CsvTable {
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Parse CSV text; `origin` only labels errors.
    pub fn parse(origin: &Path, text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let delimiter = detect_delimiter(text.lines().next().unwrap_or_default());
        let csv_err = |source| IngestError::Csv {
            path: origin.to_path_buf(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(text.as_bytes());
        let headers = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let records = reader
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(csv_err)?;

        debug!(
            path = %origin.display(),
            delimiter = %(delimiter as char),
            rows = records.len(),
            "csv table read"
        );
        Ok(Self {
            path: origin.to_path_buf(),
            headers,
            records,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[StringRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolve `fields` against the headers. An exact alias match wins over a
    /// case-insensitive one; the first alias found wins.
    pub fn columns(&self, fields: &[Field]) -> Result<Columns> {
        let mut index = BTreeMap::new();
        let mut missing = Vec::new();

        for field in fields {
            let exact = field
                .aliases
                .iter()
                .find_map(|alias| self.headers.iter().position(|h| h == alias));
            let found = exact.or_else(|| {
                field.aliases.iter().find_map(|alias| {
                    self.headers
                        .iter()
                        .position(|h| h.eq_ignore_ascii_case(alias))
                })
            });
            match found {
                Some(i) => {
                    index.insert(field.name, i);
                }
                None if field.required => missing.push(field.name.to_string()),
                None => {}
            }
        }

        if !missing.is_empty() {
            return Err(IngestError::MissingColumns {
                path: self.path.clone(),
                missing,
                available: self.headers.clone(),
            });
        }
        Ok(Columns { index })
    }
}

/// Logical-name to column-position mapping for one table.
#[derive(Debug, Clone, Default)]
pub struct Columns {
    index: BTreeMap<&'static str, usize>,
}

impl Columns {
    pub fn has(&self, field: &str) -> bool {
        self.index.contains_key(field)
    }

    /// Logical names that resolved, in name order.
    pub fn names(&self) -> Vec<String> {
        self.index.keys().map(|k| k.to_string()).collect()
    }

    /// Trimmed cell value; `None` for an unresolved column or an empty cell.
    pub fn get<'r>(&self, record: &'r StringRecord, field: &str) -> Option<&'r str> {
        let i = *self.index.get(field)?;
        record.get(i).map(str::trim).filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[Field] = &[
        Field::required("vote_id", &["idVotacao", "idvotacao", "id_votacao"]),
        Field::optional("name", &["deputado_nome"]),
    ];

    fn table(text: &str) -> CsvTable {
        CsvTable::parse(Path::new("memory.csv"), text).unwrap()
    }

    #[test]
    fn delimiter_follows_the_header() {
        assert_eq!(detect_delimiter("\"id\";\"votosSim\";\"votosNao\""), b';');
        assert_eq!(detect_delimiter("id,votosSim,votosNao"), b',');
        assert_eq!(detect_delimiter("id"), b',');
    }

    #[test]
    fn aliases_resolve_to_logical_names() {
        let t = table("\u{feff}\"id_votacao\";\"voto\"\n\"2-1\";\"Sim\"\n");
        let columns = t.columns(FIELDS).unwrap();
        assert!(columns.has("vote_id"));
        assert!(!columns.has("name"));
        assert_eq!(columns.get(&t.records()[0], "vote_id"), Some("2-1"));
        assert_eq!(columns.get(&t.records()[0], "name"), None);
    }

    #[test]
    fn case_insensitive_fallback() {
        let t = table("IDVOTACAO\n1\n");
        assert!(t.columns(FIELDS).unwrap().has("vote_id"));
    }

    #[test]
    fn missing_required_columns_are_reported() {
        let t = table("voto,deputado_nome\nSim,Ana\n");
        match t.columns(FIELDS) {
            Err(IngestError::MissingColumns {
                missing, available, ..
            }) => {
                assert_eq!(missing, vec!["vote_id".to_string()]);
                assert_eq!(available, vec!["voto".to_string(), "deputado_nome".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_cells_read_as_none() {
        let t = table("idVotacao,deputado_nome\n1,  \n");
        let columns = t.columns(FIELDS).unwrap();
        assert_eq!(columns.get(&t.records()[0], "name"), None);
    }
}
