//! Loaders for the data-directory snapshots.
//!
//! Rows with an unusable key (non-integer id, empty type) are skipped and
//! counted in a `warn`; a missing required column fails the whole load.

use crate::table::{CsvTable, Field};
use crate::{IngestError, Result};
use chrono::NaiveDate;
use csv::StringRecord;
use legisnet_model::{
    fields, parse_id, AuthorshipRelation, Legislator, LegislatorDirectory, Party, PartyTable,
    Proposal, ProposalTable, RawVoteRow, RawVoteTable, RoleAssignment, VoteSummary,
};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, warn};

// ============================================================================
// Column layouts
// ============================================================================

const DEPUTY_FIELDS: &[Field] = &[
    Field::required("id", &["id", "idDeputado", "deputado_id"]),
    Field::optional("name", &["name", "nome", "nomeParlamentar"]),
    Field::optional("party", &["party", "siglaPartido"]),
    Field::optional("state", &["uf", "siglaUf"]),
    Field::optional("sex", &["sex", "sexo"]),
    Field::optional("education", &["education", "escolaridade"]),
    Field::optional("birthdate", &["birthdate", "dataNascimento"]),
    Field::optional("cpf", &["cpf"]),
];

const PROPOSAL_FIELDS: &[Field] = &[
    Field::required("id", &["id", "idProposicao"]),
    Field::required("type", &["siglaTipo", "type"]),
    Field::optional("status", &["ultimoStatus_idSituacao", "idSituacao", "status"]),
    Field::optional(
        "status_description",
        &["ultimoStatus_descricaoSituacao", "descricaoSituacao"],
    ),
    Field::optional("archived", &["arquivada", "archived"]),
];

const AUTHOR_FIELDS: &[Field] = &[
    Field::required("proposal", &["idProposicao", "id_proposicao"]),
    Field::required("author", &["idDeputadoAutor", "idAutor"]),
];

const ROLE_FIELDS: &[Field] = &[
    Field::required("legislator", &["idDeputado", "deputado_id", "id"]),
    Field::required("role", &["titulo", "cargo", "role"]),
    Field::optional("place", &["idOrgao", "id_orgao", "place_id"]),
];

const PARTY_FIELDS: &[Field] = &[
    Field::required("id", &["id", "idPartido"]),
    Field::optional("acronym", &["sigla", "siglaPartido"]),
    Field::required("members", &["totalMembros", "membros", "members"]),
];

const VOTE_DETAIL_FIELDS: &[Field] = &[
    Field::optional(fields::VOTE_ID, &["idVotacao", "idvotacao", "id_votacao"]),
    Field::optional(fields::LEGISLATOR_ID, &["deputado_id", "idDeputado"]),
    Field::optional(fields::VOTE, &["voto", "vote"]),
    Field::optional(fields::LEGISLATOR_NAME, &["deputado_nome", "nome"]),
    Field::optional(
        fields::LEGISLATOR_PARTY,
        &["deputado_siglaPartido", "siglaPartido"],
    ),
    Field::optional(fields::LEGISLATOR_STATE, &["deputado_siglaUf", "siglaUf"]),
];

const VOTE_SUMMARY_FIELDS: &[Field] = &[
    Field::required("id", &["id", "idVotacao"]),
    Field::required("yes", &["votosSim"]),
    Field::required("no", &["votosNao"]),
    Field::optional("other", &["votosOutros"]),
];

/// Header row used when writing vote details back out.
const VOTE_DETAIL_HEADER: [&str; 6] = [
    "idVotacao",
    "deputado_id",
    "voto",
    "deputado_nome",
    "deputado_siglaPartido",
    "deputado_siglaUf",
];

// ============================================================================
// Cell parsing
// ============================================================================

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
}

/// Counts written as `12`, `12.0` or empty (zero).
fn parse_count(raw: Option<&str>) -> Option<u32> {
    match raw {
        None => Some(0),
        Some(s) => s.parse::<u32>().ok().or_else(|| {
            s.parse::<f64>()
                .ok()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u32)
        }),
    }
}

fn parse_flag(raw: Option<&str>) -> bool {
    matches!(
        raw.map(str::to_ascii_lowercase).as_deref(),
        Some("1" | "true" | "sim" | "yes")
    )
}

fn report_skipped(what: &str, path: &Path, skipped: usize) {
    if skipped > 0 {
        warn!(path = %path.display(), skipped, "{what} rows with an unusable key skipped");
    }
}

// ============================================================================
// Loaders
// ============================================================================

pub fn load_deputies(path: &Path) -> Result<LegislatorDirectory> {
    let table = CsvTable::read(path)?;
    let columns = table.columns(DEPUTY_FIELDS)?;

    let mut directory = LegislatorDirectory::new();
    let mut skipped = 0;
    for record in table.records() {
        let Some(id) = columns.get(record, "id").and_then(parse_id) else {
            skipped += 1;
            continue;
        };
        let text = |field: &str| columns.get(record, field).unwrap_or_default().to_string();
        directory.insert(Legislator {
            id,
            name: text("name"),
            party: text("party"),
            state: text("state"),
            sex: text("sex"),
            education: text("education"),
            birthdate: columns.get(record, "birthdate").and_then(parse_date),
            cpf: columns.get(record, "cpf").map(str::to_string),
        });
    }

    report_skipped("deputy", path, skipped);
    info!(path = %path.display(), legislators = directory.len(), "deputies loaded");
    Ok(directory)
}

/// Load proposals, keeping only `types` when given.
pub fn load_proposals(path: &Path, types: Option<&BTreeSet<String>>) -> Result<ProposalTable> {
    let table = CsvTable::read(path)?;
    let columns = table.columns(PROPOSAL_FIELDS)?;

    let mut proposals = ProposalTable::new();
    let mut skipped = 0;
    let mut filtered = 0;
    for record in table.records() {
        let id = columns.get(record, "id").and_then(parse_id);
        let type_code = columns.get(record, "type");
        let (Some(id), Some(type_code)) = (id, type_code) else {
            skipped += 1;
            continue;
        };
        if types.is_some_and(|t| !t.contains(type_code)) {
            filtered += 1;
            continue;
        }
        proposals.insert(Proposal {
            id,
            type_code: type_code.to_string(),
            status_code: columns
                .get(record, "status")
                .and_then(parse_id)
                .unwrap_or_default(),
            status_description: columns
                .get(record, "status_description")
                .unwrap_or_default()
                .to_string(),
            archived: parse_flag(columns.get(record, "archived")),
        });
    }

    report_skipped("proposal", path, skipped);
    info!(
        path = %path.display(),
        proposals = proposals.len(),
        filtered_by_type = filtered,
        "proposals loaded"
    );
    Ok(proposals)
}

pub fn load_authors(path: &Path) -> Result<AuthorshipRelation> {
    let table = CsvTable::read(path)?;
    let columns = table.columns(AUTHOR_FIELDS)?;

    let mut authorship = AuthorshipRelation::new();
    let mut skipped = 0;
    for record in table.records() {
        let proposal = columns.get(record, "proposal").and_then(parse_id);
        let author = columns.get(record, "author").and_then(parse_id);
        match (proposal, author) {
            (Some(p), Some(a)) => authorship.add_author(p, a),
            // non-deputy authors (committees, the executive) have no id
            _ => skipped += 1,
        }
    }

    report_skipped("authorship", path, skipped);
    info!(path = %path.display(), proposals = authorship.len(), "authorship loaded");
    Ok(authorship)
}

pub fn load_roles(path: &Path) -> Result<Vec<RoleAssignment>> {
    let table = CsvTable::read(path)?;
    let columns = table.columns(ROLE_FIELDS)?;

    let mut roles = Vec::with_capacity(table.len());
    let mut skipped = 0;
    for record in table.records() {
        let legislator = columns.get(record, "legislator").and_then(parse_id);
        let role = columns.get(record, "role");
        let (Some(legislator_id), Some(role_name)) = (legislator, role) else {
            skipped += 1;
            continue;
        };
        roles.push(RoleAssignment {
            legislator_id,
            role_name: role_name.to_string(),
            place_id: columns.get(record, "place").map(str::to_string),
        });
    }

    report_skipped("role", path, skipped);
    info!(path = %path.display(), roles = roles.len(), "roles loaded");
    Ok(roles)
}

pub fn load_parties(path: &Path) -> Result<PartyTable> {
    let table = CsvTable::read(path)?;
    let columns = table.columns(PARTY_FIELDS)?;

    let mut parties = PartyTable::new();
    let mut skipped = 0;
    for record in table.records() {
        let id = columns.get(record, "id");
        let members = parse_count(columns.get(record, "members"));
        let (Some(id), Some(members)) = (id, members) else {
            skipped += 1;
            continue;
        };
        parties.insert(Party {
            id: id.to_string(),
            acronym: columns.get(record, "acronym").unwrap_or_default().to_string(),
            members,
        });
    }

    report_skipped("party", path, skipped);
    info!(path = %path.display(), parties = parties.len(), "parties loaded");
    Ok(parties)
}

/// Load per-legislator roll-call rows without validating them.
///
/// Column presence is reported through [`RawVoteTable::columns`] so the
/// co-voting builder can reject an incomplete table as a whole.
pub fn load_vote_details(path: &Path) -> Result<RawVoteTable> {
    let table = CsvTable::read(path)?;
    let columns = table.columns(VOTE_DETAIL_FIELDS)?;

    let cell = |record: &StringRecord, field: &str| {
        columns
            .get(record, field)
            .unwrap_or_default()
            .to_string()
    };
    let optional = |record: &StringRecord, field: &str| columns.get(record, field).map(str::to_string);
    let rows = table
        .records()
        .iter()
        .map(|record| RawVoteRow {
            vote_id: cell(record, fields::VOTE_ID),
            legislator_id: cell(record, fields::LEGISLATOR_ID),
            vote: cell(record, fields::VOTE),
            name: optional(record, fields::LEGISLATOR_NAME),
            party: optional(record, fields::LEGISLATOR_PARTY),
            state: optional(record, fields::LEGISLATOR_STATE),
        })
        .collect::<Vec<_>>();

    info!(path = %path.display(), rows = rows.len(), "vote details loaded");
    Ok(RawVoteTable {
        columns: columns.names(),
        rows,
    })
}

pub fn load_vote_summaries(path: &Path) -> Result<Vec<VoteSummary>> {
    let table = CsvTable::read(path)?;
    let columns = table.columns(VOTE_SUMMARY_FIELDS)?;

    let mut summaries = Vec::with_capacity(table.len());
    let mut skipped = 0;
    for record in table.records() {
        let id = columns.get(record, "id");
        let yes = parse_count(columns.get(record, "yes"));
        let no = parse_count(columns.get(record, "no"));
        let other = parse_count(columns.get(record, "other"));
        let (Some(id), Some(yes), Some(no), Some(other)) = (id, yes, no, other) else {
            skipped += 1;
            continue;
        };
        summaries.push(VoteSummary {
            vote_id: id.to_string(),
            yes,
            no,
            other,
        });
    }

    report_skipped("vote summary", path, skipped);
    info!(path = %path.display(), events = summaries.len(), "vote summaries loaded");
    Ok(summaries)
}

/// Write roll-call rows with the portal's detail-file header.
pub fn write_vote_details(path: &Path, table: &RawVoteTable) -> Result<()> {
    let csv_err = |source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer.write_record(VOTE_DETAIL_HEADER).map_err(csv_err)?;
    for row in &table.rows {
        writer
            .write_record([
                row.vote_id.as_str(),
                row.legislator_id.as_str(),
                row.vote.as_str(),
                row.name.as_deref().unwrap_or_default(),
                row.party.as_deref().unwrap_or_default(),
                row.state.as_deref().unwrap_or_default(),
            ])
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use legisnet_model::VoteValue;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn deputies_with_portal_headers() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "deputies.csv",
            "id,nome,siglaPartido,siglaUf,sexo,dataNascimento\n\
             204554,Ana,PT,BA,F,1980-03-02\n\
             abc,Broken,,,,\n\
             204555.0,Beto,PL,SP,M,\n",
        );
        let directory = load_deputies(&path).unwrap();
        assert_eq!(directory.len(), 2);
        let ana = directory.get(204554).unwrap();
        assert_eq!(ana.state, "BA");
        assert_eq!(ana.birthdate, NaiveDate::from_ymd_opt(1980, 3, 2));
        assert_eq!(directory.get(204555).unwrap().birthdate, None);
    }

    #[test]
    fn proposals_filtered_by_type() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "proposals.csv",
            "\"id\";\"siglaTipo\";\"ultimoStatus_idSituacao\";\"ultimoStatus_descricaoSituacao\"\n\
             \"1\";\"PL\";\"1140\";\"Transformado em Norma Jurídica\"\n\
             \"2\";\"REQ\";\"1140\";\"\"\n\
             \"3\";\"PEC\";\"\";\"\"\n",
        );
        let types: BTreeSet<String> = ["PL", "PEC"].iter().map(|s| s.to_string()).collect();
        let proposals = load_proposals(&path, Some(&types)).unwrap();
        assert_eq!(proposals.len(), 2);
        assert_eq!(proposals.get(1).unwrap().status_code, 1140);
        assert_eq!(proposals.get(3).unwrap().status_code, 0);
        assert!(!proposals.contains(2));
    }

    #[test]
    fn authors_accept_both_id_spellings() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.csv", "idProposicao;idDeputadoAutor\n1;10\n1;11\n2;\n");
        let b = write(&dir, "b.csv", "idProposicao,idAutor\n1,10\n1,11\n");
        let from_a = load_authors(&a).unwrap();
        let from_b = load_authors(&b).unwrap();
        assert_eq!(from_a.authors_of(1), Some(&[10, 11][..]));
        assert_eq!(from_a.authors_of(1), from_b.authors_of(1));
        assert_eq!(from_a.authors_of(2), None);
    }

    #[test]
    fn vote_details_report_resolved_columns() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "details.csv",
            "idVotacao;deputado_id;voto;deputado_nome\n\"10-1\";5;Sim;Ana\n",
        );
        let table = load_vote_details(&path).unwrap();
        assert!(table.missing_required().is_empty());
        let record = table.rows[0].parse().unwrap();
        assert_eq!(record.value, VoteValue::Yes);
        assert_eq!(record.name.as_deref(), Some("Ana"));

        let partial = write(&dir, "partial.csv", "idVotacao,voto\n1,Sim\n");
        let table = load_vote_details(&partial).unwrap();
        assert_eq!(table.missing_required(), vec![fields::LEGISLATOR_ID]);
    }

    #[test]
    fn summaries_default_missing_counts_to_zero() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "summary.csv", "id;votosSim;votosNao\n1;30;;\n2;x;1\n");
        let summaries = load_vote_summaries(&path).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!((summaries[0].yes, summaries[0].no, summaries[0].other), (30, 0, 0));
    }

    #[test]
    fn missing_files_name_the_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.csv");
        match load_roles(&path) {
            Err(IngestError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn vote_details_write_with_portal_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let mut row = RawVoteRow::new("7", "5", "Não");
        row.party = Some("PT".into());
        write_vote_details(&path, &RawVoteTable::with_rows(vec![row.clone()])).unwrap();

        let back = load_vote_details(&path).unwrap();
        assert_eq!(back.rows, vec![row]);
    }
}
