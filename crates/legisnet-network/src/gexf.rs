//! GEXF 1.2 import/export.
//!
//! The writer declares one `static` attribute column per attribute name seen
//! on nodes (resp. edges), emits nodes and edges in id order, and maps the
//! `label` node attribute and the `weight` edge attribute onto the native
//! GEXF fields. GEXF has no null value, so graphs still carrying
//! [`AttrValue::Missing`] are rejected; run [`crate::graph::sanitize`] first.

use crate::accumulator::PairKey;
use crate::graph::{AttrKind, AttrValue, AttributedGraph, Attributes, WEIGHT};
use crate::{NetworkError, Result};
use legisnet_model::{parse_id, LegislatorId};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tracing::warn;

const GEXF_NS: &str = "http://gexf.net/1.2";
const LABEL: &str = "label";

// ============================================================================
// Attribute columns
// ============================================================================

#[derive(Debug, Clone)]
struct Column {
    id: usize,
    title: String,
    kind: AttrKind,
}

fn widen(a: AttrKind, b: AttrKind) -> AttrKind {
    match (a, b) {
        (x, y) if x == y => x,
        (AttrKind::Integer, AttrKind::Double) | (AttrKind::Double, AttrKind::Integer) => {
            AttrKind::Double
        }
        _ => AttrKind::String,
    }
}

/// One column per attribute name, typed by the widest value seen.
fn columns<'a>(rows: impl Iterator<Item = &'a Attributes>, native: &str) -> Vec<Column> {
    let mut kinds: BTreeMap<&'a str, AttrKind> = BTreeMap::new();
    for attributes in rows {
        for (name, value) in attributes {
            if name == native {
                continue;
            }
            if let Some(kind) = value.kind() {
                kinds
                    .entry(name.as_str())
                    .and_modify(|k| *k = widen(*k, kind))
                    .or_insert(kind);
            }
        }
    }
    kinds
        .into_iter()
        .enumerate()
        .map(|(id, (title, kind))| Column {
            id,
            title: title.to_string(),
            kind,
        })
        .collect()
}

fn kind_from_gexf(name: &str) -> AttrKind {
    match name {
        "long" | "integer" | "int" => AttrKind::Integer,
        "double" | "float" => AttrKind::Double,
        _ => AttrKind::String,
    }
}

fn typed_value(kind: AttrKind, raw: &str) -> AttrValue {
    let parsed = match kind {
        AttrKind::Integer => raw.trim().parse().ok().map(AttrValue::Int),
        AttrKind::Double => raw.trim().parse().ok().map(AttrValue::Float),
        AttrKind::String => None,
    };
    parsed.unwrap_or_else(|| AttrValue::Text(raw.to_string()))
}

fn first_missing(graph: &AttributedGraph) -> Option<(String, String)> {
    let nodes = graph
        .nodes()
        .map(|(id, a)| (format!("node {id}"), a));
    let edges = graph.edges().map(|(k, a)| (format!("edge {k}"), a));
    nodes.chain(edges).find_map(|(element, attributes)| {
        attributes
            .iter()
            .find(|(_, v)| v.is_missing())
            .map(|(name, _)| (element, name.clone()))
    })
}

// ============================================================================
// Writer
// ============================================================================

pub fn write_gexf<W: Write>(graph: &AttributedGraph, sink: W) -> Result<()> {
    if let Some((element, attribute)) = first_missing(graph) {
        return Err(NetworkError::MissingAttribute { element, attribute });
    }

    let node_columns = columns(graph.nodes().map(|(_, a)| a), LABEL);
    let edge_columns = columns(graph.edges().map(|(_, a)| a), WEIGHT);

    let mut xml = Writer::new_with_indent(sink, b' ', 2);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    xml.write_event(Event::Start(
        BytesStart::new("gexf").with_attributes([("xmlns", GEXF_NS), ("version", "1.2")]),
    ))?;
    xml.write_event(Event::Start(
        BytesStart::new("graph")
            .with_attributes([("defaultedgetype", "undirected"), ("mode", "static")]),
    ))?;

    write_columns(&mut xml, "node", &node_columns)?;
    write_columns(&mut xml, "edge", &edge_columns)?;

    xml.write_event(Event::Start(BytesStart::new("nodes")))?;
    for (id, attributes) in graph.nodes() {
        let id = id.to_string();
        let label = attributes
            .get(LABEL)
            .map(|v| v.to_string())
            .unwrap_or_else(|| id.clone());
        let start = BytesStart::new("node")
            .with_attributes([("id", id.as_str()), ("label", label.as_str())]);
        write_item(&mut xml, "node", start, &node_columns, attributes)?;
    }
    xml.write_event(Event::End(BytesEnd::new("nodes")))?;

    xml.write_event(Event::Start(BytesStart::new("edges")))?;
    for (index, (pair, attributes)) in graph.edges().enumerate() {
        let id = index.to_string();
        let source = pair.low().to_string();
        let target = pair.high().to_string();
        let mut start = BytesStart::new("edge").with_attributes([
            ("id", id.as_str()),
            ("source", source.as_str()),
            ("target", target.as_str()),
        ]);
        if let Some(weight) = attributes.get(WEIGHT) {
            let weight = weight.to_string();
            start.push_attribute(("weight", weight.as_str()));
        }
        write_item(&mut xml, "edge", start, &edge_columns, attributes)?;
    }
    xml.write_event(Event::End(BytesEnd::new("edges")))?;

    xml.write_event(Event::End(BytesEnd::new("graph")))?;
    xml.write_event(Event::End(BytesEnd::new("gexf")))?;
    Ok(())
}

fn write_columns<W: Write>(xml: &mut Writer<W>, class: &str, columns: &[Column]) -> Result<()> {
    if columns.is_empty() {
        return Ok(());
    }
    xml.write_event(Event::Start(
        BytesStart::new("attributes").with_attributes([("class", class), ("mode", "static")]),
    ))?;
    for column in columns {
        let id = column.id.to_string();
        xml.write_event(Event::Empty(BytesStart::new("attribute").with_attributes([
            ("id", id.as_str()),
            ("title", column.title.as_str()),
            ("type", column.kind.gexf_name()),
        ])))?;
    }
    xml.write_event(Event::End(BytesEnd::new("attributes")))?;
    Ok(())
}

fn write_item<W: Write>(
    xml: &mut Writer<W>,
    tag: &str,
    start: BytesStart<'_>,
    columns: &[Column],
    attributes: &Attributes,
) -> Result<()> {
    let values: Vec<(String, String)> = columns
        .iter()
        .filter_map(|c| {
            attributes
                .get(&c.title)
                .map(|v| (c.id.to_string(), v.to_string()))
        })
        .collect();

    if values.is_empty() {
        xml.write_event(Event::Empty(start))?;
        return Ok(());
    }

    xml.write_event(Event::Start(start))?;
    xml.write_event(Event::Start(BytesStart::new("attvalues")))?;
    for (id, value) in &values {
        xml.write_event(Event::Empty(
            BytesStart::new("attvalue")
                .with_attributes([("for", id.as_str()), ("value", value.as_str())]),
        ))?;
    }
    xml.write_event(Event::End(BytesEnd::new("attvalues")))?;
    xml.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

pub fn to_gexf_string(graph: &AttributedGraph) -> Result<String> {
    let mut buffer = Vec::new();
    write_gexf(graph, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| NetworkError::InvalidGexf(e.to_string()))
}

pub fn write_gexf_file(graph: &AttributedGraph, path: &Path) -> Result<()> {
    let io_err = |source| NetworkError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::create(path).map_err(io_err)?;
    let mut sink = std::io::BufWriter::new(file);
    write_gexf(graph, &mut sink)?;
    sink.flush().map_err(io_err)
}

// ============================================================================
// Reader
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Node,
    Edge,
}

#[derive(Debug)]
enum Pending {
    Node(LegislatorId, Attributes),
    Edge(LegislatorId, LegislatorId, Attributes),
}

#[derive(Default)]
struct GexfReader {
    graph: AttributedGraph,
    columns: BTreeMap<(u8, String), (String, AttrKind)>,
    class: Option<Class>,
    pending: Option<Pending>,
}

fn class_key(class: Class) -> u8 {
    match class {
        Class::Node => 0,
        Class::Edge => 1,
    }
}

fn xml_attribute(e: &BytesStart<'_>, key: &str) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref() == key.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn required(e: &BytesStart<'_>, key: &str) -> Result<String> {
    xml_attribute(e, key)?.ok_or_else(|| {
        NetworkError::InvalidGexf(format!(
            "<{}> without `{key}`",
            String::from_utf8_lossy(e.local_name().as_ref())
        ))
    })
}

fn parse_node_id(raw: &str) -> Result<LegislatorId> {
    parse_id(raw)
        .ok_or_else(|| NetworkError::InvalidGexf(format!("node id {raw:?} is not an integer")))
}

impl GexfReader {
    fn open(&mut self, e: &BytesStart<'_>) -> Result<()> {
        match e.local_name().as_ref() {
            b"attributes" => {
                self.class = Some(match xml_attribute(e, "class")?.as_deref() {
                    Some("edge") => Class::Edge,
                    _ => Class::Node,
                });
            }
            b"attribute" => {
                let class = self.class.unwrap_or(Class::Node);
                let id = required(e, "id")?;
                let title = xml_attribute(e, "title")?.unwrap_or_else(|| id.clone());
                let kind = kind_from_gexf(&xml_attribute(e, "type")?.unwrap_or_default());
                self.columns.insert((class_key(class), id), (title, kind));
            }
            b"node" => {
                let id = parse_node_id(&required(e, "id")?)?;
                let mut attributes = Attributes::new();
                if let Some(label) = xml_attribute(e, LABEL)? {
                    attributes.insert(LABEL.to_string(), AttrValue::Text(label));
                }
                self.pending = Some(Pending::Node(id, attributes));
            }
            b"edge" => {
                let source = parse_node_id(&required(e, "source")?)?;
                let target = parse_node_id(&required(e, "target")?)?;
                let weight = match xml_attribute(e, WEIGHT)? {
                    Some(raw) => raw.trim().parse::<f64>().map_err(|_| {
                        NetworkError::InvalidGexf(format!("edge weight {raw:?} is not a number"))
                    })?,
                    None => 1.0,
                };
                let attributes = Attributes::from([(WEIGHT.to_string(), AttrValue::Float(weight))]);
                self.pending = Some(Pending::Edge(source, target, attributes));
            }
            b"attvalue" => {
                let column = required(e, "for")?;
                let raw = xml_attribute(e, "value")?.unwrap_or_default();
                let (class, attributes) = match self.pending.as_mut() {
                    Some(Pending::Node(_, a)) => (Class::Node, a),
                    Some(Pending::Edge(_, _, a)) => (Class::Edge, a),
                    None => return Ok(()),
                };
                let (title, kind) = self
                    .columns
                    .get(&(class_key(class), column.clone()))
                    .cloned()
                    .unwrap_or((column, AttrKind::String));
                attributes.insert(title, typed_value(kind, &raw));
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"node" | b"edge" => match self.pending.take() {
                Some(Pending::Node(id, attributes)) => self.graph.add_node(id, attributes),
                Some(Pending::Edge(source, target, attributes)) => {
                    match PairKey::new(source, target) {
                        Some(pair) => self.graph.add_edge(pair, attributes),
                        None => warn!(node = source, "self-loop in GEXF input skipped"),
                    }
                }
                None => {}
            },
            b"attributes" => self.class = None,
            _ => {}
        }
    }
}

/// Parse a GEXF document. Repeated edges between the same pair are folded
/// into one edge whose weight is their sum.
pub fn read_gexf(xml: &str) -> Result<AttributedGraph> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut state = GexfReader::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => state.open(&e)?,
            Event::Empty(e) => {
                state.open(&e)?;
                state.close(e.local_name().as_ref());
            }
            Event::End(e) => state.close(e.local_name().as_ref()),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(state.graph)
}

pub fn read_gexf_file(path: &Path) -> Result<AttributedGraph> {
    let xml = std::fs::read_to_string(path).map_err(|source| NetworkError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_gexf(&xml)
}
