//! The exporter (C11): projects the graph back into expanded, compacted,
//! or framed JSON-LD.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::{Result, ResultExt};
use crate::graph::{AttributeValue, Vertex, VertexId};
use crate::iri::TYPE_IRI;
use crate::options::ExportOptions;
use crate::processor::{CompactOptions, FrameOptions, JsonLdProcessor};
use crate::remote::LoadRemoteDocument;
use crate::store::GraphStore;

/// Exports the whole graph as expanded JSON-LD: `{ "@graph": [...] }`,
/// every outgoing edge rendered as a bare `{"@id": ...}` reference.
pub(crate) fn to_expanded(store: &GraphStore) -> Value {
    let nodes: Vec<Value> = store.vertices().map(|v| expand_reference_mode(store, v)).collect();
    log::trace!("exported {} vertices to expanded JSON-LD", nodes.len());
    serde_json::json!({ "@graph": nodes })
}

fn expand_reference_mode(store: &GraphStore, v: Vertex<'_>) -> Value {
    let mut obj = Map::new();
    obj.insert("@id".to_string(), Value::String(v.expanded_iri().to_string()));

    let types: Vec<Value> = v
        .types()
        .map(|t| Value::String(t.expanded_iri().to_string()))
        .collect();
    if !types.is_empty() {
        obj.insert("@type".to_string(), Value::Array(types));
    }

    for (predicate, values) in v.attributes().iter() {
        obj.insert(
            predicate.to_string(),
            Value::Array(values.iter().map(attribute_value_json).collect()),
        );
    }

    for eid in store.outgoing_edge_ids(v.id(), None) {
        let edge = store.edge_data(eid);
        if edge.label == TYPE_IRI {
            continue;
        }
        let target = Vertex::new(store, edge.to).expanded_iri().to_string();
        let entry = obj.entry(edge.label.clone()).or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(arr) = entry {
            arr.push(Value::Object(crate::json::single_entry_map("@id", target)));
        }
    }

    Value::Object(obj)
}

fn attribute_value_json(value: &AttributeValue) -> Value {
    let mut obj = Map::new();
    obj.insert("@value".to_string(), value.value().clone());
    if let Some(language) = value.language() {
        obj.insert("@language".to_string(), Value::String(language.to_string()));
    }
    if value.is_json() {
        obj.insert("@type".to_string(), Value::String("@json".to_string()));
    } else if let Some(datatype) = value.datatype() {
        obj.insert("@type".to_string(), Value::String(datatype.to_string()));
    }
    Value::Object(obj)
}

fn translate_id(options: &ExportOptions, iri: &str) -> String {
    match &options.identity_translator {
        Some(translator) => translator(iri),
        None => iri.to_string(),
    }
}

/// Exports the graph's root vertices (no incoming edges), honoring every
/// rule in [`ExportOptions`], then compacts or frames the result via the
/// injected processor.
pub(crate) async fn to_json<P, L>(
    store: &GraphStore,
    contexts: &Value,
    options: &ExportOptions,
    processor: &P,
    loader: &L,
) -> Result<Value>
where
    L: LoadRemoteDocument,
    P: JsonLdProcessor<L>,
{
    let mut in_progress: HashSet<VertexId> = HashSet::new();
    let nodes: Vec<Value> = store
        .vertices()
        .filter(|v| v.incoming_count() == 0)
        .map(|v| {
            in_progress.insert(v.id());
            let node = expand_node_for_json(store, v, options, &mut in_progress);
            in_progress.remove(&v.id());
            node
        })
        .collect();
    log::debug!("exporting {} root vertices to JSON-LD", nodes.len());
    let nodes = Value::Array(nodes);

    let mut result = if let Some(frame) = &options.frame {
        let mut frame = frame.clone();
        if let Value::Object(map) = &mut frame {
            map.insert("@context".to_string(), contexts.clone());
        }
        log::trace!("framing export via the injected processor");
        processor
            .frame(&nodes, &frame, FrameOptions::default(), loader)
            .await
            .context("injected processor failed to frame the exported nodes")?
    } else {
        log::trace!("compacting export via the injected processor");
        processor
            .compact(&nodes, contexts, CompactOptions::skip_expansion(), loader)
            .await
            .context("injected processor failed to compact the exported nodes")?
    };

    if options.strip_context {
        if let Value::Object(map) = &mut result {
            map.remove("@context");
        }
    }

    Ok(result)
}

/// Builds the node object for `v`, embedding referenced vertices fully
/// unless `compact_references` or a cycle says otherwise.
fn expand_node_for_json(
    store: &GraphStore,
    v: Vertex<'_>,
    options: &ExportOptions,
    in_progress: &mut HashSet<VertexId>,
) -> Value {
    let mut obj = Map::new();

    let anonymous = options
        .anonymous_references
        .as_ref()
        .is_some_and(|rule| rule.matches(v));
    if !anonymous {
        obj.insert("@id".to_string(), Value::String(translate_id(options, v.expanded_iri())));
    }

    let omit_types = options.anonymous_types.as_ref().is_some_and(|rule| rule.matches(v));
    if !omit_types {
        let types: Vec<Value> = v
            .types()
            .map(|t| Value::String(translate_id(options, t.expanded_iri())))
            .collect();
        if !types.is_empty() {
            obj.insert("@type".to_string(), Value::Array(types));
        }
    }

    for (predicate, values) in v.attributes().iter() {
        if options.exclude_attributes.matches(predicate) {
            continue;
        }
        if let Some(tag) = &options.compact_locale {
            if values.len() == 1 && values[0].language() == Some(tag.as_str()) {
                obj.insert(predicate.to_string(), values[0].value().clone());
                continue;
            }
        }
        obj.insert(
            predicate.to_string(),
            Value::Array(values.iter().map(attribute_value_json).collect()),
        );
    }

    let skip_references =
        options.no_references || options.exclude_references.as_ref().is_some_and(|rule| rule.matches(v));
    if !skip_references {
        for eid in store.outgoing_edge_ids(v.id(), None) {
            let edge = store.edge_data(eid);
            if edge.label == TYPE_IRI {
                continue;
            }
            let label = edge.label.clone();
            let target = Vertex::new(store, edge.to);
            let compact_ref = options
                .compact_references
                .as_ref()
                .is_some_and(|rule| rule.matches(target));
            let value = if compact_ref || in_progress.contains(&target.id()) {
                Value::Object(crate::json::single_entry_map("@id", translate_id(options, target.expanded_iri())))
            } else {
                in_progress.insert(target.id());
                let nested = expand_node_for_json(store, target, options, in_progress);
                in_progress.remove(&target.id());
                nested
            };
            let entry = obj.entry(label).or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(arr) = entry {
                arr.push(value);
            }
        }
    }

    let mut result = Value::Object(obj);
    if let Some(transform) = &options.transform {
        transform(&mut result);
    }
    result
}
