//! The loader pipeline (C8): walks already-expanded JSON-LD entities and
//! materializes vertices, edges, and attributes.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::{GraphError, Result};
use crate::graph::VertexId;
use crate::options::LoadOptions;
use crate::store::GraphStore;

/// Loads `input` (a single entity, an array of entities, or a `{
/// "@graph": [...] }` wrapper) into `store`.
pub(crate) fn load_into(store: &mut GraphStore, input: Value, options: &LoadOptions) -> Result<()> {
    let entities = unwrap_entities(input);
    let mut seen_in_this_call: HashSet<String> = HashSet::new();
    for entity in entities {
        load_entity(store, entity, options, &mut seen_in_this_call)?;
    }
    Ok(())
}

/// Flattens the top-level input shape into a list of entity objects.
fn unwrap_entities(input: Value) -> Vec<Map<String, Value>> {
    match input {
        Value::Array(items) => items.into_iter().flat_map(unwrap_entities).collect(),
        Value::Object(mut obj) => {
            if let Some(Value::Array(graph)) = obj.remove("@graph") {
                if obj.is_empty() {
                    return graph.into_iter().flat_map(unwrap_entities).collect();
                }
                obj.insert("@graph".to_string(), Value::Array(graph));
            }
            vec![obj]
        }
        _ => Vec::new(),
    }
}

fn load_entity(
    store: &mut GraphStore,
    mut entity: Map<String, Value>,
    options: &LoadOptions,
    seen: &mut HashSet<String>,
) -> Result<VertexId> {
    if let Some(Value::Array(graph)) = entity.remove("@graph") {
        for nested in graph {
            if let Value::Object(obj) = nested {
                load_entity(store, obj, options, seen)?;
            }
        }
    }

    let raw_id = entity
        .remove("@id")
        .and_then(|v| v.as_str().map(str::to_string));
    let is_blank = raw_id.is_none();
    let id = match raw_id {
        Some(id) => {
            if let Some(validator) = &options.identity_validator {
                if !validator(&id) {
                    return Err(GraphError::InvalidIri(id));
                }
            }
            if let Some(translator) = &options.identity_translator {
                translator(&id)
            } else {
                id
            }
        }
        None => store.fresh_blank_iri(),
    };
    let expanded_id = store.prefixes().expand(&id, true)?;

    if !is_blank && options.unique {
        let already_populated = store
            .get_vertex(&expanded_id)
            .map(|v| !v.attributes().is_empty() || v.outgoing_count() > 0 || v.types().next().is_some())
            .unwrap_or(false);
        if !entity.is_empty() && seen.contains(&expanded_id) && already_populated {
            return Err(GraphError::DuplicateEntityDefinition(expanded_id));
        }
        seen.insert(expanded_id.clone());
    }

    let type_ids = match entity.remove("@type") {
        Some(Value::Array(types)) => types
            .into_iter()
            .filter_map(|t| t.as_str().map(str::to_string))
            .map(|t| {
                if let Some(translator) = &options.identity_translator {
                    translator(&t)
                } else {
                    t
                }
            })
            .map(|t| store.prefixes().expand(&t, true))
            .collect::<Result<Vec<_>>>()?,
        Some(Value::String(t)) => vec![store.prefixes().expand(&t, true)?],
        _ => Vec::new(),
    };

    let vid = store.resolve_or_create_vertex(&expanded_id)?;
    store.apply_types(vid, &type_ids)?;

    for (predicate, values) in entity {
        if predicate == "@type" || predicate == "@id" {
            continue;
        }
        let values = match values {
            Value::Array(v) => v,
            other => vec![other],
        };
        load_predicate(store, vid, &predicate, values, options, seen)?;
    }

    Ok(vid)
}

fn load_predicate(
    store: &mut GraphStore,
    vertex: VertexId,
    predicate: &str,
    values: Vec<Value>,
    options: &LoadOptions,
    seen: &mut HashSet<String>,
) -> Result<()> {
    for value in values {
        let value = match value {
            Value::Object(obj) => obj,
            _ => continue,
        };
        if let Some(Value::Array(items)) = value.get("@list").cloned() {
            load_predicate(store, vertex, predicate, items, options, seen)?;
            continue;
        }
        if let Some(literal) = value.get("@value").cloned() {
            if literal.is_null() {
                continue;
            }
            let language = value.get("@language").and_then(Value::as_str);
            let as_json = value.get("@type").and_then(Value::as_str) == Some("@json");
            let vertex_iri = store.vertex_data(vertex).iri.clone();
            if options.merge {
                store.attr_set(&vertex_iri, predicate, literal, language, as_json)?;
            } else {
                store.attr_append(&vertex_iri, predicate, literal, language, as_json)?;
            }
            continue;
        }
        let nested_vid = load_entity(store, value, options, seen)?;
        let vertex_iri = store.vertex_data(vertex).iri.clone();
        let nested_iri = store.vertex_data(nested_vid).iri.clone();
        if !store.has_edge(predicate, &vertex_iri, &nested_iri) {
            store.create_edge(predicate, &vertex_iri, &nested_iri)?;
        }
    }
    Ok(())
}
