//! The normalizer (C10): assigns types and stable IRIs to blank vertices
//! once loading is done, folding duplicates into the vertex they resolve
//! to.

use std::collections::HashSet;

use crate::error::{GraphError, Result};
use crate::graph::{EdgeId, Vertex, VertexId};
use crate::iri::{is_blank_node_iri, TYPE_IRI};
use crate::store::GraphStore;

/// Runs the blank-types pass followed by the blank-IRIs pass. `unique`
/// carries the load option of the same name: when set, a blank IRI
/// resolving to an already-used IRI is an error rather than a merge.
pub(crate) fn normalize(store: &mut GraphStore, unique: bool) -> Result<()> {
    normalize_blank_types(store)?;
    normalize_blank_iris(store, unique)?;
    Ok(())
}

fn normalize_blank_types(store: &mut GraphStore) -> Result<()> {
    let candidates: Vec<VertexId> = store.typeless_vertices().collect();
    for vid in candidates {
        if store.types_of(vid).next().is_some() {
            store.drop_typeless(vid);
            continue;
        }
        let resolved = {
            let resolver = match store.blank_type_resolver() {
                Some(r) => r,
                None => continue,
            };
            resolver(Vertex::new(store, vid))
        };
        let Some(types) = resolved else { continue };
        if types.is_empty() {
            continue;
        }
        let expanded = types
            .iter()
            .map(|t| store.prefixes().expand(t, true))
            .collect::<Result<Vec<_>>>()?;
        store.set_type_by_id(vid, &expanded)?;
    }
    Ok(())
}

fn normalize_blank_iris(store: &mut GraphStore, unique: bool) -> Result<()> {
    let candidates = store.blank_vertex_ids();
    let mut done: HashSet<VertexId> = HashSet::new();
    for vid in candidates {
        visit_blank(store, vid, &mut done, unique)?;
    }
    Ok(())
}

/// Depth-first: a blank vertex's blank ancestors (found via incoming
/// edges) resolve before the vertex itself.
fn visit_blank(store: &mut GraphStore, vid: VertexId, done: &mut HashSet<VertexId>, unique: bool) -> Result<()> {
    if done.contains(&vid) {
        return Ok(());
    }
    done.insert(vid);

    let parents: Vec<VertexId> = store
        .incoming_edge_ids(vid, None)
        .map(|eid| store.edge_data(eid).from)
        .filter(|&p| is_blank_node_iri(&store.vertex_data(p).iri))
        .collect();
    for parent in parents {
        visit_blank(store, parent, done, unique)?;
    }

    resolve_blank_iri(store, vid, unique)
}

fn resolve_blank_iri(store: &mut GraphStore, vid: VertexId, unique: bool) -> Result<()> {
    let new_iri = {
        let resolver = match store.blank_iri_resolver() {
            Some(r) => r,
            None => return Ok(()),
        };
        resolver(Vertex::new(store, vid))
    };
    let Some(new_iri) = new_iri else { return Ok(()) };

    let current_iri = store.vertex_data(vid).iri.clone();
    let new_expanded = store.prefixes().expand(&new_iri, true)?;
    if new_expanded == current_iri {
        return Ok(());
    }

    match store.vertex_id_by_expanded_iri(&new_expanded) {
        None => {
            store.rename_vertex(&current_iri, &new_expanded)?;
            Ok(())
        }
        Some(existing) => {
            if unique {
                return Err(GraphError::DuplicateEntityDefinition(new_expanded));
            }
            merge_blank_into(store, vid, existing)
        }
    }
}

/// Folds `blank` into `existing`: types per the conflict resolver,
/// attributes appended, and edges re-pointed at `existing` where
/// `existing` doesn't already carry them. `blank` is removed at the end.
fn merge_blank_into(store: &mut GraphStore, blank: VertexId, existing: VertexId) -> Result<()> {
    let blank_types: Vec<String> = store.types_of(blank).map(|t| t.expanded_iri().to_string()).collect();
    let existing_types: Vec<String> = store.types_of(existing).map(|t| t.expanded_iri().to_string()).collect();

    if !blank_types.is_empty() && !existing_types.is_empty() {
        let resolved = match store.type_conflict_resolver() {
            Some(resolver) => resolver(&existing_types, &blank_types),
            None => {
                return Err(GraphError::BlankIdNormalizationError(format!(
                    "both {} and {} carry types and no type conflict resolver is configured",
                    store.vertex_data(existing).iri,
                    store.vertex_data(blank).iri
                )));
            }
        };
        if let Some(types) = resolved {
            let old_edges: Vec<EdgeId> = store.outgoing_edge_ids(existing, Some(TYPE_IRI)).collect();
            for eid in old_edges {
                store.remove_edge(eid)?;
            }
            store.set_type_by_id(existing, &types)?;
        }
    } else if existing_types.is_empty() && !blank_types.is_empty() {
        store.set_type_by_id(existing, &blank_types)?;
    }

    let blank_attrs: Vec<(String, crate::graph::AttributeValue)> = store
        .vertex_data(blank)
        .attributes
        .iter()
        .flat_map(|(predicate, values)| values.iter().map(move |v| (predicate.to_string(), v.clone())))
        .collect();
    let existing_iri = store.vertex_data(existing).iri.clone();
    for (predicate, value) in blank_attrs {
        store.attr_append(&existing_iri, &predicate, value.value().clone(), value.language(), value.is_json())?;
    }

    let incoming: Vec<(String, VertexId)> = store
        .incoming_edge_ids(blank, None)
        .map(|eid| {
            let d = store.edge_data(eid);
            (d.label.clone(), d.from)
        })
        .collect();
    for (label, from) in incoming {
        let from_iri = store.vertex_data(from).iri.clone();
        if !store.has_edge(&label, &from_iri, &existing_iri) {
            store.create_edge(&label, &from_iri, &existing_iri)?;
        }
    }

    let outgoing: Vec<(String, VertexId)> = store
        .outgoing_edge_ids(blank, None)
        .filter_map(|eid| {
            let d = store.edge_data(eid);
            if d.label == TYPE_IRI {
                None
            } else {
                Some((d.label.clone(), d.to))
            }
        })
        .collect();
    for (label, to) in outgoing {
        let to_iri = store.vertex_data(to).iri.clone();
        if !store.has_edge(&label, &existing_iri, &to_iri) {
            store.create_edge(&label, &existing_iri, &to_iri)?;
        }
    }

    store.remove_vertex_by_id(blank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::GraphStoreOptions;
    use serde_json::json;

    fn loaded(store: &mut GraphStore, input: serde_json::Value) {
        crate::loader::load_into(store, input, &crate::options::LoadOptions::new()).unwrap();
    }

    #[test]
    fn blank_types_pass_applies_resolver_when_vertex_is_typeless() {
        let options = GraphStoreOptions::new()
            .with_blank_type_resolver(|_v| Some(vec!["http://example.org/Thing".to_string()]));
        let mut store = GraphStore::with_options(options);
        loaded(&mut store, json!([{}]));
        normalize(&mut store, false).unwrap();
        let v = store.blank_vertices().next().unwrap();
        assert!(v.is_type("http://example.org/Thing").unwrap());
    }

    #[test]
    fn blank_types_pass_skips_vertices_that_already_have_a_type() {
        let options = GraphStoreOptions::new().with_blank_type_resolver(|_v| {
            panic!("resolver should not run for a vertex that already has a type");
        });
        let mut store = GraphStore::with_options(options);
        loaded(&mut store, json!([{"@type": ["http://example.org/A"]}]));
        normalize(&mut store, false).unwrap();
        assert_eq!(store.typeless_vertices().count(), 0);
    }

    #[test]
    fn blank_iris_pass_renames_when_the_resolved_iri_is_unused() {
        let options = GraphStoreOptions::new()
            .with_blank_iri_resolver(|_v| Some("http://example.org/resolved".to_string()));
        let mut store = GraphStore::with_options(options);
        loaded(&mut store, json!([{}]));
        normalize(&mut store, false).unwrap();
        assert!(store.get_vertex("http://example.org/resolved").is_some());
        assert_eq!(store.blank_vertices().count(), 0);
    }

    #[test]
    fn blank_iris_pass_merges_into_an_existing_vertex_on_collision() {
        let options = GraphStoreOptions::new()
            .with_blank_iri_resolver(|_v| Some("http://example.org/a".to_string()));
        let mut store = GraphStore::with_options(options);
        loaded(
            &mut store,
            json!([
                {"@id": "http://example.org/a", "http://example.org/name": [{"@value": "Ann"}]},
                {"http://example.org/age": [{"@value": 30}]},
            ]),
        );
        normalize(&mut store, false).unwrap();
        assert_eq!(store.vertex_count(), 1);
        let v = store.get_vertex("http://example.org/a").unwrap();
        assert_eq!(v.get("http://example.org/name").unwrap().value(), &json!("Ann"));
        assert_eq!(v.get("http://example.org/age").unwrap().value(), &json!(30));
    }

    #[test]
    fn blank_iris_pass_fails_on_collision_when_unique_is_set() {
        let options = GraphStoreOptions::new()
            .with_blank_iri_resolver(|_v| Some("http://example.org/a".to_string()));
        let mut store = GraphStore::with_options(options);
        loaded(
            &mut store,
            json!([
                {"@id": "http://example.org/a"},
                {},
            ]),
        );
        let err = normalize(&mut store, true).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateEntityDefinition(_)));
    }

    #[test]
    fn merge_preserves_edges_pointed_at_the_blank_vertex() {
        let options = GraphStoreOptions::new()
            .with_blank_iri_resolver(|_v| Some("http://example.org/a".to_string()));
        let mut store = GraphStore::with_options(options);
        loaded(
            &mut store,
            json!([
                {"@id": "http://example.org/a"},
                {"@id": "http://example.org/referrer", "http://example.org/knows": [{}]},
            ]),
        );
        normalize(&mut store, false).unwrap();
        assert!(store.has_edge(
            "http://example.org/knows",
            "http://example.org/referrer",
            "http://example.org/a"
        ));
    }

    #[test]
    fn parent_blank_vertices_resolve_before_their_children() {
        let options = GraphStoreOptions::new().with_blank_iri_resolver(|v| {
            if v.has_outgoing(Some("http://example.org/child"), None) {
                Some("http://example.org/parent".to_string())
            } else {
                Some("http://example.org/child-resolved".to_string())
            }
        });
        let mut store = GraphStore::with_options(options);
        loaded(
            &mut store,
            json!([
                {"http://example.org/child": [{}]},
            ]),
        );
        normalize(&mut store, false).unwrap();
        assert!(store.get_vertex("http://example.org/parent").is_some());
        assert!(store.get_vertex("http://example.org/child-resolved").is_some());
        assert!(store.has_edge(
            "http://example.org/child",
            "http://example.org/parent",
            "http://example.org/child-resolved"
        ));
    }
}
