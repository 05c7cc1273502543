use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use super::model::{Concept, ConceptGraph, Relationship, ValueRange};
use super::parse::{ConceptRecord, GraphPayload, RelationshipRecord};
use super::{MAX_ABSTRACTION_LEVEL, MAX_DEPTH_LEVEL};

/// What had to be repaired while building a [`ConceptGraph`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraphDiagnostics {
    pub blank_concepts: usize,
    pub duplicate_concepts: usize,
    pub dangling_relationships: usize,
    pub duplicate_relationships: usize,
    /// Relationships that arrived without an id and received `rel-{n}`.
    pub synthesized_ids: usize,
}

impl GraphDiagnostics {
    pub fn dropped(&self) -> usize {
        self.blank_concepts
            + self.duplicate_concepts
            + self.dangling_relationships
            + self.duplicate_relationships
    }

    pub fn is_clean(&self) -> bool {
        self.dropped() == 0
    }
}

impl ConceptGraph {
    /// Builds the store from a raw payload, dropping whatever cannot be
    /// represented: concepts with blank or repeated ids (first one wins) and
    /// relationships whose endpoints do not resolve or whose id repeats.
    pub fn from_payload(payload: GraphPayload) -> (Self, GraphDiagnostics) {
        let mut diagnostics = GraphDiagnostics::default();
        let GraphPayload {
            concepts: raw_concepts,
            relationships: raw_relationships,
        } = payload;

        let mut concepts = Vec::with_capacity(raw_concepts.len());
        let mut index_by_id = HashMap::with_capacity(raw_concepts.len());
        for record in raw_concepts {
            let id = record.id.trim().to_owned();
            if id.is_empty() {
                diagnostics.blank_concepts += 1;
                continue;
            }
            if index_by_id.contains_key(&id) {
                diagnostics.duplicate_concepts += 1;
                debug!(concept = %id, "dropping duplicate concept");
                continue;
            }

            index_by_id.insert(id.clone(), concepts.len());
            concepts.push(concept_from_record(id, record));
        }

        let mut relationships = Vec::with_capacity(raw_relationships.len());
        let mut endpoints = Vec::with_capacity(raw_relationships.len());
        let mut edge_index_by_id = HashMap::with_capacity(raw_relationships.len());
        let mut taken_ids = raw_relationships
            .iter()
            .filter_map(|record| record.id.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_owned)
            .collect::<HashSet<_>>();
        let mut next_synthetic = 0usize;

        for record in raw_relationships {
            let source = index_by_id.get(record.source.trim()).copied();
            let target = index_by_id.get(record.target.trim()).copied();
            let (Some(source), Some(target)) = (source, target) else {
                diagnostics.dangling_relationships += 1;
                debug!(
                    source = %record.source,
                    target = %record.target,
                    "dropping relationship with unknown endpoint"
                );
                continue;
            };

            let id = match record.id.as_deref().map(str::trim) {
                Some(id) if !id.is_empty() => id.to_owned(),
                _ => {
                    diagnostics.synthesized_ids += 1;
                    synthesize_id(&mut next_synthetic, &mut taken_ids)
                }
            };
            if edge_index_by_id.contains_key(&id) {
                diagnostics.duplicate_relationships += 1;
                debug!(relationship = %id, "dropping duplicate relationship");
                continue;
            }

            edge_index_by_id.insert(id.clone(), relationships.len());
            endpoints.push((source, target));
            relationships.push(relationship_from_record(id, record));
        }

        let node_count = concepts.len();
        let mut neighbors = vec![Vec::new(); node_count];
        let mut incident = vec![Vec::new(); node_count];
        for (edge_index, &(source, target)) in endpoints.iter().enumerate() {
            incident[source].push(edge_index);
            if source != target {
                incident[target].push(edge_index);
                neighbors[source].push(target);
                neighbors[target].push(source);
            }
        }
        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }

        let parents = concepts
            .iter()
            .enumerate()
            .map(|(index, concept)| {
                let mut resolved = concept
                    .parent_concepts
                    .iter()
                    .filter_map(|parent| index_by_id.get(parent).copied())
                    .filter(|&parent| parent != index)
                    .collect::<Vec<_>>();
                resolved.sort_unstable();
                resolved.dedup();
                resolved
            })
            .collect::<Vec<_>>();

        if !diagnostics.is_clean() {
            warn!(
                dropped = diagnostics.dropped(),
                dangling = diagnostics.dangling_relationships,
                duplicates = diagnostics.duplicate_concepts + diagnostics.duplicate_relationships,
                "repaired malformed graph payload"
            );
        }

        let graph = Self {
            concepts,
            relationships,
            endpoints,
            index_by_id,
            edge_index_by_id,
            neighbors,
            incident,
            parents,
        };
        (graph, diagnostics)
    }
}

fn concept_from_record(id: String, record: ConceptRecord) -> Concept {
    let label = if record.label.trim().is_empty() {
        id.clone()
    } else {
        record.label
    };

    let range = if record.min_value.is_some()
        || record.max_value.is_some()
        || record.default_value.is_some()
    {
        Some(ValueRange {
            min: record.min_value,
            max: record.max_value,
            default: record.default_value,
        })
    } else {
        None
    };

    let abstraction_level = if record.abstraction_level.is_finite() {
        record.abstraction_level.clamp(0.0, MAX_ABSTRACTION_LEVEL)
    } else {
        MAX_ABSTRACTION_LEVEL * 0.5
    };

    Concept {
        id,
        label,
        description: record.description,
        unit: record.unit,
        range,
        abstraction_level,
        depth_level: record.depth_level.clamp(0, i64::from(MAX_DEPTH_LEVEL)) as u8,
        priority: record.priority.clamp(1, i64::from(u8::MAX)) as u8,
        category: record.category,
        semantic_type: record.semantic_type,
        parent_concepts: record.parent_concepts,
    }
}

fn relationship_from_record(id: String, record: RelationshipRecord) -> Relationship {
    Relationship {
        id,
        source: record.source.trim().to_owned(),
        target: record.target.trim().to_owned(),
        relationship_type: record.relationship_type,
        description: record.description,
        equation: record.equation,
        coefficient: record.coefficient,
    }
}

fn synthesize_id(next: &mut usize, taken: &mut HashSet<String>) -> String {
    loop {
        let candidate = format!("rel-{next}");
        *next += 1;
        if taken.insert(candidate.clone()) {
            return candidate;
        }
    }
}
