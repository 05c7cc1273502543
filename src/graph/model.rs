use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Coarse kind of a concept. Drives ring assignment in the orbital layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Variable,
    Law,
    Process,
    #[default]
    Entity,
    #[serde(other)]
    Other,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    #[default]
    Direct,
    Inverse,
    #[serde(other)]
    Other,
}

/// Numeric range carried for the what-if simulation collaborator. The engine
/// never reads it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ValueRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub default: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Concept {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub range: Option<ValueRange>,
    /// `0.0..=10.0`, mapped onto the vertical axis by the force layout.
    pub abstraction_level: f32,
    /// `0..=3`; 0 is core and always visible, 3 is detail.
    pub depth_level: u8,
    /// 1 = main, 2 = secondary, 3 = detail. Larger values are tolerated and
    /// excluded from the initial frontier.
    pub priority: u8,
    pub category: String,
    pub semantic_type: SemanticType,
    /// Clustering hint only. Unknown ids are kept verbatim and ignored.
    pub parent_concepts: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Relationship {
    pub id: String,
    pub source: String,
    pub target: String,
    pub relationship_type: RelationshipType,
    pub description: String,
    /// Carried for the simulation collaborator.
    pub equation: Option<String>,
    pub coefficient: f64,
}

/// Immutable concept graph of one loaded document.
///
/// Concepts and relationships are addressed by dense indices internally; the
/// string ids from the payload are resolved through `index_of` /
/// `edge_index_of`. Every stored relationship has both endpoints present.
#[derive(Clone, Debug, Default)]
pub struct ConceptGraph {
    pub(super) concepts: Vec<Concept>,
    pub(super) relationships: Vec<Relationship>,
    pub(super) endpoints: Vec<(usize, usize)>,
    pub(super) index_by_id: HashMap<String, usize>,
    pub(super) edge_index_by_id: HashMap<String, usize>,
    pub(super) neighbors: Vec<Vec<usize>>,
    pub(super) incident: Vec<Vec<usize>>,
    pub(super) parents: Vec<Vec<usize>>,
}

impl ConceptGraph {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.concepts.len()
    }

    pub fn edge_count(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    pub fn concept(&self, index: usize) -> Option<&Concept> {
        self.concepts.get(index)
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn relationship(&self, index: usize) -> Option<&Relationship> {
        self.relationships.get(index)
    }

    /// `(source, target)` concept indices of every relationship, index-aligned
    /// with [`relationships`](Self::relationships).
    pub fn endpoints(&self) -> &[(usize, usize)] {
        &self.endpoints
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn edge_index_of(&self, id: &str) -> Option<usize> {
        self.edge_index_by_id.get(id).copied()
    }

    /// Distinct concepts sharing a relationship with `index`, in either
    /// direction, sorted by index. Never contains `index` itself.
    pub fn neighbors(&self, index: usize) -> &[usize] {
        self.neighbors.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Relationship indices touching `index`.
    pub fn incident_edges(&self, index: usize) -> &[usize] {
        self.incident.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolved `parent_concepts` of `index`.
    pub fn parents(&self, index: usize) -> &[usize] {
        self.parents.get(index).map(Vec::as_slice).unwrap_or(&[])
    }
}
