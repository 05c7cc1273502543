use std::io::Read;

use serde::Deserialize;

use super::model::{RelationshipType, SemanticType};
use crate::Result;

/// Raw `{concepts, relationships}` payload as delivered by the extraction
/// backend. Nothing is validated here; see [`ConceptGraph::from_payload`].
///
/// [`ConceptGraph::from_payload`]: super::ConceptGraph::from_payload
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphPayload {
    #[serde(default)]
    pub concepts: Vec<ConceptRecord>,
    #[serde(default)]
    pub relationships: Vec<RelationshipRecord>,
}

impl GraphPayload {
    pub fn new(concepts: Vec<ConceptRecord>, relationships: Vec<RelationshipRecord>) -> Self {
        Self {
            concepts,
            relationships,
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ConceptRecord {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
    #[serde(default)]
    pub default_value: Option<f64>,
    #[serde(default = "default_abstraction_level")]
    pub abstraction_level: f32,
    #[serde(default)]
    pub depth_level: i64,
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub semantic_type: SemanticType,
    #[serde(default)]
    pub parent_concepts: Vec<String>,
}

impl ConceptRecord {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            unit: None,
            min_value: None,
            max_value: None,
            default_value: None,
            abstraction_level: default_abstraction_level(),
            depth_level: 0,
            priority: default_priority(),
            category: default_category(),
            semantic_type: SemanticType::default(),
            parent_concepts: Vec::new(),
        }
    }

    pub fn with_depth(mut self, depth_level: i64) -> Self {
        self.depth_level = depth_level;
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_abstraction(mut self, abstraction_level: f32) -> Self {
        self.abstraction_level = abstraction_level;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_semantic_type(mut self, semantic_type: SemanticType) -> Self {
        self.semantic_type = semantic_type;
        self
    }

    pub fn with_parents(mut self, parents: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.parent_concepts = parents.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RelationshipRecord {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(alias = "source_concept_id")]
    pub source: String,
    #[serde(alias = "target_concept_id")]
    pub target: String,
    #[serde(default, alias = "type")]
    pub relationship_type: RelationshipType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub equation: Option<String>,
    #[serde(default = "default_coefficient")]
    pub coefficient: f64,
}

impl RelationshipRecord {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            source: source.into(),
            target: target.into(),
            relationship_type: RelationshipType::default(),
            description: String::new(),
            equation: None,
            coefficient: default_coefficient(),
        }
    }

    pub fn with_type(mut self, relationship_type: RelationshipType) -> Self {
        self.relationship_type = relationship_type;
        self
    }
}

fn default_abstraction_level() -> f32 {
    5.0
}

fn default_priority() -> i64 {
    2
}

fn default_category() -> String {
    "general".to_owned()
}

fn default_coefficient() -> f64 {
    1.0
}
