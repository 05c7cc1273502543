//! Graph store: the immutable concept/relationship set of one loaded document.

mod collect;
mod model;
mod parse;

pub use collect::GraphDiagnostics;
pub use model::{Concept, ConceptGraph, Relationship, RelationshipType, SemanticType, ValueRange};
pub use parse::{ConceptRecord, GraphPayload, RelationshipRecord};

/// Deepest hierarchy tier a concept can carry.
pub const MAX_DEPTH_LEVEL: u8 = 3;

/// Highest abstraction level a concept can carry.
pub const MAX_ABSTRACTION_LEVEL: f32 = 10.0;
