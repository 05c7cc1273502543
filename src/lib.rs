//! Layout, level-of-detail and focus engine for explorable concept graphs.
//!
//! The engine takes a concept graph payload, places every concept in 3D space,
//! decides per frame which concepts are visible from the camera distance and
//! each concept's hierarchy tier, grows a revealed frontier on expand
//! interactions, tracks selection and hover focus, and composes a render-ready
//! [`RenderGraph`] snapshot. It never rasterizes anything itself.
//!
//! ```no_run
//! use concept_scene::{EngineConfig, GraphPayload, SceneSession};
//!
//! # fn example(raw: &str) -> concept_scene::Result<()> {
//! let payload = GraphPayload::from_json(raw)?;
//! let mut session = SceneSession::with_payload(EngineConfig::default(), payload);
//!
//! session.tick(1.0 / 60.0, 42.0);
//! let snapshot = session.render_graph();
//! println!("{} nodes on screen", snapshot.nodes.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod frontier;
pub mod graph;
pub mod highlight;
pub mod layout;
pub mod loader;
pub mod lod;
pub mod scene;
pub mod search;
pub mod session;

mod util;

pub use config::{AutoRotate, EngineConfig};
pub use error::{Result, SceneError};
pub use frontier::Frontier;
pub use graph::{
    Concept, ConceptGraph, ConceptRecord, GraphDiagnostics, GraphPayload, Relationship,
    RelationshipRecord, RelationshipType, SemanticType,
};
pub use highlight::{EdgeEmphasis, Focus, FocusState, FocusTarget, HighlightState};
pub use layout::{
    DragRelease, Layout, LayoutConfig, LayoutStrategy, LiveLayout, OrbitalConfig, PhysicsConfig,
    compute_layout,
};
pub use loader::{GraphLoader, LoadOutcome, LoadTicket};
pub use lod::{LodConfig, OpacityState, VisibilityFrame};
pub use scene::{RenderEdge, RenderGraph, RenderNode, Rgba, SceneInputs, compose};
pub use search::SearchMatches;
pub use session::{SceneEvent, SceneSession, SelectionRef};
