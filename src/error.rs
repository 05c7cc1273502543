//! Error types.
//!
//! Only failures the caller must act on surface here. Defects inside a graph
//! payload (dangling edges, duplicate ids) are repaired while building the
//! [`ConceptGraph`](crate::ConceptGraph) and reported through
//! [`GraphDiagnostics`](crate::GraphDiagnostics) instead.

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("invalid graph payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("invalid engine configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background load worker disconnected")]
    WorkerDisconnected,
}

pub type Result<T> = std::result::Result<T, SceneError>;
