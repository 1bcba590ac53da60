pub mod graph_store;
pub mod layout;
pub mod profiles;
pub mod records;

pub use graph_store::{
    DeletedNode, EdgeDraft, EdgePatch, GraphStore, NodePatch, PendingConnection, ReplaceReport,
    StoreError,
};
pub use layout::LayoutAssistant;
pub use profiles::{InMemoryProfileDirectory, ProfileDirectory, ProfileError};
pub use records::{FsMindMapBackend, InMemoryMindMapBackend, MindMapBackend, RecordError};
