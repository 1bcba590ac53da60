pub mod connection;
pub mod error;
pub mod gateway;
pub mod node_flow;
pub mod session;

pub use connection::{ConnectionFlow, ConnectionForm, ConnectionState};
pub use error::{EditorError, Feature, GatewayError};
pub use gateway::{PersistenceGateway, SaveRequest};
pub use node_flow::{CustomNodeForm, NodeEditForm, NodeFlow};
pub use session::{GraphEditingSession, SessionEvent};
