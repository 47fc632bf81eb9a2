//! The canonical process format: nets of typed nodes and conditional edges.

pub mod edge;
pub mod id;
pub mod net;
pub mod node;

pub use edge::{Edge, EdgeAttributes};
pub use id::{EdgeId, NetId, NodeId, ResourceId};
pub use net::{Net, NetSignature};
pub use node::{Attributes, Direction, EventKind, Gateway, GatewayKind, MultiInstance, Node, NodeKind, Task};
