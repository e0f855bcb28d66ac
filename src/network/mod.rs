pub mod memory;
pub mod protocol;
pub mod tcp;
pub mod transport;

pub use memory::{MemoryNetwork, MemoryTransport};
pub use protocol::{Notification, WireFrame};
pub use tcp::TcpTransport;
pub use transport::{
    event_channel, ConnectionHandle, EventReceiver, EventSender, PeerTransport, TransportEvent,
};
