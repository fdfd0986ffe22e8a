// massctl-api: WebSocket transport and wire protocol for Music Assistant compatible servers

pub mod error;
pub mod protocol;
pub mod websocket;

pub use error::Error;
pub use protocol::{Args, CommandMessage, EventMessage, InboundMessage, ResultMessage, ServerInfo};
pub use websocket::{ReconnectConfig, TransportEvent, WebSocketSession, websocket_url};
