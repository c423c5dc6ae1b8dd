// Public API
pub use connection_manager::{ConnectionManager, InMemoryConnectionManager};
pub use errors::EventError;
pub use handler::{websocket_handler, WebsocketReceiveHandler};
pub use messages::{MessageType, WebSocketMessage};
pub use socket::MessageHandler;

// Internal modules
pub mod connection_manager;
pub mod errors;
pub mod event_handlers;
mod handler;
pub mod messages;
mod socket;
