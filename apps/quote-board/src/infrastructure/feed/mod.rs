//! Quote Feed Adapters
//!
//! - **codec**: XML message documents to typed snippets
//! - **client**: one WebSocket connection, reported as transport events
//! - **runner**: the session task tying client, service and board together

pub mod client;
pub mod codec;
pub mod runner;

pub use client::{FeedClient, FeedClientError, TransportEvent, transport_supported};
pub use codec::{CodecError, XmlCodec};
pub use runner::{ControlCommand, FeedRunner, FeedRunnerConfig};
