//! Serial command transport: per-port FIFO command queues over AT channels.

/// AT channels and the openers that create them
mod channel;
/// Transport errors
mod error;
/// Reply parsing for line-oriented result codes
mod parser;
/// Command queue interface and job handles
mod queue;
/// Worker-per-port queue implementation
mod worker;

pub use channel::{AtChannel, ChannelOpener, Endpoint, EndpointOpener, StreamChannel};
pub use error::{FinalResult, TransportError};
pub use parser::LineParser;
pub use queue::{
    CommandQueue, FlashDone, PortSettings, Queued, Reply, Responder, ResponseGrammar, queued,
};
pub use worker::SerialQueue;
