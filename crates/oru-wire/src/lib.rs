#![deny(unsafe_code)]

//! Wire codec for the ORU control protocol.
//!
//! Every message starts with a fixed five-byte [`Header`]. All fields are
//! single bytes, so there is no byte-order concern. The header's `type`
//! byte selects how any remaining bytes are interpreted; values outside
//! the closed [`MessageKind`] set are carried through as
//! [`Message::Unsupported`] so the receiver can still answer with an
//! `ERROR` correlated to the request.
//!
//! ```text
//!  0         1         2        3        4        5 ...
//! ┌─────────┬─────────┬────────┬────────┬────────┬─────────────┐
//! │ version │ seq_num │  type  │  size  │ status │ payload ... │
//! └─────────┴─────────┴────────┴────────┴────────┴─────────────┘
//! ```

/// Fixed message header.
pub mod header;
/// Typed messages and reply factories.
pub mod message;

pub use header::Header;
pub use message::{Message, MessageKind};

/// Protocol version written into every outgoing header.
pub const PROTOCOL_VERSION: u8 = 1;

/// Size of the encoded header in bytes.
pub const HEADER_LEN: usize = 5;

/// Largest message either side reads in one go.
pub const MAX_MESSAGE_LEN: usize = 128;

/// Header status: request handled.
pub const STATUS_OK: u8 = 0;

/// Header status on `ERROR` replies: the request type is not supported.
pub const STATUS_UNSUPPORTED: u8 = 1;

/// Service status payload: nothing in progress.
pub const STATUS_IDLE: u8 = 0;

/// Service status payload: the server is processing.
pub const STATUS_PROCESSING: u8 = 1;

/// Errors produced while decoding bytes received from a peer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("message too short: got {got} bytes, header needs {}", HEADER_LEN)]
    TooShort { got: usize },

    #[error("{kind} payload truncated: expected {expected} bytes, got {got}")]
    TruncatedPayload {
        kind: MessageKind,
        expected: usize,
        got: usize,
    },
}
