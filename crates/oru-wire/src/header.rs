use std::fmt;

use crate::message::MessageKind;
use crate::{HEADER_LEN, PROTOCOL_VERSION, WireError};

/// The fixed leading bytes of every message.
///
/// `msg_type` is kept as the raw byte so that headers with an unknown type
/// still decode; use [`Header::kind`] to interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    pub version: u8,
    pub seq_num: u8,
    pub msg_type: u8,
    /// Payload length in bytes, excluding the header.
    pub size: u8,
    pub status: u8,
}

impl Header {
    /// Build a header for an outgoing message of the given kind.
    pub fn new(kind: MessageKind, seq_num: u8, size: u8, status: u8) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            seq_num,
            msg_type: kind as u8,
            size,
            status,
        }
    }

    /// The message kind, or `None` when the type byte is not one we know.
    pub fn kind(&self) -> Option<MessageKind> {
        MessageKind::from_wire(self.msg_type)
    }

    pub fn encode(&self) -> [u8; HEADER_LEN] {
        [
            self.version,
            self.seq_num,
            self.msg_type,
            self.size,
            self.status,
        ]
    }

    /// Decode the header from the front of `buf`.
    ///
    /// Bytes past the header are ignored. Buffers shorter than
    /// [`HEADER_LEN`] are rejected before any field is read.
    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        let Some(bytes) = buf.first_chunk::<HEADER_LEN>() else {
            return Err(WireError::TooShort { got: buf.len() });
        };
        let [version, seq_num, msg_type, size, status] = *bytes;
        Ok(Self {
            version,
            seq_num,
            msg_type,
            size,
            status,
        })
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "version={} seq={} type={} size={} status={}",
            self.version, self.seq_num, self.msg_type, self.size, self.status
        )
    }
}
