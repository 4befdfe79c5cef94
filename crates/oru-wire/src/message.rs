use std::fmt;

use crate::header::Header;
use crate::{HEADER_LEN, STATUS_OK, STATUS_UNSUPPORTED, WireError};

/// The closed set of message types understood by both roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageKind {
    Ping = 1,
    Pong = 2,
    ReqStatus = 3,
    RespStatus = 4,
    Error = 5,
}

impl MessageKind {
    /// Map a raw type byte to a kind. Unknown bytes yield `None`.
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Ping),
            2 => Some(Self::Pong),
            3 => Some(Self::ReqStatus),
            4 => Some(Self::RespStatus),
            5 => Some(Self::Error),
            _ => None,
        }
    }

    /// Number of payload bytes that follow the header for this kind.
    pub fn payload_len(self) -> usize {
        match self {
            Self::ReqStatus | Self::RespStatus => 1,
            Self::Ping | Self::Pong | Self::Error => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ping => "PING",
            Self::Pong => "PONG",
            Self::ReqStatus => "REQ_STATUS",
            Self::RespStatus => "RESP_STATUS",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded (or about-to-be-encoded) control message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    Ping(Header),
    Pong(Header),
    ReqStatus { header: Header, status: u8 },
    RespStatus { header: Header, status: u8 },
    Error(Header),
    /// A well-formed header whose type byte is not a known kind.
    Unsupported(Header),
}

impl Message {
    /// A `PING` request.
    pub fn ping(seq_num: u8) -> Self {
        Self::Ping(Header::new(MessageKind::Ping, seq_num, 0, STATUS_OK))
    }

    /// A `REQ_STATUS` request. The payload byte is unused by the server.
    pub fn req_status(seq_num: u8) -> Self {
        Self::ReqStatus {
            header: Header::new(MessageKind::ReqStatus, seq_num, 1, STATUS_OK),
            status: 0,
        }
    }

    /// The `PONG` answering `request`.
    pub fn pong(request: &Header) -> Self {
        Self::Pong(Header::new(MessageKind::Pong, request.seq_num, 0, STATUS_OK))
    }

    /// The `RESP_STATUS` answering `request`, carrying `status`.
    pub fn resp_status(request: &Header, status: u8) -> Self {
        Self::RespStatus {
            header: Header::new(MessageKind::RespStatus, request.seq_num, 1, STATUS_OK),
            status,
        }
    }

    /// The `ERROR` answering a request the receiver cannot serve.
    pub fn error(request: &Header) -> Self {
        Self::Error(Header::new(
            MessageKind::Error,
            request.seq_num,
            0,
            STATUS_UNSUPPORTED,
        ))
    }

    pub fn header(&self) -> &Header {
        match self {
            Self::Ping(header)
            | Self::Pong(header)
            | Self::Error(header)
            | Self::Unsupported(header) => header,
            Self::ReqStatus { header, .. } | Self::RespStatus { header, .. } => header,
        }
    }

    /// The kind of this message, `None` for [`Message::Unsupported`].
    pub fn kind(&self) -> Option<MessageKind> {
        match self {
            Self::Ping(_) => Some(MessageKind::Ping),
            Self::Pong(_) => Some(MessageKind::Pong),
            Self::ReqStatus { .. } => Some(MessageKind::ReqStatus),
            Self::RespStatus { .. } => Some(MessageKind::RespStatus),
            Self::Error(_) => Some(MessageKind::Error),
            Self::Unsupported(_) => None,
        }
    }

    pub fn seq_num(&self) -> u8 {
        self.header().seq_num
    }

    /// Encode into a contiguous block ready to send.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + 1);
        out.extend_from_slice(&self.header().encode());
        match self {
            Self::ReqStatus { status, .. } | Self::RespStatus { status, .. } => out.push(*status),
            _ => {}
        }
        out
    }

    /// Decode a message from a receive buffer.
    ///
    /// Unknown types decode to [`Message::Unsupported`]. Status-bearing
    /// kinds need their payload byte present.
    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        let header = Header::decode(buf)?;
        let Some(kind) = header.kind() else {
            return Ok(Self::Unsupported(header));
        };

        let payload = &buf[HEADER_LEN..];
        let expected = kind.payload_len();
        if payload.len() < expected {
            return Err(WireError::TruncatedPayload {
                kind,
                expected,
                got: payload.len(),
            });
        }

        Ok(match kind {
            MessageKind::Ping => Self::Ping(header),
            MessageKind::Pong => Self::Pong(header),
            MessageKind::Error => Self::Error(header),
            MessageKind::ReqStatus => Self::ReqStatus {
                header,
                status: payload[0],
            },
            MessageKind::RespStatus => Self::RespStatus {
                header,
                status: payload[0],
            },
        })
    }
}
