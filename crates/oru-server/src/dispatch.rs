use oru_wire::{Header, Message, MessageKind, STATUS_PROCESSING, WireError};
use tracing::info;

/// The reply to a request carrying `request` as its header.
pub fn reply_for(request: &Header) -> Message {
    match request.kind() {
        Some(MessageKind::Ping) => {
            info!("Receive PING message");
            Message::pong(request)
        }
        Some(MessageKind::ReqStatus) => {
            info!("Receive REQ_STATUS message");
            Message::resp_status(request, STATUS_PROCESSING)
        }
        _ => {
            info!(msg_type = request.msg_type, "Receive unsupported message");
            Message::error(request)
        }
    }
}

/// Decode the bytes of one request and build the reply.
///
/// An empty request gets no reply. Anything shorter than a header is an
/// error and must not be answered.
pub fn respond(request: &[u8]) -> Result<Option<Message>, WireError> {
    if request.is_empty() {
        return Ok(None);
    }
    let header = Header::decode(request)?;
    info!(
        version = header.version,
        seq = header.seq_num,
        msg_type = header.msg_type,
        size = header.size,
        status = header.status,
        "Receive message"
    );
    Ok(Some(reply_for(&header)))
}
