//! Fuzz target for the wire codec and the server's reply mapping.
//!
//! Run with: cargo +nightly fuzz run fuzz_wire_decode
//!
//! Any buffer must either be rejected or decode to a message whose header
//! re-encodes to the same leading bytes; every decodable request must get
//! a reply carrying its sequence number.

#![no_main]

use libfuzzer_sys::fuzz_target;
use oru_wire::{HEADER_LEN, Header, Message};

fuzz_target!(|data: &[u8]| {
    match Message::decode(data) {
        Ok(message) => {
            assert_eq!(&message.header().encode()[..], &data[..HEADER_LEN]);
        }
        Err(_) => {
            if data.len() < HEADER_LEN {
                assert!(Header::decode(data).is_err());
            }
        }
    }

    if let Ok(Some(reply)) = oru_server::respond(data) {
        assert_eq!(reply.seq_num(), data[1]);
    }
});
