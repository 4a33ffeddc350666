//! Hitec D-series servo bus decoding.
//!
//! The host and the servo share one half-duplex line. Every transaction
//! starts with a host command (`0x96` marker); reads are followed by a servo
//! reply (`0x69` marker) after an idle gap that a UART sees as zero bytes.
//! There is no length field: frame boundaries come from the fixed layout of
//! each opcode.
//!
//! The decoder is corruption tolerant. Structural mismatches are reported as
//! error events and the current transaction is dropped; checksum mismatches
//! only flag the decoded value. Byte values live in `layout`, safe sequential
//! access and noise skipping in `reader`, and the state machine in `parser`.

pub mod checksum;
pub mod encode;
pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod registers;

pub use error::{FrameContext, FrameError, PendingField, Truncation};
pub use parser::{
    ByteSpan, DecodeOptions, DecodeStats, DecodedEvent, Decoder, RecoveryMode, RegisterAccess,
    decode,
};
pub use reader::ByteCursor;
pub use registers::{is_known, name_of};
