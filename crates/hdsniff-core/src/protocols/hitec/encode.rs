//! Frame builders for the host and servo sides of the bus.
//!
//! These produce well-formed frames with correct checksums. They are used to
//! build synthetic captures; the decoder never calls them.

use super::checksum::{read_command_checksum, reply_checksum, write_command_checksum};
use super::layout;

/// Host command writing `value` to `register`.
///
/// # Examples
/// ```
/// use hdsniff_core::protocols::hitec::encode::encode_write_command;
///
/// let frame = encode_write_command(0x70, 0xFFFF);
/// assert_eq!(frame, [0x96, 0x00, 0x70, 0x02, 0xFF, 0xFF, 0x70]);
/// ```
pub fn encode_write_command(register: u8, value: u16) -> [u8; layout::WRITE_COMMAND_LEN] {
    let [low, high] = value.to_le_bytes();
    [
        layout::COMMAND_MARKER,
        layout::COMMAND_MYSTERY_DEFAULT,
        register,
        layout::OPCODE_WRITE,
        low,
        high,
        write_command_checksum(register, low, high),
    ]
}

/// Host command requesting the value of `register`.
pub fn encode_read_command(register: u8) -> [u8; layout::READ_COMMAND_LEN] {
    [
        layout::COMMAND_MARKER,
        layout::COMMAND_MYSTERY_DEFAULT,
        register,
        layout::OPCODE_READ,
        read_command_checksum(register),
    ]
}

/// Servo reply to a read of `register`.
pub fn encode_read_reply(mystery: u8, register: u8, value: u16) -> [u8; layout::READ_REPLY_LEN] {
    let [low, high] = value.to_le_bytes();
    [
        layout::REPLY_MARKER,
        mystery,
        register,
        layout::REPLY_CONSTANT,
        low,
        high,
        reply_checksum(mystery, register, low, high),
    ]
}

/// Complete read transaction: command, `gap` idle zero bytes, then reply.
pub fn encode_read_transaction(register: u8, mystery: u8, value: u16, gap: usize) -> Vec<u8> {
    let mut frame = Vec::with_capacity(layout::READ_COMMAND_LEN + gap + layout::READ_REPLY_LEN);
    frame.extend_from_slice(&encode_read_command(register));
    frame.resize(frame.len() + gap, layout::NOISE_BYTE);
    frame.extend_from_slice(&encode_read_reply(mystery, register, value));
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_transaction_matches_reference_capture() {
        let frame = encode_read_transaction(0x1E, 0x00, 100, 0);
        assert_eq!(
            frame,
            [
                0x96, 0x00, 0x1E, 0x00, 0x1E, 0x69, 0x00, 0x1E, 0x02, 0x64, 0x00, 0x84
            ]
        );
    }

    #[test]
    fn read_transaction_inserts_gap() {
        let frame = encode_read_transaction(0x0C, 0xFF, 0x1234, 3);
        assert_eq!(frame.len(), 15);
        assert_eq!(&frame[5..8], &[0, 0, 0]);
        assert_eq!(frame[8], 0x69);
    }

    #[test]
    fn write_command_is_little_endian() {
        let frame = encode_write_command(0x1E, 0x0BB8);
        assert_eq!(&frame[4..6], &[0xB8, 0x0B]);
    }
}
