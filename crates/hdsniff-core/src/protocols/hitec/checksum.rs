//! Frame checksums.
//!
//! Every checksum on this bus is the 8-bit wrapping sum of a few frame bytes.
//! The markers and the command-side mystery byte never participate; the reply
//! mystery byte does.

use super::layout;

/// Sum of `bytes` modulo 256.
///
/// # Examples
/// ```
/// use hdsniff_core::protocols::hitec::checksum::checksum;
///
/// assert_eq!(checksum(&[0xFF, 0x02]), 0x01);
/// assert_eq!(checksum(&[]), 0x00);
/// ```
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

pub fn read_command_checksum(register: u8) -> u8 {
    checksum(&[register, layout::OPCODE_READ])
}

pub fn write_command_checksum(register: u8, low: u8, high: u8) -> u8 {
    checksum(&[register, layout::OPCODE_WRITE, low, high])
}

pub fn reply_checksum(mystery: u8, register: u8, low: u8, high: u8) -> u8 {
    checksum(&[mystery, register, layout::REPLY_CONSTANT, low, high])
}
