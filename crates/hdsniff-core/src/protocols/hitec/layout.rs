pub const COMMAND_MARKER: u8 = 0x96;
pub const REPLY_MARKER: u8 = 0x69;

pub const COMMAND_MYSTERY_VALUES: &[u8] = &[0x00, 0xFF];
pub const COMMAND_MYSTERY_DEFAULT: u8 = 0x00;

pub const OPCODE_READ: u8 = 0x00;
pub const OPCODE_WRITE: u8 = 0x02;
pub const OPCODES: &[u8] = &[OPCODE_READ, OPCODE_WRITE];

pub const REPLY_CONSTANT: u8 = 0x02;

pub const NOISE_BYTE: u8 = 0x00;

/// marker, mystery, register, opcode, checksum
pub const READ_COMMAND_LEN: usize = 5;
/// marker, mystery, register, constant, low, high, checksum
pub const READ_REPLY_LEN: usize = 7;
/// marker, mystery, register, opcode, low, high, checksum
pub const WRITE_COMMAND_LEN: usize = 7;
