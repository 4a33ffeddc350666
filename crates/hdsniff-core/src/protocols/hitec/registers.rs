//! Register directory.
//!
//! Names follow the reverse-engineered register map of the D-series servos.
//! Addresses missing from the table are rendered as `HD_REG[0xNN]`.

use std::borrow::Cow;

/// Known registers, sorted by address.
pub const KNOWN_REGISTERS: &[(u8, &str)] = &[
    (0x00, "HD_REG_MODEL_NUMBER"),
    (0x0C, "HD_REG_CURRENT_APV"),
    (0x1E, "HD_REG_TARGET"),
    (0x32, "HD_REG_ID"),
    (0x44, "HD_REG_SMART_SENSE_1"),
    (0x46, "HD_REG_REBOOT"),
    (0x4C, "HD_REG_FAIL_SAFE"),
    (0x4E, "HD_REG_DEADBAND_1"),
    (0x54, "HD_REG_SPEED"),
    (0x56, "HD_REG_POWER_LIMIT"),
    (0x5E, "HD_REG_DIRECTION"),
    (0x60, "HD_REG_SOFT_START"),
    (0x64, "HD_REG_SENSITIVITY_RATIO"),
    (0x66, "HD_REG_DEADBAND_2"),
    (0x68, "HD_REG_DEADBAND_3"),
    (0x6C, "HD_REG_SMART_SENSE_2"),
    (0x6E, "HD_REG_FACTORY_RESET"),
    (0x70, "HD_REG_SAVE"),
    (0x72, "HD_REG_MYSTERY_DB"),
    (0x8A, "HD_REG_SS_DISABLE_2"),
    (0x8C, "HD_REG_SS_DISABLE_1"),
    (0x98, "HD_REG_MYSTERY_OP1"),
    (0x9A, "HD_REG_MYSTERY_OP2"),
    (0x9C, "HD_REG_OVERLOAD_PROTECTION"),
    (0xB0, "HD_REG_RANGE_RIGHT_APV"),
    (0xB2, "HD_REG_RANGE_LEFT_APV"),
    (0xC2, "HD_REG_RANGE_CENTER_APV"),
    (0xD4, "HD_REG_SS_ENABLE_2"),
    (0xD6, "HD_REG_SS_ENABLE_1"),
];

fn lookup(register: u8) -> Option<&'static str> {
    KNOWN_REGISTERS
        .binary_search_by_key(&register, |&(addr, _)| addr)
        .ok()
        .map(|idx| KNOWN_REGISTERS[idx].1)
}

/// Symbolic name for `register`, or a hex placeholder when unknown.
///
/// # Examples
/// ```
/// use hdsniff_core::name_of;
///
/// assert_eq!(name_of(0x1E), "HD_REG_TARGET");
/// assert_eq!(name_of(0x1F), "HD_REG[0x1f]");
/// ```
pub fn name_of(register: u8) -> Cow<'static, str> {
    match lookup(register) {
        Some(name) => Cow::Borrowed(name),
        None => Cow::Owned(format!("HD_REG[0x{register:02x}]")),
    }
}

pub fn is_known(register: u8) -> bool {
    lookup(register).is_some()
}
