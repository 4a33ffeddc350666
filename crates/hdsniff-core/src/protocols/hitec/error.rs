use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field the decoder was checking when a structural mismatch occurred.
///
/// The `Display` form is the human-facing context used in error lines, e.g.
/// `error in start of command! ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameContext {
    StartOfCommand,
    CommandMystery,
    Opcode,
    StartOfReply,
    EchoedRegister,
    ReplyConstant,
}

impl FrameContext {
    pub fn as_str(self) -> &'static str {
        match self {
            FrameContext::StartOfCommand => "start of command",
            FrameContext::CommandMystery => "mystery byte after start of command",
            FrameContext::Opcode => "opcode",
            FrameContext::StartOfReply => "start of reply",
            FrameContext::EchoedRegister => "echoed reg",
            FrameContext::ReplyConstant => "constant 0x02",
        }
    }

    /// Whether a mismatch on this field abandons the current transaction.
    pub fn abandons_transaction(self) -> bool {
        !matches!(
            self,
            FrameContext::EchoedRegister | FrameContext::ReplyConstant
        )
    }
}

impl fmt::Display for FrameContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural mismatch observed in the byte stream.
///
/// # Examples
/// ```
/// use hdsniff_core::{FrameContext, FrameError};
///
/// let err = FrameError {
///     context: FrameContext::StartOfCommand,
///     actual: 0x12,
///     expected: vec![0x96],
///     offset: 0,
/// };
/// assert_eq!(
///     err.to_string(),
///     "error in start of command! actual=0x12 expected=0x96"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "error in {context}! actual=0x{actual:02x} expected={}",
    format_expected(.expected)
)]
pub struct FrameError {
    pub context: FrameContext,
    pub actual: u8,
    pub expected: Vec<u8>,
    /// Offset of `actual` in the capture.
    pub offset: usize,
}

/// Field the decoder was waiting for when the capture ended mid-frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingField {
    CommandMarker,
    CommandMystery,
    Register,
    Opcode,
    CommandChecksum,
    StartOfReply,
    ReplyMystery,
    EchoedRegister,
    ReplyConstant,
    ValueLow,
    ValueHigh,
    ReplyChecksum,
}

/// Partial frame left at the end of a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Truncation {
    /// Offset of the command marker that started the partial frame.
    pub offset: usize,
    pub pending: PendingField,
}

pub fn format_expected(expected: &[u8]) -> String {
    expected
        .iter()
        .map(|b| format!("0x{b:02x}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::{FrameContext, FrameError, format_expected};

    #[test]
    fn expected_set_is_comma_joined_hex() {
        assert_eq!(format_expected(&[0x00, 0xFF]), "0x00,0xff");
        assert_eq!(format_expected(&[]), "");
    }

    #[test]
    fn opcode_error_line() {
        let err = FrameError {
            context: FrameContext::Opcode,
            actual: 0x05,
            expected: vec![0x00, 0x02],
            offset: 3,
        };
        assert_eq!(
            err.to_string(),
            "error in opcode! actual=0x05 expected=0x00,0x02"
        );
    }

    #[test]
    fn only_reply_echo_and_constant_continue() {
        assert!(FrameContext::StartOfCommand.abandons_transaction());
        assert!(FrameContext::CommandMystery.abandons_transaction());
        assert!(FrameContext::Opcode.abandons_transaction());
        assert!(FrameContext::StartOfReply.abandons_transaction());
        assert!(!FrameContext::EchoedRegister.abandons_transaction());
        assert!(!FrameContext::ReplyConstant.abandons_transaction());
    }
}
