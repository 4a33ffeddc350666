use std::borrow::Cow;
use std::collections::VecDeque;
use std::fmt;

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use super::checksum::{read_command_checksum, reply_checksum, write_command_checksum};
use super::error::{FrameContext, FrameError, PendingField, Truncation};
use super::layout;
use super::reader::ByteCursor;
use super::registers::name_of;

/// How the decoder continues after abandoning a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryMode {
    /// Resume at the very next byte after skipping line noise. A single
    /// dropped byte can produce a run of spurious errors until the stream
    /// realigns on its own.
    #[default]
    Local,
    /// Discard bytes up to the next command marker.
    Resync,
}

impl RecoveryMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RecoveryMode::Local => "local",
            RecoveryMode::Resync => "resync",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub recovery: RecoveryMode,
}

/// Half-open byte range `[start, end)` in the capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteSpan {
    pub start: usize,
    pub end: usize,
}

/// A decoded register read or write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterAccess {
    pub register: u8,
    pub value: u16,
    /// False when any checksum of the frame did not match.
    pub checksum_valid: bool,
    /// Command marker through final checksum byte. Idle bytes between a read
    /// command and its reply are included.
    pub span: ByteSpan,
}

impl RegisterAccess {
    pub fn name(&self) -> Cow<'static, str> {
        name_of(self.register)
    }
}

impl fmt::Display for RegisterAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=0x{:04x}={}", self.name(), self.value, self.value)?;
        if !self.checksum_valid {
            f.write_str(" (INVALID CHECKSUM!)")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedEvent {
    Read(RegisterAccess),
    Write(RegisterAccess),
    Error(FrameError),
}

impl DecodedEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            DecodedEvent::Read(_) => "read",
            DecodedEvent::Write(_) => "write",
            DecodedEvent::Error(_) => "error",
        }
    }

    /// First capture byte this event refers to.
    pub fn offset(&self) -> usize {
        match self {
            DecodedEvent::Read(access) | DecodedEvent::Write(access) => access.span.start,
            DecodedEvent::Error(err) => err.offset,
        }
    }

    pub fn access(&self) -> Option<&RegisterAccess> {
        match self {
            DecodedEvent::Read(access) | DecodedEvent::Write(access) => Some(access),
            DecodedEvent::Error(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DecodedEvent::Error(_))
    }
}

impl fmt::Display for DecodedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedEvent::Read(access) => write!(f, "read {access}"),
            DecodedEvent::Write(access) => write!(f, "write {access}"),
            DecodedEvent::Error(err) => write!(f, "{err}"),
        }
    }
}

/// Running counters for a decode pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeStats {
    pub noise_bytes: u64,
    pub resync_bytes: u64,
    pub reads: u64,
    pub writes: u64,
    pub errors: u64,
    pub invalid_checksums: u64,
}

struct EndOfInput(PendingField);

enum Outcome {
    Completed,
    Abandoned,
}

/// Command/reply state machine over a captured byte stream.
///
/// The decoder is a pull-based iterator: every call to `next` runs as many
/// transactions as needed to produce one event. It consumes its cursor and
/// cannot be restarted; build a new decoder to decode the same bytes again.
///
/// # Examples
/// ```
/// use hdsniff_core::Decoder;
///
/// let capture = [
///     0x96, 0x00, 0x1E, 0x00, 0x1E, 0x69, 0x00, 0x1E, 0x02, 0x64, 0x00, 0x84,
/// ];
/// let lines: Vec<String> = Decoder::new(&capture).map(|e| e.to_string()).collect();
/// assert_eq!(lines, ["read HD_REG_TARGET=0x0064=100"]);
/// ```
pub struct Decoder<'a> {
    cursor: ByteCursor<'a>,
    options: DecodeOptions,
    pending: VecDeque<DecodedEvent>,
    stats: DecodeStats,
    truncation: Option<Truncation>,
    finished: bool,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_options(data, DecodeOptions::default())
    }

    pub fn with_options(data: &'a [u8], options: DecodeOptions) -> Self {
        Self {
            cursor: ByteCursor::new(data),
            options,
            pending: VecDeque::new(),
            stats: DecodeStats::default(),
            truncation: None,
            finished: false,
        }
    }

    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    /// Partial frame found at the end of the capture, if any.
    pub fn truncation(&self) -> Option<Truncation> {
        self.truncation
    }

    /// Decode one transaction and return the events it produced.
    ///
    /// Returns `None` once the capture is exhausted.
    pub fn step(&mut self) -> Option<Vec<DecodedEvent>> {
        if self.pending.is_empty() && !self.advance() {
            return None;
        }
        Some(self.pending.drain(..).collect())
    }

    fn advance(&mut self) -> bool {
        if self.finished {
            return false;
        }
        if !self.cursor.has_more() {
            self.finish();
            return false;
        }

        let start = self.cursor.position();
        match self.transaction(start) {
            Ok(Outcome::Completed) => self.skip_noise(),
            Ok(Outcome::Abandoned) => {
                debug!("abandoned transaction started at offset {start}");
                self.recover();
            }
            Err(EndOfInput(pending)) => {
                warn!("capture ends inside frame at offset {start}, waiting for {pending:?}");
                self.truncation = Some(Truncation {
                    offset: start,
                    pending,
                });
                self.finish();
            }
        }
        true
    }

    fn finish(&mut self) {
        self.finished = true;
    }

    fn transaction(&mut self, start: usize) -> Result<Outcome, EndOfInput> {
        if !self.expect(FrameContext::StartOfCommand, &[layout::COMMAND_MARKER])? {
            return Ok(Outcome::Abandoned);
        }
        if !self.expect(FrameContext::CommandMystery, layout::COMMAND_MYSTERY_VALUES)? {
            return Ok(Outcome::Abandoned);
        }
        let register = self.read(PendingField::Register)?;
        let opcode = self.cursor.peek().ok_or(EndOfInput(PendingField::Opcode))?;
        if !self.expect(FrameContext::Opcode, layout::OPCODES)? {
            return Ok(Outcome::Abandoned);
        }
        if opcode == layout::OPCODE_READ {
            self.read_transaction(start, register)
        } else {
            self.write_transaction(start, register)
        }
    }

    fn read_transaction(&mut self, start: usize, register: u8) -> Result<Outcome, EndOfInput> {
        let command_ok =
            self.read(PendingField::CommandChecksum)? == read_command_checksum(register);
        if !command_ok {
            debug!("bad read command checksum for {} at offset {start}", name_of(register));
        }
        self.skip_noise();

        if !self.expect(FrameContext::StartOfReply, &[layout::REPLY_MARKER])? {
            return Ok(Outcome::Abandoned);
        }
        let mystery = self.read(PendingField::ReplyMystery)?;
        // Mismatches in the reply body are reported but the layout is trusted.
        if !self.expect(FrameContext::EchoedRegister, &[register])?
            || !self.expect(FrameContext::ReplyConstant, &[layout::REPLY_CONSTANT])?
        {
            return Ok(Outcome::Abandoned);
        }
        let low = self.read(PendingField::ValueLow)?;
        let high = self.read(PendingField::ValueHigh)?;
        let reply_ok =
            self.read(PendingField::ReplyChecksum)? == reply_checksum(mystery, register, low, high);

        let access = self.access(start, register, low, high, command_ok && reply_ok);
        self.emit(DecodedEvent::Read(access));
        Ok(Outcome::Completed)
    }

    fn write_transaction(&mut self, start: usize, register: u8) -> Result<Outcome, EndOfInput> {
        let low = self.read(PendingField::ValueLow)?;
        let high = self.read(PendingField::ValueHigh)?;
        let checksum_ok =
            self.read(PendingField::CommandChecksum)? == write_command_checksum(register, low, high);

        let access = self.access(start, register, low, high, checksum_ok);
        self.emit(DecodedEvent::Write(access));
        Ok(Outcome::Completed)
    }

    fn access(
        &self,
        start: usize,
        register: u8,
        low: u8,
        high: u8,
        checksum_valid: bool,
    ) -> RegisterAccess {
        RegisterAccess {
            register,
            value: u16::from_le_bytes([low, high]),
            checksum_valid,
            span: ByteSpan {
                start,
                end: self.cursor.position(),
            },
        }
    }

    fn read(&mut self, pending: PendingField) -> Result<u8, EndOfInput> {
        self.cursor.next_byte().ok_or(EndOfInput(pending))
    }

    /// Check the next byte against `expected`, reporting it on mismatch.
    ///
    /// Returns `false` when the mismatch abandons the transaction. In resync
    /// mode an unexpected command marker is left in place so the next
    /// transaction starts on it.
    fn expect(&mut self, context: FrameContext, expected: &[u8]) -> Result<bool, EndOfInput> {
        let offset = self.cursor.position();
        let actual = self.cursor.peek().ok_or(EndOfInput(pending_field(context)))?;
        if expected.contains(&actual) {
            self.cursor.next_byte();
            return Ok(true);
        }
        self.mismatch(context, actual, offset, expected);
        let abandons = context.abandons_transaction();
        let keep_marker = abandons
            && actual == layout::COMMAND_MARKER
            && self.options.recovery == RecoveryMode::Resync;
        if !keep_marker {
            self.cursor.next_byte();
        }
        Ok(!abandons)
    }

    fn mismatch(&mut self, context: FrameContext, actual: u8, offset: usize, expected: &[u8]) {
        trace!("{context} mismatch at offset {offset}: 0x{actual:02x}");
        self.emit(DecodedEvent::Error(FrameError {
            context,
            actual,
            expected: expected.to_vec(),
            offset,
        }));
    }

    fn emit(&mut self, event: DecodedEvent) {
        let access = match &event {
            DecodedEvent::Read(access) => {
                self.stats.reads += 1;
                Some(access)
            }
            DecodedEvent::Write(access) => {
                self.stats.writes += 1;
                Some(access)
            }
            DecodedEvent::Error(_) => {
                self.stats.errors += 1;
                None
            }
        };
        if access.is_some_and(|access| !access.checksum_valid) {
            self.stats.invalid_checksums += 1;
        }
        self.pending.push_back(event);
    }

    fn skip_noise(&mut self) {
        let skipped = self.cursor.skip_noise();
        if skipped > 0 {
            trace!("skipped {skipped} noise bytes before offset {}", self.cursor.position());
            self.stats.noise_bytes += skipped as u64;
        }
    }

    fn recover(&mut self) {
        match self.options.recovery {
            RecoveryMode::Local => self.skip_noise(),
            RecoveryMode::Resync => {
                let skipped = self.cursor.skip_until(layout::COMMAND_MARKER);
                if skipped > 0 {
                    debug!("discarded {skipped} bytes looking for the next command");
                    self.stats.resync_bytes += skipped as u64;
                }
            }
        }
    }
}

impl Iterator for Decoder<'_> {
    type Item = DecodedEvent;

    fn next(&mut self) -> Option<DecodedEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            if !self.advance() {
                return None;
            }
        }
    }
}

fn pending_field(context: FrameContext) -> PendingField {
    match context {
        FrameContext::StartOfCommand => PendingField::CommandMarker,
        FrameContext::CommandMystery => PendingField::CommandMystery,
        FrameContext::Opcode => PendingField::Opcode,
        FrameContext::StartOfReply => PendingField::StartOfReply,
        FrameContext::EchoedRegister => PendingField::EchoedRegister,
        FrameContext::ReplyConstant => PendingField::ReplyConstant,
    }
}

/// Decode a whole capture with default options.
pub fn decode(data: &[u8]) -> Vec<DecodedEvent> {
    Decoder::new(data).collect()
}
