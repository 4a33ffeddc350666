use super::layout;

/// Forward-only reader over a captured byte buffer.
pub struct ByteCursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn has_more(&self) -> bool {
        self.position < self.data.len()
    }

    /// Consume one byte; `None` signals end of input.
    pub fn next_byte(&mut self) -> Option<u8> {
        let byte = self.data.get(self.position).copied()?;
        self.position += 1;
        Some(byte)
    }

    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.position).copied()
    }

    /// Skip zero bytes left on the line between frames.
    ///
    /// Returns the number of bytes skipped.
    pub fn skip_noise(&mut self) -> usize {
        let start = self.position;
        while self.peek() == Some(layout::NOISE_BYTE) {
            self.position += 1;
        }
        self.position - start
    }

    /// Discard bytes up to, but not including, the next `marker`.
    ///
    /// Stops at end of input when no marker follows. Returns the number of
    /// bytes discarded.
    pub fn skip_until(&mut self, marker: u8) -> usize {
        let start = self.position;
        let rest = &self.data[self.position..];
        let skipped = rest
            .iter()
            .position(|&b| b == marker)
            .unwrap_or(rest.len());
        self.position += skipped;
        self.position - start
    }
}
