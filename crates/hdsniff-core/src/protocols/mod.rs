//! Protocol decoding modules.
//!
//! Each protocol follows a layered structure:
//! - `layout`: marker values, opcodes and frame lengths (source of truth)
//! - `reader`: sequential byte access and line-noise handling
//! - `parser`: the decoding state machine (no direct byte indexing)
//! - `error`: explicit, reportable mismatches
//!
//! Parsers are pure and contain no I/O; sources and analysis layers handle
//! file access and aggregation.

pub mod hitec;
