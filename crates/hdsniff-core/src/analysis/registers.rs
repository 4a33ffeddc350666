use std::collections::BTreeMap;

use crate::RegisterSummary;
use crate::protocols::hitec::{DecodedEvent, name_of};

#[derive(Debug, Default, Clone)]
pub(crate) struct RegisterStats {
    pub reads: u64,
    pub writes: u64,
    pub invalid_checksums: u64,
    pub last_value: Option<u16>,
}

pub(crate) fn add_register_event(stats: &mut BTreeMap<u8, RegisterStats>, event: &DecodedEvent) {
    let (access, is_read) = match event {
        DecodedEvent::Read(access) => (access, true),
        DecodedEvent::Write(access) => (access, false),
        DecodedEvent::Error(_) => return,
    };
    let entry = stats.entry(access.register).or_default();
    if is_read {
        entry.reads += 1;
    } else {
        entry.writes += 1;
    }
    if access.checksum_valid {
        entry.last_value = Some(access.value);
    } else {
        entry.invalid_checksums += 1;
    }
}

/// Summaries ordered by register address.
pub(crate) fn build_register_summaries(stats: BTreeMap<u8, RegisterStats>) -> Vec<RegisterSummary> {
    stats
        .into_iter()
        .map(|(register, stats)| RegisterSummary {
            register,
            name: name_of(register).into_owned(),
            reads: stats.reads,
            writes: stats.writes,
            invalid_checksums: stats.invalid_checksums,
            last_value: stats.last_value,
        })
        .collect()
}
