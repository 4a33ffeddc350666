use hdsniff_core::protocols::hitec::encode::{encode_read_transaction, encode_write_command};
use hdsniff_core::{DecodedEvent, Decoder, FrameContext, decode};

/// Test-local length of a half-open `[start, end)` span.
trait SpanLen {
    fn len(&self) -> usize;
}

impl SpanLen for hdsniff_core::ByteSpan {
    fn len(&self) -> usize {
        self.end - self.start
    }
}

const SAMPLE_REGISTERS: [u8; 6] = [0x00, 0x0C, 0x1E, 0x32, 0x9C, 0xFE];
const SAMPLE_VALUES: [u16; 5] = [0, 1, 0x00FF, 0x1234, 0xFFFF];

fn single_access(events: &[DecodedEvent]) -> &hdsniff_core::RegisterAccess {
    assert_eq!(events.len(), 1, "events: {events:?}");
    events[0].access().expect("read or write")
}

#[test]
fn reference_capture_decodes_to_target_read() {
    let capture = [
        0x96, 0x00, 0x1E, 0x00, 0x1E, 0x69, 0x00, 0x1E, 0x02, 0x64, 0x00, 0x84,
    ];
    let events = decode(&capture);
    assert!(matches!(events[0], DecodedEvent::Read(_)));
    let access = single_access(&events);
    assert_eq!(access.register, 0x1E);
    assert_eq!(access.value, 0x0064);
    assert!(access.checksum_valid);
}

#[test]
fn well_formed_reads_decode_and_consume_exact_length() {
    for register in SAMPLE_REGISTERS {
        for value in SAMPLE_VALUES {
            for (mystery, gap) in [(0x00, 0), (0xFF, 3), (0xFE, 17)] {
                let frame = encode_read_transaction(register, mystery, value, gap);
                let mut capture = frame.clone();
                capture.push(0x96);

                let mut decoder = Decoder::new(&capture);
                let events = decoder.step().expect("transaction");
                assert_eq!(decoder.position(), frame.len());
                let access = single_access(&events);
                assert!(matches!(events[0], DecodedEvent::Read(_)));
                assert_eq!(access.register, register);
                assert_eq!(access.value, value);
                assert!(access.checksum_valid);
                assert_eq!(access.span.len(), frame.len());
            }
        }
    }
}

#[test]
fn well_formed_writes_decode() {
    for register in SAMPLE_REGISTERS {
        for value in SAMPLE_VALUES {
            let frame = encode_write_command(register, value);
            let events = decode(&frame);
            assert!(matches!(events[0], DecodedEvent::Write(_)));
            let access = single_access(&events);
            assert_eq!(access.value, value);
            assert!(access.checksum_valid);
        }
    }
}

#[test]
fn any_flipped_checksum_byte_only_flags_the_value() {
    for value in SAMPLE_VALUES {
        let read = encode_read_transaction(0x1E, 0x00, value, 2);
        for checksum_index in [4, read.len() - 1] {
            for delta in [1u8, 0x80] {
                let mut capture = read.clone();
                capture[checksum_index] = capture[checksum_index].wrapping_add(delta);
                let events = decode(&capture);
                let access = single_access(&events);
                assert_eq!(access.value, value);
                assert!(!access.checksum_valid);
            }
        }

        let mut write = encode_write_command(0x1E, value);
        write[6] = write[6].wrapping_add(1);
        let events = decode(&write);
        let access = single_access(&events);
        assert_eq!(access.value, value);
        assert!(!access.checksum_valid);
    }
}

#[test]
fn corrupted_marker_yields_start_of_command_error() {
    let mut capture = encode_read_transaction(0x1E, 0x00, 100, 0);
    capture[0] = 0x95;
    let events = decode(&capture);
    let DecodedEvent::Error(first) = &events[0] else {
        panic!("expected error, got {:?}", events[0]);
    };
    assert_eq!(first.context, FrameContext::StartOfCommand);
    assert_eq!(first.actual, 0x95);
    assert!(events.iter().all(|e| e.access().is_none()));
}

#[test]
fn zero_runs_between_frames_do_not_change_events() {
    let first = encode_write_command(0x54, 10);
    let second = encode_read_transaction(0x56, 0x00, 2000, 1);
    let mut baseline_capture = first.to_vec();
    baseline_capture.extend_from_slice(&second);
    let baseline = decode(&baseline_capture);
    assert_eq!(baseline.len(), 2);

    for zeros in 1..=32 {
        let mut capture = first.to_vec();
        capture.resize(capture.len() + zeros, 0x00);
        capture.extend_from_slice(&second);
        let events = decode(&capture);
        assert_eq!(events.len(), 2);
        for (a, b) in events.iter().zip(&baseline) {
            assert_eq!(a.to_string(), b.to_string());
        }
    }
}

#[test]
fn empty_capture_yields_no_events() {
    assert!(decode(&[]).is_empty());
}

#[test]
fn event_offsets_never_go_backwards() {
    let mut capture = vec![0x42, 0x00];
    capture.extend_from_slice(&encode_write_command(0x1E, 1));
    capture.extend_from_slice(&[0x96, 0x00, 0x1E, 0x07]);
    capture.extend_from_slice(&encode_read_transaction(0x0C, 0xFF, 5, 4));
    let offsets: Vec<usize> = decode(&capture).iter().map(DecodedEvent::offset).collect();
    assert_eq!(offsets.len(), 4);
    assert!(offsets.windows(2).all(|w| w[0] < w[1]));
}
