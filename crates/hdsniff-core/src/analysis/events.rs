use crate::EventRecord;
use crate::protocols::hitec::DecodedEvent;

pub(crate) fn event_record(event: &DecodedEvent) -> EventRecord {
    let mut record = EventRecord {
        kind: event.kind().to_string(),
        offset: event.offset(),
        line: event.to_string(),
        register: None,
        name: None,
        value: None,
        checksum_valid: None,
        context: None,
        actual: None,
        expected: None,
    };
    match event {
        DecodedEvent::Read(access) | DecodedEvent::Write(access) => {
            record.register = Some(access.register);
            record.name = Some(access.name().into_owned());
            record.value = Some(access.value);
            record.checksum_valid = Some(access.checksum_valid);
        }
        DecodedEvent::Error(err) => {
            record.context = Some(err.context);
            record.actual = Some(err.actual);
            record.expected = Some(err.expected.clone());
        }
    }
    record
}

#[cfg(test)]
mod tests {
    use super::event_record;
    use crate::protocols::hitec::decode;

    #[test]
    fn error_record_omits_access_fields() {
        let events = decode(&[0x42]);
        let record = event_record(&events[0]);
        let value = serde_json::to_value(&record).expect("record json");
        assert_eq!(value["kind"], "error");
        assert_eq!(value["context"], "start_of_command");
        assert_eq!(value["actual"], 0x42);
        assert!(value.get("value").is_none());
        assert!(value.get("name").is_none());
    }
}
