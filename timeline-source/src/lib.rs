//! Event resource (`{ "events": [...] }`) to `EventRecord` loader.

use serde_json::Value;
use timeline_core::{EventRecord, HorizontalOffset, LoadError, Side};

/// Parse an event resource from a JSON string.
pub fn parse_events_str(resource_json: &str) -> Result<Vec<EventRecord>, LoadError> {
    let value: Value =
        serde_json::from_str(resource_json).map_err(|err| LoadError::Parse(err.to_string()))?;
    parse_events_value(&value)
}

/// Parse an event resource from a `serde_json::Value`.
///
/// Every record must carry `date`, `title`, `infoId`, `top` and exactly one
/// of `left` / `right`. The first invalid record fails the whole resource.
pub fn parse_events_value(resource: &Value) -> Result<Vec<EventRecord>, LoadError> {
    let entries = resource
        .get("events")
        .and_then(Value::as_array)
        .ok_or(LoadError::MissingEvents)?;

    let events = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_record(index, entry))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(count = events.len(), "parsed event resource");
    Ok(events)
}

fn parse_record(index: usize, record: &Value) -> Result<EventRecord, LoadError> {
    let date = required_text(record, index, "date")?;
    let title = required_text(record, index, "title")?;
    let info_id = required_text(record, index, "infoId")?;
    let top_offset = required_text(record, index, "top")?;

    let horizontal_offset = match (text_field(record, "left"), text_field(record, "right")) {
        (Some(value), None) => HorizontalOffset {
            side: Side::Left,
            value,
        },
        (None, Some(value)) => HorizontalOffset {
            side: Side::Right,
            value,
        },
        _ => return Err(LoadError::HorizontalOffset { index }),
    };

    Ok(EventRecord {
        date,
        title,
        info_id,
        top_offset,
        horizontal_offset,
    })
}

fn required_text(record: &Value, index: usize, field: &'static str) -> Result<String, LoadError> {
    text_field(record, field).ok_or(LoadError::MissingField { index, field })
}

fn text_field(record: &Value, field: &str) -> Option<String> {
    record
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn right_anchored_record_is_parsed() {
        let resource = json!({
            "events": [
                { "date": " 1787 ", "title": "The Breach", "infoId": "the-breach", "top": "40%", "right": "8%" }
            ]
        });
        let events = parse_events_value(&resource).expect("valid resource");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date, "1787");
        assert_eq!(events[0].horizontal_offset.side, Side::Right);
        assert_eq!(events[0].horizontal_offset.value, "8%");
    }

    #[test]
    fn missing_field_reports_record_position() {
        let resource = json!({
            "events": [
                { "date": "1", "title": "a", "infoId": "a", "top": "1%", "left": "1%" },
                { "date": "2", "title": "b", "top": "2%", "left": "2%" }
            ]
        });
        assert_eq!(
            parse_events_value(&resource),
            Err(LoadError::MissingField {
                index: 1,
                field: "infoId"
            })
        );
    }

    #[test]
    fn both_or_neither_horizontal_offset_is_rejected() {
        let both = json!({
            "events": [
                { "date": "1", "title": "a", "infoId": "a", "top": "1%", "left": "1%", "right": "2%" }
            ]
        });
        let neither = json!({
            "events": [
                { "date": "1", "title": "a", "infoId": "a", "top": "1%", "left": "" }
            ]
        });
        assert_eq!(
            parse_events_value(&both),
            Err(LoadError::HorizontalOffset { index: 0 })
        );
        assert_eq!(
            parse_events_value(&neither),
            Err(LoadError::HorizontalOffset { index: 0 })
        );
    }

    #[test]
    fn resource_without_events_array_is_rejected() {
        assert_eq!(
            parse_events_value(&json!({ "items": [] })),
            Err(LoadError::MissingEvents)
        );
        assert!(matches!(
            parse_events_str("{ not json"),
            Err(LoadError::Parse(_))
        ));
    }

    #[test]
    fn empty_event_list_is_valid() {
        let events = parse_events_value(&json!({ "events": [] })).expect("empty list");
        assert!(events.is_empty());
    }
}
