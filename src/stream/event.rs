//! Frame interpretation.
//!
//! One SSE frame becomes one typed event: an incremental text delta, a
//! chart, the end-of-stream marker, or raw fallback text for backends that
//! send plain text instead of structured payloads.

use crate::chart;
use serde_json::Value;

/// Literal payload that signals end of stream.
const DONE_TOKEN: &str = "[DONE]";

/// A typed event interpreted from one SSE frame.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Incremental text token.
    TextDelta(String),
    /// A chart to append to the conversation.
    Chart(ChartEvent),
    /// End-of-stream marker (`[DONE]` or an empty payload).
    Done,
    /// Unstructured payload, merged into the text channel.
    Raw(String),
}

/// Chart event contents, before payload shaping.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartEvent {
    /// Optional lead-in text shown as its own turn before the chart.
    pub description: Option<String>,
    /// Resolved title: `config.title`, else `title`, else a placeholder.
    pub title: String,
    /// The full parsed payload object.
    pub payload: Value,
}

/// Interpret one frame into an event.
///
/// Lines starting with `event:` set the type label and lines starting with
/// `data:` set the payload; the last occurrence of each wins. Returns `None`
/// for frames carrying no event (including chart frames with malformed
/// JSON, which are tolerated and dropped).
pub fn parse_frame(frame: &str) -> Option<StreamEvent> {
    let mut label = "";
    let mut payload = "";

    for line in frame.lines() {
        if let Some(value) = line.strip_prefix("event:") {
            label = value.trim();
        } else if let Some(value) = line.strip_prefix("data:") {
            payload = value.trim();
        }
    }

    if payload.is_empty() || payload == DONE_TOKEN {
        return Some(StreamEvent::Done);
    }

    if label == "chart" {
        match serde_json::from_str::<Value>(payload) {
            Ok(parsed) if parsed.get("type").and_then(Value::as_str) == Some("chart") => {
                return Some(StreamEvent::Chart(ChartEvent {
                    description: parsed
                        .get("description")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    title: chart::resolve_title(&parsed),
                    payload: parsed,
                }));
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!("Dropping malformed chart frame: {err}");
                return None;
            }
        }
    }

    if let Ok(parsed) = serde_json::from_str::<Value>(payload)
        && parsed.get("type").and_then(Value::as_str) == Some("text")
        && let Some(content) = parsed.get("content").and_then(Value::as_str)
        && !content.is_empty()
    {
        return Some(StreamEvent::TextDelta(content.to_string()));
    }

    Some(StreamEvent::Raw(payload.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_delta() {
        let event = parse_frame("data: {\"type\":\"text\",\"content\":\"Hello\"}");
        assert_eq!(event, Some(StreamEvent::TextDelta("Hello".into())));
    }

    #[test]
    fn test_done_token() {
        assert_eq!(parse_frame("data: [DONE]"), Some(StreamEvent::Done));
    }

    #[test]
    fn test_empty_payload_is_done() {
        assert_eq!(parse_frame("event: message"), Some(StreamEvent::Done));
        assert_eq!(parse_frame("data:"), Some(StreamEvent::Done));
    }

    #[test]
    fn test_chart_event() {
        let frame = "event: chart\ndata: {\"type\":\"chart\",\"title\":\"Sales\",\"description\":\"By region\",\"data\":{\"datasets\":[]}}";
        let Some(StreamEvent::Chart(chart)) = parse_frame(frame) else {
            panic!("Expected Chart");
        };
        assert_eq!(chart.title, "Sales");
        assert_eq!(chart.description.as_deref(), Some("By region"));
        assert_eq!(chart.payload["type"], "chart");
    }

    #[test]
    fn test_chart_title_from_config_wins() {
        let frame =
            "event: chart\ndata: {\"type\":\"chart\",\"title\":\"outer\",\"config\":{\"title\":\"inner\"}}";
        let Some(StreamEvent::Chart(chart)) = parse_frame(frame) else {
            panic!("Expected Chart");
        };
        assert_eq!(chart.title, "inner");
    }

    #[test]
    fn test_chart_title_placeholder() {
        let frame = "event: chart\ndata: {\"type\":\"chart\"}";
        let Some(StreamEvent::Chart(chart)) = parse_frame(frame) else {
            panic!("Expected Chart");
        };
        assert_eq!(chart.title, "Chart");
    }

    #[test]
    fn test_malformed_chart_json_dropped() {
        let frame = "event: chart\ndata: {not valid json";
        assert_eq!(parse_frame(frame), None);
    }

    #[test]
    fn test_malformed_json_without_chart_label_is_raw() {
        let event = parse_frame("data: {not valid json");
        assert_eq!(event, Some(StreamEvent::Raw("{not valid json".into())));
    }

    #[test]
    fn test_json_with_unexpected_shape_is_raw() {
        let event = parse_frame("data: {\"type\":\"usage\",\"tokens\":12}");
        assert_eq!(
            event,
            Some(StreamEvent::Raw("{\"type\":\"usage\",\"tokens\":12}".into()))
        );
    }

    #[test]
    fn test_empty_content_is_raw() {
        // type=text but no usable content falls through to raw
        let event = parse_frame("data: {\"type\":\"text\",\"content\":\"\"}");
        assert_eq!(
            event,
            Some(StreamEvent::Raw("{\"type\":\"text\",\"content\":\"\"}".into()))
        );
    }

    #[test]
    fn test_plain_text_payload_is_raw() {
        let event = parse_frame("data: just some words");
        assert_eq!(event, Some(StreamEvent::Raw("just some words".into())));
    }

    #[test]
    fn test_last_data_line_wins() {
        // Documented choice: only one payload line is expected per frame,
        // and the final one is authoritative when several appear.
        let event = parse_frame("data: first\ndata: second");
        assert_eq!(event, Some(StreamEvent::Raw("second".into())));
    }

    #[test]
    fn test_chart_label_with_text_payload_matches_text_rule() {
        let frame = "event: chart\ndata: {\"type\":\"text\",\"content\":\"hi\"}";
        assert_eq!(parse_frame(frame), Some(StreamEvent::TextDelta("hi".into())));
    }
}
