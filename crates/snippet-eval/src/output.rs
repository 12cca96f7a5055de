//! Output sinks: where a run's lines and error flag go.

use serde::{Deserialize, Serialize};

/// Receives the output of a run.
///
/// `set_error_state(false)` is always the first call of a run; at most one
/// `set_error_state(true)` follows, after which only error lines arrive.
pub trait OutputSink {
    fn write_line(&mut self, line: &str);
    fn set_error_state(&mut self, is_error: bool);
}

/// One call made on an [`OutputSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum OutputEvent {
    WriteLine(String),
    SetErrorState(bool),
}

/// An [`OutputSink`] that records every event in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub events: Vec<OutputEvent>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Just the written lines.
    pub fn lines(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                OutputEvent::WriteLine(line) => Some(line.as_str()),
                OutputEvent::SetErrorState(_) => None,
            })
            .collect()
    }

    /// The most recent error flag (`false` if never set).
    pub fn is_error(&self) -> bool {
        self.events
            .iter()
            .rev()
            .find_map(|event| match event {
                OutputEvent::SetErrorState(flag) => Some(*flag),
                OutputEvent::WriteLine(_) => None,
            })
            .unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl OutputSink for Transcript {
    fn write_line(&mut self, line: &str) {
        self.events.push(OutputEvent::WriteLine(line.to_string()));
    }

    fn set_error_state(&mut self, is_error: bool) {
        self.events.push(OutputEvent::SetErrorState(is_error));
    }
}

/// Adapts a pair of callbacks to [`OutputSink`].
pub(crate) struct CallbackSink<W, E> {
    pub(crate) write_line: W,
    pub(crate) set_error_state: E,
}

impl<W: FnMut(&str), E: FnMut(bool)> OutputSink for CallbackSink<W, E> {
    fn write_line(&mut self, line: &str) {
        (self.write_line)(line)
    }

    fn set_error_state(&mut self, is_error: bool) {
        (self.set_error_state)(is_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_records_in_order() {
        let mut transcript = Transcript::new();
        transcript.set_error_state(false);
        transcript.write_line("a");
        transcript.set_error_state(true);
        transcript.write_line("b");
        assert_eq!(transcript.lines(), vec!["a", "b"]);
        assert!(transcript.is_error());
        assert_eq!(transcript.events.len(), 4);
    }

    #[test]
    fn test_event_serialization_shape() {
        let json = serde_json::to_string(&OutputEvent::WriteLine("hi".into())).unwrap();
        assert_eq!(json, r#"{"type":"write_line","value":"hi"}"#);
        let json = serde_json::to_string(&OutputEvent::SetErrorState(true)).unwrap();
        assert_eq!(json, r#"{"type":"set_error_state","value":true}"#);
    }
}
