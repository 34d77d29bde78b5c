//! The conversation reducer.
//!
//! Folds interpreted stream events into the log. Consecutive text deltas
//! coalesce into a single visible bot turn instead of one turn per network
//! chunk; a chart boundary always closes the running coalescing.

use super::{ConversationLog, Speaker, Turn};
use crate::chart;
use crate::chat::normalize::normalize;
use crate::stream::{ChartEvent, StreamEvent};
use uuid::Uuid;

/// Per-request stream state, discarded when the stream ends or errors.
#[derive(Debug, Default)]
struct StreamState {
    /// Running text for this response; only grows until normalization.
    accumulated: String,
    /// Set when the terminator event arrives.
    terminated: bool,
    /// Whether the log tail is the live accumulator turn.
    open_turn: bool,
}

/// What the reducer did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Text was coalesced into (or opened) the bot turn at the tail.
    Text,
    /// A chart turn was appended at this log index.
    Chart { index: usize },
    /// The terminator arrived; the log was not touched.
    Terminated,
}

/// A conversation: the turn log plus the state of the in-flight response.
#[derive(Debug, Default)]
pub struct ChatSession {
    log: ConversationLog,
    state: StreamState,
}

impl ChatSession {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// The conversation log, in display order.
    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Whether the current stream has seen its terminator.
    pub fn terminated(&self) -> bool {
        self.state.terminated
    }

    /// Reset per-request stream state before a new send.
    pub fn begin_stream(&mut self) {
        self.state = StreamState::default();
    }

    /// Append the user's message. Happens at send time, before any network
    /// activity, and is never subject to coalescing.
    pub fn push_user(&mut self, content: &str) {
        self.log.push(Turn::Text {
            speaker: Speaker::User,
            content: content.to_string(),
        });
    }

    /// Append one user-visible error turn for a terminal failure.
    ///
    /// No normalization of partially accumulated text is attempted.
    pub fn push_error(&mut self, message: &str) {
        self.state.open_turn = false;
        self.log.push(Turn::Text {
            speaker: Speaker::Bot,
            content: message.to_string(),
        });
    }

    /// Fold one stream event into the log.
    pub fn apply(&mut self, event: StreamEvent) -> Applied {
        match event {
            StreamEvent::TextDelta(content) | StreamEvent::Raw(content) => {
                self.state.accumulated.push_str(&content);
                self.write_accumulated();
                Applied::Text
            }
            StreamEvent::Chart(chart) => Applied::Chart {
                index: self.push_chart(chart),
            },
            StreamEvent::Done => {
                self.state.terminated = true;
                Applied::Terminated
            }
        }
    }

    /// Finalize a completed stream: normalize the accumulated text and
    /// write it into the closing bot turn, or append one when a chart
    /// boundary closed the tail. The turn is static afterwards.
    pub fn finalize(&mut self) {
        if self.state.accumulated.is_empty() {
            return;
        }
        let cleaned = normalize(&self.state.accumulated);
        self.state.accumulated = cleaned;
        self.write_accumulated();
        self.state.open_turn = false;
    }

    /// Replace the open bot turn's content with the running text, or open a
    /// new bot turn seeded with it.
    fn write_accumulated(&mut self) {
        if self.state.open_turn
            && let Some(Turn::Text {
                speaker: Speaker::Bot,
                content,
            }) = self.log.last_mut()
        {
            *content = self.state.accumulated.clone();
            return;
        }
        self.log.push(Turn::Text {
            speaker: Speaker::Bot,
            content: self.state.accumulated.clone(),
        });
        self.state.open_turn = true;
    }

    /// Append a chart turn, preceded by its description when present.
    ///
    /// A chart boundary ends running-text coalescing: the previously open
    /// turn keeps its content as-is from here on.
    fn push_chart(&mut self, chart: ChartEvent) -> usize {
        self.state.open_turn = false;
        if let Some(description) = chart.description {
            self.log.push(Turn::Text {
                speaker: Speaker::Bot,
                content: description,
            });
        }
        self.log.push(Turn::Chart {
            id: format!("chart-{}", Uuid::new_v4()),
            title: chart.title,
            payload: chart::shape(&chart.payload),
        })
    }
}
