//! Conversation state: the ordered turn log and the reducer that folds
//! stream events into it.

pub mod normalize;
pub mod session;

pub use session::{Applied, ChatSession};

use crate::chart::ChartPayload;

/// Who produced a text turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Bot,
}

/// One entry in the conversation log.
#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    /// Markdown-flavored text from the user or the bot.
    Text { speaker: Speaker, content: String },
    /// A chart with a stable unique id used as the render mount anchor.
    Chart {
        id: String,
        title: String,
        payload: ChartPayload,
    },
}

impl Turn {
    /// The chart id, if this is a chart turn.
    pub fn chart_id(&self) -> Option<&str> {
        match self {
            Turn::Chart { id, .. } => Some(id),
            Turn::Text { .. } => None,
        }
    }
}

/// Ordered conversation log; insertion order is display order.
///
/// Mutated only by [`ChatSession`]; rendering collaborators get read-only
/// access and must tolerate a log that is still being appended to.
#[derive(Debug, Default)]
pub struct ConversationLog {
    turns: Vec<Turn>,
}

impl ConversationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All turns, in display order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub(crate) fn push(&mut self, turn: Turn) -> usize {
        self.turns.push(turn);
        self.turns.len() - 1
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut Turn> {
        self.turns.last_mut()
    }
}
