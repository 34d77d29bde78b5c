//! The rendering collaborator seam.
//!
//! The core owns no visuals. It notifies a [`Renderer`] after every log
//! change and asks it to mount/unmount charts keyed by their turn id; the
//! host (BI visual, TUI, web shell) supplies the implementation.

use crate::chart::ChartPayload;
use crate::chat::ConversationLog;
use std::collections::HashMap;
use thiserror::Error;

/// A rendering collaborator failure, caught at the boundary and surfaced as
/// one conversation turn rather than aborting the stream.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct RenderError(pub String);

/// Host-side rendering of the conversation log.
pub trait Renderer {
    /// Called after every log mutation. The log may still be appended to;
    /// implementations must tolerate rendering mid-stream.
    fn render_log(&mut self, log: &ConversationLog);

    /// Mount a chart for a newly appended chart turn. `id` is the stable
    /// join key; it is never reused.
    fn mount_chart(&mut self, id: &str, title: &str, payload: &ChartPayload)
    -> Result<(), RenderError>;

    /// Release the chart instance for a removed turn or a closing session.
    fn unmount_chart(&mut self, id: &str);
}

/// Chart instances owned by a renderer, keyed by chart-turn id.
///
/// Lifecycle is tied to turn removal and session teardown; instances drop
/// when removed or cleared.
#[derive(Debug)]
pub struct ChartRegistry<T> {
    charts: HashMap<String, T>,
}

impl<T> ChartRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            charts: HashMap::new(),
        }
    }

    /// Register an instance for a chart id. Returns the displaced instance
    /// if the id was already mounted.
    pub fn insert(&mut self, id: impl Into<String>, instance: T) -> Option<T> {
        self.charts.insert(id.into(), instance)
    }

    /// Whether a chart id is already mounted.
    pub fn contains(&self, id: &str) -> bool {
        self.charts.contains_key(id)
    }

    /// Remove and return the instance for a chart id.
    pub fn remove(&mut self, id: &str) -> Option<T> {
        self.charts.remove(id)
    }

    /// Drop every instance (session teardown).
    pub fn clear(&mut self) {
        self.charts.clear();
    }

    /// Number of mounted charts.
    pub fn len(&self) -> usize {
        self.charts.len()
    }

    /// Whether no charts are mounted.
    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}

impl<T> Default for ChartRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
