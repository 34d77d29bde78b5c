//! Incremental SSE stream processing: bytes to text, text to frames,
//! frames to typed events.

pub mod decode;
pub mod event;
pub mod sse;

pub use decode::Utf8Decoder;
pub use event::{ChartEvent, StreamEvent, parse_frame};
pub use sse::SseFramer;
