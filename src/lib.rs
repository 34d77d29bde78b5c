#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod chart;
pub mod chat;
pub mod client;
pub mod error;
pub mod render;
pub mod stream;
