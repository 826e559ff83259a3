//! Architecture advice: building ideas from a generative-text service.
//!
//! # Invariants
//! - Callers always receive a [`Hint`]; failures degrade to [`Hint::fallback`].
//! - Requests never block the frame loop.
//! - Only the newest request may change the displayed hint.

mod client;
mod hint;
mod service;

pub use client::{AdviceError, GeminiClient, HintSource, parse_hint_text, parse_response, request_hint};
pub use hint::{Hint, MAX_SUGGESTED, THEMES};
pub use service::AdviceService;
