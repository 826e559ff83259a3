//! Rendering boundary: the per-frame scene handed to any renderer.
//!
//! # Invariants
//! - Renderers cannot mutate world truth.
//! - A frame is a snapshot; later edits do not affect it.

mod renderer;

pub use renderer::{DebugTextRenderer, Renderer, SceneFrame};
