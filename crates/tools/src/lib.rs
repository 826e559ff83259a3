//! Developer tooling: world inspection for the debug overlay and the CLI.

mod inspector;

pub use inspector::{BlockInfo, WorldInspector, WorldSummary};
