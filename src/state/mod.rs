//! State module for tracking run progress
//!
//! # Components
//!
//! - `RunState`: where a pipeline run currently is (sitemap fetch, per-entry
//!   stages, terminal states) and which moves between states are legal

mod run_state;

// Re-export main types
pub use run_state::RunState;
