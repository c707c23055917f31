//! Core services: classification, walking, dedupe, bucketing, import fan-out

pub mod bucket;
pub mod classify;
pub mod dedupe;
pub mod import;
pub mod walk;
