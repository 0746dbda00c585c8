// src/detection/mod.rs

mod jump;
mod pushup;
mod types;

// Re-export public APIs
pub use jump::JumpDetector;
pub use pushup::{PushupCounter, PushupThresholds};
pub use types::*;
