// src/session/mod.rs
pub mod pushup;
pub mod skip;
pub mod summary;

pub use pushup::PushupSession;
pub use skip::SkipSession;
pub use summary::SkipOutputPaths;
