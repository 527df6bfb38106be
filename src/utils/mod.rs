//! Terminal helpers and project folder layout

pub mod paths;
pub mod progress;
pub mod styling;

pub use paths::ProjectPaths;
pub use progress::*;
