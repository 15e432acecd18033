pub mod cli;
pub mod level;
pub mod logger;
pub mod record;

// Re-export commonly used types
pub use level::Level;
pub use logger::{Error, Logger, Options};
pub use record::{Record, Value};
