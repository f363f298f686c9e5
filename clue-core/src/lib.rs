pub mod error;
pub mod lobby;
pub mod registry;
pub mod scoring;
pub mod settings;
pub mod words;

// Re-export main components
pub use error::*;
pub use lobby::*;
pub use registry::*;
pub use scoring::*;
pub use settings::*;
pub use words::*;
