pub mod settings;

pub use settings::{EngineSettings, SourceSettings};
