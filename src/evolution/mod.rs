pub mod challenge;
pub mod engine;
pub mod launcher;
pub mod options;

pub use challenge::Challenge;
pub use engine::{EvolutionEngine, GenerationReport};
pub use launcher::{EvolutionLauncher, EvolutionResult};
pub use options::{EvolutionOptions, EvolutionOptionsBuilder, LogLevel};
