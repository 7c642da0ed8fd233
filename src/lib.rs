pub mod allocation;
pub mod dataset;
pub mod error;
pub mod evolution;
pub mod exhaustive;
pub mod individual;
pub mod population;
pub mod rng;
pub mod scoring;

// Re-export commonly used types for convenience
pub use allocation::{Allocation, FRONTS, TOTAL};
pub use dataset::{OpponentTable, TableLayout};
pub use error::{BlottoError, OptionExt, Result, ResultExt};
pub use scoring::{Outcome, Tally};
