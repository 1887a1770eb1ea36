//! Frequency sweep orchestration

pub mod cancel;
pub mod config;
pub mod driver;
pub mod manifest;
pub mod output;
pub mod run;

// Re-export main types
pub use cancel::CancellationToken;
pub use config::{FrequencySpec, SimulationConfig};
pub use driver::SimulationDriver;
pub use manifest::{
    CombinedOutcome, ComponentEntry, ComponentOutcome, FrequencyManifest, SweepManifest,
    SweepState,
};
pub use output::{FrequencyProduct, MemorySink, OutputSink};
pub use run::SimulationRun;
