pub mod path_outcome;
pub mod price_path;
pub mod simulation_report;
pub mod statistics;

pub use path_outcome::PathOutcome;
pub use price_path::PricePath;
pub use simulation_report::{SamplePath, SimulationReport};
pub use statistics::{
    AggregateStatistics, Histogram, Percentiles, StrategyStatistics, TerminalPriceSummary,
};
