//! Orchestration: chains grid generation, scoring, shortlisting,
//! refinement, and portfolio construction into a single generation run.

pub mod export;
pub mod generator;
pub mod portfolio;
pub mod refinement;
pub mod shortlist;
pub mod validation;

pub use export::to_geojson;
pub use generator::{generate, generate_seed, scenario_hash};
