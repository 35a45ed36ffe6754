//! Shared data model for the site-selection engine.
//!
//! Holds the plain, `serde`-derived value types every other crate in the
//! workspace depends on — candidates, features, weights, country
//! configuration — plus the geo primitives (haversine distance,
//! point-in-polygon) and the single structured error type. No component
//! logic lives here; this crate is the "arena" every later stage indexes
//! into by `id: String`, never by pointer.

pub mod anchors;
pub mod candidate;
pub mod config;
pub mod country;
pub mod error;
pub mod features;
pub mod geo;
pub mod inputs;
pub mod pareto;
pub mod quality;
pub mod weights;

pub use anchors::{AnchorPoint, AnchorStats, AnchorType};
pub use candidate::{Candidate, CandidateStatus, ConstraintViolation, ViolationReason};
pub use config::{
    AnchorDedupReport, Diagnostics, GenerationConfig, GenerationRequest, GenerationResult,
    PolicyBaseline, PortfolioSummary, Reproducibility, ScenarioMode, ScoreDistribution,
};
pub use country::{AdministrativeRegion, CountryConfig};
pub use error::{FieldViolation, SiteError, Result};
pub use features::{Features, SubScores};
pub use geo::{haversine_km, LatLng, Polygon, EARTH_RADIUS_KM};
pub use inputs::{CompetitorLocation, ExistingStore, PopulationCell};
pub use pareto::ParetoPoint;
pub use quality::{DataQuality, EstimationFlags, DEFAULT_MIN_COMPLETENESS};
pub use weights::{WeightMultipliers, Weights, WEIGHT_SUM_EPSILON, WEIGHT_SUM_TOLERANCE};
