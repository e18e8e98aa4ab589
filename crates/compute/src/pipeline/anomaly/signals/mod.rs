//! Individual anomaly signal scorers.
//!
//! Six independent detectors, each reading one slice of the bundle:
//! - Signal 1: Statistical deviation (z-score → normal CDF)
//! - Signal 2: Event frequency vs expectation (Poisson)
//! - Signal 3: Time of day vs historical activity
//! - Signal 4: Geographic movement (impossible travel, dispersion)
//! - Signal 5: Request velocity burst
//! - Signal 6: Device fingerprint novelty
//!
//! A scorer returns `None` when its inputs are absent or degenerate.

mod deviation;
mod device;
mod frequency;
mod spatial;
mod temporal;
mod velocity;

pub use deviation::{deviation_multiplier, score_deviation, DEFAULT_STD_DEV};
pub use device::{device_novelty, device_similarity, novelty_multiplier, score_device};
pub use frequency::{frequency_multiplier, score_frequency};
pub use spatial::{analyze_spatial, exceeds_travel_limit, score_spatial, SpatialAnalysis};
pub use temporal::score_temporal;
pub use velocity::{burst_intensity, score_velocity};
