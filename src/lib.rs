//! Card identification from a live camera feed.
//!
//! Each frame is searched for a card-shaped quadrilateral; the last good crop
//! is held for a short grace window; on capture the crop's ORB signature is
//! ranked against a reference database built from per-card images.
//!
//! Geometry, tracking, matching and database assembly are plain Rust. The
//! OpenCV-backed parts (edge maps, contours, feature extraction, camera and
//! preview surfaces, the pipeline controller) sit behind the default `opencv`
//! feature.

pub mod candidates;
pub mod commands;
pub mod config;
pub mod database;
pub mod error;
pub mod features;
pub mod geometry;
pub mod identify;
pub mod modules;
pub mod stability;

#[cfg(feature = "opencv")]
pub mod boundary;
#[cfg(feature = "opencv")]
pub mod pipeline;

pub use candidates::{filter_candidates, Candidate, ExclusionSet};
pub use config::Config;
pub use database::{BuildReport, IdentitySource, ReferenceDatabase, ReferenceIdentity};
pub use error::{Error, Result};
pub use features::FeatureSignature;
pub use geometry::{Point, Quad, Region};
pub use identify::{identify, Identification};
pub use stability::{StabilityTracker, TrackerEvent};

#[cfg(feature = "opencv")]
pub use boundary::BoundaryDetector;
#[cfg(feature = "opencv")]
pub use pipeline::{IdentifyJob, IdentifyOutcome, Pipeline, Status, TickReport};
