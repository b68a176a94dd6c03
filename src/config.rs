//! Runtime settings, read from a TOML file.
//!
//! Every section falls back to its defaults, so a file only needs to name the
//! values it changes:
//!
//! ```toml
//! tick_hz = 30
//!
//! [input]
//! device = 1
//!
//! [database]
//! root = "cards"
//!
//! [[database.identities]]
//! id = "the_fool"
//! images = ["fool_front.jpg", "fool_worn.jpg"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::database::IdentitySource;
use crate::error::{Error, Result};

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
	/// Analysis ticks per second driven by the binary.
	pub tick_hz: f64,
	pub input: InputParams,
	pub boundary: BoundaryParams,
	pub stability: StabilityParams,
	pub features: FeatureParams,
	pub matching: MatchParams,
	pub database: DatabaseConfig,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			tick_hz: 60.0,
			input: InputParams::default(),
			boundary: BoundaryParams::default(),
			stability: StabilityParams::default(),
			features: FeatureParams::default(),
			matching: MatchParams::default(),
			database: DatabaseConfig::default(),
		}
	}
}

/// Fastest tick rate accepted, keeping the tick period at 1 ms or more.
pub const MAX_TICK_HZ: f64 = 1000.0;

impl Config {
	pub fn from_file(path: &Path) -> Result<Self> {
		let content = fs::read_to_string(path).map_err(|source| Error::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&content)
	}

	pub fn from_toml_str(content: &str) -> Result<Self> {
		let config: Self = toml::from_str(content)?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<()> {
		if !(self.tick_hz > 0.0 && self.tick_hz <= MAX_TICK_HZ) {
			return Err(Error::Setting {
				key: "tick_hz",
				reason: format!("{} is outside (0, {MAX_TICK_HZ}]", self.tick_hz),
			});
		}
		Ok(())
	}

	pub fn tick_period(&self) -> Duration {
		Duration::from_nanos((1e9 / self.tick_hz.max(1.0).min(MAX_TICK_HZ)) as u64)
	}
}

/// Camera settings.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputParams {
	pub device: i32,
	pub width: i32,
	pub height: i32,
	pub fps: i32,
}

impl Default for InputParams {
	fn default() -> Self {
		Self {
			device: 0,
			width: 640,
			height: 480,
			fps: 30,
		}
	}
}

/// Edge-map and contour parameters for the boundary detector.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoundaryParams {
	/// Multiplicative gain of the contrast stretch.
	pub contrast_gain: f64,
	pub contrast_offset: f64,
	pub canny_low: f64,
	pub canny_high: f64,
	pub canny_aperture: i32,
	/// Side of the square dilation kernel.
	pub dilate_kernel: i32,
	pub dilate_iterations: i32,
	/// Absolute contour area floor in pixels.
	pub min_area: f64,
	/// Fraction of the largest contour's area that forms the dynamic floor.
	pub area_fraction: f64,
	/// Douglas-Peucker tolerance as a fraction of the contour perimeter.
	pub epsilon_fraction: f64,
	pub shape: ShapeParams,
}

impl Default for BoundaryParams {
	fn default() -> Self {
		Self {
			contrast_gain: 1.5,
			contrast_offset: 0.0,
			canny_low: 50.0,
			canny_high: 150.0,
			canny_aperture: 3,
			dilate_kernel: 3,
			dilate_iterations: 2,
			min_area: 500.0,
			area_fraction: 0.5,
			epsilon_fraction: 0.01,
			shape: ShapeParams::default(),
		}
	}
}

/// Acceptance bounds for a four-vertex polygon.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShapeParams {
	pub min_side_ratio: f64,
	pub min_aspect: f64,
	pub max_aspect: f64,
	/// Interior angle bounds, degrees.
	pub min_angle: f64,
	pub max_angle: f64,
}

impl Default for ShapeParams {
	fn default() -> Self {
		Self {
			min_side_ratio: 0.9,
			min_aspect: 0.5,
			max_aspect: 2.0,
			min_angle: 70.0,
			max_angle: 110.0,
		}
	}
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct StabilityParams {
	/// How long a crop stays current after detection is lost.
	pub grace_ms: u64,
}

impl Default for StabilityParams {
	fn default() -> Self {
		Self { grace_ms: 1000 }
	}
}

/// ORB extractor settings, shared by reference and capture processing.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeatureParams {
	pub max_keypoints: i32,
	pub scale_factor: f32,
	pub levels: i32,
	pub edge_threshold: i32,
	pub fast_threshold: i32,
	pub patch_size: i32,
}

impl Default for FeatureParams {
	fn default() -> Self {
		Self {
			max_keypoints: 500,
			scale_factor: 1.2,
			levels: 8,
			edge_threshold: 31,
			fast_threshold: 20,
			patch_size: 31,
		}
	}
}

/// Adaptive good-match threshold: `max(min_threshold, min_distance_factor * min_distance)`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchParams {
	pub min_threshold: u32,
	pub min_distance_factor: f64,
}

impl Default for MatchParams {
	fn default() -> Self {
		Self {
			min_threshold: 30,
			min_distance_factor: 2.0,
		}
	}
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
	/// Directory reference image paths are resolved against.
	pub root: PathBuf,
	pub identities: Vec<IdentitySource>,
}

impl DatabaseConfig {
	/// Identity sources with image paths joined onto `root`.
	pub fn resolved_sources(&self) -> Vec<IdentitySource> {
		self.identities
			.iter()
			.map(|source| IdentitySource {
				images: source.images.iter().map(|image| self.root.join(image)).collect(),
				..source.clone()
			})
			.collect()
	}
}
