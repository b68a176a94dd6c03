use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	#[cfg(feature = "opencv")]
	#[error("opencv: {0}")]
	OpenCv(#[from] opencv::Error),

	#[error("failed to read {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid configuration: {0}")]
	Config(#[from] toml::de::Error),

	#[error("invalid setting {key}: {reason}")]
	Setting { key: &'static str, reason: String },

	#[error("could not load image {0}")]
	ImageLoad(PathBuf),

	#[error("no features extracted from {0}")]
	NoFeatures(PathBuf),

	#[error("frame is empty")]
	EmptyFrame,

	#[error("camera {0} could not be opened")]
	CameraUnavailable(i32),

	#[error("an identification is already running")]
	AnalysisInFlight,

	#[error("no crop or frame available to capture")]
	NoCaptureImage,

	#[error("unknown command: {0}")]
	Command(String),
}
