use std::path::Path;

use opencv::core::Mat;
use opencv::imgcodecs;
use opencv::prelude::*;

use crate::error::{Error, Result};
use crate::modules::FrameSource;

/// Serves the same image every tick until replaced.
#[derive(Default)]
pub struct StillInput {
	frame: Option<Mat>,
}

impl StillInput {
	pub fn new(frame: Mat) -> Self {
		Self { frame: Some(frame) }
	}

	pub fn from_file(path: &Path) -> Result<Self> {
		let filename = path.to_str().ok_or_else(|| Error::ImageLoad(path.to_path_buf()))?;
		let frame = imgcodecs::imread(filename, imgcodecs::IMREAD_COLOR)?;
		if frame.empty() {
			return Err(Error::ImageLoad(path.to_path_buf()));
		}
		Ok(Self::new(frame))
	}

	pub fn set(&mut self, frame: Option<Mat>) {
		self.frame = frame;
	}
}

impl FrameSource for StillInput {
	fn latest(&mut self) -> Result<Option<Mat>> {
		match &self.frame {
			Some(frame) => Ok(Some(frame.try_clone()?)),
			None => Ok(None),
		}
	}
}
