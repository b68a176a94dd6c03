use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};
use tracing::info;

use crate::config::InputParams;
use crate::error::{Error, Result};
use crate::modules::FrameSource;

pub struct CameraInput {
	cap: VideoCapture,
}

impl CameraInput {
	pub fn open(settings: &InputParams) -> Result<Self> {
		let mut cap = VideoCapture::new(settings.device, videoio::CAP_ANY)?;
		if !cap.is_opened()? {
			return Err(Error::CameraUnavailable(settings.device));
		}
		cap.set(videoio::CAP_PROP_FRAME_WIDTH, f64::from(settings.width))?;
		cap.set(videoio::CAP_PROP_FRAME_HEIGHT, f64::from(settings.height))?;
		cap.set(videoio::CAP_PROP_FPS, f64::from(settings.fps))?;
		info!(
			device = settings.device,
			width = settings.width,
			height = settings.height,
			"camera opened"
		);
		Ok(Self { cap })
	}
}

impl FrameSource for CameraInput {
	fn latest(&mut self) -> Result<Option<Mat>> {
		let mut frame = Mat::default();
		if !self.cap.read(&mut frame)? || frame.empty() {
			return Ok(None);
		}
		Ok(Some(frame))
	}
}
