pub mod filter;
#[cfg(feature = "opencv")]
pub mod input;
#[cfg(feature = "opencv")]
pub mod output;
#[cfg(feature = "opencv")]
pub mod threshold;

#[cfg(feature = "opencv")]
use opencv::core::Mat;

#[cfg(feature = "opencv")]
use crate::error::Result;
#[cfg(feature = "opencv")]
use crate::geometry::Quad;

/// Pull-based access to the newest frame. `Ok(None)` when no frame is available yet.
#[cfg(feature = "opencv")]
pub trait FrameSource {
	fn latest(&mut self) -> Result<Option<Mat>>;
}

#[cfg(feature = "opencv")]
impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
	fn latest(&mut self) -> Result<Option<Mat>> {
		(**self).latest()
	}
}

/// Edge map producer feeding contour extraction.
#[cfg(feature = "opencv")]
pub trait ThresholdModule {
	fn run(&self, frame: &Mat) -> Result<Mat>;
}

/// Display surface for annotated frames.
#[cfg(feature = "opencv")]
pub trait OutputModule {
	fn publish(&mut self, frame: &Mat, quad: Option<&Quad>) -> Result<()>;
}
