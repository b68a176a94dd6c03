use opencv::core::{self, Mat, Point, Size};
use opencv::imgproc;

use crate::config::BoundaryParams;
use crate::error::Result;
use crate::modules::threshold::grayscale;
use crate::modules::ThresholdModule;

/// Contrast-stretched, dilated Canny edge map.
pub struct CannyEdges {
	gain: f64,
	offset: f64,
	low: f64,
	high: f64,
	aperture: i32,
	iterations: i32,
	kernel: Mat,
}

impl CannyEdges {
	pub fn new(params: &BoundaryParams) -> Result<Self> {
		let kernel = imgproc::get_structuring_element(
			imgproc::MORPH_RECT,
			Size::new(params.dilate_kernel, params.dilate_kernel),
			Point::new(-1, -1),
		)?;
		Ok(Self {
			gain: params.contrast_gain,
			offset: params.contrast_offset,
			low: params.canny_low,
			high: params.canny_high,
			aperture: params.canny_aperture,
			iterations: params.dilate_iterations,
			kernel,
		})
	}
}

impl ThresholdModule for CannyEdges {
	fn run(&self, frame: &Mat) -> Result<Mat> {
		let gray = grayscale(frame)?;

		let mut stretched = Mat::default();
		core::convert_scale_abs(&gray, &mut stretched, self.gain, self.offset)?;

		let mut edges = Mat::default();
		imgproc::canny(&stretched, &mut edges, self.low, self.high, self.aperture, false)?;

		// Closes small gaps so the card outline traces as one contour.
		let mut dilated = Mat::default();
		imgproc::dilate(
			&edges,
			&mut dilated,
			&self.kernel,
			Point::new(-1, -1),
			self.iterations,
			core::BORDER_CONSTANT,
			imgproc::morphology_default_border_value()?,
		)?;
		Ok(dilated)
	}
}
