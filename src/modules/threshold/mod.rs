mod edges;

pub use edges::CannyEdges;

use opencv::core::Mat;
use opencv::imgproc;
use opencv::prelude::*;

use crate::error::Result;

/// Single-channel intensity image of a BGR, BGRA or already-gray frame.
pub fn grayscale(frame: &Mat) -> Result<Mat> {
	let code = match frame.channels() {
		1 => return Ok(frame.try_clone()?),
		4 => imgproc::COLOR_BGRA2GRAY,
		_ => imgproc::COLOR_BGR2GRAY,
	};
	let mut gray = Mat::default();
	imgproc::cvt_color_def(frame, &mut gray, code)?;
	Ok(gray)
}
