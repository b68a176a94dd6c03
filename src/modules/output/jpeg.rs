use std::io::Write;

use opencv::core::{Mat, Point, Scalar, Vector};
use opencv::imgcodecs;
use opencv::imgproc;
use opencv::prelude::*;

use crate::error::{Error, Result};
use crate::geometry::Quad;
use crate::modules::OutputModule;

/// Writes annotated frames as a raw MJPEG stream.
pub struct JpegOutput<W: Write> {
	writer: W,
	params: Vector<i32>,
}

impl<W: Write> JpegOutput<W> {
	pub fn new(writer: W) -> Self {
		Self {
			writer,
			params: Vector::new(),
		}
	}

	pub fn into_inner(self) -> W {
		self.writer
	}
}

impl<W: Write> OutputModule for JpegOutput<W> {
	fn publish(&mut self, frame: &Mat, quad: Option<&Quad>) -> Result<()> {
		let mut annotated = frame.try_clone()?;
		if let Some(quad) = quad {
			draw_quad(&mut annotated, quad)?;
		}

		let mut jpeg = Vector::<u8>::new();
		imgcodecs::imencode(".jpg", &annotated, &mut jpeg, &self.params)?;

		let io_err = |source| Error::Io {
			path: "<output>".into(),
			source,
		};
		self.writer.write_all(jpeg.as_slice()).map_err(io_err)?;
		self.writer.flush().map_err(io_err)
	}
}

/// Card outline in green, top-left corner marked in red.
pub fn draw_quad(frame: &mut Mat, quad: &Quad) -> Result<()> {
	let outline: Vector<Point> = quad
		.corners()
		.iter()
		.map(|p| Point::new(p.x.round() as i32, p.y.round() as i32))
		.collect();
	let top_left = outline.get(0)?;

	let mut polygons = Vector::<Vector<Point>>::new();
	polygons.push(outline);
	imgproc::polylines(frame, &polygons, true, Scalar::new(0., 255., 0., 0.), 2, imgproc::LINE_8, 0)?;
	imgproc::circle(frame, top_left, 6, Scalar::new(0., 0., 255., 0.), imgproc::FILLED, imgproc::LINE_8, 0)?;
	Ok(())
}
