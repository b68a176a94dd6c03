//! Card boundary detection on a single frame.
//!
//! Edge map, largest external contour above a dynamic area floor, then a tight
//! polygon approximation that must come out as a near-rectangular quad.

use opencv::core::{Mat, Point as CvPoint, Vector};
use opencv::imgproc;
use opencv::prelude::*;
use tracing::trace;

use crate::config::BoundaryParams;
use crate::error::Result;
use crate::geometry::{Point, Quad};
use crate::modules::filter::ContourArea;
use crate::modules::threshold::CannyEdges;
use crate::modules::ThresholdModule;

pub struct BoundaryDetector {
	params: BoundaryParams,
	edges: CannyEdges,
	areas: ContourArea,
}

impl BoundaryDetector {
	pub fn new(params: &BoundaryParams) -> Result<Self> {
		Ok(Self {
			params: params.clone(),
			edges: CannyEdges::new(params)?,
			areas: ContourArea::new(params),
		})
	}

	/// The card boundary in `frame`, if one passes every check this cycle.
	pub fn detect(&self, frame: &Mat) -> Result<Option<Quad>> {
		if frame.empty() || frame.cols() <= 0 || frame.rows() <= 0 {
			return Ok(None);
		}

		let edges = self.edges.run(frame)?;
		let mut contours = Vector::<Vector<CvPoint>>::new();
		imgproc::find_contours(
			&edges,
			&mut contours,
			imgproc::RETR_EXTERNAL,
			imgproc::CHAIN_APPROX_SIMPLE,
			CvPoint::new(0, 0),
		)?;

		let areas = contours
			.iter()
			.map(|contour| imgproc::contour_area(&contour, false))
			.collect::<opencv::Result<Vec<f64>>>()?;
		let Some(best) = self.areas.select(&areas) else {
			trace!(contours = areas.len(), "no contour above area floor");
			return Ok(None);
		};

		let contour = contours.get(best)?;
		let perimeter = imgproc::arc_length(&contour, true)?;
		let mut polygon = Vector::<CvPoint>::new();
		imgproc::approx_poly_dp(&contour, &mut polygon, self.params.epsilon_fraction * perimeter, true)?;
		if polygon.len() != 4 {
			trace!(vertices = polygon.len(), "boundary is not a quad");
			return Ok(None);
		}

		let vertices: Vec<Point> = polygon
			.iter()
			.map(|p| Point::new(f64::from(p.x), f64::from(p.y)))
			.collect();
		let quad = Quad::from_polygon(&vertices, areas[best], &self.params.shape);
		if quad.is_none() {
			trace!(?vertices, "quad failed shape validation");
		}
		Ok(quad)
	}
}
