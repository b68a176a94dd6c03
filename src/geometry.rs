//! Quadrilateral validation and canonical corner ordering.

use itertools::Itertools;

use crate::config::ShapeParams;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(&self, other: &Point) -> f64 {
		(self.x - other.x).hypot(self.y - other.y)
	}
}

/// A validated card boundary, corners ordered top-left, top-right,
/// bottom-right, bottom-left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
	corners: [Point; 4],
	area: f64,
}

impl Quad {
	/// Validates a simplified contour polygon and orders its corners.
	///
	/// Returns `None` unless the polygon has exactly four vertices, passes
	/// [`check_shape`] and yields four distinct canonical corners.
	pub fn from_polygon(vertices: &[Point], area: f64, params: &ShapeParams) -> Option<Self> {
		let vertices: [Point; 4] = vertices.try_into().ok()?;
		if !check_shape(&vertices, params) {
			return None;
		}
		let corners = order_corners(&vertices)?;
		Some(Self { corners, area })
	}

	pub fn corners(&self) -> &[Point; 4] {
		&self.corners
	}

	pub fn top_left(&self) -> Point {
		self.corners[0]
	}

	pub fn top_right(&self) -> Point {
		self.corners[1]
	}

	pub fn bottom_right(&self) -> Point {
		self.corners[2]
	}

	pub fn bottom_left(&self) -> Point {
		self.corners[3]
	}

	/// Area enclosed by the source contour, in pixels.
	pub fn area(&self) -> f64 {
		self.area
	}
}

/// Near-rectangle test over four vertices given in contour order.
pub fn check_shape(vertices: &[Point; 4], params: &ShapeParams) -> bool {
	let sides = vertices
		.iter()
		.circular_tuple_windows()
		.map(|(a, b)| a.distance(b))
		.collect_vec();

	if sides.iter().any(|&side| side <= f64::EPSILON) {
		return false;
	}

	if side_ratio(sides[0], sides[2]) < params.min_side_ratio
		|| side_ratio(sides[1], sides[3]) < params.min_side_ratio
	{
		return false;
	}

	let aspect = (sides[0] + sides[2]) / (sides[1] + sides[3]);
	if aspect < params.min_aspect || aspect > params.max_aspect {
		return false;
	}

	(0..4).all(|i| {
		let angle = interior_angle(&vertices[(i + 3) % 4], &vertices[i], &vertices[(i + 1) % 4]);
		angle >= params.min_angle && angle <= params.max_angle
	})
}

fn side_ratio(a: f64, b: f64) -> f64 {
	a.min(b) / a.max(b)
}

/// Angle at `vertex` between the edges to `prev` and `next`, in degrees.
pub fn interior_angle(prev: &Point, vertex: &Point, next: &Point) -> f64 {
	let (ax, ay) = (prev.x - vertex.x, prev.y - vertex.y);
	let (bx, by) = (next.x - vertex.x, next.y - vertex.y);
	let norm = ax.hypot(ay) * bx.hypot(by);
	if norm <= f64::EPSILON {
		return 0.0;
	}
	((ax * bx + ay * by) / norm).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Orders corners as top-left (min x+y), top-right (max x-y),
/// bottom-right (max x+y), bottom-left (min x-y).
///
/// Returns `None` when two roles land on the same vertex, which happens for
/// quads rotated close to 45 degrees.
pub fn order_corners(vertices: &[Point; 4]) -> Option<[Point; 4]> {
	let sum = |p: &Point| p.x + p.y;
	let diff = |p: &Point| p.x - p.y;

	let tl = vertices.iter().map(sum).position_min_by(f64::total_cmp)?;
	let tr = vertices.iter().map(diff).position_max_by(f64::total_cmp)?;
	let br = vertices.iter().map(sum).position_max_by(f64::total_cmp)?;
	let bl = vertices.iter().map(diff).position_min_by(f64::total_cmp)?;

	let picked = [tl, tr, br, bl];
	if !picked.iter().all_unique() {
		return None;
	}
	Some(picked.map(|i| vertices[i]))
}

/// Integer pixel rectangle inside a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
	pub x: i32,
	pub y: i32,
	pub width: i32,
	pub height: i32,
}

impl Region {
	/// Bounding box of `quad`, clamped to a `frame_width` x `frame_height` frame.
	/// `None` if nothing of the box lies inside the frame.
	pub fn bounding(quad: &Quad, frame_width: i32, frame_height: i32) -> Option<Self> {
		let corners = quad.corners();
		let (min_x, max_x) = corners
			.iter()
			.map(|p| p.x)
			.minmax_by(f64::total_cmp)
			.into_option()?;
		let (min_y, max_y) = corners
			.iter()
			.map(|p| p.y)
			.minmax_by(f64::total_cmp)
			.into_option()?;

		let x0 = (min_x.floor() as i32).clamp(0, frame_width);
		let y0 = (min_y.floor() as i32).clamp(0, frame_height);
		let x1 = (max_x.ceil() as i32).clamp(0, frame_width);
		let y1 = (max_y.ceil() as i32).clamp(0, frame_height);

		if x1 <= x0 || y1 <= y0 {
			return None;
		}
		Some(Self {
			x: x0,
			y: y0,
			width: x1 - x0,
			height: y1 - y0,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;
	use proptest::prelude::*;

	fn square() -> [Point; 4] {
		[
			Point::new(100.0, 100.0),
			Point::new(300.0, 100.0),
			Point::new(300.0, 300.0),
			Point::new(100.0, 300.0),
		]
	}

	fn rotated_rect(cx: f64, cy: f64, w: f64, h: f64, degrees: f64) -> [Point; 4] {
		let (s, c) = degrees.to_radians().sin_cos();
		[(-w, -h), (w, -h), (w, h), (-w, h)].map(|(dx, dy)| {
			let (dx, dy) = (dx / 2.0, dy / 2.0);
			Point::new(cx + dx * c - dy * s, cy + dx * s + dy * c)
		})
	}

	#[test]
	fn square_passes_and_orders_top_left_first() {
		let params = ShapeParams::default();
		let mut shuffled = square();
		shuffled.rotate_left(2);

		assert!(check_shape(&shuffled, &params));
		let quad = Quad::from_polygon(&shuffled, 40_000.0, &params).unwrap();
		assert_eq!(quad.top_left(), Point::new(100.0, 100.0));
		assert_eq!(quad.top_right(), Point::new(300.0, 100.0));
		assert_eq!(quad.bottom_right(), Point::new(300.0, 300.0));
		assert_eq!(quad.bottom_left(), Point::new(100.0, 300.0));
		assert_relative_eq!(quad.area(), 40_000.0);
	}

	#[test]
	fn right_angles_measure_ninety() {
		let [a, b, c, _] = square();
		assert_relative_eq!(interior_angle(&a, &b, &c), 90.0, epsilon = 1e-9);
	}

	#[test]
	fn wrong_vertex_count_rejected() {
		let params = ShapeParams::default();
		let triangle = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(5.0, 9.0)];
		assert!(Quad::from_polygon(&triangle, 45.0, &params).is_none());

		let mut pentagon = square().to_vec();
		pentagon.push(Point::new(200.0, 50.0));
		assert!(Quad::from_polygon(&pentagon, 45_000.0, &params).is_none());
	}

	#[test]
	fn trapezoid_rejected_by_side_ratio() {
		let trapezoid = [
			Point::new(130.0, 100.0),
			Point::new(270.0, 100.0),
			Point::new(300.0, 300.0),
			Point::new(100.0, 300.0),
		];
		assert!(!check_shape(&trapezoid, &ShapeParams::default()));
	}

	#[test]
	fn elongated_rectangle_rejected_by_aspect() {
		let strip = rotated_rect(300.0, 300.0, 500.0, 200.0, 0.0);
		assert!(!check_shape(&strip, &ShapeParams::default()));
		assert!(check_shape(&rotated_rect(300.0, 300.0, 380.0, 200.0, 0.0), &ShapeParams::default()));
	}

	#[test]
	fn sheared_parallelogram_rejected_by_angle() {
		// 200x200 parallelogram sheared so its corners sit at 63 and 117 degrees.
		let shear = 100.0;
		let sheared = [
			Point::new(100.0 + shear, 100.0),
			Point::new(300.0 + shear, 100.0),
			Point::new(300.0, 300.0),
			Point::new(100.0, 300.0),
		];
		assert!(!check_shape(&sheared, &ShapeParams::default()));
	}

	#[test]
	fn degenerate_side_rejected() {
		let collapsed = [
			Point::new(0.0, 0.0),
			Point::new(0.0, 0.0),
			Point::new(10.0, 10.0),
			Point::new(0.0, 10.0),
		];
		assert!(!check_shape(&collapsed, &ShapeParams::default()));
	}

	#[test]
	fn diamond_has_ambiguous_corners() {
		let diamond = [
			Point::new(200.0, 100.0),
			Point::new(300.0, 200.0),
			Point::new(200.0, 300.0),
			Point::new(100.0, 200.0),
		];
		assert!(check_shape(&diamond, &ShapeParams::default()));
		assert!(order_corners(&diamond).is_none());
	}

	#[test]
	fn region_is_clamped_to_frame() {
		let corners = [
			Point::new(-20.5, 10.2),
			Point::new(150.0, 10.2),
			Point::new(150.0, 130.7),
			Point::new(-20.5, 130.7),
		];
		let quad = Quad::from_polygon(&corners, 1.0, &ShapeParams::default()).unwrap();

		let region = Region::bounding(&quad, 120, 100).unwrap();
		assert_eq!(region, Region { x: 0, y: 10, width: 120, height: 90 });
	}

	#[test]
	fn region_outside_frame_is_none() {
		let quad = Quad::from_polygon(&square(), 1.0, &ShapeParams::default()).unwrap();
		assert!(Region::bounding(&quad, 50, 50).is_none());
	}

	proptest! {
		#[test]
		fn skewed_side_pairs_rejected(ratio in 0.2f64..0.89, top in prop::bool::ANY) {
			// Rectangle whose top (or left) edge is shortened around its midpoint.
			let (w, h) = (200.0, 160.0);
			let inset = w * (1.0 - ratio) / 2.0;
			let polygon = if top {
				[
					Point::new(inset, 0.0),
					Point::new(w - inset, 0.0),
					Point::new(w, h),
					Point::new(0.0, h),
				]
			} else {
				let inset = h * (1.0 - ratio) / 2.0;
				[
					Point::new(0.0, inset),
					Point::new(w, 0.0),
					Point::new(w, h),
					Point::new(0.0, h - inset),
				]
			};
			prop_assert!(!check_shape(&polygon, &ShapeParams::default()));
		}

		#[test]
		fn out_of_range_angle_rejected(offset in 40.0f64..150.0) {
			// Equal opposite sides but corners far from square.
			let h = 150.0;
			let polygon = [
				Point::new(offset, 0.0),
				Point::new(200.0 + offset, 0.0),
				Point::new(200.0, h),
				Point::new(0.0, h),
			];
			let angle = interior_angle(&polygon[3], &polygon[0], &polygon[1]);
			prop_assume!(angle < 70.0 || angle > 110.0);
			prop_assert!(!check_shape(&polygon, &ShapeParams::default()));
		}

		#[test]
		fn ordering_is_idempotent(
			cx in 200.0f64..400.0,
			cy in 200.0f64..400.0,
			w in 80.0f64..200.0,
			h in 80.0f64..200.0,
			degrees in -30.0f64..30.0,
			start in 0usize..4,
		) {
			let mut polygon = rotated_rect(cx, cy, w, h, degrees);
			polygon.rotate_left(start);

			let once = order_corners(&polygon).unwrap();
			let twice = order_corners(&once).unwrap();
			prop_assert_eq!(once, twice);
		}

		#[test]
		fn near_rectangles_survive_validation(
			w in 110.0f64..190.0,
			h in 110.0f64..190.0,
			degrees in -15.0f64..15.0,
		) {
			let polygon = rotated_rect(320.0, 240.0, w, h, degrees);
			let quad = Quad::from_polygon(&polygon, w * h, &ShapeParams::default());
			prop_assert!(quad.is_some());
			let quad = quad.unwrap();
			let tl = quad.top_left();
			prop_assert!(quad.corners().iter().all(|p| tl.x + tl.y <= p.x + p.y));
		}
	}
}
