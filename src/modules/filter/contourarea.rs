use crate::config::BoundaryParams;

/// Picks the card candidate among a frame's contours.
///
/// The floor scales with the largest contour so a card filling the frame is
/// judged against its own size rather than a fixed pixel count.
pub struct ContourArea {
	min: f64,
	fraction: f64,
}

impl ContourArea {
	pub fn new(params: &BoundaryParams) -> Self {
		Self {
			min: params.min_area,
			fraction: params.area_fraction,
		}
	}

	pub fn floor(&self, largest: f64) -> f64 {
		self.min.max(self.fraction * largest)
	}

	/// Index of the largest contour meeting the floor.
	pub fn select(&self, areas: &[f64]) -> Option<usize> {
		let largest = areas.iter().copied().fold(0.0, f64::max);
		let floor = self.floor(largest);
		areas
			.iter()
			.enumerate()
			.filter(|&(_, &area)| area >= floor)
			.max_by(|(_, a), (_, b)| a.total_cmp(b))
			.map(|(i, _)| i)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn filter() -> ContourArea {
		ContourArea::new(&BoundaryParams::default())
	}

	#[test]
	fn floor_follows_largest_contour() {
		assert_eq!(filter().floor(200.0), 500.0);
		assert_eq!(filter().floor(1000.0), 500.0);
		assert_eq!(filter().floor(250_000.0), 125_000.0);
	}

	#[test]
	fn largest_contour_above_floor_wins() {
		assert_eq!(filter().select(&[800.0, 240_000.0, 130_000.0]), Some(1));
	}

	#[test]
	fn small_contours_only_select_nothing() {
		assert_eq!(filter().select(&[12.0, 499.0, 80.0]), None);
		assert_eq!(filter().select(&[]), None);
	}
}
