#![allow(dead_code)]

use opencv::core::{Mat, Point, Rect, Scalar, Vector, CV_8UC3};
use opencv::imgproc;
use opencv::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const WIDTH: i32 = 640;
pub const HEIGHT: i32 = 480;

/// Flat dark background with no edges.
pub fn blank_frame() -> Mat {
	Mat::new_rows_cols_with_default(HEIGHT, WIDTH, CV_8UC3, Scalar::all(30.0)).unwrap()
}

/// Light axis-aligned card on the dark background.
pub fn card_frame(card: Rect) -> Mat {
	let mut frame = blank_frame();
	imgproc::rectangle(&mut frame, card, Scalar::all(230.0), imgproc::FILLED, imgproc::LINE_8, 0).unwrap();
	frame
}

/// Light convex polygon on the dark background.
pub fn polygon_frame(corners: &[(i32, i32)]) -> Mat {
	let mut frame = blank_frame();
	let points: Vector<Point> = corners.iter().map(|&(x, y)| Point::new(x, y)).collect();
	imgproc::fill_convex_poly(&mut frame, &points, Scalar::all(230.0), imgproc::LINE_8, 0).unwrap();
	frame
}

/// Scatters seeded dark blocks inside `area`, giving ORB corners to find.
pub fn texture(frame: &mut Mat, area: Rect, seed: u64) {
	let mut rng = StdRng::seed_from_u64(seed);
	for _ in 0..120 {
		let w = rng.gen_range(6..30);
		let h = rng.gen_range(6..30);
		let x = rng.gen_range(area.x..area.x + area.width - w);
		let y = rng.gen_range(area.y..area.y + area.height - h);
		let shade = f64::from(rng.gen_range(0..180));
		imgproc::rectangle(
			frame,
			Rect::new(x, y, w, h),
			Scalar::all(shade),
			imgproc::FILLED,
			imgproc::LINE_8,
			0,
		)
		.unwrap();
	}
}

/// A textured card, the texture kept clear of the card border.
pub fn textured_card_frame(card: Rect, seed: u64) -> Mat {
	let mut frame = card_frame(card);
	let inset = Rect::new(card.x + 15, card.y + 15, card.width - 30, card.height - 30);
	texture(&mut frame, inset, seed);
	frame
}
