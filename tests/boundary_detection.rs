#![cfg(feature = "opencv")]

mod common;

use cardvision::config::BoundaryParams;
use cardvision::{BoundaryDetector, Point};
use opencv::core::{Mat, Rect};

use common::*;

fn detector() -> BoundaryDetector {
	BoundaryDetector::new(&BoundaryParams::default()).unwrap()
}

fn near(actual: Point, x: f64, y: f64, tolerance: f64) -> bool {
	(actual.x - x).abs() <= tolerance && (actual.y - y).abs() <= tolerance
}

#[test]
fn blank_frame_has_no_boundary() {
	assert!(detector().detect(&blank_frame()).unwrap().is_none());
}

#[test]
fn empty_frame_is_tolerated() {
	assert!(detector().detect(&Mat::default()).unwrap().is_none());
}

#[test]
fn upright_card_is_found_and_ordered() {
	let frame = card_frame(Rect::new(200, 100, 200, 280));
	let quad = detector().detect(&frame).unwrap().expect("card boundary");

	assert!(near(quad.top_left(), 200.0, 100.0, 6.0), "{:?}", quad.top_left());
	assert!(near(quad.top_right(), 400.0, 100.0, 6.0), "{:?}", quad.top_right());
	assert!(near(quad.bottom_right(), 400.0, 380.0, 6.0), "{:?}", quad.bottom_right());
	assert!(near(quad.bottom_left(), 200.0, 380.0, 6.0), "{:?}", quad.bottom_left());
	assert!(quad.area() > 200.0 * 280.0 * 0.9);
}

#[test]
fn textured_card_still_traces_its_outline() {
	let frame = textured_card_frame(Rect::new(180, 90, 220, 300), 3);
	let quad = detector().detect(&frame).unwrap().expect("card boundary");
	assert!(near(quad.top_left(), 180.0, 90.0, 6.0), "{:?}", quad.top_left());
}

#[test]
fn frame_filling_card_is_not_rejected_by_floor() {
	let frame = card_frame(Rect::new(40, 30, 560, 420));
	let quad = detector().detect(&frame).unwrap().expect("card boundary");
	assert!(quad.area() > 560.0 * 420.0 * 0.9);
}

#[test]
fn tilted_card_is_found() {
	// Roughly 10 degrees of rotation.
	let frame = polygon_frame(&[(230, 90), (420, 123), (375, 379), (185, 346)]);
	let quad = detector().detect(&frame).unwrap().expect("card boundary");
	assert!(near(quad.top_left(), 230.0, 90.0, 8.0), "{:?}", quad.top_left());
	assert!(near(quad.bottom_right(), 375.0, 379.0, 8.0), "{:?}", quad.bottom_right());
}

#[test]
fn trapezoid_is_rejected() {
	let frame = polygon_frame(&[(260, 100), (380, 100), (440, 380), (200, 380)]);
	assert!(detector().detect(&frame).unwrap().is_none());
}

#[test]
fn tiny_card_is_below_area_floor() {
	let frame = card_frame(Rect::new(300, 200, 12, 16));
	assert!(detector().detect(&frame).unwrap().is_none());
}

#[test]
fn round_object_is_not_a_quad() {
	let mut frame = blank_frame();
	opencv::imgproc::circle(
		&mut frame,
		opencv::core::Point::new(320, 240),
		120,
		opencv::core::Scalar::all(230.0),
		opencv::imgproc::FILLED,
		opencv::imgproc::LINE_8,
		0,
	)
	.unwrap();
	assert!(detector().detect(&frame).unwrap().is_none());
}
