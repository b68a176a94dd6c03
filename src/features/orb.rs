use std::path::Path;

use opencv::core::{KeyPoint, Mat, Ptr, Vector};
use opencv::features2d::{ORB_ScoreType, ORB};
use opencv::imgcodecs;
use opencv::prelude::*;
use tracing::trace;

use crate::config::FeatureParams;
use crate::error::{Error, Result};
use crate::features::{Descriptor, FeatureSignature, Keypoint};
use crate::modules::threshold::grayscale;

/// The one place an ORB detector is constructed.
pub fn create_orb(params: &FeatureParams) -> Result<Ptr<ORB>> {
	let orb = ORB::create(
		params.max_keypoints,
		params.scale_factor,
		params.levels,
		params.edge_threshold,
		0,
		2,
		ORB_ScoreType::HARRIS_SCORE,
		params.patch_size,
		params.fast_threshold,
	)?;
	Ok(orb)
}

pub struct FeatureExtractor {
	orb: Ptr<ORB>,
}

impl FeatureExtractor {
	pub fn new(params: &FeatureParams) -> Result<Self> {
		Ok(Self {
			orb: create_orb(params)?,
		})
	}

	/// Signature of `image`. An image without any keypoints gives an empty signature.
	pub fn extract(&mut self, image: &Mat) -> Result<FeatureSignature> {
		if image.empty() {
			return Err(Error::EmptyFrame);
		}
		let gray = grayscale(image)?;

		let mut keypoints = Vector::<KeyPoint>::new();
		let mut descriptors = Mat::default();
		self.orb
			.detect_and_compute(&gray, &Mat::default(), &mut keypoints, &mut descriptors, false)?;

		let signature = to_signature(&keypoints, &descriptors)?;
		trace!(keypoints = signature.len(), "extracted features");
		Ok(signature)
	}
}

fn to_signature(keypoints: &Vector<KeyPoint>, descriptors: &Mat) -> Result<FeatureSignature> {
	let mut points = Vec::with_capacity(keypoints.len());
	let mut rows = Vec::with_capacity(keypoints.len());

	for (i, kp) in keypoints.iter().enumerate().take(descriptors.rows().max(0) as usize) {
		let row: Descriptor = match descriptors.at_row::<u8>(i as i32)?.try_into() {
			Ok(row) => row,
			Err(_) => continue,
		};
		let pt = kp.pt();
		points.push(Keypoint {
			x: pt.x,
			y: pt.y,
			size: kp.size(),
			angle: kp.angle(),
			response: kp.response(),
		});
		rows.push(row);
	}

	Ok(FeatureSignature::new(points, rows))
}

/// Loads a reference image from disk and extracts its signature.
///
/// Unreadable images and images without descriptors are errors here, unlike
/// captures, since an empty reference can never match.
pub fn load_signature(path: &Path, params: &FeatureParams) -> Result<FeatureSignature> {
	let filename = path.to_str().ok_or_else(|| Error::ImageLoad(path.to_path_buf()))?;
	let image = imgcodecs::imread(filename, imgcodecs::IMREAD_COLOR)?;
	if image.empty() {
		return Err(Error::ImageLoad(path.to_path_buf()));
	}

	let signature = FeatureExtractor::new(params)?.extract(&image)?;
	if signature.is_empty() {
		return Err(Error::NoFeatures(path.to_path_buf()));
	}
	Ok(signature)
}
