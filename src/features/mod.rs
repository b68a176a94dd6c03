//! Binary feature signatures and their Hamming distance.

#[cfg(feature = "opencv")]
mod orb;

#[cfg(feature = "opencv")]
pub use orb::{create_orb, load_signature, FeatureExtractor};

/// Bytes per ORB descriptor (256 bits).
pub const DESCRIPTOR_BYTES: usize = 32;

pub type Descriptor = [u8; DESCRIPTOR_BYTES];

pub fn hamming(a: &Descriptor, b: &Descriptor) -> u32 {
	a.iter().zip(b.iter()).map(|(x, y)| (x ^ y).count_ones()).sum()
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Keypoint {
	pub x: f32,
	pub y: f32,
	pub size: f32,
	pub angle: f32,
	pub response: f32,
}

/// Keypoints of one image and the descriptor computed at each of them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureSignature {
	keypoints: Vec<Keypoint>,
	descriptors: Vec<Descriptor>,
}

impl FeatureSignature {
	/// Pairs keypoints with descriptors; extra entries on either side are dropped.
	pub fn new(mut keypoints: Vec<Keypoint>, mut descriptors: Vec<Descriptor>) -> Self {
		let len = keypoints.len().min(descriptors.len());
		keypoints.truncate(len);
		descriptors.truncate(len);
		Self {
			keypoints,
			descriptors,
		}
	}

	/// Signature with placeholder keypoint geometry, for descriptor-only callers.
	pub fn from_descriptors(descriptors: Vec<Descriptor>) -> Self {
		Self {
			keypoints: vec![Keypoint::default(); descriptors.len()],
			descriptors,
		}
	}

	pub fn keypoints(&self) -> &[Keypoint] {
		&self.keypoints
	}

	pub fn descriptors(&self) -> &[Descriptor] {
		&self.descriptors
	}

	pub fn len(&self) -> usize {
		self.descriptors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.descriptors.is_empty()
	}
}
