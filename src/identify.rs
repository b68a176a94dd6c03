//! Ranks reference identities against a captured signature.
//!
//! Every capture descriptor is matched to its nearest reference descriptor by
//! Hamming distance. Matches closer than an adaptive threshold, derived from the
//! closest match of that reference image, count as good. An identity scores the
//! good-match count of its best reference image.

use itertools::Itertools;
use tracing::debug;

use crate::candidates::Candidate;
use crate::config::MatchParams;
use crate::database::ReferenceDatabase;
use crate::features::{hamming, FeatureSignature};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identification {
	/// The database has no identities to rank against.
	NotReady,
	/// Identities ordered by descending score.
	Ranked(Vec<Candidate>),
}

impl Identification {
	pub fn candidates(&self) -> &[Candidate] {
		match self {
			Identification::NotReady => &[],
			Identification::Ranked(candidates) => candidates,
		}
	}

	pub fn is_ready(&self) -> bool {
		matches!(self, Identification::Ranked(_))
	}
}

/// Distance of the best match in `reference` for every descriptor of `capture`.
pub fn best_match_distances(capture: &FeatureSignature, reference: &FeatureSignature) -> Vec<u32> {
	if reference.is_empty() {
		return Vec::new();
	}
	capture
		.descriptors()
		.iter()
		.filter_map(|query| reference.descriptors().iter().map(|train| hamming(query, train)).min())
		.collect()
}

/// Number of good matches between a capture and one reference image.
pub fn good_matches(capture: &FeatureSignature, reference: &FeatureSignature, params: &MatchParams) -> usize {
	let distances = best_match_distances(capture, reference);
	let Some(&min_distance) = distances.iter().min() else {
		return 0;
	};
	let threshold = f64::from(params.min_threshold).max(params.min_distance_factor * f64::from(min_distance));
	distances.iter().filter(|&&d| f64::from(d) < threshold).count()
}

/// Best good-match count over all reference images of one identity.
pub fn identity_score(capture: &FeatureSignature, references: &[FeatureSignature], params: &MatchParams) -> usize {
	references
		.iter()
		.map(|reference| good_matches(capture, reference, params))
		.max()
		.unwrap_or(0)
}

pub fn identify(database: &ReferenceDatabase, capture: &FeatureSignature, params: &MatchParams) -> Identification {
	if !database.is_ready() {
		return Identification::NotReady;
	}

	let ranked = database
		.identities()
		.iter()
		.map(|identity| Candidate {
			display_name: identity.display_name.clone(),
			score: identity_score(capture, &identity.signatures, params),
		})
		.sorted_by(|a, b| b.score.cmp(&a.score))
		.collect_vec();

	debug!(
		capture_keypoints = capture.len(),
		best = ranked.first().map(|c| c.display_name.as_str()),
		best_score = ranked.first().map(|c| c.score),
		"identification ranked"
	);
	Identification::Ranked(ranked)
}
