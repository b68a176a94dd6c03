use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
	pub display_name: String,
	/// Good-match count of the identity's best reference image.
	pub score: usize,
}

/// Display names the user has rejected this session.
#[derive(Clone, Debug, Default)]
pub struct ExclusionSet {
	names: HashSet<String>,
}

impl ExclusionSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns `false` if the name was already excluded.
	pub fn exclude(&mut self, display_name: impl Into<String>) -> bool {
		self.names.insert(display_name.into())
	}

	pub fn contains(&self, display_name: &str) -> bool {
		self.names.contains(display_name)
	}

	pub fn len(&self) -> usize {
		self.names.len()
	}

	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}

	pub fn clear(&mut self) {
		self.names.clear();
	}
}

/// Drops excluded candidates, keeping the ranking order of the rest.
pub fn filter_candidates(ranked: &[Candidate], exclusions: &ExclusionSet) -> Vec<Candidate> {
	ranked
		.iter()
		.filter(|candidate| !exclusions.contains(&candidate.display_name))
		.cloned()
		.collect()
}
