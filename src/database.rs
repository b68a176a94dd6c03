//! Reference signatures for every known card.
//!
//! The database is built once: every reference image is loaded and extracted
//! on its own blocking task, and the build only completes after all of them
//! have settled, panicked tasks included. Images that fail are skipped and reported; identities left
//! without any signature are dropped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tokio::task::{self, JoinSet};
use tracing::{info, warn};

use crate::error::Result;
use crate::features::FeatureSignature;

/// One identity and the images it is recognised from.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct IdentitySource {
	pub id: String,
	#[serde(default)]
	pub display_name: Option<String>,
	#[serde(default)]
	pub images: Vec<PathBuf>,
}

impl IdentitySource {
	pub fn new(id: impl Into<String>, images: Vec<PathBuf>) -> Self {
		Self {
			id: id.into(),
			display_name: None,
			images,
		}
	}

	/// The configured display name, or the id with separators turned into
	/// spaces and each word capitalised.
	pub fn resolved_display_name(&self) -> String {
		if let Some(name) = &self.display_name {
			return name.clone();
		}
		self.id
			.split(|c| c == '_' || c == '-')
			.filter(|word| !word.is_empty())
			.map(|word| {
				let mut chars = word.chars();
				match chars.next() {
					Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
					None => String::new(),
				}
			})
			.collect::<Vec<_>>()
			.join(" ")
	}
}

#[derive(Clone, Debug)]
pub struct ReferenceIdentity {
	pub id: String,
	pub display_name: String,
	pub signatures: Vec<FeatureSignature>,
}

/// Read-only after construction.
#[derive(Clone, Debug, Default)]
pub struct ReferenceDatabase {
	identities: Vec<ReferenceIdentity>,
}

impl ReferenceDatabase {
	pub fn from_identities(identities: Vec<ReferenceIdentity>) -> Self {
		Self {
			identities: identities
				.into_iter()
				.filter(|identity| !identity.signatures.is_empty())
				.collect(),
		}
	}

	pub fn is_ready(&self) -> bool {
		!self.identities.is_empty()
	}

	pub fn identities(&self) -> &[ReferenceIdentity] {
		&self.identities
	}

	pub fn len(&self) -> usize {
		self.identities.len()
	}

	pub fn is_empty(&self) -> bool {
		self.identities.is_empty()
	}

	pub fn get(&self, id: &str) -> Option<&ReferenceIdentity> {
		self.identities.iter().find(|identity| identity.id == id)
	}
}

#[derive(Debug)]
pub struct AssetFailure {
	pub identity: String,
	pub path: PathBuf,
	pub reason: String,
}

#[derive(Debug, Default)]
pub struct BuildReport {
	/// Identities with at least one usable image.
	pub success_count: usize,
	/// Identities attempted.
	pub total_count: usize,
	pub images_loaded: usize,
	pub images_failed: usize,
	pub failures: Vec<AssetFailure>,
}

impl BuildReport {
	pub fn success_ratio(&self) -> f64 {
		if self.total_count == 0 {
			return 0.0;
		}
		self.success_count as f64 / self.total_count as f64
	}
}

/// Builds the database, extracting every image with `extract` on the blocking pool.
pub async fn build<F>(sources: Vec<IdentitySource>, extract: F) -> (ReferenceDatabase, BuildReport)
where
	F: Fn(&Path) -> Result<FeatureSignature> + Send + Sync + 'static,
{
	let extract = Arc::new(extract);
	let mut tasks = JoinSet::new();
	let mut pending: HashMap<task::Id, (usize, usize, PathBuf)> = HashMap::new();

	for (identity_idx, source) in sources.iter().enumerate() {
		for (image_idx, path) in source.images.iter().enumerate() {
			let extract = Arc::clone(&extract);
			let task_path = path.clone();
			let handle = tasks.spawn_blocking(move || (*extract)(&task_path));
			pending.insert(handle.id(), (identity_idx, image_idx, path.clone()));
		}
	}

	let mut slots: Vec<Vec<Option<FeatureSignature>>> =
		sources.iter().map(|source| vec![None; source.images.len()]).collect();
	let mut report = BuildReport {
		total_count: sources.len(),
		..BuildReport::default()
	};

	while let Some(joined) = tasks.join_next_with_id().await {
		let (id, outcome) = match joined {
			Ok((id, outcome)) => (id, outcome.map_err(|err| err.to_string())),
			// A panicking extractor only loses its own image.
			Err(err) => (err.id(), Err(err.to_string())),
		};
		let Some((identity_idx, image_idx, path)) = pending.remove(&id) else {
			continue;
		};
		match outcome {
			Ok(signature) => {
				slots[identity_idx][image_idx] = Some(signature);
				report.images_loaded += 1;
			}
			Err(reason) => {
				let identity = &sources[identity_idx].id;
				warn!(%identity, path = %path.display(), error = %reason, "skipping reference image");
				report.images_failed += 1;
				report.failures.push(AssetFailure {
					identity: identity.clone(),
					path,
					reason,
				});
			}
		}
	}

	let identities = sources
		.iter()
		.zip(slots)
		.filter_map(|(source, slots)| {
			let signatures: Vec<_> = slots.into_iter().flatten().collect();
			if signatures.is_empty() {
				warn!(identity = %source.id, "no usable reference images, identity omitted");
				return None;
			}
			Some(ReferenceIdentity {
				id: source.id.clone(),
				display_name: source.resolved_display_name(),
				signatures,
			})
		})
		.collect();

	let database = ReferenceDatabase::from_identities(identities);
	report.success_count = database.len();
	info!(
		identities = report.success_count,
		attempted = report.total_count,
		images_loaded = report.images_loaded,
		images_failed = report.images_failed,
		"reference database built"
	);
	(database, report)
}
