//! Session controller tying detection, tracking and identification together.
//!
//! [`Pipeline::tick`] runs once per display refresh. A capture is split in two:
//! [`Pipeline::begin_capture`] snapshots the image into an [`IdentifyJob`] that
//! can run on another thread, and [`Pipeline::finish_capture`] stores its
//! result. Only one job may exist at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use opencv::core::{Mat, Rect};
use opencv::prelude::*;
use tracing::{debug, info, warn};

use crate::boundary::BoundaryDetector;
use crate::candidates::{filter_candidates, Candidate, ExclusionSet};
use crate::config::{Config, FeatureParams, MatchParams};
use crate::database::ReferenceDatabase;
use crate::error::{Error, Result};
use crate::features::{create_orb, FeatureExtractor};
use crate::geometry::{Quad, Region};
use crate::identify::{identify, Identification};
use crate::modules::FrameSource;
use crate::stability::{StabilityTracker, TrackerEvent};

/// The card region cut out of the frame it was detected in.
pub struct Crop {
	pub region: Region,
	pub image: Mat,
}

impl Crop {
	pub fn from_frame(frame: &Mat, quad: &Quad) -> Result<Option<Self>> {
		let Some(region) = Region::bounding(quad, frame.cols(), frame.rows()) else {
			return Ok(None);
		};
		let roi = Mat::roi(frame, Rect::new(region.x, region.y, region.width, region.height))?;
		Ok(Some(Self {
			region,
			image: roi.try_clone()?,
		}))
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
	pub quad: Option<Quad>,
	pub event: TrackerEvent,
	pub consecutive_detections: u32,
}

/// Snapshot of everything the surrounding UI shows.
#[derive(Clone, Debug, PartialEq)]
pub struct Status {
	pub vision_ready: bool,
	pub database_ready: bool,
	pub is_analyzing: bool,
	pub quad: Option<Quad>,
	pub candidates: Vec<Candidate>,
	pub crop_available: bool,
}

/// Holds the shared analyzing flag for as long as it lives.
pub struct AnalysisGuard {
	flag: Arc<AtomicBool>,
}

impl AnalysisGuard {
	fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
		flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
			.ok()
			.map(|_| Self { flag: Arc::clone(flag) })
	}
}

impl Drop for AnalysisGuard {
	fn drop(&mut self) {
		self.flag.store(false, Ordering::Release);
	}
}

/// One identification, detached from the pipeline so it can run off the tick thread.
pub struct IdentifyJob {
	generation: u64,
	image: Mat,
	database: Option<Arc<ReferenceDatabase>>,
	features: FeatureParams,
	matching: MatchParams,
	guard: AnalysisGuard,
}

impl IdentifyJob {
	pub fn run(self) -> Result<IdentifyOutcome> {
		let identification = match self.database.as_deref() {
			Some(database) if database.is_ready() => {
				let capture = FeatureExtractor::new(&self.features)?.extract(&self.image)?;
				debug!(keypoints = capture.len(), "capture features extracted");
				identify(database, &capture, &self.matching)
			}
			_ => Identification::NotReady,
		};
		Ok(IdentifyOutcome {
			generation: self.generation,
			identification,
			_guard: self.guard,
		})
	}
}

pub struct IdentifyOutcome {
	generation: u64,
	identification: Identification,
	_guard: AnalysisGuard,
}

impl IdentifyOutcome {
	pub fn identification(&self) -> &Identification {
		&self.identification
	}
}

#[derive(Default)]
struct CaptureSession {
	generation: u64,
	image: Option<Mat>,
	identification: Option<Identification>,
	exclusions: ExclusionSet,
}

pub struct Pipeline<S: FrameSource> {
	config: Config,
	source: S,
	detector: BoundaryDetector,
	tracker: StabilityTracker<Crop>,
	database: Option<Arc<ReferenceDatabase>>,
	session: CaptureSession,
	analyzing: Arc<AtomicBool>,
	vision_ready: bool,
	last_frame: Option<Mat>,
	quad: Option<Quad>,
}

impl<S: FrameSource> Pipeline<S> {
	pub fn new(config: Config, source: S) -> Result<Self> {
		let detector = BoundaryDetector::new(&config.boundary)?;
		let vision_ready = match create_orb(&config.features) {
			Ok(_) => true,
			Err(err) => {
				warn!(error = %err, "feature extractor unavailable");
				false
			}
		};
		Ok(Self {
			tracker: StabilityTracker::new(&config.stability),
			config,
			source,
			detector,
			database: None,
			session: CaptureSession::default(),
			analyzing: Arc::new(AtomicBool::new(false)),
			vision_ready,
			last_frame: None,
			quad: None,
		})
	}

	pub fn attach_database(&mut self, database: ReferenceDatabase) {
		if !database.is_ready() {
			warn!("reference database has no identities, identification disabled");
		}
		self.database = Some(Arc::new(database));
	}

	/// One analysis cycle. Failures inside the cycle only mean "no detection".
	pub fn tick(&mut self, now: Instant) -> TickReport {
		let frame = match self.source.latest() {
			Ok(frame) => frame,
			Err(err) => {
				debug!(error = %err, "frame source failed");
				None
			}
		};

		let detected = frame.as_ref().and_then(|frame| self.detect_crop(frame));
		self.quad = detected.as_ref().map(|(quad, _)| *quad);
		let event = self.tracker.update(detected.map(|(_, crop)| crop), now);
		self.last_frame = frame;

		TickReport {
			quad: self.quad,
			event,
			consecutive_detections: self.tracker.consecutive_detections(),
		}
	}

	fn detect_crop(&self, frame: &Mat) -> Option<(Quad, Crop)> {
		let quad = match self.detector.detect(frame) {
			Ok(quad) => quad?,
			Err(err) => {
				debug!(error = %err, "boundary detection failed");
				return None;
			}
		};
		match Crop::from_frame(frame, &quad) {
			Ok(crop) => crop.map(|crop| (quad, crop)),
			Err(err) => {
				debug!(error = %err, "crop failed");
				None
			}
		}
	}

	/// Snapshots the held crop, or the last frame without one, into a job.
	pub fn begin_capture(&mut self, now: Instant) -> Result<IdentifyJob> {
		let guard = AnalysisGuard::acquire(&self.analyzing).ok_or(Error::AnalysisInFlight)?;

		let image = match (self.tracker.current(now), &self.last_frame) {
			(Some(crop), _) => crop.image.try_clone()?,
			(None, Some(frame)) if !frame.empty() => frame.try_clone()?,
			_ => return Err(Error::NoCaptureImage),
		};

		// A new image ends the previous capture and its exclusions with it.
		if self.session.image.is_some() {
			self.reset();
		}
		self.session.image = Some(image.try_clone()?);
		info!(width = image.cols(), height = image.rows(), "capture taken");

		Ok(IdentifyJob {
			generation: self.session.generation,
			image,
			database: self.database.clone(),
			features: self.config.features.clone(),
			matching: self.config.matching.clone(),
			guard,
		})
	}

	/// Stores a job's result. Returns `false` if a reset made it stale.
	pub fn finish_capture(&mut self, outcome: IdentifyOutcome) -> bool {
		if outcome.generation != self.session.generation {
			debug!("discarding identification from a reset session");
			return false;
		}
		match &outcome.identification {
			Identification::NotReady => warn!("identification skipped, reference database not ready"),
			Identification::Ranked(ranked) => info!(
				best = ranked.first().map(|c| c.display_name.as_str()),
				score = ranked.first().map(|c| c.score),
				"identification finished"
			),
		}
		self.session.identification = Some(outcome.identification);
		true
	}

	/// Runs begin, job and finish on the calling thread.
	pub fn capture_blocking(&mut self, now: Instant) -> Result<Vec<Candidate>> {
		let outcome = self.begin_capture(now)?.run()?;
		self.finish_capture(outcome);
		Ok(self.candidates())
	}

	pub fn exclude(&mut self, display_name: &str) {
		if self.session.exclusions.exclude(display_name) {
			info!(name = display_name, "candidate excluded");
		}
	}

	/// Clears the captured image, candidates and exclusions together.
	pub fn reset(&mut self) {
		self.session = CaptureSession {
			generation: self.session.generation.wrapping_add(1),
			..CaptureSession::default()
		};
	}

	/// Ranked candidates with exclusions removed.
	pub fn candidates(&self) -> Vec<Candidate> {
		match &self.session.identification {
			Some(identification) => filter_candidates(identification.candidates(), &self.session.exclusions),
			None => Vec::new(),
		}
	}

	pub fn identification(&self) -> Option<&Identification> {
		self.session.identification.as_ref()
	}

	pub fn captured_image(&self) -> Option<&Mat> {
		self.session.image.as_ref()
	}

	/// The held crop while it is inside its debounce window.
	pub fn crop_preview(&self, now: Instant) -> Option<&Crop> {
		self.tracker.current(now)
	}

	pub fn last_frame(&self) -> Option<&Mat> {
		self.last_frame.as_ref()
	}

	pub fn quad(&self) -> Option<&Quad> {
		self.quad.as_ref()
	}

	pub fn source_mut(&mut self) -> &mut S {
		&mut self.source
	}

	pub fn database_ready(&self) -> bool {
		self.database.as_deref().is_some_and(ReferenceDatabase::is_ready)
	}

	pub fn is_analyzing(&self) -> bool {
		self.analyzing.load(Ordering::Acquire)
	}

	pub fn status(&self, now: Instant) -> Status {
		Status {
			vision_ready: self.vision_ready,
			database_ready: self.database_ready(),
			is_analyzing: self.is_analyzing(),
			quad: self.quad,
			candidates: self.candidates(),
			crop_available: self.tracker.current(now).is_some(),
		}
	}

	/// Drops the database and every piece of session state.
	pub fn teardown(&mut self) {
		self.database = None;
		self.tracker.reset();
		self.reset();
		self.last_frame = None;
		self.quad = None;
		info!("pipeline torn down");
	}
}
