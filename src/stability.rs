//! Debounced hold of the most recent detection.
//!
//! A detection is kept current for a grace window after the detector stops
//! seeing it, so single-frame dropouts from glare or motion do not discard the
//! crop. Time is passed in explicitly; the tracker never reads a clock.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::config::StabilityParams;

/// What a tracker update did with the held payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerEvent {
	/// A fresh detection replaced the held payload and restarted the timer.
	Detected,
	/// No detection, the previous payload is still inside its grace window.
	Holding,
	/// The grace window ran out and the payload was dropped.
	Expired,
	/// Nothing detected and nothing held.
	Idle,
}

struct Held<T> {
	payload: T,
	expires_at: Instant,
}

pub struct StabilityTracker<T> {
	grace: Duration,
	consecutive_detections: u32,
	last_detection: Option<Instant>,
	held: Option<Held<T>>,
}

impl<T> StabilityTracker<T> {
	pub fn new(params: &StabilityParams) -> Self {
		Self::with_grace(Duration::from_millis(params.grace_ms))
	}

	pub fn with_grace(grace: Duration) -> Self {
		Self {
			grace,
			consecutive_detections: 0,
			last_detection: None,
			held: None,
		}
	}

	pub fn update(&mut self, detection: Option<T>, now: Instant) -> TrackerEvent {
		match detection {
			Some(payload) => {
				self.consecutive_detections = self.consecutive_detections.saturating_add(1);
				self.last_detection = Some(now);
				self.held = Some(Held {
					payload,
					expires_at: now + self.grace,
				});
				trace!(consecutive = self.consecutive_detections, "detection refreshed");
				TrackerEvent::Detected
			}
			None => {
				self.consecutive_detections = 0;
				self.expire(now)
			}
		}
	}

	fn expire(&mut self, now: Instant) -> TrackerEvent {
		match &self.held {
			None => TrackerEvent::Idle,
			Some(held) if now < held.expires_at => TrackerEvent::Holding,
			Some(_) => {
				self.held = None;
				debug!(grace_ms = self.grace.as_millis() as u64, "held detection expired");
				TrackerEvent::Expired
			}
		}
	}

	/// The held payload, if its grace window has not elapsed at `now`.
	pub fn current(&self, now: Instant) -> Option<&T> {
		self.held
			.as_ref()
			.filter(|held| now < held.expires_at)
			.map(|held| &held.payload)
	}

	pub fn consecutive_detections(&self) -> u32 {
		self.consecutive_detections
	}

	pub fn last_detection(&self) -> Option<Instant> {
		self.last_detection
	}

	pub fn reset(&mut self) {
		self.consecutive_detections = 0;
		self.last_detection = None;
		self.held = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tracker() -> StabilityTracker<&'static str> {
		StabilityTracker::new(&StabilityParams::default())
	}

	#[test]
	fn consecutive_detections_count_and_reset() {
		let mut tracker = tracker();
		let t0 = Instant::now();

		for i in 0..5 {
			let event = tracker.update(Some("card"), t0 + Duration::from_millis(16 * i));
			assert_eq!(event, TrackerEvent::Detected);
		}
		assert_eq!(tracker.consecutive_detections(), 5);

		tracker.update(None, t0 + Duration::from_millis(100));
		assert_eq!(tracker.consecutive_detections(), 0);
	}

	#[test]
	fn crop_held_until_grace_window_ends() {
		let mut tracker = tracker();
		let t0 = Instant::now();
		tracker.update(Some("first"), t0);

		let almost = t0 + Duration::from_millis(999);
		assert_eq!(tracker.update(None, almost), TrackerEvent::Holding);
		assert_eq!(tracker.current(almost), Some(&"first"));

		let deadline = t0 + Duration::from_millis(1000);
		assert_eq!(tracker.current(deadline), None);
		assert_eq!(tracker.update(None, deadline), TrackerEvent::Expired);
		assert_eq!(tracker.update(None, deadline + Duration::from_millis(16)), TrackerEvent::Idle);
	}

	#[test]
	fn expiry_fires_once_per_loss() {
		let mut tracker = tracker();
		let t0 = Instant::now();
		tracker.update(Some("a"), t0);

		let events: Vec<_> = (1..=80)
			.map(|i| tracker.update(None, t0 + Duration::from_millis(16 * i)))
			.collect();
		assert_eq!(events.iter().filter(|e| **e == TrackerEvent::Expired).count(), 1);
		assert_eq!(events.last(), Some(&TrackerEvent::Idle));
	}

	#[test]
	fn redetection_restarts_the_window() {
		let mut tracker = tracker();
		let t0 = Instant::now();
		tracker.update(Some("old"), t0);
		tracker.update(None, t0 + Duration::from_millis(600));
		tracker.update(Some("new"), t0 + Duration::from_millis(900));

		let later = t0 + Duration::from_millis(1500);
		assert_eq!(tracker.update(None, later), TrackerEvent::Holding);
		assert_eq!(tracker.current(later), Some(&"new"));
		assert_eq!(tracker.last_detection(), Some(t0 + Duration::from_millis(900)));
	}

	#[test]
	fn reset_drops_everything() {
		let mut tracker = tracker();
		let t0 = Instant::now();
		tracker.update(Some("a"), t0);
		tracker.reset();
		assert_eq!(tracker.current(t0), None);
		assert_eq!(tracker.last_detection(), None);
		assert_eq!(tracker.update(None, t0), TrackerEvent::Idle);
	}
}
