//! Violation state machine.
//!
//! Converts a per-frame detection set into discrete, de-duplicated violation
//! events. Two states: `Idle` and `Violating`. A violation begins on the frame
//! where a hand is fully inside the ROI while pizza is present and no scooper
//! is; it stays a single violation for as long as the condition holds on
//! consecutive frames. The count increments only on the rising edge.
//!
//! Tracker state is owned by exactly one consumer session, never global, so
//! multiple sessions can run concurrently and tests need no setup.

use crate::detect::Detection;
use crate::roi::Roi;

pub const LABEL_HAND: &str = "hand";
pub const LABEL_PIZZA: &str = "pizza";
pub const LABEL_SCOOPER: &str = "scooper";

/// The three booleans the transition function needs from one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameFlags {
    /// Any "hand" box fully contained in the ROI. Partial overlap does not count.
    pub hand_in_roi: bool,
    /// Any "pizza" detection, location irrelevant.
    pub pizza_present: bool,
    /// Any "scooper" detection, location irrelevant.
    pub scooper_present: bool,
}

impl FrameFlags {
    pub fn from_detections(detections: &[Detection], roi: &Roi) -> Self {
        let mut flags = Self::default();
        for det in detections {
            match det.label.as_str() {
                LABEL_HAND => {
                    if roi.contains_box(&det.bbox) {
                        flags.hand_in_roi = true;
                    }
                }
                LABEL_PIZZA => flags.pizza_present = true,
                LABEL_SCOOPER => flags.scooper_present = true,
                _ => {}
            }
        }
        flags
    }

    pub fn violating_now(&self) -> bool {
        self.hand_in_roi && self.pizza_present && !self.scooper_present
    }
}

/// Outcome of feeding one frame to the tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Rising edge: Idle -> Violating. The count was just incremented and a
    /// violation artifact should be emitted for this frame.
    Started,
    /// Still violating; same episode, no new count.
    Ongoing,
    /// Falling edge: Violating -> Idle.
    Ended,
    /// Idle and staying idle.
    Clear,
}

/// Per-session violation state: `{count, active}`.
///
/// `count` is monotonically non-decreasing and equals the number of rising
/// edges observed, including an initial violating frame.
#[derive(Debug, Default)]
pub struct ViolationTracker {
    count: u64,
    active: bool,
}

impl ViolationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the state machine by one frame.
    pub fn observe(&mut self, violating_now: bool) -> Transition {
        match (self.active, violating_now) {
            (false, true) => {
                self.active = true;
                self.count += 1;
                Transition::Started
            }
            (true, true) => Transition::Ongoing,
            (true, false) => {
                self.active = false;
                Transition::Ended
            }
            (false, false) => Transition::Clear,
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::BoundingBox;

    fn det(label: &str, x1: u32, y1: u32, x2: u32, y2: u32) -> Detection {
        Detection::new(label, 0.9, BoundingBox { x1, y1, x2, y2 })
    }

    fn count_for(seq: &[bool]) -> u64 {
        let mut tracker = ViolationTracker::new();
        for &v in seq {
            tracker.observe(v);
        }
        tracker.count()
    }

    #[test]
    fn counts_rising_edges_only() {
        assert_eq!(count_for(&[false, true, true, false, true]), 2);
        assert_eq!(count_for(&[true, true, true, true]), 1);
        assert_eq!(count_for(&[false, false, false]), 0);
        assert_eq!(count_for(&[true, false, true, false, true]), 3);
        assert_eq!(count_for(&[]), 0);
    }

    #[test]
    fn initial_violating_frame_counts_as_one_edge() {
        let mut tracker = ViolationTracker::new();
        assert_eq!(tracker.observe(true), Transition::Started);
        assert_eq!(tracker.count(), 1);
        assert!(tracker.is_active());
    }

    #[test]
    fn transitions_follow_the_state_machine() {
        let mut tracker = ViolationTracker::new();
        assert_eq!(tracker.observe(false), Transition::Clear);
        assert_eq!(tracker.observe(true), Transition::Started);
        assert_eq!(tracker.observe(true), Transition::Ongoing);
        assert_eq!(tracker.observe(false), Transition::Ended);
        assert_eq!(tracker.observe(false), Transition::Clear);
        assert_eq!(tracker.count(), 1);
    }

    #[test]
    fn count_never_decreases() {
        let mut tracker = ViolationTracker::new();
        let mut last = 0;
        for &v in &[true, false, true, true, false, false, true] {
            tracker.observe(v);
            assert!(tracker.count() >= last);
            last = tracker.count();
        }
    }

    #[test]
    fn hand_in_roi_with_pizza_and_no_scooper_violates() {
        let roi = Roi::new(0, 0, 100, 100).unwrap();
        let dets = vec![det(LABEL_HAND, 10, 10, 50, 50), det(LABEL_PIZZA, 200, 200, 400, 400)];
        let flags = FrameFlags::from_detections(&dets, &roi);
        assert!(flags.violating_now());
    }

    #[test]
    fn scooper_anywhere_suppresses_the_violation() {
        let roi = Roi::new(0, 0, 100, 100).unwrap();
        let mut dets = vec![det(LABEL_HAND, 10, 10, 50, 50), det(LABEL_PIZZA, 200, 200, 400, 400)];
        assert!(FrameFlags::from_detections(&dets, &roi).violating_now());

        // Scooper location is irrelevant, only its presence.
        dets.push(det(LABEL_SCOOPER, 500, 500, 600, 600));
        assert!(!FrameFlags::from_detections(&dets, &roi).violating_now());
    }

    #[test]
    fn hand_straddling_the_roi_boundary_does_not_count() {
        let roi = Roi::new(0, 0, 100, 100).unwrap();
        let dets = vec![det(LABEL_HAND, 50, 50, 150, 150), det(LABEL_PIZZA, 0, 0, 40, 40)];
        let flags = FrameFlags::from_detections(&dets, &roi);
        assert!(!flags.hand_in_roi);
        assert!(!flags.violating_now());
    }

    #[test]
    fn pizza_is_required_for_a_violation() {
        let roi = Roi::new(0, 0, 100, 100).unwrap();
        let dets = vec![det(LABEL_HAND, 10, 10, 50, 50)];
        assert!(!FrameFlags::from_detections(&dets, &roi).violating_now());
    }

    #[test]
    fn unknown_labels_are_ignored() {
        let roi = Roi::new(0, 0, 100, 100).unwrap();
        let dets = vec![det("person", 10, 10, 50, 50), det(LABEL_PIZZA, 0, 0, 20, 20)];
        let flags = FrameFlags::from_detections(&dets, &roi);
        assert_eq!(flags, FrameFlags {
            hand_in_roi: false,
            pizza_present: true,
            scooper_present: false,
        });
    }
}
