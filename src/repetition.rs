use std::collections::HashMap;

/// Occurrence count at which a placement is a draw.
pub const DRAW_OCCURRENCES: u32 = 3;

/// Counts how often each piece placement has been reached in the current line
/// of play. Placements are keyed by `Board::fingerprint` only, so side to move,
/// castling rights and en-passant targets do not distinguish positions.
#[derive(Debug, Clone, Default)]
pub struct RepetitionTracker {
    occurrences: HashMap<u64, u32>,
    history: Vec<u64>,
}

impl RepetitionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reached placement. Returns true once it has been seen
    /// `DRAW_OCCURRENCES` times.
    pub fn record(&mut self, fingerprint: u64) -> bool {
        let count = self.occurrences.entry(fingerprint).or_insert(0);
        *count += 1;
        self.history.push(fingerprint);
        *count >= DRAW_OCCURRENCES
    }

    /// Drop the most recently recorded placement.
    pub fn forget(&mut self) {
        if let Some(fingerprint) = self.history.pop() {
            if let Some(count) = self.occurrences.get_mut(&fingerprint) {
                *count -= 1;
                if *count == 0 {
                    self.occurrences.remove(&fingerprint);
                }
            }
        }
    }

    pub fn occurrences(&self, fingerprint: u64) -> u32 {
        self.occurrences.get(&fingerprint).copied().unwrap_or(0)
    }

    /// Whether the latest recorded placement has reached the draw count.
    pub fn current_is_draw(&self) -> bool {
        self.history
            .last()
            .map_or(false, |&fingerprint| self.occurrences(fingerprint) >= DRAW_OCCURRENCES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_third_occurrence_is_draw() {
        let mut tracker = RepetitionTracker::new();
        assert!(!tracker.record(1));
        assert_eq!(tracker.occurrences(1), 1);
        assert!(!tracker.record(2));
        assert!(!tracker.record(1));
        assert_eq!(tracker.occurrences(1), 2);
        assert!(!tracker.record(2));
        assert!(tracker.record(1));
        assert!(tracker.current_is_draw());
    }

    #[test]
    fn test_forget_reverses_record() {
        let mut tracker = RepetitionTracker::new();
        tracker.record(1);
        tracker.record(1);
        tracker.record(1);
        tracker.forget();
        assert_eq!(tracker.occurrences(1), 2);
        assert!(!tracker.current_is_draw());
        tracker.forget();
        tracker.forget();
        assert_eq!(tracker.occurrences(1), 0);
        assert!(!tracker.current_is_draw());
        tracker.forget();
        assert_eq!(tracker.occurrences(1), 0);
    }
}
