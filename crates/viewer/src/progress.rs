use std::fmt;

/// Raw byte counts reported while an asset downloads.
///
/// `total` is `None` when the length is not known up front (no
/// `Content-Length`).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub loaded: u64,
    pub total: Option<u64>,
}

impl ProgressEvent {
    pub fn new(loaded: u64, total: Option<u64>) -> Self {
        Self { loaded, total }
    }
}

/// Whole-number download percentage in `0..=100`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadProgress(u8);

impl LoadProgress {
    /// `floor(loaded / total * 100)`, clamped to 100.
    ///
    /// Returns `None` when the total is unknown or zero, since no meaningful
    /// percentage exists.
    pub fn from_event(event: ProgressEvent) -> Option<Self> {
        let total = event.total.filter(|&t| t > 0)?;
        let percent = (event.loaded as u128 * 100) / total as u128;
        Some(Self(percent.min(100) as u8))
    }

    pub fn percent(self) -> u8 {
        self.0
    }
}

impl fmt::Display for LoadProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadProgress, ProgressEvent};

    fn pct(loaded: u64, total: u64) -> u8 {
        LoadProgress::from_event(ProgressEvent::new(loaded, Some(total)))
            .unwrap()
            .percent()
    }

    #[test]
    fn floors_the_ratio() {
        assert_eq!(pct(50, 100), 50);
        assert_eq!(pct(1, 3), 33);
        assert_eq!(pct(2, 3), 66);
        assert_eq!(pct(999, 1000), 99);
        assert_eq!(pct(100, 100), 100);
        assert_eq!(pct(0, 100), 0);
    }

    #[test]
    fn stays_in_range_for_every_valid_pair() {
        for total in 1..=64u64 {
            for loaded in 0..=total {
                let p = pct(loaded, total);
                assert!(p <= 100);
                assert_eq!(p as u64, loaded * 100 / total);
            }
        }
    }

    #[test]
    fn large_byte_counts_do_not_overflow() {
        assert_eq!(pct(u64::MAX / 2, u64::MAX), 49);
    }

    #[test]
    fn unknown_or_zero_total_has_no_percentage() {
        assert_eq!(LoadProgress::from_event(ProgressEvent::new(10, None)), None);
        assert_eq!(LoadProgress::from_event(ProgressEvent::new(10, Some(0))), None);
    }

    #[test]
    fn overshoot_is_clamped() {
        assert_eq!(pct(150, 100), 100);
    }

    #[test]
    fn displays_as_css_percentage() {
        assert_eq!(
            LoadProgress::from_event(ProgressEvent::new(50, Some(100)))
                .unwrap()
                .to_string(),
            "50%"
        );
    }
}
