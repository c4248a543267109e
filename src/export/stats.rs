use std::time::{Duration, Instant};

/// Counters for the district currently being exported.
#[derive(Debug, Clone)]
pub struct DistrictStats {
    parcels: usize,
    skipped: usize,
    started: Instant,
}

impl DistrictStats {
    pub fn new() -> Self { Self { parcels: 0, skipped: 0, started: Instant::now() } }

    #[inline] pub fn record_parcel(&mut self) { self.parcels += 1 }

    #[inline] pub fn record_skip(&mut self) { self.skipped += 1 }

    #[inline] pub fn parcels(&self) -> usize { self.parcels }

    #[inline] pub fn skipped(&self) -> usize { self.skipped }

    #[inline] pub fn elapsed(&self) -> Duration { self.started.elapsed() }
}

impl Default for DistrictStats {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_independent() {
        let mut stats = DistrictStats::new();
        stats.record_parcel();
        stats.record_parcel();
        stats.record_skip();
        assert_eq!((stats.parcels(), stats.skipped()), (2, 1));
    }

    #[test]
    fn fresh_stats_start_at_zero() {
        let stats = DistrictStats::default();
        assert_eq!((stats.parcels(), stats.skipped()), (0, 0));
    }
}
