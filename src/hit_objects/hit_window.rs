use super::Hit;

/// Hit windows in milliseconds, every value is a `±` tolerance
/// around the start time of an object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitWindow {
    pub x300: f64,
    pub x100: f64,
    pub x50: f64,
}

impl HitWindow {
    pub fn from_od(od: f32) -> Self {
        HitWindow {
            x300: 80.0 - 6.0 * (od as f64),
            x100: 140.0 - 8.0 * (od as f64),
            x50: 200.0 - 10.0 * (od as f64),
        }
    }

    /// Earliest offset (relative to start time) which still counts as a hit
    #[inline]
    pub fn early_bound(&self) -> f64 {
        -self.x50.round()
    }

    /// First offset which is too late to be hit
    #[inline]
    pub fn late_bound(&self) -> f64 {
        self.x50.round()
    }

    #[inline]
    pub fn can_be_hit(&self, offset: f64) -> bool {
        offset < self.late_bound()
    }

    /// Result for a hit at `offset`,
    /// `None` if offset is outside `[early_bound, late_bound)`
    pub fn result_for(&self, offset: f64) -> Option<Hit> {
        if offset < self.early_bound() || !self.can_be_hit(offset) {
            return None;
        }

        let hit_error = offset.abs();

        if hit_error < self.x300.round() {
            return Some(Hit::X300);
        }

        if hit_error < self.x100.round() {
            return Some(Hit::X100);
        }

        Some(Hit::X50)
    }
}
