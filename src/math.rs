use cgmath::{InnerSpace, Vector2};

pub fn lerp(a: f64, b: f64, v: f64) -> f64 {
    a + v * (b - a)
}

/// Maps a 0-10 difficulty value onto a `min..mid..max` range
/// the way osu! does it for every difficulty dependant value
pub fn diff_rate(diff: f32, min: f32, mid: f32, max: f32) -> f32 {
	if diff > 5.0 {
		return mid + (max-mid)*(diff-5.0)/5.0
	}

	if diff < 5.0 {
		return mid - (mid-min)*(5.0-diff)/5.0
	}

	mid
}

pub fn calc_hitcircle_diameter(cs: f32) -> f32 {
    ((1.0 - 0.7 * (cs - 5.0) / 5.0) / 2.0) * 128.0 * 1.00041
}

/// Return preempt and fadein based on AR
pub fn calculate_preempt_fadein(ar: f32) -> (f32, f32) {
    (
        diff_rate(ar, 1800.0, 1200.0, 450.0),
        diff_rate(ar, 1200.0, 800.0, 300.0),
    )
}

/// Progress of `current` between `start` and `end`.
/// Zero length ranges are treated as already finished
#[inline]
pub fn calc_progress(current: f64, start: f64, end: f64) -> f64 {
    if end <= start {
        return 1.0;
    }

    (current - start) / (end - start)
}

#[inline]
pub fn distance(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    (a - b).magnitude()
}

#[test]
pub fn test_progress() {
    assert_eq!(calc_progress(50.0, 0.0, 100.0), 0.50);
    assert_eq!(calc_progress(50.0, 100.0, 100.0), 1.0);
}

#[test]
pub fn test_preempt_fadein() {
    assert_eq!(calculate_preempt_fadein(5.0), (1200.0, 800.0));
    assert_eq!(calculate_preempt_fadein(10.0), (450.0, 300.0));
    assert_eq!(calculate_preempt_fadein(0.0), (1800.0, 1200.0));
}

#[test]
pub fn test_distance() {
    let a = Vector2::new(0.0, 0.0);
    let b = Vector2::new(3.0, 4.0);

    assert_eq!(distance(a, b), 5.0);
}
