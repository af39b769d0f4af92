use smallvec::SmallVec;

use crate::math::{calc_progress, lerp};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    #[default]
    None,
    In,
    Out,
    OutQuint,
}

impl Easing {
    pub fn apply(self, progress: f64) -> f64 {
        let t = progress.clamp(0.0, 1.0);

        match self {
            Easing::None => t,
            Easing::In => t * t,
            Easing::Out => t * (2.0 - t),
            Easing::OutQuint => {
                let t = t - 1.0;
                t * t * t * t * t + 1.0
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Alpha,
    Scale,
}

/// Visual parts of a hit circle that can be transformed individually.
/// `Root` is the whole object, its alpha and scale apply to every other part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target {
    Root,
    ApproachCircle,
    CirclePiece,
    Overlay,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub target: Target,
    pub property: Property,
    /// Absolute time
    pub start_time: f64,
    pub duration: f64,
    /// Value to start from, current value of the property if `None`
    pub from: Option<f32>,
    pub to: f32,
    pub easing: Easing,
}

impl Transform {
    #[inline]
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

/// Transform relative to some anchor, used by policies which
/// don't know yet at which time they will be applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub delay: f64,
    pub property: Property,
    pub duration: f64,
    pub from: Option<f32>,
    pub to: f32,
    pub easing: Easing,
}

pub type Plan = SmallVec<[Step; 3]>;

impl Step {
    /// Instantly makes target transparent
    pub fn hide() -> Self {
        Self::fade_out(0.0, 0.0, Easing::None)
    }

    pub fn fade_out(delay: f64, duration: f64, easing: Easing) -> Self {
        Self {
            delay,
            property: Property::Alpha,
            duration,
            from: None,
            to: 0.0,
            easing,
        }
    }

    pub fn fade_in_from_zero(delay: f64, duration: f64) -> Self {
        Self {
            delay,
            property: Property::Alpha,
            duration,
            from: Some(0.0),
            to: 1.0,
            easing: Easing::None,
        }
    }

    /// Scales from the current value
    pub fn scale_to(to: f32, duration: f64, easing: Easing) -> Self {
        Self {
            delay: 0.0,
            property: Property::Scale,
            duration,
            from: None,
            to,
            easing,
        }
    }

    pub fn scale(from: f32, to: f32, duration: f64) -> Self {
        Self {
            delay: 0.0,
            property: Property::Scale,
            duration,
            from: Some(from),
            to,
            easing: Easing::None,
        }
    }
}

/// Schedules transforms relative to a fixed anchor
/// instead of the time they are scheduled at.
pub struct AbsoluteSequence<'a> {
    anchor: f64,
    delay: f64,
    out: &'a mut Vec<Transform>,
}

impl<'a> AbsoluteSequence<'a> {
    pub fn new(anchor: f64, out: &'a mut Vec<Transform>) -> Self {
        Self {
            anchor,
            delay: 0.0,
            out,
        }
    }

    #[inline]
    pub fn anchor(&self) -> f64 {
        self.anchor
    }

    /// Offsets every following transform
    pub fn delay(&mut self, ms: f64) -> &mut Self {
        self.delay += ms;
        self
    }

    pub fn reset_delay(&mut self) -> &mut Self {
        self.delay = 0.0;
        self
    }

    pub fn fade_to(&mut self, target: Target, value: f32, duration: f64, easing: Easing) -> &mut Self {
        self.push(target, Property::Alpha, None, value, duration, easing)
    }

    pub fn fade_out(&mut self, target: Target, duration: f64, easing: Easing) -> &mut Self {
        self.fade_to(target, 0.0, duration, easing)
    }

    pub fn hide(&mut self, target: Target) -> &mut Self {
        self.fade_to(target, 0.0, 0.0, Easing::None)
    }

    pub fn scale_to(&mut self, target: Target, value: f32, duration: f64, easing: Easing) -> &mut Self {
        self.push(target, Property::Scale, None, value, duration, easing)
    }

    pub fn apply_plan(&mut self, target: Target, plan: &[Step]) -> &mut Self {
        for step in plan {
            self.out.push(Transform {
                target,
                property: step.property,
                start_time: self.anchor + self.delay + step.delay,
                duration: step.duration,
                from: step.from,
                to: step.to,
                easing: step.easing,
            });
        }

        self
    }

    fn push(
        &mut self,
        target: Target,
        property: Property,
        from: Option<f32>,
        to: f32,
        duration: f64,
        easing: Easing,
    ) -> &mut Self {
        self.out.push(Transform {
            target,
            property,
            start_time: self.anchor + self.delay,
            duration,
            from,
            to,
            easing,
        });

        self
    }
}

/// Every transform of a single object
#[derive(Debug, Default, Clone)]
pub struct ObjectTimeline {
    /// Applied once when the object is loaded
    pub(crate) initial: Vec<Transform>,
    /// Rebuilt as a whole whenever the state is (re)applied
    pub(crate) state: Vec<Transform>,
}

impl ObjectTimeline {
    pub fn initial(&self) -> &[Transform] {
        &self.initial
    }

    pub fn state(&self) -> &[Transform] {
        &self.state
    }

    pub fn end_time(&self) -> Option<f64> {
        self.initial
            .iter()
            .chain(self.state.iter())
            .map(Transform::end_time)
            .max_by(f64::total_cmp)
    }

    pub fn sample(&self, target: Target, property: Property, time: f64) -> f32 {
        let mut transforms: SmallVec<[&Transform; 8]> = self.initial
            .iter()
            .chain(self.state.iter())
            .filter(|x| x.target == target && x.property == property)
            .collect();

        // Stable, so transforms starting together keep scheduling order
        transforms.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

        value_at(&transforms, time, 1.0)
    }
}

/// Latest started transform wins, each one starting from the value
/// the previous ones produced at its start time
fn value_at(transforms: &[&Transform], time: f64, base: f32) -> f32 {
    let mut value = base;

    for (i, transform) in transforms.iter().enumerate() {
        if time < transform.start_time {
            break;
        }

        let from = transform
            .from
            .unwrap_or_else(|| value_at(&transforms[..i], transform.start_time, base));

        value = if time >= transform.end_time() {
            transform.to
        } else {
            let progress = calc_progress(time, transform.start_time, transform.end_time());
            lerp(from as f64, transform.to as f64, transform.easing.apply(progress)) as f32
        };
    }

    value
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_easing_bounds() {
        for easing in [Easing::None, Easing::In, Easing::Out, Easing::OutQuint] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
            assert_eq!(easing.apply(2.0), 1.0);
        }

        assert!(Easing::Out.apply(0.5) > 0.5);
        assert!(Easing::In.apply(0.5) < 0.5);
    }

    #[test]
    fn test_sample_fades() {
        let mut timeline = ObjectTimeline::default();

        AbsoluteSequence::new(100.0, &mut timeline.state)
            .fade_out(Target::Root, 100.0, Easing::None);

        assert_eq!(timeline.sample(Target::Root, Property::Alpha, 50.0), 1.0);
        assert_eq!(timeline.sample(Target::Root, Property::Alpha, 100.0), 1.0);
        assert_relative_eq!(timeline.sample(Target::Root, Property::Alpha, 150.0), 0.5);
        assert_eq!(timeline.sample(Target::Root, Property::Alpha, 200.0), 0.0);

        // Other targets are untouched
        assert_eq!(timeline.sample(Target::Overlay, Property::Alpha, 200.0), 1.0);
    }

    #[test]
    fn test_sample_starts_from_previous_value() {
        let mut timeline = ObjectTimeline::default();

        AbsoluteSequence::new(0.0, &mut timeline.initial)
            .apply_plan(Target::Root, &[Step::fade_in_from_zero(0.0, 100.0)]);

        // Interrupts the fade in halfway
        AbsoluteSequence::new(50.0, &mut timeline.state)
            .fade_out(Target::Root, 100.0, Easing::None);

        assert_relative_eq!(timeline.sample(Target::Root, Property::Alpha, 25.0), 0.25);
        assert_relative_eq!(timeline.sample(Target::Root, Property::Alpha, 50.0), 0.5);
        assert_relative_eq!(timeline.sample(Target::Root, Property::Alpha, 100.0), 0.25);
        assert_eq!(timeline.sample(Target::Root, Property::Alpha, 150.0), 0.0);
    }

    #[test]
    fn test_delay_is_relative_to_anchor() {
        let mut out = Vec::new();

        AbsoluteSequence::new(1000.0, &mut out)
            .delay(800.0)
            .hide(Target::Root)
            .reset_delay()
            .scale_to(Target::CirclePiece, 1.4, 240.0, Easing::Out);

        assert_eq!(out[0].start_time, 1800.0);
        assert_eq!(out[0].duration, 0.0);
        assert_eq!(out[1].start_time, 1000.0);
        assert_eq!(out[1].end_time(), 1240.0);
    }

    #[test]
    fn test_end_time() {
        let mut timeline = ObjectTimeline::default();
        assert_eq!(timeline.end_time(), None);

        AbsoluteSequence::new(0.0, &mut timeline.initial)
            .fade_out(Target::Root, 300.0, Easing::None);
        AbsoluteSequence::new(100.0, &mut timeline.state)
            .fade_out(Target::Number, 60.0, Easing::Out);

        assert_eq!(timeline.end_time(), Some(300.0));
    }
}
