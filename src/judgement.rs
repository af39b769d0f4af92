use cgmath::Vector2;

use crate::{
    hit_objects::{ArmedState, Hit, HitObject, ObjectId},
    math::distance,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JudgementResult {
    pub object_id: ObjectId,
    pub is_hit: bool,
    pub hit: Hit,
    /// `judged_at - start_time`
    pub time_offset: f64,
}

impl JudgementResult {
    pub fn hit(object_id: ObjectId, hit: Hit, time_offset: f64) -> Self {
        debug_assert!(hit.is_hit());

        Self {
            object_id,
            is_hit: true,
            hit,
            time_offset,
        }
    }

    pub fn miss(object_id: ObjectId, time_offset: f64) -> Self {
        Self {
            object_id,
            is_hit: false,
            hit: Hit::MISS,
            time_offset,
        }
    }
}

/// What caused an evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    /// Passive per-frame check
    Poll,
    /// Key press with the cursor at `pos`
    User { pos: Vector2<f64> },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum JudgementStrategy {
    #[default]
    Standard,
    /// Forces a perfect hit once the start time is reached,
    /// ignoring cursor position
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    OutsideCircle,
    OutsideWindow,
    NotHittable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evaluation {
    /// Nothing happened, object is still waiting
    Idle,
    /// User input reached the object but didn't count,
    /// object is still waiting
    Rejected(RejectReason),
    /// Object just became terminal
    Terminal(JudgementResult),
    /// Object was already terminal, nothing was evaluated
    Settled(ArmedState),
}

/// Decides if an object can currently be hit at all,
/// independent of timing and cursor position
pub trait HitPolicy {
    fn is_hittable(&self, object: &HitObject, time: f64) -> bool;
}

impl<F: Fn(&HitObject, f64) -> bool> HitPolicy for F {
    fn is_hittable(&self, object: &HitObject, time: f64) -> bool {
        self(object, time)
    }
}

pub struct Unrestricted;

impl HitPolicy for Unrestricted {
    fn is_hittable(&self, _object: &HitObject, _time: f64) -> bool {
        true
    }
}

/// Only the earliest unjudged object can be hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteLock {
    earliest_idle: Option<ObjectId>,
}

impl NoteLock {
    pub fn from_objects<'a>(objects: impl IntoIterator<Item = &'a HitObject>) -> Self {
        let earliest_idle = objects
            .into_iter()
            .filter(|x| !x.is_judged())
            .min_by(|a, b| {
                a.start_time
                    .total_cmp(&b.start_time)
                    .then(a.id.cmp(&b.id))
            })
            .map(|x| x.id);

        Self { earliest_idle }
    }
}

impl HitPolicy for NoteLock {
    fn is_hittable(&self, object: &HitObject, _time: f64) -> bool {
        match self.earliest_idle {
            Some(id) => id == object.id,
            None => true,
        }
    }
}

/// Judges hit objects. Holds no per-object state,
/// objects own their judgement once it's written.
#[derive(Debug, Clone)]
pub struct Judge {
    strategy: JudgementStrategy,
    circle_radius: f64,
}

impl Judge {
    pub fn new(strategy: JudgementStrategy, circle_radius: f64) -> Self {
        Self {
            strategy,
            circle_radius,
        }
    }

    pub fn strategy(&self) -> JudgementStrategy {
        self.strategy
    }

    pub fn circle_radius(&self) -> f64 {
        self.circle_radius
    }

    /// Evaluates `object` at `time`.
    ///
    /// # Panics
    /// If `time` is NaN or negative
    pub fn evaluate(
        &self,
        object: &HitObject,
        time: f64,
        trigger: Trigger,
        policy: &dyn HitPolicy,
    ) -> Evaluation {
        assert!(!time.is_nan(), "evaluating {:?} at NaN time", object.id);
        assert!(time >= 0.0, "evaluating {:?} at negative time {time}", object.id);

        if object.is_judged() {
            return Evaluation::Settled(object.state());
        }

        let offset = object.time_offset(time);

        if self.strategy == JudgementStrategy::Auto
        && trigger == Trigger::Poll
        && offset >= 0.0
        && object.hit_window.can_be_hit(offset)
        && policy.is_hittable(object, time) {
            return Evaluation::Terminal(
                JudgementResult::hit(object.id, Hit::X300, offset)
            );
        }

        self.evaluate_standard(object, time, offset, trigger, policy)
    }

    fn evaluate_standard(
        &self,
        object: &HitObject,
        time: f64,
        offset: f64,
        trigger: Trigger,
        policy: &dyn HitPolicy,
    ) -> Evaluation {
        if !object.hit_window.can_be_hit(offset) {
            return Evaluation::Terminal(JudgementResult::miss(object.id, offset));
        }

        let pos = match trigger {
            Trigger::Poll => return Evaluation::Idle,
            Trigger::User { pos } => pos,
        };

        if !(distance(pos, object.pos) <= self.circle_radius) {
            return Evaluation::Rejected(RejectReason::OutsideCircle);
        }

        let Some(hit) = object.hit_window.result_for(offset) else {
            tracing::trace!("[{time}] {:?} pressed too early ({offset})", object.id);
            return Evaluation::Rejected(RejectReason::OutsideWindow);
        };

        if !policy.is_hittable(object, time) {
            tracing::trace!("[{time}] {:?} is locked", object.id);
            return Evaluation::Rejected(RejectReason::NotHittable);
        }

        Evaluation::Terminal(JudgementResult::hit(object.id, hit, offset))
    }
}
