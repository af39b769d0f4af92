pub mod transform;

use smallvec::{smallvec, SmallVec};
use transform::{AbsoluteSequence, Easing, ObjectTimeline, Plan, Property, Step, Target};

use crate::{
    config::TimelineConfig,
    hit_objects::{ArmedState, HitObject, ObjectId},
    judgement::JudgementResult,
    mods::ModifierSet,
};

/// Targets which have default transforms and can be overridden by mods
const POLICY_TARGETS: [Target; 2] = [Target::Root, Target::ApproachCircle];

pub type StateHook = dyn FnMut(&HitObject, ArmedState, &mut AbsoluteSequence);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u32);

struct HookEntry {
    id: HookId,
    object: ObjectId,
    hook: Box<StateHook>,
}

/// Owns the transforms of every loaded object and schedules them
/// when objects get loaded or judged.
pub struct TimelineDriver {
    config: TimelineConfig,
    mods: ModifierSet,

    /// Indexed by [`ObjectId`]
    timelines: Vec<Option<ObjectTimeline>>,

    hooks: Vec<HookEntry>,
    next_hook: u32,
}

impl TimelineDriver {
    pub fn new(config: TimelineConfig, mods: ModifierSet) -> Self {
        Self {
            config,
            mods,
            timelines: Vec::new(),
            hooks: Vec::new(),
            next_hook: 0,
        }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn mods(&self) -> &ModifierSet {
        &self.mods
    }

    /// Schedules initial transforms, anchored at the time object appears.
    /// Loading an already judged object also restores its state transforms.
    pub fn load(&mut self, object: &HitObject) {
        let index = object.id.index();
        if self.timelines.len() <= index {
            self.timelines.resize_with(index + 1, || None);
        }

        let timeline = self.timelines[index].get_or_insert_with(ObjectTimeline::default);
        timeline.initial.clear();

        let mut seq = AbsoluteSequence::new(object.appear_time(), &mut timeline.initial);

        for target in POLICY_TARGETS {
            let plan = self.mods
                .initial_override(target, object, &self.config)
                .unwrap_or_else(|| default_initial_plan(&self.config, target, object));

            seq.apply_plan(target, &plan);
        }

        if object.is_judged() {
            self.apply_state(object, object.state());
        }
    }

    pub fn is_loaded(&self, id: ObjectId) -> bool {
        self.timeline(id).is_some()
    }

    /// Called once by the processor right after `result` was broadcast
    pub fn on_result(&mut self, object: &HitObject, result: &JudgementResult) {
        debug_assert_eq!(object.result(), Some(result));

        tracing::trace!(
            "{:?} {:?} at {:?}",
            object.id, object.state(), object.hit_state_update_time()
        );

        self.apply_state(object, object.state());
    }

    /// Reapplies state transforms, previously scheduled ones are dropped
    /// so repeated calls don't stack.
    pub fn apply_custom_state(&mut self, object: &HitObject, state: ArmedState) {
        self.apply_state(object, state);
    }

    fn apply_state(&mut self, object: &HitObject, state: ArmedState) {
        let Self { config, mods, timelines, hooks, .. } = self;

        let Some(Some(timeline)) = timelines.get_mut(object.id.index()) else {
            tracing::warn!("Applying state to {:?} which was never loaded", object.id);
            return;
        };

        timeline.state.clear();

        if !state.is_terminal() {
            return;
        }

        let anchor = match object.hit_state_update_time() {
            Some(time) => time,
            None => panic!("{:?} has no judgement to apply {state:?} transforms at", object.id),
        };

        let mut seq = AbsoluteSequence::new(anchor, &mut timeline.state);

        for target in POLICY_TARGETS {
            let plan = mods
                .state_override(target, state, object, config)
                .unwrap_or_else(|| default_state_plan(config, target, state));

            seq.apply_plan(target, &plan);
        }

        for entry in hooks.iter_mut().filter(|x| x.object == object.id) {
            let mut seq = AbsoluteSequence::new(anchor, &mut timeline.state);
            (entry.hook)(object, state, &mut seq);
        }
    }

    /// Registers a hook, called every time state transforms of `object`
    /// are (re)applied
    pub fn register_hook(
        &mut self,
        object: ObjectId,
        hook: impl FnMut(&HitObject, ArmedState, &mut AbsoluteSequence) + 'static,
    ) -> HookId {
        let id = HookId(self.next_hook);
        self.next_hook += 1;

        self.hooks.push(HookEntry {
            id,
            object,
            hook: Box::new(hook),
        });

        id
    }

    pub fn remove_hook(&mut self, id: HookId) -> bool {
        let len = self.hooks.len();
        self.hooks.retain(|x| x.id != id);

        len != self.hooks.len()
    }

    pub fn hook_count(&self, object: ObjectId) -> usize {
        self.hooks.iter().filter(|x| x.object == object).count()
    }

    /// Drops every transform and hook of `object`
    pub fn dispose(&mut self, object: ObjectId) {
        self.hooks.retain(|x| x.object != object);

        if let Some(timeline) = self.timelines.get_mut(object.index()) {
            *timeline = None;
        }
    }

    pub fn timeline(&self, id: ObjectId) -> Option<&ObjectTimeline> {
        self.timelines.get(id.index()).and_then(Option::as_ref)
    }

    pub fn sample(&self, id: ObjectId, target: Target, property: Property, time: f64) -> Option<f32> {
        self.timeline(id).map(|x| x.sample(target, property, time))
    }

    /// Alpha of the whole object, `0.0` for objects which are not loaded
    pub fn opacity(&self, id: ObjectId, time: f64) -> f32 {
        self.sample(id, Target::Root, Property::Alpha, time).unwrap_or(0.0)
    }

    /// Alpha of `target` as it ends up on screen
    pub fn effective_opacity(&self, id: ObjectId, target: Target, time: f64) -> f32 {
        match self.timeline(id) {
            Some(timeline) if target == Target::Root => timeline.sample(target, Property::Alpha, time),
            Some(timeline) => {
                timeline.sample(Target::Root, Property::Alpha, time)
                    * timeline.sample(target, Property::Alpha, time)
            },
            None => 0.0,
        }
    }

    /// Time every transform of `id` is finished
    pub fn end_time(&self, id: ObjectId) -> Option<f64> {
        self.timeline(id).and_then(ObjectTimeline::end_time)
    }
}

fn default_initial_plan(config: &TimelineConfig, target: Target, object: &HitObject) -> Plan {
    match target {
        Target::Root => smallvec![Step::fade_in_from_zero(0.0, object.fade_in)],
        Target::ApproachCircle => smallvec![
            Step::fade_in_from_zero(0.0, (object.fade_in * 2.0).min(object.preempt)),
            Step::scale(config.approach_scale, 1.0, object.preempt),
        ],
        _ => SmallVec::new(),
    }
}

fn default_state_plan(config: &TimelineConfig, target: Target, state: ArmedState) -> Plan {
    match (state, target) {
        (ArmedState::Hit, Target::Root) => smallvec![
            Step::fade_out(0.0, config.state_fade_duration, Easing::Out),
            Step::scale_to(config.hit_scale, config.state_fade_duration, Easing::Out),
        ],
        // Same curve as a hit, no matter how late the miss was detected
        (ArmedState::Miss, Target::Root) => smallvec![
            Step::fade_out(0.0, config.state_fade_duration, Easing::Out)
        ],
        (_, Target::ApproachCircle) => smallvec![
            Step::fade_out(0.0, config.approach_hit_fade_duration, Easing::None)
        ],
        _ => SmallVec::new(),
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use cgmath::Vector2;

    use super::*;
    use crate::hit_objects::{hit_window::HitWindow, Hit, ObjectKind};

    fn circle() -> HitObject {
        HitObject::new(
            ObjectId(0),
            ObjectKind::Circle,
            500.0,
            Vector2::new(250.0, 250.0),
            HitWindow::from_od(5.0),
        )
    }

    #[test]
    fn test_initial_transforms() {
        let mut driver = TimelineDriver::new(TimelineConfig::default(), ModifierSet::none());
        let object = circle();
        driver.load(&object);

        assert_eq!(driver.opacity(object.id, -700.0), 0.0);
        assert_eq!(driver.opacity(object.id, 100.0), 1.0);
        assert_eq!(
            driver.sample(object.id, Target::ApproachCircle, Property::Scale, -700.0),
            Some(4.0)
        );
        assert_eq!(
            driver.sample(object.id, Target::ApproachCircle, Property::Scale, 500.0),
            Some(1.0)
        );
    }

    #[test]
    fn test_default_hit_fade_without_hooks() {
        let mut driver = TimelineDriver::new(TimelineConfig::default(), ModifierSet::none());
        let mut object = circle();
        driver.load(&object);

        object.apply_result(JudgementResult::hit(object.id, Hit::X300, 0.0));
        driver.on_result(&object, object.result().unwrap());

        assert_eq!(driver.opacity(object.id, 500.0), 1.0);
        assert_relative_eq!(driver.opacity(object.id, 620.0), 0.25);
        assert_eq!(driver.opacity(object.id, 740.0), 0.0);

        assert_eq!(driver.sample(object.id, Target::Root, Property::Scale, 500.0), Some(1.0));
        assert_eq!(driver.sample(object.id, Target::Root, Property::Scale, 740.0), Some(1.4));
    }

    #[test]
    fn test_default_miss_uses_hit_curve() {
        let mut driver = TimelineDriver::new(TimelineConfig::default(), ModifierSet::none());
        let mut object = circle();
        driver.load(&object);

        object.apply_result(JudgementResult::miss(object.id, 160.0));
        driver.on_result(&object, object.result().unwrap());

        assert_eq!(driver.opacity(object.id, 660.0), 1.0);
        assert_relative_eq!(driver.opacity(object.id, 780.0), 0.25);
        assert_eq!(driver.opacity(object.id, 900.0), 0.0);

        // Misses don't grow
        assert_eq!(driver.sample(object.id, Target::Root, Property::Scale, 900.0), Some(1.0));
    }

    #[test]
    fn test_not_loaded() {
        let driver = TimelineDriver::new(TimelineConfig::default(), ModifierSet::none());

        assert_eq!(driver.opacity(ObjectId(4), 0.0), 0.0);
        assert!(driver.end_time(ObjectId(4)).is_none());
    }

    #[test]
    fn test_idle_custom_state_clears() {
        let mut driver = TimelineDriver::new(TimelineConfig::default(), ModifierSet::none());
        let mut object = circle();
        driver.load(&object);

        object.apply_result(JudgementResult::miss(object.id, 160.0));
        driver.on_result(&object, object.result().unwrap());
        assert!(!driver.timeline(object.id).unwrap().state().is_empty());

        driver.apply_custom_state(&object, ArmedState::Idle);
        assert!(driver.timeline(object.id).unwrap().state().is_empty());
    }

    #[test]
    fn test_dispose() {
        let mut driver = TimelineDriver::new(TimelineConfig::default(), ModifierSet::none());
        let object = circle();
        driver.load(&object);
        driver.register_hook(object.id, |_: &HitObject, _: ArmedState, _: &mut AbsoluteSequence| {});

        assert_eq!(driver.hook_count(object.id), 1);

        driver.dispose(object.id);

        assert_eq!(driver.hook_count(object.id), 0);
        assert!(!driver.is_loaded(object.id));
    }
}
