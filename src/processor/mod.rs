use cgmath::Vector2;
use replay_log::{InputLog, PressTarget};

use crate::{
    beatmap::LoadedBeatmap,
    broadcast::ResultBroadcast,
    circle_piece::{LegacyMainCirclePiece, PrefixCache},
    config::Config,
    hit_objects::{HitObject, ObjectId},
    judgement::{Evaluation, HitPolicy, Judge, JudgementResult, NoteLock, Trigger},
    math::distance,
    mods::ModifierSet,
    osu_input::{KeyboardState, OsuInput},
    skin_manager::SkinSource,
    timeline::TimelineDriver,
};

pub mod replay_log;

/// Where an object is in its life on screen.
/// Unrelated to its judgement, an expired object is always judged.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Not visible yet
    #[default]
    Pending,
    Alive,
    /// Judged and every transform is finished
    Expired,
}

/// Responsible for
/// 1. Handling inputs
/// 2. Assigning hit results based on recorded inputs
/// 3. Handing results to subscribers and to the timeline driver
pub struct GameplayProcessor {
    /// Sorted by start time, ids match positions
    objects: Vec<HitObject>,
    lifetimes: Vec<Lifetime>,

    judge: Judge,
    note_lock: bool,
    guard: Option<Box<dyn HitPolicy>>,

    driver: TimelineDriver,
    broadcast: ResultBroadcast,

    input_log: InputLog,
    last_cursor_pos: Vector2<f64>,
    last_time: Option<f64>,
}

impl GameplayProcessor {
    pub fn new(
        objects: Vec<HitObject>,
        mods: &ModifierSet,
        config: &Config,
        circle_radius: f64,
    ) -> Self {
        for (i, object) in objects.iter().enumerate() {
            assert_eq!(object.id.index(), i, "object ids must match their position");
        }

        debug_assert!(
            objects.windows(2).all(|x| x[0].start_time <= x[1].start_time),
            "objects must be sorted by start time"
        );

        let mut driver = TimelineDriver::new(config.timeline.clone(), mods.clone());
        for object in &objects {
            driver.load(object);
        }

        tracing::info!("Processing {} objects with {mods}", objects.len());

        Self {
            lifetimes: vec![Lifetime::Pending; objects.len()],
            objects,
            judge: Judge::new(mods.strategy(), circle_radius),
            note_lock: mods.note_lock(),
            guard: None,
            driver,
            broadcast: ResultBroadcast::default(),
            input_log: InputLog::default(),
            last_cursor_pos: Vector2::new(0.0, 0.0),
            last_time: None,
        }
    }

    pub fn from_beatmap(beatmap: LoadedBeatmap, mods: &ModifierSet, config: &Config) -> Self {
        let radius = beatmap.difficulty.circle_radius();
        Self::new(beatmap.objects, mods, config, radius)
    }

    /// Extra hittability check on top of note lock
    pub fn set_hit_guard(&mut self, guard: impl HitPolicy + 'static) {
        self.guard = Some(Box::new(guard));
    }

    pub fn objects(&self) -> &[HitObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&HitObject> {
        self.objects.get(id.index())
    }

    pub fn lifetime(&self, id: ObjectId) -> Option<Lifetime> {
        self.lifetimes.get(id.index()).copied()
    }

    pub fn judge(&self) -> &Judge {
        &self.judge
    }

    pub fn driver(&self) -> &TimelineDriver {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut TimelineDriver {
        &mut self.driver
    }

    pub fn broadcast_mut(&mut self) -> &mut ResultBroadcast {
        &mut self.broadcast
    }

    /// Creates a skinned circle piece for every object and hooks it into the driver
    pub fn attach_circle_pieces(
        &mut self,
        skin: &dyn SkinSource,
        cache: &mut PrefixCache,
    ) -> Vec<LegacyMainCirclePiece> {
        let config = self.driver.config().clone();

        self.objects
            .iter()
            .map(|object| {
                let piece = LegacyMainCirclePiece::new(object, skin, cache, &config, true);
                piece.attach(&mut self.driver, object);
                piece
            })
            .collect()
    }

    pub fn set_cursor_pos(&mut self, pos: Vector2<f64>) {
        self.last_cursor_pos = pos;
    }

    pub fn store_cursor_moved(&mut self, ts: f64, pos: Vector2<f64>) {
        self.set_cursor_pos(pos);

        let keys = self.input_log
            .last_input()
            .map(|x| x.keys)
            .unwrap_or_default();

        self.input_log.store_input(OsuInput {
            ts,
            pos,
            keys,
            hold: keys,
        });
    }

    /// This function treats KeyboardState with reversed meaning
    /// `true` means that particular key is released
    pub fn store_keyboard_released(&mut self, ts: f64, state: KeyboardState) {
        let Some(last) = self.input_log.last_input() else {
            tracing::warn!("Trying to store release without previous input");
            return;
        };

        let last = last.keys;

        self.input_log.store_input(OsuInput {
            ts,
            pos: self.last_cursor_pos,
            keys: KeyboardState {
                k1: last.k1 && !state.k1,
                k2: last.k2 && !state.k2,
                m1: last.m1 && !state.m1,
                m2: last.m2 && !state.m2,
            },
            hold: last,
        });
    }

    pub fn store_keyboard_pressed(&mut self, ts: f64, state: KeyboardState) {
        let last = self.input_log
            .last_input()
            .map(|x| x.keys)
            .unwrap_or_default();

        self.input_log.store_input(OsuInput {
            ts,
            pos: self.last_cursor_pos,
            keys: KeyboardState {
                k1: last.k1 || state.k1,
                k2: last.k2 || state.k2,
                m1: last.m1 || state.m1,
                m2: last.m2 || state.m2,
            },
            hold: last,
        });
    }

    /// Advances gameplay to `time`, which is allowed to go backwards.
    ///
    /// # Panics
    /// If `time` is NaN
    pub fn update(&mut self, time: f64) {
        let _span = tracy_client::span!("processor update");

        assert!(!time.is_nan(), "updating processor with NaN time");

        if self.last_time.is_some_and(|last| time < last) {
            self.rewind(time);
        }

        self.last_time = Some(time);
        self.refresh_lifetimes(time);

        for frame in self.input_log.drain_until(time) {
            let input = self.input_log.input(frame);
            let (ts, pos) = (input.ts.max(0.0), input.pos);
            let presses = input.new_presses().count();

            // Misses which happened before this input
            self.poll(ts);

            for press in 0..presses {
                self.handle_press(frame, press, ts, pos);
            }
        }

        self.poll(time.max(0.0));
        self.expire(time);
    }

    /// Idle objects which didn't appear yet at `time` go back to pending,
    /// judged objects stay judged
    fn rewind(&mut self, time: f64) {
        tracing::debug!("Rewinding to {time}");

        self.input_log.rewind_to(time);

        for (object, lifetime) in self.objects.iter().zip(self.lifetimes.iter_mut()) {
            match *lifetime {
                Lifetime::Alive if !object.is_judged() && time < object.appear_time() => {
                    *lifetime = Lifetime::Pending;
                },
                Lifetime::Expired => {
                    if self.driver.end_time(object.id).is_some_and(|end| time < end) {
                        *lifetime = Lifetime::Alive;
                    }
                },
                _ => {},
            }
        }
    }

    fn refresh_lifetimes(&mut self, time: f64) {
        for (object, lifetime) in self.objects.iter().zip(self.lifetimes.iter_mut()) {
            if *lifetime == Lifetime::Pending && time >= object.appear_time() {
                *lifetime = Lifetime::Alive;
            }
        }
    }

    fn expire(&mut self, time: f64) {
        for (object, lifetime) in self.objects.iter().zip(self.lifetimes.iter_mut()) {
            if *lifetime != Lifetime::Alive || !object.is_judged() {
                continue;
            }

            if self.driver.end_time(object.id).map_or(true, |end| time >= end) {
                *lifetime = Lifetime::Expired;
            }
        }
    }

    fn is_active(&self, index: usize) -> bool {
        self.lifetimes[index] == Lifetime::Alive && !self.objects[index].is_judged()
    }

    fn poll(&mut self, time: f64) {
        for i in 0..self.objects.len() {
            if self.is_active(i) {
                self.evaluate(i, time, Trigger::Poll);
            }
        }
    }

    /// A press replayed after a rewind only goes to the object it was
    /// aimed at the first time, and only if that one is still waiting
    fn handle_press(&mut self, frame: usize, press: usize, time: f64, pos: Vector2<f64>) {
        match self.input_log.press_target(frame, press) {
            None => {
                let target = self.press(time, pos);
                self.input_log.record_press(frame, target);
            },
            Some(PressTarget::Object(id)) if self.is_active(id.index()) => {
                self.evaluate(id.index(), time, Trigger::User { pos });
            },
            Some(target) => tracing::trace!("[{time}] Skipping spent press ({target:?})"),
        }
    }

    /// Press goes to the earliest object under the cursor
    fn press(&mut self, time: f64, pos: Vector2<f64>) -> PressTarget {
        let radius = self.judge.circle_radius();

        let target = (0..self.objects.len())
            .find(|&i| self.is_active(i) && distance(pos, self.objects[i].pos) <= radius);

        match target {
            Some(i) => {
                self.evaluate(i, time, Trigger::User { pos });
                PressTarget::Object(self.objects[i].id)
            },
            None => {
                tracing::trace!("[{time}] Press at {pos:?} hit nothing");
                PressTarget::Nothing
            },
        }
    }

    fn evaluate(&mut self, index: usize, time: f64, trigger: Trigger) -> Evaluation {
        let evaluation = {
            let lock = self.note_lock.then(|| {
                NoteLock::from_objects(
                    self.objects
                        .iter()
                        .zip(&self.lifetimes)
                        .filter(|(_, lifetime)| **lifetime == Lifetime::Alive)
                        .map(|(object, _)| object)
                )
            });

            let guard = self.guard.as_deref();

            let policy = |object: &HitObject, time: f64| {
                lock.map_or(true, |x| x.is_hittable(object, time))
                    && guard.map_or(true, |x| x.is_hittable(object, time))
            };

            self.judge.evaluate(&self.objects[index], time, trigger, &policy)
        };

        if let Evaluation::Terminal(result) = evaluation {
            self.apply_result(index, result);
        }

        evaluation
    }

    fn apply_result(&mut self, index: usize, result: JudgementResult) {
        self.objects[index].apply_result(result);

        let object = &self.objects[index];

        tracing::debug!(
            "[{:.0}] {:?} {:?} ({:+.0}ms)",
            object.start_time + result.time_offset, object.id, result.hit, result.time_offset
        );

        self.broadcast.broadcast(object, &result);
        self.driver.on_result(object, &result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit_objects::{hit_window::HitWindow, ObjectKind};

    fn circles(times: &[f64]) -> Vec<HitObject> {
        times
            .iter()
            .enumerate()
            .map(|(i, time)| {
                HitObject::new(
                    ObjectId(i as u32),
                    ObjectKind::Circle,
                    *time,
                    Vector2::new(250.0, 250.0),
                    HitWindow::from_od(5.0),
                )
            })
            .collect()
    }

    #[test]
    fn test_lifetimes() {
        let mut processor = GameplayProcessor::new(circles(&[1500.0]), &ModifierSet::none(), &Config::default(), 32.0);
        let id = ObjectId(0);

        processor.update(100.0);
        assert_eq!(processor.lifetime(id), Some(Lifetime::Pending));

        processor.update(300.0);
        assert_eq!(processor.lifetime(id), Some(Lifetime::Alive));

        processor.update(1650.0);
        assert!(processor.object(id).unwrap().is_judged());
        assert_eq!(processor.lifetime(id), Some(Lifetime::Alive));

        processor.update(2000.0);
        assert_eq!(processor.lifetime(id), Some(Lifetime::Expired));
    }

    #[test]
    fn test_press_hits_earliest_under_cursor() {
        let mut processor = GameplayProcessor::new(circles(&[1000.0, 1100.0]), &ModifierSet::none(), &Config::default(), 32.0);

        processor.store_cursor_moved(900.0, Vector2::new(250.0, 250.0));
        processor.store_keyboard_pressed(1050.0, KeyboardState::k1());
        processor.update(1060.0);

        let objects = processor.objects();
        assert_eq!(objects[0].result().map(|x| x.time_offset), Some(50.0));
        assert!(!objects[1].is_judged());
    }

    #[test]
    fn test_held_key_does_not_hit_twice() {
        let mut processor = GameplayProcessor::new(circles(&[1000.0, 1100.0]), &ModifierSet::none(), &Config::default(), 32.0);

        processor.store_cursor_moved(900.0, Vector2::new(250.0, 250.0));
        processor.store_keyboard_pressed(1000.0, KeyboardState::k1());
        processor.store_cursor_moved(1100.0, Vector2::new(250.0, 250.0));
        processor.update(1120.0);

        assert!(processor.objects()[0].is_judged());
        assert!(!processor.objects()[1].is_judged());
    }
}
