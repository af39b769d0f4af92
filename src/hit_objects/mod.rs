pub mod hit_window;

use cgmath::Vector2;
use hit_window::HitWindow;

use crate::judgement::JudgementResult;

/// Index of an object inside the loaded beatmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

impl ObjectId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    X300,
    X100,
    X50,
    MISS,
}

impl Hit {
    pub fn is_hit(self) -> bool {
        self != Hit::MISS
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmedState {
    #[default]
    Idle,
    Hit,
    Miss,
}

impl ArmedState {
    pub fn is_terminal(self) -> bool {
        self != ArmedState::Idle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Circle,
    /// Head circle of a slider, judged like a circle but skinned
    /// with the `sliderstartcircle` textures when the skin has them
    SliderHead,
}

impl ObjectKind {
    pub fn priority_prefix(self) -> Option<&'static str> {
        match self {
            ObjectKind::Circle => None,
            ObjectKind::SliderHead => Some("sliderstartcircle"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HitObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub start_time: f64,
    pub pos: Vector2<f64>,
    pub hit_window: HitWindow,

    /// How long before `start_time` an object appears
    pub preempt: f64,
    pub fade_in: f64,

    pub combo_index: usize,
    pub index_in_combo: usize,

    state: ArmedState,
    result: Option<JudgementResult>,
}

impl HitObject {
    pub fn new(
        id: ObjectId,
        kind: ObjectKind,
        start_time: f64,
        pos: Vector2<f64>,
        hit_window: HitWindow,
    ) -> Self {
        Self {
            id,
            kind,
            start_time,
            pos,
            hit_window,
            preempt: 1200.0,
            fade_in: 800.0,
            combo_index: 0,
            index_in_combo: 0,
            state: ArmedState::Idle,
            result: None,
        }
    }

    pub fn with_timing(mut self, preempt: f64, fade_in: f64) -> Self {
        self.preempt = preempt;
        self.fade_in = fade_in;
        self
    }

    pub fn with_combo(mut self, combo_index: usize, index_in_combo: usize) -> Self {
        self.combo_index = combo_index;
        self.index_in_combo = index_in_combo;
        self
    }

    #[inline]
    pub fn state(&self) -> ArmedState {
        self.state
    }

    #[inline]
    pub fn result(&self) -> Option<&JudgementResult> {
        self.result.as_ref()
    }

    #[inline]
    pub fn is_judged(&self) -> bool {
        self.state.is_terminal()
    }

    #[inline]
    pub fn time_offset(&self, time: f64) -> f64 {
        time - self.start_time
    }

    #[inline]
    pub fn early_bound(&self) -> f64 {
        self.start_time + self.hit_window.early_bound()
    }

    #[inline]
    pub fn late_bound(&self) -> f64 {
        self.start_time + self.hit_window.late_bound()
    }

    /// Time object starts to fade in
    #[inline]
    pub fn appear_time(&self) -> f64 {
        self.start_time - self.preempt
    }

    /// Anchor for all transforms following the judgement
    pub fn hit_state_update_time(&self) -> Option<f64> {
        self.result.map(|r| self.start_time + r.time_offset)
    }

    /// Writes the terminal state, can only happen once per object
    pub fn apply_result(&mut self, result: JudgementResult) {
        assert!(
            !self.state.is_terminal(),
            "object {:?} already judged as {:?}", self.id, self.state
        );
        assert_eq!(result.object_id, self.id, "result applied to a wrong object");

        self.state = if result.is_hit { ArmedState::Hit } else { ArmedState::Miss };
        self.result = Some(result);
    }
}
