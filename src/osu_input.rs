use cgmath::Vector2;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct KeyboardState {
    pub k1: bool,
    pub k2: bool,
    pub m1: bool,
    pub m2: bool,
}

impl KeyboardState {
    pub fn is_key_hit(&self) -> bool {
        self.k1 || self.k2 || self.m1 || self.m2
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn k1() -> Self {
        Self {
            k1: true,
            ..Self::default()
        }
    }

    pub fn k2() -> Self {
        Self {
            k2: true,
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        [self.k1, self.k2, self.m1, self.m2]
            .into_iter()
            .filter(|x| *x)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OsuInput {
    /// A timestamp relative to the beginning of the map
    pub ts: f64,

    /// Cursors position
    pub pos: Vector2<f64>,

    /// Keys pressed
    pub keys: KeyboardState,

    /// Keys which were already down on the previous input
    pub hold: KeyboardState,
}

impl OsuInput {
    /// Keys which went down on this input
    pub fn new_presses(&self) -> KeyboardState {
        KeyboardState {
            k1: self.keys.k1 && !self.hold.k1,
            k2: self.keys.k2 && !self.hold.k2,
            m1: self.keys.m1 && !self.hold.m1,
            m2: self.keys.m2 && !self.hold.m2,
        }
    }

    /// Returns only if there's input which is not currently held
    pub fn is_key_hit_no_hold(&self) -> bool {
        self.new_presses().is_key_hit()
    }
}
