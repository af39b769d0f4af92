use std::fmt;

use smallvec::{smallvec, SmallVec};
use thiserror::Error;

use crate::{
    config::TimelineConfig,
    hit_objects::{ArmedState, HitObject},
    judgement::JudgementStrategy,
    timeline::transform::{Easing, Plan, Step, Target},
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ModParseError {
    #[error("unknown mod acronym `{0}`")]
    Unknown(String),
    #[error("mod `{0}` selected more than once")]
    Duplicate(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mod {
    Classic {
        /// Missed circles turn transparent as soon as the miss is known
        fade_hit_circle_early: bool,
        note_lock: bool,
    },
    Hidden {
        /// Leave the circles alone and only hide approach circles
        only_fade_approach_circles: bool,
    },
    Autoplay,
}

impl Mod {
    pub const CLASSIC: Mod = Mod::Classic {
        fade_hit_circle_early: true,
        note_lock: true,
    };

    pub const HIDDEN: Mod = Mod::Hidden {
        only_fade_approach_circles: false,
    };

    pub fn acronym(&self) -> &'static str {
        match self {
            Mod::Classic { .. } => "CL",
            Mod::Hidden { .. } => "HD",
            Mod::Autoplay => "AT",
        }
    }

    pub fn from_acronym(acronym: &str) -> Result<Self, ModParseError> {
        match acronym.to_ascii_uppercase().as_str() {
            "CL" => Ok(Self::CLASSIC),
            "HD" => Ok(Self::HIDDEN),
            "AT" => Ok(Mod::Autoplay),
            _ => Err(ModParseError::Unknown(acronym.to_owned())),
        }
    }
}

/// Lets a modifier replace the default transforms of a target.
/// Returning `None` means the modifier doesn't care about that target.
pub trait TransformPolicy {
    fn initial_override(
        &self,
        _target: Target,
        _object: &HitObject,
        _config: &TimelineConfig,
    ) -> Option<Plan> {
        None
    }

    fn state_override(
        &self,
        _target: Target,
        _state: ArmedState,
        _object: &HitObject,
        _config: &TimelineConfig,
    ) -> Option<Plan> {
        None
    }
}

impl TransformPolicy for Mod {
    fn initial_override(
        &self,
        target: Target,
        object: &HitObject,
        config: &TimelineConfig,
    ) -> Option<Plan> {
        let Mod::Hidden { only_fade_approach_circles } = *self else {
            return None;
        };

        match target {
            Target::ApproachCircle => Some(smallvec![Step::hide()]),
            Target::Root if !only_fade_approach_circles => {
                let fade_out = object.preempt * config.hidden_fade_out_multiplier;

                Some(smallvec![
                    Step::fade_in_from_zero(0.0, object.fade_in),
                    Step::fade_out(object.fade_in, fade_out, Easing::None),
                ])
            },
            _ => None,
        }
    }

    fn state_override(
        &self,
        target: Target,
        state: ArmedState,
        _object: &HitObject,
        _config: &TimelineConfig,
    ) -> Option<Plan> {
        if state != ArmedState::Miss {
            return None;
        }

        match (self, target) {
            (Mod::Classic { fade_hit_circle_early: true, .. }, Target::Root | Target::ApproachCircle)
            | (Mod::Hidden { .. }, Target::ApproachCircle) => Some(smallvec![Step::hide()]),
            _ => None,
        }
    }
}

/// Which modifier wins when several override the same target
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Precedence {
    #[default]
    FirstMatch,
    LastMatch,
}

/// Modifiers selected for a play, fixed once gameplay starts
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ModifierSet {
    mods: SmallVec<[Mod; 4]>,
    precedence: Precedence,
}

impl ModifierSet {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(mods: impl IntoIterator<Item = Mod>) -> Result<Self, ModParseError> {
        let mut out: SmallVec<[Mod; 4]> = SmallVec::new();

        for m in mods {
            if out.iter().any(|x| x.acronym() == m.acronym()) {
                return Err(ModParseError::Duplicate(m.acronym()));
            }

            out.push(m);
        }

        Ok(Self {
            mods: out,
            precedence: Precedence::default(),
        })
    }

    /// Parses acronyms like `HDCL`, `+HD,CL` or `hd cl`
    pub fn parse(s: &str) -> Result<Self, ModParseError> {
        let letters: Vec<char> = s
            .chars()
            .filter(|c| !matches!(c, '+' | ',' | ' ' | '|'))
            .collect();

        if letters.len() % 2 != 0 {
            return Err(ModParseError::Unknown(s.to_owned()));
        }

        let mods = letters
            .chunks(2)
            .map(|x| Mod::from_acronym(&x.iter().collect::<String>()))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(mods)
    }

    pub fn with_precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mod> {
        self.mods.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }

    pub fn strategy(&self) -> JudgementStrategy {
        if self.mods.contains(&Mod::Autoplay) {
            JudgementStrategy::Auto
        } else {
            JudgementStrategy::Standard
        }
    }

    pub fn note_lock(&self) -> bool {
        self.mods
            .iter()
            .any(|x| matches!(x, Mod::Classic { note_lock: true, .. }))
    }

    pub fn initial_override(
        &self,
        target: Target,
        object: &HitObject,
        config: &TimelineConfig,
    ) -> Option<Plan> {
        self.find_map(|m| m.initial_override(target, object, config))
    }

    pub fn state_override(
        &self,
        target: Target,
        state: ArmedState,
        object: &HitObject,
        config: &TimelineConfig,
    ) -> Option<Plan> {
        self.find_map(|m| m.state_override(target, state, object, config))
    }

    fn find_map(&self, f: impl FnMut(&Mod) -> Option<Plan>) -> Option<Plan> {
        match self.precedence {
            Precedence::FirstMatch => self.mods.iter().find_map(f),
            Precedence::LastMatch => self.mods.iter().rev().find_map(f),
        }
    }
}

impl fmt::Display for ModifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mods.is_empty() {
            return f.write_str("NM");
        }

        for m in &self.mods {
            f.write_str(m.acronym())?;
        }

        Ok(())
    }
}
