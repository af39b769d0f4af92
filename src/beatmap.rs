use std::{io, path::Path};

use cgmath::Vector2;
use rosu_map::{section::hit_objects::HitObjectKind, Beatmap};
use thiserror::Error;

use crate::{
    config::GameplayConfig,
    hit_objects::{hit_window::HitWindow, HitObject, ObjectId, ObjectKind},
    math::{calc_hitcircle_diameter, calculate_preempt_fadein},
};

#[derive(Error, Debug)]
pub enum BeatmapError {
    #[error("reading beatmap: `{0}`")]
    Io(#[from] io::Error),
    #[error("beatmap has no circles or sliders")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Difficulty {
    pub od: f32,
    pub ar: f32,
    pub cs: f32,
}

impl Difficulty {
    pub fn from_config(config: &GameplayConfig) -> Self {
        Self {
            od: config.default_od,
            ar: config.default_ar,
            cs: config.default_cs,
        }
    }

    pub fn hit_window(&self) -> HitWindow {
        HitWindow::from_od(self.od)
    }

    pub fn preempt_fade_in(&self) -> (f64, f64) {
        let (preempt, fade_in) = calculate_preempt_fadein(self.ar);
        (preempt as f64, fade_in as f64)
    }

    pub fn circle_radius(&self) -> f64 {
        calc_hitcircle_diameter(self.cs) as f64 / 2.0
    }
}

/// Judgeable part of a beatmap
#[derive(Debug, Clone)]
pub struct LoadedBeatmap {
    pub difficulty: Difficulty,
    /// Sorted by start time, ids match positions
    pub objects: Vec<HitObject>,
}

impl LoadedBeatmap {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BeatmapError> {
        let beatmap = Beatmap::from_path(path)?;
        Self::from_rosu(&beatmap)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BeatmapError> {
        let beatmap = Beatmap::from_bytes(bytes)?;
        Self::from_rosu(&beatmap)
    }

    /// Circles and slider heads become hit objects,
    /// spinners and holds only break the combo
    pub fn from_rosu(beatmap: &Beatmap) -> Result<Self, BeatmapError> {
        let difficulty = Difficulty {
            od: beatmap.overall_difficulty,
            ar: beatmap.approach_rate,
            cs: beatmap.circle_size,
        };

        let hit_window = difficulty.hit_window();
        let (preempt, fade_in) = difficulty.preempt_fade_in();

        let mut objects = Vec::with_capacity(beatmap.hit_objects.len());

        let mut combo_index = 0;
        let mut index_in_combo = 0;
        let mut force_new_combo = true;

        for object in &beatmap.hit_objects {
            let (kind, pos, new_combo, combo_offset) = match &object.kind {
                HitObjectKind::Circle(circle) => {
                    (ObjectKind::Circle, circle.pos, circle.new_combo, circle.combo_offset)
                },
                HitObjectKind::Slider(slider) => {
                    (ObjectKind::SliderHead, slider.pos, slider.new_combo, slider.combo_offset)
                },
                _ => {
                    force_new_combo = true;
                    continue;
                },
            };

            if objects.is_empty() {
                combo_index = combo_offset.max(0) as usize;
                index_in_combo = 0;
            } else if new_combo || force_new_combo {
                combo_index += 1 + combo_offset.max(0) as usize;
                index_in_combo = 0;
            } else {
                index_in_combo += 1;
            }

            force_new_combo = false;

            let id = ObjectId(objects.len() as u32);

            objects.push(
                HitObject::new(
                    id,
                    kind,
                    object.start_time,
                    Vector2::new(pos.x as f64, pos.y as f64),
                    hit_window,
                )
                .with_timing(preempt, fade_in)
                .with_combo(combo_index, index_in_combo),
            );
        }

        if objects.is_empty() {
            return Err(BeatmapError::Empty);
        }

        tracing::info!(
            "Loaded {} objects (OD {}, AR {}, CS {})",
            objects.len(), difficulty.od, difficulty.ar, difficulty.cs
        );

        Ok(Self {
            difficulty,
            objects,
        })
    }
}
