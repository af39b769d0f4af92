/// Durations are in milliseconds
#[derive(Debug, Clone)]
pub struct TimelineConfig {
    /// Fade out of the skinned circle pieces on hit
    pub legacy_fade_duration: f64,
    /// Scale the circle pieces grow to while fading out on hit
    pub hit_scale: f32,
    /// Fade out of the whole object once it's hit or missed
    pub state_fade_duration: f64,
    pub approach_hit_fade_duration: f64,
    /// Portion of preempt the hidden fade out takes
    pub hidden_fade_out_multiplier: f64,
    pub approach_scale: f32,
}

#[derive(Debug, Clone)]
pub struct GameplayConfig {
    pub default_od: f32,
    pub default_ar: f32,
    pub default_cs: f32,
    /// Fixed tick length used by the headless simulation
    pub tick_ms: f64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub timeline: TimelineConfig,
    pub gameplay: GameplayConfig,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            legacy_fade_duration: 240.0,
            hit_scale: 1.4,
            state_fade_duration: 240.0,
            approach_hit_fade_duration: 50.0,
            hidden_fade_out_multiplier: 0.3,
            approach_scale: 4.0,
        }
    }
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            default_od: 5.0,
            default_ar: 5.0,
            default_cs: 5.0,
            tick_ms: 1000.0 / 60.0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeline: TimelineConfig::default(),
            gameplay: GameplayConfig::default(),
        }
    }
}
