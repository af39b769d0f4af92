use crate::{
    config::TimelineConfig,
    hit_objects::{ArmedState, HitObject, ObjectId},
    rgb::Rgba,
    skin_manager::{Animation, SkinSource, SkinTexture},
    timeline::{
        transform::{AbsoluteSequence, Easing, Target},
        HookId, TimelineDriver,
    },
};

pub const DEFAULT_PREFIX: &str = "hitcircle";

/// Skins from this version on only briefly fade the combo number
pub const SHORT_NUMBER_FADE_VERSION: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedPrefix {
    Priority(&'static str),
    Default,
}

impl ResolvedPrefix {
    pub fn as_str(self) -> &'static str {
        match self {
            ResolvedPrefix::Priority(prefix) => prefix,
            ResolvedPrefix::Default => DEFAULT_PREFIX,
        }
    }
}

/// Remembers which prefix every object ended up with,
/// so textures of one circle always come from the same prefix
#[derive(Debug, Default)]
pub struct PrefixCache {
    /// Indexed by [`ObjectId`]
    resolved: Vec<Option<ResolvedPrefix>>,
}

impl PrefixCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Priority prefix is kept only if the skin has its base texture,
    /// otherwise every lookup of the object falls back to `hitcircle`
    pub fn resolve(
        &mut self,
        id: ObjectId,
        priority: Option<&'static str>,
        skin: &dyn SkinSource,
    ) -> ResolvedPrefix {
        let index = id.index();
        if self.resolved.len() <= index {
            self.resolved.resize(index + 1, None);
        }

        if let Some(prefix) = self.resolved[index] {
            return prefix;
        }

        let prefix = match priority {
            Some(prefix) if skin.texture(prefix).is_some() => ResolvedPrefix::Priority(prefix),
            Some(prefix) => {
                tracing::debug!("Skin has no {prefix} texture, using {DEFAULT_PREFIX} for {id:?}");
                ResolvedPrefix::Default
            },
            None => ResolvedPrefix::Default,
        };

        self.resolved[index] = Some(prefix);
        prefix
    }

    pub fn get(&self, id: ObjectId) -> Option<ResolvedPrefix> {
        self.resolved.get(id.index()).copied().flatten()
    }

    pub fn forget(&mut self, id: ObjectId) {
        if let Some(entry) = self.resolved.get_mut(id.index()) {
            *entry = None;
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircleTextures {
    pub prefix: ResolvedPrefix,
    pub base: Option<SkinTexture>,
    /// Missing overlay stays missing, it's never taken from another prefix
    pub overlay: Option<Animation>,
}

impl CircleTextures {
    pub fn load(prefix: ResolvedPrefix, skin: &dyn SkinSource) -> Self {
        let name = prefix.as_str();
        let base = skin.texture(name);
        let overlay_name = format!("{name}overlay");

        // Overlay has to come from the same skin as the base
        let overlay = match &base {
            Some(base) => skin.sibling_animation(base, &overlay_name),
            None => {
                tracing::warn!("Skin is missing {name} texture");
                skin.animation(&overlay_name)
            },
        };

        Self {
            prefix,
            base,
            overlay,
        }
    }
}

/// Classic looking hit circle: base piece, overlay and combo number
#[derive(Debug, Clone)]
pub struct LegacyMainCirclePiece {
    pub object: ObjectId,
    pub textures: CircleTextures,
    /// `None` when the piece is drawn without a number
    pub number: Option<String>,
    pub accent_colour: Rgba,
    pub overlay_above_number: bool,

    skin_version: f32,
    fade_duration: f64,
    hit_scale: f32,
}

impl LegacyMainCirclePiece {
    pub fn new(
        object: &HitObject,
        skin: &dyn SkinSource,
        cache: &mut PrefixCache,
        config: &TimelineConfig,
        has_number: bool,
    ) -> Self {
        let prefix = cache.resolve(object.id, object.kind.priority_prefix(), skin);
        let ini = skin.ini();

        Self {
            object: object.id,
            textures: CircleTextures::load(prefix, skin),
            number: has_number.then(|| (object.index_in_combo + 1).to_string()),
            accent_colour: ini.combo_colour(object.combo_index).disallow_zero_alpha(),
            overlay_above_number: ini.general.hit_circle_overlay_above_number,
            skin_version: ini.general.version,
            fade_duration: config.legacy_fade_duration,
            hit_scale: config.hit_scale,
        }
    }

    /// Schedules hit transforms of the piece's own elements
    pub fn state_hook(&self) -> impl FnMut(&HitObject, ArmedState, &mut AbsoluteSequence) + 'static {
        let has_number = self.number.is_some();
        let short_number_fade = self.skin_version >= SHORT_NUMBER_FADE_VERSION;
        let duration = self.fade_duration;
        let scale = self.hit_scale;

        move |_: &HitObject, state: ArmedState, seq: &mut AbsoluteSequence| {
            if state != ArmedState::Hit {
                return;
            }

            seq.fade_out(Target::CirclePiece, duration, Easing::Out)
                .scale_to(Target::CirclePiece, scale, duration, Easing::Out)
                .fade_out(Target::Overlay, duration, Easing::Out)
                .scale_to(Target::Overlay, scale, duration, Easing::Out);

            if !has_number {
                return;
            }

            if short_number_fade {
                seq.fade_out(Target::Number, duration / 4.0, Easing::Out);
            } else {
                seq.fade_out(Target::Number, duration, Easing::Out)
                    .scale_to(Target::Number, scale, duration, Easing::Out);
            }
        }
    }

    /// Registers the state hook and applies it right away
    /// in case the object is already judged
    pub fn attach(&self, driver: &mut TimelineDriver, object: &HitObject) -> HookId {
        let id = driver.register_hook(object.id, self.state_hook());

        if object.is_judged() {
            driver.apply_custom_state(object, object.state());
        }

        id
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Vector2;

    use super::*;
    use crate::{
        hit_objects::{hit_window::HitWindow, ObjectKind},
        skin_manager::StaticSkin,
    };

    fn slider_head() -> HitObject {
        HitObject::new(
            ObjectId(3),
            ObjectKind::SliderHead,
            500.0,
            Vector2::new(250.0, 250.0),
            HitWindow::from_od(5.0),
        )
    }

    #[test]
    fn test_prefix_falls_back_as_a_whole() {
        let mut skin = StaticSkin::builtin();
        skin.insert("sliderstartcircleoverlay", 128, 128);

        let mut cache = PrefixCache::new();
        let piece = LegacyMainCirclePiece::new(
            &slider_head(), &skin, &mut cache, &TimelineConfig::default(), true
        );

        assert_eq!(piece.textures.prefix, ResolvedPrefix::Default);
        assert_eq!(piece.textures.overlay.unwrap()[0].name, "hitcircleoverlay");
    }

    #[test]
    fn test_priority_overlay_never_mixed() {
        let mut skin = StaticSkin::builtin();
        skin.insert("sliderstartcircle", 128, 128);

        let mut cache = PrefixCache::new();
        let piece = LegacyMainCirclePiece::new(
            &slider_head(), &skin, &mut cache, &TimelineConfig::default(), true
        );

        assert_eq!(piece.textures.prefix, ResolvedPrefix::Priority("sliderstartcircle"));
        assert_eq!(piece.textures.base.unwrap().name, "sliderstartcircle");
        assert!(piece.textures.overlay.is_none());
    }

    #[test]
    fn test_prefix_is_memoised() {
        let mut skin = StaticSkin::builtin();
        skin.insert("sliderstartcircle", 128, 128);

        let mut cache = PrefixCache::new();
        let id = slider_head().id;
        assert_eq!(cache.resolve(id, Some("sliderstartcircle"), &skin), ResolvedPrefix::Priority("sliderstartcircle"));

        // Different skin, same answer until forgotten
        let builtin = StaticSkin::builtin();
        assert_eq!(cache.resolve(id, Some("sliderstartcircle"), &builtin), ResolvedPrefix::Priority("sliderstartcircle"));

        cache.forget(id);
        assert_eq!(cache.get(id), None);
        assert_eq!(cache.resolve(id, Some("sliderstartcircle"), &builtin), ResolvedPrefix::Default);
    }

    #[test]
    fn test_number_and_colour() {
        let skin = StaticSkin::builtin();
        let mut cache = PrefixCache::new();
        let object = slider_head().with_combo(1, 2);

        let piece = LegacyMainCirclePiece::new(&object, &skin, &mut cache, &TimelineConfig::default(), true);
        assert_eq!(piece.number.as_deref(), Some("3"));
        assert_eq!(piece.accent_colour, skin.ini().combo_colour(1));

        let piece = LegacyMainCirclePiece::new(&object, &skin, &mut cache, &TimelineConfig::default(), false);
        assert!(piece.number.is_none());
    }
}
