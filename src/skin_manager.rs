use std::{collections::HashMap, path::{Path, PathBuf}};

use smallvec::SmallVec;

use crate::skin_ini::SkinIni;

/// Upper bound for `name-N.png` animation frames
pub const MAX_ANIMATION_FRAMES: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct SkinTexture {
    pub name: String,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// `2.0` for `@2x` textures
    pub scale: f32,
}

pub type Animation = SmallVec<[SkinTexture; 1]>;

/// Anything able to resolve skin elements by name
pub trait SkinSource {
    fn texture(&self, name: &str) -> Option<SkinTexture>;

    fn ini(&self) -> &SkinIni;

    /// Looks up `name-0`, `name-1`, ... frames first,
    /// falls back to a single `name` texture
    fn animation(&self, name: &str) -> Option<Animation> {
        collect_animation(name, |x| self.texture(x))
    }

    /// Same as [`SkinSource::animation`], but only from wherever `base` was found.
    /// Elements drawn on top of each other never come from different skins.
    fn sibling_animation(&self, _base: &SkinTexture, name: &str) -> Option<Animation> {
        self.animation(name)
    }
}

fn collect_animation(name: &str, lookup: impl Fn(&str) -> Option<SkinTexture>) -> Option<Animation> {
    let frames: Animation = (0..MAX_ANIMATION_FRAMES)
        .map_while(|i| lookup(&format!("{name}-{i}")))
        .collect();

    if !frames.is_empty() {
        return Some(frames);
    }

    lookup(name).map(|x| smallvec::smallvec![x])
}

fn find_texture(dir: &Path, name: &str) -> Option<SkinTexture> {
    let candidates = [(format!("{name}@2x.png"), 2.0), (format!("{name}.png"), 1.0)];

    for (file, scale) in candidates {
        let path = dir.join(file);

        if !path.exists() {
            continue;
        }

        match image::image_dimensions(&path) {
            Ok((width, height)) => {
                return Some(SkinTexture {
                    name: name.to_owned(),
                    path,
                    width,
                    height,
                    scale,
                })
            },
            Err(e) => tracing::warn!("Failed to read {}: {e}", path.display()),
        }
    }

    None
}

fn read_skin_ini(path: &Path) -> SkinIni {
    let path = if path.join("skin.ini").exists() {
        path.join("skin.ini")
    } else if path.join("Skin.ini").exists() {
        path.join("Skin.ini")
    } else {
        // No skin.ini at all is treated as a modern skin
        return SkinIni::default();
    };

    match std::fs::read(&path) {
        Ok(bytes) => SkinIni::parse(&bytes)
            .inspect_err(|e| tracing::warn!("Failed to deserialize skin.ini: {e}"))
            .unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Failed to read {}: {e}", path.display());
            SkinIni::default()
        },
    }
}

/// Handles loading a skin & skin settings from an osu skin directory.
/// If requested texture is not found will fallback to the
/// default skin directory
pub struct SkinManager {
    root: PathBuf,
    fallback: Option<PathBuf>,
    ini: SkinIni,
}

impl SkinManager {
    pub fn from_path(path: impl AsRef<Path>, fallback: Option<PathBuf>) -> Self {
        let root = path.as_ref().to_path_buf();
        let ini = read_skin_ini(&root);

        tracing::info!(
            "Loaded skin {} by {} (version {})",
            ini.general.name, ini.general.author, ini.general.version
        );

        Self {
            root,
            fallback,
            ini,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SkinSource for SkinManager {
    fn texture(&self, name: &str) -> Option<SkinTexture> {
        if let Some(texture) = find_texture(&self.root, name) {
            return Some(texture);
        }

        let fallback = self.fallback.as_deref()?;
        let texture = find_texture(fallback, name);

        if texture.is_some() {
            tracing::debug!("Using fallback texture for {name}");
        }

        texture
    }

    fn ini(&self) -> &SkinIni {
        &self.ini
    }

    fn sibling_animation(&self, base: &SkinTexture, name: &str) -> Option<Animation> {
        let Some(dir) = base.path.parent() else {
            return self.animation(name);
        };

        collect_animation(name, |x| find_texture(dir, x))
    }
}

/// Skin living in memory, used when no skin directory is provided
#[derive(Debug, Clone, Default)]
pub struct StaticSkin {
    textures: HashMap<String, SkinTexture>,
    ini: SkinIni,
}

impl StaticSkin {
    pub fn new(ini: SkinIni) -> Self {
        Self {
            textures: HashMap::new(),
            ini,
        }
    }

    /// Hit circle elements every skin is expected to have
    pub fn builtin() -> Self {
        let mut skin = Self::default();

        for name in ["hitcircle", "hitcircleoverlay", "approachcircle"] {
            skin.insert(name, 128, 128);
        }

        for i in 0..10 {
            skin.insert(&format!("default-{i}"), 35, 52);
        }

        skin
    }

    pub fn ini_mut(&mut self) -> &mut SkinIni {
        &mut self.ini
    }

    pub fn insert(&mut self, name: &str, width: u32, height: u32) -> &mut Self {
        self.textures.insert(
            name.to_owned(),
            SkinTexture {
                name: name.to_owned(),
                path: PathBuf::from(format!("{name}.png")),
                width,
                height,
                scale: 1.0,
            },
        );

        self
    }
}

impl SkinSource for StaticSkin {
    fn texture(&self, name: &str) -> Option<SkinTexture> {
        self.textures.get(name).cloned()
    }

    fn ini(&self) -> &SkinIni {
        &self.ini
    }
}
