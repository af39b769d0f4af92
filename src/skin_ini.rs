use ini::Ini;
use thiserror::Error;
use std::io;

use crate::rgb::Rgba;

/// Version skins without a skin.ini are treated as
pub const LATEST_VERSION: f32 = 2.7;

#[derive(Error, Debug)]
pub enum SkinParseError {
    #[error("parsing .ini file: `{0}`")]
    ParseError(#[from] ini::Error),
    #[error("invalid value `{value}` for `{field}`")]
    InvalidValue {
        field: &'static str,
        value: String,
    },
}

impl SkinParseError {
    pub fn invalid(field: &'static str, value: &str) -> Self {
        Self::InvalidValue {
            field,
            value: value.to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Colours {
    pub combo_colors: Vec<Rgba>,
}

#[derive(Debug, Clone)]
pub struct General {
    pub name: String,
    pub author: String,
    pub version: f32,
    pub hit_circle_overlay_above_number: bool,
}

#[derive(Debug, Clone)]
pub struct SkinIni {
    pub general: General,
    pub colours: Colours,
}

fn parse_bool(field: &'static str, value: &str) -> Result<bool, SkinParseError> {
    match value.trim() {
        "1" | "true" | "True" => Ok(true),
        "0" | "false" | "False" => Ok(false),
        _ => Err(SkinParseError::invalid(field, value)),
    }
}

fn parse_version(value: &str) -> Result<f32, SkinParseError> {
    let value = value.trim();

    if value.eq_ignore_ascii_case("latest") {
        return Ok(LATEST_VERSION);
    }

    value.parse().map_err(|_| SkinParseError::invalid("Version", value))
}

impl SkinIni {
    pub fn parse(bytes: &[u8]) -> Result<Self, SkinParseError> {
        let ini = Ini::read_from(&mut io::Cursor::new(bytes))?;

        // General
        let name = ini.get_from(Some("General"), "Name").unwrap_or("Unknown");
        let author = ini.get_from(Some("General"), "Author").unwrap_or("Unknown");

        // Present skin.ini without a version means a really old skin
        let version = match ini.get_from(Some("General"), "Version") {
            Some(v) => parse_version(v)?,
            None => 1.0,
        };

        let hit_circle_overlay_above_number = ini
            .get_from(Some("General"), "HitCircleOverlayAboveNumber")
            .or_else(|| ini.get_from(Some("General"), "HitCircleOverlayAboveNumer"))
            .map(|x| parse_bool("HitCircleOverlayAboveNumber", x))
            .transpose()?
            .unwrap_or(true);

        let general = General {
            name: name.to_owned(),
            author: author.to_owned(),
            version,
            hit_circle_overlay_above_number,
        };

        // Colours
        let mut colors = Vec::new();

        for i in 1..=8 {
            let key = format!("Combo{i}");

            if let Some(c) = ini.get_from(Some("Colours"), &key) {
                match Rgba::parse(c) {
                    Some(c) => colors.push(c),
                    None => tracing::warn!("Ignoring invalid colour {key}: {c}"),
                }
            }
        }

        if colors.is_empty() {
            colors = Colours::default().combo_colors;
        }

        Ok(Self {
            general,
            colours: Colours { combo_colors: colors },
        })
    }

    pub fn combo_colour(&self, combo_index: usize) -> Rgba {
        let colours = &self.colours.combo_colors;

        match colours.len() {
            0 => Rgba::default(),
            len => colours[combo_index % len],
        }
    }
}

impl Default for Colours {
    fn default() -> Self {
        Self {
            combo_colors: vec![
                Rgba::rgb(255, 192, 0),
                Rgba::rgb(0, 202, 0),
                Rgba::rgb(18, 124, 255),
                Rgba::rgb(242, 24, 57),
            ],
        }
    }
}

impl Default for SkinIni {
    fn default() -> Self {
        let general = General {
            name: "Default".to_owned(),
            author: "486c".to_owned(),
            version: LATEST_VERSION,
            hit_circle_overlay_above_number: true,
        };

        Self {
            colours: Colours::default(),
            general,
        }
    }
}
