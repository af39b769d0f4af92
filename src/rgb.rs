use cgmath::Vector4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rgba {
    inner: Vector4<u8>,
}

macro_rules! parse_color {
    ($line:expr) => {{
        let trimmed = $line.trim();
        let comment = trimmed.find("//");

        if let Some(c) = comment {
            trimmed[0..c].trim()
        } else {
            trimmed
        }
    }}
}

impl Rgba {
    pub fn r(&self) -> u8 {
        self.inner.x
    }

    pub fn g(&self) -> u8 {
        self.inner.y
    }

    pub fn b(&self) -> u8 {
        self.inner.z
    }

    pub fn a(&self) -> u8 {
        self.inner.w
    }

    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            inner: Vector4::new(r, g, b, a)
        }
    }

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Parses `r, g, b` or `r, g, b, a` as found in skin.ini
    pub fn parse(line: &str) -> Option<Self> {
        let mut split = line.split(',');

        let r = parse_color!(split.next()?).parse().ok()?;
        let g = parse_color!(split.next()?).parse().ok()?;
        let b = parse_color!(split.next()?).parse().ok()?;

        let a = match split.next() {
            Some(a) => parse_color!(a).parse().ok()?,
            None => 255,
        };

        Some(Self::new(r, g, b, a))
    }

    /// Legacy skins are allowed to specify a zero alpha which stable
    /// ignores, so we do too
    pub fn disallow_zero_alpha(self) -> Self {
        if self.a() == 0 {
            Self::new(self.r(), self.g(), self.b(), 255)
        } else {
            self
        }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::rgb(255, 255, 255)
    }
}

impl From<[u8; 3]> for Rgba {
    fn from(value: [u8; 3]) -> Self {
        Self::rgb(value[0], value[1], value[2])
    }
}

#[test]
fn test_color_parse() {
    let s = "254, 255, 255";
    let parsed = Rgba::parse(s).unwrap();
    assert_eq!(parsed.r(), 254);
    assert_eq!(parsed.g(), 255);
    assert_eq!(parsed.b(), 255);
    assert_eq!(parsed.a(), 255);

    let s = "254,  255,      10   // comment";
    let parsed = Rgba::parse(s).unwrap();
    assert_eq!(parsed.b(), 10);

    let s = "1, 2, 3, 0";
    let parsed = Rgba::parse(s).unwrap();
    assert_eq!(parsed.a(), 0);
    assert_eq!(parsed.disallow_zero_alpha().a(), 255);

    assert!(Rgba::parse("1, 2").is_none());
    assert!(Rgba::parse("1, 2, lol").is_none());
}
