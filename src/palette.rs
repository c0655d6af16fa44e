//! Colours: RGB values, 3-tone block triples and the seven-family palette.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

/// A plain 24-bit colour. The engine never renders, so it stays independent of any UI crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b)
    }

    /// Parse "#RRGGBB" or "#RGB" (leading '#' optional).
    pub fn from_hex(s: &str) -> Result<Self, PaletteError> {
        let s = s.trim().trim_start_matches('#');
        let invalid = || PaletteError::InvalidHex(s.to_string());
        let channel = |range: std::ops::Range<usize>| {
            s.get(range)
                .and_then(|digits| u8::from_str_radix(digits, 16).ok())
                .ok_or_else(invalid)
        };
        match s.len() {
            6 => Ok(Self(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            3 => Ok(Self(
                channel(0..1)? * 17,
                channel(1..2)? * 17,
                channel(2..3)? * 17,
            )),
            _ => Err(invalid()),
        }
    }
}

/// The three shades a block is drawn with, from the border inwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tones {
    pub outer: Rgb,
    pub middle: Rgb,
    pub inner: Rgb,
}

impl Tones {
    pub const fn new(outer: Rgb, middle: Rgb, inner: Rgb) -> Self {
        Self {
            outer,
            middle,
            inner,
        }
    }
}

const BLACK_AND_WHITE: Tones = Tones::new(
    Rgb::new(0x20, 0x20, 0x20),
    Rgb::new(0xF0, 0xF0, 0xF0),
    Rgb::new(0x80, 0x80, 0x80),
);

/// One colour triple per block family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub square: Tones,
    pub straight: Tones,
    pub z: Tones,
    pub t: Tones,
    pub s: Tones,
    pub j: Tones,
    pub l: Tones,
}

impl Default for Palette {
    fn default() -> Self {
        Self::default_colors()
    }
}

impl Palette {
    pub const fn default_colors() -> Self {
        Self {
            straight: Tones::new(
                Rgb::new(214, 30, 60),
                Rgb::new(241, 108, 107),
                Rgb::new(236, 42, 75),
            ),
            square: Tones::new(
                Rgb::new(59, 84, 165),
                Rgb::new(118, 137, 196),
                Rgb::new(79, 111, 182),
            ),
            j: Tones::new(
                Rgb::new(220, 159, 39),
                Rgb::new(246, 197, 100),
                Rgb::new(242, 181, 42),
            ),
            l: Tones::new(
                Rgb::new(158, 35, 126),
                Rgb::new(193, 111, 173),
                Rgb::new(179, 63, 151),
            ),
            s: Tones::new(
                Rgb::new(236, 94, 36),
                Rgb::new(234, 154, 84),
                Rgb::new(228, 126, 37),
            ),
            z: Tones::new(
                Rgb::new(88, 178, 71),
                Rgb::new(150, 204, 110),
                Rgb::new(115, 191, 68),
            ),
            t: Tones::new(
                Rgb::new(62, 170, 212),
                Rgb::new(120, 205, 244),
                Rgb::new(54, 192, 240),
            ),
        }
    }

    /// Every family drawn with the same grey triple.
    pub const fn black_and_white() -> Self {
        Self {
            square: BLACK_AND_WHITE,
            straight: BLACK_AND_WHITE,
            z: BLACK_AND_WHITE,
            t: BLACK_AND_WHITE,
            s: BLACK_AND_WHITE,
            j: BLACK_AND_WHITE,
            l: BLACK_AND_WHITE,
        }
    }
}

/// Named palette presets selectable by hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaletteKind {
    #[default]
    Default,
    BlackAndWhite,
}

impl From<PaletteKind> for Palette {
    fn from(kind: PaletteKind) -> Self {
        match kind {
            PaletteKind::Default => Self::default_colors(),
            PaletteKind::BlackAndWhite => Self::black_and_white(),
        }
    }
}
