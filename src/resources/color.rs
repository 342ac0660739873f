//! Named terminal colours.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The sixteen ANSI terminal colours
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    #[default]
    Black,
    DarkGrey,
    Red,
    LightRed,
    Green,
    LightGreen,
    Brown,
    Yellow,
    Blue,
    LightBlue,
    Magenta,
    LightMagenta,
    Cyan,
    LightCyan,
    LightGrey,
    White,
}

impl Color {
    pub const ALL: [Color; 16] = [
        Color::Black,
        Color::DarkGrey,
        Color::Red,
        Color::LightRed,
        Color::Green,
        Color::LightGreen,
        Color::Brown,
        Color::Yellow,
        Color::Blue,
        Color::LightBlue,
        Color::Magenta,
        Color::LightMagenta,
        Color::Cyan,
        Color::LightCyan,
        Color::LightGrey,
        Color::White,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Color::Black => "black",
            Color::DarkGrey => "dark_grey",
            Color::Red => "red",
            Color::LightRed => "light_red",
            Color::Green => "green",
            Color::LightGreen => "light_green",
            Color::Brown => "brown",
            Color::Yellow => "yellow",
            Color::Blue => "blue",
            Color::LightBlue => "light_blue",
            Color::Magenta => "magenta",
            Color::LightMagenta => "light_magenta",
            Color::Cyan => "cyan",
            Color::LightCyan => "light_cyan",
            Color::LightGrey => "light_grey",
            Color::White => "white",
        }
    }

    /// Base hue 0..8 in ANSI order
    fn hue(self) -> u8 {
        match self {
            Color::Black | Color::DarkGrey => 0,
            Color::Red | Color::LightRed => 1,
            Color::Green | Color::LightGreen => 2,
            Color::Brown | Color::Yellow => 3,
            Color::Blue | Color::LightBlue => 4,
            Color::Magenta | Color::LightMagenta => 5,
            Color::Cyan | Color::LightCyan => 6,
            Color::LightGrey | Color::White => 7,
        }
    }

    fn is_bright(self) -> bool {
        matches!(
            self,
            Color::DarkGrey
                | Color::LightRed
                | Color::LightGreen
                | Color::Yellow
                | Color::LightBlue
                | Color::LightMagenta
                | Color::LightCyan
                | Color::White
        )
    }
}

impl FromStr for Color {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Color::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| EngineError::InvalidColor(s.to_string()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Foreground on background
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorPair {
    pub foreground: Color,
    pub background: Color,
}

impl ColorPair {
    pub const fn new(foreground: Color, background: Color) -> Self {
        Self {
            foreground,
            background,
        }
    }

    /// SGR escape selecting this pair.
    ///
    /// Backgrounds have no bright variants; light colours fall back to their hue.
    pub fn ansi(&self) -> String {
        let bold = u8::from(self.foreground.is_bright());
        format!(
            "\x1b[{bold};{};{}m",
            30 + self.foreground.hue(),
            40 + self.background.hue()
        )
    }

    /// Reset all attributes
    pub const RESET: &'static str = "\x1b[0m";
}

impl Default for ColorPair {
    /// White on black
    fn default() -> Self {
        Self::new(Color::White, Color::Black)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("red".parse::<Color>().unwrap(), Color::Red);
        assert_eq!("LIGHT_BLUE".parse::<Color>().unwrap(), Color::LightBlue);
        assert!(matches!(
            "puce".parse::<Color>(),
            Err(EngineError::InvalidColor(_))
        ));
        for color in Color::ALL {
            assert_eq!(color.name().parse::<Color>().unwrap(), color);
        }
    }

    #[test]
    fn test_ansi_codes() {
        assert_eq!(ColorPair::default().ansi(), "\x1b[1;37;40m");
        assert_eq!(
            ColorPair::new(Color::Brown, Color::Blue).ansi(),
            "\x1b[0;33;44m"
        );
        assert_eq!(
            ColorPair::new(Color::Yellow, Color::Yellow).ansi(),
            "\x1b[1;33;43m"
        );
    }
}
