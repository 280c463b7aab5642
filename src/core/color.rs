//! ANSI color model for console output
//!
//! Every level maps to one of the eight standard foreground colors.
//! Colored text is always rendered as `ESC[<code>m<text>ESC[0m`, where
//! `<code>` is exactly two ASCII digits. That fixed width is what lets the
//! console encoder patch previously rendered colors in place.

use super::buffer::Buffer;
use super::level::Level;
use std::sync::LazyLock;

pub const ESC: u8 = 0x1b;

/// The SGR sequence that ends a colored span
pub const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black = 30,
    Red = 31,
    Green = 32,
    Yellow = 33,
    Blue = 34,
    Magenta = 35,
    Cyan = 36,
    White = 37,
}

impl Color {
    pub const ALL: [Color; 8] = [
        Color::Black,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Magenta,
        Color::Cyan,
        Color::White,
    ];

    /// Numeric SGR foreground code
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// The two ASCII digits of the SGR code
    #[inline]
    pub const fn digits(self) -> (u8, u8) {
        let code = self.code();
        (b'0' + code / 10, b'0' + code % 10)
    }

    /// Wrap `text` in this color's escape sequence
    pub fn add(self, text: &str) -> String {
        let code = colored::Color::from(self).to_fg_str();
        let mut out = String::with_capacity(text.len() + 9);
        out.push('\x1b');
        out.push('[');
        out.push_str(&code);
        out.push('m');
        out.push_str(text);
        out.push_str(RESET);
        out
    }

    /// Same rendering as [`Color::add`], written straight into `buf`
    pub fn write_to(self, buf: &mut Buffer, text: &str) {
        let code = colored::Color::from(self).to_fg_str();
        buf.append_bytes(&[ESC, b'[']);
        buf.append_str(&code);
        buf.append_byte(b'm');
        buf.append_str(text);
        buf.append_str(RESET);
    }
}

impl From<Color> for colored::Color {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => colored::Color::Black,
            Color::Red => colored::Color::Red,
            Color::Green => colored::Color::Green,
            Color::Yellow => colored::Color::Yellow,
            Color::Blue => colored::Color::Blue,
            Color::Magenta => colored::Color::Magenta,
            Color::Cyan => colored::Color::Cyan,
            Color::White => colored::Color::White,
        }
    }
}

/// Color used for entries at `level`
pub const fn color_for(level: Level) -> Color {
    match level {
        Level::Debug => Color::Magenta,
        Level::Info => Color::Cyan,
        Level::Warn => Color::Yellow,
        Level::Error | Level::DPanic | Level::Panic | Level::Fatal => Color::Red,
    }
}

/// Color for a raw level value; values outside the known range are red
pub fn color_for_raw(raw: u8) -> Color {
    Level::from_u8(raw).map(color_for).unwrap_or(Color::Red)
}

/// SGR digits used when recoloring a segment for `level`
#[inline]
pub const fn color_bytes_for_level(level: Level) -> (u8, u8) {
    color_for(level).digits()
}

/// Render a field key in the color of `level`
pub fn color_key(key: &str, level: Level) -> String {
    color_for(level).add(key)
}

static CAPITAL_COLOR_LABELS: LazyLock<[String; 7]> =
    LazyLock::new(|| Level::ALL.map(|level| color_for(level).add(level.capital_str())));

static LOWERCASE_COLOR_LABELS: LazyLock<[String; 7]> =
    LazyLock::new(|| Level::ALL.map(|level| color_for(level).add(level.as_str())));

/// Precomputed `ESC[..mINFOESC[0m` style label
pub fn capital_color_label(level: Level) -> &'static str {
    &CAPITAL_COLOR_LABELS[level.as_u8() as usize]
}

/// Precomputed `ESC[..minfoESC[0m` style label
pub fn lowercase_color_label(level: Level) -> &'static str {
    &LOWERCASE_COLOR_LABELS[level.as_u8() as usize]
}

/// Remove every `ESC[...m` sequence from `bytes`
pub fn strip_ansi(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == ESC && bytes.get(i + 1) == Some(&b'[') {
            let mut j = i + 2;
            while j < bytes.len() && bytes[j] != b'm' {
                j += 1;
            }
            i = j + 1;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}
