//! Sprite file parser.
//!
//! A sprite file has three delimited sections:
//!
//! ```text
//! <HEADER>
//! frames 2
//! width 3
//! height 1
//! color green
//! bgcolor black
//! slowdown 4
//! transparency .
//! </HEADER>
//! <BODY>
//! -o-
//! end
//! =o=
//! end
//! </BODY>
//! <FOOTER>
//! version 1
//! </FOOTER>
//! ```
//!
//! `bgcolor` and `transparency` are optional, every other header token is
//! required. Unknown header lines are ignored. Each body frame is `height`
//! lines of exactly `width` characters followed by `end`.

use crate::error::{EngineError, Result};
use crate::resources::color::{Color, ColorPair};
use crate::resources::sprite::{Frame, Sprite};
use std::path::Path;
use tracing::debug;

/// Context provided to asset loaders
pub struct LoadContext<'a> {
    pub path: &'a Path,
    pub bytes: &'a [u8],
}

/// Trait for loading assets from bytes
pub trait AssetLoader {
    type Asset;

    /// Load asset from bytes
    fn load(&self, context: LoadContext) -> Result<Self::Asset>;

    /// File extensions this loader supports
    fn extensions(&self) -> &[&str];
}

/// Loads `.txt`/`.spr` sprite files
pub struct SpriteLoader;

impl AssetLoader for SpriteLoader {
    type Asset = Sprite;

    fn load(&self, context: LoadContext) -> Result<Sprite> {
        let text = std::str::from_utf8(context.bytes).map_err(|e| {
            EngineError::AssetLoadError(format!(
                "{}: UTF-8 decode error: {e}",
                context.path.display()
            ))
        })?;
        let label = context
            .path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        parse_sprite(text, &label).map_err(|e| match e {
            EngineError::AssetLoadError(msg) => {
                EngineError::AssetLoadError(format!("{}: {msg}", context.path.display()))
            }
            other => other,
        })
    }

    fn extensions(&self) -> &[&str] {
        &["txt", "spr"]
    }
}

const END_OF_FRAME: &str = "end";

fn load_error(msg: impl Into<String>) -> EngineError {
    EngineError::AssetLoadError(msg.into())
}

/// Parse sprite text and label the result
pub fn parse_sprite(text: &str, label: &str) -> Result<Sprite> {
    let mut lines = text.lines().map(|line| line.strip_suffix('\r').unwrap_or(line));

    let mut header = read_section(&mut lines, "HEADER")?;
    let frame_count: usize = parse_number(&mut header, "frames")?;
    let width: usize = parse_number(&mut header, "width")?;
    let height: usize = parse_number(&mut header, "height")?;
    let slowdown: u32 = parse_number(&mut header, "slowdown")?;
    let foreground: Color = take_token(&mut header, "color")?.parse()?;
    let background = match take_token(&mut header, "bgcolor") {
        Ok(name) => name.parse()?,
        Err(_) => Color::Black,
    };
    let transparent = take_token(&mut header, "transparency")
        .ok()
        .and_then(|value| value.chars().next());
    if !header.is_empty() {
        debug!(sprite = label, ignored = ?header, "unknown header lines");
    }
    if width == 0 || height == 0 {
        return Err(load_error(format!("sprite {label}: zero-sized frames")));
    }

    let body = read_section(&mut lines, "BODY")?;
    let frames = parse_frames(&body, width, height)?;
    if frames.len() != frame_count {
        return Err(load_error(format!(
            "sprite {label}: header declares {frame_count} frames, body has {}",
            frames.len()
        )));
    }

    let mut footer = read_section(&mut lines, "FOOTER")?;
    if let Ok(version) = take_token(&mut footer, "version") {
        debug!(sprite = label, version, "sprite version");
    }

    let sprite = Sprite::new(
        label,
        width,
        height,
        frames,
        ColorPair::new(foreground, background),
        slowdown,
    );
    Ok(match transparent {
        Some(ch) => sprite.with_transparency(ch),
        None => sprite,
    })
}

/// Lines between `<NAME>` and `</NAME>`; the opening delimiter must come next
fn read_section<'a, I>(lines: &mut I, name: &str) -> Result<Vec<&'a str>>
where
    I: Iterator<Item = &'a str>,
{
    let begin = format!("<{name}>");
    let end = format!("</{name}>");

    let first = lines
        .by_ref()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| load_error(format!("missing section {begin}")))?;
    if first.trim() != begin {
        return Err(load_error(format!(
            "start of section is missing: expected {begin}, found {first:?}"
        )));
    }

    let mut data = Vec::new();
    for line in lines.by_ref() {
        if line.trim() == end {
            if data.is_empty() {
                return Err(load_error(format!("no data present for section {name}")));
            }
            return Ok(data);
        }
        data.push(line);
    }
    Err(load_error(format!("end of section is missing: {end}")))
}

/// Remove the first `token value` line and return the value
fn take_token<'a>(data: &mut Vec<&'a str>, token: &str) -> Result<&'a str> {
    let index = data
        .iter()
        .position(|line| {
            let line = line.trim_start();
            line.strip_prefix(token)
                .is_some_and(|rest| rest.starts_with(char::is_whitespace))
        })
        .ok_or_else(|| load_error(format!("token does not exist: {token}")))?;
    let line = data.remove(index).trim();
    Ok(line[token.len()..].trim())
}

fn parse_number<T: std::str::FromStr>(data: &mut Vec<&str>, token: &str) -> Result<T> {
    let value = take_token(data, token)?;
    value
        .parse()
        .map_err(|_| load_error(format!("invalid {token}: {value:?}")))
}

fn parse_frames(body: &[&str], width: usize, height: usize) -> Result<Vec<Frame>> {
    let mut frames = Vec::new();
    let mut rows: Vec<&str> = Vec::with_capacity(height);
    for &line in body {
        if line.trim_end() == END_OF_FRAME {
            if rows.len() != height {
                return Err(load_error(format!(
                    "frame {} has {} lines, expected height {height}",
                    frames.len(),
                    rows.len()
                )));
            }
            let frame = Frame::from_rows(width, &rows)
                .ok_or_else(|| load_error("frame line width does not match sprite width"))?;
            frames.push(frame);
            rows.clear();
            continue;
        }
        if line.chars().count() != width {
            return Err(load_error(format!(
                "frame line {line:?} is {} wide, expected {width}",
                line.chars().count()
            )));
        }
        rows.push(line);
    }
    if !rows.is_empty() {
        return Err(load_error(format!(
            "frame {} is not terminated by '{END_OF_FRAME}'",
            frames.len()
        )));
    }
    Ok(frames)
}
