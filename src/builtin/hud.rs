//! Heads-up display objects.
//!
//! A [`ViewObject`] shows a tag and an integer pinned to one of nine spots of
//! the camera view. It is never culled and ignores the world position of its
//! object; the value changes through [`Event::ViewUpdate`] events carrying a
//! matching tag.

use crate::behavior::Behavior;
use crate::display::Canvas;
use crate::entity::{EntityId, ObjectBuilder, Solidness, WorldObject, MAX_ALTITUDE};
use crate::error::{EngineError, Result};
use crate::event::{Event, EventKind};
use crate::geometry::{BoundingBox, Vector};
use crate::resources::{ColorPair, Frame};
use crate::world::WorldManager;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Spot on the view a HUD element is pinned to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Location {
    TopLeft,
    #[default]
    TopCenter,
    TopRight,
    CenterLeft,
    CenterCenter,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Location {
    pub const ALL: [Location; 9] = [
        Location::TopLeft,
        Location::TopCenter,
        Location::TopRight,
        Location::CenterLeft,
        Location::CenterCenter,
        Location::CenterRight,
        Location::BottomLeft,
        Location::BottomCenter,
        Location::BottomRight,
    ];

    /// Two-letter code: `tl`, `tc`, `tr`, `cl`, `cc`, `cr`, `bl`, `bc`, `br`
    pub fn code(self) -> &'static str {
        match self {
            Location::TopLeft => "tl",
            Location::TopCenter => "tc",
            Location::TopRight => "tr",
            Location::CenterLeft => "cl",
            Location::CenterCenter => "cc",
            Location::CenterRight => "cr",
            Location::BottomLeft => "bl",
            Location::BottomCenter => "bc",
            Location::BottomRight => "br",
        }
    }

    fn column(self) -> u8 {
        match self {
            Location::TopLeft | Location::CenterLeft | Location::BottomLeft => 0,
            Location::TopCenter | Location::CenterCenter | Location::BottomCenter => 1,
            _ => 2,
        }
    }

    fn row(self) -> u8 {
        match self {
            Location::TopLeft | Location::TopCenter | Location::TopRight => 0,
            Location::CenterLeft | Location::CenterCenter | Location::CenterRight => 1,
            _ => 2,
        }
    }

    /// View-relative centre of an element `height` rows tall.
    ///
    /// Columns sit at 1/6, 1/2 and 5/6 of the width. Top elements touch the
    /// first row, bottom elements the last, centre ones straddle the middle.
    pub fn anchor(self, view: &BoundingBox, height: usize) -> Vector {
        let x = match self.column() {
            0 => view.horizontal / 6.0,
            1 => view.horizontal / 2.0,
            _ => view.horizontal * 5.0 / 6.0,
        };
        let half = (height / 2) as f32;
        let y = match self.row() {
            0 => half,
            1 => (view.vertical / 2.0).floor(),
            _ => view.vertical - 1.0 - (height.saturating_sub(1) - height / 2) as f32,
        };
        Vector::new(x.floor(), y)
    }
}

impl FromStr for Location {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Location::ALL
            .into_iter()
            .find(|location| location.code() == s.trim())
            .ok_or_else(|| EngineError::InvalidLocation(s.to_string()))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Tagged integer drawn on top of the world
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewObject {
    tag: String,
    value: i64,
    location: Location,
    draw_value: bool,
    border: bool,
    color: ColorPair,
}

impl ViewObject {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            value: 0,
            location: Location::default(),
            draw_value: true,
            border: true,
            color: ColorPair::default(),
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn with_value(mut self, value: i64) -> Self {
        self.value = value;
        self
    }

    pub fn with_border(mut self, border: bool) -> Self {
        self.border = border;
        self
    }

    pub fn with_draw_value(mut self, draw_value: bool) -> Self {
        self.draw_value = draw_value;
        self
    }

    pub fn with_color(mut self, color: ColorPair) -> Self {
        self.color = color;
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Text shown inside the border
    pub fn content(&self) -> String {
        if self.draw_value {
            format!("{} {}", self.tag, self.value)
        } else {
            self.tag.clone()
        }
    }

    /// Build the frame for the current content
    pub fn frame(&self) -> Option<Frame> {
        let content = self.content();
        let width = content.chars().count();
        if !self.border {
            return Frame::from_rows(width, &[content]);
        }
        let edge = format!("+{}+", "-".repeat(width));
        Frame::from_rows(width + 2, &[edge.clone(), format!("|{content}|"), edge])
    }

    /// Spawn this element as a spectral object on the top altitude layer
    pub fn spawn(self, world: &mut WorldManager) -> Result<EntityId> {
        let height = if self.border { 3 } else { 1 };
        let view = *world.view();
        let anchor = self.location.anchor(&view, height);
        let builder = ObjectBuilder::new("ViewObject")
            .position(view.corner + anchor)
            .solidness(Solidness::Spectral)
            .altitude(MAX_ALTITUDE - 1);
        world.spawn(builder, self)
    }
}

impl Behavior for ViewObject {
    fn name(&self) -> &str {
        "ViewObject"
    }

    fn interests(&self) -> &[EventKind] {
        &[EventKind::ViewUpdate]
    }

    fn handle(&mut self, _world: &mut WorldManager, me: EntityId, event: &Event) -> Result<bool> {
        let Event::ViewUpdate { tag, value, delta } = event else {
            return Ok(false);
        };
        if *tag != self.tag {
            return Ok(false);
        }
        if *delta {
            self.value = self.value.saturating_add(*value);
        } else {
            self.value = *value;
        }
        debug!(entity = %me, tag = %self.tag, value = self.value, "view updated");
        Ok(true)
    }

    fn draw(&mut self, _object: &mut WorldObject, canvas: &mut Canvas<'_>) -> Result<bool> {
        let Some(frame) = self.frame() else {
            return Ok(false);
        };
        let anchor = self.location.anchor(canvas.view(), frame.height());
        frame.draw_in_view(anchor, self.color, canvas);
        Ok(true)
    }

    fn cull_to_view(&self) -> bool {
        false
    }
}
