//! Mapping of touch contacts to bulbs and colors.
//!
//! The vertical position of a contact selects a bulb, the horizontal position selects a color
//! from the palette. Each contact is followed by an [`Orb`] which submits commands to the
//! lights worker as the contact moves.

use std::collections::BTreeMap;

use xmas_touchpad_core::{Argb, Command};

use crate::CommandSender;

/// Color stops spread across the width of the touch surface.
pub const PALETTE: [Argb; 6] = [
    Argb::RED,
    Argb::YELLOW,
    Argb::GREEN,
    Argb::BLUE,
    Argb::MAGENTA,
    Argb::WHITE,
];

/// Size of the touch surface in view-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSize {
    pub width: f32,
    pub height: f32,
}

impl ViewSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Returns the index of the bulb under the given vertical position.
///
/// The view height is split into `bulb_count` equal bins, a position exactly on a bin
/// boundary belongs to the upper bin. The result is always within `[0, bulb_count)`.
pub fn bulb_index(y: f32, view_height: f32, bulb_count: u16) -> u16 {
    let last = bulb_count.saturating_sub(1);
    if view_height <= 0.0 || y.is_nan() {
        return 0;
    }

    let bin = (y * f32::from(bulb_count) / view_height).floor();
    bin.clamp(0.0, f32::from(last)) as u16
}

/// Returns the palette color under the given horizontal position.
///
/// The palette stops span the view width in `len - 1` equal bins, the color within a bin is
/// interpolated in the HSV space. The rightmost edge shows the last stop.
pub fn palette_color(x: f32, view_width: f32, palette: &[Argb]) -> Argb {
    let (first, bins) = match palette {
        [] => return Argb::BLACK,
        [only] => return *only,
        [first, ..] => (*first, palette.len() - 1),
    };
    if view_width <= 0.0 || x.is_nan() {
        return first;
    }

    let position = x.clamp(0.0, view_width) / view_width * bins as f32;
    let index = (position.floor() as usize).min(bins);
    if index == bins {
        return palette[bins];
    }

    let proportion = position - index as f32;
    palette[index].lerp_hsv(palette[index + 1], proportion)
}

/// A touch contact followed by the lights.
///
/// The bulb under the contact is lit with the color under it; when the contact leaves a bulb
/// that bulb fades out.
#[derive(Debug)]
pub struct Orb {
    x: f32,
    y: f32,
    bulb: u16,
    color: Argb,
    view: ViewSize,
    bulb_count: u16,
    queue: CommandSender,
}

impl Orb {
    /// Creates an orb for a new contact and lights the bulb under it.
    pub fn new(queue: CommandSender, view: ViewSize, bulb_count: u16, x: f32, y: f32) -> Self {
        let orb = Self {
            x,
            y,
            bulb: bulb_index(y, view.height, bulb_count),
            color: palette_color(x, view.width, &PALETTE),
            view,
            bulb_count,
            queue,
        };
        orb.light();
        orb
    }

    /// Moves the orb to a new position.
    ///
    /// If the orb leaves its bulb, the left bulb fades out before the new one is lit.
    pub fn set_position(&mut self, x: f32, y: f32) {
        let previous = self.bulb;

        self.x = x;
        self.y = y;
        self.bulb = bulb_index(y, self.view.height, self.bulb_count);
        self.color = palette_color(x, self.view.width, &PALETTE);

        if previous != self.bulb {
            self.queue.enqueue(Command::Fade { bulb: previous });
        }
        self.light();
    }

    /// Releases the contact: the current bulb fades out.
    pub fn release(self) {
        self.queue.enqueue(Command::Fade { bulb: self.bulb });
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn bulb(&self) -> u16 {
        self.bulb
    }

    /// Returns the current color, it can be used to draw the visual feedback.
    pub fn color(&self) -> Argb {
        self.color
    }

    fn light(&self) {
        self.queue.enqueue(Command::SetColor {
            bulb: self.bulb,
            color: self.color,
        });
    }
}

/// Kind of the touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    /// The first contact touched the surface.
    Down,
    /// One more contact touched the surface.
    PointerDown,
    Move,
    /// The last contact left the surface.
    Up,
    /// One of the contacts left the surface.
    PointerUp,
    /// The gesture was aborted, every contact is gone.
    Cancel,
}

/// Touch event of a single contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    /// Contact identifier, stable for the whole contact lifetime.
    pub id: u32,
    pub action: TouchAction,
    pub x: f32,
    pub y: f32,
}

impl TouchEvent {
    pub const fn new(id: u32, action: TouchAction, x: f32, y: f32) -> Self {
        Self { id, action, x, y }
    }
}

/// Touch surface dispatcher, it owns an orb for every active contact.
#[derive(Debug)]
pub struct TouchPad {
    queue: CommandSender,
    view: ViewSize,
    bulb_count: u16,
    orbs: BTreeMap<u32, Orb>,
}

impl TouchPad {
    pub fn new(queue: CommandSender, view: ViewSize, bulb_count: u16) -> Self {
        Self {
            queue,
            view,
            bulb_count,
            orbs: BTreeMap::new(),
        }
    }

    /// Changes the view size, it affects only the orbs created afterwards.
    pub fn resize(&mut self, view: ViewSize) {
        self.view = view;
    }

    pub fn view(&self) -> ViewSize {
        self.view
    }

    /// Dispatches a touch event to the orb of its contact.
    pub fn handle_event(&mut self, event: TouchEvent) {
        match event.action {
            TouchAction::Down | TouchAction::PointerDown => {
                let orb = Orb::new(
                    self.queue.clone(),
                    self.view,
                    self.bulb_count,
                    event.x,
                    event.y,
                );
                if let Some(previous) = self.orbs.insert(event.id, orb) {
                    log::debug!("Contact {} touched down twice", event.id);
                    previous.release();
                }
            }

            TouchAction::Move => {
                if let Some(orb) = self.orbs.get_mut(&event.id) {
                    orb.set_position(event.x, event.y);
                } else {
                    log::trace!("Move of unknown contact {}", event.id);
                }
            }

            TouchAction::Up | TouchAction::PointerUp => {
                if let Some(orb) = self.orbs.remove(&event.id) {
                    orb.release();
                }
            }

            TouchAction::Cancel => self.release_all(),
        }
    }

    /// Releases every active contact.
    pub fn release_all(&mut self) {
        for (_, orb) in std::mem::take(&mut self.orbs) {
            orb.release();
        }
    }

    pub fn orb(&self, id: u32) -> Option<&Orb> {
        self.orbs.get(&id)
    }

    /// Returns every active orb along with its contact identifier.
    pub fn orbs(&self) -> impl Iterator<Item = (u32, &Orb)> {
        self.orbs.iter().map(|(id, orb)| (*id, orb))
    }
}
