//! Per-bulb animations evaluated once per render tick.

use std::collections::BTreeMap;

use crate::{BulbColor, Frame, FrameBulb};

/// Linear fade between two colors over a fixed number of render ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fader {
    from: BulbColor,
    to: BulbColor,
    consumed_steps: u32,
    total_steps: u32,
}

impl Fader {
    /// Creates a fader that goes from the given color to [`BulbColor::BLACK`].
    pub const fn to_black(from: BulbColor, total_steps: u32) -> Self {
        Self {
            from,
            to: BulbColor::BLACK,
            consumed_steps: 0,
            total_steps,
        }
    }

    /// Returns the color for the current tick and advances the fader by one step.
    ///
    /// Returns `None` once all steps have been consumed.
    pub fn next_color(&mut self) -> Option<BulbColor> {
        if self.is_finished() {
            return None;
        }

        let color = self
            .from
            .lerp(self.to, self.consumed_steps, self.total_steps);
        self.consumed_steps += 1;
        Some(color)
    }

    pub const fn is_finished(&self) -> bool {
        self.consumed_steps >= self.total_steps
    }
}

/// Color producer of a single bulb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Producer {
    /// The same color on every tick, until replaced.
    Solid(BulbColor),
    /// Fades out and then disappears.
    Fader(Fader),
}

impl Producer {
    /// Evaluates the producer for the current tick.
    ///
    /// Returns `None` if the producer has nothing more to show.
    fn next_color(&mut self) -> Option<BulbColor> {
        match self {
            Self::Solid(color) => Some(*color),
            Self::Fader(fader) => fader.next_color(),
        }
    }

    fn is_finished(&self) -> bool {
        match self {
            Self::Solid(_) => false,
            Self::Fader(fader) => fader.is_finished(),
        }
    }
}

/// A set of active animations, at most one per bulb.
///
/// Each animation targets exactly one bulb, so the bulb index is the animation's selector.
#[derive(Debug, Clone, Default)]
pub struct Animations {
    entries: BTreeMap<u16, Producer>,
}

impl Animations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a producer for the bulb, replacing the previous one.
    pub fn install(&mut self, bulb: u16, producer: Producer) {
        if let Some(previous) = self.entries.insert(bulb, producer) {
            log::trace!("Replaced animation {previous:?} of bulb {bulb}");
        }
    }

    /// Lights the bulb with a solid color.
    pub fn solid(&mut self, bulb: u16, color: BulbColor) {
        self.install(bulb, Producer::Solid(color));
    }

    /// Fades the bulb out starting from the given color.
    pub fn fade(&mut self, bulb: u16, from: BulbColor, steps: u32) {
        self.install(bulb, Producer::Fader(Fader::to_black(from, steps)));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evaluates every animation once and returns the resulting frame.
    ///
    /// Finished faders are removed, so their bulbs are absent from the subsequent frames.
    pub fn render(&mut self) -> Frame {
        let mut bulbs = Vec::with_capacity(self.entries.len());
        for (&index, producer) in &mut self.entries {
            if let Some(color) = producer.next_color() {
                bulbs.push(FrameBulb { index, color });
            }
        }
        self.entries.retain(|_, producer| !producer.is_finished());

        Frame { bulbs }
    }
}
