//! Forced-choice trial records
//!
//! A trial is one stimulus presentation in the cone contrast test: a
//! direction-coded stimulus on a single cone channel at a given contrast,
//! and the direction the participant chose.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cone photoreceptor channel under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConeChannel {
    /// Long-wavelength (red) cone
    L,
    /// Medium-wavelength (green) cone
    M,
    /// Short-wavelength (blue) cone
    S,
}

impl ConeChannel {
    pub const ALL: [ConeChannel; 3] = [ConeChannel::L, ConeChannel::M, ConeChannel::S];

    /// Stimulus color for this channel at the given contrast
    ///
    /// Modulates a single RGB primary against neutral gray (128), up to the
    /// full 127 steps at 100% contrast.
    pub fn stimulus_color(&self, contrast_percent: f64) -> crate::Color {
        const GRAY: u8 = 128;
        let offset = ((contrast_percent.clamp(0.0, 100.0) / 100.0) * 127.0).round() as u8;
        let lit = GRAY + offset;
        match self {
            ConeChannel::L => crate::Color::new(lit, GRAY, GRAY),
            ConeChannel::M => crate::Color::new(GRAY, lit, GRAY),
            ConeChannel::S => crate::Color::new(GRAY, GRAY, lit),
        }
    }
}

impl fmt::Display for ConeChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConeChannel::L => write!(f, "L (red)"),
            ConeChannel::M => write!(f, "M (green)"),
            ConeChannel::S => write!(f, "S (blue)"),
        }
    }
}

/// Orientation of the stimulus gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Up,
    Right,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Left, Direction::Up, Direction::Right, Direction::Down];

    /// Rotation of the stimulus glyph in degrees
    pub fn rotation_degrees(&self) -> u16 {
        match self {
            Direction::Right => 0,
            Direction::Down => 90,
            Direction::Left => 180,
            Direction::Up => 270,
        }
    }
}

/// One recorded forced-choice response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub channel: ConeChannel,
    pub presented: Direction,
    pub chosen: Direction,
    /// Stimulus contrast against gray, in percent
    pub contrast_percent: f64,
    pub response_time_ms: u64,
}

impl Trial {
    pub fn new(
        channel: ConeChannel,
        presented: Direction,
        chosen: Direction,
        contrast_percent: f64,
        response_time_ms: u64,
    ) -> Self {
        Self {
            channel,
            presented,
            chosen,
            contrast_percent,
            response_time_ms,
        }
    }

    /// Whether the participant picked the presented direction
    pub fn correct(&self) -> bool {
        self.chosen == self.presented
    }
}

/// Trials belonging to a single channel, in presentation order
pub fn trials_for_channel(trials: &[Trial], channel: ConeChannel) -> Vec<Trial> {
    trials.iter().filter(|t| t.channel == channel).cloned().collect()
}
