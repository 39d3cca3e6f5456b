//! Audio frame type.

use core::ops::{Add, AddAssign, Mul};

/// A stereo audio frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Frame {
    pub left: f32,
    pub right: f32,
}

impl Frame {
    /// Create a silent frame.
    pub const fn silence() -> Self {
        Self { left: 0.0, right: 0.0 }
    }

    /// Create a mono frame (same value for both channels).
    pub const fn mono(value: f32) -> Self {
        Self { left: value, right: value }
    }

    pub const fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// Larger absolute value of the two channels.
    pub fn peak(self) -> f32 {
        self.left.abs().max(self.right.abs())
    }

    /// Mean power of the two channels.
    pub fn power(self) -> f32 {
        (self.left * self.left + self.right * self.right) * 0.5
    }

    pub fn is_silent(self) -> bool {
        self.left == 0.0 && self.right == 0.0
    }
}

impl Add for Frame {
    type Output = Frame;

    fn add(self, other: Frame) -> Frame {
        Frame::new(self.left + other.left, self.right + other.right)
    }
}

impl AddAssign for Frame {
    fn add_assign(&mut self, other: Frame) {
        self.left += other.left;
        self.right += other.right;
    }
}

impl Mul<f32> for Frame {
    type Output = Frame;

    fn mul(self, gain: f32) -> Frame {
        Frame::new(self.left * gain, self.right * gain)
    }
}
