//! Input sampling and display output.

use embedded_hal::digital::InputPin;

use crate::JoystickThresholds;

/// One sample of the user inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Inputs {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Heartbeat sensor pulse seen since the last sample
    pub pulse: bool,
}

impl Inputs {
    pub const NONE: Inputs = Inputs {
        left: false,
        right: false,
        up: false,
        down: false,
        pulse: false,
    };

    /// Left pressed and Right not.
    pub fn left_only(&self) -> bool {
        self.left && !self.right
    }

    /// Right pressed and Left not.
    pub fn right_only(&self) -> bool {
        self.right && !self.left
    }

    /// Up or Down pressed on its own, with neither button held.
    pub fn up_only(&self) -> bool {
        self.up && !self.down && !self.left && !self.right
    }

    pub fn down_only(&self) -> bool {
        self.down && !self.up && !self.left && !self.right
    }
}

/// Something that produces input samples.
pub trait InputSource {
    fn sample(&mut self) -> Inputs;
}

/// Samples active-low buttons and an analog joystick axis.
///
/// The axis reading comes from a caller-supplied closure so any ADC driver
/// can be plugged in.
pub struct PinInputs<L, R, H, A> {
    left: L,
    right: R,
    heartbeat: H,
    axis: A,
    thresholds: JoystickThresholds,
}

impl<L, R, H, A> PinInputs<L, R, H, A>
where
    L: InputPin,
    R: InputPin,
    H: InputPin,
    A: FnMut() -> u16,
{
    pub fn new(left: L, right: R, heartbeat: H, axis: A, thresholds: JoystickThresholds) -> Self {
        Self {
            left,
            right,
            heartbeat,
            axis,
            thresholds,
        }
    }
}

// A pin that cannot be read counts as released.
fn pressed(pin: &mut impl InputPin) -> bool {
    match pin.is_low() {
        Ok(low) => low,
        Err(_) => {
            warn!("input pin read failed");
            false
        }
    }
}

impl<L, R, H, A> InputSource for PinInputs<L, R, H, A>
where
    L: InputPin,
    R: InputPin,
    H: InputPin,
    A: FnMut() -> u16,
{
    fn sample(&mut self) -> Inputs {
        let (up, down) = self.thresholds.classify((self.axis)());
        Inputs {
            left: pressed(&mut self.left),
            right: pressed(&mut self.right),
            up,
            down,
            pulse: pressed(&mut self.heartbeat),
        }
    }
}

/// Character display addressed by 1-based linear position.
///
/// On a 16x2 panel positions 1-16 are the first row and 17-32 the second.
pub trait CharDisplay {
    fn clear(&mut self);

    fn write_char(&mut self, position: u8, ch: char);

    /// Moves the visible cursor. Displays without one ignore it.
    fn set_cursor(&mut self, _position: u8) {}

    /// Writes `text` starting at `position`.
    fn write_str(&mut self, position: u8, text: &str) {
        for (position, ch) in (position..=u8::MAX).zip(text.chars()) {
            self.write_char(position, ch);
        }
    }
}
