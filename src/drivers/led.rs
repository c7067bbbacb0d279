// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Status LED on a GPIO pin.

use embedded_hal::digital::v2::OutputPin;

use crate::drivers::StatusLed;

/// Whether the LED is driven active-high or active-low on the board wiring.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActiveLevel {
    High,
    Low,
}

/// LED that remembers its active level and last logical state.
pub struct Led<PIN: OutputPin> {
    pin: PIN,
    active: ActiveLevel,
    is_on: bool,
}

impl<PIN: OutputPin> Led<PIN> {
    /// Wrap `pin`, starting OFF.
    pub fn new(pin: PIN, active: ActiveLevel) -> Self {
        let mut led = Self {
            pin,
            active,
            is_on: true,
        };
        led.set(false);
        led
    }

    pub fn active_high(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::High)
    }

    pub fn active_low(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::Low)
    }

    /// Drive the LED logically ON (true) or OFF (false).
    pub fn set(&mut self, on: bool) {
        let high = match self.active {
            ActiveLevel::High => on,
            ActiveLevel::Low => !on,
        };
        if high {
            self.pin.set_high().ok();
        } else {
            self.pin.set_low().ok();
        }
        self.is_on = on;
    }

    pub fn toggle(&mut self) {
        self.set(!self.is_on);
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    pub fn free(self) -> PIN {
        self.pin
    }
}

impl<PIN: OutputPin> StatusLed for Led<PIN> {
    fn set(&mut self, on: bool) {
        Led::set(self, on);
    }

    fn toggle(&mut self) {
        Led::toggle(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    #[derive(Default)]
    struct MockPin {
        high: bool,
    }

    impl OutputPin for MockPin {
        type Error = Infallible;

        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            Ok(())
        }
    }

    #[test]
    fn active_low_inverts_pin_level() {
        let mut led = Led::active_low(MockPin::default());
        assert!(!led.is_on());
        assert!(led.pin.high);

        led.set(true);
        assert!(!led.pin.high);
    }

    #[test]
    fn toggle_through_status_trait() {
        let mut led = Led::active_high(MockPin::default());
        let status: &mut dyn StatusLed = &mut led;
        status.toggle();
        status.toggle();
        status.toggle();
        assert!(led.is_on());
        assert!(led.free().high);
    }
}
