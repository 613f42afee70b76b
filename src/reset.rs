use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;

/// Time the sensor needs with both control lines held low.
pub const RESET_SETTLE_MS: u16 = 500;

///
/// Power-cycles the sensor. Invoked by the caller between polls, never by the decoder itself.
///
pub trait Reset {
    type Error;

    fn reset(&mut self) -> Result<(), Self::Error>;
}

///
/// Drives the SET and RESET lines of a Plantower sensor
///
pub struct PinReset<Set, Rst, Delay> {
    set: Set,
    rst: Rst,
    delay: Delay,
    settle_ms: u16,
}

impl<Set, Rst, Delay, E> PinReset<Set, Rst, Delay>
where
    Set: OutputPin<Error = E>,
    Rst: OutputPin<Error = E>,
    Delay: DelayMs<u16>,
{
    ///
    /// Takes ownership of both lines and drives them high so the sensor runs
    ///
    pub fn new(mut set: Set, mut rst: Rst, delay: Delay) -> Result<Self, E> {
        set.set_high()?;
        rst.set_high()?;

        Ok(Self {
            set,
            rst,
            delay,
            settle_ms: RESET_SETTLE_MS,
        })
    }

    pub fn with_settle_ms(mut self, settle_ms: u16) -> Self {
        self.settle_ms = settle_ms;
        self
    }

    pub fn release(self) -> (Set, Rst, Delay) {
        (self.set, self.rst, self.delay)
    }
}

impl<Set, Rst, Delay, E> Reset for PinReset<Set, Rst, Delay>
where
    Set: OutputPin<Error = E>,
    Rst: OutputPin<Error = E>,
    Delay: DelayMs<u16>,
{
    type Error = E;

    fn reset(&mut self) -> Result<(), E> {
        self.rst.set_low()?;
        self.set.set_low()?;
        self.delay.delay_ms(self.settle_ms);
        self.set.set_high()?;
        self.rst.set_high()
    }
}
