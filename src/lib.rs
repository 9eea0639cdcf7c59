//! An embedded-hal driver for the Texas Instruments DAC128S085, an 8-channel 12-bit DAC.
//!
//! The device powers up in WRM mode: writing a channel register does not move its output pin
//! until an update command connects that channel. The driver keeps no copy of the device state,
//! every call turns its arguments into a command word and sends it.
//!
//! ```
//! # use embedded_hal_mock::eh1::spi::{Mock, Transaction};
//! use dac128s085::{Dac128s085, Outputs, CH_A_EN, CH_B_EN, UPDATE_SELECTED};
//! # let spi: Mock<u16> = Mock::new(&[
//! #     Transaction::transaction_start(), Transaction::write_vec(vec![0x8FFF]), Transaction::transaction_end(),
//! #     Transaction::transaction_start(), Transaction::write_vec(vec![0xA001]), Transaction::transaction_end(),
//! #     Transaction::transaction_start(), Transaction::write_vec(vec![0xF800]), Transaction::transaction_end(),
//! #     Transaction::transaction_start(), Transaction::write_vec(vec![0xA003]), Transaction::transaction_end(),
//! #     Transaction::transaction_start(), Transaction::write_vec(vec![0xA084]), Transaction::transaction_end(),
//! # ]);
//! let mut dac = Dac128s085::from_spi(spi);
//!
//! // Set channel A to full scale and connect its output
//! dac.set_direct_output(0, 4095)?;
//!
//! // Load half scale into channel H without touching its output
//! dac.set_channel_register(7, 2048)?;
//!
//! // Connect the outputs of channels A and B
//! dac.set_channel_outputs(UPDATE_SELECTED | CH_A_EN | CH_B_EN)?;
//!
//! // Same thing with typed flags
//! dac.enable_outputs(Outputs::C | Outputs::H)?;
//! # dac.release().release().done();
//! # Ok::<(), dac128s085::DacError<embedded_hal::spi::ErrorKind>>(())
//! ```
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod command;
pub mod transport;

use core::fmt as core_fmt;
use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;

pub use command::{
    Outputs, CHANNEL_COUNT, CH_A_EN, CH_B_EN, CH_C_EN, CH_D_EN, CH_E_EN, CH_F_EN, CH_G_EN,
    CH_H_EN, MAX_VALUE, UPDATE_SELECTED,
};
pub use transport::{SpiTransport, Transport};

/// Time allowed for a single command word to go out
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10);

#[derive(Debug, PartialEq, Eq)]
/// The error for this crate. A bad parameter is reported before anything is sent. A transport
/// error is passed through as the transport reported it; the device may have seen a partial
/// word in that case.
pub enum DacError<E> {
    BadParameter,
    Transport(E),
}
impl<E> core_fmt::Display for DacError<E> {
    fn fmt(&self, f: &mut core_fmt::Formatter<'_>) -> core_fmt::Result {
        match self {
            Self::BadParameter => f.write_str("Channel or value out of range"),
            Self::Transport(_) => f.write_str("Transport failed to send command word"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E> defmt::Format for DacError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::BadParameter => defmt::write!(f, "BadParameter"),
            Self::Transport(_) => defmt::write!(f, "Transport"),
        }
    }
}

/// Driver for one DAC128S085 on a [`Transport`].
///
/// Calls take `&mut self`, so only one command is ever in flight on the bus.
#[derive(Debug)]
pub struct Dac128s085<T> {
    transport: T,
    timeout: Duration,
}

impl<Spi> Dac128s085<SpiTransport<Spi>>
where
    Spi: SpiDevice<u16>,
{
    /// Create a driver over an SPI device configured for 16-bit words in [`transport::MODE`]
    pub fn from_spi(spi: Spi) -> Self {
        Self::new(SpiTransport::new(spi))
    }
}

impl<T> Dac128s085<T>
where
    T: Transport,
{
    pub fn new(transport: T) -> Self {
        Self::with_timeout(transport, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(transport: T, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// The timeout passed to the transport for every word
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Destroy the driver and return the transport
    pub fn release(self) -> T {
        self.transport
    }

    fn send(&mut self, word: u16) -> Result<(), DacError<T::Error>> {
        trace!("dac128s085: send {:#x}", word);
        self.transport.send(word, self.timeout).map_err(|e| {
            warn!("dac128s085: transport failed sending {:#x}", word);
            DacError::Transport(e)
        })
    }

    /// Update the register of `channel` (0-7) with `value` (0-4095). The output pin keeps its
    /// current level until the channel is enabled with [`Self::set_channel_outputs`].
    ///
    /// Nothing is sent if either argument is out of range.
    pub fn set_channel_register(
        &mut self,
        channel: u8,
        value: u16,
    ) -> Result<(), DacError<T::Error>> {
        if !command::is_valid(channel, value) {
            debug!(
                "dac128s085: rejected channel {} value {}",
                channel, value
            );
            return Err(DacError::BadParameter);
        }
        self.send(command::register_write(channel, value))
    }

    /// Send an update-selected command word as given. Build it from [`UPDATE_SELECTED`] OR-ed
    /// with the `CH_x_EN` flags of the channels whose outputs should follow their registers.
    /// Channels whose flag is clear keep whatever state the device last had for them.
    pub fn set_channel_outputs(&mut self, word: u16) -> Result<(), DacError<T::Error>> {
        self.send(word)
    }

    /// Connect the outputs of the given channels to their registers
    pub fn enable_outputs(&mut self, outputs: Outputs) -> Result<(), DacError<T::Error>> {
        self.set_channel_outputs(outputs.command())
    }

    /// Write `value` into the register of `channel` and then connect that channel's output.
    ///
    /// The update command names only `channel`; outputs enabled by earlier calls stay enabled.
    /// If the register write fails the update command is never sent.
    pub fn set_direct_output(&mut self, channel: u8, value: u16) -> Result<(), DacError<T::Error>> {
        self.set_channel_register(channel, value)?;
        self.set_channel_outputs(UPDATE_SELECTED | (1 << channel))
    }

    /// Pulse every channel in turn: full scale for `pulse_ms` milliseconds, then back to zero.
    /// Useful for checking the wiring of a new board. Stops at the first failed command.
    pub fn pulse_channels<D: DelayNs>(
        &mut self,
        delay: &mut D,
        pulse_ms: u32,
    ) -> Result<(), DacError<T::Error>> {
        for channel in 0..CHANNEL_COUNT {
            self.set_direct_output(channel, MAX_VALUE)?;
            delay.delay_ms(pulse_ms);
            self.set_direct_output(channel, 0)?;
        }
        Ok(())
    }
}
