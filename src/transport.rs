//! The bus the driver talks over.

use core::time::Duration;

use embedded_hal::spi::{self, SpiDevice};

/// SPI mode the DAC expects: clock idle low, data captured on the first edge.
///
/// Configure the bus with this mode and a 16-bit, MSB first word size before handing it to the
/// driver.
pub const MODE: spi::Mode = spi::MODE_0;

/// Something that can put a single 16-bit command word on the wire.
///
/// Implementations must send the word MSB first as one frame with chip-select held for the whole
/// word, and give up once `timeout` has elapsed.
pub trait Transport {
    /// Error reported when a word could not be sent
    type Error;

    /// Send one command word
    fn send(&mut self, word: u16, timeout: Duration) -> Result<(), Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn send(&mut self, word: u16, timeout: Duration) -> Result<(), Self::Error> {
        T::send(&mut **self, word, timeout)
    }
}

/// [`Transport`] over an embedded-hal [`SpiDevice`] with a 16-bit word size.
///
/// `SpiDevice` has no per-transfer timeout, so the one passed to [`Transport::send`] is ignored
/// and the HAL's own bus limits apply.
#[derive(Debug)]
pub struct SpiTransport<Spi> {
    spi: Spi,
}

impl<Spi> SpiTransport<Spi>
where
    Spi: SpiDevice<u16>,
{
    pub fn new(spi: Spi) -> Self {
        Self { spi }
    }

    /// Give back the wrapped SPI device
    pub fn release(self) -> Spi {
        self.spi
    }
}

impl<Spi> Transport for SpiTransport<Spi>
where
    Spi: SpiDevice<u16>,
{
    type Error = Spi::Error;

    fn send(&mut self, word: u16, _timeout: Duration) -> Result<(), Self::Error> {
        self.spi.write(&[word])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    #[test]
    fn sends_single_sixteen_bit_frame() {
        let expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x8FFFu16]),
            SpiTransaction::transaction_end(),
        ];
        let mut transport = SpiTransport::new(SpiMock::new(&expectations));

        transport.send(0x8FFF, Duration::from_millis(10)).unwrap();
        transport.release().done();
    }

    #[test]
    fn mutable_reference_forwards() {
        let expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0xA0FFu16]),
            SpiTransaction::transaction_end(),
        ];
        let mut transport = SpiTransport::new(SpiMock::new(&expectations));

        fn send_once<T: Transport>(mut transport: T, word: u16) -> Result<(), T::Error> {
            transport.send(word, Duration::ZERO)
        }
        send_once(&mut transport, 0xA0FF).unwrap();
        transport.release().done();
    }
}
