//! Implements the embedded-hal SPI bus and the embedded-hal-nb serial traits
//!
//! Bus transfers are blocking calls without timeout. Serial reads and writes move single units
//! through the `nb` interface of [`UartChannel`].

use ehal1::spi::{ErrorKind as SpiErrorKind, ErrorType as SpiErrorType, SpiBus};
use embedded_hal_nb::serial::{self, ErrorKind as SerialErrorKind};

use crate::error::{Error, UartErrors};
use crate::spi::{SpiChannel, SpiHooks};
use crate::tick::{TickClock, MAX_DELAY};
use crate::uart::{UartChannel, UartHooks};
use crate::{SpiPeripheral, UartPeripheral};

impl ehal1::spi::Error for Error {
    fn kind(&self) -> SpiErrorKind {
        SpiErrorKind::Other
    }
}

impl serial::Error for UartErrors {
    fn kind(&self) -> SerialErrorKind {
        if self.contains(UartErrors::OVERRUN) {
            SerialErrorKind::Overrun
        } else if self.contains(UartErrors::FRAMING) {
            SerialErrorKind::FrameFormat
        } else if self.contains(UartErrors::PARITY) {
            SerialErrorKind::Parity
        } else if self.contains(UartErrors::NOISE) {
            SerialErrorKind::Noise
        } else {
            SerialErrorKind::Other
        }
    }
}

impl<'a, P, C, H> SpiErrorType for SpiChannel<'a, P, C, H>
where
    P: SpiPeripheral,
    C: TickClock,
    H: SpiHooks,
{
    type Error = Error;
}

impl<'a, P, C, H> SpiBus<u8> for SpiChannel<'a, P, C, H>
where
    P: SpiPeripheral,
    C: TickClock,
    H: SpiHooks,
{
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        if words.is_empty() {
            return Ok(());
        }
        self.receive(words, MAX_DELAY)
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        if words.is_empty() {
            return Ok(());
        }
        self.transmit(words, MAX_DELAY)
    }

    /// Exchanges the common prefix of `read` and `write`, then writes or reads the rest
    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        let common = read.len().min(write.len());
        if common != 0 {
            self.transmit_receive(&write[..common], &mut read[..common], MAX_DELAY)?;
        }
        SpiBus::write(self, &write[common..])?;
        SpiBus::read(self, &mut read[common..])
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            let out = [*word];
            self.transmit_receive(&out, core::slice::from_mut(word), MAX_DELAY)?;
        }
        Ok(())
    }

    /// Blocking transfers return once the transmit buffer is empty, so there is nothing to wait
    /// for
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<'a, P, C, H> serial::ErrorType for UartChannel<'a, P, C, H>
where
    P: UartPeripheral,
    C: TickClock,
    H: UartHooks,
{
    type Error = UartErrors;
}

impl<'a, P, C, H> serial::Read<u8> for UartChannel<'a, P, C, H>
where
    P: UartPeripheral,
    C: TickClock,
    H: UartHooks,
{
    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        self.read_word().map(|word| word as u8)
    }
}

/// Nine-bit words; the high byte is only meaningful with 9 data bits and no parity
impl<'a, P, C, H> serial::Read<u16> for UartChannel<'a, P, C, H>
where
    P: UartPeripheral,
    C: TickClock,
    H: UartHooks,
{
    fn read(&mut self) -> nb::Result<u16, Self::Error> {
        self.read_word()
    }
}

impl<'a, P, C, H> serial::Write<u8> for UartChannel<'a, P, C, H>
where
    P: UartPeripheral,
    C: TickClock,
    H: UartHooks,
{
    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        self.write_word(u16::from(word))
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        UartChannel::flush(self)
    }
}

impl<'a, P, C, H> serial::Write<u16> for UartChannel<'a, P, C, H>
where
    P: UartPeripheral,
    C: TickClock,
    H: UartHooks,
{
    fn write(&mut self, word: u16) -> nb::Result<(), Self::Error> {
        self.write_word(word)
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        UartChannel::flush(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spi::SpiConfig;
    use crate::testing::{DataAccess, RxMode, SimSpi, SimUart, StepClock};
    use crate::uart::{UartConfig, WordLength};
    use crate::NoHooks;
    use DataAccess::{Read, Write};

    fn spi<'a>(rx_mode: RxMode) -> SpiChannel<'a, SimSpi, StepClock> {
        let mut ch = SpiChannel::new(SimSpi::new(rx_mode), StepClock::new(0, 1), NoHooks);
        ch.configure(SpiConfig::new_master()).unwrap();
        ch
    }

    #[test]
    fn test_transfer_longer_read() {
        let mut sim = SimSpi::new(RxMode::Always);
        sim.slave.extend([1, 2, 3]);
        let mut ch = SpiChannel::new(sim, StepClock::new(0, 1), NoHooks);
        ch.configure(SpiConfig::new_master()).unwrap();
        let mut read = [0u8; 3];
        SpiBus::transfer(&mut ch, &mut read, &[9]).unwrap();
        assert_eq!(read, [1, 2, 3]);
        assert_eq!(
            ch.free().0.data,
            [Write(9), Read(1), Write(0xFF), Read(2), Write(0xFF), Read(3)]
        );
    }

    #[test]
    fn test_transfer_in_place() {
        let mut sim = SimSpi::new(RxMode::AfterWrite);
        sim.slave.extend([7, 8]);
        let mut ch = SpiChannel::new(sim, StepClock::new(0, 1), NoHooks);
        ch.configure(SpiConfig::new_master()).unwrap();
        let mut words = [1u8, 2];
        SpiBus::transfer_in_place(&mut ch, &mut words).unwrap();
        assert_eq!(words, [7, 8]);
        assert_eq!(
            ch.free().0.data,
            [Write(1), Read(7), Write(2), Read(8)]
        );
    }

    #[test]
    fn test_empty_bus_operations() {
        let mut ch = spi(RxMode::Queued);
        SpiBus::<u8>::write(&mut ch, &[]).unwrap();
        SpiBus::<u8>::read(&mut ch, &mut []).unwrap();
        SpiBus::<u8>::transfer(&mut ch, &mut [], &[]).unwrap();
        SpiBus::<u8>::flush(&mut ch).unwrap();
        assert!(ch.free().0.data.is_empty());
    }

    #[test]
    fn test_spi_error_kind() {
        use ehal1::spi::Error as _;
        assert_eq!(Error::Timeout.kind(), SpiErrorKind::Other);
    }

    #[test]
    fn test_serial_words() {
        let mut sim = SimUart::new();
        sim.incoming.extend([0x42, 0x1C3]);
        let mut ch = UartChannel::new(sim, StepClock::new(0, 1), NoHooks);
        ch.configure(UartConfig::new().word_length(WordLength::Nine))
            .unwrap();
        assert_eq!(nb::block!(serial::Read::<u8>::read(&mut ch)), Ok(0x42));
        assert_eq!(nb::block!(serial::Read::<u16>::read(&mut ch)), Ok(0x1C3));
        nb::block!(serial::Write::<u8>::write(&mut ch, b'A')).unwrap();
        nb::block!(serial::Write::<u16>::write(&mut ch, 0x101)).unwrap();
        nb::block!(serial::Write::<u8>::flush(&mut ch)).unwrap();
        assert_eq!(ch.free().0.transmitted, [0x41, 0x101]);
    }

    #[test]
    fn test_serial_error_kind() {
        use embedded_hal_nb::serial::Error as _;
        assert_eq!(UartErrors::OVERRUN.kind(), SerialErrorKind::Overrun);
        assert_eq!(
            (UartErrors::FRAMING | UartErrors::NOISE).kind(),
            SerialErrorKind::FrameFormat
        );
        assert_eq!(UartErrors::PARITY.kind(), SerialErrorKind::Parity);
        assert_eq!(UartErrors::NOISE.kind(), SerialErrorKind::Noise);
        assert_eq!(UartErrors::CONFIG.kind(), SerialErrorKind::Other);
    }
}
