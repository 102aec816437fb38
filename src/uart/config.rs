//! UART channel configuration

use crate::instance::PinGroup;
use crate::pac::uart::{bdh, c1, c2};

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    #[default]
    One,
    Two,
}

/// Number of bits per character, parity bit included
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WordLength {
    #[default]
    Eight,
    Nine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
}

/// Line wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Line {
    /// Separate TxD and RxD pins
    #[default]
    TwoWire,
    /// Half duplex on the TxD pin
    SingleWire,
    /// Transmitter output internally connected to the receiver input
    Loopback,
}

/// Enabled directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferMode {
    TxOnly,
    RxOnly,
    #[default]
    TxRx,
}

/// Receiver wakeup method in multiprocessor mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeMethod {
    IdleLine,
    AddressMark,
}

/// UART channel configuration
///
/// ```
/// # use kinetis_ke_serial::uart::config::*;
/// let config = UartConfig::new()
///     .baud_rate(19_200)
///     .word_length(WordLength::Nine)
///     .parity(Parity::Even)
///     .stop_bits(StopBits::Two);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    pub baud_rate: u32,
    pub stop_bits: StopBits,
    pub word_length: WordLength,
    pub parity: Parity,
    pub line: Line,
    pub mode: TransferMode,
    pub pins: PinGroup,
}

impl Default for UartConfig {
    fn default() -> Self {
        UartConfig {
            baud_rate: 9600,
            stop_bits: StopBits::One,
            word_length: WordLength::Eight,
            parity: Parity::None,
            line: Line::TwoWire,
            mode: TransferMode::TxRx,
            pins: PinGroup::Group0,
        }
    }
}

impl UartConfig {
    /// 9600 baud, 8 data bits, no parity, one stop bit, both directions on two wires
    pub fn new() -> Self {
        Self::default()
    }

    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.stop_bits = stop_bits;
        self
    }

    pub fn word_length(mut self, word_length: WordLength) -> Self {
        self.word_length = word_length;
        self
    }

    pub fn parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    pub fn line(mut self, line: Line) -> Self {
        self.line = line;
        self
    }

    pub fn mode(mut self, mode: TransferMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn pins(mut self, pins: PinGroup) -> Self {
        self.pins = pins;
        self
    }

    /// Baud rate modulo divisor, `bus / (16 * baud)` rounded to nearest
    pub(crate) fn divisor(&self, bus_clock: u32) -> Option<u16> {
        if self.baud_rate == 0 {
            return None;
        }
        let sbr = ((bus_clock >> 4) * 10 / self.baud_rate + 5) / 10;
        match sbr {
            1..=0x1FFF => Some(sbr as u16),
            _ => None,
        }
    }

    pub(crate) fn bdh_bits(&self, sbr: u16) -> u8 {
        let stop = match self.stop_bits {
            StopBits::One => 0,
            StopBits::Two => bdh::SBNS,
        };
        stop | ((sbr >> 8) as u8 & bdh::SBR)
    }

    pub(crate) fn c1_bits(&self) -> u8 {
        let line = match self.line {
            Line::TwoWire => 0,
            Line::SingleWire => c1::LOOPS | c1::RSRC,
            Line::Loopback => c1::LOOPS,
        };
        let word = match self.word_length {
            WordLength::Eight => 0,
            WordLength::Nine => c1::M,
        };
        let parity = match self.parity {
            Parity::None => 0,
            Parity::Even => c1::PE,
            Parity::Odd => c1::PE | c1::PT,
        };
        line | word | parity
    }

    pub(crate) fn c2_bits(&self) -> u8 {
        match self.mode {
            TransferMode::TxOnly => c2::TE,
            TransferMode::RxOnly => c2::RE,
            TransferMode::TxRx => c2::TE | c2::RE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divisor() {
        let config = UartConfig::new().baud_rate(9600);
        assert_eq!(config.divisor(20_000_000), Some(130));
        let config = UartConfig::new().baud_rate(115_200);
        assert_eq!(config.divisor(20_000_000), Some(11));
        assert_eq!(config.divisor(40_000_000), Some(22));
    }

    #[test]
    fn test_divisor_out_of_range() {
        assert_eq!(UartConfig::new().baud_rate(0).divisor(20_000_000), None);
        // rounds to zero
        assert_eq!(UartConfig::new().baud_rate(10_000_000).divisor(20_000_000), None);
        // more than 13 bits
        assert_eq!(UartConfig::new().baud_rate(10).divisor(20_000_000), None);
    }

    #[test]
    fn test_register_bits() {
        let config = UartConfig::new()
            .stop_bits(StopBits::Two)
            .word_length(WordLength::Nine)
            .parity(Parity::Odd)
            .line(Line::SingleWire)
            .mode(TransferMode::RxOnly);
        assert_eq!(config.bdh_bits(0x1234 & 0x1FFF), 0x20 | 0x12);
        assert_eq!(config.c1_bits(), 0xA0 | 0x10 | 0x03);
        assert_eq!(config.c2_bits(), 0x04);
        let config = UartConfig::new().line(Line::Loopback).parity(Parity::Even);
        assert_eq!(config.c1_bits(), 0x80 | 0x02);
        assert_eq!(config.c2_bits(), 0x0C);
    }
}
