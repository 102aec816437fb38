//! UART character formats
//!
//! A transfer buffer is a sequence of units. With 9-bit characters and no parity a unit is a
//! little endian pair of bytes holding the 9-bit word; in every other format a unit is one
//! byte.

use super::config::{Parity, UartConfig, WordLength};
use crate::pac::uart::c3;
use crate::{RegisterFile, UartRegister};

/// Character format derived from word length and parity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// 8 data bits
    Data8,
    /// 7 data bits and parity
    Data7Parity,
    /// 9 data bits, the ninth in `C3.T8` / `C3.R8`
    Data9,
    /// 8 data bits and parity
    Data8Parity,
}

impl Format {
    pub fn of(config: &UartConfig) -> Self {
        match (config.word_length, config.parity) {
            (WordLength::Eight, Parity::None) => Format::Data8,
            (WordLength::Eight, _) => Format::Data7Parity,
            (WordLength::Nine, Parity::None) => Format::Data9,
            (WordLength::Nine, _) => Format::Data8Parity,
        }
    }

    /// Number of buffer bytes per character
    pub fn unit_size(self) -> usize {
        match self {
            Format::Data9 => 2,
            _ => 1,
        }
    }

    /// Number of whole units in a buffer, or `None` if the buffer is empty or does not hold a
    /// whole number of units
    pub fn units(self, len: usize) -> Option<usize> {
        let size = self.unit_size();
        if len == 0 || len % size != 0 {
            None
        } else {
            Some(len / size)
        }
    }

    /// Writes one unit to the data register
    ///
    /// `TDRE` must be set. In 9-bit mode the ninth bit is written to `C3` before the data
    /// register, because writing `D` starts the transmission.
    pub fn write_unit<R>(self, registers: &mut R, unit: &[u8])
    where
        R: RegisterFile<Register = UartRegister>,
    {
        if let Format::Data9 = self {
            let ninth = unit[1] & 0x01 != 0;
            registers.modify(UartRegister::C3, |v| {
                if ninth {
                    v | c3::T8
                } else {
                    v & !c3::T8
                }
            });
        }
        registers.write(UartRegister::D, unit[0]);
    }

    /// Reads one unit from the data register into `unit`
    ///
    /// `RDRF` must be set. In 9-bit mode `C3.R8` is read first, because reading `D` releases the
    /// receive buffer.
    pub fn read_unit<R>(self, registers: &mut R, unit: &mut [u8])
    where
        R: RegisterFile<Register = UartRegister>,
    {
        match self {
            Format::Data8 | Format::Data8Parity => unit[0] = registers.read(UartRegister::D),
            Format::Data7Parity => unit[0] = registers.read(UartRegister::D) & 0x7F,
            Format::Data9 => {
                let ninth = registers.is_set(UartRegister::C3, c3::R8);
                unit[0] = registers.read(UartRegister::D);
                unit[1] = u8::from(ninth);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SimUart;

    #[test]
    fn test_units() {
        assert_eq!(Format::Data8.units(3), Some(3));
        assert_eq!(Format::Data9.units(4), Some(2));
        assert_eq!(Format::Data9.units(3), None);
        assert_eq!(Format::Data8Parity.units(0), None);
    }

    #[test]
    fn test_format_of() {
        let config = UartConfig::new().word_length(WordLength::Nine);
        assert_eq!(Format::of(&config), Format::Data9);
        assert_eq!(Format::of(&config.parity(Parity::Odd)), Format::Data8Parity);
        let config = UartConfig::new().parity(Parity::Even);
        assert_eq!(Format::of(&config), Format::Data7Parity);
    }

    #[test]
    fn test_ninth_bit_before_data() {
        let mut sim = SimUart::new();
        Format::Data9.write_unit(&mut sim, &[0x55, 0x01]);
        Format::Data9.write_unit(&mut sim, &[0xAA, 0x00]);
        assert_eq!(sim.transmitted, [0x155, 0x0AA]);
        let order: Vec<UartRegister> = sim.writes.iter().map(|&(r, _)| r).collect();
        assert_eq!(
            order,
            [
                UartRegister::C3,
                UartRegister::D,
                UartRegister::C3,
                UartRegister::D
            ]
        );
    }

    #[test]
    fn test_read_masks_parity_bit() {
        let mut sim = SimUart::new();
        sim.incoming.extend([0x1C1, 0x1C1]);
        let mut unit = [0u8; 2];
        Format::Data7Parity.read_unit(&mut sim, &mut unit[..1]);
        assert_eq!(unit[0], 0x41);
        Format::Data9.read_unit(&mut sim, &mut unit);
        assert_eq!(unit, [0xC1, 0x01]);
    }
}
