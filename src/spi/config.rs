//! SPI channel configuration

pub use ehal1::spi::{Mode, Phase, Polarity, MODE_0, MODE_1, MODE_2, MODE_3};

use crate::error::ConfigError;
use crate::instance::PinGroup;
use crate::pac::spi::{br, c1, c2};

/// Master or slave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    Master,
    Slave,
}

/// Data line usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Separate MOSI and MISO lines
    #[default]
    TwoLines,
    /// One bidirectional data line
    OneLine,
    /// One data line, receive only
    OneLineRxOnly,
}

/// Slave select pin usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Nss {
    /// Not used by the peripheral (master) or always selected (slave)
    #[default]
    None,
    /// Mode fault input: another master pulling it low raises a mode fault
    ModeFaultInput,
    /// Automatic slave select output (master only)
    ChipSelectOutput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    #[default]
    MsbFirst,
    LsbFirst,
}

/// Baud rate prescaler, first stage of the bus clock division
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Prescaler {
    #[default]
    Div1,
    Div2,
    Div3,
    Div4,
    Div5,
    Div6,
    Div7,
    Div8,
}

/// Baud rate divisor, second stage of the bus clock division
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Scaler {
    #[default]
    Div2,
    Div4,
    Div8,
    Div16,
    Div32,
    Div64,
    Div128,
    Div256,
    Div512,
}

/// SPI channel configuration
///
/// ```
/// # use kinetis_ke_serial::spi::config::*;
/// let config = SpiConfig::new_master()
///     .mode(MODE_3)
///     .prescaler(Prescaler::Div5)
///     .scaler(Scaler::Div4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiConfig {
    pub role: Role,
    pub direction: Direction,
    pub mode: Mode,
    pub nss: Nss,
    pub bit_order: BitOrder,
    pub prescaler: Prescaler,
    pub scaler: Scaler,
    /// Value of the match register, `None` to disable byte matching
    pub match_value: Option<u8>,
    pub pins: PinGroup,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self::new_master()
    }
}

impl SpiConfig {
    /// Master, two lines, mode 0, MSB first, bus clock divided by 2
    pub fn new_master() -> Self {
        SpiConfig {
            role: Role::Master,
            direction: Direction::TwoLines,
            mode: MODE_0,
            nss: Nss::None,
            bit_order: BitOrder::MsbFirst,
            prescaler: Prescaler::Div1,
            scaler: Scaler::Div2,
            match_value: None,
            pins: PinGroup::Group0,
        }
    }

    /// Slave, two lines, mode 0, MSB first
    pub fn new_slave() -> Self {
        SpiConfig {
            role: Role::Slave,
            ..Self::new_master()
        }
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn nss(mut self, nss: Nss) -> Self {
        self.nss = nss;
        self
    }

    pub fn bit_order(mut self, bit_order: BitOrder) -> Self {
        self.bit_order = bit_order;
        self
    }

    pub fn prescaler(mut self, prescaler: Prescaler) -> Self {
        self.prescaler = prescaler;
        self
    }

    pub fn scaler(mut self, scaler: Scaler) -> Self {
        self.scaler = scaler;
        self
    }

    pub fn match_value(mut self, value: Option<u8>) -> Self {
        self.match_value = value;
        self
    }

    pub fn pins(mut self, pins: PinGroup) -> Self {
        self.pins = pins;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.role == Role::Slave && self.nss == Nss::ChipSelectOutput {
            return Err(ConfigError::NssRole);
        }
        Ok(())
    }

    /// C1 without the enable and interrupt bits
    pub(crate) fn c1_bits(&self) -> u8 {
        let mut bits = 0;
        if self.role == Role::Master {
            bits |= c1::MSTR;
        }
        if self.mode.polarity == Polarity::IdleHigh {
            bits |= c1::CPOL;
        }
        if self.mode.phase == Phase::CaptureOnSecondTransition {
            bits |= c1::CPHA;
        }
        if self.nss == Nss::ChipSelectOutput {
            bits |= c1::SSOE;
        }
        if self.bit_order == BitOrder::LsbFirst {
            bits |= c1::LSBFE;
        }
        bits
    }

    /// C2 without the interrupt and output enable bits
    pub(crate) fn c2_bits(&self) -> u8 {
        let mut bits = 0;
        if self.nss != Nss::None {
            bits |= c2::MODFEN;
        }
        if self.direction != Direction::TwoLines {
            bits |= c2::SPC0;
        }
        bits
    }

    pub(crate) fn br_bits(&self) -> u8 {
        ((self.prescaler as u8) << br::SPPR_SHIFT) | self.scaler as u8
    }
}

/// SCK frequency for a baud rate register value
pub(crate) fn baud_rate(bus_clock: u32, br_value: u8) -> u32 {
    let prescale = u32::from((br_value & br::SPPR) >> br::SPPR_SHIFT) + 1;
    let shift = u32::from(br_value & br::SPR) + 1;
    (bus_clock / prescale) >> shift
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_bits() {
        let config = SpiConfig::new_master()
            .mode(MODE_3)
            .nss(Nss::ChipSelectOutput)
            .bit_order(BitOrder::LsbFirst)
            .direction(Direction::OneLine);
        assert_eq!(config.c1_bits(), 0x10 | 0x08 | 0x04 | 0x02 | 0x01);
        assert_eq!(config.c2_bits(), 0x10 | 0x01);
        let config = SpiConfig::new_slave().nss(Nss::ModeFaultInput);
        assert_eq!(config.c1_bits(), 0);
        assert_eq!(config.c2_bits(), 0x10);
    }

    #[test]
    fn test_br_bits() {
        let config = SpiConfig::new_master()
            .prescaler(Prescaler::Div8)
            .scaler(Scaler::Div512);
        assert_eq!(config.br_bits(), 0x78);
        assert_eq!(SpiConfig::new_master().br_bits(), 0);
    }

    #[test]
    fn test_baud_rate() {
        assert_eq!(baud_rate(20_000_000, 0x00), 10_000_000);
        // divide by 5, then by 4
        assert_eq!(baud_rate(20_000_000, 0x41), 1_000_000);
        assert_eq!(baud_rate(24_000_000, 0x78), 24_000_000 / 8 / 512);
    }

    #[test]
    fn test_validate() {
        assert_eq!(
            SpiConfig::new_slave().nss(Nss::ChipSelectOutput).validate(),
            Err(ConfigError::NssRole)
        );
        assert_eq!(SpiConfig::new_master().nss(Nss::ChipSelectOutput).validate(), Ok(()));
    }
}
