//! Error types
//!
//! Synchronous failures of channel operations are reported through [`Error`]. Faults detected
//! by the hardware while an interrupt-driven transfer runs are not returned from any call: they
//! are accumulated as [`UartErrors`] or [`SpiErrors`] flags, handed to the channel's `error`
//! hook and cleared afterwards.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

/// Failure of a channel operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The channel is locked or already transferring. Nothing was changed.
    Busy,
    /// Empty or misaligned buffer, or a zero timeout where one is required. Nothing was
    /// changed.
    InvalidArgument,
    /// A status flag did not reach the expected value in time. Interrupts of the channel
    /// have been disarmed and its state forced back to ready.
    Timeout,
    /// The configuration cannot be applied
    Config(ConfigError),
}

/// Reason a configuration was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The register file does not belong to an on-chip instance
    UnknownInstance,
    /// Baud rate of zero, or a baud rate the divisor field cannot represent
    BaudRate,
    /// Half-duplex configuration requested on a two-wire line
    LineMode,
    /// Slave select output requested in slave mode
    NssRole,
    /// The SysTick reload value for a 1 ms period does not fit in 24 bits
    TickReload,
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Busy => f.write_str("channel busy"),
            Error::InvalidArgument => f.write_str("invalid argument"),
            Error::Timeout => f.write_str("timeout"),
            Error::Config(e) => write!(f, "configuration error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConfigError::UnknownInstance => "unknown peripheral instance",
            ConfigError::BaudRate => "unsupported baud rate",
            ConfigError::LineMode => "line mode not allowed",
            ConfigError::NssRole => "slave select output needs master mode",
            ConfigError::TickReload => "tick reload out of range",
        };
        f.write_str(msg)
    }
}

macro_rules! error_flags {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $(#[$fmeta:meta])* const $flag:ident = $bits:expr; )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub struct $name(u8);

        impl $name {
            /// No error
            pub const NONE: Self = Self(0);
            $( $(#[$fmeta])* pub const $flag: Self = Self($bits); )*

            /// Raw flag bits
            pub const fn bits(self) -> u8 {
                self.0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// Returns true if every flag of `other` is also set in `self`
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }
        }

        impl BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }
    };
}

error_flags! {
    /// UART fault flags
    pub struct UartErrors {
        /// Parity error
        const PARITY = 0x01;
        /// Noise error
        const NOISE = 0x02;
        /// Framing error
        const FRAMING = 0x04;
        /// Receiver overrun
        const OVERRUN = 0x08;
        /// Rejected configuration
        const CONFIG = 0x10;
    }
}

error_flags! {
    /// SPI fault flags
    pub struct SpiErrors {
        /// Master mode fault
        const MODE_FAULT = 0x01;
        /// Received byte equal to the match register
        const MATCH = 0x02;
    }
}

impl UartErrors {
    /// Translates the error flags of the UART S1 register
    pub(crate) fn from_status(s1: u8) -> Self {
        use crate::pac::uart::s1;
        let mut errors = Self::NONE;
        if s1 & s1::OR != 0 {
            errors |= Self::OVERRUN;
        }
        if s1 & s1::NF != 0 {
            errors |= Self::NOISE;
        }
        if s1 & s1::FE != 0 {
            errors |= Self::FRAMING;
        }
        if s1 & s1::PF != 0 {
            errors |= Self::PARITY;
        }
        errors
    }
}
