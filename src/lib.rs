//! UART and SPI channel drivers for Kinetis KEAZ (Cortex-M0+) microcontrollers.
//!
//! This library implements the transfer layer of the UART and SPI peripherals: a channel
//! lifecycle (reset, ready, busy, timeout, error), blocking transfers bounded by a millisecond
//! [`TickClock`], interrupt-driven transfers moving one unit per interrupt, and 8-bit or 9-bit
//! UART framing with the ninth bit carried in a control register.
//!
//! Channels are created around a type implementing [`UartPeripheral`] or [`SpiPeripheral`].
//! The on-chip instances in [`instance`] implement them over the memory-mapped registers; any
//! other [`RegisterFile`] (a bus bridge, a simulation) can be used in their place.
//!
//! # Usage
//!
//! ```ignore
//! use kinetis_ke_serial::instance::Uart1;
//! use kinetis_ke_serial::uart::{UartChannel, UartConfig};
//! use kinetis_ke_serial::{NoHooks, SysTickClock};
//!
//! let mut uart1 = unsafe { Uart1::new(20_000_000) };
//! uart1.enable_clock();
//! let mut channel = UartChannel::new(uart1, SysTickClock, NoHooks);
//! channel.configure(UartConfig::new().baud_rate(9600))?;
//! channel.transmit(b"ABC", 100)?;
//! ```
//!
//! # Interrupts
//!
//! The interrupt path of a channel is its `on_interrupt` method. A channel shared between the
//! foreground and an interrupt handler must be placed in a
//! `critical_section::Mutex<RefCell<_>>`; the borrow then guarantees that the foreground and
//! the interrupt path never run on one channel at the same time. Interrupt numbers for NVIC
//! unmasking are provided by [`instance::Interrupt`].
//!
//! # Hooks
//!
//! Board specific initialization and completion notifications are delivered through the
//! [`UartHooks`](uart::UartHooks) and [`SpiHooks`](spi::SpiHooks) traits. Every method has an
//! empty default implementation, and [`NoHooks`] implements both.
//!
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

mod ehal;
pub mod error;
pub mod instance;
pub mod pac;
pub mod spi;
pub mod state;
pub mod tick;
pub mod uart;

#[cfg(test)]
mod testing;

pub use crate::error::{ConfigError, Error, SpiErrors, UartErrors};
pub use crate::instance::{PinGroup, SpiInstance, UartInstance};
pub use crate::pac::sim::Pinsel;
pub use crate::pac::spi::Register as SpiRegister;
pub use crate::pac::uart::Register as UartRegister;
pub use crate::state::{Lock, State};
pub use crate::tick::{SysTickClock, TickClock, MAX_DELAY};

/// Byte-wide register access to one peripheral instance
///
/// Reads take `&mut self` because reading a status or data register may clear hardware flags.
pub trait RegisterFile {
    /// Register names of the peripheral
    type Register: Copy;

    fn read(&mut self, register: Self::Register) -> u8;

    fn write(&mut self, register: Self::Register, value: u8);

    /// Reads a register, passes the value to `f` and writes back the result
    fn modify<F>(&mut self, register: Self::Register, f: F)
    where
        F: FnOnce(u8) -> u8,
    {
        let value = self.read(register);
        self.write(register, f(value));
    }

    fn set_bits(&mut self, register: Self::Register, mask: u8) {
        self.modify(register, |v| v | mask);
    }

    fn clear_bits(&mut self, register: Self::Register, mask: u8) {
        self.modify(register, |v| v & !mask);
    }

    /// Returns true if any bit of `mask` is set in the register
    fn is_set(&mut self, register: Self::Register, mask: u8) -> bool {
        self.read(register) & mask != 0
    }
}

/// Access to the SIM pin selection registers that route a peripheral to its pins
pub trait PinMux {
    fn modify_pinsel<F>(&mut self, register: Pinsel, f: F)
    where
        F: FnOnce(u32) -> u32;
}

/// A UART register file that can be used by a [`UartChannel`](uart::UartChannel)
pub trait UartPeripheral: RegisterFile<Register = UartRegister> + PinMux {
    /// Returns the on-chip instance behind this register file, if any
    ///
    /// Configuration of a channel is rejected when this returns `None`.
    fn instance(&self) -> Option<UartInstance>;

    /// Frequency of the bus clock feeding the baud rate generator, in hertz
    fn bus_clock(&self) -> u32;
}

/// A SPI register file that can be used by a [`SpiChannel`](spi::SpiChannel)
pub trait SpiPeripheral: RegisterFile<Register = SpiRegister> + PinMux {
    /// Returns the on-chip instance behind this register file, if any
    ///
    /// Configuration of a channel is rejected when this returns `None`.
    fn instance(&self) -> Option<SpiInstance>;

    /// Frequency of the bus clock feeding the baud rate generator, in hertz
    fn bus_clock(&self) -> u32;
}

/// Hooks implementation that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;
