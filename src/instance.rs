//! On-chip UART and SPI instances
//!
//! Each instance type owns the register block of one peripheral. Creating one is unsafe: the
//! caller guarantees that no other code accesses that register block while the instance
//! exists.

use crate::pac::sim::{self, pinsel0, pinsel1, scgc, Pinsel};
use crate::pac::{spi, uart, Reg};
use crate::{PinMux, RegisterFile, SpiPeripheral, SpiRegister, UartPeripheral, UartRegister};

/// Pin group a peripheral is routed to
///
/// `Group0` is the reset routing. The pins of each group are listed in the SIM chapter of the
/// reference manual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinGroup {
    #[default]
    Group0,
    Group1,
}

/// On-chip UART instances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartInstance {
    Uart0,
    Uart1,
    Uart2,
}

impl UartInstance {
    /// Pin selection register and bit routing this instance to pin group 1
    pub fn pin_select(self) -> (Pinsel, u32) {
        match self {
            UartInstance::Uart0 => (Pinsel::Pinsel0, pinsel0::UART0PS),
            UartInstance::Uart1 => (Pinsel::Pinsel1, pinsel1::UART1PS),
            UartInstance::Uart2 => (Pinsel::Pinsel1, pinsel1::UART2PS),
        }
    }

    pub fn interrupt(self) -> Interrupt {
        match self {
            UartInstance::Uart0 => Interrupt::Uart0,
            UartInstance::Uart1 => Interrupt::Uart1,
            UartInstance::Uart2 => Interrupt::Uart2,
        }
    }

    fn clock_gate(self) -> u32 {
        match self {
            UartInstance::Uart0 => scgc::UART0,
            UartInstance::Uart1 => scgc::UART1,
            UartInstance::Uart2 => scgc::UART2,
        }
    }
}

/// On-chip SPI instances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiInstance {
    Spi0,
    Spi1,
}

impl SpiInstance {
    /// Pin selection register and bit routing this instance to pin group 1
    pub fn pin_select(self) -> (Pinsel, u32) {
        match self {
            SpiInstance::Spi0 => (Pinsel::Pinsel0, pinsel0::SPI0PS),
            SpiInstance::Spi1 => (Pinsel::Pinsel1, pinsel1::SPI1PS),
        }
    }

    pub fn interrupt(self) -> Interrupt {
        match self {
            SpiInstance::Spi0 => Interrupt::Spi0,
            SpiInstance::Spi1 => Interrupt::Spi1,
        }
    }

    fn clock_gate(self) -> u32 {
        match self {
            SpiInstance::Spi0 => scgc::SPI0,
            SpiInstance::Spi1 => scgc::SPI1,
        }
    }
}

/// Interrupt numbers of the serial peripherals
///
/// ```ignore
/// unsafe { cortex_m::peripheral::NVIC::unmask(UartInstance::Uart1.interrupt()) };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum Interrupt {
    Spi0 = 10,
    Spi1 = 11,
    Uart0 = 12,
    Uart1 = 13,
    Uart2 = 14,
}

unsafe impl cortex_m::interrupt::InterruptNumber for Interrupt {
    #[inline(always)]
    fn number(self) -> u16 {
        self as u16
    }
}

fn sim() -> &'static sim::RegisterBlock {
    unsafe { &*sim::SIM }
}

/// SIM registers are shared by all peripherals, so every read-modify-write runs in a critical
/// section
fn modify_sim<R, F>(register: R, f: F)
where
    R: FnOnce(&'static sim::RegisterBlock) -> &'static Reg<u32>,
    F: FnOnce(u32) -> u32,
{
    critical_section::with(|_| register(sim()).modify(f));
}

macro_rules! uart_instances {
    ($($name:ident: $variant:ident, $block:path;)+) => {
        $(
            #[doc = concat!("The ", stringify!($variant), " register block")]
            pub struct $name {
                bus_clock: u32,
            }

            impl $name {
                /// Creates the instance, given the frequency of the bus clock in hertz
                ///
                /// # Safety
                ///
                /// Only one instance may exist at a time, and no other code may access the
                /// register block while it exists.
                pub unsafe fn new(bus_clock: u32) -> Self {
                    $name { bus_clock }
                }

                /// Enables the clock gate of the peripheral
                pub fn enable_clock(&mut self) {
                    let gate = UartInstance::$variant.clock_gate();
                    modify_sim(|s| &s.scgc, |v| v | gate);
                }

                /// Disables the clock gate of the peripheral
                pub fn disable_clock(&mut self) {
                    let gate = UartInstance::$variant.clock_gate();
                    modify_sim(|s| &s.scgc, |v| v & !gate);
                }

                fn registers(&self) -> &uart::RegisterBlock {
                    unsafe { &*$block }
                }
            }

            impl RegisterFile for $name {
                type Register = UartRegister;

                fn read(&mut self, register: UartRegister) -> u8 {
                    self.registers().get(register).read()
                }

                fn write(&mut self, register: UartRegister, value: u8) {
                    self.registers().get(register).write(value)
                }
            }

            impl PinMux for $name {
                fn modify_pinsel<F>(&mut self, register: Pinsel, f: F)
                where
                    F: FnOnce(u32) -> u32,
                {
                    modify_sim(|s| s.pinsel(register), f);
                }
            }

            impl UartPeripheral for $name {
                fn instance(&self) -> Option<UartInstance> {
                    Some(UartInstance::$variant)
                }

                fn bus_clock(&self) -> u32 {
                    self.bus_clock
                }
            }
        )+
    };
}

macro_rules! spi_instances {
    ($($name:ident: $variant:ident, $block:path;)+) => {
        $(
            #[doc = concat!("The ", stringify!($variant), " register block")]
            pub struct $name {
                bus_clock: u32,
            }

            impl $name {
                /// Creates the instance, given the frequency of the bus clock in hertz
                ///
                /// # Safety
                ///
                /// Only one instance may exist at a time, and no other code may access the
                /// register block while it exists.
                pub unsafe fn new(bus_clock: u32) -> Self {
                    $name { bus_clock }
                }

                /// Enables the clock gate of the peripheral
                pub fn enable_clock(&mut self) {
                    let gate = SpiInstance::$variant.clock_gate();
                    modify_sim(|s| &s.scgc, |v| v | gate);
                }

                /// Disables the clock gate of the peripheral
                pub fn disable_clock(&mut self) {
                    let gate = SpiInstance::$variant.clock_gate();
                    modify_sim(|s| &s.scgc, |v| v & !gate);
                }

                fn registers(&self) -> &spi::RegisterBlock {
                    unsafe { &*$block }
                }
            }

            impl RegisterFile for $name {
                type Register = SpiRegister;

                fn read(&mut self, register: SpiRegister) -> u8 {
                    self.registers().get(register).read()
                }

                fn write(&mut self, register: SpiRegister, value: u8) {
                    self.registers().get(register).write(value)
                }
            }

            impl PinMux for $name {
                fn modify_pinsel<F>(&mut self, register: Pinsel, f: F)
                where
                    F: FnOnce(u32) -> u32,
                {
                    modify_sim(|s| s.pinsel(register), f);
                }
            }

            impl SpiPeripheral for $name {
                fn instance(&self) -> Option<SpiInstance> {
                    Some(SpiInstance::$variant)
                }

                fn bus_clock(&self) -> u32 {
                    self.bus_clock
                }
            }
        )+
    };
}

uart_instances! {
    Uart0: Uart0, uart::UART0;
    Uart1: Uart1, uart::UART1;
    Uart2: Uart2, uart::UART2;
}

spi_instances! {
    Spi0: Spi0, spi::SPI0;
    Spi1: Spi1, spi::SPI1;
}
