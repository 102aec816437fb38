//! UART/SPI/SIM register definitions
//!
//! This module is based on the register layout of the KEAZ128 reference manual. KEAZ64 and
//! KEAZN parts share the same UART and SPI blocks at the same addresses.
//!
//! Register blocks are only used by the on-chip instance types in [`crate::instance`]. Every
//! other access goes through [`RegisterFile`](crate::RegisterFile) and the register names
//! defined here.

#![allow(unused)]

use vcell::VolatileCell;

#[doc = "System integration module"]
pub mod sim;
#[doc = "Serial peripheral interface"]
pub mod spi;
#[doc = "Universal asynchronous receiver/transmitter"]
pub mod uart;

/// A memory-mapped register
#[repr(transparent)]
pub struct Reg<T: Copy> {
    cell: VolatileCell<T>,
}

impl<T: Copy> Reg<T> {
    /// Reads the register
    #[inline(always)]
    pub fn read(&self) -> T {
        self.cell.get()
    }

    /// Writes a value to the register
    #[inline(always)]
    pub fn write(&self, value: T) {
        self.cell.set(value)
    }

    /// Reads the register, passes the value to `f` and writes back the result
    #[inline(always)]
    pub fn modify<F>(&self, f: F)
    where
        F: FnOnce(T) -> T,
    {
        self.write(f(self.read()))
    }
}
