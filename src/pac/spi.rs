use super::Reg;

/// SPI register block
#[repr(C)]
pub struct RegisterBlock {
    #[doc = "0x00 - Control register 1"]
    pub c1: Reg<u8>,
    #[doc = "0x01 - Control register 2"]
    pub c2: Reg<u8>,
    #[doc = "0x02 - Baud rate register"]
    pub br: Reg<u8>,
    #[doc = "0x03 - Status register"]
    pub s: Reg<u8>,
    _reserved0: u8,
    #[doc = "0x05 - Data register"]
    pub d: Reg<u8>,
    _reserved1: u8,
    #[doc = "0x07 - Match register"]
    pub m: Reg<u8>,
}

impl RegisterBlock {
    /// Returns the register with the provided name
    pub fn get(&self, register: Register) -> &Reg<u8> {
        match register {
            Register::C1 => &self.c1,
            Register::C2 => &self.c2,
            Register::Br => &self.br,
            Register::S => &self.s,
            Register::D => &self.d,
            Register::M => &self.m,
        }
    }
}

/// Names of the SPI registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    C1,
    C2,
    Br,
    S,
    D,
    M,
}

impl Register {
    /// Byte offset of this register from the start of the block
    pub const fn offset(self) -> usize {
        match self {
            Register::C1 => 0,
            Register::C2 => 1,
            Register::Br => 2,
            Register::S => 3,
            Register::D => 5,
            Register::M => 7,
        }
    }
}

pub const SPI0: *const RegisterBlock = 0x4007_6000 as *const RegisterBlock;
pub const SPI1: *const RegisterBlock = 0x4007_7000 as *const RegisterBlock;

pub mod c1 {
    /// Receive buffer full and mode fault interrupt enable
    pub const SPIE: u8 = 1 << 7;
    pub const SPE: u8 = 1 << 6;
    /// Transmit buffer empty interrupt enable
    pub const SPTIE: u8 = 1 << 5;
    pub const MSTR: u8 = 1 << 4;
    pub const CPOL: u8 = 1 << 3;
    pub const CPHA: u8 = 1 << 2;
    /// Slave select output enable
    pub const SSOE: u8 = 1 << 1;
    pub const LSBFE: u8 = 1 << 0;
}

pub mod c2 {
    /// Match interrupt enable
    pub const SPMIE: u8 = 1 << 7;
    /// Master mode-fault function enable
    pub const MODFEN: u8 = 1 << 4;
    /// Bidirectional mode output enable
    pub const BIDIROE: u8 = 1 << 3;
    pub const SPISWAI: u8 = 1 << 1;
    /// Single-wire bidirectional mode
    pub const SPC0: u8 = 1 << 0;
}

pub mod br {
    /// Prescaler divisor field, `SPPR + 1`
    pub const SPPR: u8 = 0x70;
    pub const SPPR_SHIFT: u8 = 4;
    /// Rate divisor field, `2^(SPR + 1)`
    pub const SPR: u8 = 0x0F;
}

pub mod s {
    /// Read buffer full
    pub const SPRF: u8 = 1 << 7;
    /// Match flag (write 1 to clear)
    pub const SPMF: u8 = 1 << 6;
    /// Transmit buffer empty
    pub const SPTEF: u8 = 1 << 5;
    /// Master mode fault
    pub const MODF: u8 = 1 << 4;
}
