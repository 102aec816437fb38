use super::Reg;

/// SIM register block (the part of it used by this crate)
#[repr(C)]
pub struct RegisterBlock {
    #[doc = "0x00 - System reset status and ID register"]
    pub srsid: Reg<u32>,
    #[doc = "0x04 - System options register 0"]
    pub sopt0: Reg<u32>,
    #[doc = "0x08 - System options register 1"]
    pub sopt1: Reg<u32>,
    #[doc = "0x0C - Pin selection register 0"]
    pub pinsel0: Reg<u32>,
    #[doc = "0x10 - Pin selection register 1"]
    pub pinsel1: Reg<u32>,
    #[doc = "0x14 - System clock gating control register"]
    pub scgc: Reg<u32>,
}

pub const SIM: *const RegisterBlock = 0x4004_8000 as *const RegisterBlock;

/// Pin selection registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pinsel {
    Pinsel0,
    Pinsel1,
}

impl RegisterBlock {
    pub fn pinsel(&self, register: Pinsel) -> &Reg<u32> {
        match register {
            Pinsel::Pinsel0 => &self.pinsel0,
            Pinsel::Pinsel1 => &self.pinsel1,
        }
    }
}

pub mod pinsel0 {
    /// UART0 on PTA3/PTA2 instead of PTB1/PTB0
    pub const UART0PS: u32 = 1 << 7;
    /// SPI0 on PTE0/PTE1/PTE2/PTE3 instead of PTB2/PTB3/PTB4/PTB5
    pub const SPI0PS: u32 = 1 << 6;
}

pub mod pinsel1 {
    pub const UART2PS: u32 = 1 << 13;
    pub const UART1PS: u32 = 1 << 12;
    pub const SPI1PS: u32 = 1 << 11;
}

pub mod scgc {
    pub const SPI0: u32 = 1 << 18;
    pub const SPI1: u32 = 1 << 19;
    pub const UART0: u32 = 1 << 20;
    pub const UART1: u32 = 1 << 21;
    pub const UART2: u32 = 1 << 22;
}
