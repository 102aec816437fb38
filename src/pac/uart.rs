use super::Reg;

/// UART register block
#[repr(C)]
pub struct RegisterBlock {
    #[doc = "0x00 - Baud rate register high"]
    pub bdh: Reg<u8>,
    #[doc = "0x01 - Baud rate register low"]
    pub bdl: Reg<u8>,
    #[doc = "0x02 - Control register 1"]
    pub c1: Reg<u8>,
    #[doc = "0x03 - Control register 2"]
    pub c2: Reg<u8>,
    #[doc = "0x04 - Status register 1"]
    pub s1: Reg<u8>,
    #[doc = "0x05 - Status register 2"]
    pub s2: Reg<u8>,
    #[doc = "0x06 - Control register 3"]
    pub c3: Reg<u8>,
    #[doc = "0x07 - Data register"]
    pub d: Reg<u8>,
}

impl RegisterBlock {
    /// Returns the register with the provided name
    pub fn get(&self, register: Register) -> &Reg<u8> {
        match register {
            Register::Bdh => &self.bdh,
            Register::Bdl => &self.bdl,
            Register::C1 => &self.c1,
            Register::C2 => &self.c2,
            Register::S1 => &self.s1,
            Register::S2 => &self.s2,
            Register::C3 => &self.c3,
            Register::D => &self.d,
        }
    }
}

/// Names of the UART registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    Bdh,
    Bdl,
    C1,
    C2,
    S1,
    S2,
    C3,
    D,
}

impl Register {
    /// Byte offset of this register from the start of the block
    pub const fn offset(self) -> usize {
        self as usize
    }
}

pub const UART0: *const RegisterBlock = 0x4006_A000 as *const RegisterBlock;
pub const UART1: *const RegisterBlock = 0x4006_B000 as *const RegisterBlock;
pub const UART2: *const RegisterBlock = 0x4006_C000 as *const RegisterBlock;

pub mod bdh {
    /// LIN break detect interrupt enable
    pub const LBKDIE: u8 = 1 << 7;
    /// RxD input active edge interrupt enable
    pub const RXEDGIE: u8 = 1 << 6;
    /// Stop bit number select (set: two stop bits)
    pub const SBNS: u8 = 1 << 5;
    /// Upper five bits of the baud rate modulo divisor
    pub const SBR: u8 = 0x1F;
}

pub mod c1 {
    pub const LOOPS: u8 = 1 << 7;
    pub const UARTSWAI: u8 = 1 << 6;
    /// Receiver source select (single-wire mode when LOOPS is set)
    pub const RSRC: u8 = 1 << 5;
    /// 9-bit mode
    pub const M: u8 = 1 << 4;
    /// Wakeup by address mark instead of idle line
    pub const WAKE: u8 = 1 << 3;
    pub const ILT: u8 = 1 << 2;
    pub const PE: u8 = 1 << 1;
    /// Odd parity
    pub const PT: u8 = 1 << 0;
}

pub mod c2 {
    pub const TIE: u8 = 1 << 7;
    pub const TCIE: u8 = 1 << 6;
    pub const RIE: u8 = 1 << 5;
    pub const ILIE: u8 = 1 << 4;
    pub const TE: u8 = 1 << 3;
    pub const RE: u8 = 1 << 2;
    pub const RWU: u8 = 1 << 1;
    /// Send break
    pub const SBK: u8 = 1 << 0;
    /// All interrupt enables of this register
    pub const INTERRUPTS: u8 = TIE | TCIE | RIE | ILIE;
}

pub mod s1 {
    pub const TDRE: u8 = 1 << 7;
    pub const TC: u8 = 1 << 6;
    pub const RDRF: u8 = 1 << 5;
    pub const IDLE: u8 = 1 << 4;
    pub const OR: u8 = 1 << 3;
    pub const NF: u8 = 1 << 2;
    pub const FE: u8 = 1 << 1;
    pub const PF: u8 = 1 << 0;
    /// Receive error flags
    pub const ERRORS: u8 = OR | NF | FE | PF;
}

pub mod s2 {
    /// LIN break detect interrupt flag (write 1 to clear)
    pub const LBKDIF: u8 = 1 << 7;
    /// RxD pin active edge interrupt flag (write 1 to clear)
    pub const RXEDGIF: u8 = 1 << 6;
    pub const RXINV: u8 = 1 << 4;
    /// Receive wakeup idle detect
    pub const RWUID: u8 = 1 << 3;
    pub const BRK13: u8 = 1 << 2;
    /// LIN break detection enable
    pub const LBKDE: u8 = 1 << 1;
    pub const RAF: u8 = 1 << 0;
    /// Flags cleared by writing 1
    pub const W1C: u8 = LBKDIF | RXEDGIF;
}

pub mod c3 {
    /// Ninth received data bit
    pub const R8: u8 = 1 << 7;
    /// Ninth transmitted data bit
    pub const T8: u8 = 1 << 6;
    /// TxD pin direction in single-wire mode (set: output)
    pub const TXDIR: u8 = 1 << 5;
    pub const TXINV: u8 = 1 << 4;
    pub const ORIE: u8 = 1 << 3;
    pub const NEIE: u8 = 1 << 2;
    pub const FEIE: u8 = 1 << 1;
    pub const PEIE: u8 = 1 << 0;
    /// All error interrupt enables
    pub const ERROR_INTERRUPTS: u8 = ORIE | NEIE | FEIE | PEIE;
}
