//! Simulated peripherals, a stepping clock and a recording hook set for unit tests

use std::cell::Cell;
use std::collections::VecDeque;

use crate::error::{SpiErrors, UartErrors};
use crate::pac::{spi, uart};
use crate::spi::SpiHooks;
use crate::tick::TickClock;
use crate::uart::UartHooks;
use crate::{
    PinMux, Pinsel, RegisterFile, SpiInstance, SpiPeripheral, SpiRegister, UartInstance,
    UartPeripheral, UartRegister,
};

const BUS_CLOCK: u32 = 20_000_000;

fn pinsel_index(register: Pinsel) -> usize {
    match register {
        Pinsel::Pinsel0 => 0,
        Pinsel::Pinsel1 => 1,
    }
}

/// A clock that advances by `step` every time it is sampled
pub struct StepClock {
    ticks: Cell<u32>,
    step: u32,
}

impl StepClock {
    pub fn new(start: u32, step: u32) -> Self {
        StepClock {
            ticks: Cell::new(start),
            step,
        }
    }

    /// Current count, without advancing
    pub fn peek(&self) -> u32 {
        self.ticks.get()
    }
}

impl TickClock for StepClock {
    fn now(&self) -> u32 {
        let now = self.ticks.get();
        self.ticks.set(now.wrapping_add(self.step));
        now
    }

    fn tick(&self) {
        self.ticks.set(self.ticks.get().wrapping_add(1));
    }
}

/// A UART register file
///
/// Words are 9 bits wide. S1 reports TDRE and TC while `tx_ready` is set and RDRF while
/// `incoming` is not empty; its other flags are stored and clear on an S1 read followed by a
/// D read. Reading C3 shows the ninth bit of the next incoming word in R8.
pub struct SimUart {
    regs: [u8; 8],
    pinsel: [u32; 2],
    status_read: bool,
    pub instance: Option<UartInstance>,
    /// Every register write, in order
    pub writes: Vec<(UartRegister, u8)>,
    /// Words written to D, with T8 as bit 8
    pub transmitted: Vec<u16>,
    /// Words to be received
    pub incoming: VecDeque<u16>,
    /// Transmitted words are also received
    pub loopback: bool,
    pub tx_ready: bool,
}

impl SimUart {
    pub fn new() -> Self {
        SimUart {
            regs: [0; 8],
            pinsel: [0; 2],
            status_read: false,
            instance: Some(UartInstance::Uart1),
            writes: Vec::new(),
            transmitted: Vec::new(),
            incoming: VecDeque::new(),
            loopback: false,
            tx_ready: true,
        }
    }

    /// Stored register value
    pub fn reg(&self, register: UartRegister) -> u8 {
        self.regs[register.offset()]
    }

    /// Sets a stored register value without logging a write
    pub fn set_reg(&mut self, register: UartRegister, value: u8) {
        self.regs[register.offset()] = value;
    }

    pub fn pinsel(&self, register: Pinsel) -> u32 {
        self.pinsel[pinsel_index(register)]
    }
}

impl RegisterFile for SimUart {
    type Register = UartRegister;

    fn read(&mut self, register: UartRegister) -> u8 {
        use uart::{c3, s1};
        let stored = self.reg(register);
        match register {
            UartRegister::S1 => {
                self.status_read = true;
                let mut value = stored & !(s1::TDRE | s1::TC | s1::RDRF);
                if self.tx_ready {
                    value |= s1::TDRE | s1::TC;
                }
                if !self.incoming.is_empty() {
                    value |= s1::RDRF;
                }
                value
            }
            UartRegister::C3 => {
                let ninth = self.incoming.front().map_or(false, |w| w & 0x100 != 0);
                if ninth {
                    stored | c3::R8
                } else {
                    stored & !c3::R8
                }
            }
            UartRegister::D => {
                if self.status_read {
                    self.regs[UartRegister::S1.offset()] &= !(s1::IDLE | s1::ERRORS);
                    self.status_read = false;
                }
                self.incoming.pop_front().map_or(0, |w| w as u8)
            }
            _ => stored,
        }
    }

    fn write(&mut self, register: UartRegister, value: u8) {
        use uart::{c3, s2};
        self.writes.push((register, value));
        match register {
            UartRegister::S1 => {}
            UartRegister::S2 => {
                let stored = self.reg(register);
                let flags = stored & s2::W1C & !value;
                self.set_reg(register, flags | (value & !s2::W1C));
            }
            UartRegister::D => {
                let ninth = if self.reg(UartRegister::C3) & c3::T8 != 0 {
                    0x100
                } else {
                    0
                };
                let word = ninth | u16::from(value);
                self.transmitted.push(word);
                if self.loopback {
                    self.incoming.push_back(word);
                }
            }
            _ => self.set_reg(register, value),
        }
    }
}

impl PinMux for SimUart {
    fn modify_pinsel<F>(&mut self, register: Pinsel, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let slot = &mut self.pinsel[pinsel_index(register)];
        *slot = f(*slot);
    }
}

impl UartPeripheral for SimUart {
    fn instance(&self) -> Option<UartInstance> {
        self.instance
    }

    fn bus_clock(&self) -> u32 {
        BUS_CLOCK
    }
}

/// An access to the SPI data register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataAccess {
    Write(u8),
    Read(u8),
}

/// When the simulated SPI reports a received byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxMode {
    /// While bytes are queued in `slave`
    Queued,
    /// After each write to D, until D is read
    AfterWrite,
    /// Always
    Always,
}

/// A SPI register file
///
/// S reports SPTEF while `tx_ready` is set and SPRF according to `rx_mode`. MODF and SPMF are
/// stored: MODF clears on a C1 write, SPMF when written with 1. D reads return the bytes of
/// `slave` in order, then zero.
pub struct SimSpi {
    regs: [u8; 8],
    pinsel: [u32; 2],
    pending: bool,
    rx_mode: RxMode,
    pub instance: Option<SpiInstance>,
    pub writes: Vec<(SpiRegister, u8)>,
    /// Every access to D, in order
    pub data: Vec<DataAccess>,
    /// Bytes shifted in from the other side
    pub slave: VecDeque<u8>,
    pub tx_ready: bool,
}

impl SimSpi {
    pub fn new(rx_mode: RxMode) -> Self {
        SimSpi {
            regs: [0; 8],
            pinsel: [0; 2],
            pending: false,
            rx_mode,
            instance: Some(SpiInstance::Spi0),
            writes: Vec::new(),
            data: Vec::new(),
            slave: VecDeque::new(),
            tx_ready: true,
        }
    }

    pub fn reg(&self, register: SpiRegister) -> u8 {
        self.regs[register.offset()]
    }

    pub fn set_reg(&mut self, register: SpiRegister, value: u8) {
        self.regs[register.offset()] = value;
    }

    pub fn pinsel(&self, register: Pinsel) -> u32 {
        self.pinsel[pinsel_index(register)]
    }

    fn rx_full(&self) -> bool {
        match self.rx_mode {
            RxMode::Queued => !self.slave.is_empty(),
            RxMode::AfterWrite => self.pending,
            RxMode::Always => true,
        }
    }
}

impl RegisterFile for SimSpi {
    type Register = SpiRegister;

    fn read(&mut self, register: SpiRegister) -> u8 {
        use spi::s;
        match register {
            SpiRegister::S => {
                let mut value = self.reg(register) & (s::MODF | s::SPMF);
                if self.tx_ready {
                    value |= s::SPTEF;
                }
                if self.rx_full() {
                    value |= s::SPRF;
                }
                value
            }
            SpiRegister::D => {
                self.pending = false;
                let byte = self.slave.pop_front().unwrap_or(0);
                self.data.push(DataAccess::Read(byte));
                byte
            }
            _ => self.reg(register),
        }
    }

    fn write(&mut self, register: SpiRegister, value: u8) {
        use spi::s;
        self.writes.push((register, value));
        match register {
            SpiRegister::S => {
                if value & s::SPMF != 0 {
                    self.regs[SpiRegister::S.offset()] &= !s::SPMF;
                }
            }
            SpiRegister::D => {
                self.pending = true;
                self.data.push(DataAccess::Write(value));
            }
            SpiRegister::C1 => {
                self.regs[SpiRegister::S.offset()] &= !s::MODF;
                self.set_reg(register, value);
            }
            _ => self.set_reg(register, value),
        }
    }
}

impl PinMux for SimSpi {
    fn modify_pinsel<F>(&mut self, register: Pinsel, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let slot = &mut self.pinsel[pinsel_index(register)];
        *slot = f(*slot);
    }
}

impl SpiPeripheral for SimSpi {
    fn instance(&self) -> Option<SpiInstance> {
        self.instance
    }

    fn bus_clock(&self) -> u32 {
        BUS_CLOCK
    }
}

/// A hook call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    MspInit,
    MspDeinit,
    TxComplete,
    RxComplete(Vec<u8>),
    TxRxComplete(Vec<u8>),
    UartError(UartErrors),
    SpiError(SpiErrors),
    Idle,
    LinBreak,
    RxEdge,
    Abort,
}

/// Hooks that record every call
#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<Event>,
}

impl Recorder {
    pub fn count(&self, event: &Event) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }
}

impl UartHooks for Recorder {
    fn msp_init(&mut self) {
        self.events.push(Event::MspInit);
    }

    fn msp_deinit(&mut self) {
        self.events.push(Event::MspDeinit);
    }

    fn tx_complete(&mut self) {
        self.events.push(Event::TxComplete);
    }

    fn rx_complete(&mut self, data: &[u8]) {
        self.events.push(Event::RxComplete(data.to_vec()));
    }

    fn error(&mut self, errors: UartErrors) {
        self.events.push(Event::UartError(errors));
    }

    fn idle(&mut self) {
        self.events.push(Event::Idle);
    }

    fn lin_break(&mut self) {
        self.events.push(Event::LinBreak);
    }

    fn rx_edge(&mut self) {
        self.events.push(Event::RxEdge);
    }

    fn abort(&mut self) {
        self.events.push(Event::Abort);
    }
}

impl SpiHooks for Recorder {
    fn msp_init(&mut self) {
        self.events.push(Event::MspInit);
    }

    fn msp_deinit(&mut self) {
        self.events.push(Event::MspDeinit);
    }

    fn tx_complete(&mut self) {
        self.events.push(Event::TxComplete);
    }

    fn rx_complete(&mut self, data: &[u8]) {
        self.events.push(Event::RxComplete(data.to_vec()));
    }

    fn tx_rx_complete(&mut self, received: &[u8]) {
        self.events.push(Event::TxRxComplete(received.to_vec()));
    }

    fn error(&mut self, errors: SpiErrors) {
        self.events.push(Event::SpiError(errors));
    }
}
