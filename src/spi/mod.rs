//! SPI channel
//!
//! A [`SpiChannel`] wraps a [`SpiPeripheral`] and moves bytes through its single-byte transmit
//! and receive buffers:
//!
//! ```text
//! Reset --configure--> Ready --transmit---------> BusyTx --> Ready
//!                      Ready --receive----------> BusyRx --> Ready
//!                      Ready --transmit_receive-> BusyTxRx --> Ready
//! ```
//!
//! Every call takes the channel lock first. A locked or busy channel fails immediately with
//! [`Error::Busy`].
//!
//! # Byte pairing
//!
//! Each byte shifted out shifts one byte in. When both directions are used, a byte is written
//! only after the byte paired with the previous write was read, so the receive buffer never
//! holds more than one unread byte. A master receiving clocks the bus by sending `0xFF`.
//!
//! A slave cannot choose when bytes move. Its first byte is loaded before waiting, so that it
//! is ready when the master starts clocking.
//!
//! # Interrupts
//!
//! The `*_it` methods arm interrupts and return. The SPI interrupt handler must call
//! [`on_interrupt`](SpiChannel::on_interrupt); completion and faults are reported through the
//! [`SpiHooks`] of the channel.

pub mod config;

pub use self::config::{
    BitOrder, Direction, Nss, Prescaler, Role, Scaler, SpiConfig, MODE_0, MODE_1, MODE_2, MODE_3,
};

use crate::error::{ConfigError, Error, SpiErrors};
use crate::instance::PinGroup;
use crate::pac::spi::{c1, c2, s};
use crate::state::{Lock, State};
use crate::tick::{self, TickClock};
use crate::{NoHooks, SpiPeripheral, SpiRegister as Reg};

/// Byte sent by a master while receiving
const FILL_BYTE: u8 = 0xFF;

/// Board and application callbacks of a SPI channel
///
/// All methods default to doing nothing.
pub trait SpiHooks {
    /// First configuration of the channel
    fn msp_init(&mut self) {}
    fn msp_deinit(&mut self) {}
    fn tx_complete(&mut self) {}
    fn rx_complete(&mut self, data: &[u8]) {
        let _ = data;
    }
    fn tx_rx_complete(&mut self, received: &[u8]) {
        let _ = received;
    }
    /// A mode fault or a byte match stopped the transfer of the channel
    fn error(&mut self, errors: SpiErrors) {
        let _ = errors;
    }
}

impl SpiHooks for NoHooks {}

/// Bytes to send
#[derive(Clone, Copy)]
enum TxSource<'b> {
    Buffer(&'b [u8]),
    Fill(u8),
}

impl TxSource<'_> {
    fn byte(&self, index: usize) -> u8 {
        match self {
            TxSource::Buffer(data) => data[index],
            TxSource::Fill(byte) => *byte,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Kind {
    Tx,
    Rx,
    TxRx,
}

/// An interrupt-driven transfer
struct Transfer<'a> {
    kind: Kind,
    tx: Option<TxSource<'a>>,
    /// `None` discards received bytes
    rx: Option<&'a mut [u8]>,
    /// False when nothing is shifted in (transmit on one line)
    paired: bool,
    len: usize,
    sent: usize,
    received: usize,
}

/// A configured (or configurable) SPI
pub struct SpiChannel<'a, P, C, H = NoHooks> {
    peripheral: P,
    clock: C,
    hooks: H,
    config: SpiConfig,
    transfer: Option<Transfer<'a>>,
    lock: Lock,
    state: State,
    errors: SpiErrors,
}

impl<'a, P, C, H> SpiChannel<'a, P, C, H>
where
    P: SpiPeripheral,
    C: TickClock,
    H: SpiHooks,
{
    /// Creates an unconfigured channel
    pub fn new(peripheral: P, clock: C, hooks: H) -> Self {
        SpiChannel {
            peripheral,
            clock,
            hooks,
            config: SpiConfig::new_master(),
            transfer: None,
            lock: Lock::default(),
            state: State::Reset,
            errors: SpiErrors::NONE,
        }
    }

    /// Destroys the channel and returns its parts
    pub fn free(self) -> (P, C, H) {
        (self.peripheral, self.clock, self.hooks)
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Fault flags of the channel, cleared once the `error` hook returns
    pub fn error(&self) -> SpiErrors {
        self.errors
    }

    pub fn config(&self) -> &SpiConfig {
        &self.config
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Bytes still to be written by the interrupt-driven transfer
    pub fn tx_remaining(&self) -> usize {
        match &self.transfer {
            Some(t) if t.tx.is_some() => t.len - t.sent,
            _ => 0,
        }
    }

    /// Bytes still to be received by the interrupt-driven transfer
    pub fn rx_remaining(&self) -> usize {
        match &self.transfer {
            Some(t) if t.paired => t.len - t.received,
            _ => 0,
        }
    }

    /// SCK frequency programmed in the baud rate register
    pub fn baud_rate(&mut self) -> u32 {
        let br = self.peripheral.read(Reg::Br);
        config::baud_rate(self.peripheral.bus_clock(), br)
    }

    pub fn match_value(&mut self) -> u8 {
        self.peripheral.read(Reg::M)
    }

    /// Changes the match value
    ///
    /// Does nothing unless the channel was configured with a match value.
    pub fn set_match_value(&mut self, value: u8) {
        if self.config.match_value.is_some() {
            self.peripheral.write(Reg::M, value);
            self.config.match_value = Some(value);
        }
    }

    fn with_lock<T, F>(&mut self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Self) -> Result<T, Error>,
    {
        self.lock.acquire()?;
        let result = f(self);
        self.lock.release();
        result
    }

    /// False for a receive-only data line
    fn can_transmit(&self) -> bool {
        self.config.direction != Direction::OneLineRxOnly
    }

    fn is_two_line_master(&self) -> bool {
        self.config.role == Role::Master && self.config.direction == Direction::TwoLines
    }

    fn enable(&mut self) {
        if !self.peripheral.is_set(Reg::C1, c1::SPE) {
            self.peripheral.set_bits(Reg::C1, c1::SPE);
        }
    }

    fn disarm(&mut self) {
        self.peripheral.clear_bits(Reg::C1, c1::SPIE | c1::SPTIE);
        self.peripheral.clear_bits(Reg::C2, c2::SPMIE);
    }
}

/// Configuration
impl<'a, P, C, H> SpiChannel<'a, P, C, H>
where
    P: SpiPeripheral,
    C: TickClock,
    H: SpiHooks,
{
    /// Configures and enables the channel
    ///
    /// The first configuration runs the `msp_init` hook. A rejected configuration leaves the
    /// channel in [`State::Error`].
    pub fn configure(&mut self, config: SpiConfig) -> Result<(), Error> {
        if self.state.is_busy() {
            return Err(Error::Busy);
        }
        if self.state == State::Reset {
            self.lock.release();
            self.hooks.msp_init();
        }
        self.lock.acquire()?;
        self.state = State::Busy;
        let result = self.apply(&config);
        self.lock.release();
        match result {
            Ok(()) => {
                self.config = config;
                self.errors = SpiErrors::NONE;
                self.state = State::Ready;
                Ok(())
            }
            Err(e) => {
                warn!("spi configuration rejected");
                self.state = State::Error;
                Err(e.into())
            }
        }
    }

    /// Disables the peripheral and returns the channel to [`State::Reset`]
    ///
    /// Any transfer in progress is dropped without notification.
    pub fn deconfigure(&mut self) {
        self.state = State::Busy;
        for reg in [Reg::C1, Reg::C2, Reg::Br, Reg::M] {
            self.peripheral.write(reg, 0);
        }
        self.hooks.msp_deinit();
        self.transfer = None;
        self.errors = SpiErrors::NONE;
        self.state = State::Reset;
        self.lock = Lock::Locked;
        debug!("spi deconfigured");
    }

    fn apply(&mut self, config: &SpiConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let instance = self
            .peripheral
            .instance()
            .ok_or(ConfigError::UnknownInstance)?;

        let (pinsel, mask) = instance.pin_select();
        let group1 = config.pins == PinGroup::Group1;
        self.peripheral
            .modify_pinsel(pinsel, |v| if group1 { v | mask } else { v & !mask });

        // Programmed with SPE clear, enabled last
        self.peripheral.write(Reg::C1, config.c1_bits());
        self.peripheral.write(Reg::C2, config.c2_bits());
        self.peripheral.write(Reg::Br, config.br_bits());
        self.peripheral.write(Reg::M, config.match_value.unwrap_or(0));
        self.peripheral.set_bits(Reg::C1, c1::SPE);
        debug!("spi configured, br {=u8:#x}", config.br_bits());
        Ok(())
    }
}

/// Blocking transfers
impl<'a, P, C, H> SpiChannel<'a, P, C, H>
where
    P: SpiPeripheral,
    C: TickClock,
    H: SpiHooks,
{
    /// Sends `data`
    ///
    /// On two lines the bytes shifted in are discarded. A receive-only channel rejects the call
    /// with [`Error::InvalidArgument`].
    pub fn transmit(&mut self, data: &[u8], timeout: u32) -> Result<(), Error> {
        self.with_lock(|ch| {
            let start = ch.clock.now();
            if ch.state != State::Ready {
                return Err(Error::Busy);
            }
            if data.is_empty() || !ch.can_transmit() {
                return Err(Error::InvalidArgument);
            }
            ch.state = State::BusyTx;
            ch.errors = SpiErrors::NONE;
            if ch.config.direction == Direction::OneLine {
                ch.peripheral.set_bits(Reg::C2, c2::BIDIROE);
            }
            ch.enable();

            let mut sent = 0;
            if ch.config.role == Role::Slave || data.len() == 1 {
                ch.peripheral.write(Reg::D, data[0]);
                sent = 1;
            }
            while sent < data.len() {
                if ch.peripheral.is_set(Reg::S, s::SPTEF) {
                    ch.peripheral.write(Reg::D, data[sent]);
                    sent += 1;
                } else if tick::expired(&ch.clock, start, timeout) {
                    return Err(ch.stop_on_timeout());
                }
            }
            ch.wait_status(s::SPTEF, true, start, timeout)?;
            if ch.peripheral.is_set(Reg::S, s::SPRF) {
                let _ = ch.peripheral.read(Reg::D);
            }
            ch.state = State::Ready;
            Ok(())
        })
    }

    /// Fills `buf` with received bytes
    ///
    /// A master sends `0xFF` for every byte. A slave finishes by waiting until the receive
    /// buffer is empty again.
    pub fn receive(&mut self, buf: &mut [u8], timeout: u32) -> Result<(), Error> {
        self.with_lock(|ch| {
            let start = ch.clock.now();
            if ch.state != State::Ready {
                return Err(Error::Busy);
            }
            if buf.is_empty() {
                return Err(Error::InvalidArgument);
            }
            ch.state = State::BusyRx;
            ch.errors = SpiErrors::NONE;
            if ch.config.direction != Direction::TwoLines {
                ch.peripheral.clear_bits(Reg::C2, c2::BIDIROE);
            }
            ch.enable();
            if ch.config.role == Role::Master {
                return ch.exchange(TxSource::Fill(FILL_BYTE), buf, start, timeout);
            }

            // A slave takes its first byte without waiting for SPRF
            buf[0] = ch.peripheral.read(Reg::D);
            let mut received = 1;
            while received < buf.len() {
                if ch.peripheral.is_set(Reg::S, s::SPRF) {
                    buf[received] = ch.peripheral.read(Reg::D);
                    received += 1;
                } else if tick::expired(&ch.clock, start, timeout) {
                    return Err(ch.stop_on_timeout());
                }
            }
            ch.wait_status(s::SPRF, false, start, timeout)?;
            ch.state = State::Ready;
            Ok(())
        })
    }

    /// Sends `tx` while filling `rx`, one received byte per sent byte
    ///
    /// A master on two lines may call this while an interrupt-driven reception runs. The
    /// exchange then takes over the bus and the reception is dropped without notification.
    pub fn transmit_receive(&mut self, tx: &[u8], rx: &mut [u8], timeout: u32) -> Result<(), Error> {
        self.with_lock(|ch| {
            let start = ch.clock.now();
            let takeover = ch.state == State::BusyRx && ch.is_two_line_master();
            if ch.state != State::Ready && !takeover {
                return Err(Error::Busy);
            }
            if tx.is_empty() || tx.len() != rx.len() || !ch.can_transmit() {
                return Err(Error::InvalidArgument);
            }
            if takeover {
                ch.disarm();
                ch.transfer = None;
            } else {
                ch.state = State::BusyTxRx;
            }
            ch.errors = SpiErrors::NONE;
            ch.enable();
            ch.exchange(TxSource::Buffer(tx), rx, start, timeout)
        })
    }

    fn exchange(
        &mut self,
        tx: TxSource<'_>,
        rx: &mut [u8],
        start: u32,
        timeout: u32,
    ) -> Result<(), Error> {
        let len = rx.len();
        let mut sent = 0;
        let mut received = 0;
        let mut tx_allowed = true;
        if self.config.role == Role::Slave || len == 1 {
            self.peripheral.write(Reg::D, tx.byte(0));
            sent = 1;
            tx_allowed = false;
        }
        while sent < len || received < len {
            let mut moved = false;
            if tx_allowed && sent < len && self.peripheral.is_set(Reg::S, s::SPTEF) {
                self.peripheral.write(Reg::D, tx.byte(sent));
                sent += 1;
                tx_allowed = false;
                moved = true;
            }
            if received < len && self.peripheral.is_set(Reg::S, s::SPRF) {
                rx[received] = self.peripheral.read(Reg::D);
                received += 1;
                tx_allowed = true;
                moved = true;
            }
            if !moved && tick::expired(&self.clock, start, timeout) {
                return Err(self.stop_on_timeout());
            }
        }
        self.wait_status(s::SPTEF, true, start, timeout)?;
        self.state = State::Ready;
        Ok(())
    }

    /// Waits until the flags of `mask` in S are set (`set`) or clear
    fn wait_status(&mut self, mask: u8, set: bool, start: u32, timeout: u32) -> Result<(), Error> {
        while self.peripheral.is_set(Reg::S, mask) != set {
            if tick::expired(&self.clock, start, timeout) {
                return Err(self.stop_on_timeout());
            }
        }
        Ok(())
    }

    fn stop_on_timeout(&mut self) -> Error {
        warn!("spi timeout");
        self.disarm();
        self.transfer = None;
        self.state = State::Ready;
        Error::Timeout
    }
}

/// Interrupt-driven transfers
impl<'a, P, C, H> SpiChannel<'a, P, C, H>
where
    P: SpiPeripheral,
    C: TickClock,
    H: SpiHooks,
{
    /// Starts sending `data`
    pub fn transmit_it(&mut self, data: &'a [u8]) -> Result<(), Error> {
        self.with_lock(|ch| {
            if ch.state != State::Ready {
                return Err(Error::Busy);
            }
            if data.is_empty() || !ch.can_transmit() {
                return Err(Error::InvalidArgument);
            }
            let paired = ch.config.direction == Direction::TwoLines;
            if ch.config.direction == Direction::OneLine {
                ch.peripheral.set_bits(Reg::C2, c2::BIDIROE);
            }
            ch.start(
                Transfer {
                    kind: Kind::Tx,
                    tx: Some(TxSource::Buffer(data)),
                    rx: None,
                    paired,
                    len: data.len(),
                    sent: 0,
                    received: 0,
                },
                State::BusyTx,
            );
            Ok(())
        })
    }

    /// Starts filling `buf`; the data is handed to the `rx_complete` hook
    pub fn receive_it(&mut self, buf: &'a mut [u8]) -> Result<(), Error> {
        self.with_lock(|ch| {
            if ch.state != State::Ready {
                return Err(Error::Busy);
            }
            if buf.is_empty() {
                return Err(Error::InvalidArgument);
            }
            if ch.config.direction != Direction::TwoLines {
                ch.peripheral.clear_bits(Reg::C2, c2::BIDIROE);
            }
            let tx = match ch.config.role {
                Role::Master => Some(TxSource::Fill(FILL_BYTE)),
                Role::Slave => None,
            };
            let len = buf.len();
            ch.start(
                Transfer {
                    kind: Kind::Rx,
                    tx,
                    rx: Some(buf),
                    paired: true,
                    len,
                    sent: 0,
                    received: 0,
                },
                State::BusyRx,
            );
            Ok(())
        })
    }

    /// Starts sending `tx` while filling `rx`; the received data is handed to the
    /// `tx_rx_complete` hook
    pub fn transmit_receive_it(&mut self, tx: &'a [u8], rx: &'a mut [u8]) -> Result<(), Error> {
        self.with_lock(|ch| {
            let takeover = ch.state == State::BusyRx && ch.is_two_line_master();
            if ch.state != State::Ready && !takeover {
                return Err(Error::Busy);
            }
            if tx.is_empty() || tx.len() != rx.len() || !ch.can_transmit() {
                return Err(Error::InvalidArgument);
            }
            let state = if takeover { State::BusyRx } else { State::BusyTxRx };
            ch.start(
                Transfer {
                    kind: Kind::TxRx,
                    tx: Some(TxSource::Buffer(tx)),
                    len: rx.len(),
                    rx: Some(rx),
                    paired: true,
                    sent: 0,
                    received: 0,
                },
                state,
            );
            Ok(())
        })
    }

    fn start(&mut self, transfer: Transfer<'a>, state: State) {
        let mut interrupts = c1::SPIE;
        if transfer.tx.is_some() {
            interrupts |= c1::SPTIE;
        }
        self.errors = SpiErrors::NONE;
        self.state = state;
        self.transfer = Some(transfer);
        self.enable();
        self.peripheral.set_bits(Reg::C1, interrupts);
        if self.config.match_value.is_some() {
            self.peripheral.set_bits(Reg::C2, c2::SPMIE);
        }
    }

    /// Services the SPI interrupt
    pub fn on_interrupt(&mut self) {
        let status = self.peripheral.read(Reg::S);
        if status & s::MODF != 0 {
            // MODF clears on the C1 write that disarms the interrupts
            self.fault(SpiErrors::MODE_FAULT);
            return;
        }
        if status & s::SPMF != 0 && self.peripheral.is_set(Reg::C2, c2::SPMIE) {
            self.peripheral.write(Reg::S, s::SPMF);
            self.fault(SpiErrors::MATCH);
            return;
        }
        if status & s::SPRF != 0 && self.peripheral.is_set(Reg::C1, c1::SPIE) {
            self.receive_step();
        }
        if status & s::SPTEF != 0 && self.peripheral.is_set(Reg::C1, c1::SPTIE) {
            self.transmit_step();
        }
    }

    fn fault(&mut self, errors: SpiErrors) {
        warn!("spi fault {=u8:#x}", errors.bits());
        self.errors |= errors;
        self.disarm();
        self.transfer = None;
        if self.state.is_busy() {
            self.state = State::Ready;
        }
        self.hooks.error(self.errors);
        self.errors = SpiErrors::NONE;
    }

    fn receive_step(&mut self) {
        let byte = self.peripheral.read(Reg::D);
        let done = match self.transfer.as_mut() {
            Some(t) if t.paired && t.received < t.len => {
                if let Some(buf) = t.rx.as_deref_mut() {
                    buf[t.received] = byte;
                }
                t.received += 1;
                if t.received == t.len {
                    true
                } else {
                    if t.tx.is_some() && t.sent < t.len {
                        self.peripheral.set_bits(Reg::C1, c1::SPTIE);
                    }
                    false
                }
            }
            // Nothing expects this byte
            _ => false,
        };
        if done {
            self.complete();
        }
    }

    fn transmit_step(&mut self) {
        let done = match self.transfer.as_mut() {
            Some(Transfer {
                tx: Some(source),
                paired,
                len,
                sent,
                received,
                ..
            }) if *sent < *len && (!*paired || *sent == *received) => {
                self.peripheral.write(Reg::D, source.byte(*sent));
                *sent += 1;
                if *paired {
                    // Wait for the paired byte
                    self.peripheral.clear_bits(Reg::C1, c1::SPTIE);
                    false
                } else {
                    *sent == *len
                }
            }
            _ => {
                self.peripheral.clear_bits(Reg::C1, c1::SPTIE);
                false
            }
        };
        if done {
            self.complete();
        }
    }

    fn complete(&mut self) {
        self.disarm();
        self.state = State::Ready;
        if let Some(t) = self.transfer.take() {
            let received = t.rx.as_deref().unwrap_or(&[]);
            match t.kind {
                Kind::Tx => self.hooks.tx_complete(),
                Kind::Rx => self.hooks.rx_complete(received),
                Kind::TxRx => self.hooks.tx_rx_complete(received),
            }
        }
    }
}
