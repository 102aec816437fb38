//! UART channel
//!
//! A [`UartChannel`] wraps a [`UartPeripheral`] and drives it through a lifecycle:
//!
//! ```text
//! Reset --configure--> Ready --transmit/transmit_it--> BusyTx --> Ready
//!                      Ready --receive/receive_it----> BusyRx --> Ready
//! ```
//!
//! The transmit half and the receive half have separate states, so a blocking transmit may run
//! while an interrupt-driven reception is in progress. Calls that find their half busy, or the
//! channel locked by another call, fail immediately with [`Error::Busy`] without touching any
//! register.
//!
//! # Blocking transfers
//!
//! [`transmit`](UartChannel::transmit) and [`receive`](UartChannel::receive) poll the status
//! register until every unit has moved. `timeout` is measured in ticks of the channel clock
//! from the start of the call and must not be zero; [`MAX_DELAY`](crate::MAX_DELAY) waits
//! forever. On timeout all interrupts of the channel are disarmed and both halves return to
//! ready.
//!
//! # Interrupt-driven transfers
//!
//! [`transmit_it`](UartChannel::transmit_it) and [`receive_it`](UartChannel::receive_it) record
//! the buffer and arm interrupts. The UART interrupt handler must call
//! [`on_interrupt`](UartChannel::on_interrupt), which moves one unit per call and reports
//! completion, faults and line events through the [`UartHooks`] of the channel.
//!
//! # Buffers
//!
//! With 9 data bits and no parity every unit is two bytes, little endian, of which the low nine
//! bits are used. In every other format a unit is one byte. With 8 data bits and parity the
//! received bytes are masked to their seven data bits.

pub mod config;
mod format;

pub use self::config::{Line, Parity, StopBits, TransferMode, UartConfig, WakeMethod, WordLength};

use self::format::Format;
use crate::error::{ConfigError, Error, UartErrors};
use crate::instance::PinGroup;
use crate::pac::uart::{bdh, c1, c2, c3, s1, s2};
use crate::state::{Lock, State};
use crate::tick::{self, TickClock};
use crate::{NoHooks, UartPeripheral, UartRegister as Reg};

/// Board and application callbacks of a UART channel
///
/// All methods default to doing nothing. They are called from the context that drives the
/// channel: `msp_init`/`msp_deinit` from configuration calls, the others usually from
/// [`UartChannel::on_interrupt`].
pub trait UartHooks {
    /// First configuration of the channel. Pin multiplexing and NVIC setup belong here.
    fn msp_init(&mut self) {}
    fn msp_deinit(&mut self) {}
    /// An interrupt-driven transmission finished, including the stop bit of the last unit
    fn tx_complete(&mut self) {}
    /// An interrupt-driven reception filled its buffer
    fn rx_complete(&mut self, data: &[u8]) {
        let _ = data;
    }
    /// A receive fault aborted the transfers of the channel
    fn error(&mut self, errors: UartErrors) {
        let _ = errors;
    }
    /// The receive line went idle
    fn idle(&mut self) {}
    /// A LIN break was detected
    fn lin_break(&mut self) {}
    /// An active edge was seen on the receive pin
    fn rx_edge(&mut self) {}
    /// [`UartChannel::abort`] completed
    fn abort(&mut self) {}
}

impl UartHooks for NoHooks {}

struct TxTransfer<'a> {
    data: &'a [u8],
    remaining: usize,
}

struct RxTransfer<'a> {
    buf: &'a mut [u8],
    remaining: usize,
}

/// A configured (or configurable) UART
pub struct UartChannel<'a, P, C, H = NoHooks> {
    peripheral: P,
    clock: C,
    hooks: H,
    config: UartConfig,
    format: Format,
    tx: Option<TxTransfer<'a>>,
    rx: Option<RxTransfer<'a>>,
    lock: Lock,
    state: State,
    rx_state: State,
    errors: UartErrors,
}

/// State of a half after a forced stop: halves that are not in use stay where they are
fn settle(state: State) -> State {
    match state {
        State::Reset | State::Error => state,
        _ => State::Ready,
    }
}

impl<'a, P, C, H> UartChannel<'a, P, C, H>
where
    P: UartPeripheral,
    C: TickClock,
    H: UartHooks,
{
    /// Creates an unconfigured channel
    pub fn new(peripheral: P, clock: C, hooks: H) -> Self {
        let config = UartConfig::default();
        UartChannel {
            peripheral,
            clock,
            hooks,
            format: Format::of(&config),
            config,
            tx: None,
            rx: None,
            lock: Lock::default(),
            state: State::Reset,
            rx_state: State::Reset,
            errors: UartErrors::NONE,
        }
    }

    /// Destroys the channel and returns its parts
    ///
    /// Registers are left as they are; call [`deconfigure`](Self::deconfigure) first to
    /// disable the peripheral.
    pub fn free(self) -> (P, C, H) {
        (self.peripheral, self.clock, self.hooks)
    }

    /// State of the channel (of its transmit half)
    pub fn state(&self) -> State {
        self.state
    }

    /// State of the receive half
    pub fn rx_state(&self) -> State {
        self.rx_state
    }

    /// Fault flags of the channel
    ///
    /// Faults detected by [`on_interrupt`](Self::on_interrupt) are cleared once the `error`
    /// hook returns, so this only reports a rejected configuration.
    pub fn error(&self) -> UartErrors {
        self.errors
    }

    pub fn config(&self) -> &UartConfig {
        &self.config
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Units still to be written by the interrupt-driven transmission
    pub fn tx_remaining(&self) -> usize {
        self.tx.as_ref().map_or(0, |t| t.remaining)
    }

    /// Units still to be received by the interrupt-driven reception
    pub fn rx_remaining(&self) -> usize {
        self.rx.as_ref().map_or(0, |t| t.remaining)
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
}

/// Configuration
impl<'a, P, C, H> UartChannel<'a, P, C, H>
where
    P: UartPeripheral,
    C: TickClock,
    H: UartHooks,
{
    /// Configures the channel for full duplex operation
    ///
    /// The first configuration runs the `msp_init` hook. A rejected configuration leaves the
    /// channel in [`State::Error`] with [`UartErrors::CONFIG`] set.
    pub fn configure(&mut self, config: UartConfig) -> Result<(), Error> {
        self.begin_configure()?;
        let result = self.apply(&config);
        self.end_configure(config, result)
    }

    /// Configures the channel for single-wire or loopback operation
    ///
    /// `config.line` must not be [`Line::TwoWire`]. On a single wire, `TxOnly` and `RxOnly`
    /// modes turn the line in that direction; `TxRx` leaves both halves enabled and the
    /// direction to [`enable_half_duplex_transmitter`](Self::enable_half_duplex_transmitter)
    /// and [`enable_half_duplex_receiver`](Self::enable_half_duplex_receiver).
    pub fn configure_half_duplex(&mut self, config: UartConfig) -> Result<(), Error> {
        self.begin_configure()?;
        let result = match config.line {
            Line::TwoWire => Err(ConfigError::LineMode),
            Line::SingleWire | Line::Loopback => self.apply(&config),
        };
        self.end_configure(config, result)?;
        if config.line == Line::SingleWire {
            match config.mode {
                TransferMode::TxOnly => self.select_transmitter(),
                TransferMode::RxOnly => self.select_receiver(),
                TransferMode::TxRx => {}
            }
        }
        Ok(())
    }

    /// Configures the channel for multiprocessor communication
    ///
    /// The receiver wakes up on an idle line or on an address mark, and idle-line detection
    /// is armed.
    pub fn configure_multiprocessor(
        &mut self,
        config: UartConfig,
        wake: WakeMethod,
    ) -> Result<(), Error> {
        self.begin_configure()?;
        let result = self.apply(&config).map(|()| {
            match wake {
                WakeMethod::IdleLine => self.peripheral.clear_bits(Reg::C1, c1::WAKE),
                WakeMethod::AddressMark => self.peripheral.set_bits(Reg::C1, c1::WAKE),
            }
            self.modify_s2(|v| v | s2::RWUID);
        });
        self.end_configure(config, result)
    }

    /// Disables the peripheral and returns the channel to [`State::Reset`]
    ///
    /// Any transfer in progress is dropped without notification. The `msp_deinit` hook runs
    /// and the channel stays locked until it is configured again.
    pub fn deconfigure(&mut self) {
        self.state = State::Busy;
        for reg in [Reg::C2, Reg::C1, Reg::C3, Reg::Bdh, Reg::Bdl] {
            self.peripheral.write(reg, 0);
        }
        self.hooks.msp_deinit();
        self.tx = None;
        self.rx = None;
        self.errors = UartErrors::NONE;
        self.state = State::Reset;
        self.rx_state = State::Reset;
        self.lock = Lock::Locked;
        debug!("uart deconfigured");
    }

    fn begin_configure(&mut self) -> Result<(), Error> {
        if self.state.is_busy() || self.rx_state.is_busy() {
            return Err(Error::Busy);
        }
        if self.state == State::Reset {
            self.lock.release();
            self.hooks.msp_init();
        }
        self.lock.acquire()?;
        self.state = State::Busy;
        Ok(())
    }

    fn apply(&mut self, config: &UartConfig) -> Result<(), ConfigError> {
        let instance = self
            .peripheral
            .instance()
            .ok_or(ConfigError::UnknownInstance)?;
        let sbr = config
            .divisor(self.peripheral.bus_clock())
            .ok_or(ConfigError::BaudRate)?;

        let (pinsel, mask) = instance.pin_select();
        let group1 = config.pins == PinGroup::Group1;
        self.peripheral
            .modify_pinsel(pinsel, |v| if group1 { v | mask } else { v & !mask });

        // The baud rate may only change with both directions disabled
        self.peripheral.clear_bits(Reg::C2, c2::TE | c2::RE);
        self.peripheral.write(Reg::Bdh, config.bdh_bits(sbr));
        self.peripheral.write(Reg::Bdl, sbr as u8);
        self.peripheral.write(Reg::C1, config.c1_bits());
        self.peripheral.write(Reg::C2, config.c2_bits());
        debug!("uart configured, divisor {=u16}", sbr);
        Ok(())
    }

    fn end_configure(
        &mut self,
        config: UartConfig,
        result: Result<(), ConfigError>,
    ) -> Result<(), Error> {
        self.lock.release();
        match result {
            Ok(()) => {
                self.config = config;
                self.format = Format::of(&config);
                self.errors = UartErrors::NONE;
                self.state = State::Ready;
                self.rx_state = State::Ready;
                Ok(())
            }
            Err(e) => {
                warn!("uart configuration rejected");
                self.errors = UartErrors::CONFIG;
                self.state = State::Error;
                self.rx_state = State::Reset;
                Err(e.into())
            }
        }
    }
}

/// Line control
impl<'a, P, C, H> UartChannel<'a, P, C, H>
where
    P: UartPeripheral,
    C: TickClock,
    H: UartHooks,
{
    /// Turns a single-wire line to transmit. The receive half goes to [`State::Reset`].
    pub fn enable_half_duplex_transmitter(&mut self) -> Result<(), Error> {
        self.check_half_duplex()?;
        self.with_lock(|ch| {
            ch.select_transmitter();
            Ok(())
        })
    }

    /// Turns a single-wire line to receive
    pub fn enable_half_duplex_receiver(&mut self) -> Result<(), Error> {
        self.check_half_duplex()?;
        self.with_lock(|ch| {
            ch.select_receiver();
            Ok(())
        })
    }

    /// Sends a break character
    pub fn send_break(&mut self) -> Result<(), Error> {
        if self.state != State::Ready {
            return Err(Error::Busy);
        }
        self.with_lock(|ch| {
            ch.peripheral.set_bits(Reg::C2, c2::SBK);
            ch.peripheral.clear_bits(Reg::C2, c2::SBK);
            Ok(())
        })
    }

    /// Enables or disables LIN break detection and its interrupt
    ///
    /// The interrupt is disarmed again after the first detected break.
    pub fn set_lin_break_detection(&mut self, enable: bool) {
        if enable {
            self.modify_s2(|v| v | s2::LBKDE);
            self.peripheral.set_bits(Reg::Bdh, bdh::LBKDIE);
        } else {
            self.peripheral.clear_bits(Reg::Bdh, bdh::LBKDIE);
            self.modify_s2(|v| v & !s2::LBKDE);
        }
    }

    /// Arms or disarms the interrupt on an active edge of the receive pin
    ///
    /// The interrupt is disarmed again after the first edge.
    pub fn set_rx_edge_interrupt(&mut self, enable: bool) {
        if enable {
            self.peripheral.set_bits(Reg::Bdh, bdh::RXEDGIE);
        } else {
            self.peripheral.clear_bits(Reg::Bdh, bdh::RXEDGIE);
        }
    }

    fn check_half_duplex(&self) -> Result<(), Error> {
        if self.config.line != Line::SingleWire {
            return Err(ConfigError::LineMode.into());
        }
        if self.state != State::Ready || self.rx_state.is_busy() {
            return Err(Error::Busy);
        }
        Ok(())
    }

    fn select_transmitter(&mut self) {
        self.peripheral.set_bits(Reg::C3, c3::TXDIR);
        self.peripheral
            .modify(Reg::C2, |v| (v | c2::TE) & !c2::RE);
        self.state = State::Ready;
        self.rx_state = State::Reset;
    }

    fn select_receiver(&mut self) {
        self.peripheral.clear_bits(Reg::C3, c3::TXDIR);
        self.peripheral
            .modify(Reg::C2, |v| (v | c2::RE) & !c2::TE);
        self.state = State::Ready;
        self.rx_state = State::Ready;
    }

    /// Read-modify-write of S2 that does not clear its write-1-to-clear flags
    fn modify_s2<F>(&mut self, f: F)
    where
        F: FnOnce(u8) -> u8,
    {
        self.peripheral.modify(Reg::S2, |v| f(v & !s2::W1C));
    }

    /// Clears write-1-to-clear flags of S2
    fn clear_s2_flags(&mut self, flags: u8) {
        self.peripheral
            .modify(Reg::S2, |v| (v & !s2::W1C) | flags);
    }
}

/// Blocking transfers
impl<'a, P, C, H> UartChannel<'a, P, C, H>
where
    P: UartPeripheral,
    C: TickClock,
    H: UartHooks,
{
    /// Transmits `data` and waits until the last unit left the shift register
    pub fn transmit(&mut self, data: &[u8], timeout: u32) -> Result<(), Error> {
        if timeout == 0 || self.format.units(data.len()).is_none() {
            return Err(Error::InvalidArgument);
        }
        if self.state != State::Ready {
            return Err(Error::Busy);
        }
        self.with_lock(|ch| {
            ch.errors = UartErrors::NONE;
            ch.state = State::BusyTx;
            let start = ch.clock.now();
            for unit in data.chunks_exact(ch.format.unit_size()) {
                ch.wait_status(s1::TDRE, start, timeout)?;
                ch.format.write_unit(&mut ch.peripheral, unit);
            }
            ch.wait_status(s1::TC, start, timeout)?;
            ch.state = State::Ready;
            Ok(())
        })
    }

    /// Fills `buf` with received units
    pub fn receive(&mut self, buf: &mut [u8], timeout: u32) -> Result<(), Error> {
        if timeout == 0 || self.format.units(buf.len()).is_none() {
            return Err(Error::InvalidArgument);
        }
        if self.rx_state != State::Ready {
            return Err(Error::Busy);
        }
        self.with_lock(|ch| {
            ch.errors = UartErrors::NONE;
            ch.rx_state = State::BusyRx;
            let start = ch.clock.now();
            // Drop a unit that overran before this call
            if ch.peripheral.is_set(Reg::S1, s1::OR) {
                let _ = ch.peripheral.read(Reg::D);
            }
            for unit in buf.chunks_exact_mut(ch.format.unit_size()) {
                ch.wait_status(s1::RDRF, start, timeout)?;
                ch.format.read_unit(&mut ch.peripheral, unit);
            }
            ch.rx_state = State::Ready;
            Ok(())
        })
    }

    /// Waits until any bit of `mask` is set in S1
    fn wait_status(&mut self, mask: u8, start: u32, timeout: u32) -> Result<(), Error> {
        while !self.peripheral.is_set(Reg::S1, mask) {
            if tick::expired(&self.clock, start, timeout) {
                self.stop_on_timeout();
                return Err(Error::Timeout);
            }
        }
        Ok(())
    }

    fn stop_on_timeout(&mut self) {
        warn!("uart timeout");
        self.peripheral.clear_bits(Reg::C2, c2::INTERRUPTS);
        self.peripheral.clear_bits(Reg::C3, c3::ERROR_INTERRUPTS);
        self.tx = None;
        self.rx = None;
        self.state = settle(self.state);
        self.rx_state = settle(self.rx_state);
    }
}

/// Interrupt-driven transfers
impl<'a, P, C, H> UartChannel<'a, P, C, H>
where
    P: UartPeripheral,
    C: TickClock,
    H: UartHooks,
{
    /// Starts an interrupt-driven transmission of `data`
    pub fn transmit_it(&mut self, data: &'a [u8]) -> Result<(), Error> {
        let units = self.format.units(data.len()).ok_or(Error::InvalidArgument)?;
        if self.state != State::Ready {
            return Err(Error::Busy);
        }
        self.with_lock(|ch| {
            ch.errors = UartErrors::NONE;
            ch.state = State::BusyTx;
            ch.tx = Some(TxTransfer {
                data,
                remaining: units,
            });
            Ok(())
        })?;
        self.peripheral.set_bits(Reg::C2, c2::TIE);
        Ok(())
    }

    /// Starts an interrupt-driven reception into `buf`
    ///
    /// The received data is handed to the `rx_complete` hook once `buf` is full.
    pub fn receive_it(&mut self, buf: &'a mut [u8]) -> Result<(), Error> {
        let units = self.format.units(buf.len()).ok_or(Error::InvalidArgument)?;
        if self.rx_state != State::Ready {
            return Err(Error::Busy);
        }
        self.with_lock(|ch| {
            ch.errors = UartErrors::NONE;
            ch.rx_state = State::BusyRx;
            ch.rx = Some(RxTransfer {
                buf,
                remaining: units,
            });
            Ok(())
        })?;
        self.peripheral.set_bits(Reg::C2, c2::RIE | c2::ILIE);
        self.peripheral.set_bits(Reg::C3, c3::ERROR_INTERRUPTS);
        Ok(())
    }

    /// Stops all transfers of the channel and disarms its interrupts
    ///
    /// The `abort` hook is called, also when nothing was in progress. Halves that were in use
    /// return to [`State::Ready`]. A half in [`State::Reset`] or [`State::Error`] keeps its
    /// state, so the receive half of a half-duplex channel set up for transmission stays
    /// disabled.
    pub fn abort(&mut self) {
        self.peripheral
            .clear_bits(Reg::Bdh, bdh::LBKDIE | bdh::RXEDGIE);
        self.peripheral.clear_bits(Reg::C2, c2::INTERRUPTS);
        self.peripheral.clear_bits(Reg::C3, c3::ERROR_INTERRUPTS);
        self.tx = None;
        self.rx = None;
        self.errors = UartErrors::NONE;
        self.state = settle(self.state);
        self.rx_state = settle(self.rx_state);
        self.hooks.abort();
    }

    /// Services the UART interrupt
    pub fn on_interrupt(&mut self) {
        let status = self.peripheral.read(Reg::S1);
        let errors = UartErrors::from_status(status);
        if !errors.is_empty() {
            self.handle_fault(errors);
            return;
        }

        let bdh = self.peripheral.read(Reg::Bdh);
        let s2 = self.peripheral.read(Reg::S2);
        if bdh & bdh::RXEDGIE != 0 && s2 & s2::RXEDGIF != 0 {
            self.clear_s2_flags(s2::RXEDGIF);
            self.peripheral.clear_bits(Reg::Bdh, bdh::RXEDGIE);
            self.hooks.rx_edge();
            return;
        }
        if bdh & bdh::LBKDIE != 0 && s2 & s2::LBKDIF != 0 {
            self.clear_s2_flags(s2::LBKDIF);
            self.peripheral.clear_bits(Reg::Bdh, bdh::LBKDIE);
            self.hooks.lin_break();
            return;
        }

        let control = self.peripheral.read(Reg::C2);
        if status & s1::RDRF != 0 && control & c2::RIE != 0 {
            self.receive_step();
        } else if status & s1::IDLE != 0 && control & c2::ILIE != 0 {
            // IDLE clears on a status read followed by a data read
            let _ = self.peripheral.read(Reg::S1);
            let _ = self.peripheral.read(Reg::D);
            self.hooks.idle();
        }

        let control = self.peripheral.read(Reg::C2);
        if status & s1::TDRE != 0 && control & c2::TIE != 0 {
            self.transmit_step();
        } else if status & s1::TC != 0 && control & c2::TCIE != 0 {
            self.peripheral.clear_bits(Reg::C2, c2::TCIE);
            self.state = State::Ready;
            self.hooks.tx_complete();
        }
    }

    fn handle_fault(&mut self, errors: UartErrors) {
        warn!("uart fault {=u8:#x}", errors.bits());
        self.errors |= errors;
        // Error flags clear on a status read followed by a data read
        let _ = self.peripheral.read(Reg::S1);
        let _ = self.peripheral.read(Reg::D);
        self.peripheral.clear_bits(Reg::C2, c2::INTERRUPTS);
        self.peripheral.clear_bits(Reg::C3, c3::ERROR_INTERRUPTS);
        self.tx = None;
        self.rx = None;
        self.state = settle(self.state);
        self.rx_state = settle(self.rx_state);
        self.hooks.error(self.errors);
        self.errors = UartErrors::NONE;
    }

    fn transmit_step(&mut self) {
        let size = self.format.unit_size();
        let tx = match (self.state, self.tx.as_mut()) {
            (State::BusyTx, Some(tx)) => tx,
            _ => {
                self.peripheral.clear_bits(Reg::C2, c2::TIE);
                return;
            }
        };
        let offset = tx.data.len() - tx.remaining * size;
        self.format
            .write_unit(&mut self.peripheral, &tx.data[offset..offset + size]);
        tx.remaining -= 1;
        if tx.remaining == 0 {
            self.tx = None;
            self.peripheral
                .modify(Reg::C2, |v| (v & !c2::TIE) | c2::TCIE);
        }
    }

    fn receive_step(&mut self) {
        let size = self.format.unit_size();
        let rx = match (self.rx_state, self.rx.as_mut()) {
            (State::BusyRx, Some(rx)) => rx,
            _ => {
                let _ = self.peripheral.read(Reg::D);
                return;
            }
        };
        let offset = rx.buf.len() - rx.remaining * size;
        self.format
            .read_unit(&mut self.peripheral, &mut rx.buf[offset..offset + size]);
        rx.remaining -= 1;
        if rx.remaining == 0 {
            self.peripheral.clear_bits(Reg::C2, c2::RIE | c2::ILIE);
            self.peripheral.clear_bits(Reg::C3, c3::ERROR_INTERRUPTS);
            self.rx_state = State::Ready;
            if let Some(rx) = self.rx.take() {
                self.hooks.rx_complete(rx.buf);
            }
        }
    }
}

/// Single unit, non-blocking access
impl<'a, P, C, H> UartChannel<'a, P, C, H>
where
    P: UartPeripheral,
    C: TickClock,
    H: UartHooks,
{
    /// Writes one unit if the transmit buffer is empty
    ///
    /// Only the low nine bits are used with 9 data bits and no parity, the low eight bits
    /// otherwise. Blocks while an interrupt-driven transmission is in progress.
    pub fn write_word(&mut self, word: u16) -> nb::Result<(), UartErrors> {
        if self.state != State::Ready || !self.peripheral.is_set(Reg::S1, s1::TDRE) {
            return Err(nb::Error::WouldBlock);
        }
        let unit = word.to_le_bytes();
        self.format
            .write_unit(&mut self.peripheral, &unit[..self.format.unit_size()]);
        Ok(())
    }

    /// Reads one unit if one was received
    ///
    /// A pending receive fault is returned and cleared, dropping the faulty unit.
    pub fn read_word(&mut self) -> nb::Result<u16, UartErrors> {
        if self.rx_state != State::Ready {
            return Err(nb::Error::WouldBlock);
        }
        let status = self.peripheral.read(Reg::S1);
        let errors = UartErrors::from_status(status);
        if !errors.is_empty() {
            let _ = self.peripheral.read(Reg::D);
            return Err(nb::Error::Other(errors));
        }
        if status & s1::RDRF == 0 {
            return Err(nb::Error::WouldBlock);
        }
        let mut unit = [0u8; 2];
        let size = self.format.unit_size();
        self.format.read_unit(&mut self.peripheral, &mut unit[..size]);
        Ok(u16::from_le_bytes(unit))
    }

    /// Completes when the last written unit left the shift register
    pub fn flush(&mut self) -> nb::Result<(), UartErrors> {
        if self.peripheral.is_set(Reg::S1, s1::TC) {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}
