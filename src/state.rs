//! Channel lifecycle states and the channel lock

use crate::error::Error;

/// Lifecycle state of a channel (or of one half of a UART channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Not configured
    #[default]
    Reset,
    /// Configured and idle
    Ready,
    /// Configuration in progress
    Busy,
    /// Transmission in progress
    BusyTx,
    /// Reception in progress
    BusyRx,
    /// Combined transmission and reception in progress
    BusyTxRx,
    /// Left by a timed out operation
    Timeout,
    /// Left by a rejected configuration
    Error,
}

impl State {
    /// Returns true if an operation is in progress
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            State::Busy | State::BusyTx | State::BusyRx | State::BusyTxRx
        )
    }
}

/// Non-reentrant channel lock
///
/// A lock never waits. Acquiring a held lock fails with [`Error::Busy`]. A fresh lock is held,
/// so nothing proceeds on a channel before its first configuration releases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lock {
    #[default]
    Locked,
    Unlocked,
}

impl Lock {
    pub fn acquire(&mut self) -> Result<(), Error> {
        match self {
            Lock::Locked => Err(Error::Busy),
            Lock::Unlocked => {
                *self = Lock::Locked;
                Ok(())
            }
        }
    }

    pub fn release(&mut self) {
        *self = Lock::Unlocked;
    }

    pub fn is_locked(&self) -> bool {
        *self == Lock::Locked
    }
}
