// Copyright (C) 2025, Cloudflare, Inc.
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are
// met:
//
//     * Redistributions of source code must retain the above copyright notice,
//       this list of conditions and the following disclaimer.
//
//     * Redistributions in binary form must reproduce the above copyright
//       notice, this list of conditions and the following disclaimer in the
//       documentation and/or other materials provided with the distribution.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS
// IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO,
// THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR
// PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR
// CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL,
// EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO,
// PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR
// PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF
// LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING
// NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE OF THIS
// SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! Tahoe TCP congestion control and loss recovery.
//!
//! This crate implements the decision logic of the Tahoe congestion control
//! algorithm: how a sender's congestion window grows in response to
//! acknowledgments (slow start and congestion avoidance) and how it collapses
//! when a loss is detected. It is a library for transport implementations and
//! network simulators; the application is responsible for the transport
//! machinery itself, such as sequence numbers, retransmission timers,
//! duplicate ACK detection and byte accounting.
//!
//! ## Connection setup
//!
//! The first step is creating a configuration object and resolving the
//! algorithms it names into per-connection controllers:
//!
//! ```
//! let mut config = tahoe::Config::new();
//! config.set_cc_algorithm_name("tahoe")?;
//! config.set_recovery_algorithm_name("tahoe")?;
//!
//! let mut cc = tahoe::cc::new_congestion_control(config.cc_algorithm());
//! let mut recovery = tahoe::recovery::new_recovery(config.recovery_algorithm());
//! # Ok::<(), tahoe::Error>(())
//! ```
//!
//! Controllers are per-connection and hold their own counters; distinct
//! connections must use distinct instances. [`CongestionState`] is owned by
//! the connection and lent to every operation.
//!
//! ## Driving the controllers
//!
//! On every acknowledgment that advances the send window, the connection
//! invokes the window growth step. On a detected loss it enters recovery, and
//! once its own state machine decides recovery is over it exits:
//!
//! ```
//! # let mut cc = tahoe::cc::new_congestion_control(tahoe::cc::Algorithm::Tahoe);
//! # let mut recovery =
//! #     tahoe::recovery::new_recovery(tahoe::recovery::Algorithm::Tahoe);
//! let mut tcb = tahoe::CongestionState::new(10 * 1460, 64 * 1460, 1460);
//!
//! // ACK for two segments received.
//! cc.increase_window(&mut tcb, 2, "conn-0");
//!
//! // Loss detected after three duplicate ACKs.
//! recovery.enter_recovery(&mut tcb, 3, 5 * 1460, 0, "conn-0");
//!
//! // Retransmission completed, recovery is over.
//! recovery.exit_recovery(&mut tcb, "conn-0");
//! ```
//!
//! Calls for a single connection must be serialized in the order the
//! underlying events occurred; the controllers perform no locking of their
//! own.
//!
//! ## Forking
//!
//! When a connection duplicates its congestion state (e.g. a listening socket
//! spawning an accepted one), both controllers can be forked. The copy starts
//! from the same counters and evolves independently afterwards:
//!
//! ```
//! # let cc = tahoe::cc::new_congestion_control(tahoe::cc::Algorithm::Tahoe);
//! let child_cc = cc.fork();
//! ```

#[macro_use]
extern crate log;

use std::str::FromStr;

pub type Result<T> = std::result::Result<T, Error>;

/// An error in the congestion control configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// The requested congestion control or recovery algorithm is not
    /// available.
    CongestionControl,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

/// Stores configuration shared between multiple connections.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    cc_algorithm: cc::Algorithm,

    recovery_algorithm: recovery::Algorithm,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Creates a config object with the default algorithm selection.
    pub fn new() -> Self {
        Config {
            cc_algorithm: cc::Algorithm::Tahoe,
            recovery_algorithm: recovery::Algorithm::Tahoe,
        }
    }

    /// Sets the congestion control algorithm used.
    ///
    /// The default value is `cc::Algorithm::Tahoe`.
    pub fn set_cc_algorithm(&mut self, algo: cc::Algorithm) {
        self.cc_algorithm = algo;
    }

    /// Sets the congestion control algorithm used by string.
    ///
    /// The default value is `tahoe`. On error `Error::CongestionControl`
    /// will be returned.
    ///
    /// ## Examples:
    ///
    /// ```
    /// # let mut config = tahoe::Config::new();
    /// config.set_cc_algorithm_name("tahoe")?;
    /// # Ok::<(), tahoe::Error>(())
    /// ```
    pub fn set_cc_algorithm_name(&mut self, name: &str) -> Result<()> {
        self.cc_algorithm = cc::Algorithm::from_str(name)?;

        Ok(())
    }

    /// Returns the congestion control algorithm connections will use.
    pub fn cc_algorithm(&self) -> cc::Algorithm {
        self.cc_algorithm
    }

    /// Sets the loss recovery algorithm used.
    ///
    /// The default value is `recovery::Algorithm::Tahoe`.
    pub fn set_recovery_algorithm(&mut self, algo: recovery::Algorithm) {
        self.recovery_algorithm = algo;
    }

    /// Sets the loss recovery algorithm used by string.
    ///
    /// The default value is `tahoe`. On error `Error::CongestionControl`
    /// will be returned.
    pub fn set_recovery_algorithm_name(&mut self, name: &str) -> Result<()> {
        self.recovery_algorithm = recovery::Algorithm::from_str(name)?;

        Ok(())
    }

    /// Returns the loss recovery algorithm connections will use.
    pub fn recovery_algorithm(&self) -> recovery::Algorithm {
        self.recovery_algorithm
    }
}

/// Per-connection congestion state shared by the controllers.
///
/// The connection owns one of these and lends it to every controller
/// operation. All values are in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CongestionState {
    /// Current congestion window.
    pub congestion_window: usize,

    /// Slow start threshold. Held at zero while loss recovery suppresses
    /// window growth.
    pub ssthresh: usize,

    /// Negotiated maximum segment size. Constant for the lifetime of the
    /// connection.
    pub segment_size: usize,
}

impl CongestionState {
    /// Creates congestion state for a new connection.
    pub fn new(
        congestion_window: usize, ssthresh: usize, segment_size: usize,
    ) -> Self {
        CongestionState {
            congestion_window,
            ssthresh,
            segment_size,
        }
    }
}

pub mod cc;
pub mod recovery;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = Config::new();

        assert_eq!(config.cc_algorithm(), cc::Algorithm::Tahoe);
        assert_eq!(config.recovery_algorithm(), recovery::Algorithm::Tahoe);
    }

    #[test]
    fn config_set_algorithm_names() {
        let mut config = Config::new();

        assert_eq!(config.set_cc_algorithm_name("tahoe"), Ok(()));
        assert_eq!(config.set_recovery_algorithm_name("tahoe"), Ok(()));

        assert_eq!(
            config.set_cc_algorithm_name("newreno"),
            Err(Error::CongestionControl)
        );
        assert_eq!(
            config.set_recovery_algorithm_name("sack"),
            Err(Error::CongestionControl)
        );
    }

    #[test]
    fn tahoe_full_cycle() {
        let mut cc = cc::new_congestion_control(cc::Algorithm::Tahoe);
        let mut recovery = recovery::new_recovery(recovery::Algorithm::Tahoe);

        let mut tcb = CongestionState::new(1000, 4000, 100);

        // Slow start: one segment of growth per ACKed segment.
        cc.increase_window(&mut tcb, 10, "cycle");
        assert_eq!(tcb.congestion_window, 2000);

        cc.increase_window(&mut tcb, 30, "cycle");
        assert_eq!(tcb.congestion_window, 4000);

        // At the threshold growth turns additive: one segment per window's
        // worth of ACKed segments.
        cc.increase_window(&mut tcb, 40, "cycle");
        assert_eq!(tcb.congestion_window, 4100);

        // Loss. The window collapses and the threshold is parked at zero.
        recovery.enter_recovery(&mut tcb, 3, 2000, 0, "cycle");
        assert_eq!(tcb.congestion_window, 1);
        assert_eq!(tcb.ssthresh, 0);

        recovery.do_recovery(&mut tcb, 100, "cycle");
        assert_eq!(tcb.congestion_window, 1);

        // Recovery ends. Half the pre-loss window becomes the new threshold
        // and slow start resumes from the collapsed window.
        recovery.exit_recovery(&mut tcb, "cycle");
        assert_eq!(tcb.ssthresh, 2050);
        assert_eq!(tcb.congestion_window, 1);

        cc.increase_window(&mut tcb, 1, "cycle");
        assert_eq!(tcb.congestion_window, 101);
    }
}
