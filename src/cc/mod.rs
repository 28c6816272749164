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

//! Congestion window control.

use std::fmt::Debug;
use std::str::FromStr;

use crate::cc;
use crate::CongestionState;

/// Available congestion control algorithms.
///
/// This enum provides currently available list of congestion control
/// algorithms.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Algorithm {
    /// Tahoe congestion control algorithm. `tahoe` in a string form.
    Tahoe = 0,
}

impl FromStr for Algorithm {
    type Err = crate::Error;

    /// Converts a string to `Algorithm`.
    ///
    /// If `name` is not an available name, `Err(Error::CongestionControl)`
    /// will be returned.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "tahoe" => Ok(Algorithm::Tahoe),
            _ => Err(crate::Error::CongestionControl),
        }
    }
}

/// Congestion window control hooks.
///
/// The connection invokes these while processing ACKs; all window bookkeeping
/// happens through the [`CongestionState`] it lends to each call. `trace_id`
/// is an opaque connection label used only for logging.
pub trait CongestionControl
where
    Self: Debug,
{
    fn new() -> Self
    where
        Self: Sized;

    /// Grows the congestion window after `segments_acked` segments were
    /// newly acknowledged.
    ///
    /// Performs slow start while the window is below the slow start
    /// threshold, congestion avoidance otherwise. An acknowledgment for zero
    /// segments leaves the state untouched.
    fn increase_window(
        &mut self, tcb: &mut CongestionState, segments_acked: usize,
        trace_id: &str,
    );

    /// Returns the slow start threshold to adopt after a loss event.
    ///
    /// Read-only; the connection calls this when it detects a loss and
    /// applies the result once its recovery path completes.
    fn ssthresh(&self, tcb: &CongestionState, bytes_in_flight: usize) -> usize;

    /// Copies the controller for a duplicated connection.
    ///
    /// The copy starts from the same counters as `self` and evolves
    /// independently afterwards.
    fn fork(&self) -> Box<dyn CongestionControl>;
}

/// Returns a congestion control module. `algo` is one of cc::Algorithm enum.
pub fn new_congestion_control(algo: Algorithm) -> Box<dyn CongestionControl> {
    trace!("congestion control initialized: {algo:?}");

    match algo {
        Algorithm::Tahoe => Box::new(cc::tahoe::Tahoe::new()),
    }
}


// List of CC modules.
mod tahoe;
