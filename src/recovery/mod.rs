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

//! Loss recovery.

use std::fmt::Debug;
use std::str::FromStr;

use crate::recovery;
use crate::CongestionState;

/// Available loss recovery algorithms.
///
/// This enum provides currently available list of loss recovery algorithms.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Algorithm {
    /// Tahoe loss recovery algorithm. `tahoe` in a string form.
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

/// Loss recovery hooks.
///
/// The connection's recovery state machine drives these: `enter_recovery`
/// once a loss is detected, `do_recovery` on every further ACK while
/// recovery is in progress, and `exit_recovery` once it decides recovery is
/// over. Calling `exit_recovery` without a preceding `enter_recovery` reads
/// stale saved state and is a caller bug.
pub trait RecoveryOps
where
    Self: Debug,
{
    fn new() -> Self
    where
        Self: Sized;

    /// Invoked when the connection detects a loss and enters recovery.
    ///
    /// The duplicate ACK, unACKed data and delivered byte counts describe
    /// the loss event; how much of that a policy uses is up to the policy.
    fn enter_recovery(
        &mut self, tcb: &mut CongestionState, dup_ack_count: usize,
        unacked_data_count: usize, delivered_bytes: usize, trace_id: &str,
    );

    /// Invoked on every ACK received while recovery is in progress.
    fn do_recovery(
        &mut self, tcb: &mut CongestionState, delivered_bytes: usize,
        trace_id: &str,
    );

    /// Invoked when the connection leaves recovery.
    fn exit_recovery(&mut self, tcb: &mut CongestionState, trace_id: &str);

    /// Copies the controller for a duplicated connection.
    fn fork(&self) -> Box<dyn RecoveryOps>;
}

/// Returns a loss recovery module. `algo` is one of recovery::Algorithm enum.
pub fn new_recovery(algo: Algorithm) -> Box<dyn RecoveryOps> {
    trace!("loss recovery initialized: {algo:?}");

    match algo {
        Algorithm::Tahoe => Box::new(recovery::tahoe::TahoeRecovery::new()),
    }
}


// List of recovery modules.
mod tahoe;
