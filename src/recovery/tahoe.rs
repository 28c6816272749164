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

//! Tahoe Loss Recovery
//!
//! Every loss is treated as catastrophic: the window collapses to one and
//! slow start restarts from scratch once recovery ends. There is no fast
//! retransmit or fast recovery.

use crate::recovery;
use crate::CongestionState;

/// Tahoe loss recovery implementation.
pub struct TahoeRecovery {
    // Slow start threshold computed when recovery was entered, restored on
    // exit.
    half_ssthresh: usize,
}

impl recovery::RecoveryOps for TahoeRecovery {
    fn new() -> Self
    where
        Self: Sized,
    {
        TahoeRecovery { half_ssthresh: 0 }
    }

    fn enter_recovery(
        &mut self, tcb: &mut CongestionState, _dup_ack_count: usize,
        _unacked_data_count: usize, _delivered_bytes: usize, trace_id: &str,
    ) {
        // Save half the window for exit_recovery. The threshold is parked at
        // zero so slow start cannot reinflate the window until recovery
        // ends, and the window itself collapses to its minimum no matter how
        // much data is outstanding.
        self.half_ssthresh = tcb.congestion_window / 2;

        tcb.ssthresh = 0;
        tcb.congestion_window = 1;

        trace!(
            "{} entered recovery, saved ssthresh={}",
            trace_id,
            self.half_ssthresh
        );
    }

    fn do_recovery(
        &mut self, _tcb: &mut CongestionState, _delivered_bytes: usize,
        trace_id: &str,
    ) {
        // Tahoe has no per-ACK behavior while in recovery; the window was
        // already collapsed on entry.
        trace!("{} recovery in progress", trace_id);
    }

    fn exit_recovery(&mut self, tcb: &mut CongestionState, trace_id: &str) {
        // Restore the threshold computed at entry. The window is left to
        // whatever slow start has grown it to since.
        tcb.ssthresh = self.half_ssthresh;

        trace!("{} exited recovery, ssthresh={}", trace_id, tcb.ssthresh);
    }

    fn fork(&self) -> Box<dyn recovery::RecoveryOps> {
        Box::new(TahoeRecovery {
            half_ssthresh: self.half_ssthresh,
        })
    }
}

impl std::fmt::Debug for TahoeRecovery {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "half_ssthresh={}", self.half_ssthresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::recovery::RecoveryOps;

    use rstest::rstest;

    const TRACE_ID: &str = "test_id";

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn tahoe_enter_recovery() {
        init();

        let mut recovery = TahoeRecovery::new();
        let mut tcb = CongestionState::new(1000, 2000, 100);

        recovery.enter_recovery(&mut tcb, 3, 500, 0, TRACE_ID);

        assert_eq!(tcb.congestion_window, 1);
        assert_eq!(tcb.ssthresh, 0);
        assert_eq!(recovery.half_ssthresh, 500);
    }

    #[rstest]
    #[case(0, 0, 0)]
    #[case(3, 0, 0)]
    #[case(3, 5000, 1460)]
    #[case(usize::MAX, usize::MAX, usize::MAX)]
    fn tahoe_enter_recovery_ignores_counts(
        #[case] dup_ack_count: usize, #[case] unacked_data_count: usize,
        #[case] delivered_bytes: usize,
    ) {
        init();

        let mut recovery = TahoeRecovery::new();
        let mut tcb = CongestionState::new(1000, 2000, 100);

        recovery.enter_recovery(
            &mut tcb,
            dup_ack_count,
            unacked_data_count,
            delivered_bytes,
            TRACE_ID,
        );

        assert_eq!(tcb.congestion_window, 1);
        assert_eq!(tcb.ssthresh, 0);
    }

    #[test]
    fn tahoe_do_recovery_is_a_noop() {
        init();

        let mut recovery = TahoeRecovery::new();
        let mut tcb = CongestionState::new(1000, 2000, 100);

        recovery.enter_recovery(&mut tcb, 3, 500, 0, TRACE_ID);

        let after_enter = tcb;

        recovery.do_recovery(&mut tcb, 100, TRACE_ID);
        recovery.do_recovery(&mut tcb, 1000, TRACE_ID);

        assert_eq!(tcb, after_enter);
    }

    #[test]
    fn tahoe_exit_recovery() {
        init();

        let mut recovery = TahoeRecovery::new();
        let mut tcb = CongestionState::new(1000, 2000, 100);

        recovery.enter_recovery(&mut tcb, 3, 500, 0, TRACE_ID);
        recovery.exit_recovery(&mut tcb, TRACE_ID);

        // Half the pre-loss window is restored as the threshold; the window
        // itself is not reinflated.
        assert_eq!(tcb.ssthresh, 500);
        assert_eq!(tcb.congestion_window, 1);
    }

    #[test]
    fn tahoe_recovery_cycles() {
        init();

        let mut recovery = TahoeRecovery::new();
        let mut tcb = CongestionState::new(801, 2000, 100);

        // First loss: threshold halves to 400.
        recovery.enter_recovery(&mut tcb, 3, 0, 0, TRACE_ID);
        recovery.exit_recovery(&mut tcb, TRACE_ID);
        assert_eq!(tcb.ssthresh, 400);

        // The connection grows again, then loses again.
        tcb.congestion_window = 600;

        recovery.enter_recovery(&mut tcb, 3, 0, 0, TRACE_ID);
        recovery.exit_recovery(&mut tcb, TRACE_ID);
        assert_eq!(tcb.ssthresh, 300);
        assert_eq!(tcb.congestion_window, 1);
    }

    #[test]
    fn tahoe_recovery_fork_independence() {
        init();

        let mut recovery = TahoeRecovery::new();
        let mut tcb = CongestionState::new(1000, 2000, 100);

        recovery.enter_recovery(&mut tcb, 3, 0, 0, TRACE_ID);

        let mut forked = recovery.fork();

        // A loss on the original's connection must not leak into the fork.
        let mut orig_tcb = CongestionState::new(2000, 2000, 100);
        recovery.enter_recovery(&mut orig_tcb, 3, 0, 0, TRACE_ID);
        assert_eq!(recovery.half_ssthresh, 1000);

        let mut fork_tcb = CongestionState::new(1, 0, 100);
        forked.exit_recovery(&mut fork_tcb, TRACE_ID);
        assert_eq!(fork_tcb.ssthresh, 500);
    }
}
