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

//! Tahoe Congestion Control
//!
//! The first TCP variant with in-built congestion control: multiplicative
//! slow start up to the slow start threshold, then additive increase of one
//! segment per window's worth of acknowledged segments.

use std::cmp;

use crate::cc;
use crate::CongestionState;

/// Tahoe congestion control implementation.
pub struct Tahoe {
    // ACK credit, in segments, that has not yet amounted to a whole segment
    // of window growth. Carried across calls.
    cwnd_cnt: usize,
}

impl Tahoe {
    fn slow_start(
        &mut self, tcb: &mut CongestionState, segments_acked: usize,
        trace_id: &str,
    ) {
        // Grow by one segment per ACKed segment, capped at the threshold so
        // a single call cannot overshoot into congestion avoidance.
        tcb.congestion_window = cmp::min(
            tcb.congestion_window + segments_acked * tcb.segment_size,
            tcb.ssthresh,
        );

        trace!(
            "{} slow start cwnd={} ssthresh={}",
            trace_id,
            tcb.congestion_window,
            tcb.ssthresh
        );
    }

    fn congestion_avoidance(
        &mut self, tcb: &mut CongestionState, segments_acked: usize,
        trace_id: &str,
    ) {
        // Segments in the current window, floored to 1 when the window is
        // smaller than one segment (this also covers a zero segment size).
        let w = cmp::max(
            1,
            tcb.congestion_window
                .checked_div(tcb.segment_size)
                .unwrap_or(0),
        );

        self.cwnd_cnt += segments_acked;

        if self.cwnd_cnt >= w {
            // One segment of growth per window's worth of ACKed segments;
            // leftover credit stays in the counter for later calls.
            let delta = self.cwnd_cnt / w;

            tcb.congestion_window += delta * tcb.segment_size;
            self.cwnd_cnt -= delta * w;
        }

        trace!(
            "{} congestion avoidance cwnd={} cwnd_cnt={}",
            trace_id,
            tcb.congestion_window,
            self.cwnd_cnt
        );
    }
}

impl cc::CongestionControl for Tahoe {
    fn new() -> Self
    where
        Self: Sized,
    {
        Tahoe { cwnd_cnt: 0 }
    }

    fn increase_window(
        &mut self, tcb: &mut CongestionState, segments_acked: usize,
        trace_id: &str,
    ) {
        if segments_acked == 0 {
            return;
        }

        if tcb.congestion_window < tcb.ssthresh {
            self.slow_start(tcb, segments_acked, trace_id);
        } else {
            self.congestion_avoidance(tcb, segments_acked, trace_id);
        }
    }

    fn ssthresh(
        &self, tcb: &CongestionState, _bytes_in_flight: usize,
    ) -> usize {
        cmp::max(2 * tcb.segment_size, tcb.congestion_window / 2)
    }

    fn fork(&self) -> Box<dyn cc::CongestionControl> {
        Box::new(Tahoe {
            cwnd_cnt: self.cwnd_cnt,
        })
    }
}

impl std::fmt::Debug for Tahoe {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "cwnd_cnt={}", self.cwnd_cnt)
    }
}
