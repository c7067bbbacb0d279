// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! GPS telemetry task.
//!
//! The GPS module streams NMEA sentences; each idle-terminated reception may hold several of
//! them. This task keeps only the newest complete sentence (`$...`) together with its
//! sentence id (`GPRMC`, `GNGGA`, ...) and counts what it saw. Field decoding is left to the
//! consumers of [`TelemetryTask::latest`].

use heapless::{String, Vec};

use crate::config::{TELEMETRY_PERIOD_MS, TELEMETRY_RX_LEN};
use crate::context::RobotContext;
use crate::os::{Task, TaskContext};

/// Longest sentence id kept (talker + type).
pub const SENTENCE_ID_LEN: usize = 8;

pub struct TelemetryTask<'a> {
    ctx: &'a RobotContext,
    rx: [u8; TELEMETRY_RX_LEN],
    latest: Vec<u8, TELEMETRY_RX_LEN>,
    sentence_id: String<SENTENCE_ID_LEN>,
    sentences: u32,
}

impl<'a> TelemetryTask<'a> {
    pub fn new(ctx: &'a RobotContext) -> Self {
        Self {
            ctx,
            rx: [0; TELEMETRY_RX_LEN],
            latest: Vec::new(),
            sentence_id: String::new(),
            sentences: 0,
        }
    }

    /// Consume the pending reception, if any. Returns the number of sentences it held.
    pub fn poll(&mut self) -> usize {
        let Some(len) = self.ctx.telemetry_rx.take(&mut self.rx) else {
            return 0;
        };

        let mut found = 0;
        let mut newest: Option<(usize, usize)> = None;
        let mut start = 0;
        for (i, b) in self.rx[..len].iter().enumerate() {
            if *b == b'\n' {
                if let Some(range) = Self::sentence_in(&self.rx[start..i]) {
                    newest = Some((start + range.0, start + range.1));
                    found += 1;
                }
                start = i + 1;
            }
        }
        // A tail without a newline still counts if it is a whole sentence.
        if let Some(range) = Self::sentence_in(&self.rx[start..len]) {
            newest = Some((start + range.0, start + range.1));
            found += 1;
        }

        if let Some((s, e)) = newest {
            self.latest.clear();
            // Cannot overflow: the sentence came out of a buffer of the same capacity.
            self.latest.extend_from_slice(&self.rx[s..e]).ok();
            self.sentence_id = Self::id_of(&self.latest);
        }

        self.sentences = self.sentences.wrapping_add(found as u32);
        found
    }

    /// Bounds of a `$`-prefixed sentence in `line`, with trailing CR stripped.
    fn sentence_in(line: &[u8]) -> Option<(usize, usize)> {
        let start = line.iter().position(|&b| b == b'$')?;
        let mut end = line.len();
        while end > start && matches!(line[end - 1], b'\r' | b'\0') {
            end -= 1;
        }
        (end - start > 1).then_some((start, end))
    }

    fn id_of(sentence: &[u8]) -> String<SENTENCE_ID_LEN> {
        let mut id = String::new();
        for &b in sentence.iter().skip(1) {
            if b == b',' || b == b'*' || !b.is_ascii_alphanumeric() {
                break;
            }
            if id.push(b as char).is_err() {
                break;
            }
        }
        id
    }

    /// Newest complete sentence, without line terminator.
    #[inline]
    pub fn latest(&self) -> &[u8] {
        &self.latest
    }

    #[inline]
    pub fn sentence_id(&self) -> &str {
        &self.sentence_id
    }

    /// Sentences seen since boot.
    #[inline]
    pub fn sentences(&self) -> u32 {
        self.sentences
    }
}

impl Task for TelemetryTask<'_> {
    fn step(&mut self, cx: &TaskContext<'_>) {
        let n = self.poll();
        if n > 0 {
            log_debug!("gps: {} sentence(s), newest {}", n, self.sentence_id());
        }
        cx.delay_ms(TELEMETRY_PERIOD_MS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_pending() {
        let ctx = RobotContext::new();
        let mut task = TelemetryTask::new(&ctx);
        assert_eq!(task.poll(), 0);
        assert!(task.latest().is_empty());
        assert_eq!(task.sentence_id(), "");
    }

    #[test]
    fn keeps_newest_sentence() {
        let ctx = RobotContext::new();
        let mut task = TelemetryTask::new(&ctx);

        ctx.telemetry_rx.capture(
            b"$GNGGA,082559.00,3150.7,N,11711.9,E,1,08,1.0,40.0,M,,M,,*4B\r\n\
              $GNRMC,082559.00,A,3150.7,N,11711.9,E,0.0,,010203,,,A*6C\r\n",
        );
        assert_eq!(task.poll(), 2);
        assert_eq!(task.sentence_id(), "GNRMC");
        assert!(task.latest().starts_with(b"$GNRMC,082559.00"));
        assert!(task.latest().ends_with(b"*6C"));
        assert_eq!(task.sentences(), 2);
    }

    #[test]
    fn partial_garbage_is_skipped() {
        let ctx = RobotContext::new();
        let mut task = TelemetryTask::new(&ctx);

        ctx.telemetry_rx.capture(b"12.3,N*00\r\n$GPVTG,,T,,M,0.0,N*20");
        assert_eq!(task.poll(), 1);
        assert_eq!(task.sentence_id(), "GPVTG");

        // A reception without any sentence keeps the previous one.
        ctx.telemetry_rx.capture(b"\r\n\r\n");
        assert_eq!(task.poll(), 0);
        assert_eq!(task.sentence_id(), "GPVTG");
        assert_eq!(task.sentences(), 1);
    }
}
