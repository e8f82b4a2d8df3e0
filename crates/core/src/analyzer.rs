// PulseBench - Peripheral Verification Harness
// Copyright (C) 2026 PulseBench Contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::device::DeviceModel;
use crate::signals::{DigitalLevel, OutputLine};
use crate::testbench::Testbench;

/// Polarity of a detected transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Rising,
    Falling,
}

/// A detected transition on an observation line, timestamped in
/// simulated nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEvent {
    pub kind: EdgeKind,
    pub at_ns: u64,
}

/// Level comparator turning per-tick samples into edge events. No true
/// edge-interrupt model exists at tick granularity; detection is
/// previous-sample versus current-sample.
#[derive(Debug, Default)]
pub struct EdgeDetector {
    last: Option<DigitalLevel>,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one sample; returns an event when the level changed since
    /// the previous sample. The first sample only primes the detector.
    pub fn sample(&mut self, level: DigitalLevel, at_ns: u64) -> Option<EdgeEvent> {
        let event = match (self.last, level) {
            (Some(DigitalLevel::Low), DigitalLevel::High) => Some(EdgeEvent {
                kind: EdgeKind::Rising,
                at_ns,
            }),
            (Some(DigitalLevel::High), DigitalLevel::Low) => Some(EdgeEvent {
                kind: EdgeKind::Falling,
                at_ns,
            }),
            _ => None,
        };
        self.last = Some(level);
        event
    }
}

/// One full-period measurement between two rising edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub period_ns: u64,
    pub frequency_hz: f64,
}

/// A period measurement extended with the high-time of the following
/// cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DutyMeasurement {
    pub period_ns: u64,
    pub frequency_hz: f64,
    pub high_ns: u64,
    pub duty_percent: f64,
}

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq)]
pub enum AnalyzerError {
    #[error("no activity on {line:?} within {waited_ns} ns")]
    LivenessTimeout { line: OutputLine, waited_ns: u64 },
    #[error("{line:?} left the expected {expected:?} level at {at_ns} ns")]
    SteadyViolation {
        line: OutputLine,
        expected: DigitalLevel,
        at_ns: u64,
    },
}

/// Measures frequency and duty cycle of a periodic observation line by
/// level sampling at tick granularity.
#[derive(Debug, Clone)]
pub struct EdgeAnalyzer {
    liveness_timeout_ns: u64,
    steady_window_ns: u64,
}

impl EdgeAnalyzer {
    pub fn new(liveness_timeout_ns: u64, steady_window_ns: u64) -> Self {
        Self {
            liveness_timeout_ns,
            steady_window_ns,
        }
    }

    /// Measure one full period between two rising edges.
    ///
    /// The settle and the first rising-edge wait are timeout-bounded to
    /// prove the signal is alive; the inner waits are not, the signal
    /// is known to be running by then.
    pub fn measure_frequency<D: DeviceModel>(
        &self,
        tb: &mut Testbench<D>,
        line: OutputLine,
    ) -> Result<Measurement, AnalyzerError> {
        let deadline = tb.now_ns() + self.liveness_timeout_ns;

        // Establish a known starting phase: wait until the line is low
        // (or find it already settled) so no partial cycle is measured.
        self.wait_level(tb, line, DigitalLevel::Low, Some(deadline))?;
        let start = self.wait_edge(tb, line, EdgeKind::Rising, Some(deadline))?;
        self.wait_edge(tb, line, EdgeKind::Falling, None)?;
        let end = self.wait_edge(tb, line, EdgeKind::Rising, None)?;

        let period_ns = end - start;
        let frequency_hz = 1e9 / period_ns as f64;
        tracing::debug!(period_ns, frequency_hz, ?line, "period measured");
        Ok(Measurement {
            period_ns,
            frequency_hz,
        })
    }

    /// Measure duty cycle in the same observation pass as the period.
    ///
    /// High-time comes from the cycle immediately following the period
    /// window, with no second settle or timeout: consecutive cycles
    /// are taken as drift-free, the assumption the reference tolerance
    /// bands were calibrated against.
    pub fn measure_duty<D: DeviceModel>(
        &self,
        tb: &mut Testbench<D>,
        line: OutputLine,
    ) -> Result<DutyMeasurement, AnalyzerError> {
        let m = self.measure_frequency(tb, line)?;

        // measure_frequency returned at a rising edge; move to the next
        // rising edge and time the high phase from there.
        self.wait_edge(tb, line, EdgeKind::Falling, None)?;
        let sample_start = self.wait_edge(tb, line, EdgeKind::Rising, None)?;
        let fall = self.wait_edge(tb, line, EdgeKind::Falling, None)?;

        let high_ns = fall - sample_start;
        let duty_percent = 100.0 * high_ns as f64 / m.period_ns as f64;
        tracing::debug!(high_ns, duty_percent, ?line, "duty measured");
        Ok(DutyMeasurement {
            period_ns: m.period_ns,
            frequency_hz: m.frequency_hz,
            high_ns,
            duty_percent,
        })
    }

    /// Confirm the line holds `expected` for the whole steady window.
    ///
    /// The window is short and independent of the liveness timeout: a
    /// 0%- or 100%-duty signal never produces the awaited edge, so a
    /// quiet window is the passing result and any contrary sample is a
    /// hard failure.
    pub fn expect_steady<D: DeviceModel>(
        &self,
        tb: &mut Testbench<D>,
        line: OutputLine,
        expected: DigitalLevel,
    ) -> Result<(), AnalyzerError> {
        let deadline = tb.now_ns() + self.steady_window_ns;
        while tb.now_ns() < deadline {
            tb.advance(1);
            if tb.sample(line) != expected {
                return Err(AnalyzerError::SteadyViolation {
                    line,
                    expected,
                    at_ns: tb.now_ns(),
                });
            }
        }
        Ok(())
    }

    fn wait_level<D: DeviceModel>(
        &self,
        tb: &mut Testbench<D>,
        line: OutputLine,
        level: DigitalLevel,
        deadline: Option<u64>,
    ) -> Result<u64, AnalyzerError> {
        loop {
            if tb.sample(line) == level {
                return Ok(tb.now_ns());
            }
            tb.advance(1);
            self.check_deadline(tb.now_ns(), line, deadline)?;
        }
    }

    fn wait_edge<D: DeviceModel>(
        &self,
        tb: &mut Testbench<D>,
        line: OutputLine,
        kind: EdgeKind,
        deadline: Option<u64>,
    ) -> Result<u64, AnalyzerError> {
        let mut detector = EdgeDetector::new();
        let _ = detector.sample(tb.sample(line), tb.now_ns());
        loop {
            tb.advance(1);
            if let Some(event) = detector.sample(tb.sample(line), tb.now_ns()) {
                if event.kind == kind {
                    return Ok(event.at_ns);
                }
            }
            self.check_deadline(tb.now_ns(), line, deadline)?;
        }
    }

    fn check_deadline(
        &self,
        now_ns: u64,
        line: OutputLine,
        deadline: Option<u64>,
    ) -> Result<(), AnalyzerError> {
        match deadline {
            Some(deadline) if now_ns > deadline => Err(AnalyzerError::LivenessTimeout {
                line,
                waited_ns: self.liveness_timeout_ns,
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceModel;
    use crate::signals::InputPins;

    /// Free-running square wave on port A bit 0: high for `high_ticks`,
    /// then low until `period_ticks` elapse.
    #[derive(Debug)]
    struct SquareWave {
        period_ticks: u64,
        high_ticks: u64,
        phase: u64,
    }

    impl SquareWave {
        fn new(period_ticks: u64, high_ticks: u64) -> Self {
            Self {
                period_ticks,
                high_ticks,
                phase: 0,
            }
        }
    }

    impl DeviceModel for SquareWave {
        fn tick(&mut self, _pins: InputPins) {
            self.phase = (self.phase + 1) % self.period_ticks;
        }

        fn port_a(&self) -> u8 {
            (self.phase < self.high_ticks) as u8
        }

        fn port_b(&self) -> u8 {
            0
        }
    }

    const LINE: OutputLine = OutputLine::PortA(0);

    #[test]
    fn test_detector_reports_both_polarities() {
        let mut det = EdgeDetector::new();
        assert_eq!(det.sample(DigitalLevel::Low, 0), None);
        assert_eq!(det.sample(DigitalLevel::Low, 100), None);
        assert_eq!(
            det.sample(DigitalLevel::High, 200),
            Some(EdgeEvent {
                kind: EdgeKind::Rising,
                at_ns: 200
            })
        );
        assert_eq!(det.sample(DigitalLevel::High, 300), None);
        assert_eq!(
            det.sample(DigitalLevel::Low, 400),
            Some(EdgeEvent {
                kind: EdgeKind::Falling,
                at_ns: 400
            })
        );
    }

    #[test]
    fn test_measures_period_and_frequency() {
        // 1000 ticks * 100 ns = 100 us period -> 10 kHz.
        let mut tb = Testbench::new(SquareWave::new(1000, 250), 100);
        let analyzer = EdgeAnalyzer::new(1_000_000, 10_000);
        let m = analyzer.measure_frequency(&mut tb, LINE).unwrap();
        assert_eq!(m.period_ns, 100_000);
        assert!((m.frequency_hz - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_measures_duty_cycle() {
        let mut tb = Testbench::new(SquareWave::new(1000, 250), 100);
        let analyzer = EdgeAnalyzer::new(1_000_000, 10_000);
        let d = analyzer.measure_duty(&mut tb, LINE).unwrap();
        assert_eq!(d.period_ns, 100_000);
        assert_eq!(d.high_ns, 25_000);
        assert!((d.duty_percent - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_dead_line_times_out() {
        let mut tb = Testbench::new(SquareWave::new(1000, 0), 100);
        let analyzer = EdgeAnalyzer::new(50_000, 10_000);
        let err = analyzer.measure_frequency(&mut tb, LINE).unwrap_err();
        assert_eq!(
            err,
            AnalyzerError::LivenessTimeout {
                line: LINE,
                waited_ns: 50_000
            }
        );
        // The timeout is cooperative: the poll loop stopped just past
        // the deadline, not at some unbounded later point.
        assert!(tb.now_ns() <= 50_000 + 2 * tb.tick_period_ns());
    }

    #[test]
    fn test_stuck_high_line_times_out_in_settle() {
        let mut tb = Testbench::new(SquareWave::new(1000, 1000), 100);
        let analyzer = EdgeAnalyzer::new(50_000, 10_000);
        assert!(analyzer.measure_frequency(&mut tb, LINE).is_err());
    }

    #[test]
    fn test_steady_window_passes_on_quiet_line() {
        let mut tb = Testbench::new(SquareWave::new(1000, 0), 100);
        let analyzer = EdgeAnalyzer::new(1_000_000, 10_000);
        analyzer
            .expect_steady(&mut tb, LINE, DigitalLevel::Low)
            .unwrap();
        assert_eq!(tb.now_ns(), 10_000);
    }

    #[test]
    fn test_steady_window_flags_unexpected_edge() {
        let mut tb = Testbench::new(SquareWave::new(50, 25), 100);
        let analyzer = EdgeAnalyzer::new(1_000_000, 10_000);
        let err = analyzer
            .expect_steady(&mut tb, LINE, DigitalLevel::Low)
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::SteadyViolation { .. }));
    }
}
