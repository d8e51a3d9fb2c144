use std::time::{Duration, Instant};

/// A frame that overran its budget, kept for the end-of-run report.
#[derive(Debug, Clone, PartialEq)]
pub struct LongFrame {
    pub trial: usize,
    pub frame: i64,
    pub duration_secs: f64,
}

#[derive(Debug, Clone)]
pub struct CalibrationStats {
    pub average_frame_time_ns: f64,
    pub jitter_ns: f64,
    pub min_frame_time_ns: f64,
    pub max_frame_time_ns: f64,
    pub effective_fps: f64,
}

/// Monotonic clock tied to the configured frame rate.
///
/// The presentation loop is the only writer; it records each presented
/// frame's duration, and the clock keeps the calibration statistics and the
/// list of frames that blew their period.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    frame_rate: f64,
    period: Duration,
    frame_times: Vec<Duration>,
    max_samples: usize,
    long_frames: Vec<LongFrame>,
    total_frames: u64,
}

impl FrameClock {
    /// Frames taking longer than this multiple of the period count as long.
    const LONG_FRAME_FACTOR: f64 = 1.5;

    pub fn new(frame_rate: f64) -> FrameClock {
        let rate = if frame_rate > 0.0 { frame_rate } else { 60.0 };
        FrameClock {
            start: Instant::now(),
            frame_rate: rate,
            period: Duration::from_secs_f64(1.0 / rate),
            frame_times: Vec::with_capacity(1000),
            max_samples: 1000,
            long_frames: Vec::new(),
            total_frames: 0,
        }
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Nanoseconds since the clock started.
    pub fn now_ns(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }

    pub fn restart(&mut self) {
        self.start = Instant::now();
    }

    /// Frame index the given elapsed time falls into.
    pub fn frame_for(&self, elapsed: Duration) -> i64 {
        (elapsed.as_secs_f64() * self.frame_rate) as i64
    }

    /// Records one presented frame. Returns true when the frame overran its
    /// budget and was added to the long-frame report.
    pub fn record_frame(&mut self, trial: usize, frame: i64, took: Duration) -> bool {
        self.total_frames += 1;
        if self.frame_times.len() >= self.max_samples {
            self.frame_times.remove(0);
        }
        self.frame_times.push(took);

        let long = took.as_secs_f64() > self.period.as_secs_f64() * Self::LONG_FRAME_FACTOR;
        if long {
            self.long_frames.push(LongFrame {
                trial,
                frame,
                duration_secs: took.as_secs_f64(),
            });
        }
        long
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn long_frames(&self) -> &[LongFrame] {
        &self.long_frames
    }

    pub fn long_frame_percentage(&self) -> f64 {
        if self.total_frames == 0 {
            return 0.0;
        }
        self.long_frames.len() as f64 / self.total_frames as f64 * 100.0
    }

    pub fn calibration_stats(&self) -> CalibrationStats {
        let times: Vec<f64> = self
            .frame_times
            .iter()
            .map(|d| d.as_nanos() as f64)
            .collect();
        if times.is_empty() {
            return CalibrationStats {
                average_frame_time_ns: 0.0,
                jitter_ns: 0.0,
                min_frame_time_ns: 0.0,
                max_frame_time_ns: 0.0,
                effective_fps: 0.0,
            };
        }
        let avg = times.iter().sum::<f64>() / times.len() as f64;
        let var = times.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / times.len() as f64;
        let min = times.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = times.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        CalibrationStats {
            average_frame_time_ns: avg,
            jitter_ns: var.sqrt(),
            min_frame_time_ns: min,
            max_frame_time_ns: max,
            effective_fps: if avg > 0.0 { 1e9 / avg } else { 0.0 },
        }
    }

    /// Sleeps without the coarse granularity of the default timer where the
    /// platform allows it.
    pub fn precise_sleep(&self, duration: Duration) {
        #[cfg(target_os = "linux")]
        linux_sleep(duration);
        #[cfg(not(target_os = "linux"))]
        std::thread::sleep(duration);
    }
}

#[cfg(target_os = "linux")]
fn linux_sleep(duration: Duration) {
    use libc::{clock_nanosleep, timespec, CLOCK_MONOTONIC};

    let req = timespec {
        tv_sec: duration.as_secs() as libc::time_t,
        tv_nsec: duration.subsec_nanos() as libc::c_long,
    };

    unsafe {
        clock_nanosleep(CLOCK_MONOTONIC, 0, &req, std::ptr::null_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_index_follows_elapsed_time() {
        let clock = FrameClock::new(60.0);
        assert_eq!(clock.frame_for(Duration::from_millis(0)), 0);
        assert_eq!(clock.frame_for(Duration::from_millis(17)), 1);
        assert_eq!(clock.frame_for(Duration::from_millis(500)), 30);
    }

    #[test]
    fn long_frames_are_flagged() {
        let mut clock = FrameClock::new(60.0);
        clock.record_frame(0, 0, Duration::from_millis(16));
        clock.record_frame(0, 1, Duration::from_millis(40));
        clock.record_frame(1, 0, Duration::from_millis(17));

        assert_eq!(clock.total_frames(), 3);
        assert_eq!(clock.long_frames().len(), 1);
        assert_eq!(clock.long_frames()[0].trial, 0);
        assert_eq!(clock.long_frames()[0].frame, 1);
        assert!((clock.long_frame_percentage() - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn stats_cover_recorded_frames() {
        let mut clock = FrameClock::new(60.0);
        for _ in 0..10 {
            clock.record_frame(0, 0, Duration::from_millis(16));
        }
        let stats = clock.calibration_stats();
        assert!((stats.average_frame_time_ns - 16e6).abs() < 1e3);
        assert!(stats.jitter_ns < 1.0);
        assert!(stats.effective_fps > 62.0 && stats.effective_fps < 63.0);
    }
}
