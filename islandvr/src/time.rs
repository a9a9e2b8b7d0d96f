use std::time::Duration;

/// Frame timing handed to every update pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Time {
    /// Time since the previous frame.
    pub elapsed: Duration,
    /// Time since the first frame.
    pub total: Duration,
}

impl Time {
    /// Timing for the first frame of a run.
    pub fn first_frame(elapsed: Duration) -> Time {
        Time {
            elapsed,
            total: elapsed,
        }
    }

    pub fn delta_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    pub fn advance(&self, elapsed: Duration) -> Time {
        Time {
            elapsed,
            total: self.total + elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates_total() {
        let frame = Duration::from_millis(16);
        let time = Time::first_frame(frame).advance(frame).advance(frame);
        assert_eq!(time.total, Duration::from_millis(48));
        assert_eq!(time.elapsed, frame);
        assert!((time.delta_seconds() - 0.016).abs() < 1e-6);
    }
}
