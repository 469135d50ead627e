//! Position calculation
//!
//! Folds an unbounded raw position into a loop index and a normalized
//! position in `[0, duration]`, honoring loop count, bounce, and reversal.

/// Loop configuration of a temporal object
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoopShape {
    pub duration: f64,
    /// Extra passes after the first (-1 for infinite)
    pub loop_count: i32,
    pub reversed: bool,
    pub bounce: bool,
}

/// A normalized position
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionState {
    /// Raw position after clamping to `[0, (loop_count + 1) * duration]`
    pub raw: f64,
    /// Position within the current loop, in `[0, duration]`
    pub position: f64,
    pub loop_index: i64,
    /// The final loop has been exhausted
    pub ended: bool,
    /// The current loop plays backwards
    pub loop_reversed: bool,
}

impl LoopShape {
    pub fn new(duration: f64, loop_count: i32, reversed: bool, bounce: bool) -> Self {
        Self {
            duration,
            loop_count,
            reversed,
            bounce,
        }
    }

    pub fn is_infinite(&self) -> bool {
        self.loop_count < 0
    }

    /// Whether the given loop iteration plays backwards
    pub fn is_loop_reversed(&self, loop_index: i64) -> bool {
        self.reversed ^ (self.bounce && loop_index % 2 != 0)
    }

    /// Loop index and in-loop time of a raw position, ignoring the loop count
    ///
    /// The loop index saturates for huge raw positions; the in-loop time
    /// always stays in `[0, duration)`.
    fn fold(&self, raw: f64) -> (i64, f64) {
        let d = self.duration;
        ((raw / d).floor() as i64, raw.rem_euclid(d))
    }

    /// Split a raw position into `(loop_index, local_time)`, clamping past the
    /// final loop to `(loop_count, duration)`.
    ///
    /// Local time is not reversal-adjusted.
    pub fn split(&self, raw: f64) -> (i64, f64) {
        let d = self.duration;
        if d <= 0.0 {
            return (0, 0.0);
        }
        let (mut loop_index, mut t) = self.fold(clamp_raw(raw));
        if !self.is_infinite() && loop_index > self.loop_count as i64 {
            loop_index = self.loop_count as i64;
            t = d;
        }
        (loop_index, t)
    }

    /// Normalize a raw position
    pub fn calculate(&self, raw: f64) -> PositionState {
        let mut raw = clamp_raw(raw);
        let d = self.duration;

        if d <= 0.0 {
            return PositionState {
                raw,
                position: 0.0,
                loop_index: 0,
                ended: true,
                loop_reversed: false,
            };
        }

        let (mut loop_index, mut t) = self.fold(raw);
        let ended = !self.is_infinite() && raw >= self.loop_count as f64 * d + d;
        if ended {
            t = d;
            loop_index = self.loop_count as i64;
            raw = d * self.loop_count as f64 + d;
        }

        let loop_reversed = self.is_loop_reversed(loop_index);
        PositionState {
            raw,
            position: if loop_reversed { d - t } else { t },
            loop_index,
            ended,
            loop_reversed,
        }
    }

    /// Normalized position only, without end bookkeeping
    pub fn position_at(&self, raw: f64) -> f64 {
        self.calculate(raw).position
    }
}

/// Negative and NaN raw positions count as 0; infinity as the largest finite value
fn clamp_raw(raw: f64) -> f64 {
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, f64::MAX)
    }
}
