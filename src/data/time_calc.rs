use std::time::Duration;

/// Accumulated per-stage durations across detection calls.
///
/// Stage `i` is summed in slot `i`; `runs` counts complete calls.
#[derive(Debug, Default, Clone)]
pub struct TimeCalc {
    runs: usize,
    durations: Vec<Duration>,
}

impl TimeCalc {
    pub const PREPROCESS: usize = 0;
    pub const INFERENCE: usize = 1;
    pub const POSTPROCESS: usize = 2;

    pub fn total(&self) -> Duration {
        self.durations.iter().sum::<Duration>()
    }

    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Average duration of a complete call, zero before the first run.
    pub fn avg(&self) -> Duration {
        match self.runs {
            0 => Duration::ZERO,
            n => self.total() / n as u32,
        }
    }

    pub fn avg_i(&self, i: usize) -> Duration {
        match (self.durations.get(i), self.runs) {
            (Some(d), n) if n > 0 => *d / n as u32,
            _ => Duration::ZERO,
        }
    }

    pub fn add(&mut self, i: usize, x: Duration) {
        if i >= self.durations.len() {
            self.durations.resize(i + 1, Duration::ZERO);
        }
        self.durations[i] += x;
    }

    pub fn finish_run(&mut self) {
        self.runs += 1;
    }

    pub fn clear(&mut self) {
        self.runs = Default::default();
        self.durations = Default::default();
    }
}
