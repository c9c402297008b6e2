//! Percentage progress reporting for restores.
//!
//! A restore is a fixed sequence of steps, each applying some number of
//! records. This module maps that onto a single 0-100 percentage with the
//! guarantees callers rely on: values stay inside [0, 100], never decrease,
//! and the final report is exactly 100.

/// Receives progress reports. Any `FnMut(f64, &str)` closure is a sink, so
/// callers usually just pass a closure (or [`ignore_progress`]).
pub trait ProgressSink {
    fn emit(&mut self, percent: f64, message: &str);
}

impl<F> ProgressSink for F
where
    F: FnMut(f64, &str),
{
    fn emit(&mut self, percent: f64, message: &str) {
        self(percent, message)
    }
}

/// No-op sink for callers that do not track progress.
pub fn ignore_progress(_percent: f64, _message: &str) {}

/// Maps an ordered sequence of equally weighted steps onto one percentage.
///
/// `item` interpolates inside the current step's slice; `step_done` moves the
/// boundary. Reports are clamped so the percentage never goes backwards even
/// if a caller reports items out of order.
pub struct StepProgress<S: ProgressSink> {
    sink: S,
    total_steps: usize,
    current_step: usize,
    last_percent: f64,
}

impl<S: ProgressSink> StepProgress<S> {
    pub fn new(sink: S, total_steps: usize) -> Self {
        StepProgress {
            sink,
            total_steps: total_steps.max(1),
            current_step: 0,
            last_percent: 0.0,
        }
    }

    /// Report that `done` of `count` items of the current step are applied.
    pub fn item(&mut self, done: usize, count: usize, message: &str) {
        let within = if count == 0 {
            1.0
        } else {
            (done as f64 / count as f64).min(1.0)
        };
        let percent =
            (self.current_step as f64 + within) / self.total_steps as f64 * 100.0;
        self.send(percent, message);
    }

    /// Mark the current step finished and move the boundary forward.
    pub fn step_done(&mut self, message: &str) {
        self.current_step = (self.current_step + 1).min(self.total_steps);
        let percent = self.current_step as f64 / self.total_steps as f64 * 100.0;
        self.send(percent, message);
    }

    /// Final report, always exactly 100.
    pub fn finish(&mut self, message: &str) {
        self.current_step = self.total_steps;
        self.send(100.0, message);
    }

    pub fn last_percent(&self) -> f64 {
        self.last_percent
    }

    fn send(&mut self, percent: f64, message: &str) {
        let clamped = percent.clamp(0.0, 100.0).max(self.last_percent);
        self.last_percent = clamped;
        self.sink.emit(clamped, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_interpolates_inside_the_step_slice() {
        let mut seen = Vec::new();
        let mut progress = StepProgress::new(|p: f64, _: &str| seen.push(p), 9);

        progress.item(0, 10, "start");
        progress.item(5, 10, "half");
        progress.step_done("first step");

        assert_eq!(seen[0], 0.0);
        assert!((seen[1] - 100.0 * 0.5 / 9.0).abs() < 1e-9);
        assert!((seen[2] - 100.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_reports_never_decrease() {
        let mut seen = Vec::new();
        let mut progress = StepProgress::new(|p: f64, _: &str| seen.push(p), 9);

        progress.item(8, 10, "ahead");
        progress.item(2, 10, "out of order");
        progress.step_done("done");

        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_overreported_items_clamp_to_the_step_boundary() {
        let mut seen = Vec::new();
        let mut progress = StepProgress::new(|p: f64, _: &str| seen.push(p), 2);

        progress.item(25, 10, "overshoot");
        assert_eq!(seen.last().copied(), Some(50.0));
    }

    #[test]
    fn test_finish_is_exactly_one_hundred() {
        let mut seen = Vec::new();
        let mut progress = StepProgress::new(|p: f64, _: &str| seen.push(p), 9);

        progress.item(3, 7, "partway");
        progress.finish("done");

        assert_eq!(seen.last().copied(), Some(100.0));
    }

    #[test]
    fn test_finish_without_any_steps_still_reaches_one_hundred() {
        let mut seen = Vec::new();
        StepProgress::new(|p: f64, _: &str| seen.push(p), 9).finish("done");
        assert_eq!(seen, vec![100.0]);
    }

    #[test]
    fn test_empty_step_counts_as_complete() {
        let mut seen = Vec::new();
        let mut progress = StepProgress::new(|p: f64, _: &str| seen.push(p), 4);

        progress.item(0, 0, "nothing to do");
        assert_eq!(seen.last().copied(), Some(25.0));
    }

    #[test]
    fn test_messages_pass_through_untouched() {
        let mut seen = Vec::new();
        let mut progress =
            StepProgress::new(|p: f64, m: &str| seen.push((p, m.to_string())), 9);

        progress.finish("done");
        assert_eq!(seen, vec![(100.0, "done".to_string())]);
    }
}
