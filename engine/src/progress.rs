//! Progress reporting for plan execution.

/// Receives the total operation count, one tick per operation, and a
/// completion signal. Rendering is up to the implementation.
pub trait Progress {
    /// Announce a new phase with its total operation count.
    fn init(&mut self, label: &str, total: u64);

    /// One operation finished, regardless of its outcome.
    fn tick(&mut self);

    /// All operations finished.
    fn finish(&mut self);
}

/// Progress sink that discards all updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl Progress for NoopProgress {
    fn init(&mut self, _label: &str, _total: u64) {}

    fn tick(&mut self) {}

    fn finish(&mut self) {}
}
