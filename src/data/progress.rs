//! Row-level progress reporting for long column transforms.

use log::{info, trace};

/// Observer notified as rows are processed. Purely observational.
pub trait Progress {
    /// A pass over `total` rows labelled `desc` is starting.
    fn begin(&mut self, desc: &str, total: usize);
    /// One more row is done.
    fn tick(&mut self);
    /// The pass is over.
    fn finish(&mut self);
}

/// Reports through the `log` facade: start and end at `info`, each row at
/// `trace`.
#[derive(Debug, Default)]
pub struct LogProgress {
    desc: String,
    total: usize,
    done: usize,
}

impl Progress for LogProgress {
    fn begin(&mut self, desc: &str, total: usize) {
        self.desc = desc.to_string();
        self.total = total;
        self.done = 0;
        info!("{}: {} rows", self.desc, total);
    }

    fn tick(&mut self) {
        self.done += 1;
        trace!("{}: {}/{}", self.desc, self.done, self.total);
    }

    fn finish(&mut self) {
        info!("{}: done ({}/{})", self.desc, self.done, self.total);
    }
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn begin(&mut self, _desc: &str, _total: usize) {}
    fn tick(&mut self) {}
    fn finish(&mut self) {}
}
