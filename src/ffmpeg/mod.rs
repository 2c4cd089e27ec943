pub mod filter;
pub mod probe;
pub mod profile;
pub mod runner;
pub mod util;

pub use probe::{StreamKind, StreamProber, SystemStreamProber};
pub use runner::{FfmpegRunOptions, FfmpegRunner, SystemFfmpegRunner};

/// The two external tools a build talks to.
#[derive(Clone, Copy)]
pub struct Engine<'a> {
    pub runner: &'a dyn FfmpegRunner,
    pub prober: &'a dyn StreamProber,
    pub verbose: bool,
}

impl<'a> Engine<'a> {
    pub fn new(runner: &'a dyn FfmpegRunner, prober: &'a dyn StreamProber, verbose: bool) -> Self {
        Self {
            runner,
            prober,
            verbose,
        }
    }

    pub fn run(&self, args: &[String], message: impl Into<String>) -> anyhow::Result<()> {
        self.runner
            .run(args, FfmpegRunOptions::new(message, self.verbose))
    }
}
