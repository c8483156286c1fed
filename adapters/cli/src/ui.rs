//! Terminal implementation of the simulation's UI output sink.

use std::time::Duration;

use bastion_defence_core::UiSink;

/// Sink that prints status changes as log lines.
///
/// Countdown updates arrive every tick; the sink only records the latest
/// value and folds it into the next status line so the log stays readable.
#[derive(Debug, Default)]
pub(crate) struct CliSink {
    last_time: Duration,
    round: u32,
    pub(crate) last_status: String,
    pub(crate) game_over: bool,
    pub(crate) start_enabled: bool,
}

impl UiSink for CliSink {
    fn set_time(&mut self, remaining: Duration) {
        self.last_time = remaining;
    }

    fn set_round(&mut self, wave: u32) {
        self.round = wave;
    }

    fn set_status(&mut self, message: &str, game_over: bool) {
        if message != self.last_status {
            println!(
                "[wave {} | {:>2}s] {message}",
                self.round,
                self.last_time.as_secs(),
            );
        }
        self.last_status = message.to_owned();
        self.game_over = game_over;
    }

    fn set_start_enabled(&mut self, enabled: bool) {
        self.start_enabled = enabled;
    }
}
