//! Progress bar rendering for pipeline runs using indicatif.
//!
//! The orchestrator emits [`ProgressEvent`]s on a channel; [`drive`] consumes
//! them and keeps one bar per phase, replacing it when the phase changes.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::domain::models::{Phase, ProgressEvent};

const PROGRESS_TEMPLATE: &str = "[{elapsed_precise}] {prefix:>20} {bar:40.cyan/blue} {pos}/{len} {msg}";
const PROGRESS_CHARS: &str = "█▓▒░ ";

/// Create a progress bar styled like the rest of the CLI.
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(PROGRESS_CHARS);
    pb.set_style(style);
    pb
}

/// Current bar for a pipeline run.
pub struct PhaseProgress {
    current: Option<(Phase, ProgressBar)>,
    hidden: bool,
}

impl PhaseProgress {
    /// Bars drawn to stderr, or never drawn when `hidden`.
    pub const fn new(hidden: bool) -> Self {
        Self {
            current: None,
            hidden,
        }
    }

    pub fn handle(&mut self, event: &ProgressEvent) {
        let same_phase = self
            .current
            .as_ref()
            .is_some_and(|(phase, _)| *phase == event.phase);
        if !same_phase {
            self.finish();
            let bar = create_progress_bar(event.total as u64);
            if self.hidden {
                bar.set_draw_target(ProgressDrawTarget::hidden());
            } else {
                bar.enable_steady_tick(Duration::from_millis(100));
            }
            bar.set_prefix(event.phase.as_str());
            self.current = Some((event.phase, bar));
        }

        if let Some((_, bar)) = &self.current {
            bar.set_length(event.total as u64);
            bar.set_position(event.current as u64);
            if let Some(message) = &event.message {
                bar.set_message(message.clone());
            }
        }
    }

    /// Phase and position of the bar being shown.
    pub fn position(&self) -> Option<(Phase, u64)> {
        self.current
            .as_ref()
            .map(|(phase, bar)| (*phase, bar.position()))
    }

    pub fn finish(&mut self) {
        if let Some((_, bar)) = self.current.take() {
            bar.finish_and_clear();
        }
    }
}

/// Render events until every sender is dropped.
pub async fn drive(mut events: UnboundedReceiver<ProgressEvent>, hidden: bool) {
    let mut progress = PhaseProgress::new(hidden);
    while let Some(event) = events.recv().await {
        progress.handle(&event);
    }
    progress.finish();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ProgressReporter;

    fn event(phase: Phase, current: usize, total: usize) -> ProgressEvent {
        ProgressEvent {
            phase,
            current,
            total,
            message: None,
        }
    }

    #[test]
    fn test_bar_follows_phase() {
        let mut progress = PhaseProgress::new(true);
        progress.handle(&event(Phase::AnalyzeBlocks, 0, 3));
        progress.handle(&event(Phase::AnalyzeBlocks, 2, 3));
        assert_eq!(progress.position(), Some((Phase::AnalyzeBlocks, 2)));

        progress.handle(&event(Phase::AnalyzeComponents, 1, 4));
        assert_eq!(progress.position(), Some((Phase::AnalyzeComponents, 1)));

        progress.finish();
        assert!(progress.position().is_none());
    }

    #[tokio::test]
    async fn test_drive_ends_when_reporter_dropped() {
        let (reporter, rx) = ProgressReporter::channel();
        let handle = tokio::spawn(drive(rx, true));
        reporter.start(Phase::Discovery, 1, "discovering");
        reporter.emit(Phase::Discovery, 1, 1, None);
        drop(reporter);
        handle.await.unwrap();
    }
}
