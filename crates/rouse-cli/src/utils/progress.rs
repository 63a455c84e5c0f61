use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use rouse::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const TICK: Duration = Duration::from_millis(100);
const PHASE_TEMPLATE: &str = "{spinner:.green} {prefix:.bold} {msg}";
const RESIDUE_TEMPLATE: &str =
    "{prefix:.bold} [{wide_bar:.cyan/blue}] {pos}/{len} residues {elapsed_precise} {msg:.dim}";

/// Terminal view of workflow progress.
///
/// Each phase shows a spinner labeled with the phase name. A phase that announces a step
/// count turns into a residue counter, and run announcements are shown next to it.
#[derive(Clone)]
pub struct ProgressDisplay {
    state: Arc<Mutex<DisplayState>>,
}

struct DisplayState {
    bar: ProgressBar,
    phase: Option<&'static str>,
}

impl DisplayState {
    fn apply(&mut self, event: Progress) {
        match event {
            Progress::PhaseStart { name } => {
                self.phase = Some(name);
                self.bar.reset();
                self.bar.set_style(style(PHASE_TEMPLATE));
                self.bar.set_prefix(name);
                self.bar.set_message("");
                self.bar.enable_steady_tick(TICK);
            }
            Progress::TaskStart { total_steps } => {
                self.bar.disable_steady_tick();
                self.bar.set_style(style(RESIDUE_TEMPLATE).progress_chars("=> "));
                self.bar.set_length(total_steps);
                self.bar.set_position(0);
            }
            Progress::TaskIncrement => self.bar.inc(1),
            Progress::TaskFinish => {
                if let Some(total) = self.bar.length() {
                    self.bar.set_position(total);
                }
            }
            Progress::PhaseFinish => {
                self.bar.disable_steady_tick();
                self.bar.finish_with_message("done");
                self.phase = None;
            }
            // Inside a phase a message names the current run; between phases it is a note.
            Progress::Message(text) => match self.phase {
                Some(_) => self.bar.set_message(text),
                None => self.bar.println(text),
            },
        }
    }
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_bar())
}

impl ProgressDisplay {
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
        bar.finish_and_clear();
        Self {
            state: Arc::new(Mutex::new(DisplayState { bar, phase: None })),
        }
    }

    pub fn callback(&self) -> ProgressCallback<'static> {
        let state = Arc::clone(&self.state);
        Box::new(move |event: Progress| match state.lock() {
            Ok(mut state) => state.apply(event),
            Err(_) => warn!("Progress display lock poisoned; event dropped."),
        })
    }
}

impl Default for ProgressDisplay {
    fn default() -> Self {
        Self::new()
    }
}
