use compchem_toolkit::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Renders release phases as a numbered spinner line on stderr.
#[derive(Clone)]
pub struct CliProgressHandler {
    state: Arc<Mutex<HandlerState>>,
}

struct HandlerState {
    pb: ProgressBar,
    phase: usize,
    total_phases: usize,
    current: Option<&'static str>,
}

impl CliProgressHandler {
    pub fn new(total_phases: usize) -> Self {
        Self::with_draw_target(total_phases, ProgressDrawTarget::stderr())
    }

    pub fn with_draw_target(total_phases: usize, target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::new(0).with_style(Self::spinner_style());
        pb.set_draw_target(target);
        pb.finish_and_clear();

        Self {
            state: Arc::new(Mutex::new(HandlerState {
                pb,
                phase: 0,
                total_phases,
                current: None,
            })),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let state = self.state.clone();

        Box::new(move |progress: Progress| {
            let Ok(mut state) = state.lock() else {
                warn!("Progress state mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => {
                    state.phase += 1;
                    state.current = Some(name);
                    let label = format!("[{}/{}] {}", state.phase, state.total_phases, name);
                    state.pb.reset();
                    state.pb.set_length(0);
                    state.pb.set_style(Self::spinner_style());
                    state
                        .pb
                        .enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    state.pb.set_message(label);
                }
                Progress::PhaseFinish => {
                    let name = state.current.take().unwrap_or("Done");
                    state.pb.disable_steady_tick();
                    state.pb.finish_with_message(format!("✓ {}", name));
                }
                Progress::TaskStart { total_steps } => {
                    state.pb.set_length(total_steps);
                    state.pb.set_position(0);
                }
                Progress::TaskIncrement => state.pb.inc(1),
                Progress::TaskFinish => {
                    let length = state.pb.length().unwrap_or(0);
                    state.pb.set_position(length);
                }
                Progress::Message(msg) => state.pb.println(format!("  {}", msg)),
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .expect("Failed to create spinner style template")
    }
}

/// Writes one plain line per phase, message and finished task to `writer`,
/// for runs where stderr is not a terminal and no bar can be drawn.
pub fn plain_callback<W>(total_phases: usize, writer: W) -> ProgressCallback<'static>
where
    W: Write + Send + 'static,
{
    let state = Mutex::new((writer, 0usize, None::<&'static str>, 0u64));

    Box::new(move |progress: Progress| {
        let Ok(mut guard) = state.lock() else {
            warn!("Progress state mutex was poisoned. Cannot update progress.");
            return;
        };
        let (writer, phase, current, steps) = &mut *guard;
        let line = match progress {
            Progress::PhaseStart { name } => {
                *phase += 1;
                *current = Some(name);
                format!("[{}/{}] {}", phase, total_phases, name)
            }
            Progress::PhaseFinish => format!("✓ {}", current.take().unwrap_or("Done")),
            Progress::TaskStart { total_steps } => {
                *steps = total_steps;
                return;
            }
            Progress::TaskIncrement => return,
            Progress::TaskFinish => format!("  {} item(s)", steps),
            Progress::Message(msg) => format!("  {}", msg),
        };
        if let Err(e) = writeln!(writer, "{}", line) {
            warn!("Failed to write progress line: {}", e);
        }
    })
}
