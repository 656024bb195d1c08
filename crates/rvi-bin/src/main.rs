//! rvi entrypoint.
use anyhow::{Result, anyhow};
use clap::Parser;
use core_actions::io_ops::{open_file, write_recovery};
use core_actions::{KeyTranslator, dispatch};
use core_config::{Config, load_from};
use core_events::{EVENT_CHANNEL_CAP, Event, InputEvent, KeyEvent, StatusTimer};
use core_model::EditorModel;
use core_render::{CrosstermDisplay, Display, RenderEngine};
use core_state::{EditSettings, EditorState};
use core_terminal::{CrosstermBackend, TerminalBackend, text_area};
use core_text::Buffer;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{error, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE: &str = "rvi.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "rvi", version, about = "A small modal text editor")]
struct Args {
    /// File to edit. A missing file is created on the first write.
    pub path: Option<PathBuf>,
    /// Configuration file (overrides discovery of `rvi.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join(LOG_FILE);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
        .ok()
        .map(|_| guard)
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

/// Editor state for the command line arguments with the configured settings applied.
fn load_editor_state(args: &Args, config: &Config) -> Result<EditorState> {
    let mut state = match args.path.as_deref() {
        Some(path) => match open_file(path) {
            Ok(opened) => {
                info!(target: "runtime.startup", path = %path.display(), lines = opened.buffer.line_count(), is_new = opened.is_new, "file_opened");
                opened.into_state()
            }
            Err(e) => {
                error!(target: "io", error = %e, "file_open_error");
                let mut state = EditorState::new(Buffer::from_str("untitled", "")?);
                state.flash(e.to_string());
                state
            }
        },
        None => EditorState::new(Buffer::from_str("untitled", "")?),
    };
    state.settings = EditSettings {
        expandtab: config.file.editor.expandtab,
        tabstop: config.file.editor.tabstop,
    };
    state.show_line_numbers = config.file.view.line_numbers;
    Ok(state)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopControl {
    Continue,
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownReason {
    Quit,
    InputClosed,
    ChannelClosed,
}

impl ShutdownReason {
    fn as_str(&self) -> &'static str {
        match self {
            ShutdownReason::Quit => "quit",
            ShutdownReason::InputClosed => "input_closed",
            ShutdownReason::ChannelClosed => "channel_closed",
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// The synchronous core of the main loop: one event in, state updated, frame painted.
struct EditorRuntime<D: Display> {
    model: EditorModel,
    translator: KeyTranslator,
    engine: RenderEngine,
    display: D,
    timer: StatusTimer,
    flash: Duration,
    recovery_path: PathBuf,
}

impl<D: Display> EditorRuntime<D> {
    fn new(
        model: EditorModel,
        display: D,
        timer: StatusTimer,
        flash: Duration,
        recovery_path: PathBuf,
    ) -> Self {
        Self {
            model,
            translator: KeyTranslator::new(),
            engine: RenderEngine::new(),
            display,
            timer,
            flash,
            recovery_path,
        }
    }

    /// Arm the status timer for a freshly flashed message, then paint the frame.
    fn render(&mut self) -> Result<()> {
        if let Some(generation) = self.model.state_mut().take_flash_request() {
            self.timer.schedule(generation, self.flash);
        }
        self.engine.render(&mut self.model, &mut self.display)
    }

    fn handle_key(&mut self, key: &KeyEvent) -> LoopControl {
        let mode = self.model.state().mode;
        let Some(action) = self.translator.translate(mode, key) else {
            return LoopControl::Continue;
        };
        if dispatch(action, &mut self.model).quit {
            LoopControl::Break
        } else {
            LoopControl::Continue
        }
    }

    fn handle_resize(&mut self, cols: u16, rows: u16) {
        let (width, height) = text_area(cols, rows);
        trace!(target: "runtime", width, height, "resize");
        self.model.view_mut().viewport.resize(width, height);
        self.engine.invalidate();
    }

    fn handle_event(&mut self, event: Event) -> Result<LoopControl> {
        let control = match event {
            Event::Input(InputEvent::Key(key)) => self.handle_key(&key),
            Event::Input(InputEvent::Resize(cols, rows)) => {
                self.handle_resize(cols, rows);
                LoopControl::Continue
            }
            Event::StatusExpired(generation) => {
                self.model.state_mut().expire_status(generation);
                LoopControl::Continue
            }
            Event::Shutdown => return Ok(LoopControl::Break),
        };
        if control == LoopControl::Break {
            return Ok(control);
        }
        self.render()?;
        Ok(control)
    }

    /// Best-effort save of the buffer to the recovery path.
    fn recover(&self) -> bool {
        match write_recovery(self.model.state(), &self.recovery_path) {
            Ok(()) => {
                warn!(target: "runtime", path = %self.recovery_path.display(), "buffer_recovered");
                true
            }
            Err(e) => {
                error!(target: "runtime", error = %e, "recovery_write_failed");
                false
            }
        }
    }

    /// Drain events until quit. An error or panic while handling an event saves the buffer
    /// to the recovery path and ends the loop with an error.
    async fn run(&mut self, rx: &mut mpsc::Receiver<Event>) -> Result<ShutdownReason> {
        self.render()?;
        while let Some(event) = rx.recv().await {
            let input_closed = event == Event::Shutdown;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.handle_event(event)));
            let failure = match outcome {
                Ok(Ok(LoopControl::Continue)) => continue,
                Ok(Ok(LoopControl::Break)) if input_closed => {
                    return Ok(ShutdownReason::InputClosed);
                }
                Ok(Ok(LoopControl::Break)) => return Ok(ShutdownReason::Quit),
                Ok(Err(e)) => e,
                Err(payload) => anyhow!("panic in main loop: {}", panic_message(payload.as_ref())),
            };
            error!(target: "runtime", error = %failure, "fatal");
            return if self.recover() {
                Err(failure.context(format!(
                    "buffer saved to {}",
                    self.recovery_path.display()
                )))
            } else {
                Err(failure.context("buffer could not be saved"))
            };
        }
        Ok(ShutdownReason::ChannelClosed)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");

    let config = load_from(args.config.clone())?;
    let state = load_editor_state(&args, &config)?;

    let mut backend = CrosstermBackend::new();
    backend.set_title("rvi")?;
    let guard = backend.enter_guard()?;

    let (cols, rows) = core_terminal::size();
    let (width, height) = text_area(cols, rows);
    let model = EditorModel::new(state, width, height);

    let (tx, mut rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);
    let (input_task, input_shutdown) = core_input::spawn_async_input(tx.clone());
    let timer = StatusTimer::new(Handle::current(), tx);

    let mut runtime = EditorRuntime::new(
        model,
        CrosstermDisplay::new(std::io::stdout()),
        timer,
        config.flash_duration(),
        config.file.recovery.path.clone(),
    );
    let outcome = runtime.run(&mut rx).await;

    input_shutdown.signal();
    if tokio::time::timeout(Duration::from_millis(200), input_task)
        .await
        .is_err()
    {
        warn!(target: "runtime.shutdown", "input_task_timeout");
    }
    guard.release()?;

    finish(outcome, log_guard)
}

/// Log how the run ended and flush the log writer. A failed run comes back as `Err` so `main`
/// exits non-zero once everything has been dropped.
fn finish(outcome: Result<ShutdownReason>, log_guard: Option<WorkerGuard>) -> Result<()> {
    let result = match outcome {
        Ok(reason) => {
            info!(target: "runtime.shutdown", reason = reason.as_str(), "shutdown");
            Ok(())
        }
        Err(e) => {
            error!(target: "runtime.shutdown", error = %format!("{e:#}"), "fatal_exit");
            Err(e)
        }
    };
    drop(log_guard);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::KeyCode;
    use core_render::MemoryDisplay;

    fn runtime(
        text: &str,
        recovery_path: PathBuf,
    ) -> (EditorRuntime<MemoryDisplay>, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(16);
        let state = EditorState::new(Buffer::from_str("t", text).unwrap());
        let rt = EditorRuntime::new(
            EditorModel::new(state, 20, 4),
            MemoryDisplay::new(5),
            StatusTimer::new(Handle::current(), tx),
            Duration::from_millis(5),
            recovery_path,
        );
        (rt, rx)
    }

    fn key(c: char) -> Event {
        Event::Input(InputEvent::Key(KeyEvent::plain(KeyCode::Char(c))))
    }

    fn enter() -> Event {
        Event::Input(InputEvent::Key(KeyEvent::plain(KeyCode::Enter)))
    }

    #[tokio::test]
    async fn keys_edit_and_repaint() {
        let (mut rt, _rx) = runtime("abc", PathBuf::from("unused"));
        for ev in [key('x'), key('x')] {
            assert_eq!(rt.handle_event(ev).unwrap(), LoopControl::Continue);
        }
        assert_eq!(rt.display.row(0), "c");
        assert_eq!(rt.engine.frames(), 2);
    }

    #[tokio::test]
    async fn quit_command_breaks_loop() {
        let (mut rt, _rx) = runtime("abc", PathBuf::from("unused"));
        rt.handle_event(key(':')).unwrap();
        rt.handle_event(key('q')).unwrap();
        assert_eq!(rt.handle_event(enter()).unwrap(), LoopControl::Break);
    }

    #[tokio::test]
    async fn flash_expires_through_timer() {
        let (mut rt, mut rx) = runtime("abc", PathBuf::from("unused"));
        for ev in [key(':'), key('z'), enter()] {
            rt.handle_event(ev).unwrap();
        }
        assert!(rt.model.state().status_message().is_some());
        assert!(rt.display.row(4).starts_with("Not an editor"));
        let expired = tokio::time::timeout(Duration::from_millis(500), rx.recv())
            .await
            .expect("expiry should be delivered")
            .expect("channel open");
        assert!(matches!(expired, Event::StatusExpired(_)));
        rt.handle_event(expired).unwrap();
        assert_eq!(rt.model.state().status_message(), None);
        assert!(rt.display.row(4).starts_with("-- COMMAND --"));
    }

    #[tokio::test]
    async fn resize_changes_geometry() {
        let (mut rt, _rx) = runtime("abcdefgh", PathBuf::from("unused"));
        rt.handle_event(Event::Input(InputEvent::Resize(4, 3)))
            .unwrap();
        assert_eq!(rt.model.view().viewport.width(), 4);
        assert_eq!(rt.model.view().viewport.height(), 2);
        assert_eq!(rt.display.row(0), "abcd");
        assert_eq!(rt.display.row(1), "efgh");
    }

    #[tokio::test]
    async fn shutdown_event_ends_run() {
        let (mut rt, _timer_rx) = runtime("abc", PathBuf::from("unused"));
        let (tx, mut rx) = mpsc::channel(4);
        tx.send(key('l')).await.unwrap();
        tx.send(Event::Shutdown).await.unwrap();
        let reason = rt.run(&mut rx).await.unwrap();
        assert_eq!(reason, ShutdownReason::InputClosed);
        assert_eq!(rt.model.cursor().col, 1);
    }

    #[tokio::test]
    async fn recover_writes_current_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("before_crash_text");
        let (mut rt, _rx) = runtime("abc\ndef", path.clone());
        rt.handle_event(key('x')).unwrap();
        assert!(rt.recover());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "bc\ndef");
    }

    #[test]
    fn failed_run_flushes_log_and_returns_error() {
        use std::io::Write;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE);
        let file = std::fs::File::create(&path).unwrap();
        let (mut writer, log_guard) = tracing_appender::non_blocking(file);
        writer.write_all(b"buffer_recovered\n").unwrap();
        let result = finish(Err(anyhow!("terminal lost")), Some(log_guard));
        assert_eq!(result.unwrap_err().to_string(), "terminal lost");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "buffer_recovered\n");
    }

    #[test]
    fn clean_run_finishes_ok() {
        assert!(finish(Ok(ShutdownReason::Quit), None).is_ok());
    }

    #[test]
    fn panic_payloads_are_readable() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
    }
}
