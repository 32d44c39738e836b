// SPDX-License-Identifier: MIT
//
// Animator — drives one buffer toward one target text.
//
// # Lifecycle
//
//   new ──start──▶ Loading ──load ok──▶ Running ──no diff left──▶ Converged
//                     │                    │
//                     └──load failed──▶ Failed      stop ──▶ Stopped
//
// `start` returns at once; the target file is found and read on a
// background thread and the result comes back over a channel. Nothing is
// diffed until that result is in: the heartbeat timer is only armed by a
// successful load. A restart forgets the previous target and any heartbeat
// still armed, so a reload never types toward stale text.
//
// # The heartbeat
//
// Each fired heartbeat reads the buffer, diffs it against the target, and
// applies at most one edit (see `diff::next_step`). After an edit the next
// heartbeat is armed one interval later. When the diff is empty the
// animator stops itself and saves the buffer; no further heartbeat is armed,
// so there is no trailing no-op tick.
//
// `stop` only clears the `running` flag. A heartbeat already armed still
// fires, sees the flag, and does nothing, not even re-arm.
//
// # Ownership
//
// The animator never holds the buffer. Each `poll` borrows it mutably for
// the duration of one step, so nothing else in the process can edit it
// mid-tick. Edits are applied synchronously before the next deadline is
// armed, so every diff sees the effect of the previous edit.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use n_text::Range;

use crate::config::AnimatorConfig;
use crate::diff::{self, Step};
use crate::error::LoadError;
use crate::host::{Edit, ErrorReporter, FileReader, FileResolver, TextBuffer};
use crate::timer::Timer;

type LoadResult = Result<String, LoadError>;

// ─── Public state ───────────────────────────────────────────────────────────

/// Where the animation stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Never started.
    Idle,
    /// Started; the target is still being loaded.
    Loading,
    /// Target loaded, heartbeats in progress.
    Running,
    /// The buffer matched the target and was saved.
    Converged,
    /// Stopped before converging.
    Stopped,
    /// The target could not be loaded. The error was reported.
    Failed,
}

/// What a single heartbeat did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// The animator was not running. Nothing happened.
    Skipped,
    /// One edit was applied.
    Edited(Edit),
    /// The buffer refused the edit. The next heartbeat diffs again.
    Rejected(Edit),
    /// Nothing left to do. `saved` is false if the save failed.
    Converged { saved: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Converged,
    Failed,
}

// ─── Animator ───────────────────────────────────────────────────────────────

/// Animates a buffer into the contents of the first file matching a pattern.
pub struct Animator {
    content_path: String,
    config: AnimatorConfig,
    resolver: Arc<dyn FileResolver>,
    reader: Arc<dyn FileReader>,
    reporter: Box<dyn ErrorReporter>,

    /// `None` until the first load succeeds.
    target: Option<String>,
    running: bool,
    started: bool,
    end: Option<End>,
    heartbeat: Timer,
    /// The in-flight load. Replacing it on restart drops the stale result.
    load: Option<Receiver<LoadResult>>,
}

impl Animator {
    /// Create an animator for the file matching `content_path`.
    ///
    /// The resolver and reader run on a background thread during
    /// [`start`](Self::start); the reporter is called on the driving thread.
    pub fn new(
        content_path: impl Into<String>,
        resolver: Arc<dyn FileResolver>,
        reader: Arc<dyn FileReader>,
        reporter: Box<dyn ErrorReporter>,
    ) -> Self {
        Self {
            content_path: content_path.into(),
            config: AnimatorConfig::default(),
            resolver,
            reader,
            reporter,
            target: None,
            running: false,
            started: false,
            end: None,
            heartbeat: Timer::new(),
            load: None,
        }
    }

    /// Replace the default timing and budget.
    #[must_use]
    pub fn with_config(mut self, config: AnimatorConfig) -> Self {
        self.config = config;
        self
    }

    // -- Accessors ----------------------------------------------------------

    /// The loaded target text, once a load has succeeded.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// When the next heartbeat is due, if one is armed.
    #[must_use]
    pub const fn next_deadline(&self) -> Option<Instant> {
        self.heartbeat.deadline()
    }

    #[must_use]
    pub fn status(&self) -> Status {
        match self.end {
            Some(End::Failed) => Status::Failed,
            _ if self.running && self.load.is_some() => Status::Loading,
            _ if self.running => Status::Running,
            Some(End::Converged) => Status::Converged,
            None if self.started => Status::Stopped,
            None => Status::Idle,
        }
    }

    // -- Control ------------------------------------------------------------

    /// Start (or restart) the animation.
    ///
    /// Kicks off the target load in the background and returns immediately.
    /// A load still in flight from an earlier `start` is abandoned, and no
    /// heartbeat runs until the new load lands.
    pub fn start(&mut self) {
        self.running = true;
        self.started = true;
        self.end = None;
        self.target = None;
        self.heartbeat = Timer::new();

        let (tx, rx) = mpsc::channel();
        let resolver = Arc::clone(&self.resolver);
        let reader = Arc::clone(&self.reader);
        let pattern = self.content_path.clone();

        let spawned = thread::Builder::new()
            .name("content-loader".into())
            .spawn(move || {
                // The receiver is gone if the animator restarted or dropped.
                let _ = tx.send(load(resolver.as_ref(), reader.as_ref(), &pattern));
            });

        tracing::info!(pattern = %self.content_path, "animation started");
        match spawned {
            Ok(_) => self.load = Some(rx),
            Err(e) => {
                self.load = None;
                self.fail(&LoadError::Spawn(e));
            }
        }
    }

    /// Stop the animation. Idempotent.
    ///
    /// A heartbeat that is already armed still fires, but does nothing.
    pub fn stop(&mut self) {
        if self.running {
            tracing::info!(pattern = %self.content_path, "animation stopped");
        }
        self.running = false;
    }

    // -- Driving ------------------------------------------------------------

    /// Advance the animation to `now`.
    ///
    /// Picks up a finished load, then runs the heartbeat if it is due. At
    /// most one heartbeat runs per call. Returns what that heartbeat did, or
    /// `None` if none was due.
    pub fn poll<B>(&mut self, now: Instant, buffer: &mut B) -> Option<Tick>
    where
        B: TextBuffer + ?Sized,
    {
        let finished = match &self.load {
            Some(rx) => match rx.try_recv() {
                Ok(result) => Some(result),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => Some(Err(LoadError::LoaderLost)),
            },
            None => None,
        };
        if let Some(result) = finished {
            self.finish_load(result, now);
        }

        if self.heartbeat.fire(now) {
            Some(self.heartbeat(now, buffer))
        } else {
            None
        }
    }

    /// Block for up to `timeout`, returning early if a pending load
    /// completes. Without a pending load this just sleeps.
    pub fn wait(&mut self, timeout: Duration) {
        let finished = match &self.load {
            Some(rx) => match rx.recv_timeout(timeout) {
                Ok(result) => Some(result),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => Some(Err(LoadError::LoaderLost)),
            },
            None => {
                thread::sleep(timeout);
                None
            }
        };
        if let Some(result) = finished {
            self.finish_load(result, Instant::now());
        }
    }

    fn finish_load(&mut self, result: LoadResult, now: Instant) {
        self.load = None;
        match result {
            Ok(text) => {
                tracing::info!(
                    pattern = %self.content_path,
                    chars = text.chars().count(),
                    "target loaded"
                );
                self.target = Some(text);
                self.heartbeat.arm(now + self.config.heartbeat_interval);
            }
            Err(err) => self.fail(&err),
        }
    }

    fn fail(&mut self, err: &LoadError) {
        self.end = Some(End::Failed);
        self.reporter.report(&err.user_message(&self.content_path));
    }

    /// One step of the animation.
    fn heartbeat<B>(&mut self, now: Instant, buffer: &mut B) -> Tick
    where
        B: TextBuffer + ?Sized,
    {
        if !self.running {
            return Tick::Skipped;
        }
        let Some(target) = self.target.as_deref() else {
            return Tick::Skipped;
        };

        let current = buffer.text();
        let segments = diff::diff_chars(&current, target);

        let Some(step) = diff::next_step(&segments, self.config.chars_per_change) else {
            self.running = false;
            self.end = Some(End::Converged);
            let saved = match buffer.save() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(error = %e, "could not save animated buffer");
                    false
                }
            };
            tracing::info!(pattern = %self.content_path, saved, "animation converged");
            return Tick::Converged { saved };
        };

        let edit = match step {
            Step::Insert { offset, text } => Edit::Insert {
                at: buffer.position_at(offset),
                text,
            },
            Step::Delete { start, end } => Edit::Delete(Range::new(
                buffer.position_at(start),
                buffer.position_at(end),
            )),
        };

        let tick = match buffer.apply(&edit) {
            Ok(()) => {
                tracing::debug!(%edit, "heartbeat edit");
                Tick::Edited(edit)
            }
            Err(e) => {
                tracing::debug!(%edit, error = %e, "heartbeat edit rejected");
                Tick::Rejected(edit)
            }
        };
        self.heartbeat.arm(now + self.config.heartbeat_interval);
        tick
    }
}

impl std::fmt::Debug for Animator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animator")
            .field("content_path", &self.content_path)
            .field("config", &self.config)
            .field("status", &self.status())
            .field("next_deadline", &self.heartbeat.deadline())
            .finish_non_exhaustive()
    }
}

/// Resolve `pattern` and read its first match.
fn load(resolver: &dyn FileResolver, reader: &dyn FileReader, pattern: &str) -> LoadResult {
    let path = resolver
        .find_files(pattern)?
        .into_iter()
        .next()
        .ok_or(LoadError::NoMatch)?;
    reader
        .read_to_string(&path)
        .map_err(|source| LoadError::Read { path, source })
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;
    use std::sync::Mutex;

    use n_text::{Buffer, Position};
    use pretty_assertions::assert_eq;

    // ── Fakes ─────────────────────────────────────────────────────────────

    /// Files keyed by name; the pattern is treated as a literal name.
    #[derive(Default)]
    struct MemoryFs {
        files: HashMap<PathBuf, Result<String, io::ErrorKind>>,
        lookups: Mutex<usize>,
    }

    impl MemoryFs {
        fn with(name: &str, text: &str) -> Arc<Self> {
            let mut fs = Self::default();
            fs.files.insert(PathBuf::from(name), Ok(text.to_string()));
            Arc::new(fs)
        }

        fn unreadable(name: &str) -> Arc<Self> {
            let mut fs = Self::default();
            fs.files
                .insert(PathBuf::from(name), Err(io::ErrorKind::PermissionDenied));
            Arc::new(fs)
        }
    }

    impl FileResolver for MemoryFs {
        fn find_files(&self, pattern: &str) -> Result<Vec<PathBuf>, LoadError> {
            *self.lookups.lock().unwrap() += 1;
            let path = PathBuf::from(pattern);
            Ok(if self.files.contains_key(&path) {
                vec![path]
            } else {
                Vec::new()
            })
        }
    }

    impl FileReader for MemoryFs {
        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            match self.files.get(path) {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(kind)) => Err(io::Error::new(*kind, "denied")),
                None => Err(io::Error::new(io::ErrorKind::NotFound, "missing")),
            }
        }
    }

    /// A single file whose lookups block until the test lets them through.
    struct GatedFs {
        text: Mutex<String>,
        gate: Mutex<mpsc::Receiver<()>>,
    }

    impl GatedFs {
        fn new(text: &str) -> (Arc<Self>, mpsc::Sender<()>) {
            let (open, gate) = mpsc::channel();
            let fs = Self {
                text: Mutex::new(text.to_string()),
                gate: Mutex::new(gate),
            };
            (Arc::new(fs), open)
        }
    }

    impl FileResolver for GatedFs {
        fn find_files(&self, pattern: &str) -> Result<Vec<PathBuf>, LoadError> {
            let _ = self.gate.lock().unwrap().recv();
            Ok(vec![PathBuf::from(pattern)])
        }
    }

    impl FileReader for GatedFs {
        fn read_to_string(&self, _path: &Path) -> io::Result<String> {
            Ok(self.text.lock().unwrap().clone())
        }
    }

    #[derive(Clone, Default)]
    struct Messages(Rc<RefCell<Vec<String>>>);

    impl ErrorReporter for Messages {
        fn report(&self, message: &str) {
            self.0.borrow_mut().push(message.to_string());
        }
    }

    /// An in-memory buffer that counts saves and can refuse edits.
    #[derive(Debug)]
    struct TestBuffer {
        inner: Buffer,
        saves: usize,
        refuse: bool,
    }

    impl TestBuffer {
        fn new(text: &str) -> Self {
            Self {
                inner: Buffer::from_text(text),
                saves: 0,
                refuse: false,
            }
        }
    }

    impl TextBuffer for TestBuffer {
        type Error = String;

        fn text(&self) -> String {
            self.inner.contents()
        }

        fn position_at(&self, offset: usize) -> Position {
            self.inner.position_at(offset)
        }

        fn apply(&mut self, edit: &Edit) -> Result<(), String> {
            if self.refuse {
                return Err("read-only".into());
            }
            TextBuffer::apply(&mut self.inner, edit).map_err(|e| e.to_string())
        }

        fn save(&mut self) -> io::Result<()> {
            self.saves += 1;
            Ok(())
        }
    }

    // ── Harness ───────────────────────────────────────────────────────────

    const INTERVAL: Duration = Duration::from_millis(33);

    fn animator(fs: Arc<MemoryFs>, pattern: &str) -> (Animator, Messages) {
        let messages = Messages::default();
        let resolver: Arc<dyn FileResolver> = fs.clone();
        let reader: Arc<dyn FileReader> = fs;
        let animator = Animator::new(pattern, resolver, reader, Box::new(messages.clone()));
        (animator, messages)
    }

    /// Wait for the background load to land, returning the virtual clock.
    fn await_load(animator: &mut Animator) -> Instant {
        let deadline = Instant::now() + Duration::from_secs(5);
        while animator.status() == Status::Loading {
            assert!(Instant::now() < deadline, "load never finished");
            animator.wait(Duration::from_millis(10));
        }
        Instant::now()
    }

    /// Start, load, and return the animator with its clock at load time.
    fn started(target: &str) -> (Animator, Messages, Instant) {
        let (mut animator, messages) = animator(MemoryFs::with("target.txt", target), "target.txt");
        animator.start();
        let now = await_load(&mut animator);
        assert_eq!(animator.status(), Status::Running);
        (animator, messages, now)
    }

    /// Fire heartbeats until none is armed, collecting the ticks.
    fn run(animator: &mut Animator, buffer: &mut TestBuffer, mut now: Instant) -> Vec<Tick> {
        let mut ticks = Vec::new();
        while let Some(at) = animator.next_deadline() {
            now = now.max(at);
            if let Some(tick) = animator.poll(now, buffer) {
                ticks.push(tick);
            }
            assert!(ticks.len() < 10_000, "no convergence");
        }
        ticks
    }

    fn edits(ticks: &[Tick]) -> usize {
        ticks
            .iter()
            .filter(|t| matches!(t, Tick::Edited(_)))
            .count()
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn new_animator_is_idle() {
        let (animator, _) = animator(MemoryFs::with("t", "x"), "t");
        assert_eq!(animator.status(), Status::Idle);
        assert!(!animator.is_running());
        assert_eq!(animator.target(), None);
        assert_eq!(animator.next_deadline(), None);
    }

    #[test]
    fn start_returns_before_load() {
        let (mut animator, _) = animator(MemoryFs::with("t", "x"), "t");
        animator.start();
        assert!(animator.is_running());
        assert_eq!(animator.next_deadline(), None);
    }

    #[test]
    fn first_heartbeat_armed_one_interval_after_load() {
        let (mut animator, _) = animator(MemoryFs::with("t", "x"), "t");
        animator.start();
        let t0 = Instant::now();
        await_load(&mut animator);
        let deadline = animator.next_deadline().expect("heartbeat armed");
        assert!(deadline >= t0 + INTERVAL);
        assert_eq!(animator.target(), Some("x"));
    }

    #[test]
    fn no_heartbeat_before_deadline() {
        let (mut animator, _, now) = started("hello");
        let mut buffer = TestBuffer::new("");
        assert_eq!(animator.poll(now, &mut buffer), None);
        assert_eq!(buffer.text(), "");
    }

    // ── Single ticks ──────────────────────────────────────────────────────

    #[test]
    fn inserts_missing_char_in_one_tick() {
        let (mut animator, _, now) = started("hello");
        let mut buffer = TestBuffer::new("helo");
        let tick = animator.poll(now + INTERVAL, &mut buffer);
        assert_eq!(
            tick,
            Some(Tick::Edited(Edit::Insert {
                at: Position::new(0, 3),
                text: "l".into()
            }))
        );
        assert_eq!(buffer.text(), "hello");
    }

    #[test]
    fn deletes_extra_char_in_one_tick() {
        let (mut animator, _, now) = started("hello");
        let mut buffer = TestBuffer::new("hellox");
        let tick = animator.poll(now + INTERVAL, &mut buffer);
        assert_eq!(
            tick,
            Some(Tick::Edited(Edit::Delete(Range::new(
                Position::new(0, 5),
                Position::new(0, 6)
            ))))
        );
        assert_eq!(buffer.text(), "hello");
    }

    #[test]
    fn ten_chars_take_two_edit_ticks() {
        let (mut animator, _, now) = started("abcdefghij");
        let mut buffer = TestBuffer::new("");
        let ticks = run(&mut animator, &mut buffer, now);
        assert_eq!(edits(&ticks), 2);
        assert_eq!(ticks.last(), Some(&Tick::Converged { saved: true }));
        assert_eq!(buffer.text(), "abcdefghij");
    }

    #[test]
    fn each_tick_inserts_at_most_budget() {
        let (mut animator, _, now) = started("fn main() {\n    println!(\"hi\");\n}\n");
        let mut buffer = TestBuffer::new("fn main() {}\n");
        for tick in run(&mut animator, &mut buffer, now) {
            if let Tick::Edited(Edit::Insert { text, .. }) = tick {
                assert!(text.chars().count() <= 5);
            }
        }
        assert_eq!(buffer.text(), "fn main() {\n    println!(\"hi\");\n}\n");
    }

    #[test]
    fn custom_budget_is_honoured() {
        let (animator, _) = animator(MemoryFs::with("t", "abcdefghij"), "t");
        let mut animator =
            animator.with_config(AnimatorConfig::default().with_chars_per_change(2));
        animator.start();
        let now = await_load(&mut animator);
        let mut buffer = TestBuffer::new("");
        let ticks = run(&mut animator, &mut buffer, now);
        assert_eq!(edits(&ticks), 5);
    }

    #[test]
    fn multiline_edits_use_buffer_positions() {
        let (mut animator, _, now) = started("one\ntwo\nthree\n");
        let mut buffer = TestBuffer::new("one\nthree\n");
        let tick = animator.poll(now + INTERVAL, &mut buffer);
        assert!(matches!(
            tick,
            Some(Tick::Edited(Edit::Insert { at, .. })) if at.line == 1
        ));
        run(&mut animator, &mut buffer, now + INTERVAL);
        assert_eq!(buffer.text(), "one\ntwo\nthree\n");
    }

    // ── Convergence ───────────────────────────────────────────────────────

    #[test]
    fn converged_buffer_is_saved_once_and_stops() {
        let (mut animator, _, now) = started("same");
        let mut buffer = TestBuffer::new("same");
        let tick = animator.poll(now + INTERVAL, &mut buffer);
        assert_eq!(tick, Some(Tick::Converged { saved: true }));
        assert_eq!(buffer.saves, 1);
        assert!(!animator.is_running());
        assert_eq!(animator.status(), Status::Converged);
        // No trailing heartbeat.
        assert_eq!(animator.next_deadline(), None);
        assert_eq!(animator.poll(now + INTERVAL * 10, &mut buffer), None);
        assert_eq!(buffer.saves, 1);
    }

    #[test]
    fn only_one_heartbeat_in_flight() {
        let (mut animator, _, now) = started("abcdefghijklmnop");
        let mut buffer = TestBuffer::new("");
        // Polling far past several intervals still runs a single heartbeat.
        let tick = animator.poll(now + INTERVAL * 10, &mut buffer);
        assert!(matches!(tick, Some(Tick::Edited(_))));
        assert_eq!(buffer.text(), "abcde");
        assert_eq!(animator.next_deadline(), Some(now + INTERVAL * 11));
    }

    #[test]
    fn rejected_edit_keeps_animating() {
        let (mut animator, _, now) = started("abc");
        let mut buffer = TestBuffer::new("");
        buffer.refuse = true;
        let tick = animator.poll(now + INTERVAL, &mut buffer);
        assert!(matches!(tick, Some(Tick::Rejected(_))));
        assert!(animator.is_running());

        buffer.refuse = false;
        run(&mut animator, &mut buffer, now + INTERVAL);
        assert_eq!(buffer.text(), "abc");
    }

    #[test]
    fn external_drift_is_absorbed() {
        let (mut animator, _, now) = started("hello world");
        let mut buffer = TestBuffer::new("");
        animator.poll(now + INTERVAL, &mut buffer);
        // Someone else edits the buffer mid-animation.
        TextBuffer::apply(
            &mut buffer,
            &Edit::Insert {
                at: Position::ZERO,
                text: "XX".into(),
            },
        )
        .unwrap();
        run(&mut animator, &mut buffer, now + INTERVAL);
        assert_eq!(buffer.text(), "hello world");
    }

    // ── Stop ──────────────────────────────────────────────────────────────

    #[test]
    fn stop_before_tick_makes_it_a_noop() {
        let (mut animator, _, now) = started("hello");
        let mut buffer = TestBuffer::new("");
        animator.stop();
        assert_eq!(animator.status(), Status::Stopped);

        let tick = animator.poll(now + INTERVAL, &mut buffer);
        assert_eq!(tick, Some(Tick::Skipped));
        assert_eq!(buffer.text(), "");
        assert_eq!(buffer.saves, 0);
        assert_eq!(animator.next_deadline(), None);
    }

    #[test]
    fn stop_is_idempotent() {
        let (mut animator, _, _) = started("hello");
        animator.stop();
        animator.stop();
        assert_eq!(animator.status(), Status::Stopped);
    }

    #[test]
    fn stop_mid_animation_leaves_partial_text() {
        let (mut animator, _, now) = started("abcdefghij");
        let mut buffer = TestBuffer::new("");
        animator.poll(now + INTERVAL, &mut buffer);
        animator.stop();
        let ticks = run(&mut animator, &mut buffer, now + INTERVAL);
        assert_eq!(ticks, vec![Tick::Skipped]);
        assert_eq!(buffer.text(), "abcde");
    }

    #[test]
    fn restart_after_convergence_reloads() {
        let fs = MemoryFs::with("t", "done");
        let (mut animator, _) = animator(Arc::clone(&fs), "t");
        animator.start();
        let now = await_load(&mut animator);
        let mut buffer = TestBuffer::new("");
        run(&mut animator, &mut buffer, now);
        assert_eq!(animator.status(), Status::Converged);

        animator.start();
        assert_eq!(animator.status(), Status::Loading);
        let now = await_load(&mut animator);
        assert_eq!(*fs.lookups.lock().unwrap(), 2);
        let ticks = run(&mut animator, &mut buffer, now);
        assert_eq!(ticks, vec![Tick::Converged { saved: true }]);
        assert_eq!(buffer.saves, 2);
    }

    #[test]
    fn restart_never_types_toward_previous_target() {
        let (fs, open) = GatedFs::new("OLD TARGET");
        let resolver: Arc<dyn FileResolver> = fs.clone();
        let reader: Arc<dyn FileReader> = fs.clone();
        let mut animator =
            Animator::new("t", resolver, reader, Box::new(Messages::default()));

        open.send(()).unwrap();
        animator.start();
        let now = await_load(&mut animator);
        assert!(animator.next_deadline().is_some());
        animator.stop();

        // Restart with the lookup held: the new load cannot finish yet.
        *fs.text.lock().unwrap() = "new".to_string();
        animator.start();
        assert_eq!(animator.target(), None);
        assert_eq!(animator.next_deadline(), None);

        let mut buffer = TestBuffer::new("");
        assert_eq!(animator.poll(now + INTERVAL, &mut buffer), None);
        assert_eq!(animator.status(), Status::Loading);
        assert_eq!(buffer.text(), "");

        open.send(()).unwrap();
        let now = await_load(&mut animator);
        run(&mut animator, &mut buffer, now);
        assert_eq!(buffer.text(), "new");
        assert_eq!(animator.status(), Status::Converged);
    }

    // ── Load failures ─────────────────────────────────────────────────────

    #[test]
    fn missing_file_is_reported_and_never_ticks() {
        let (mut animator, messages) = animator(MemoryFs::with("t", "x"), "nope/*.rs");
        animator.start();
        await_load(&mut animator);
        assert_eq!(animator.status(), Status::Failed);
        assert_eq!(animator.next_deadline(), None);
        assert_eq!(
            *messages.0.borrow(),
            vec!["Failed to read nope/*.rs: no file matches the pattern".to_string()]
        );
    }

    #[test]
    fn unreadable_file_is_reported_once() {
        let (mut animator, messages) = animator(MemoryFs::unreadable("t"), "t");
        animator.start();
        await_load(&mut animator);
        let mut buffer = TestBuffer::new("untouched");
        assert_eq!(animator.poll(Instant::now() + INTERVAL * 5, &mut buffer), None);
        assert_eq!(animator.status(), Status::Failed);
        assert_eq!(animator.target(), None);
        assert_eq!(buffer.text(), "untouched");
        assert_eq!(
            *messages.0.borrow(),
            vec!["Failed to read t: t: denied".to_string()]
        );
    }

    #[test]
    fn load_result_collected_by_poll() {
        let (mut animator, _) = animator(MemoryFs::with("t", "x"), "t");
        animator.start();
        let mut buffer = TestBuffer::new("");
        let deadline = Instant::now() + Duration::from_secs(5);
        while animator.status() == Status::Loading {
            assert!(Instant::now() < deadline, "load never finished");
            animator.poll(Instant::now(), &mut buffer);
            thread::yield_now();
        }
        assert_eq!(animator.status(), Status::Running);
    }
}
