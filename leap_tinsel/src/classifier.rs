//! The gesture classifier as an owned resource with an explicit lifecycle.
//!
//! A [`ClassifierSlot`] hands out at most one [`ClassifierHandle`] at a time.
//! `acquire` returns immediately and initialises the classifier on its own
//! worker thread; while that is in flight a second `acquire` is refused.  If
//! initialisation fails the slot goes back to vacant so a later `acquire`
//! can retry.  Dropping (or [`ClassifierHandle::release`]-ing) the handle
//! stops the worker and joins it before returning.
//!
//! The worker runs the classifier at a fixed period and posts each result.
//! The frame loop never waits on it: [`ClassifierHandle::poll`] drains
//! whatever has arrived and reports the most recent label.  A label stands
//! for two periods; when the worker falls further behind than that the
//! frame proceeds with `None`.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tinsel_mode::GestureLabel;

use crate::error::ClassifierError;

/// Default classifier period (~30 Hz).
pub const CLASSIFY_PERIOD: Duration = Duration::from_millis(33);

// ════════════════════════════════════════════════════════════════════════════
// GestureClassifier trait: unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Turns whatever the sensor currently sees into at most one label.
pub trait GestureClassifier: Send {
    /// Classify the current frame.  `Ok(None)` means no hand.
    fn classify(&mut self) -> Result<Option<GestureLabel>, ClassifierError>;

    fn name(&self) -> &str {
        "classifier"
    }
}

pub type BoxedClassifier = Box<dyn GestureClassifier>;

// ════════════════════════════════════════════════════════════════════════════
// ClassifierSlot
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    Vacant,
    Initializing,
    Held,
}

#[derive(Debug)]
struct SlotInner {
    state:      SlotState,
    /// Bumped on every successful `acquire`; stale handles and workers
    /// compare against it before touching `state`.
    generation: u64,
}

/// The single place a classifier may live.
#[derive(Clone, Debug)]
pub struct ClassifierSlot {
    inner: Arc<Mutex<SlotInner>>,
}

impl Default for ClassifierSlot {
    fn default() -> Self {
        ClassifierSlot {
            inner: Arc::new(Mutex::new(SlotInner { state: SlotState::Vacant, generation: 0 })),
        }
    }
}

impl ClassifierSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SlotInner> {
        // The guarded data is two plain fields; a panic elsewhere cannot
        // leave them half-written.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SlotState {
        self.lock().state
    }

    /// Start initialising a classifier on a worker thread.
    ///
    /// Fails fast with [`ClassifierError::InitInFlight`] or
    /// [`ClassifierError::AlreadyHeld`]; initialisation errors arrive later
    /// through [`ClassifierHandle::poll`].
    pub fn acquire<F>(&self, init: F, period: Duration) -> Result<ClassifierHandle, ClassifierError>
    where
        F: FnOnce() -> Result<BoxedClassifier, ClassifierError> + Send + 'static,
    {
        let generation = {
            let mut inner = self.lock();
            match inner.state {
                SlotState::Initializing => return Err(ClassifierError::InitInFlight),
                SlotState::Held         => return Err(ClassifierError::AlreadyHeld),
                SlotState::Vacant       => {}
            }
            inner.state = SlotState::Initializing;
            inner.generation += 1;
            inner.generation
        };

        let (cmd_tx, cmd_rx) = mpsc::channel::<WorkerCommand>();
        let (event_tx, event_rx) = mpsc::channel::<WorkerEvent>();
        let slot = self.clone();

        let spawned = thread::Builder::new()
            .name("gesture-classifier".into())
            .spawn(move || worker_thread(init, slot, generation, period, cmd_rx, event_tx));

        let thread = match spawned {
            Ok(t) => t,
            Err(e) => {
                self.settle(generation, SlotState::Vacant);
                return Err(ClassifierError::Init(format!("spawning worker: {e}")));
            }
        };

        log::info!("classifier initialising (generation {generation})");
        Ok(ClassifierHandle {
            slot: self.clone(),
            generation,
            cmd_tx,
            event_rx,
            thread: Some(thread),
            ready: false,
            latest: None,
            stale_after: period * 2,
        })
    }

    /// Move to `state` if `generation` is still the current one.
    fn settle(&self, generation: u64, state: SlotState) {
        let mut inner = self.lock();
        if inner.generation == generation {
            inner.state = state;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Worker protocol
// ════════════════════════════════════════════════════════════════════════════

enum WorkerCommand {
    Stop,
}

#[derive(Debug)]
enum WorkerEvent {
    Ready(String),
    Failed(ClassifierError),
    Label(Option<GestureLabel>),
}

fn worker_thread<F>(
    init:       F,
    slot:       ClassifierSlot,
    generation: u64,
    period:     Duration,
    cmd_rx:     Receiver<WorkerCommand>,
    event_tx:   Sender<WorkerEvent>,
) where
    F: FnOnce() -> Result<BoxedClassifier, ClassifierError>,
{
    let mut classifier = match init() {
        Ok(c) => c,
        Err(e) => {
            slot.settle(generation, SlotState::Vacant);
            let _ = event_tx.send(WorkerEvent::Failed(e));
            return;
        }
    };
    slot.settle(generation, SlotState::Held);
    let _ = event_tx.send(WorkerEvent::Ready(classifier.name().to_string()));

    loop {
        // A stop that raced with initialisation is honoured before the
        // first classify.
        match cmd_rx.try_recv() {
            Ok(WorkerCommand::Stop) | Err(TryRecvError::Disconnected) => return,
            Err(TryRecvError::Empty) => {}
        }

        let label = match classifier.classify() {
            Ok(label) => label,
            Err(e) => {
                log::warn!("{}: {}", classifier.name(), e);
                None
            }
        };
        if event_tx.send(WorkerEvent::Label(label)).is_err() {
            return;
        }

        match cmd_rx.recv_timeout(period) {
            Ok(WorkerCommand::Stop) | Err(RecvTimeoutError::Disconnected) => return,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ClassifierHandle
// ════════════════════════════════════════════════════════════════════════════

/// A live (or initialising) classifier.  Dropping it releases the slot.
pub struct ClassifierHandle {
    slot:       ClassifierSlot,
    generation: u64,
    cmd_tx:     Sender<WorkerCommand>,
    event_rx:   Receiver<WorkerEvent>,
    thread:     Option<JoinHandle<()>>,
    ready:      bool,
    /// Most recent label and when it arrived.
    latest:     Option<(Option<GestureLabel>, Instant)>,
    stale_after: Duration,
}

impl ClassifierHandle {
    /// True once initialisation has succeeded.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Drain pending results without blocking.
    ///
    /// Returns the most recent label the worker has posted, or `None` if
    /// there is none younger than two classifier periods.  An
    /// initialisation failure is returned once as an error; the handle is
    /// dead afterwards.
    pub fn poll(&mut self) -> Result<Option<GestureLabel>, ClassifierError> {
        loop {
            match self.event_rx.try_recv() {
                Ok(WorkerEvent::Ready(name)) => {
                    self.ready = true;
                    log::info!("classifier ready: {name}");
                }
                Ok(WorkerEvent::Label(label)) => self.latest = Some((label, Instant::now())),
                Ok(WorkerEvent::Failed(e))    => return Err(e),
                Err(TryRecvError::Empty)        => return Ok(self.current()),
                Err(TryRecvError::Disconnected) => return Err(ClassifierError::WorkerGone),
            }
        }
    }

    fn current(&self) -> Option<GestureLabel> {
        match self.latest {
            Some((label, at)) if at.elapsed() <= self.stale_after => label,
            _ => None,
        }
    }

    /// Stop the worker, wait for it, and vacate the slot.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for ClassifierHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(WorkerCommand::Stop);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("classifier worker panicked");
            }
        }
        self.slot.settle(self.generation, SlotState::Vacant);
        log::info!("classifier released (generation {})", self.generation);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ScriptedClassifier: replays a fixed sequence
// ════════════════════════════════════════════════════════════════════════════

/// Replays queued results, then reports no hand forever.
#[derive(Debug, Default)]
pub struct ScriptedClassifier {
    script: VecDeque<Result<Option<GestureLabel>, ClassifierError>>,
}

impl ScriptedClassifier {
    pub fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Result<Option<GestureLabel>, ClassifierError>>,
    {
        ScriptedClassifier { script: script.into_iter().collect() }
    }

    pub fn labels<I: IntoIterator<Item = Option<GestureLabel>>>(labels: I) -> Self {
        Self::new(labels.into_iter().map(Ok))
    }
}

impl GestureClassifier for ScriptedClassifier {
    fn classify(&mut self) -> Result<Option<GestureLabel>, ClassifierError> {
        self.script.pop_front().unwrap_or(Ok(None))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    const FAST: Duration = Duration::from_millis(2);
    /// Long enough that a single poll never sees two results.
    const SLOW: Duration = Duration::from_millis(50);

    /// Poll until `pred` accepts a result or two seconds pass.
    fn poll_until<P>(handle: &mut ClassifierHandle, mut pred: P) -> Result<Option<GestureLabel>, ClassifierError>
    where
        P: FnMut(&Result<Option<GestureLabel>, ClassifierError>) -> bool,
    {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let r = handle.poll();
            if pred(&r) || Instant::now() > deadline {
                return r;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn scripted(labels: Vec<Option<GestureLabel>>) -> impl FnOnce() -> Result<BoxedClassifier, ClassifierError> + Send + 'static {
        move || Ok(Box::new(ScriptedClassifier::labels(labels)) as BoxedClassifier)
    }

    #[test]
    fn labels_flow_through_the_worker() {
        let slot = ClassifierSlot::new();
        let mut handle = slot
            .acquire(scripted(vec![Some(GestureLabel::Pinch)]), SLOW)
            .unwrap();
        let r = poll_until(&mut handle, |r| matches!(r, Ok(Some(_))));
        assert_eq!(r, Ok(Some(GestureLabel::Pinch)));
        assert!(handle.is_ready());
        assert_eq!(slot.state(), SlotState::Held);

        // Held between results.
        assert_eq!(handle.poll(), Ok(Some(GestureLabel::Pinch)));

        // Script exhausted: only "no hand" from now on.
        let r = poll_until(&mut handle, |r| *r == Ok(None));
        assert_eq!(r, Ok(None));
    }

    #[test]
    fn second_acquire_while_initialising_is_refused() {
        let slot = ClassifierSlot::new();
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let handle = slot
            .acquire(
                move || {
                    gate_rx.recv().ok();
                    Ok(Box::new(ScriptedClassifier::default()) as BoxedClassifier)
                },
                FAST,
            )
            .unwrap();

        assert_eq!(slot.state(), SlotState::Initializing);
        assert_eq!(
            slot.acquire(scripted(vec![]), FAST).err(),
            Some(ClassifierError::InitInFlight)
        );

        gate_tx.send(()).unwrap();
        handle.release();
        assert_eq!(slot.state(), SlotState::Vacant);
    }

    #[test]
    fn held_slot_refuses_and_release_frees_it() {
        let slot = ClassifierSlot::new();
        let mut handle = slot.acquire(scripted(vec![]), FAST).unwrap();
        poll_until(&mut handle, |_| slot.state() == SlotState::Held);
        assert_eq!(
            slot.acquire(scripted(vec![]), FAST).err(),
            Some(ClassifierError::AlreadyHeld)
        );

        handle.release();
        assert_eq!(slot.state(), SlotState::Vacant);
        assert!(slot.acquire(scripted(vec![]), FAST).is_ok());
    }

    #[test]
    fn failed_init_resets_slot_for_retry() {
        let slot = ClassifierSlot::new();
        let mut handle = slot
            .acquire(|| Err(ClassifierError::Init("no device".into())), FAST)
            .unwrap();
        let r = poll_until(&mut handle, |r| r.is_err());
        assert_eq!(r, Err(ClassifierError::Init("no device".into())));
        assert_eq!(slot.state(), SlotState::Vacant);

        // Retry succeeds even before the dead handle is dropped…
        let retry = slot.acquire(scripted(vec![]), FAST).unwrap();
        // …and dropping the stale handle does not evict the new one.
        drop(handle);
        assert_ne!(slot.state(), SlotState::Vacant);
        drop(retry);
        assert_eq!(slot.state(), SlotState::Vacant);
    }

    #[test]
    fn stalled_worker_yields_no_hand() {
        let slot = ClassifierSlot::new();
        let (gate_tx, gate_rx) = mpsc::channel::<()>();

        struct Stalling(Receiver<()>);
        impl GestureClassifier for Stalling {
            fn classify(&mut self) -> Result<Option<GestureLabel>, ClassifierError> {
                // First call answers at once; later calls block until released.
                let label = Some(GestureLabel::ClosedFist);
                let _ = self.0.recv();
                Ok(label)
            }
        }

        gate_tx.send(()).unwrap();
        let mut handle = slot
            .acquire(move || Ok(Box::new(Stalling(gate_rx)) as BoxedClassifier), FAST)
            .unwrap();
        let r = poll_until(&mut handle, |r| matches!(r, Ok(Some(_))));
        assert_eq!(r, Ok(Some(GestureLabel::ClosedFist)));

        thread::sleep(Duration::from_millis(20));
        assert_eq!(handle.poll(), Ok(None));

        // Unblock so release can join the worker.
        drop(gate_tx);
        handle.release();
    }

    #[test]
    fn sensing_errors_become_no_hand() {
        let slot = ClassifierSlot::new();
        let mut handle = slot
            .acquire(
                || {
                    Ok(Box::new(ScriptedClassifier::new([
                        Err(ClassifierError::Sensing("frame dropped".into())),
                        Ok(Some(GestureLabel::OpenPalm)),
                    ])) as BoxedClassifier)
                },
                SLOW,
            )
            .unwrap();
        let mut seen_error = false;
        let r = poll_until(&mut handle, |r| {
            seen_error |= r.is_err();
            matches!(r, Ok(Some(_)))
        });
        assert!(!seen_error);
        assert_eq!(r, Ok(Some(GestureLabel::OpenPalm)));
    }

    #[test]
    fn release_stops_classifying() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct Counting(Arc<AtomicUsize>);
        impl GestureClassifier for Counting {
            fn classify(&mut self) -> Result<Option<GestureLabel>, ClassifierError> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let slot = ClassifierSlot::new();
        let c = calls.clone();
        let mut handle = slot
            .acquire(move || Ok(Box::new(Counting(c)) as BoxedClassifier), FAST)
            .unwrap();
        poll_until(&mut handle, |_| calls.load(Ordering::SeqCst) > 2);
        handle.release();

        let after = calls.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(calls.load(Ordering::SeqCst), after);
    }
}
