//! Thread-safe simulation control.
//!
//! A [`SimulationHandle`] shares one [`Simulator`] between a worker thread
//! running it and any number of controlling threads. It provides:
//! 1. **Single Lock:** Every operation on the simulator goes through one mutex;
//!    the worker holds it for one clock at a time.
//! 2. **Cooperative Stop:** `stop` sets a flag the worker polls once per clock.
//! 3. **Synchronized Reads:** While a run is in progress, reads are queued and
//!    executed by the worker between two clocks, so they observe a consistent state.
//! 4. **Exclusive Control:** `step`, `undo_step` and `reset` are refused while a
//!    run is in progress; only the worker advances the simulator.

use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::common::error::SimError;
use crate::sim::events::EventSink;
use crate::sim::simulator::{RunOutcome, Simulator, StepOutcome, StopToken};

type Job = Box<dyn FnOnce(&Simulator) + Send>;

#[derive(Default)]
struct JobQueue {
    running: bool,
    pending: Vec<Job>,
}

struct Shared {
    sim: Mutex<Simulator>,
    jobs: Mutex<JobQueue>,
    stop: StopToken,
}

/// Result of a background run.
pub type RunHandle = JoinHandle<Result<RunOutcome, SimError>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking observer must not wedge the simulator.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn drain_jobs(&self, sim: &Simulator) {
        let jobs = std::mem::take(&mut lock(&self.jobs).pending);
        for job in jobs {
            job(sim);
        }
    }

    fn run_worker(&self) -> Result<RunOutcome, SimError> {
        let mut first = true;
        let result = loop {
            let cycle = {
                let mut sim = lock(&self.sim);
                let cycle = sim.run_cycle(first);
                self.drain_jobs(&sim);
                cycle
            };
            first = false;
            match cycle {
                Ok(None) => {}
                Ok(Some(outcome)) => break Ok(outcome),
                Err(err) => break Err(err),
            }
        };

        let sim = lock(&self.sim);
        let remaining = {
            let mut jobs = lock(&self.jobs);
            jobs.running = false;
            std::mem::take(&mut jobs.pending)
        };
        for job in remaining {
            job(&sim);
        }
        debug!(outcome = ?result, "background run ended");
        result
    }
}

/// Shared, thread-safe handle to a simulator.
#[derive(Clone)]
pub struct SimulationHandle {
    shared: Arc<Shared>,
}

impl SimulationHandle {
    /// Wraps a simulator.
    pub fn new(sim: Simulator) -> Self {
        let stop = sim.stop_token();
        Self {
            shared: Arc::new(Shared {
                sim: Mutex::new(sim),
                jobs: Mutex::new(JobQueue::default()),
                stop,
            }),
        }
    }

    /// Starts running on a dedicated worker thread.
    ///
    /// # Returns
    ///
    /// The worker's join handle, or `SimError::AlreadyRunning` if a run is in progress.
    pub fn spawn_run(&self) -> Result<RunHandle, SimError> {
        {
            let mut jobs = lock(&self.shared.jobs);
            if jobs.running {
                return Err(SimError::AlreadyRunning);
            }
            jobs.running = true;
        }
        self.shared.stop.clear();
        let shared = Arc::clone(&self.shared);
        thread::Builder::new()
            .name("mipsim-run".to_owned())
            .spawn(move || shared.run_worker())
            .map_err(|err| {
                lock(&self.shared.jobs).running = false;
                SimError::Internal(format!("cannot start the run thread: {err}"))
            })
    }

    /// Waits for a background run to end.
    pub fn wait(run: RunHandle) -> Result<RunOutcome, SimError> {
        run.join()
            .map_err(|_| SimError::Internal("the run thread panicked".to_owned()))?
    }

    /// Whether a background run is in progress.
    pub fn is_running(&self) -> bool {
        lock(&self.shared.jobs).running
    }

    /// Requests the background run to stop before its next clock.
    pub fn stop(&self) {
        self.shared.stop.stop();
    }

    /// Runs `f` against a consistent simulator state.
    ///
    /// During a background run the read is executed by the worker between two
    /// clocks and the caller blocks until it is done. Otherwise it runs directly.
    pub fn read_synchronized<R, F>(&self, f: F) -> Result<R, SimError>
    where
        R: Send + 'static,
        F: FnOnce(&Simulator) -> R + Send + 'static,
    {
        {
            let mut jobs = lock(&self.shared.jobs);
            if jobs.running {
                let (tx, rx) = mpsc::channel();
                jobs.pending.push(Box::new(move |sim| {
                    let _ = tx.send(f(sim));
                }));
                drop(jobs);
                return rx
                    .recv()
                    .map_err(|_| SimError::Internal("the run thread dropped a read".to_owned()));
            }
        }
        Ok(f(&lock(&self.shared.sim)))
    }

    /// Locks the simulator for direct access.
    pub fn lock(&self) -> MutexGuard<'_, Simulator> {
        lock(&self.shared.sim)
    }

    /// Locks the simulator for an operation that must not interleave with a run.
    fn lock_idle(&self) -> Result<MutexGuard<'_, Simulator>, SimError> {
        let sim = lock(&self.shared.sim);
        if lock(&self.shared.jobs).running {
            return Err(SimError::AlreadyRunning);
        }
        Ok(sim)
    }

    /// Advances one clock.
    ///
    /// # Returns
    ///
    /// `SimError::AlreadyRunning` while a background run is in progress.
    pub fn step(&self) -> Result<StepOutcome, SimError> {
        self.lock_idle()?.step()
    }

    /// Reverts the most recent clock. Rejected while a background run is in progress.
    pub fn undo_step(&self) -> Result<bool, SimError> {
        Ok(self.lock_idle()?.undo_step())
    }

    /// Restores the freshly loaded program. Rejected while a background run is in progress.
    pub fn reset(&self) -> Result<(), SimError> {
        self.lock_idle()?.reset();
        Ok(())
    }

    /// Raises a hardware interrupt line. Allowed while running.
    pub fn request_interrupt(&self, line: u8) -> bool {
        self.lock().request_interrupt(line)
    }

    /// Lowers a hardware interrupt line. Allowed while running.
    pub fn clear_interrupt(&self, line: u8) -> bool {
        self.lock().clear_interrupt(line)
    }

    /// Adds a breakpoint.
    pub fn add_breakpoint(&self, pc: u32) -> bool {
        self.lock().add_breakpoint(pc)
    }

    /// Removes a breakpoint.
    pub fn remove_breakpoint(&self, pc: u32) -> bool {
        self.lock().remove_breakpoint(pc)
    }

    /// Toggles a breakpoint.
    pub fn toggle_breakpoint(&self, pc: u32) -> bool {
        self.lock().toggle_breakpoint(pc)
    }

    /// Installs an event sink.
    pub fn subscribe(&self, sink: Arc<dyn EventSink>) {
        self.lock().subscribe(sink);
    }
}

impl std::fmt::Debug for SimulationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationHandle")
            .field("running", &self.is_running())
            .field("stop_requested", &self.shared.stop.is_stopped())
            .finish()
    }
}
