//! Simulation thread and shared board
//!
//! The simulation thread steps the board at a fixed rate while a presentation
//! loop (window, headless driver, tests) reads snapshots and sends input.
//! The board sits behind one mutex that is held for a whole tick, so readers
//! only ever see the state between ticks. Shutdown is cooperative: the loop
//! polls a shared running flag once per tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::SpawnError;
use crate::sim::{Board, Pin, SimEvent, Snapshot};

/// Holds a loop at a fixed rate by sleeping off the rest of each period
///
/// Not a real-time scheduler: an iteration that runs over budget is simply
/// followed by the next one without sleeping.
#[derive(Debug, Clone)]
pub struct RateGovernor {
    period: Duration,
    frame_start: Instant,
    overruns: u64,
}

impl RateGovernor {
    pub fn new(rate_hz: u32) -> Self {
        Self {
            period: Duration::from_secs_f64(1.0 / rate_hz.max(1) as f64),
            frame_start: Instant::now(),
            overruns: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Iterations that took longer than one period
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Mark the start of an iteration
    pub fn begin(&mut self) {
        self.frame_start = Instant::now();
    }

    /// Sleep whatever is left of the period. Returns false when over budget.
    pub fn finish(&mut self) -> bool {
        match self.period.checked_sub(self.frame_start.elapsed()) {
            Some(remaining) => {
                thread::sleep(remaining);
                true
            }
            None => {
                self.overruns += 1;
                false
            }
        }
    }
}

fn lock_board(board: &Mutex<Board>) -> MutexGuard<'_, Board> {
    // A panic mid-tick can only come from a bug; the board is still readable
    board.lock().unwrap_or_else(PoisonError::into_inner)
}

fn run_loop(board: Arc<Mutex<Board>>, running: Arc<AtomicBool>, rate_hz: u32) -> u64 {
    let mut governor = RateGovernor::new(rate_hz);
    let mut ticks = 0u64;

    log::info!("Simulation loop started at {} Hz", rate_hz);
    while running.load(Ordering::Acquire) {
        governor.begin();
        lock_board(&board).step();
        ticks += 1;
        governor.finish();
    }
    log::info!(
        "Simulation loop stopped after {} ticks ({} over budget)",
        ticks,
        governor.overruns()
    );
    ticks
}

/// A board running on its own thread
pub struct SimulationHandle {
    board: Arc<Mutex<Board>>,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<u64>>,
}

impl SimulationHandle {
    /// Start stepping `board` at its configured tick rate
    pub fn start(board: Board) -> std::io::Result<Self> {
        let rate_hz = board.params().tick_rate_hz;
        let board = Arc::new(Mutex::new(board));
        let running = Arc::new(AtomicBool::new(true));

        let thread = {
            let board = Arc::clone(&board);
            let running = Arc::clone(&running);
            thread::Builder::new()
                .name("plinko-sim".into())
                .spawn(move || run_loop(board, running, rate_hz))?
        };

        Ok(Self {
            board,
            running,
            thread: Some(thread),
        })
    }

    /// Shared running flag, for loops that should stop alongside the simulation
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Ask both loops to exit at their next check
    pub fn request_stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Pins with render positions for the current window size
    pub fn pins(&self) -> Vec<Pin> {
        lock_board(&self.board).pins().to_vec()
    }

    pub fn snapshot(&self) -> Snapshot {
        lock_board(&self.board).snapshot()
    }

    pub fn spawn_ball(&self, x: f64) -> Result<usize, SpawnError> {
        lock_board(&self.board).spawn_ball(x)
    }

    pub fn toggle_debug(&self) -> bool {
        lock_board(&self.board).toggle_debug()
    }

    pub fn score(&self) -> u64 {
        lock_board(&self.board).score()
    }

    pub fn resize(&self, window_width: f64, window_height: f64) {
        lock_board(&self.board).resize(window_width, window_height);
    }

    pub fn drain_events(&self) -> Vec<SimEvent> {
        lock_board(&self.board).drain_events()
    }

    /// Run `f` against the board between ticks
    pub fn with_board<R>(&self, f: impl FnOnce(&mut Board) -> R) -> R {
        f(&mut lock_board(&self.board))
    }

    /// Stop the simulation thread and return the number of ticks it ran
    pub fn stop(mut self) -> u64 {
        self.shutdown()
    }

    fn shutdown(&mut self) -> u64 {
        self.request_stop();
        match self.thread.take().map(JoinHandle::join) {
            Some(Ok(ticks)) => ticks,
            Some(Err(_)) => {
                log::error!("Simulation thread panicked");
                0
            }
            None => 0,
        }
    }
}

impl Drop for SimulationHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
