use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, warn};

use crate::layout::{LayoutAlgorithm, StepOutcome};
use crate::utils::{ForceTreeError, RelaxerConfig};

/// Shortest sleep of a paused worker between checks of its flags.
const PAUSE_POLL: Duration = Duration::from_millis(1);

/// A stoppable task that repeatedly steps a [`LayoutAlgorithm`].
///
/// The relaxer can be driven synchronously ([`step`](Relaxer::step),
/// [`prerelax`](Relaxer::prerelax)) or run on a background thread
/// ([`start`](Relaxer::start) / [`stop`](Relaxer::stop)). Pausing and stopping are
/// cooperative: the worker checks its flags between steps, so an iteration in progress
/// always completes, including the publication of its tree.
///
/// # Examples
///
/// ```
/// use rs_force_tree::layout::{BarnesHutLayout, GraphLayout, LayoutAlgorithm, Relaxer};
/// use rs_force_tree::quadtree::InverseSquareRepulsion;
/// use rs_force_tree::utils::{BarnesHutConfig, ForceTreeConfig, LayoutConfig, RelaxerConfig};
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(1);
/// let model = GraphLayout::with_random_positions(50, 600.0, 600.0, &mut rng).unwrap();
/// let layout = BarnesHutLayout::new(
///     model,
///     InverseSquareRepulsion::new(50.0, 1.0),
///     BarnesHutConfig::default(),
///     LayoutConfig::new(None, None, None, Some(20)).unwrap(),
///     ForceTreeConfig::default(),
/// )
/// .unwrap();
///
/// let relaxer = Relaxer::new(layout, RelaxerConfig::default());
/// let steps = relaxer.prerelax().unwrap();
/// assert!(steps <= 20);
/// assert!(relaxer.with_algorithm(|layout| layout.is_converged()));
/// ```
pub struct Relaxer<A> {
    algorithm: Arc<Mutex<A>>,
    config: RelaxerConfig,
    running: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    steps: Arc<AtomicUsize>,
    worker: Option<JoinHandle<()>>,
}

impl<A> Relaxer<A>
where
    A: LayoutAlgorithm + Send + 'static,
{
    pub fn new(algorithm: A, config: RelaxerConfig) -> Self {
        Relaxer {
            algorithm: Arc::new(Mutex::new(algorithm)),
            config,
            running: Arc::new(AtomicBool::new(false)),
            paused: Arc::new(AtomicBool::new(false)),
            steps: Arc::new(AtomicUsize::new(0)),
            worker: None,
        }
    }

    pub fn config(&self) -> &RelaxerConfig {
        &self.config
    }

    /// Locked access to the algorithm. Blocks while a background step is in progress.
    pub fn with_algorithm<R>(&self, f: impl FnOnce(&mut A) -> R) -> R {
        let mut algorithm = self.algorithm.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut algorithm)
    }

    /// `true` while a background worker is alive.
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|worker| !worker.is_finished())
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Runs a single iteration on the calling thread.
    ///
    /// # Errors
    ///
    /// `AlreadyRunning` if a background worker owns the algorithm.
    pub fn step(&self) -> Result<StepOutcome, ForceTreeError> {
        if self.is_running() {
            return Err(ForceTreeError::AlreadyRunning);
        }
        Ok(self.with_algorithm(|algorithm| algorithm.step()))
    }

    /// Runs iterations on the calling thread before the layout is shown, until it
    /// converges or the configured step count or wall-clock budget runs out.
    ///
    /// Returns the number of iterations run.
    pub fn prerelax(&self) -> Result<usize, ForceTreeError> {
        if self.is_running() {
            return Err(ForceTreeError::AlreadyRunning);
        }
        let started = Instant::now();
        let mut steps = 0;
        self.with_algorithm(|algorithm| {
            while steps < self.config.max_prerelax_steps
                && started.elapsed() < self.config.prerelax_duration
                && !algorithm.is_converged()
            {
                steps += 1;
                if algorithm.step() == StepOutcome::Converged {
                    break;
                }
            }
        });
        debug!("Prerelaxed {} steps in {:?}", steps, started.elapsed());
        Ok(steps)
    }

    /// Spawns the background loop.
    ///
    /// The loop steps the algorithm until it converges or [`stop`](Relaxer::stop) is
    /// called, sleeping `sleep_between_steps` between iterations.
    pub fn start(&mut self) -> Result<(), ForceTreeError> {
        if self.is_running() {
            return Err(ForceTreeError::AlreadyRunning);
        }
        // A worker that finished on its own is reaped before starting over.
        if let Some(finished) = self.worker.take() {
            if finished.join().is_err() {
                warn!("Previous relaxer worker had panicked");
            }
        }

        self.running.store(true, Ordering::Release);
        self.paused.store(false, Ordering::Release);
        self.steps.store(0, Ordering::Release);

        let algorithm = Arc::clone(&self.algorithm);
        let running = Arc::clone(&self.running);
        let paused = Arc::clone(&self.paused);
        let steps = Arc::clone(&self.steps);
        let sleep = self.config.sleep_between_steps;

        self.worker = Some(thread::spawn(move || {
            while running.load(Ordering::Acquire) {
                if paused.load(Ordering::Acquire) {
                    thread::sleep(sleep.max(PAUSE_POLL));
                    continue;
                }
                let outcome = {
                    let mut algorithm = algorithm.lock().unwrap_or_else(PoisonError::into_inner);
                    if algorithm.is_converged() {
                        StepOutcome::Converged
                    } else {
                        steps.fetch_add(1, Ordering::AcqRel);
                        algorithm.step()
                    }
                };
                if outcome == StepOutcome::Converged {
                    debug!("Relaxer converged after {} steps", steps.load(Ordering::Acquire));
                    break;
                }
                if !sleep.is_zero() {
                    thread::sleep(sleep);
                }
            }
            running.store(false, Ordering::Release);
        }));
        debug!("Relaxer started");
        Ok(())
    }

    /// Suspends the background loop after its current step.
    pub fn pause(&self) -> Result<(), ForceTreeError> {
        if !self.is_running() {
            return Err(ForceTreeError::NotRunning);
        }
        self.paused.store(true, Ordering::Release);
        debug!("Relaxer paused");
        Ok(())
    }

    pub fn resume(&self) -> Result<(), ForceTreeError> {
        if !self.is_running() {
            return Err(ForceTreeError::NotRunning);
        }
        self.paused.store(false, Ordering::Release);
        debug!("Relaxer resumed");
        Ok(())
    }

    /// Stops the background loop and waits for it to exit.
    ///
    /// Returns the number of steps the worker ran. A worker that already stopped by
    /// converging is reaped the same way.
    ///
    /// # Errors
    ///
    /// `NotRunning` if no worker was started, `WorkerPanicked` if it panicked.
    pub fn stop(&mut self) -> Result<usize, ForceTreeError> {
        let worker = self.worker.take().ok_or(ForceTreeError::NotRunning)?;
        self.running.store(false, Ordering::Release);
        self.paused.store(false, Ordering::Release);
        if worker.join().is_err() {
            error!("Relaxer worker panicked");
            return Err(ForceTreeError::WorkerPanicked);
        }
        let steps = self.steps.load(Ordering::Acquire);
        debug!("Relaxer stopped after {} steps", steps);
        Ok(steps)
    }
}

impl<A> Drop for Relaxer<A> {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.running.store(false, Ordering::Release);
            if worker.join().is_err() {
                error!("Relaxer worker panicked before the relaxer was dropped");
            }
        }
    }
}
