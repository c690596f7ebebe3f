use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use log::{Level, LevelFilter, Log, Metadata, Record};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::layout::{BarnesHutLayout, GraphLayout, LayoutAlgorithm, Relaxer, StepOutcome};
use crate::quadtree::InverseSquareRepulsion;
use crate::utils::{BarnesHutConfig, ForceTreeConfig, ForceTreeError, LayoutConfig, RelaxerConfig};

type Layout = BarnesHutLayout<GraphLayout, InverseSquareRepulsion>;

fn layout(seed: u64, max_iterations: usize) -> Layout {
    let mut rng = StdRng::seed_from_u64(seed);
    let model = GraphLayout::with_random_positions(80, 600.0, 600.0, &mut rng).unwrap();
    BarnesHutLayout::new(
        model,
        InverseSquareRepulsion::new(500.0, 1.0),
        BarnesHutConfig::default(),
        // A zero threshold keeps the layout running until its iteration budget is spent.
        LayoutConfig::new(None, None, Some(0.0), Some(max_iterations)).unwrap(),
        ForceTreeConfig::default(),
    )
    .unwrap()
}

/// Counts steps and never converges on its own.
#[derive(Default)]
struct Counter {
    steps: usize,
}

impl LayoutAlgorithm for Counter {
    fn step(&mut self) -> StepOutcome {
        self.steps += 1;
        StepOutcome::Continue
    }

    fn is_converged(&self) -> bool {
        false
    }

    fn iterations(&self) -> usize {
        self.steps
    }

    fn reset(&mut self) {
        self.steps = 0;
    }
}

/// Panics on its first step.
struct Exploding;

impl LayoutAlgorithm for Exploding {
    fn step(&mut self) -> StepOutcome {
        panic!("layout step failed");
    }

    fn is_converged(&self) -> bool {
        false
    }

    fn iterations(&self) -> usize {
        0
    }

    fn reset(&mut self) {}
}

/// Keeps every error-level message logged by the process.
struct ErrorLog {
    lines: Mutex<Vec<String>>,
}

impl Log for ErrorLog {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Error
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.lines.lock().unwrap().push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static ERROR_LOG: ErrorLog = ErrorLog { lines: Mutex::new(Vec::new()) };

fn wait_until_finished<A: LayoutAlgorithm + Send + 'static>(relaxer: &Relaxer<A>) {
    for _ in 0..500 {
        if !relaxer.is_running() {
            return;
        }
        thread::sleep(Duration::from_millis(10));
    }
}

fn fast() -> RelaxerConfig {
    RelaxerConfig::new(Some(Duration::from_millis(1)), None, None)
}

#[test]
fn test_single_step_while_stopped() {
    let relaxer = Relaxer::new(layout(1, 100), fast());
    assert!(!relaxer.is_running());
    assert_eq!(relaxer.step(), Ok(StepOutcome::Continue));
    assert_eq!(relaxer.with_algorithm(|l| l.iterations()), 1);
}

#[test]
fn test_prerelax_is_bounded_by_step_budget() {
    let config = RelaxerConfig::new(None, Some(Duration::from_secs(60)), Some(7));
    let relaxer = Relaxer::new(layout(2, 100), config);
    assert_eq!(relaxer.prerelax(), Ok(7));
    assert_eq!(relaxer.with_algorithm(|l| l.iterations()), 7);
}

#[test]
fn test_prerelax_stops_at_convergence() {
    let config = RelaxerConfig::new(None, Some(Duration::from_secs(60)), Some(500));
    let relaxer = Relaxer::new(layout(3, 12), config);
    assert_eq!(relaxer.prerelax(), Ok(12));
    assert!(relaxer.with_algorithm(|l| l.is_converged()));
    // Nothing left to do once converged.
    assert_eq!(relaxer.prerelax(), Ok(0));
}

#[test]
fn test_prerelax_is_bounded_by_duration() {
    let config = RelaxerConfig::new(None, Some(Duration::ZERO), Some(500));
    let relaxer = Relaxer::new(Counter::default(), config);
    assert_eq!(relaxer.prerelax(), Ok(0));
}

#[test]
fn test_start_stop_lifecycle() {
    let mut relaxer = Relaxer::new(Counter::default(), fast());
    assert_eq!(relaxer.stop(), Err(ForceTreeError::NotRunning));
    assert_eq!(relaxer.pause(), Err(ForceTreeError::NotRunning));

    relaxer.start().unwrap();
    assert!(relaxer.is_running());
    assert_eq!(relaxer.start(), Err(ForceTreeError::AlreadyRunning));
    assert_eq!(relaxer.step(), Err(ForceTreeError::AlreadyRunning));
    assert_eq!(relaxer.prerelax(), Err(ForceTreeError::AlreadyRunning));

    thread::sleep(Duration::from_millis(30));
    let steps = relaxer.stop().unwrap();
    assert!(steps > 0);
    assert!(!relaxer.is_running());
    assert_eq!(relaxer.with_algorithm(|c| c.steps), steps);

    // A stopped relaxer can be stepped by hand and started again.
    assert_eq!(relaxer.step(), Ok(StepOutcome::Continue));
    relaxer.start().unwrap();
    relaxer.stop().unwrap();
}

#[test]
fn test_pause_and_resume() {
    let mut relaxer = Relaxer::new(Counter::default(), fast());
    relaxer.start().unwrap();
    thread::sleep(Duration::from_millis(10));

    relaxer.pause().unwrap();
    assert!(relaxer.is_paused());
    // Let any step in flight finish before sampling.
    thread::sleep(Duration::from_millis(10));
    let paused_at = relaxer.with_algorithm(|c| c.steps);
    thread::sleep(Duration::from_millis(30));
    assert_eq!(relaxer.with_algorithm(|c| c.steps), paused_at);

    relaxer.resume().unwrap();
    assert!(!relaxer.is_paused());
    thread::sleep(Duration::from_millis(30));
    assert!(relaxer.with_algorithm(|c| c.steps) > paused_at);
    relaxer.stop().unwrap();
}

#[test]
fn test_worker_panic_is_reported() {
    log::set_logger(&ERROR_LOG).unwrap();
    log::set_max_level(LevelFilter::Error);

    let mut relaxer = Relaxer::new(Exploding, fast());
    relaxer.start().unwrap();
    assert_eq!(relaxer.stop(), Err(ForceTreeError::WorkerPanicked));

    let mut relaxer = Relaxer::new(Exploding, fast());
    relaxer.start().unwrap();
    wait_until_finished(&relaxer);
    assert!(!relaxer.is_running());
    drop(relaxer);

    let lines = ERROR_LOG.lines.lock().unwrap();
    assert!(lines.iter().any(|line| line == "Relaxer worker panicked"));
    assert!(lines.iter().any(|line| line.contains("before the relaxer was dropped")));
}

#[test]
fn test_background_run_ends_at_convergence() {
    let config = RelaxerConfig::new(Some(Duration::ZERO), None, None);
    let mut relaxer = Relaxer::new(layout(4, 15), config);
    let index = relaxer.with_algorithm(|l| l.index());
    relaxer.start().unwrap();

    for _ in 0..500 {
        if !relaxer.is_running() {
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }
    assert!(!relaxer.is_running());
    assert_eq!(relaxer.stop(), Ok(15));
    assert!(relaxer.with_algorithm(|l| l.is_converged()));
    assert_eq!(index.generation(), 15);
    assert_eq!(index.len(), 80);
}
