//! Relaxes a random layout in the background while picking elements from the published
//! quadtree, the way an interactive view would.
//!
//! Run with `RUST_LOG=debug cargo run --example relax` to see the relaxer lifecycle.
use std::thread;
use std::time::Duration;

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rs_force_tree::layout::{BarnesHutLayout, GraphLayout, LayoutAlgorithm, Relaxer};
use rs_force_tree::quadtree::InverseSquareRepulsion;
use rs_force_tree::spatial::{LeafQuery, SpatialIndex};
use rs_force_tree::utils::{BarnesHutConfig, ForceTreeConfig, ForceTreeError, LayoutConfig, RelaxerConfig};

fn main() -> Result<(), ForceTreeError> {
    env_logger::init();

    let mut rng = StdRng::seed_from_u64(7);
    let mut model = GraphLayout::with_random_positions(500, 800.0, 600.0, &mut rng)?;
    let anchor = model.add_element((400.0, 300.0).into());
    model.lock(anchor)?;

    let layout = BarnesHutLayout::new(
        model,
        InverseSquareRepulsion::new(800.0, 2.0),
        BarnesHutConfig::new(Some(0.75), Some(2.0))?,
        LayoutConfig::new(None, Some(8.0), Some(0.05), Some(400))?,
        ForceTreeConfig::default(),
    )?;
    let index = layout.index();

    let mut relaxer = Relaxer::new(layout, RelaxerConfig::default());
    let prerelaxed = relaxer.prerelax()?;
    info!("Prerelaxed {} steps before showing the layout", prerelaxed);

    relaxer.start()?;
    for _ in 0..10 {
        thread::sleep(Duration::from_millis(50));
        let snapshot = index.snapshot();
        let picked = index.closest_element(400.0, 300.0);
        let cell = picked.and_then(|element| snapshot.containing_leaf(LeafQuery::Element(element)));
        info!("Pointer at (400, 300) picks {:?} in cell {:?}", picked, cell);
    }
    let steps = relaxer.stop()?;

    let (iterations, displacement) =
        relaxer.with_algorithm(|layout| (layout.iterations(), layout.last_max_displacement()));
    info!(
        "Stopped after {} background steps, {} iterations in total, last max displacement {:.3}",
        steps, iterations, displacement
    );
    Ok(())
}
