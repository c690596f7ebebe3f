use std::time::Duration;

use crate::utils;

pub const DEFAULT_FORCE_TREE_CONFIG: utils::ForceTreeConfig = utils::ForceTreeConfig {
    max_depth: 100,
    out_of_bounds: utils::OutOfBoundsPolicy::Clamp,
    rtree_max_children: 8,
};

pub const DEFAULT_BARNES_HUT_CONFIG: utils::BarnesHutConfig = utils::BarnesHutConfig {
    theta: 0.75,
    min_distance: 1.0,
};

pub const DEFAULT_LAYOUT_CONFIG: utils::LayoutConfig = utils::LayoutConfig {
    time_step: 1.0,
    max_displacement: 10.0,
    convergence_threshold: 0.1,
    max_iterations: 700,
};

pub const DEFAULT_RELAXER_CONFIG: utils::RelaxerConfig = utils::RelaxerConfig {
    sleep_between_steps: Duration::from_millis(10),
    prerelax_duration: Duration::from_millis(500),
    max_prerelax_steps: 500,
};
