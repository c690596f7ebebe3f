use std::time::Duration;

use crate::models::ElementId;
use crate::utils::{
    BarnesHutConfig, ForceTreeConfig, ForceTreeError, LayoutConfig, OutOfBoundsPolicy,
    RelaxerConfig, DEFAULT_FORCE_TREE_CONFIG,
};

#[test]
fn test_force_tree_config_defaults() {
    let config = ForceTreeConfig::default();
    assert_eq!(config, DEFAULT_FORCE_TREE_CONFIG);
    assert_eq!(config.max_depth, 100);
    assert_eq!(config.out_of_bounds, OutOfBoundsPolicy::Clamp);
    assert!(config.validate().is_ok());
}

#[test]
fn test_force_tree_config_rejects_degenerate_values() {
    let no_depth = ForceTreeConfig::new(Some(0), None, None);
    assert_eq!(no_depth.validate(), Err(ForceTreeError::InvalidMaxDepth(0)));

    let tiny_nodes = ForceTreeConfig::new(None, None, Some(1));
    assert_eq!(tiny_nodes.validate(), Err(ForceTreeError::InvalidNodeCapacity(1)));
}

#[test]
fn test_barnes_hut_config_validation() {
    assert_eq!(BarnesHutConfig::new(Some(-0.5), None), Err(ForceTreeError::InvalidTheta(-0.5)));
    assert!(matches!(BarnesHutConfig::new(Some(f64::NAN), None), Err(ForceTreeError::InvalidTheta(_))));
    assert_eq!(
        BarnesHutConfig::new(Some(0.5), Some(0.0)),
        Err(ForceTreeError::InvalidMinDistance(0.0))
    );
    let config = BarnesHutConfig::new(None, None).expect("defaults are valid");
    assert_eq!(config.theta, 0.75);
}

#[test]
fn test_layout_config_rejects_zero_time_step() {
    assert_eq!(
        LayoutConfig::new(Some(0.0), None, None, None),
        Err(ForceTreeError::InvalidTimeStep(0.0))
    );
    let config = LayoutConfig::new(None, Some(4.0), None, Some(10)).expect("valid config");
    assert_eq!(config.max_displacement, 4.0);
    assert_eq!(config.max_iterations, 10);
}

#[test]
fn test_relaxer_config_overrides() {
    let config = RelaxerConfig::new(Some(Duration::ZERO), None, Some(3));
    assert_eq!(config.sleep_between_steps, Duration::ZERO);
    assert_eq!(config.prerelax_duration, Duration::from_millis(500));
    assert_eq!(config.max_prerelax_steps, 3);
}

#[test]
fn test_error_display() {
    assert_eq!(ForceTreeError::InvalidTheta(0.0).to_string(), "Invalid opening angle: 0");
    assert_eq!(ForceTreeError::UnknownElement(ElementId(7)).to_string(), "Unknown element: #7");
    assert_eq!(
        ForceTreeError::InvalidBounds { width: -1.0, height: 2.0 }.to_string(),
        "Invalid layout bounds: -1 x 2"
    );
}
