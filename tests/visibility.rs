//! Level-of-detail policy and opacity fading.

use concept_scene::lod::sanitize_camera_distance;
use concept_scene::{LodConfig, OpacityState, VisibilityFrame};
use pretty_assertions::assert_eq;

#[test]
fn core_level_is_always_visible() {
    let config = LodConfig::default();
    for distance in [0.0, 17.0, 59.0, 1.0e9, f32::MAX, f32::NAN, -1.0, f32::INFINITY] {
        assert!(VisibilityFrame::new(&config, distance).shows(0), "distance {distance}");
    }
}

#[test]
fn default_thresholds_decrease_with_depth() {
    let config = LodConfig::default();
    assert_eq!(config.threshold(0), f32::INFINITY);
    assert!(config.threshold(1) > config.threshold(2));
    assert!(config.threshold(2) > config.threshold(3));
}

#[test]
fn untrusted_distances_collapse_to_core_only() {
    let config = LodConfig::default();
    for distance in [f32::NAN, -0.5, f32::NEG_INFINITY, f32::INFINITY] {
        let frame = VisibilityFrame::new(&config, distance);
        assert_eq!(frame.tier(), 0, "distance {distance}");
        assert_eq!(frame.distance(), f32::MAX);
    }
    assert_eq!(sanitize_camera_distance(12.5), 12.5);
    assert_eq!(VisibilityFrame::core_only().tier(), 0);
}

#[test]
fn closer_camera_never_hides_a_level() {
    let config = LodConfig::default();
    let distances = [0.0, 5.0, 17.9, 18.0, 20.0, 34.9, 35.0, 50.0, 60.0, 61.0, 500.0];
    for pair in distances.windows(2) {
        let near = VisibilityFrame::new(&config, pair[0]);
        let far = VisibilityFrame::new(&config, pair[1]);
        for level in 0..=3 {
            assert!(!far.shows(level) || near.shows(level), "{pair:?} level {level}");
        }
    }
}

#[test]
fn opacity_fades_instead_of_switching() {
    let config = LodConfig::default();
    let mut opacity = OpacityState::new(1);

    opacity.step(&[1.0], &config, 1.0);
    let first = opacity.get(0);
    assert!(first > 0.0 && first < 1.0);

    opacity.step(&[1.0], &config, 1.0);
    assert!(opacity.get(0) > first);

    for _ in 0..200 {
        opacity.step(&[0.0], &config, 1.0);
    }
    assert_eq!(opacity.get(0), 0.0);
}

#[test]
fn longer_frames_fade_further() {
    let config = LodConfig::default();
    let mut short = OpacityState::new(1);
    let mut long = OpacityState::new(1);

    short.step(&[1.0], &config, 1.0);
    long.step(&[1.0], &config, 2.0);

    assert!(long.get(0) > short.get(0));
}
