/// Tests for MirrorChain
///
/// These tests validate chain wiring, forward pose propagation, reverse
/// draw order and resource release.

use std::sync::{Arc, Mutex};
use glam::Vec3;
use crate::config::{MirrorConfig, SceneConfig};
use crate::error::Error;
use crate::renderer::Renderer;
use crate::renderer::mock_renderer::MockRenderer;
use super::*;

fn assert_vec3_near(a: Vec3, b: Vec3) {
    assert!(a.abs_diff_eq(b, 1e-3), "{:?} != {:?}", a, b);
}

/// Three mirrors: two facing each other along Z, a third along X
fn chain_config() -> SceneConfig {
    let mut config = SceneConfig::default();
    config.camera.position = [0.0, 0.0, 5.0];
    config.camera.target = [0.0, 0.0, 0.0];

    let mut first = MirrorConfig::named("Mirror0");
    first.rotation_degrees = [90.0, 0.0, 0.0];
    let mut second = MirrorConfig::named("Mirror1");
    second.position = [0.0, 0.0, 10.0];
    second.rotation_degrees = [-90.0, 0.0, 0.0];
    let mut third = MirrorConfig::named("Mirror2");
    third.position = [3.0, 0.0, 0.0];
    third.rotation_degrees = [0.0, 0.0, 90.0];

    config.mirrors = vec![first, second, third];
    config
}

fn setup() -> (Arc<Mutex<MockRenderer>>, MirrorChain) {
    let mock = Arc::new(Mutex::new(MockRenderer::new()));
    let renderer: Arc<Mutex<dyn Renderer>> = mock.clone();
    let chain = MirrorChain::from_config(&chain_config(), renderer).unwrap();
    (mock, chain)
}

#[test]
fn test_chain_wiring() {
    let (mock, chain) = setup();

    assert_eq!(chain.mirror_count(), 3);
    assert_eq!(mock.lock().unwrap().live_target_count(), 3);

    let mirrors = chain.mirrors();
    assert_eq!(mirrors[0].source_camera(), Some(chain.main_camera_key()));
    assert_eq!(mirrors[1].source_camera(), Some(mirrors[0].reflection_camera().unwrap()));
    assert_eq!(mirrors[2].source_camera(), Some(mirrors[1].reflection_camera().unwrap()));
}

#[test]
fn test_priorities_step_down_along_chain() {
    let (_, chain) = setup();
    let cameras = chain.cameras();
    let priority = |index: usize| {
        cameras.camera(chain.mirrors()[index].reflection_camera().unwrap()).unwrap().priority()
    };

    assert_eq!(priority(0), -1);
    assert_eq!(priority(1), -2);
    assert_eq!(priority(2), -3);
}

#[test]
fn test_update_propagates_forward() {
    let (_, mut chain) = setup();

    chain.update().unwrap();

    let cameras = chain.cameras();
    let position = |index: usize| {
        cameras.camera(chain.mirrors()[index].reflection_camera().unwrap()).unwrap().position()
    };
    // Main at z=5 → across z=0 → across z=10 → across x=3
    assert_vec3_near(position(0), Vec3::new(0.0, 0.0, -5.0));
    assert_vec3_near(position(1), Vec3::new(0.0, 0.0, 25.0));
    assert_vec3_near(position(2), Vec3::new(6.0, 0.0, 25.0));
}

#[test]
fn test_draw_renders_last_mirror_first() {
    let (mock, mut chain) = setup();

    chain.run_frame().unwrap();

    let mock = mock.lock().unwrap();
    assert_eq!(mock.rendered_cameras(), vec!["Mirror2 Camera", "Mirror1 Camera", "Mirror0 Camera"]);
    // One, two and three reflections deep
    let inverted: Vec<bool> = mock.renders().iter().map(|call| call.inverted).collect();
    assert_eq!(inverted, vec![true, false, true]);
    assert!(!mock.invert_culling());
}

#[test]
fn test_main_camera_motion_reaches_end_of_chain() {
    let (_, mut chain) = setup();
    chain.update().unwrap();

    chain.main_camera_mut().unwrap().set_position(Vec3::new(0.0, 1.0, 5.0));
    chain.update().unwrap();

    let last = chain.mirrors()[2].reflection_camera().unwrap();
    assert_vec3_near(chain.cameras().camera(last).unwrap().position(), Vec3::new(6.0, 1.0, 25.0));
}

#[test]
fn test_empty_chain_is_valid() {
    let mock = Arc::new(Mutex::new(MockRenderer::new()));
    let renderer: Arc<Mutex<dyn Renderer>> = mock.clone();
    let mut config = chain_config();
    config.mirrors.clear();

    let mut chain = MirrorChain::from_config(&config, renderer).unwrap();
    chain.run_frame().unwrap();

    assert!(mock.lock().unwrap().renders().is_empty());
}

#[test]
fn test_frame_before_initialize_fails() {
    let renderer: Arc<Mutex<dyn Renderer>> = Arc::new(Mutex::new(MockRenderer::new()));
    let config = chain_config();
    let mut chain = MirrorChain::new(renderer, config.camera.build(), Default::default());
    chain.add_mirror("Mirror0", config.mirrors[0].surface()).unwrap();

    assert!(matches!(chain.update(), Err(Error::InvalidState(_))));
    assert!(matches!(chain.draw(), Err(Error::InvalidState(_))));
}

#[test]
fn test_add_mirror_rules() {
    let renderer: Arc<Mutex<dyn Renderer>> = Arc::new(Mutex::new(MockRenderer::new()));
    let config = chain_config();
    let mut chain = MirrorChain::new(renderer, config.camera.build(), Default::default());

    assert_eq!(chain.add_mirror("Mirror0", config.mirrors[0].surface()).unwrap(), 0);
    assert!(matches!(
        chain.add_mirror("Mirror0", config.mirrors[0].surface()),
        Err(Error::InvalidResource(_))
    ));

    chain.initialize().unwrap();
    assert!(matches!(
        chain.add_mirror("Mirror1", config.mirrors[1].surface()),
        Err(Error::InvalidState(_))
    ));
    assert!(matches!(chain.initialize(), Err(Error::InvalidState(_))));
}

#[test]
fn test_drop_releases_every_target() {
    let (mock, chain) = setup();
    drop(chain);

    let mock = mock.lock().unwrap();
    assert_eq!(mock.live_target_count(), 0);
    assert_eq!(mock.released_targets().len(), 3);
}

#[test]
fn test_priority_underflow_mid_chain_releases_earlier_targets() {
    let mock = Arc::new(Mutex::new(MockRenderer::new()));
    let renderer: Arc<Mutex<dyn Renderer>> = mock.clone();
    let config = chain_config();
    let mut camera = config.camera.build();
    // Room for Mirror0 only
    camera.set_priority(i32::MIN + 1);
    let mut chain = MirrorChain::new(renderer, camera, Default::default());
    for mirror in &config.mirrors {
        chain.add_mirror(mirror.name.clone(), mirror.surface()).unwrap();
    }

    assert!(matches!(chain.initialize(), Err(Error::InvalidState(_))));
    assert_eq!(mock.lock().unwrap().live_target_count(), 1);
    drop(chain);

    let mock = mock.lock().unwrap();
    assert_eq!(mock.live_target_count(), 0);
    assert_eq!(mock.released_targets().len(), 1);
}
