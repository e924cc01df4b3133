/// Tests for Mirror
///
/// These tests validate the lifecycle state machine, reflection camera
/// creation and posing, rendering with culling inversion, and release of
/// owned resources.

use glam::{Mat4, Quat, Vec3};
use crate::camera::{Camera, CameraKey, CameraSet};
use crate::error::Error;
use crate::renderer::RenderTargetDesc;
use crate::renderer::mock_renderer::{MockRenderer, TargetContents};
use crate::scene::MirrorSurface;
use super::*;

fn assert_vec3_near(a: Vec3, b: Vec3) {
    assert!(a.abs_diff_eq(b, 1e-4), "{:?} != {:?}", a, b);
}

/// 2×2 mirror at the origin facing +Z
fn facing_mirror(name: &str) -> Mirror {
    let world = Mat4::from_quat(Quat::from_rotation_x(std::f32::consts::FRAC_PI_2));
    Mirror::new(name, MirrorSurface::plane(world, 2.0, 2.0))
}

/// Main camera at (0, 0, 5) looking at the origin
fn setup() -> (CameraSet, CameraKey, MockRenderer) {
    let mut cameras = CameraSet::new();
    let mut camera = Camera::perspective("Main Camera", std::f32::consts::FRAC_PI_3, 1.0, 0.1, 100.0);
    camera.set_position(Vec3::new(0.0, 0.0, 5.0));
    let main = cameras.insert(camera);
    (cameras, main, MockRenderer::new())
}

// ============================================================================
// Initialization
// ============================================================================

#[test]
fn test_new_mirror_is_idle() {
    let mirror = facing_mirror("A");
    assert_eq!(mirror.state(), MirrorState::Idle);
    assert!(!mirror.is_live());
    assert!(mirror.source_camera().is_none());
    assert!(mirror.render_target().is_none());
    assert!(matches!(mirror.reflection_camera(), Err(Error::InvalidState(_))));
}

#[test]
fn test_initialize_creates_camera_and_target() {
    let (mut cameras, main, mut renderer) = setup();
    let mut mirror = facing_mirror("A");

    mirror.initialize(main, &mut cameras, &mut renderer, &RenderTargetDesc::default()).unwrap();

    assert_eq!(mirror.state(), MirrorState::Initialized);
    assert_eq!(mirror.source_camera(), Some(main));
    assert_eq!(cameras.len(), 2);
    assert_eq!(renderer.live_target_count(), 1);

    let camera = cameras.camera(mirror.reflection_camera().unwrap()).unwrap();
    assert_eq!(camera.name(), "A Camera");
    assert_eq!(camera.priority(), -1);
    assert_eq!(camera.target(), mirror.render_target());
    assert_eq!(mirror.surface().texture(), mirror.render_target());

    // Starts on the mirror, looking out along its normal
    assert_vec3_near(camera.position(), Vec3::ZERO);
    assert_vec3_near(camera.forward(), Vec3::Z);
}

#[test]
fn test_initialize_twice_fails() {
    let (mut cameras, main, mut renderer) = setup();
    let mut mirror = facing_mirror("A");
    mirror.initialize(main, &mut cameras, &mut renderer, &RenderTargetDesc::default()).unwrap();

    let result = mirror.initialize(main, &mut cameras, &mut renderer, &RenderTargetDesc::default());

    assert!(matches!(result, Err(Error::InvalidState(_))));
    assert_eq!(cameras.len(), 2);
    assert_eq!(renderer.live_target_count(), 1);
}

#[test]
fn test_initialize_with_failing_allocation_stays_idle() {
    let (mut cameras, main, mut renderer) = setup();
    renderer.set_fail_allocation(true);
    let mut mirror = facing_mirror("A");

    let result = mirror.initialize(main, &mut cameras, &mut renderer, &RenderTargetDesc::default());

    assert!(result.is_err());
    assert_eq!(mirror.state(), MirrorState::Idle);
    assert_eq!(cameras.len(), 1);
}

#[test]
fn test_initialize_with_stale_source_fails() {
    let (mut cameras, main, mut renderer) = setup();
    cameras.remove(main);
    let mut mirror = facing_mirror("A");

    let result = mirror.initialize(main, &mut cameras, &mut renderer, &RenderTargetDesc::default());

    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert_eq!(renderer.live_target_count(), 0);
}

#[test]
fn test_custom_render_target_size() {
    let (mut cameras, main, mut renderer) = setup();
    let mut mirror = facing_mirror("A");
    mirror.initialize(main, &mut cameras, &mut renderer, &RenderTargetDesc::square(128)).unwrap();

    let target = renderer.target(mirror.render_target().unwrap()).unwrap();
    assert_eq!(target.desc.width, 128);
    assert_eq!(target.desc.height, 128);
}

// ============================================================================
// Precondition failures
// ============================================================================

#[test]
fn test_render_before_initialize_fails() {
    let (cameras, _, mut renderer) = setup();
    let mirror = facing_mirror("A");

    let result = mirror.render(&cameras, &mut renderer);

    assert!(matches!(result, Err(Error::InvalidState(_))));
    assert!(renderer.renders().is_empty());
}

#[test]
fn test_destroy_before_initialize_fails() {
    let (mut cameras, _, mut renderer) = setup();
    let mut mirror = facing_mirror("A");

    let result = mirror.destroy(&mut cameras, &mut renderer);

    assert!(matches!(result, Err(Error::InvalidState(_))));
    assert_eq!(mirror.state(), MirrorState::Idle);
}

#[test]
fn test_update_pose_before_initialize_fails() {
    let (mut cameras, _, _) = setup();
    let mut mirror = facing_mirror("A");
    assert!(matches!(mirror.update_pose(&mut cameras), Err(Error::InvalidState(_))));
}

// ============================================================================
// Per-frame operations
// ============================================================================

#[test]
fn test_update_pose_reflects_source() {
    let (mut cameras, main, mut renderer) = setup();
    let mut mirror = facing_mirror("A");
    mirror.initialize(main, &mut cameras, &mut renderer, &RenderTargetDesc::default()).unwrap();

    mirror.update_pose(&mut cameras).unwrap();

    assert_eq!(mirror.state(), MirrorState::Active);
    let camera = cameras.camera(mirror.reflection_camera().unwrap()).unwrap();
    assert_vec3_near(camera.position(), Vec3::new(0.0, 0.0, -5.0));
    assert_vec3_near(camera.forward(), Vec3::Z);
    assert!(camera.is_projection_mirrored());

    // Source untouched
    assert_eq!(cameras.camera(main).unwrap().position(), Vec3::new(0.0, 0.0, 5.0));
}

#[test]
fn test_update_pose_follows_source_camera_change() {
    let (mut cameras, main, mut renderer) = setup();
    let mut mirror = facing_mirror("A");
    mirror.initialize(main, &mut cameras, &mut renderer, &RenderTargetDesc::default()).unwrap();

    cameras.camera_mut(main).unwrap().set_position(Vec3::new(1.0, 2.0, 3.0));
    mirror.update_pose(&mut cameras).unwrap();

    let camera = cameras.camera(mirror.reflection_camera().unwrap()).unwrap();
    assert_vec3_near(camera.position(), Vec3::new(1.0, 2.0, -3.0));
}

#[test]
fn test_render_inverts_culling_for_one_draw() {
    let (mut cameras, main, mut renderer) = setup();
    let mut mirror = facing_mirror("A");
    mirror.initialize(main, &mut cameras, &mut renderer, &RenderTargetDesc::default()).unwrap();
    mirror.update_pose(&mut cameras).unwrap();

    mirror.render(&cameras, &mut renderer).unwrap();

    let call = &renderer.renders()[0];
    assert_eq!(call.camera, "A Camera");
    assert!(call.mirrored);
    assert!(call.inverted);
    assert!(!renderer.invert_culling());

    let target = renderer.target(mirror.render_target().unwrap()).unwrap();
    assert_eq!(target.contents, TargetContents::Rendered("A Camera".to_string()));
}

// ============================================================================
// Destruction
// ============================================================================

#[test]
fn test_destroy_releases_resources() {
    let (mut cameras, main, mut renderer) = setup();
    let mut mirror = facing_mirror("A");
    mirror.initialize(main, &mut cameras, &mut renderer, &RenderTargetDesc::default()).unwrap();
    let target = mirror.render_target().unwrap();

    mirror.destroy(&mut cameras, &mut renderer).unwrap();

    assert_eq!(mirror.state(), MirrorState::Destroyed);
    assert_eq!(renderer.live_target_count(), 0);
    assert_eq!(renderer.released_targets(), &[target]);
    assert_eq!(cameras.len(), 1);
    assert!(mirror.surface().texture().is_none());
}

#[test]
fn test_destroy_twice_is_noop() {
    let (mut cameras, main, mut renderer) = setup();
    let mut mirror = facing_mirror("A");
    mirror.initialize(main, &mut cameras, &mut renderer, &RenderTargetDesc::default()).unwrap();

    mirror.destroy(&mut cameras, &mut renderer).unwrap();
    mirror.destroy(&mut cameras, &mut renderer).unwrap();

    assert_eq!(renderer.released_targets().len(), 1);
}

#[test]
fn test_render_after_destroy_fails() {
    let (mut cameras, main, mut renderer) = setup();
    let mut mirror = facing_mirror("A");
    mirror.initialize(main, &mut cameras, &mut renderer, &RenderTargetDesc::default()).unwrap();
    mirror.destroy(&mut cameras, &mut renderer).unwrap();

    assert!(matches!(mirror.render(&cameras, &mut renderer), Err(Error::InvalidState(_))));
}
