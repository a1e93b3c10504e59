use glam::{Vec2, Vec3};
use partview::camera::{OrbitCamera, OrbitPose};
use partview::scene::Aabb;

#[test]
fn target_projects_to_viewport_center() {
    let camera = OrbitCamera::default();
    let viewport = Vec2::new(800.0, 600.0);
    let vp = camera.view_projection(viewport.x / viewport.y);
    let (px, depth) = camera.project(&vp, Vec3::ZERO, viewport).unwrap();
    assert!((px - viewport * 0.5).length() < 1e-2);
    assert!((depth - 10.0).abs() < 1e-3);
}

#[test]
fn ray_through_projected_point_hits_it() {
    let camera = OrbitCamera::new(OrbitPose {
        target: Vec3::new(1.0, 0.5, -2.0),
        distance: 8.0,
        yaw: -0.3,
        pitch: 0.2,
    });
    let viewport = Vec2::new(640.0, 480.0);
    let vp = camera.view_projection(viewport.x / viewport.y);
    let point = Vec3::new(2.0, 1.0, -1.5);
    let (px, _) = camera.project(&vp, point, viewport).unwrap();
    let (origin, dir) = camera.ray(px, viewport).unwrap();

    let to_point = point - origin;
    let closest = origin + dir * to_point.dot(dir);
    assert!((closest - point).length() < 1e-2);
}

#[test]
fn points_behind_the_camera_do_not_project() {
    let camera = OrbitCamera::default();
    let vp = camera.view_projection(1.0);
    let behind = camera.eye() + (camera.eye() - camera.pose.target);
    assert!(camera.project(&vp, behind, Vec2::new(100.0, 100.0)).is_none());
}

#[test]
fn frame_sets_home_and_reset_returns_to_it() {
    let mut camera = OrbitCamera::default();
    camera.frame(Aabb {
        min: Vec3::new(9.0, -1.0, -1.0),
        max: Vec3::new(11.0, 1.0, 1.0),
    });
    let home = camera.home();
    assert_eq!(home.target, Vec3::new(10.0, 0.0, 0.0));
    assert!(home.distance > 3f32.sqrt());

    camera.orbit(1.0, 0.3);
    camera.zoom(0.5);
    camera.pan(Vec2::new(0.1, 0.0));
    assert_ne!(camera.pose, home);
    camera.reset();
    assert_eq!(camera.pose, home);
}

#[test]
fn pitch_and_distance_are_clamped() {
    let mut camera = OrbitCamera::default();
    camera.orbit(0.0, 10.0);
    assert!(camera.pose.pitch <= 1.5);
    camera.zoom(1e-9);
    assert!(camera.pose.distance >= 0.1);
    let before = camera.pose.distance;
    camera.zoom(f32::NAN);
    camera.zoom(-2.0);
    assert_eq!(camera.pose.distance, before);
}

#[test]
fn degenerate_viewport_has_no_ray() {
    assert!(OrbitCamera::default().ray(Vec2::ZERO, Vec2::new(0.0, 0.0)).is_none());
}
