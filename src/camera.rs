use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

use crate::scene::Aabb;

const FOVY_DEG: f32 = 45.0;
const MIN_DISTANCE: f32 = 0.1;
const MAX_DISTANCE: f32 = 500.0;
const PITCH_LIMIT: f32 = 1.5;

/// Target/distance/yaw/pitch of an orbit camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitPose {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for OrbitPose {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 10.0,
            yaw: 0.6,
            pitch: 0.45,
        }
    }
}

/// Orbit camera with perspective projection, remembering the pose to reset to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub pose: OrbitPose,
    home: OrbitPose,
    pub near: f32,
    pub far: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(OrbitPose::default())
    }
}

impl OrbitCamera {
    pub fn new(pose: OrbitPose) -> Self {
        Self {
            pose,
            home: pose,
            near: 0.01,
            far: 1000.0,
        }
    }

    pub fn home(&self) -> OrbitPose {
        self.home
    }

    /// Back to the pose set by [`OrbitCamera::new`] or the last [`OrbitCamera::frame`].
    pub fn reset(&mut self) {
        self.pose = self.home;
    }

    /// Aim at `bounds` from a distance that keeps the whole box in view and
    /// make that the new home pose.
    pub fn frame(&mut self, bounds: Aabb) {
        let radius = bounds.radius().max(0.01);
        let distance = radius / (0.5 * FOVY_DEG.to_radians()).sin() * 1.1;
        self.home = OrbitPose {
            target: bounds.center(),
            distance: distance.clamp(MIN_DISTANCE, MAX_DISTANCE),
            ..OrbitPose::default()
        };
        self.pose = self.home;
    }

    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.pose.yaw = (self.pose.yaw + delta_yaw) % std::f32::consts::TAU;
        self.pose.pitch = (self.pose.pitch + delta_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Multiply the distance by `factor` (< 1 zooms in).
    pub fn zoom(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.pose.distance = (self.pose.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
        }
    }

    /// Move the target in the view plane; `delta` is in fractions of the view height.
    pub fn pan(&mut self, delta: Vec2) {
        let (_, right, up) = self.basis();
        let half_h = (0.5 * FOVY_DEG.to_radians()).tan() * self.pose.distance;
        self.pose.target += (-right * delta.x + up * delta.y) * half_h * 2.0;
    }

    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.pose.yaw.sin_cos();
        let (sp, cp) = self.pose.pitch.sin_cos();
        let d = self.pose.distance;
        self.pose.target + Vec3::new(d * cp * sy, d * sp, d * cp * cy)
    }

    /// (forward, right, up), all normalized.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = (self.pose.target - self.eye()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        (forward, right, up)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.pose.target, Vec3::Y)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        Mat4::perspective_rh(FOVY_DEG.to_radians(), aspect, self.near, self.far) * self.view()
    }

    /// Project a world point to viewport pixels (origin top-left). Returns the
    /// pixel position and view depth, `None` behind the camera.
    pub fn project(&self, view_proj: &Mat4, point: Vec3, viewport: Vec2) -> Option<(Vec2, f32)> {
        let clip = *view_proj * point.extend(1.0);
        if clip.w <= self.near {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        let px = Vec2::new(
            (ndc.x * 0.5 + 0.5) * viewport.x,
            (1.0 - (ndc.y * 0.5 + 0.5)) * viewport.y,
        );
        Some((px, clip.w))
    }

    /// World-space ray through a viewport pixel.
    pub fn ray(&self, cursor: Vec2, viewport: Vec2) -> Option<(Vec3, Vec3)> {
        if viewport.x <= 1.0 || viewport.y <= 1.0 {
            return None;
        }
        let x_ndc = (cursor.x / viewport.x) * 2.0 - 1.0;
        let y_ndc = 1.0 - (cursor.y / viewport.y) * 2.0;
        let half_h = (0.5 * FOVY_DEG.to_radians()).tan();
        let half_w = half_h * viewport.x / viewport.y;
        let (forward, right, up) = self.basis();
        let dir = (forward + right * (x_ndc * half_w) + up * (y_ndc * half_h)).normalize_or_zero();
        Some((self.eye(), dir))
    }
}
