use cgmath::*;

use crate::config::CameraConfig;

use super::camera_utils::{Camera, CameraUniform};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Camera orbiting a fixed target, Y up.
///
/// `pitch` is the elevation above the horizontal plane, so a polar angle `p`
/// measured from +Y corresponds to a pitch of `PI / 2 - p`.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
    home: (f32, f32, f32),
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.target);
        let view = Matrix4::look_at_rh(eye, target, self.up);
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(), // Will be auto-calculated in `update()` nevertheless.
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Rad(std::f32::consts::FRAC_PI_4),
            znear: 0.1,
            zfar: 1000.0,
            uniform: CameraUniform::default(),
            home: (distance, pitch, yaw),
        };
        camera.update();
        camera
    }

    /// Places the camera at `eye`, looking at `target`.
    ///
    /// The resulting pose is clamped into the bounds and becomes the home pose
    /// used by [`OrbitCamera::reset_to_default`].
    pub fn looking_at(
        eye: Vector3<f32>,
        target: Vector3<f32>,
        bounds: OrbitCameraBounds,
        aspect: f32,
    ) -> Self {
        let offset = eye - target;
        let distance = offset.magnitude().max(f32::EPSILON);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);

        let mut camera = Self::new(distance, pitch, yaw, target, aspect);
        camera.bounds = bounds;
        camera.distance = bounds.clamp_distance(distance);
        camera.pitch = pitch.clamp(bounds.min_pitch, bounds.max_pitch);
        camera.home = (camera.distance, camera.pitch, camera.yaw);
        camera.update();
        camera
    }

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self::looking_at(
            config.position.into(),
            config.target.into(),
            OrbitCameraBounds::from_config(config),
            aspect,
        );
        camera.fovy = Deg(config.fov_y).into();
        camera.znear = config.near;
        camera.zfar = config.far;
        camera
    }

    pub fn reset_to_default(&mut self) {
        (self.distance, self.pitch, self.yaw) = self.home;
        self.update();
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = self.bounds.clamp_distance(distance);
        self.update();
    }

    pub fn add_distance(&mut self, delta: f32) {
        let corrected_zoom = f32::log10(self.distance.max(1.0 + f32::EPSILON)) * delta;
        self.set_distance(self.distance + corrected_zoom);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw.rem_euclid(std::f32::consts::TAU);
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    /// Polar angle of the eye, measured from +Y
    pub fn polar_angle(&self) -> f32 {
        std::f32::consts::FRAC_PI_2 - self.pitch
    }

    /// Updates the camera after changing `distance`, `pitch` or `yaw`.
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = self.build_view_projection_matrix().into();
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl OrbitCameraBounds {
    /// Converts the polar angle limits of `config` into pitch limits
    pub fn from_config(config: &CameraConfig) -> Self {
        let half_pi = std::f32::consts::FRAC_PI_2;
        Self {
            min_distance: Some(config.min_distance),
            max_distance: Some(config.max_distance),
            min_pitch: half_pi - config.max_polar_angle,
            max_pitch: half_pi - config.min_polar_angle,
        }
    }

    fn clamp_distance(&self, distance: f32) -> f32 {
        distance.clamp(
            self.min_distance.unwrap_or(f32::EPSILON),
            self.max_distance.unwrap_or(f32::MAX),
        )
    }
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: None,
            max_distance: None,
            min_pitch: -std::f32::consts::FRAC_PI_2 + f32::EPSILON,
            max_pitch: std::f32::consts::FRAC_PI_2 - f32::EPSILON,
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn showroom_camera() -> OrbitCamera {
        OrbitCamera::from_config(&CameraConfig::default(), 1.5)
    }

    #[test]
    fn looking_at_reproduces_the_eye() {
        let camera = showroom_camera();
        assert!((camera.eye - Vector3::new(4.0, 5.0, 11.0)).magnitude() < 1e-4);
        assert!((camera.distance - 153f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn distance_stays_in_bounds() {
        let mut camera = showroom_camera();
        camera.set_distance(1.0);
        assert_eq!(camera.distance, 5.0);
        camera.add_distance(1000.0);
        assert_eq!(camera.distance, 20.0);
        assert!(((camera.eye - camera.target).magnitude() - 20.0).abs() < 1e-4);
    }

    #[test]
    fn polar_angle_stays_in_bounds() {
        let mut camera = showroom_camera();
        camera.add_pitch(10.0);
        assert!((camera.polar_angle() - 0.5).abs() < 1e-5);
        camera.add_pitch(-10.0);
        assert!((camera.polar_angle() - 1.5).abs() < 1e-5);
        // Never below the horizon
        assert!(camera.eye.y > camera.target.y);
    }

    #[test]
    fn reset_returns_home() {
        let mut camera = showroom_camera();
        let home = camera.eye;
        camera.add_yaw(1.3);
        camera.add_pitch(0.2);
        camera.add_distance(3.0);
        camera.reset_to_default();
        assert!((camera.eye - home).magnitude() < 1e-4);
    }

    #[test]
    fn view_projection_keeps_target_in_front() {
        let mut camera = showroom_camera();
        camera.update_view_proj();
        let m = camera.build_view_projection_matrix();
        let clip = m * camera.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(clip.w > 0.0);
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!((0.0..=1.0).contains(&ndc.z));
        assert_eq!(camera.uniform.view_position[3], 1.0);
    }
}
