use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, MouseScrollDelta},
};

use crate::config::CameraConfig;

use super::orbit_camera::OrbitCamera;

/// Turns mouse input into damped orbit motion
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    /// Fraction of the pending rotation applied each frame; 0 applies it at once
    pub damping: f32,
    /// Orbit speed while auto-rotating; 2.0 is one turn every 30 seconds
    pub auto_rotate_speed: f32,
    pending_yaw: f32,
    pending_pitch: f32,
    is_mouse_pressed: bool,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            damping: 0.0,
            auto_rotate_speed: 2.0,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            is_mouse_pressed: false,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            damping: config.damping.clamp(0.0, 1.0),
            auto_rotate_speed: config.auto_rotate_speed,
            ..Self::new(config.rotate_speed, config.zoom_speed)
        }
    }

    pub fn process_events(&mut self, event: &DeviceEvent, camera: &mut OrbitCamera) {
        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
            }
            DeviceEvent::MouseWheel { delta, .. } => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32
                    }
                };
                self.zoom(scroll_amount, camera);
            }
            DeviceEvent::MouseMotion { delta } => {
                if self.is_mouse_pressed {
                    self.drag(delta.0 as f32, delta.1 as f32);
                }
            }
            _ => (),
        }
    }

    /// Releases the drag, e.g. when the overlay grabs the mouse
    pub fn release(&mut self) {
        self.is_mouse_pressed = false;
    }

    /// Queues a rotation for a mouse drag of `dx`, `dy` pixels
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.pending_yaw -= dx * self.rotate_speed;
        self.pending_pitch += dy * self.rotate_speed;
    }

    pub fn zoom(&mut self, amount: f32, camera: &mut OrbitCamera) {
        camera.add_distance(amount * self.zoom_speed);
    }

    /// Advances the camera by one frame
    pub fn update(&mut self, dt: f32, auto_rotate: bool, camera: &mut OrbitCamera) {
        if auto_rotate {
            let angular_speed = std::f32::consts::TAU / 60.0 * self.auto_rotate_speed;
            camera.add_yaw(angular_speed * dt);
        }

        if self.damping > 0.0 {
            camera.add_yaw(self.pending_yaw * self.damping);
            camera.add_pitch(self.pending_pitch * self.damping);
            self.pending_yaw *= 1.0 - self.damping;
            self.pending_pitch *= 1.0 - self.damping;
        } else {
            camera.add_yaw(self.pending_yaw);
            camera.add_pitch(self.pending_pitch);
            self.pending_yaw = 0.0;
            self.pending_pitch = 0.0;
        }
    }

    /// Drops any rotation still in flight
    pub fn stop(&mut self) {
        self.pending_yaw = 0.0;
        self.pending_pitch = 0.0;
    }
}
