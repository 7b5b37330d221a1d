use crate::config::CameraConfig;
use glam::{Mat4, Vec3};
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// View and projection for one frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CameraMatrices {
    pub view: Mat4,
    pub proj: Mat4,
    pub inv_proj: Mat4,
}

pub struct CameraController {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,

    fov: f32,
    near: f32,
    far: f32,
    move_speed: f32,
    mouse_sensitivity: f32,

    // 入力状態
    is_forward_pressed: bool,
    is_backward_pressed: bool,
    is_left_pressed: bool,
    is_right_pressed: bool,
    is_up_pressed: bool,
    is_down_pressed: bool,
    is_fast_pressed: bool,

    is_left_turn_pressed: bool,
    is_right_turn_pressed: bool,
    is_up_turn_pressed: bool,
    is_down_turn_pressed: bool,

    // マウス: 右ボタンを押している間だけ視点操作
    is_mouse_look: bool,
    last_cursor: Option<(f64, f64)>,
    pending_rotation: (f32, f32),
}

impl CameraController {
    pub fn new(config: &CameraConfig) -> Self {
        let eye = Vec3::from(config.eye);
        let forward = (Vec3::from(config.target) - eye).normalize_or(Vec3::NEG_Z);

        Self {
            position: eye,
            yaw: forward.z.atan2(forward.x),
            pitch: forward.y.clamp(-1.0, 1.0).asin(),

            fov: config.fov,
            near: config.near,
            far: config.far,
            move_speed: config.move_speed,
            mouse_sensitivity: config.mouse_sensitivity,

            is_forward_pressed: false,
            is_backward_pressed: false,
            is_left_pressed: false,
            is_right_pressed: false,
            is_up_pressed: false,
            is_down_pressed: false,
            is_fast_pressed: false,
            is_left_turn_pressed: false,
            is_right_turn_pressed: false,
            is_up_turn_pressed: false,
            is_down_turn_pressed: false,

            is_mouse_look: false,
            last_cursor: None,
            pending_rotation: (0.0, 0.0),
        }
    }

    /// True while the user is steering the camera with the pointer.
    pub fn is_engaged(&self) -> bool {
        self.is_mouse_look
    }

    pub fn forward(&self) -> Vec3 {
        let (sin_y, cos_y) = self.yaw.sin_cos();
        let (sin_p, cos_p) = self.pitch.sin_cos();
        Vec3::new(cos_p * cos_y, sin_p, cos_p * sin_y).normalize()
    }

    /// Returns true when the event was consumed.
    pub fn process_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } => {
                let is_pressed = key_event.state.is_pressed();
                match key_event.physical_key {
                    PhysicalKey::Code(KeyCode::KeyW) => self.is_forward_pressed = is_pressed,
                    PhysicalKey::Code(KeyCode::KeyS) => self.is_backward_pressed = is_pressed,
                    PhysicalKey::Code(KeyCode::KeyA) => self.is_left_pressed = is_pressed,
                    PhysicalKey::Code(KeyCode::KeyD) => self.is_right_pressed = is_pressed,
                    PhysicalKey::Code(KeyCode::Space) | PhysicalKey::Code(KeyCode::KeyE) => {
                        self.is_up_pressed = is_pressed
                    }
                    PhysicalKey::Code(KeyCode::KeyQ) => self.is_down_pressed = is_pressed,
                    PhysicalKey::Code(KeyCode::ShiftLeft) => self.is_fast_pressed = is_pressed,
                    PhysicalKey::Code(KeyCode::ArrowLeft) => self.is_left_turn_pressed = is_pressed,
                    PhysicalKey::Code(KeyCode::ArrowRight) => {
                        self.is_right_turn_pressed = is_pressed
                    }
                    PhysicalKey::Code(KeyCode::ArrowUp) => self.is_up_turn_pressed = is_pressed,
                    PhysicalKey::Code(KeyCode::ArrowDown) => self.is_down_turn_pressed = is_pressed,
                    _ => return false,
                }
                true
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Right,
                ..
            } => {
                self.is_mouse_look = *state == ElementState::Pressed;
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let current = (position.x, position.y);
                if let (true, Some(last)) = (self.is_mouse_look, self.last_cursor) {
                    self.pending_rotation.0 += (current.0 - last.0) as f32;
                    self.pending_rotation.1 += (current.1 - last.1) as f32;
                }
                self.last_cursor = Some(current);
                self.is_mouse_look
            }
            WindowEvent::Focused(false) => {
                self.release_all();
                false
            }
            _ => false,
        }
    }

    // フォーカスを失うとキーの離し操作が届かない
    fn release_all(&mut self) {
        self.is_forward_pressed = false;
        self.is_backward_pressed = false;
        self.is_left_pressed = false;
        self.is_right_pressed = false;
        self.is_up_pressed = false;
        self.is_down_pressed = false;
        self.is_fast_pressed = false;
        self.is_left_turn_pressed = false;
        self.is_right_turn_pressed = false;
        self.is_up_turn_pressed = false;
        self.is_down_turn_pressed = false;
        self.is_mouse_look = false;
        self.pending_rotation = (0.0, 0.0);
    }

    /// Apply buffered input. Returns true if the camera moved or turned.
    pub fn update_camera(&mut self, dt: std::time::Duration) -> bool {
        let dt_secs = dt.as_secs_f32();
        let boost = if self.is_fast_pressed { 4.0 } else { 1.0 };
        let speed = self.move_speed * boost * dt_secs;
        let rotate_speed = 1.5 * dt_secs;

        let mut moved = false;

        // 右ボタンを離している間は入力を無視する
        if !self.is_mouse_look {
            self.pending_rotation = (0.0, 0.0);
            self.pitch = self.pitch.clamp(-1.5, 1.5);
            return false;
        }

        // 回転の更新
        let (dx, dy) = std::mem::take(&mut self.pending_rotation);
        if dx != 0.0 || dy != 0.0 {
            self.yaw += dx * self.mouse_sensitivity;
            self.pitch -= dy * self.mouse_sensitivity;
            moved = true;
        }
        if self.is_right_turn_pressed {
            self.yaw += rotate_speed;
            moved = true;
        }
        if self.is_left_turn_pressed {
            self.yaw -= rotate_speed;
            moved = true;
        }
        if self.is_up_turn_pressed {
            self.pitch += rotate_speed;
            moved = true;
        }
        if self.is_down_turn_pressed {
            self.pitch -= rotate_speed;
            moved = true;
        }

        // クランプ (真上・真下を見過ぎないように)
        self.pitch = self.pitch.clamp(-1.5, 1.5);

        let forward = self.forward();
        let right = forward.cross(Vec3::Y).normalize();
        let up = Vec3::Y;

        // 移動の更新
        let mut direction = Vec3::ZERO;
        if self.is_forward_pressed {
            direction += forward;
        }
        if self.is_backward_pressed {
            direction -= forward;
        }
        if self.is_right_pressed {
            direction += right;
        }
        if self.is_left_pressed {
            direction -= right;
        }
        if self.is_up_pressed {
            direction += up;
        }
        if self.is_down_pressed {
            direction -= up;
        }
        if direction != Vec3::ZERO {
            self.position += direction * speed;
            moved = true;
        }

        moved
    }

    pub fn matrices(&self, aspect: f32) -> CameraMatrices {
        let view = Mat4::look_to_rh(self.position, self.forward(), Vec3::Y);
        let proj = Mat4::perspective_rh(self.fov, aspect, self.near, self.far);
        CameraMatrices {
            view,
            proj,
            inv_proj: proj.inverse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn initial_orientation_looks_at_target() {
        let config = CameraConfig::default();
        let cam = CameraController::new(&config);
        let expected = (Vec3::from(config.target) - Vec3::from(config.eye)).normalize();
        assert!(cam.forward().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn idle_camera_does_not_move() {
        let mut cam = CameraController::new(&CameraConfig::default());
        let before = cam.position;
        assert!(!cam.update_camera(Duration::from_millis(16)));
        assert_eq!(cam.position, before);
    }

    #[test]
    fn view_matrix_maps_eye_to_origin() {
        let cam = CameraController::new(&CameraConfig::default());
        let m = cam.matrices(1.0);
        assert!(m.view.transform_point3(cam.position).abs_diff_eq(Vec3::ZERO, 1e-5));
        assert!((m.proj * m.inv_proj).abs_diff_eq(Mat4::IDENTITY, 1e-4));
    }

    fn press(cam: &mut CameraController, key: KeyCode) {
        cam.is_mouse_look = true;
        match key {
            KeyCode::KeyW => cam.is_forward_pressed = true,
            KeyCode::Space => cam.is_up_pressed = true,
            _ => unreachable!(),
        }
    }

    #[test]
    fn keys_are_ignored_until_engaged() {
        let mut cam = CameraController::new(&CameraConfig::default());
        cam.is_forward_pressed = true;
        assert!(!cam.is_engaged());
        assert!(!cam.update_camera(Duration::from_secs(1)));
        assert_eq!(cam.position, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn forward_moves_along_view_direction() {
        let mut cam = CameraController::new(&CameraConfig::default());
        press(&mut cam, KeyCode::KeyW);
        let dir = cam.forward();
        assert!(cam.update_camera(Duration::from_secs(1)));
        let expected = Vec3::new(0.0, 2.0, 0.0) + dir * 2.0;
        assert!(cam.position.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn space_moves_straight_up() {
        let mut cam = CameraController::new(&CameraConfig::default());
        press(&mut cam, KeyCode::Space);
        cam.update_camera(Duration::from_millis(500));
        assert!(cam.position.abs_diff_eq(Vec3::new(0.0, 3.0, 0.0), 1e-5));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = CameraController::new(&CameraConfig::default());
        cam.pitch = 3.0;
        cam.update_camera(Duration::ZERO);
        assert_eq!(cam.pitch, 1.5);
    }
}
