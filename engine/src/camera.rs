use cgmath::{vec2, vec3, Deg, InnerSpace, Quaternion, Rad, Rotation3, Vector2, Vector3};

pub const DEFAULT_FOV_Y: Deg<f32> = Deg(60.0);

/// World-space ray leaving the camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraRay {
    pub origin: Vector3<f32>,
    /// Unit length.
    pub direction: Vector3<f32>,
}

/// First-person perspective camera. Orientation is yaw (around +Y) followed by
/// pitch (around the local X axis), the same Euler order pointer-lock look uses.
#[derive(Clone, Debug, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vector3<f32>,
    pub yaw: Rad<f32>,
    pub pitch: Rad<f32>,
    pub fov_y: Deg<f32>,
    viewport: Vector2<f32>,
}

impl PerspectiveCamera {
    pub fn new(position: Vector3<f32>, viewport: Vector2<f32>) -> PerspectiveCamera {
        PerspectiveCamera {
            position,
            yaw: Rad(0.0),
            pitch: Rad(0.0),
            fov_y: DEFAULT_FOV_Y,
            viewport: sanitize_viewport(viewport),
        }
    }

    pub fn viewport(&self) -> Vector2<f32> {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = sanitize_viewport(vec2(width, height));
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.x / self.viewport.y
    }

    pub fn rotation(&self) -> Quaternion<f32> {
        Quaternion::from_angle_y(self.yaw) * Quaternion::from_angle_x(self.pitch)
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.rotation() * vec3(0.0, 0.0, -1.0)
    }

    pub fn right(&self) -> Vector3<f32> {
        self.rotation() * vec3(1.0, 0.0, 0.0)
    }

    pub fn up(&self) -> Vector3<f32> {
        self.rotation() * vec3(0.0, 1.0, 0.0)
    }

    /// Horizontal forward direction; pitch does not tilt walking.
    pub fn walk_forward(&self) -> Vector3<f32> {
        Quaternion::from_angle_y(self.yaw) * vec3(0.0, 0.0, -1.0)
    }

    pub fn walk_right(&self) -> Vector3<f32> {
        Quaternion::from_angle_y(self.yaw) * vec3(1.0, 0.0, 0.0)
    }

    pub fn move_forward(&mut self, distance: f32) {
        self.position += self.walk_forward() * distance;
    }

    pub fn move_right(&mut self, distance: f32) {
        self.position += self.walk_right() * distance;
    }

    /// Apply a look delta, keeping pitch inside `[-max_pitch, max_pitch]`.
    pub fn rotate(&mut self, delta_yaw: Rad<f32>, delta_pitch: Rad<f32>, max_pitch: Rad<f32>) {
        self.yaw += delta_yaw;
        self.pitch = Rad((self.pitch + delta_pitch).0.clamp(-max_pitch.0, max_pitch.0));
    }

    /// Pixel coordinates (origin top-left) to normalized device coordinates.
    pub fn screen_to_ndc(&self, screen_x: f32, screen_y: f32) -> Vector2<f32> {
        vec2(
            (screen_x / self.viewport.x) * 2.0 - 1.0,
            -(screen_y / self.viewport.y) * 2.0 + 1.0,
        )
    }

    /// Ray from the eye through the given pixel.
    pub fn ray_through_screen_point(&self, screen_x: f32, screen_y: f32) -> CameraRay {
        let ndc = self.screen_to_ndc(screen_x, screen_y);
        let tan_half_fov = (Rad::from(self.fov_y).0 * 0.5).tan();

        let direction = self.forward()
            + self.right() * (ndc.x * tan_half_fov * self.aspect())
            + self.up() * (ndc.y * tan_half_fov);

        CameraRay {
            origin: self.position,
            direction: direction.normalize(),
        }
    }
}

fn sanitize_viewport(viewport: Vector2<f32>) -> Vector2<f32> {
    let clamp = |v: f32| if v.is_finite() && v >= 1.0 { v } else { 1.0 };
    vec2(clamp(viewport.x), clamp(viewport.y))
}
