use glam::{Mat4, Vec2, Vec3};

/// Perspective camera looking at the origin.
///
/// The ball pit's containment box is derived from it: the visible world size at
/// the origin plane becomes the simulation's horizontal and vertical bounds.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            target: Vec3::ZERO,
            fov_degrees: 50.0,
            aspect: 1.0,
            near: 0.1,
            far: 2000.0,
        }
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    /// Visible width and height of the plane through the origin.
    pub fn world_size(&self) -> Vec2 {
        let height = 2.0 * (self.fov_degrees.to_radians() / 2.0).tan() * self.position.length();
        Vec2::new(height * self.aspect, height)
    }

    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Casts a ray through a normalized screen position and intersects it with
    /// the camera-facing plane through the origin.
    ///
    /// Returns `None` when the ray runs parallel to or away from the plane.
    pub fn unproject_onto_plane(&self, normalized: Vec2) -> Option<Vec3> {
        let inverse = self.view_projection().inverse();
        let on_ray = inverse.project_point3(Vec3::new(normalized.x, normalized.y, 0.5));
        let origin = self.position;
        let ray = (on_ray - origin).normalize_or_zero();

        let normal = self.direction();
        let denominator = normal.dot(ray);
        if denominator.abs() < f32::EPSILON {
            return None;
        }

        let t = -normal.dot(origin) / denominator;
        if t < 0.0 {
            return None;
        }
        Some(origin + ray * t)
    }
}
