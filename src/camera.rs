use glam::{Mat4, Vec2, Vec3, Vec4};

/// Projection uniform uploaded to the GPU: a single column-major 4×4 matrix.
///
/// Every pass that draws in world or screen space binds one of these at
/// group 0. Layout (column-major, matching WGSL `mat4x4<f32>`):
/// ```text
/// col0: [sx,  0,   0,  0]
/// col1: [0,   sy,  0,  0]
/// col2: [0,   0,   1,  0]
/// col3: [tx,  ty,  0,  1]
/// ```
/// `sy` is negative: pixel Y grows downward while clip Y grows upward, so UV
/// and pixel origin (0, 0) are both top-left. Z passes through unchanged.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    /// Plain orthographic projection (no camera transform).
    /// Maps pixel coords [0..w] × [0..h] directly to clip space.
    pub fn identity_ortho(width: f32, height: f32) -> Self {
        Self { view_proj: orthographic_projection(width, height) }
    }

    pub fn from_mat4(m: Mat4) -> Self {
        Self { view_proj: m.to_cols_array_2d() }
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view_proj)
    }

    /// Clip-space position of `world`, which is what the vertex stages compute as
    /// `projection * vec4(world, 1.0)`.
    pub fn project(&self, world: Vec3) -> Vec4 {
        self.to_mat4() * world.extend(1.0)
    }
}

/// Orthographic projection (column-major) mapping pixel coords to clip space.
pub fn orthographic_projection(width: f32, height: f32) -> [[f32; 4]; 4] {
    let width = width.max(1.0);
    let height = height.max(1.0);
    [
        [2.0 / width, 0.0,           0.0, 0.0],
        [0.0,         -2.0 / height, 0.0, 0.0],
        [0.0,         0.0,           1.0, 0.0],
        [-1.0,        1.0,           0.0, 1.0],
    ]
}

/// 2D camera: a world-space pixel position with smooth zoom.
///
/// Produces the view-projection consumed by the layered tile passes.
#[derive(Clone, Debug)]
pub struct Camera {
    /// World-space pixel position the camera is centered on.
    pub position: Vec2,
    /// Current zoom level (1.0 = 1:1, >1 zooms in, <1 zooms out).
    pub zoom: f32,
    target_zoom: f32,
}

impl Camera {
    pub fn new(center_x: f32, center_y: f32) -> Self {
        Self { position: Vec2::new(center_x, center_y), zoom: 1.0, target_zoom: 1.0 }
    }

    /// Set the zoom level the camera eases toward on subsequent ticks.
    pub fn set_target_zoom(&mut self, zoom: f32) {
        self.target_zoom = zoom.max(0.01);
    }

    /// Advance smooth zoom by `dt` seconds (converges at ~8× per second).
    pub fn tick(&mut self, dt: f32) {
        let speed = 8.0_f32;
        self.zoom += (self.target_zoom - self.zoom) * (speed * dt).min(1.0);
    }

    /// Build the view-projection for the given viewport dimensions.
    ///
    /// Derivation (y-down pixel space → NDC):
    /// ```text
    /// x_ndc = sx * world_x + tx    (sx = 2z/w,  tx = -sx*cx)
    /// y_ndc = sy * world_y + ty    (sy = -2z/h, ty = -sy*cy)
    /// ```
    pub fn build_view_proj(&self, width: f32, height: f32) -> CameraUniform {
        let z = self.zoom.max(0.01);
        let sx = 2.0 * z / width.max(1.0);
        let sy = -2.0 * z / height.max(1.0);
        let tx = -sx * self.position.x;
        let ty = -sy * self.position.y;

        CameraUniform {
            view_proj: [
                [sx,  0.0, 0.0, 0.0],
                [0.0, sy,  0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [tx,  ty,  0.0, 1.0],
            ],
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ortho_maps_corners_to_clip_corners() {
        let p = CameraUniform::identity_ortho(800.0, 600.0);
        let tl = p.project(Vec3::new(0.0, 0.0, 0.0));
        let br = p.project(Vec3::new(800.0, 600.0, 0.0));
        assert_relative_eq!(tl.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(tl.y, 1.0, epsilon = 1e-5);
        assert_relative_eq!(br.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(br.y, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn ortho_passes_depth_through() {
        let p = CameraUniform::identity_ortho(800.0, 600.0);
        assert_relative_eq!(p.project(Vec3::new(10.0, 10.0, 0.25)).z, 0.25, epsilon = 1e-5);
    }

    #[test]
    fn camera_center_lands_at_clip_origin() {
        let mut cam = Camera::new(320.0, 200.0);
        cam.zoom = 2.0;
        let clip = cam.build_view_proj(640.0, 400.0).project(Vec3::new(320.0, 200.0, 0.0));
        assert_relative_eq!(clip.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(clip.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn camera_at_half_viewport_matches_ortho() {
        let cam = Camera::new(400.0, 300.0);
        let a = cam.build_view_proj(800.0, 600.0).to_mat4();
        let b = CameraUniform::identity_ortho(800.0, 600.0).to_mat4();
        assert!(a.abs_diff_eq(b, 1e-6));
    }

    #[test]
    fn zoom_eases_toward_target() {
        let mut cam = Camera::new(0.0, 0.0);
        cam.set_target_zoom(2.0);
        cam.tick(0.05);
        assert!(cam.zoom > 1.0 && cam.zoom < 2.0);
        cam.tick(1.0);
        assert_relative_eq!(cam.zoom, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn mat4_round_trip_preserves_columns() {
        let p = CameraUniform::identity_ortho(320.0, 240.0);
        assert_eq!(CameraUniform::from_mat4(p.to_mat4()), p);
    }
}
