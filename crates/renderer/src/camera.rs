use winit::dpi::PhysicalSize;

/// Column-major 4×4 matrix, laid out the way a std140 `mat4` expects.
pub(crate) type Mat4 = [[f32; 4]; 4];

/// Extra scale padded onto the rounded mesh scale so rounding can never
/// open a seam between the plane edge and the viewport edge.
const SCALE_EPSILON: f32 = 0.01;

pub(crate) fn mat4_mul(a: Mat4, b: Mat4) -> Mat4 {
    let mut out = [[0.0; 4]; 4];
    for (col, b_col) in b.iter().enumerate() {
        for row in 0..4 {
            out[col][row] = (0..4).map(|k| a[k][row] * b_col[k]).sum();
        }
    }
    out
}

/// Right-handed perspective projection with wgpu's 0..1 depth range.
pub(crate) fn perspective(fov_y_radians: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = 1.0 / (fov_y_radians / 2.0).tan();
    let range = near - far;
    [
        [f / aspect, 0.0, 0.0, 0.0],
        [0.0, f, 0.0, 0.0],
        [0.0, 0.0, far / range, -1.0],
        [0.0, 0.0, near * far / range, 0.0],
    ]
}

pub(crate) fn translation_z(z: f32) -> Mat4 {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, z, 1.0],
    ]
}

pub(crate) fn scale_xy(x: f32, y: f32) -> Mat4 {
    [
        [x, 0.0, 0.0, 0.0],
        [0.0, y, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

pub(crate) fn transform_point(m: Mat4, p: [f32; 3]) -> [f32; 4] {
    let mut out = [0.0; 4];
    for row in 0..4 {
        out[row] =
            m[0][row] * p[0] + m[1][row] * p[1] + m[2][row] * p[2] + m[3][row];
    }
    out
}

/// Perspective camera tuned so one world unit equals one screen pixel at
/// the plane's depth.
///
/// The plane geometry is authored once at the startup viewport size; every
/// resize recomputes the camera distance, the aspect ratio, and a mesh
/// scale (rounded to two decimals plus [`SCALE_EPSILON`]) that stretches
/// the authored plane back over the new viewport.
#[derive(Debug, Clone)]
pub(crate) struct CameraRig {
    fov_y_radians: f32,
    authored: (f32, f32),
    viewport: PhysicalSize<u32>,
    distance: f32,
    mesh_scale: (f32, f32),
}

impl CameraRig {
    pub const FOV_Y_DEGREES: f32 = 45.0;

    pub fn new(viewport: PhysicalSize<u32>) -> Self {
        let authored = (viewport.width.max(1) as f32, viewport.height.max(1) as f32);
        let mut rig = Self {
            fov_y_radians: Self::FOV_Y_DEGREES.to_radians(),
            authored,
            viewport,
            distance: 0.0,
            mesh_scale: (1.0, 1.0),
        };
        rig.resize(viewport);
        rig
    }

    /// Width and height the plane geometry was authored at.
    pub fn authored_size(&self) -> (f32, f32) {
        self.authored
    }

    pub fn resize(&mut self, viewport: PhysicalSize<u32>) {
        if viewport.width == 0 || viewport.height == 0 {
            return;
        }
        self.viewport = viewport;
        let height = viewport.height as f32;
        self.distance = (height / 2.0) / (self.fov_y_radians / 2.0).tan();
        self.mesh_scale = (
            rounded_scale(viewport.width as f32, self.authored.0),
            rounded_scale(viewport.height as f32, self.authored.1),
        );
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn mesh_scale(&self) -> (f32, f32) {
        self.mesh_scale
    }

    /// Model-view-projection matrix for the plane mesh.
    pub fn mvp(&self) -> Mat4 {
        let aspect = self.viewport.width as f32 / self.viewport.height as f32;
        let projection = perspective(self.fov_y_radians, aspect, 1.0, self.distance * 2.0);
        let view = translation_z(-self.distance);
        let model = scale_xy(self.mesh_scale.0, self.mesh_scale.1);
        mat4_mul(mat4_mul(projection, view), model)
    }
}

fn rounded_scale(viewport: f32, authored: f32) -> f32 {
    (viewport / authored * 100.0).round() / 100.0 + SCALE_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ndc_corner(rig: &CameraRig) -> (f32, f32) {
        let (w, h) = rig.authored_size();
        let clip = transform_point(rig.mvp(), [w / 2.0, h / 2.0, 0.0]);
        (clip[0] / clip[3], clip[1] / clip[3])
    }

    /// The plane corner must land on (or just past) the viewport corner:
    /// never inside it, and past it by no more than the rounding slack.
    fn assert_covers(rig: &CameraRig, viewport: PhysicalSize<u32>) {
        let (ndc_x, ndc_y) = ndc_corner(rig);
        let (aw, ah) = rig.authored_size();
        let slack_x = (0.005 + SCALE_EPSILON) * aw / viewport.width as f32 + 1e-3;
        let slack_y = (0.005 + SCALE_EPSILON) * ah / viewport.height as f32 + 1e-3;
        assert!(ndc_x >= 1.0 - 1e-4, "plane leaves a horizontal seam: {ndc_x}");
        assert!(ndc_y >= 1.0 - 1e-4, "plane leaves a vertical seam: {ndc_y}");
        assert!(ndc_x <= 1.0 + slack_x, "plane overscans too far: {ndc_x}");
        assert!(ndc_y <= 1.0 + slack_y, "plane overscans too far: {ndc_y}");
    }

    #[test]
    fn startup_viewport_maps_one_to_one() {
        let size = PhysicalSize::new(1920, 1080);
        let rig = CameraRig::new(size);
        assert_covers(&rig, size);

        let expected = (1080.0 / 2.0) / (22.5_f32.to_radians()).tan();
        assert!((rig.distance() - expected).abs() < 1e-2);
    }

    #[test]
    fn desktop_to_phone_resize_keeps_coverage() {
        let mut rig = CameraRig::new(PhysicalSize::new(1920, 1080));
        let phone = PhysicalSize::new(375, 812);
        rig.resize(phone);
        assert_covers(&rig, phone);

        // And back again.
        let desktop = PhysicalSize::new(1920, 1080);
        rig.resize(desktop);
        assert_covers(&rig, desktop);
    }

    #[test]
    fn resize_recomputes_distance_from_height() {
        let mut rig = CameraRig::new(PhysicalSize::new(1920, 1080));
        let before = rig.distance();
        rig.resize(PhysicalSize::new(1920, 2160));
        assert!((rig.distance() - before * 2.0).abs() < 1e-2);
    }

    #[test]
    fn zero_sized_viewport_is_ignored() {
        let mut rig = CameraRig::new(PhysicalSize::new(800, 600));
        let distance = rig.distance();
        rig.resize(PhysicalSize::new(0, 600));
        assert_eq!(rig.distance(), distance);
    }

    #[test]
    fn mesh_scale_rounds_and_pads() {
        let mut rig = CameraRig::new(PhysicalSize::new(1000, 1000));
        rig.resize(PhysicalSize::new(500, 250));
        let (sx, sy) = rig.mesh_scale();
        assert!((sx - 0.51).abs() < 1e-6);
        assert!((sy - 0.26).abs() < 1e-6);
    }
}
