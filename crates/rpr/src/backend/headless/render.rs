//! Deterministic stand-in for the engine's renderer.
//!
//! Each visible shape is drawn as the screen rectangle bounding its projected
//! vertices, filled with a flat swatch derived from the contents of its
//! material graph. Larger rectangles are drawn first, and with depth of field
//! on a rectangle grows by its circle of confusion. Environment lights fill
//! the background with the mean color of their image. Nothing is lit or
//! shaded; the image only has to change exactly when the scene state does.

use std::{
    cmp::Ordering,
    hash::{DefaultHasher, Hash, Hasher},
};

use rpr_sys::{RPR_AOV, RPR_CAMERA_MODE};

use super::objects::{CameraState, LightKind, LightState, Registry, ShapeState};
use crate::{
    backend::{MaterialInputValue, RawHandle},
    error::Status,
    geometry::Vec3,
};

/// Shutter samples taken when the camera has exposure and something moves.
const MOTION_SAMPLES: usize = 8;
const NEAR_PLANE: f32 = 1e-3;
const UNBOUND_SWATCH: [f32; 3] = [0.5, 0.5, 0.5];

pub(super) const SUPPORTED_AOVS: [u32; 6] = [
    RPR_AOV::COLOR,
    RPR_AOV::OPACITY,
    RPR_AOV::WORLD_COORDINATE,
    RPR_AOV::UV,
    RPR_AOV::DEPTH,
    RPR_AOV::OBJECT_ID,
];

fn handle(index: usize) -> Result<RawHandle, Status> {
    RawHandle::from_index(index).ok_or(Status::INVALID_OBJECT)
}

/// Flat color standing for a material graph. Equal graphs give equal swatches,
/// whichever handles they live in.
fn swatch(registry: &Registry, material: Option<usize>) -> [f32; 3] {
    let Some(node) = material else {
        return UNBOUND_SWATCH;
    };
    let mut digest = DefaultHasher::new();
    digest_node(registry, node, &mut digest);
    let bits = digest.finish();
    // kept away from black so a bound shape never vanishes into the background
    [0, 8, 16].map(|shift| 0.2 + 0.8 * ((bits >> shift) & 0xff) as f32 / 255.0)
}

// node graphs are acyclic, the registry refuses edges that would close a loop
fn digest_node(registry: &Registry, node: usize, digest: &mut DefaultHasher) {
    let Some(state) = RawHandle::from_index(node).and_then(|h| registry.node(h).ok()) else {
        return;
    };
    state.node_type.hash(digest);
    for (key, value) in &state.inputs {
        key.hash(digest);
        match value {
            MaterialInputValue::Float4(v) => v.map(f32::to_bits).hash(digest),
            MaterialInputValue::Uint(u) => u.hash(digest),
            MaterialInputValue::Node(input) => digest_node(registry, input.index(), digest),
            MaterialInputValue::Image(image) => {
                if let Ok(image) = registry.image(*image) {
                    (image.width, image.height).hash(digest);
                    image.average().map(f32::to_bits).hash(digest);
                }
            }
        }
    }
}

fn environment_fill(registry: &Registry, lights: &[&LightState]) -> [f32; 3] {
    let mut fill = [0.0; 3];
    for light in lights.iter().filter(|l| l.kind == LightKind::Environment) {
        let Some(image) = light.image.and_then(RawHandle::from_index).and_then(|h| registry.image(h).ok()) else {
            continue;
        };
        let mean = image.average();
        for c in 0..3 {
            fill[c] += mean[c] * light.intensity_scale;
        }
    }
    fill
}

/// Camera frame plus projection for one framebuffer resolution.
struct View {
    origin: Vec3,
    right: Vec3,
    up: Vec3,
    forward: Vec3,
    perspective: bool,
    scale: (f32, f32),
    /// Circle of confusion in pixels for unit relative defocus, `None` when everything is sharp.
    blur: Option<f32>,
    focus: f32,
    width: u32,
    height: u32,
}

impl View {
    fn new(camera: &CameraState, width: u32, height: u32) -> View {
        let forward = Vec3::normalized(camera.look_at - camera.position);
        let forward = if forward.near_zero() { Vec3(0.0, 0.0, -1.0) } else { forward };
        let mut right = Vec3::normalized(Vec3::cross(forward, camera.up));
        if right.near_zero() {
            // up parallel to the view direction, pick any perpendicular axis
            right = Vec3::normalized(Vec3::cross(forward, Vec3(1.0, 0.0, 0.0)));
        }
        let aspect = width as f32 / height as f32;
        let perspective = camera.mode != RPR_CAMERA_MODE::ORTHOGRAPHIC;
        // the sensor (or ortho) width spans the image width
        let scale_x = if perspective {
            camera.focal_length / (camera.sensor_size.0 * 0.5)
        } else {
            2.0 / camera.ortho_width
        };
        // thin lens, focal length and sensor in millimetres, distances in metres
        let blur = (perspective && camera.fstop.is_finite()).then(|| {
            let f = camera.focal_length * 1e-3;
            let aperture = f * f / (camera.fstop * (camera.focus_distance - f).abs().max(1e-6));
            aperture / (camera.sensor_size.0 * 1e-3) * width as f32
        });

        View {
            origin: camera.position,
            right,
            up: Vec3::cross(right, forward),
            forward,
            perspective,
            scale: (scale_x, scale_x * aspect),
            blur,
            focus: camera.focus_distance,
            width,
            height,
        }
    }

    fn depth(&self, p: Vec3) -> f32 {
        Vec3::dot(p - self.origin, self.forward)
    }

    fn blur_radius(&self, depth: f32) -> f32 {
        self.blur
            .map_or(0.0, |coc| 0.5 * coc * (depth - self.focus).abs() / depth.max(NEAR_PLANE))
    }

    /// Pixel coordinates from the top-left corner, `None` behind the camera.
    fn project(&self, p: Vec3) -> Option<(f32, f32)> {
        let d = p - self.origin;
        let (mut x, mut y) = (Vec3::dot(d, self.right) * self.scale.0, Vec3::dot(d, self.up) * self.scale.1);
        if self.perspective {
            let z = self.depth(p);
            if z < NEAR_PLANE {
                return None;
            }
            x /= z;
            y /= z;
        }
        Some(((x + 1.0) * 0.5 * self.width as f32, (1.0 - y) * 0.5 * self.height as f32))
    }
}

/// Screen footprint of one shape at one shutter time.
struct Footprint {
    shape: usize,
    min: (f32, f32),
    max: (f32, f32),
    center: Vec3,
    depth: f32,
}

impl Footprint {
    fn of(view: &View, shape: &ShapeState, index: usize, t: f32) -> Option<Footprint> {
        let transform = shape.transform_at(t);
        let mut sum = Vec3::zero();
        let mut count = 0;
        let mut bounds: Option<((f32, f32), (f32, f32))> = None;
        for p in shape.mesh.positions_at(t) {
            let world = transform.apply_point(p);
            sum += world;
            count += 1;
            let Some((x, y)) = view.project(world) else { continue };
            bounds = Some(match bounds {
                None => ((x, y), (x, y)),
                Some((min, max)) => ((min.0.min(x), min.1.min(y)), (max.0.max(x), max.1.max(y))),
            });
        }
        let (min, max) = bounds?;
        let center = sum / count as f32;
        let depth = view.depth(center);
        let r = view.blur_radius(depth);
        Some(Footprint {
            shape: index,
            min: (min.0 - r, min.1 - r),
            max: (max.0 + r, max.1 + r),
            center,
            depth,
        })
    }

    fn area(&self) -> f32 {
        (self.max.0 - self.min.0) * (self.max.1 - self.min.1)
    }

    // pixels whose centers lie inside, clamped to the image
    fn span(lo: f32, hi: f32, size: u32) -> std::ops::Range<usize> {
        let first = (lo - 0.5).ceil().max(0.0) as usize;
        let last = ((hi - 0.5).ceil().max(0.0) as usize).min(size as usize);
        first..last.max(first)
    }
}

/// Snapshot of everything a scene contributes to one render call.
pub(super) struct Frame<'r> {
    camera: CameraState,
    shapes: Vec<&'r ShapeState>,
    swatches: Vec<[f32; 3]>,
    background: [f32; 3],
    times: Vec<f32>,
}

impl<'r> Frame<'r> {
    pub fn new(registry: &'r Registry, scene: usize) -> Result<Frame<'r>, Status> {
        let scene = registry.scene(handle(scene)?)?;
        let camera = match scene.camera {
            Some(camera) => registry.camera(handle(camera)?)?.clone(),
            None => CameraState::default(),
        };
        let shapes = scene
            .shapes
            .iter()
            .map(|&s| registry.shape(handle(s)?))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter(|s| s.visible)
            .collect::<Vec<_>>();
        let lights = scene
            .lights
            .iter()
            .map(|&l| registry.light(handle(l)?))
            .collect::<Result<Vec<_>, _>>()?;

        let exposure = camera.exposure.clamp(0.0, 1.0);
        let times = if exposure > 0.0 && shapes.iter().any(|s| s.has_motion()) {
            (0..MOTION_SAMPLES)
                .map(|i| exposure * (i as f32 + 0.5) / MOTION_SAMPLES as f32)
                .collect()
        } else {
            vec![0.0]
        };

        Ok(Frame {
            swatches: shapes.iter().map(|s| swatch(registry, s.material)).collect(),
            background: environment_fill(registry, &lights),
            camera,
            shapes,
            times,
        })
    }

    /// One sample per pixel of `aov`, averaged over the shutter.
    pub fn render(&self, aov: u32, width: u32, height: u32) -> Vec<[f32; 4]> {
        let view = View::new(&self.camera, width, height);
        let mut out = vec![[0.0f32; 4]; width as usize * height as usize];
        for &t in &self.times {
            for (acc, s) in out.iter_mut().zip(self.render_at(&view, aov, t)) {
                for c in 0..4 {
                    acc[c] += s[c];
                }
            }
        }
        let n = self.times.len() as f32;
        for c in out.iter_mut().flatten() {
            *c /= n;
        }
        out
    }

    // large footprints first; ties broken on content so attach order never matters
    fn draw_order(&self, a: &Footprint, b: &Footprint) -> Ordering {
        let key = |f: &Footprint| (self.swatches[f.shape].map(f32::to_bits), self.shapes[f.shape].object_id);
        b.area()
            .total_cmp(&a.area())
            .then(b.depth.total_cmp(&a.depth))
            .then_with(|| key(a).cmp(&key(b)))
    }

    fn render_at(&self, view: &View, aov: u32, t: f32) -> Vec<[f32; 4]> {
        let background = match aov {
            RPR_AOV::COLOR => [self.background[0], self.background[1], self.background[2], 1.0],
            _ => [0.0; 4],
        };
        let width = view.width as usize;
        let mut pixels = vec![background; width * view.height as usize];

        let mut footprints: Vec<Footprint> = self
            .shapes
            .iter()
            .enumerate()
            .filter_map(|(index, shape)| Footprint::of(view, shape, index, t))
            .collect();
        footprints.sort_by(|a, b| self.draw_order(a, b));

        for footprint in &footprints {
            let shape = self.shapes[footprint.shape];
            let (w, h) = (footprint.max.0 - footprint.min.0, footprint.max.1 - footprint.min.1);
            for py in Footprint::span(footprint.min.1, footprint.max.1, view.height) {
                for px in Footprint::span(footprint.min.0, footprint.max.0, view.width) {
                    let value = match aov {
                        RPR_AOV::OPACITY => [1.0; 4],
                        RPR_AOV::WORLD_COORDINATE => {
                            let c = footprint.center;
                            [c.0, c.1, c.2, 1.0]
                        }
                        RPR_AOV::UV => {
                            let u = (px as f32 + 0.5 - footprint.min.0) / w;
                            let v = (footprint.max.1 - py as f32 - 0.5) / h;
                            [u, v, 0.0, 1.0]
                        }
                        RPR_AOV::DEPTH => [footprint.depth, footprint.depth, footprint.depth, 1.0],
                        RPR_AOV::OBJECT_ID => {
                            let id = shape.object_id as f32;
                            [id, id, id, 1.0]
                        }
                        _ => {
                            let [r, g, b] = self.swatches[footprint.shape];
                            [r, g, b, 1.0]
                        }
                    };
                    pixels[py * width + px] = value;
                }
            }
        }
        pixels
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rpr_sys::{RPR_MATERIAL_INPUT, RPR_MATERIAL_NODE};

    use super::*;
    use crate::backend::headless::objects::{ContextState, NodeState, Object};

    fn camera_at(z: f32) -> CameraState {
        CameraState {
            position: Vec3(0.0, 0.0, z),
            ..CameraState::default()
        }
    }

    fn diffuse(registry: &mut Registry, ctx: usize, color: [f32; 4]) -> usize {
        let mut inputs = BTreeMap::new();
        inputs.insert(RPR_MATERIAL_INPUT::COLOR, MaterialInputValue::Float4(color));
        let node = NodeState {
            node_type: RPR_MATERIAL_NODE::DIFFUSE,
            inputs,
        };
        registry.insert(Some(ctx), Object::MaterialNode(node)).index()
    }

    #[test]
    fn points_in_front_land_on_screen() {
        let view = View::new(&camera_at(5.0), 16, 16);
        let (x, y) = view.project(Vec3(0.0, 0.0, 0.0)).expect("in front");
        assert_eq!((x, y), (8.0, 8.0));
        assert!(view.project(Vec3(0.0, 0.0, 6.0)).is_none());
    }

    #[test]
    fn defocus_grows_with_distance_from_the_focus_plane() {
        let sharp = View::new(&camera_at(5.0), 64, 64);
        assert_eq!(sharp.blur_radius(2.0), 0.0);

        let camera = CameraState {
            fstop: 1.4,
            focus_distance: 5.0,
            ..camera_at(5.0)
        };
        let view = View::new(&camera, 64, 64);
        assert_eq!(view.blur_radius(5.0), 0.0);
        assert!(view.blur_radius(2.0) > 0.0);
        assert!(view.blur_radius(1.0) > view.blur_radius(2.0));
    }

    #[test]
    fn span_covers_pixel_centers_only() {
        assert_eq!(Footprint::span(0.6, 2.4, 8), 1..2);
        assert_eq!(Footprint::span(-3.0, 20.0, 8), 0..8);
        assert_eq!(Footprint::span(5.0, 4.0, 8), 5..5);
    }

    #[test]
    fn equal_graphs_share_a_swatch() {
        let mut registry = Registry::default();
        let ctx = registry.insert(None, Object::Context(ContextState::new(vec![], 0))).index();
        let first = diffuse(&mut registry, ctx, [0.0, 0.5, 1.0, 0.0]);
        let second = diffuse(&mut registry, ctx, [0.0, 0.5, 1.0, 0.0]);
        let other = diffuse(&mut registry, ctx, [1.0, 0.2, 0.0, 0.0]);

        assert_eq!(swatch(&registry, Some(first)), swatch(&registry, Some(second)));
        assert_ne!(swatch(&registry, Some(first)), swatch(&registry, Some(other)));
        assert_eq!(swatch(&registry, None), UNBOUND_SWATCH);
    }
}
