use std::{
    collections::{BTreeMap, HashMap, HashSet},
    rc::Rc,
};

use rpr_sys::*;

use crate::{
    backend::{FramebufferFormatRaw, MaterialInputValue, MeshArrays, ObjectKind, RawHandle},
    error::Status,
    geometry::{Matrix4x4, Vec3},
};

pub(super) struct ContextState {
    pub plugins: Vec<i32>,
    pub active_plugin: Option<i32>,
    pub flags: u32,
    pub iterations: u32,
    pub display_gamma: f32,
    pub max_recursion: u32,
    pub scene: Option<usize>,
    pub aovs: BTreeMap<u32, usize>,
}

impl ContextState {
    pub fn new(plugins: Vec<i32>, flags: u32) -> ContextState {
        ContextState {
            plugins,
            active_plugin: None,
            flags,
            iterations: 1,
            display_gamma: 1.0,
            max_recursion: 8,
            scene: None,
            aovs: BTreeMap::new(),
        }
    }
}

#[derive(Default)]
pub(super) struct SceneState {
    pub shapes: Vec<usize>,
    pub lights: Vec<usize>,
    pub camera: Option<usize>,
}

#[derive(Debug, Clone)]
pub(super) struct CameraState {
    pub position: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    pub focal_length: f32,
    pub exposure: f32,
    pub fstop: f32,
    pub focus_distance: f32,
    pub sensor_size: (f32, f32),
    pub mode: u32,
    pub ortho_width: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        CameraState {
            position: Vec3::zero(),
            look_at: Vec3(0.0, 0.0, -1.0),
            up: Vec3(0.0, 1.0, 0.0),
            focal_length: 35.0,
            exposure: 0.0,
            fstop: f32::INFINITY,
            focus_distance: 1.0,
            sensor_size: (36.0, 24.0),
            mode: RPR_CAMERA_MODE::PERSPECTIVE,
            ortho_width: 1.0,
        }
    }
}

/// Validated mesh positions, every motion key back to back. Shared between a
/// shape and its instances.
#[derive(Debug)]
pub(super) struct Mesh {
    positions: Vec<Vec3>,
    positions_per_key: usize,
    pub motion_keys: u32,
}

fn check_indices(indices: &[i32], len: usize) -> Result<(), Status> {
    match indices.iter().all(|&i| usize::try_from(i).is_ok_and(|i| i < len)) {
        true => Ok(()),
        false => Err(Status::INVALID_PARAMETER),
    }
}

impl Mesh {
    pub fn from_arrays(arrays: &MeshArrays<'_>) -> Result<Mesh, Status> {
        let keys = arrays.motion_keys as usize;
        if keys == 0 || arrays.positions.is_empty() || arrays.positions.len() % keys != 0 {
            return Err(Status::INVALID_PARAMETER);
        }
        if arrays.normals.len() % keys != 0 {
            return Err(Status::INVALID_PARAMETER);
        }
        let positions_per_key = arrays.positions.len() / keys;

        let mut total = 0usize;
        for &count in arrays.face_vertex_counts {
            if count < 3 {
                return Err(Status::INVALID_PARAMETER);
            }
            total += count as usize;
        }
        if arrays.position_indices.len() != total {
            return Err(Status::INVALID_PARAMETER);
        }
        check_indices(arrays.position_indices, positions_per_key)?;
        if !arrays.normals.is_empty() {
            if arrays.normal_indices.len() != total {
                return Err(Status::INVALID_PARAMETER);
            }
            check_indices(arrays.normal_indices, arrays.normals.len() / keys)?;
        }
        if !arrays.uvs.is_empty() {
            if arrays.uv_indices.len() != total {
                return Err(Status::INVALID_PARAMETER);
            }
            check_indices(arrays.uv_indices, arrays.uvs.len())?;
        }

        Ok(Mesh {
            positions: arrays.positions.iter().copied().map(Vec3::from).collect(),
            positions_per_key,
            motion_keys: arrays.motion_keys,
        })
    }

    // splits t in [0, 1] into the two keys around it
    fn keys_at(&self, t: f32) -> (usize, usize, f32) {
        if self.motion_keys <= 1 {
            return (0, 0, 0.0);
        }
        let scaled = t.clamp(0.0, 1.0) * (self.motion_keys - 1) as f32;
        let lo = (scaled.floor() as usize).min(self.motion_keys as usize - 1);
        let hi = (lo + 1).min(self.motion_keys as usize - 1);
        (lo, hi, scaled - lo as f32)
    }

    /// Object-space positions at shutter time `t`.
    pub fn positions_at(&self, t: f32) -> impl Iterator<Item = Vec3> + '_ {
        let (lo, hi, f) = self.keys_at(t);
        let n = self.positions_per_key;
        let first = &self.positions[lo * n..(lo + 1) * n];
        let second = &self.positions[hi * n..(hi + 1) * n];
        first.iter().zip(second).map(move |(&a, &b)| Vec3::lerp(a, b, f))
    }
}

pub(super) struct ShapeState {
    pub mesh: Rc<Mesh>,
    pub transform: Matrix4x4,
    pub material: Option<usize>,
    pub motion_transform: Option<Matrix4x4>,
    pub motion_transform_count: u32,
    pub visible: bool,
    pub object_id: u32,
}

impl ShapeState {
    pub fn new(mesh: Rc<Mesh>) -> ShapeState {
        ShapeState {
            mesh,
            transform: Matrix4x4::identity(),
            material: None,
            motion_transform: None,
            motion_transform_count: 0,
            visible: true,
            object_id: 0,
        }
    }

    pub fn has_motion(&self) -> bool {
        self.mesh.motion_keys > 1 || (self.motion_transform_count > 0 && self.motion_transform.is_some())
    }

    pub fn transform_at(&self, t: f32) -> Matrix4x4 {
        match (self.motion_transform_count, &self.motion_transform) {
            (1.., Some(end)) => Matrix4x4::lerp(&self.transform, end, t),
            _ => self.transform,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LightKind {
    Point,
    Directional,
    Environment,
}

pub(super) struct LightState {
    pub kind: LightKind,
    pub image: Option<usize>,
    pub intensity_scale: f32,
}

impl LightState {
    pub fn new(kind: LightKind) -> LightState {
        LightState {
            kind,
            image: None,
            intensity_scale: 1.0,
        }
    }
}

pub(super) struct NodeState {
    pub node_type: u32,
    pub inputs: BTreeMap<u32, MaterialInputValue>,
}

pub(super) struct ImageState {
    pub width: u32,
    pub height: u32,
    pixels: Vec<[f32; 4]>,
}

impl ImageState {
    /// An image needs at least one texel and exactly `width * height` of them.
    pub fn new(width: u32, height: u32, pixels: Vec<[f32; 4]>) -> Result<ImageState, Status> {
        if width == 0 || height == 0 || pixels.len() != width as usize * height as usize {
            return Err(Status::INVALID_IMAGE);
        }
        Ok(ImageState { width, height, pixels })
    }

    pub fn average(&self) -> [f32; 4] {
        let mut sum = [0.0f64; 4];
        for texel in &self.pixels {
            for c in 0..4 {
                sum[c] += texel[c] as f64;
            }
        }
        let n = self.pixels.len().max(1) as f64;
        sum.map(|s| (s / n) as f32)
    }
}

pub(super) struct FramebufferState {
    pub format: FramebufferFormatRaw,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 4]>,
}

pub(super) enum Object {
    Context(ContextState),
    Scene(SceneState),
    Camera(CameraState),
    Shape(ShapeState),
    Light(LightState),
    MaterialSystem,
    MaterialNode(NodeState),
    Image(ImageState),
    Framebuffer(FramebufferState),
}

impl Object {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Context(_) => ObjectKind::Context,
            Object::Scene(_) => ObjectKind::Scene,
            Object::Camera(_) => ObjectKind::Camera,
            Object::Shape(_) => ObjectKind::Shape,
            Object::Light(_) => ObjectKind::Light,
            Object::MaterialSystem => ObjectKind::MaterialSystem,
            Object::MaterialNode(_) => ObjectKind::MaterialNode,
            Object::Image(_) => ObjectKind::Image,
            Object::Framebuffer(_) => ObjectKind::Framebuffer,
        }
    }
}

pub(super) struct Entry {
    /// `None` for contexts.
    pub owner: Option<usize>,
    pub name: Option<String>,
    pub object: Object,
}

macro_rules! typed_access {
    ($get:ident, $variant:ident, $state:ty) => {
        pub fn $get(&self, handle: RawHandle) -> Result<&$state, Status> {
            match self.objects.get(&handle.index()).map(|e| &e.object) {
                Some(Object::$variant(state)) => Ok(state),
                _ => Err(Status::INVALID_OBJECT),
            }
        }
    };
    ($get:ident, $get_mut:ident, $variant:ident, $state:ty) => {
        typed_access!($get, $variant, $state);

        pub fn $get_mut(&mut self, handle: RawHandle) -> Result<&mut $state, Status> {
            match self.objects.get_mut(&handle.index()).map(|e| &mut e.object) {
                Some(Object::$variant(state)) => Ok(state),
                _ => Err(Status::INVALID_OBJECT),
            }
        }
    };
}

#[derive(Default)]
pub(super) struct Registry {
    next: usize,
    pub objects: HashMap<usize, Entry>,
    pub plugins: Vec<String>,
    pub import_contexts: HashSet<usize>,
}

impl Registry {
    fn allocate(&mut self) -> RawHandle {
        // handles start at a non-zero offset so they never look like small integers
        self.next += 1;
        match RawHandle::from_index(0x1000 + self.next) {
            Some(handle) => handle,
            None => unreachable!("offset handles are non-zero"),
        }
    }

    pub fn insert(&mut self, owner: Option<usize>, object: Object) -> RawHandle {
        let handle = self.allocate();
        self.objects.insert(
            handle.index(),
            Entry {
                owner,
                name: None,
                object,
            },
        );
        handle
    }

    pub fn new_import_context(&mut self) -> RawHandle {
        let handle = self.allocate();
        self.import_contexts.insert(handle.index());
        handle
    }

    pub fn entry(&self, handle: RawHandle) -> Result<&Entry, Status> {
        self.objects.get(&handle.index()).ok_or(Status::INVALID_OBJECT)
    }

    pub fn entry_mut(&mut self, handle: RawHandle) -> Result<&mut Entry, Status> {
        self.objects.get_mut(&handle.index()).ok_or(Status::INVALID_OBJECT)
    }

    /// The context that owns `handle` (a context owns itself).
    pub fn owner(&self, handle: RawHandle) -> Result<usize, Status> {
        let entry = self.entry(handle)?;
        Ok(entry.owner.unwrap_or(handle.index()))
    }

    pub fn same_context(&self, a: RawHandle, b: RawHandle) -> Result<(), Status> {
        if self.owner(a)? == self.owner(b)? {
            Ok(())
        } else {
            Err(Status::INVALID_PARAMETER)
        }
    }

    typed_access!(context, context_mut, Context, ContextState);
    typed_access!(scene, scene_mut, Scene, SceneState);
    typed_access!(camera, camera_mut, Camera, CameraState);
    typed_access!(shape, shape_mut, Shape, ShapeState);
    typed_access!(light, light_mut, Light, LightState);
    typed_access!(node, node_mut, MaterialNode, NodeState);
    typed_access!(image, Image, ImageState);
    typed_access!(framebuffer, framebuffer_mut, Framebuffer, FramebufferState);

    pub fn is_material_system(&self, handle: RawHandle) -> bool {
        matches!(self.entry(handle).map(|e| &e.object), Ok(Object::MaterialSystem))
    }

    pub fn count_owned(&self, context: usize, kind: ObjectKind) -> usize {
        self.objects
            .values()
            .filter(|e| e.owner == Some(context) && e.object.kind() == kind)
            .count()
    }

    /// True when `from` reaches `target` through node inputs.
    pub fn node_reaches(&self, from: usize, target: usize) -> bool {
        let mut stack = vec![from];
        let mut seen = HashSet::new();
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(Entry {
                object: Object::MaterialNode(node),
                ..
            }) = self.objects.get(&current)
            {
                for value in node.inputs.values() {
                    if let MaterialInputValue::Node(next) = value {
                        stack.push(next.index());
                    }
                }
            }
        }
        false
    }

    pub fn delete(&mut self, handle: RawHandle) -> Result<ObjectKind, Status> {
        let index = handle.index();
        let entry = self.objects.get(&index).ok_or(Status::INVALID_OBJECT)?;
        let kind = entry.object.kind();
        if kind == ObjectKind::Context && self.objects.values().any(|e| e.owner == Some(index)) {
            return Err(Status::INVALID_CONTEXT);
        }
        self.objects.remove(&index);
        self.scrub(index);
        Ok(kind)
    }

    // drops every reference other objects still hold to a deleted one
    fn scrub(&mut self, index: usize) {
        let is_gone = |handle: &RawHandle| handle.index() == index;
        for entry in self.objects.values_mut() {
            match &mut entry.object {
                Object::Context(ctx) => {
                    if ctx.scene == Some(index) {
                        ctx.scene = None;
                    }
                    ctx.aovs.retain(|_, fb| *fb != index);
                }
                Object::Scene(scene) => {
                    scene.shapes.retain(|&s| s != index);
                    scene.lights.retain(|&l| l != index);
                    if scene.camera == Some(index) {
                        scene.camera = None;
                    }
                }
                Object::Shape(shape) => {
                    if shape.material == Some(index) {
                        shape.material = None;
                    }
                }
                Object::Light(light) => {
                    if light.image == Some(index) {
                        light.image = None;
                    }
                }
                Object::MaterialNode(node) => node.inputs.retain(|_, value| match value {
                    MaterialInputValue::Node(h) | MaterialInputValue::Image(h) => !is_gone(h),
                    _ => true,
                }),
                Object::Camera(_) | Object::MaterialSystem | Object::Image(_) | Object::Framebuffer(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD_POSITIONS: [[f32; 3]; 4] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];

    fn quad(indices: &[i32], counts: &[i32]) -> Result<Mesh, Status> {
        Mesh::from_arrays(&MeshArrays {
            positions: &QUAD_POSITIONS,
            normals: &[],
            uvs: &[],
            position_indices: indices,
            normal_indices: &[],
            uv_indices: &[],
            face_vertex_counts: counts,
            motion_keys: 1,
        })
    }

    #[test]
    fn polygons_keep_their_positions() {
        let mesh = quad(&[0, 1, 2, 3], &[4]).expect("valid quad");
        let positions: Vec<Vec3> = mesh.positions_at(0.5).collect();
        assert_eq!(positions, QUAD_POSITIONS.map(Vec3::from));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        assert_eq!(quad(&[0, 1, 4], &[3]).err(), Some(Status::INVALID_PARAMETER));
        assert_eq!(quad(&[0, 1, -1], &[3]).err(), Some(Status::INVALID_PARAMETER));
    }

    #[test]
    fn face_counts_must_cover_indices() {
        assert_eq!(quad(&[0, 1, 2, 3], &[3]).err(), Some(Status::INVALID_PARAMETER));
        assert_eq!(quad(&[0, 1], &[2]).err(), Some(Status::INVALID_PARAMETER));
    }

    #[test]
    fn motion_keys_interpolate_positions() {
        let positions = [[0.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let mesh = Mesh::from_arrays(&MeshArrays {
            positions: &positions,
            normals: &[],
            uvs: &[],
            position_indices: &[0, 0, 0],
            normal_indices: &[],
            uv_indices: &[],
            face_vertex_counts: &[3],
            motion_keys: 2,
        })
        .expect("two keys of one vertex");
        let at = |t| mesh.positions_at(t).collect::<Vec<_>>();
        assert_eq!(at(0.0), [Vec3(0.0, 0.0, 0.0)]);
        assert_eq!(at(0.5), [Vec3(1.0, 0.0, 0.0)]);
        assert_eq!(at(1.0), [Vec3(2.0, 0.0, 0.0)]);
    }

    #[test]
    fn images_need_texels() {
        assert_eq!(ImageState::new(0, 4, vec![]).err(), Some(Status::INVALID_IMAGE));
        assert_eq!(ImageState::new(4, 0, vec![]).err(), Some(Status::INVALID_IMAGE));
        assert_eq!(ImageState::new(2, 2, vec![[1.0; 4]; 3]).err(), Some(Status::INVALID_IMAGE));

        let image = ImageState::new(2, 1, vec![[1.0, 0.0, 0.0, 1.0], [0.0, 0.0, 1.0, 1.0]]).expect("two texels");
        assert_eq!(image.average(), [0.5, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn deleting_a_node_clears_references_to_it() {
        let mut registry = Registry::default();
        let ctx = registry.insert(None, Object::Context(ContextState::new(vec![], 0)));
        let owner = Some(ctx.index());
        let texture = registry.insert(
            owner,
            Object::MaterialNode(NodeState {
                node_type: RPR_MATERIAL_NODE::CHECKER_TEXTURE,
                inputs: BTreeMap::new(),
            }),
        );
        let mut inputs = BTreeMap::new();
        inputs.insert(RPR_MATERIAL_INPUT::COLOR, MaterialInputValue::Node(texture));
        let diffuse = registry.insert(
            owner,
            Object::MaterialNode(NodeState {
                node_type: RPR_MATERIAL_NODE::DIFFUSE,
                inputs,
            }),
        );

        assert!(registry.node_reaches(diffuse.index(), texture.index()));
        assert_eq!(registry.delete(texture), Ok(ObjectKind::MaterialNode));
        assert!(registry.node(diffuse).map(|n| n.inputs.is_empty()).unwrap_or(false));
        assert_eq!(registry.delete(texture), Err(Status::INVALID_OBJECT));
        assert_eq!(registry.delete(ctx), Err(Status::INVALID_CONTEXT));
    }
}
