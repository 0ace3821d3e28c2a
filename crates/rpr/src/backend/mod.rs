//! The engine boundary.
//!
//! Every call the safe layer makes goes through [`Backend`]. Handles cross it as
//! [`RawHandle`]s and every call reports a [`Status`], mirroring the C API one to
//! one so the `native` implementation stays a thin forwarding layer.

use std::{ffi::CStr, num::NonZeroUsize};

use crate::error::Status;

pub mod headless;
#[cfg(feature = "native")]
pub mod native;

pub type BackendResult<T> = Result<T, Status>;

/// Opaque engine object. Never null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawHandle(NonZeroUsize);

impl RawHandle {
    pub fn from_ptr<T>(ptr: *mut T) -> Option<RawHandle> {
        NonZeroUsize::new(ptr as usize).map(RawHandle)
    }

    pub fn as_ptr<T>(self) -> *mut T {
        self.0.get() as *mut T
    }

    pub(crate) fn from_index(index: usize) -> Option<RawHandle> {
        NonZeroUsize::new(index).map(RawHandle)
    }

    pub(crate) fn index(self) -> usize {
        self.0.get()
    }
}

/// Every object kind the engine hands out. Used for leak reports and checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    Context,
    Scene,
    Camera,
    Shape,
    Light,
    MaterialSystem,
    MaterialNode,
    Image,
    Framebuffer,
}

impl ObjectKind {
    /// Kinds a context can own, in the order they should be released.
    pub const DEPENDENTS: [ObjectKind; 8] = [
        ObjectKind::Shape,
        ObjectKind::Light,
        ObjectKind::Camera,
        ObjectKind::MaterialNode,
        ObjectKind::Image,
        ObjectKind::Framebuffer,
        ObjectKind::Scene,
        ObjectKind::MaterialSystem,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ObjectKind::Context => "context",
            ObjectKind::Scene => "scene",
            ObjectKind::Camera => "camera",
            ObjectKind::Shape => "shape",
            ObjectKind::Light => "light",
            ObjectKind::MaterialSystem => "material system",
            ObjectKind::MaterialNode => "material node",
            ObjectKind::Image => "image",
            ObjectKind::Framebuffer => "framebuffer",
        }
    }
}

pub struct ContextCreateInfo<'a> {
    pub api_version: i32,
    pub plugins: &'a [i32],
    pub flags: u32,
    pub cache_path: Option<&'a CStr>,
    pub precompiled_binary_path: Option<&'a CStr>,
}

/// Mesh streams as the engine consumes them.
///
/// `positions` and `normals` hold `motion_keys` consecutive blocks of equal
/// size; index streams address a single block.
#[derive(Debug, Clone, Copy)]
pub struct MeshArrays<'a> {
    pub positions: &'a [[f32; 3]],
    pub normals: &'a [[f32; 3]],
    pub uvs: &'a [[f32; 2]],
    pub position_indices: &'a [i32],
    pub normal_indices: &'a [i32],
    pub uv_indices: &'a [i32],
    pub face_vertex_counts: &'a [i32],
    pub motion_keys: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraParameter {
    FocalLength(f32),
    Exposure(f32),
    FStop(f32),
    FocusDistance(f32),
    ApertureBlades(u32),
    SensorSize(f32, f32),
    Mode(u32),
    OrthoWidth(f32),
}

/// Transforms are 16 floats, row by row, translation in the last column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeParameter {
    Transform([f32; 16]),
    Material(Option<RawHandle>),
    MotionTransform([f32; 16], u32),
    MotionTransformCount(u32),
    Visibility(bool),
    ObjectId(u32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightParameter {
    Transform([f32; 16]),
    PointRadiantPower([f32; 3]),
    DirectionalRadiantPower([f32; 3]),
    EnvironmentImage(RawHandle),
    IntensityScale(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialInputValue {
    Float4([f32; 4]),
    Uint(u32),
    Node(RawHandle),
    Image(RawHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferFormatRaw {
    pub num_components: u32,
    pub component_type: u32,
}

/// The engine's C API, one method per entry point that the safe layer uses.
///
/// Methods take `&self`; implementations that keep state in process use
/// interior mutability. Callers are single threaded.
pub trait Backend {
    fn name(&self) -> &'static str;

    /// Returns the plugin id, or `-1` when the library can't be loaded.
    fn register_plugin(&self, path: &CStr) -> i32;

    fn create_context(&self, info: &ContextCreateInfo<'_>) -> BackendResult<RawHandle>;
    fn context_set_active_plugin(&self, ctx: RawHandle, plugin: i32) -> BackendResult<()>;
    fn context_info_string(&self, ctx: RawHandle, key: u32) -> BackendResult<String>;
    /// Number of live objects of `kind` owned by the context.
    fn context_created_objects(&self, ctx: RawHandle, kind: ObjectKind) -> BackendResult<usize>;
    fn context_set_parameter_1u(&self, ctx: RawHandle, key: u32, value: u32) -> BackendResult<()>;
    fn context_set_parameter_1f(&self, ctx: RawHandle, key: u32, value: f32) -> BackendResult<()>;
    fn context_set_scene(&self, ctx: RawHandle, scene: Option<RawHandle>) -> BackendResult<()>;
    fn context_set_aov(&self, ctx: RawHandle, aov: u32, framebuffer: Option<RawHandle>) -> BackendResult<()>;
    fn context_render(&self, ctx: RawHandle) -> BackendResult<()>;
    fn context_resolve_framebuffer(
        &self,
        ctx: RawHandle,
        src: RawHandle,
        dst: RawHandle,
        no_display_gamma: bool,
    ) -> BackendResult<()>;

    fn context_create_scene(&self, ctx: RawHandle) -> BackendResult<RawHandle>;
    fn context_create_material_system(&self, ctx: RawHandle, kind: u32) -> BackendResult<RawHandle>;
    fn context_create_camera(&self, ctx: RawHandle) -> BackendResult<RawHandle>;
    fn context_create_mesh(&self, ctx: RawHandle, mesh: &MeshArrays<'_>) -> BackendResult<RawHandle>;
    fn context_create_instance(&self, ctx: RawHandle, prototype: RawHandle) -> BackendResult<RawHandle>;
    fn context_create_point_light(&self, ctx: RawHandle) -> BackendResult<RawHandle>;
    fn context_create_directional_light(&self, ctx: RawHandle) -> BackendResult<RawHandle>;
    fn context_create_environment_light(&self, ctx: RawHandle) -> BackendResult<RawHandle>;
    fn context_create_image_from_file(&self, ctx: RawHandle, path: &CStr) -> BackendResult<RawHandle>;
    fn context_create_framebuffer(
        &self,
        ctx: RawHandle,
        format: FramebufferFormatRaw,
        width: u32,
        height: u32,
    ) -> BackendResult<RawHandle>;

    fn camera_look_at(&self, camera: RawHandle, pos: [f32; 3], at: [f32; 3], up: [f32; 3]) -> BackendResult<()>;
    fn camera_set(&self, camera: RawHandle, parameter: CameraParameter) -> BackendResult<()>;

    fn scene_set_camera(&self, scene: RawHandle, camera: Option<RawHandle>) -> BackendResult<()>;
    fn scene_attach_shape(&self, scene: RawHandle, shape: RawHandle) -> BackendResult<()>;
    fn scene_detach_shape(&self, scene: RawHandle, shape: RawHandle) -> BackendResult<()>;
    fn scene_attach_light(&self, scene: RawHandle, light: RawHandle) -> BackendResult<()>;
    fn scene_detach_light(&self, scene: RawHandle, light: RawHandle) -> BackendResult<()>;

    fn shape_set(&self, shape: RawHandle, parameter: ShapeParameter) -> BackendResult<()>;
    fn light_set(&self, light: RawHandle, parameter: LightParameter) -> BackendResult<()>;

    fn material_system_create_node(&self, system: RawHandle, node_type: u32) -> BackendResult<RawHandle>;
    fn material_node_set_input(&self, node: RawHandle, key: u32, value: MaterialInputValue) -> BackendResult<()>;

    fn framebuffer_clear(&self, framebuffer: RawHandle) -> BackendResult<()>;
    fn framebuffer_save_to_file(&self, framebuffer: RawHandle, path: &CStr) -> BackendResult<()>;
    fn framebuffer_format(&self, framebuffer: RawHandle) -> BackendResult<(FramebufferFormatRaw, u32, u32)>;
    /// Raw pixel data, `width * height * num_components` floats.
    fn framebuffer_data(&self, framebuffer: RawHandle) -> BackendResult<Vec<f32>>;

    fn object_set_name(&self, object: RawHandle, name: &CStr) -> BackendResult<()>;
    fn object_delete(&self, object: RawHandle) -> BackendResult<()>;

    fn rprs_create_context(&self) -> BackendResult<RawHandle>;
    fn rprs_delete_context(&self, import_ctx: RawHandle) -> BackendResult<()>;
    fn rprs_import(
        &self,
        path: &CStr,
        ctx: RawHandle,
        material_system: RawHandle,
        scene: RawHandle,
        import_ctx: RawHandle,
    ) -> BackendResult<()>;
    fn rprs_delete_imported_objects(&self, import_ctx: RawHandle) -> BackendResult<()>;
}
