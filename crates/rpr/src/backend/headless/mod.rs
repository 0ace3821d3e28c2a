//! In-process engine used when the native library isn't available.
//!
//! It follows the same handle and status protocol as the native engine:
//! objects belong to the context that created them, cross-context use is
//! rejected, a context can't be deleted while it still owns anything and a
//! second delete of any handle fails. Rendering is a deterministic stand-in
//! (see [`render`]): it reflects what is attached and how it is set up, it is
//! not an image of the scene.

mod objects;
mod render;

use std::{cell::RefCell, ffi::CStr, path::Path, rc::Rc};

use rpr_sys::*;
use tracing::debug;

use self::{
    objects::{
        CameraState, ContextState, FramebufferState, ImageState, LightKind, LightState, Mesh, NodeState, Object,
        Registry, SceneState, ShapeState,
    },
    render::{Frame, SUPPORTED_AOVS},
};
use super::{
    Backend, BackendResult, CameraParameter, ContextCreateInfo, FramebufferFormatRaw, LightParameter,
    MaterialInputValue, MeshArrays, ObjectKind, RawHandle, ShapeParameter,
};
use crate::{
    error::Status,
    geometry::{Matrix4x4, Vec3},
};

pub const DEVICE_NAME: &str = "Headless Preview Device";

const KNOWN_PLUGINS: [&str; 4] = ["Northstar64", "Tahoe64", "Hybrid", "HybridPro"];

const DEVICE_FLAGS: u32 = RPR_CREATION_FLAGS::ENABLE_GPU0
    | RPR_CREATION_FLAGS::ENABLE_GPU1
    | RPR_CREATION_FLAGS::ENABLE_GPU2
    | RPR_CREATION_FLAGS::ENABLE_GPU3
    | RPR_CREATION_FLAGS::ENABLE_GPU4
    | RPR_CREATION_FLAGS::ENABLE_GPU5
    | RPR_CREATION_FLAGS::ENABLE_GPU6
    | RPR_CREATION_FLAGS::ENABLE_GPU7
    | RPR_CREATION_FLAGS::ENABLE_CPU;

#[derive(Default)]
pub struct HeadlessBackend {
    registry: RefCell<Registry>,
}

impl HeadlessBackend {
    pub fn new() -> HeadlessBackend {
        HeadlessBackend::default()
    }

    /// Total live objects across every context, for tests and leak reports.
    pub fn live_objects(&self) -> usize {
        let registry = self.registry.borrow();
        registry.objects.len() + registry.import_contexts.len()
    }

    fn create_owned(&self, ctx: RawHandle, object: Object) -> BackendResult<RawHandle> {
        let mut registry = self.registry.borrow_mut();
        registry.context(ctx)?;
        let kind = object.kind();
        let handle = registry.insert(Some(ctx.index()), object);
        debug!(?handle, kind = kind.name(), "created");
        Ok(handle)
    }
}

fn plugin_stem(path: &CStr) -> Option<String> {
    let path = Path::new(path.to_str().ok()?);
    let stem = path.file_stem()?.to_str()?;
    let stem = stem.strip_prefix("lib").unwrap_or(stem);
    KNOWN_PLUGINS.contains(&stem).then(|| stem.to_string())
}

fn path_of(path: &CStr) -> BackendResult<&Path> {
    path.to_str().map(Path::new).map_err(|_| Status::INVALID_PARAMETER)
}

fn load_image(path: &Path) -> BackendResult<ImageState> {
    let image = image::open(path).map_err(|err| match err {
        image::ImageError::IoError(_) => Status::IO_ERROR,
        image::ImageError::Unsupported(_) => Status::UNSUPPORTED_IMAGE_FORMAT,
        _ => Status::INVALID_IMAGE,
    })?;
    let rgba = image.to_rgba32f();
    ImageState::new(rgba.width(), rgba.height(), rgba.pixels().map(|p| p.0).collect())
}

fn save_image(framebuffer: &FramebufferState, path: &Path) -> BackendResult<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let (width, height) = (framebuffer.width, framebuffer.height);
    let texel = |x: u32, y: u32| framebuffer.pixels[y as usize * width as usize + x as usize];
    let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;

    let result = match extension.as_str() {
        "png" | "bmp" | "tga" => {
            image::RgbaImage::from_fn(width, height, |x, y| image::Rgba(texel(x, y).map(to_u8))).save(path)
        }
        "jpg" | "jpeg" => image::RgbImage::from_fn(width, height, |x, y| {
            let [r, g, b, _] = texel(x, y);
            image::Rgb([to_u8(r), to_u8(g), to_u8(b)])
        })
        .save(path),
        "hdr" => image::Rgb32FImage::from_fn(width, height, |x, y| {
            let [r, g, b, _] = texel(x, y);
            image::Rgb([r, g, b])
        })
        .save(path),
        "exr" => image::Rgba32FImage::from_fn(width, height, |x, y| image::Rgba(texel(x, y))).save(path),
        _ => return Err(Status::UNSUPPORTED_IMAGE_FORMAT),
    };
    result.map_err(|err| match err {
        image::ImageError::IoError(_) => Status::IO_ERROR,
        image::ImageError::Unsupported(_) => Status::UNSUPPORTED_IMAGE_FORMAT,
        _ => Status::INTERNAL_ERROR,
    })
}

fn positive(value: f32) -> BackendResult<f32> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(Status::INVALID_PARAMETER)
    }
}

impl Backend for HeadlessBackend {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn register_plugin(&self, path: &CStr) -> i32 {
        let Some(stem) = plugin_stem(path) else {
            return RPR_INVALID_PLUGIN_ID;
        };
        let mut registry = self.registry.borrow_mut();
        let id = match registry.plugins.iter().position(|p| *p == stem) {
            Some(existing) => existing,
            None => {
                registry.plugins.push(stem);
                registry.plugins.len() - 1
            }
        };
        id as i32
    }

    fn create_context(&self, info: &ContextCreateInfo<'_>) -> BackendResult<RawHandle> {
        if info.api_version != RPR_API_VERSION {
            return Err(Status::INVALID_API_VERSION);
        }
        let mut registry = self.registry.borrow_mut();
        let known = |id: &i32| usize::try_from(*id).is_ok_and(|i| i < registry.plugins.len());
        if info.plugins.is_empty() || !info.plugins.iter().all(known) {
            return Err(Status::INVALID_PARAMETER);
        }
        if info.flags & DEVICE_FLAGS == 0 {
            return Err(Status::INVALID_PARAMETER);
        }
        let state = ContextState::new(info.plugins.to_vec(), info.flags);
        let handle = registry.insert(None, Object::Context(state));
        debug!(?handle, flags = info.flags, "created context");
        Ok(handle)
    }

    fn context_set_active_plugin(&self, ctx: RawHandle, plugin: i32) -> BackendResult<()> {
        let mut registry = self.registry.borrow_mut();
        let state = registry.context_mut(ctx)?;
        if !state.plugins.contains(&plugin) {
            return Err(Status::INVALID_PARAMETER);
        }
        state.active_plugin = Some(plugin);
        Ok(())
    }

    fn context_info_string(&self, ctx: RawHandle, key: u32) -> BackendResult<String> {
        let registry = self.registry.borrow();
        let state = registry.context(ctx)?;
        match key {
            RPR_CONTEXT::GPU0_NAME | RPR_CONTEXT::GPU1_NAME | RPR_CONTEXT::CPU_NAME => Ok(DEVICE_NAME.to_string()),
            RPR_CONTEXT::CREATION_FLAGS => Ok(format!("{:#x}", state.flags)),
            _ => Err(Status::INVALID_PARAMETER),
        }
    }

    fn context_created_objects(&self, ctx: RawHandle, kind: ObjectKind) -> BackendResult<usize> {
        let registry = self.registry.borrow();
        registry.context(ctx)?;
        Ok(registry.count_owned(ctx.index(), kind))
    }

    fn context_set_parameter_1u(&self, ctx: RawHandle, key: u32, value: u32) -> BackendResult<()> {
        let mut registry = self.registry.borrow_mut();
        let state = registry.context_mut(ctx)?;
        match key {
            RPR_CONTEXT::ITERATIONS if value > 0 => state.iterations = value,
            RPR_CONTEXT::MAX_RECURSION => state.max_recursion = value,
            _ => return Err(Status::INVALID_PARAMETER),
        }
        Ok(())
    }

    fn context_set_parameter_1f(&self, ctx: RawHandle, key: u32, value: f32) -> BackendResult<()> {
        let mut registry = self.registry.borrow_mut();
        let state = registry.context_mut(ctx)?;
        match key {
            RPR_CONTEXT::DISPLAY_GAMMA => state.display_gamma = positive(value)?,
            _ => return Err(Status::INVALID_PARAMETER),
        }
        Ok(())
    }

    fn context_set_scene(&self, ctx: RawHandle, scene: Option<RawHandle>) -> BackendResult<()> {
        let mut registry = self.registry.borrow_mut();
        if let Some(scene) = scene {
            registry.scene(scene)?;
            registry.same_context(ctx, scene)?;
        }
        registry.context_mut(ctx)?.scene = scene.map(RawHandle::index);
        Ok(())
    }

    fn context_set_aov(&self, ctx: RawHandle, aov: u32, framebuffer: Option<RawHandle>) -> BackendResult<()> {
        if !SUPPORTED_AOVS.contains(&aov) {
            return Err(Status::INVALID_PARAMETER);
        }
        let mut registry = self.registry.borrow_mut();
        if let Some(framebuffer) = framebuffer {
            registry.framebuffer(framebuffer)?;
            registry.same_context(ctx, framebuffer)?;
        }
        let state = registry.context_mut(ctx)?;
        match framebuffer {
            Some(fb) => state.aovs.insert(aov, fb.index()),
            None => state.aovs.remove(&aov),
        };
        Ok(())
    }

    fn context_render(&self, ctx: RawHandle) -> BackendResult<()> {
        let mut registry = self.registry.borrow_mut();
        let state = registry.context(ctx)?;
        if state.active_plugin.is_none() {
            return Err(Status::INVALID_CONTEXT);
        }
        let scene = state.scene.ok_or(Status::INVALID_OBJECT)?;
        let iterations = state.iterations;
        let targets: Vec<(u32, RawHandle)> = state
            .aovs
            .iter()
            .filter_map(|(&aov, &fb)| Some((aov, RawHandle::from_index(fb)?)))
            .collect();

        let mut results = Vec::with_capacity(targets.len());
        {
            let frame = Frame::new(&registry, scene)?;
            for &(aov, fb) in &targets {
                let target = registry.framebuffer(fb)?;
                results.push((fb, frame.render(aov, target.width, target.height)));
            }
        }

        let weight = iterations as f32;
        for (fb, samples) in results {
            let target = registry.framebuffer_mut(fb)?;
            for (acc, sample) in target.pixels.iter_mut().zip(samples) {
                acc[0] += sample[0] * weight;
                acc[1] += sample[1] * weight;
                acc[2] += sample[2] * weight;
                acc[3] += weight;
            }
        }
        Ok(())
    }

    fn context_resolve_framebuffer(
        &self,
        ctx: RawHandle,
        src: RawHandle,
        dst: RawHandle,
        no_display_gamma: bool,
    ) -> BackendResult<()> {
        let mut registry = self.registry.borrow_mut();
        let gamma = registry.context(ctx)?.display_gamma;
        registry.same_context(ctx, src)?;
        registry.same_context(ctx, dst)?;
        let source = registry.framebuffer(src)?;
        let target = registry.framebuffer(dst)?;
        if (source.width, source.height) != (target.width, target.height) {
            return Err(Status::INVALID_PARAMETER);
        }

        let exponent = if no_display_gamma { 1.0 } else { 1.0 / gamma };
        let resolved: Vec<[f32; 4]> = source
            .pixels
            .iter()
            .map(|&[r, g, b, w]| {
                if w <= 0.0 {
                    return [0.0, 0.0, 0.0, 0.0];
                }
                let tone = |c: f32| (c / w).max(0.0).powf(exponent);
                [tone(r), tone(g), tone(b), 1.0]
            })
            .collect();
        registry.framebuffer_mut(dst)?.pixels = resolved;
        Ok(())
    }

    fn context_create_scene(&self, ctx: RawHandle) -> BackendResult<RawHandle> {
        self.create_owned(ctx, Object::Scene(SceneState::default()))
    }

    fn context_create_material_system(&self, ctx: RawHandle, kind: u32) -> BackendResult<RawHandle> {
        if kind != RPR_MATERIAL_SYSTEM_TYPE::DEFAULT {
            return Err(Status::INVALID_PARAMETER);
        }
        self.create_owned(ctx, Object::MaterialSystem)
    }

    fn context_create_camera(&self, ctx: RawHandle) -> BackendResult<RawHandle> {
        self.create_owned(ctx, Object::Camera(CameraState::default()))
    }

    fn context_create_mesh(&self, ctx: RawHandle, mesh: &MeshArrays<'_>) -> BackendResult<RawHandle> {
        let mesh = Mesh::from_arrays(mesh)?;
        self.create_owned(ctx, Object::Shape(ShapeState::new(Rc::new(mesh))))
    }

    fn context_create_instance(&self, ctx: RawHandle, prototype: RawHandle) -> BackendResult<RawHandle> {
        let state = {
            let registry = self.registry.borrow();
            registry.same_context(ctx, prototype)?;
            let prototype = registry.shape(prototype)?;
            let mut state = ShapeState::new(Rc::clone(&prototype.mesh));
            state.material = prototype.material;
            state
        };
        self.create_owned(ctx, Object::Shape(state))
    }

    fn context_create_point_light(&self, ctx: RawHandle) -> BackendResult<RawHandle> {
        self.create_owned(ctx, Object::Light(LightState::new(LightKind::Point)))
    }

    fn context_create_directional_light(&self, ctx: RawHandle) -> BackendResult<RawHandle> {
        self.create_owned(ctx, Object::Light(LightState::new(LightKind::Directional)))
    }

    fn context_create_environment_light(&self, ctx: RawHandle) -> BackendResult<RawHandle> {
        self.create_owned(ctx, Object::Light(LightState::new(LightKind::Environment)))
    }

    fn context_create_image_from_file(&self, ctx: RawHandle, path: &CStr) -> BackendResult<RawHandle> {
        self.registry.borrow().context(ctx)?;
        let image = load_image(path_of(path)?)?;
        self.create_owned(ctx, Object::Image(image))
    }

    fn context_create_framebuffer(
        &self,
        ctx: RawHandle,
        format: FramebufferFormatRaw,
        width: u32,
        height: u32,
    ) -> BackendResult<RawHandle> {
        let component_ok = matches!(
            format.component_type,
            RPR_COMPONENT_TYPE::UINT8 | RPR_COMPONENT_TYPE::FLOAT16 | RPR_COMPONENT_TYPE::FLOAT32
        );
        if !(1..=4).contains(&format.num_components) || !component_ok || width == 0 || height == 0 {
            return Err(Status::INVALID_PARAMETER);
        }
        let state = FramebufferState {
            format,
            width,
            height,
            pixels: vec![[0.0; 4]; width as usize * height as usize],
        };
        self.create_owned(ctx, Object::Framebuffer(state))
    }

    fn camera_look_at(&self, camera: RawHandle, pos: [f32; 3], at: [f32; 3], up: [f32; 3]) -> BackendResult<()> {
        let mut registry = self.registry.borrow_mut();
        let state = registry.camera_mut(camera)?;
        state.position = Vec3::from(pos);
        state.look_at = Vec3::from(at);
        state.up = Vec3::from(up);
        Ok(())
    }

    fn camera_set(&self, camera: RawHandle, parameter: CameraParameter) -> BackendResult<()> {
        let mut registry = self.registry.borrow_mut();
        let state = registry.camera_mut(camera)?;
        match parameter {
            CameraParameter::FocalLength(f) => state.focal_length = positive(f)?,
            CameraParameter::Exposure(e) if e >= 0.0 => state.exposure = e,
            // infinite f-stop turns depth of field off
            CameraParameter::FStop(f) if f > 0.0 => state.fstop = f,
            CameraParameter::FocusDistance(d) => state.focus_distance = positive(d)?,
            // the stand-in renderer has no aperture shape
            CameraParameter::ApertureBlades(_) => {}
            CameraParameter::SensorSize(w, h) => state.sensor_size = (positive(w)?, positive(h)?),
            CameraParameter::Mode(mode @ (RPR_CAMERA_MODE::PERSPECTIVE | RPR_CAMERA_MODE::ORTHOGRAPHIC)) => {
                state.mode = mode
            }
            CameraParameter::OrthoWidth(w) => state.ortho_width = positive(w)?,
            _ => return Err(Status::INVALID_PARAMETER),
        }
        Ok(())
    }

    fn scene_set_camera(&self, scene: RawHandle, camera: Option<RawHandle>) -> BackendResult<()> {
        let mut registry = self.registry.borrow_mut();
        if let Some(camera) = camera {
            registry.camera(camera)?;
            registry.same_context(scene, camera)?;
        }
        registry.scene_mut(scene)?.camera = camera.map(RawHandle::index);
        Ok(())
    }

    fn scene_attach_shape(&self, scene: RawHandle, shape: RawHandle) -> BackendResult<()> {
        let mut registry = self.registry.borrow_mut();
        registry.shape(shape)?;
        registry.same_context(scene, shape)?;
        let state = registry.scene_mut(scene)?;
        if !state.shapes.contains(&shape.index()) {
            state.shapes.push(shape.index());
        }
        Ok(())
    }

    fn scene_detach_shape(&self, scene: RawHandle, shape: RawHandle) -> BackendResult<()> {
        let mut registry = self.registry.borrow_mut();
        registry.shape(shape)?;
        let state = registry.scene_mut(scene)?;
        let position = state
            .shapes
            .iter()
            .position(|&s| s == shape.index())
            .ok_or(Status::INVALID_PARAMETER)?;
        state.shapes.remove(position);
        Ok(())
    }

    fn scene_attach_light(&self, scene: RawHandle, light: RawHandle) -> BackendResult<()> {
        let mut registry = self.registry.borrow_mut();
        registry.light(light)?;
        registry.same_context(scene, light)?;
        let state = registry.scene_mut(scene)?;
        if !state.lights.contains(&light.index()) {
            state.lights.push(light.index());
        }
        Ok(())
    }

    fn scene_detach_light(&self, scene: RawHandle, light: RawHandle) -> BackendResult<()> {
        let mut registry = self.registry.borrow_mut();
        registry.light(light)?;
        let state = registry.scene_mut(scene)?;
        let position = state
            .lights
            .iter()
            .position(|&l| l == light.index())
            .ok_or(Status::INVALID_PARAMETER)?;
        state.lights.remove(position);
        Ok(())
    }

    fn shape_set(&self, shape: RawHandle, parameter: ShapeParameter) -> BackendResult<()> {
        let mut registry = self.registry.borrow_mut();
        if let ShapeParameter::Material(Some(node)) = parameter {
            registry.node(node)?;
            registry.same_context(shape, node)?;
        }
        let state = registry.shape_mut(shape)?;
        match parameter {
            ShapeParameter::Transform(m) => state.transform = Matrix4x4::from(m),
            ShapeParameter::Material(node) => state.material = node.map(RawHandle::index),
            // index 1 is the transform at the end of the shutter
            ShapeParameter::MotionTransform(m, 1) => state.motion_transform = Some(Matrix4x4::from(m)),
            ShapeParameter::MotionTransform(..) => return Err(Status::INVALID_PARAMETER),
            ShapeParameter::MotionTransformCount(count @ (0 | 1)) => state.motion_transform_count = count,
            ShapeParameter::MotionTransformCount(_) => return Err(Status::INVALID_PARAMETER),
            ShapeParameter::Visibility(visible) => state.visible = visible,
            ShapeParameter::ObjectId(id) => state.object_id = id,
        }
        Ok(())
    }

    fn light_set(&self, light: RawHandle, parameter: LightParameter) -> BackendResult<()> {
        let mut registry = self.registry.borrow_mut();
        if let LightParameter::EnvironmentImage(image) = parameter {
            registry.image(image)?;
            registry.same_context(light, image)?;
        }
        let state = registry.light_mut(light)?;
        match (parameter, state.kind) {
            // placement and power don't show in the stand-in, only the kind is checked
            (LightParameter::Transform(_), _)
            | (LightParameter::PointRadiantPower(_), LightKind::Point)
            | (LightParameter::DirectionalRadiantPower(_), LightKind::Directional) => {}
            (LightParameter::EnvironmentImage(image), LightKind::Environment) => state.image = Some(image.index()),
            (LightParameter::IntensityScale(scale), LightKind::Environment) => state.intensity_scale = scale,
            _ => return Err(Status::INVALID_LIGHT),
        }
        Ok(())
    }

    fn material_system_create_node(&self, system: RawHandle, node_type: u32) -> BackendResult<RawHandle> {
        let ctx = {
            let registry = self.registry.borrow();
            if !registry.is_material_system(system) {
                return Err(Status::INVALID_OBJECT);
            }
            RawHandle::from_index(registry.owner(system)?).ok_or(Status::INVALID_OBJECT)?
        };
        let known = matches!(
            node_type,
            RPR_MATERIAL_NODE::DIFFUSE
                | RPR_MATERIAL_NODE::MICROFACET
                | RPR_MATERIAL_NODE::REFLECTION
                | RPR_MATERIAL_NODE::EMISSIVE
                | RPR_MATERIAL_NODE::BLEND
                | RPR_MATERIAL_NODE::ARITHMETIC
                | RPR_MATERIAL_NODE::NORMAL_MAP
                | RPR_MATERIAL_NODE::IMAGE_TEXTURE
                | RPR_MATERIAL_NODE::CHECKER_TEXTURE
                | RPR_MATERIAL_NODE::CONSTANT_TEXTURE
                | RPR_MATERIAL_NODE::INPUT_LOOKUP
        );
        if !known {
            return Err(Status::INVALID_PARAMETER);
        }
        self.create_owned(
            ctx,
            Object::MaterialNode(NodeState {
                node_type,
                inputs: Default::default(),
            }),
        )
    }

    fn material_node_set_input(&self, node: RawHandle, key: u32, value: MaterialInputValue) -> BackendResult<()> {
        let mut registry = self.registry.borrow_mut();
        registry.node(node)?;
        match value {
            MaterialInputValue::Node(input) => {
                registry.node(input)?;
                registry.same_context(node, input)?;
                if registry.node_reaches(input.index(), node.index()) {
                    return Err(Status::INVALID_PARAMETER);
                }
            }
            MaterialInputValue::Image(image) => {
                registry.image(image)?;
                registry.same_context(node, image)?;
            }
            MaterialInputValue::Float4(_) | MaterialInputValue::Uint(_) => {}
        }
        registry.node_mut(node)?.inputs.insert(key, value);
        Ok(())
    }

    fn framebuffer_clear(&self, framebuffer: RawHandle) -> BackendResult<()> {
        let mut registry = self.registry.borrow_mut();
        registry.framebuffer_mut(framebuffer)?.pixels.fill([0.0; 4]);
        Ok(())
    }

    fn framebuffer_save_to_file(&self, framebuffer: RawHandle, path: &CStr) -> BackendResult<()> {
        let registry = self.registry.borrow();
        save_image(registry.framebuffer(framebuffer)?, path_of(path)?)
    }

    fn framebuffer_format(&self, framebuffer: RawHandle) -> BackendResult<(FramebufferFormatRaw, u32, u32)> {
        let registry = self.registry.borrow();
        let state = registry.framebuffer(framebuffer)?;
        Ok((state.format, state.width, state.height))
    }

    fn framebuffer_data(&self, framebuffer: RawHandle) -> BackendResult<Vec<f32>> {
        let registry = self.registry.borrow();
        let state = registry.framebuffer(framebuffer)?;
        let components = state.format.num_components as usize;
        Ok(state
            .pixels
            .iter()
            .flat_map(|p| p.iter().copied().take(components))
            .collect())
    }

    fn object_set_name(&self, object: RawHandle, name: &CStr) -> BackendResult<()> {
        let name = name.to_str().map_err(|_| Status::INVALID_PARAMETER)?.to_string();
        self.registry.borrow_mut().entry_mut(object)?.name = Some(name);
        Ok(())
    }

    fn object_delete(&self, object: RawHandle) -> BackendResult<()> {
        let kind = self.registry.borrow_mut().delete(object)?;
        debug!(handle = ?object, kind = kind.name(), "deleted");
        Ok(())
    }

    fn rprs_create_context(&self) -> BackendResult<RawHandle> {
        Ok(self.registry.borrow_mut().new_import_context())
    }

    fn rprs_delete_context(&self, import_ctx: RawHandle) -> BackendResult<()> {
        if self.registry.borrow_mut().import_contexts.remove(&import_ctx.index()) {
            Ok(())
        } else {
            Err(Status::INVALID_OBJECT)
        }
    }

    fn rprs_import(
        &self,
        path: &CStr,
        ctx: RawHandle,
        material_system: RawHandle,
        scene: RawHandle,
        import_ctx: RawHandle,
    ) -> BackendResult<()> {
        let registry = self.registry.borrow();
        registry.context(ctx)?;
        registry.scene(scene)?;
        if !registry.is_material_system(material_system) || !registry.import_contexts.contains(&import_ctx.index()) {
            return Err(Status::INVALID_OBJECT);
        }
        registry.same_context(ctx, scene)?;
        registry.same_context(ctx, material_system)?;
        // archives are decoded by the vendor loader only
        debug!(path = ?path, "rprs import is not available in the headless engine");
        Err(Status::UNSUPPORTED)
    }

    fn rprs_delete_imported_objects(&self, import_ctx: RawHandle) -> BackendResult<()> {
        if self.registry.borrow().import_contexts.contains(&import_ctx.index()) {
            Ok(())
        } else {
            Err(Status::INVALID_OBJECT)
        }
    }
}
