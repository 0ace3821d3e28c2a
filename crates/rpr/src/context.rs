use std::{path::PathBuf, time::Instant};

use bitflags::bitflags;
use rpr_sys::*;
use tracing::{debug, info, info_span, warn};

use crate::{
    backend::{Backend, FramebufferFormatRaw, ObjectKind, RawHandle},
    camera::Camera,
    engine::{Engine, c_path},
    error::{Checked, Result},
    framebuffer::{Framebuffer, FramebufferFormat},
    image::Image,
    import::ImportContext,
    light::{Light, LightKind},
    material::MaterialSystem,
    object::ObjectHandle,
    plugin::PluginId,
    scene::Scene,
    shape::{MeshData, Shape},
};

bitflags! {
    /// Devices and compute APIs a context may use.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CreationFlags: u32 {
        const GPU0 = RPR_CREATION_FLAGS::ENABLE_GPU0;
        const GPU1 = RPR_CREATION_FLAGS::ENABLE_GPU1;
        const GPU2 = RPR_CREATION_FLAGS::ENABLE_GPU2;
        const GPU3 = RPR_CREATION_FLAGS::ENABLE_GPU3;
        const GPU4 = RPR_CREATION_FLAGS::ENABLE_GPU4;
        const GPU5 = RPR_CREATION_FLAGS::ENABLE_GPU5;
        const GPU6 = RPR_CREATION_FLAGS::ENABLE_GPU6;
        const GPU7 = RPR_CREATION_FLAGS::ENABLE_GPU7;
        const CPU = RPR_CREATION_FLAGS::ENABLE_CPU;
        const GL_INTEROP = RPR_CREATION_FLAGS::ENABLE_GL_INTEROP;
        const HIP = RPR_CREATION_FLAGS::ENABLE_HIP;
        const METAL = RPR_CREATION_FLAGS::ENABLE_METAL;
        const DEBUG = RPR_CREATION_FLAGS::ENABLE_DEBUG;
    }
}

impl CreationFlags {
    /// The GPU bits are not contiguous: CPU and GL interop sit between GPU3 and GPU4.
    const GPUS: [CreationFlags; 8] = [
        CreationFlags::GPU0,
        CreationFlags::GPU1,
        CreationFlags::GPU2,
        CreationFlags::GPU3,
        CreationFlags::GPU4,
        CreationFlags::GPU5,
        CreationFlags::GPU6,
        CreationFlags::GPU7,
    ];

    /// Flag selecting GPU `index`, `None` past the last supported device.
    pub fn gpu(index: usize) -> Option<CreationFlags> {
        CreationFlags::GPUS.get(index).copied()
    }
}

impl Default for CreationFlags {
    fn default() -> Self {
        CreationFlags::GPU0
    }
}

/// Everything needed to create a [`Context`].
#[derive(Debug, Clone, Default)]
pub struct ContextDescriptor {
    pub plugins: Vec<PluginId>,
    pub active_plugin: Option<PluginId>,
    pub flags: CreationFlags,
    pub cache_path: Option<PathBuf>,
    pub precompiled_binary_path: Option<PathBuf>,
}

impl ContextDescriptor {
    pub fn new(plugin: PluginId) -> ContextDescriptor {
        ContextDescriptor {
            plugins: vec![plugin],
            ..Default::default()
        }
    }

    pub fn with_plugin(mut self, plugin: PluginId) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn active_plugin(mut self, plugin: PluginId) -> Self {
        self.active_plugin = Some(plugin);
        self
    }

    pub fn flags(mut self, flags: CreationFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Directory of precompiled kernels (the SDK's `hipbin`).
    pub fn precompiled_binary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.precompiled_binary_path = Some(path.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContextParameter {
    /// Samples accumulated per render call.
    Iterations(u32),
    DisplayGamma(f32),
    MaxRecursion(u32),
}

/// Render outputs a framebuffer can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aov {
    Color,
    Opacity,
    WorldCoordinate,
    Uv,
    GeometricNormal,
    ShadingNormal,
    Depth,
    ObjectId,
}

impl Aov {
    pub fn raw(self) -> rpr_aov {
        match self {
            Aov::Color => RPR_AOV::COLOR,
            Aov::Opacity => RPR_AOV::OPACITY,
            Aov::WorldCoordinate => RPR_AOV::WORLD_COORDINATE,
            Aov::Uv => RPR_AOV::UV,
            Aov::GeometricNormal => RPR_AOV::GEOMETRIC_NORMAL,
            Aov::ShadingNormal => RPR_AOV::SHADING_NORMAL,
            Aov::Depth => RPR_AOV::DEPTH,
            Aov::ObjectId => RPR_AOV::OBJECT_ID,
        }
    }
}

/// Root engine object. Everything else is created from, and borrows, a context.
pub struct Context<'e> {
    engine: &'e Engine,
    raw: RawHandle,
    released: bool,
}

impl<'e> Context<'e> {
    pub(crate) fn from_raw(engine: &'e Engine, raw: RawHandle) -> Context<'e> {
        Context {
            engine,
            raw,
            released: false,
        }
    }

    pub fn raw(&self) -> RawHandle {
        self.raw
    }

    pub fn backend(&self) -> &'e dyn Backend {
        self.engine.backend()
    }

    pub fn set_parameter(&self, parameter: ContextParameter) -> Result<()> {
        let backend = self.backend();
        match parameter {
            ContextParameter::Iterations(n) => backend.context_set_parameter_1u(self.raw, RPR_CONTEXT::ITERATIONS, n),
            ContextParameter::DisplayGamma(g) => {
                backend.context_set_parameter_1f(self.raw, RPR_CONTEXT::DISPLAY_GAMMA, g)
            }
            ContextParameter::MaxRecursion(n) => {
                backend.context_set_parameter_1u(self.raw, RPR_CONTEXT::MAX_RECURSION, n)
            }
        }
        .checked("rprContextSetParameterByKey")
    }

    pub fn set_scene(&self, scene: Option<&Scene<'_>>) -> Result<()> {
        self.backend()
            .context_set_scene(self.raw, scene.map(Scene::raw))
            .checked("rprContextSetScene")
    }

    pub fn set_aov(&self, aov: Aov, framebuffer: Option<&Framebuffer<'_>>) -> Result<()> {
        self.backend()
            .context_set_aov(self.raw, aov.raw(), framebuffer.map(Framebuffer::raw))
            .checked("rprContextSetAOV")
    }

    /// Blocks until the configured iterations are accumulated.
    pub fn render(&self) -> Result<()> {
        let span = info_span!("render", backend = self.backend().name());
        let _guard = span.enter();
        let start = Instant::now();
        self.backend().context_render(self.raw).checked("rprContextRender")?;
        info!(elapsed = ?start.elapsed(), "render finished");
        Ok(())
    }

    /// Normalizes `src` into `dst`, applying display gamma unless `no_display_gamma`.
    pub fn resolve(&self, src: &Framebuffer<'_>, dst: &Framebuffer<'_>, no_display_gamma: bool) -> Result<()> {
        self.backend()
            .context_resolve_framebuffer(self.raw, src.raw(), dst.raw(), no_display_gamma)
            .checked("rprContextResolveFrameBuffer")
    }

    /// Name of the first device the context renders on.
    pub fn device_name(&self) -> Result<String> {
        self.backend()
            .context_info_string(self.raw, RPR_CONTEXT::GPU0_NAME)
            .checked("rprContextGetInfo")
    }

    /// Objects of each kind still alive in the context, skipping kinds with none.
    pub fn leaked_objects(&self) -> Result<Vec<(ObjectKind, usize)>> {
        let mut leaks = Vec::new();
        for kind in ObjectKind::DEPENDENTS {
            let count = self
                .backend()
                .context_created_objects(self.raw, kind)
                .checked("rprContextGetInfo")?;
            if count > 0 {
                leaks.push((kind, count));
            }
        }
        Ok(leaks)
    }

    /// Logs every leaked object kind. Returns true when nothing leaked.
    pub fn check_no_leak(&self) -> Result<bool> {
        let leaks = self.leaked_objects()?;
        for (kind, count) in &leaks {
            warn!(kind = kind.name(), count, "object not released");
        }
        Ok(leaks.is_empty())
    }

    pub fn create_scene(&self) -> Result<Scene<'_>> {
        let raw = self
            .backend()
            .context_create_scene(self.raw)
            .checked("rprContextCreateScene")?;
        Ok(Scene::new(ObjectHandle::new(self, raw, ObjectKind::Scene)))
    }

    pub fn create_material_system(&self) -> Result<MaterialSystem<'_>> {
        let raw = self
            .backend()
            .context_create_material_system(self.raw, RPR_MATERIAL_SYSTEM_TYPE::DEFAULT)
            .checked("rprContextCreateMaterialSystem")?;
        Ok(MaterialSystem::new(ObjectHandle::new(self, raw, ObjectKind::MaterialSystem)))
    }

    pub fn create_camera(&self) -> Result<Camera<'_>> {
        let raw = self
            .backend()
            .context_create_camera(self.raw)
            .checked("rprContextCreateCamera")?;
        Ok(Camera::new(ObjectHandle::new(self, raw, ObjectKind::Camera)))
    }

    pub fn create_mesh(&self, mesh: &MeshData) -> Result<Shape<'_>> {
        mesh.validate()?;
        let raw = self
            .backend()
            .context_create_mesh(self.raw, &mesh.arrays())
            .checked("rprContextCreateMeshEx2")?;
        Ok(Shape::new(ObjectHandle::new(self, raw, ObjectKind::Shape)))
    }

    pub(crate) fn create_instance_of(&self, prototype: RawHandle) -> Result<Shape<'_>> {
        let raw = self
            .backend()
            .context_create_instance(self.raw, prototype)
            .checked("rprContextCreateInstance")?;
        Ok(Shape::new(ObjectHandle::new(self, raw, ObjectKind::Shape)))
    }

    pub fn create_point_light(&self) -> Result<Light<'_>> {
        let raw = self
            .backend()
            .context_create_point_light(self.raw)
            .checked("rprContextCreatePointLight")?;
        Ok(Light::new(ObjectHandle::new(self, raw, ObjectKind::Light), LightKind::Point))
    }

    pub fn create_directional_light(&self) -> Result<Light<'_>> {
        let raw = self
            .backend()
            .context_create_directional_light(self.raw)
            .checked("rprContextCreateDirectionalLight")?;
        Ok(Light::new(ObjectHandle::new(self, raw, ObjectKind::Light), LightKind::Directional))
    }

    pub fn create_environment_light(&self) -> Result<Light<'_>> {
        let raw = self
            .backend()
            .context_create_environment_light(self.raw)
            .checked("rprContextCreateEnvironmentLight")?;
        Ok(Light::new(ObjectHandle::new(self, raw, ObjectKind::Light), LightKind::Environment))
    }

    pub fn create_image_from_file(&self, path: &std::path::Path) -> Result<Image<'_>> {
        let c_path = c_path(path)?;
        let raw = self
            .backend()
            .context_create_image_from_file(self.raw, &c_path)
            .checked("rprContextCreateImageFromFile")?;
        Ok(Image::new(ObjectHandle::new(self, raw, ObjectKind::Image), path.to_path_buf()))
    }

    pub fn create_framebuffer(&self, format: FramebufferFormat, width: u32, height: u32) -> Result<Framebuffer<'_>> {
        let raw = self
            .backend()
            .context_create_framebuffer(
                self.raw,
                FramebufferFormatRaw {
                    num_components: format.components,
                    component_type: format.component_type.raw(),
                },
                width,
                height,
            )
            .checked("rprContextCreateFrameBuffer")?;
        Ok(Framebuffer::new(
            ObjectHandle::new(self, raw, ObjectKind::Framebuffer),
            format,
            width,
            height,
        ))
    }

    /// Tracking scope for scene-file imports.
    pub fn create_import_context(&self) -> Result<ImportContext<'_>> {
        let raw = self.backend().rprs_create_context().checked("rprsCreateContext")?;
        Ok(ImportContext::new(self, raw))
    }

    /// Releases the context. Only possible once nothing borrows it.
    pub fn destroy(mut self) -> Result<()> {
        self.released = true;
        debug!(handle = ?self.raw, "destroying context");
        self.backend().object_delete(self.raw).checked("rprObjectDelete")
    }
}

impl Drop for Context<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(status) = self.backend().object_delete(self.raw) {
            warn!(handle = ?self.raw, %status, "failed to destroy context");
        }
    }
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Context").field(&self.raw).finish()
    }
}
