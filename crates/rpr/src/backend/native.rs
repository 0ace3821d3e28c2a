//! Forwards every [`Backend`] call to the linked Radeon ProRender library.

use std::{
    ffi::{CStr, c_void},
    mem::size_of,
    ptr::{null, null_mut},
};

use rpr_sys::*;

use super::{
    Backend, BackendResult, CameraParameter, ContextCreateInfo, FramebufferFormatRaw, LightParameter,
    MaterialInputValue, MeshArrays, ObjectKind, RawHandle, ShapeParameter,
};
use crate::error::Status;

/// The vendor library keeps its own global state, so this carries none.
#[derive(Debug, Default)]
pub struct NativeBackend;

impl NativeBackend {
    pub fn new() -> NativeBackend {
        NativeBackend
    }
}

fn created(status: rpr_status, out: *mut c_void) -> BackendResult<RawHandle> {
    Status::check(status)?;
    RawHandle::from_ptr(out).ok_or(Status(RPR_ERROR_NULLPTR))
}

fn flag(value: bool) -> rpr_bool {
    if value { RPR_TRUE } else { RPR_FALSE }
}

fn opt_ptr(handle: Option<RawHandle>) -> *mut c_void {
    handle.map_or(null_mut(), RawHandle::as_ptr)
}

fn created_list_key(kind: ObjectKind) -> Option<rpr_context_info> {
    Some(match kind {
        ObjectKind::Scene => RPR_CONTEXT::LIST_CREATED_SCENES,
        ObjectKind::Camera => RPR_CONTEXT::LIST_CREATED_CAMERAS,
        ObjectKind::Shape => RPR_CONTEXT::LIST_CREATED_SHAPES,
        ObjectKind::Light => RPR_CONTEXT::LIST_CREATED_LIGHTS,
        ObjectKind::MaterialSystem => RPR_CONTEXT::LIST_CREATED_MATERIALSYSTEM,
        ObjectKind::MaterialNode => RPR_CONTEXT::LIST_CREATED_MATERIALNODES,
        ObjectKind::Image => RPR_CONTEXT::LIST_CREATED_IMAGES,
        ObjectKind::Framebuffer => RPR_CONTEXT::LIST_CREATED_FRAMEBUFFERS,
        ObjectKind::Context => return None,
    })
}

impl NativeBackend {
    fn context_info_size(&self, ctx: RawHandle, key: rpr_context_info) -> BackendResult<usize> {
        let mut size = 0usize;
        Status::check(unsafe { rprContextGetInfo(ctx.as_ptr(), key, 0, null_mut(), &mut size) })?;
        Ok(size)
    }

    fn framebuffer_info<T: Copy + Default>(&self, fb: RawHandle, key: rpr_framebuffer_info) -> BackendResult<T> {
        let mut value = T::default();
        Status::check(unsafe {
            rprFrameBufferGetInfo(
                fb.as_ptr(),
                key,
                size_of::<T>(),
                &mut value as *mut T as *mut c_void,
                null_mut(),
            )
        })?;
        Ok(value)
    }
}

impl Backend for NativeBackend {
    fn name(&self) -> &'static str {
        "native"
    }

    fn register_plugin(&self, path: &CStr) -> i32 {
        unsafe { rprRegisterPlugin(path.as_ptr()) }
    }

    fn create_context(&self, info: &ContextCreateInfo<'_>) -> BackendResult<RawHandle> {
        // key/value pairs, zero terminated
        let properties: Vec<rpr_context_properties> = match info.precompiled_binary_path {
            Some(path) => vec![
                RPR_CONTEXT::PRECOMPILED_BINARY_PATH as usize as rpr_context_properties,
                path.as_ptr() as rpr_context_properties,
                null_mut(),
            ],
            None => vec![null_mut()],
        };
        let cache_path = info.cache_path.map_or(null(), CStr::as_ptr);
        let mut out = null_mut();
        let status = unsafe {
            rprCreateContext(
                info.api_version,
                info.plugins.as_ptr(),
                info.plugins.len(),
                info.flags,
                properties.as_ptr(),
                cache_path,
                &mut out,
            )
        };
        created(status, out)
    }

    fn context_set_active_plugin(&self, ctx: RawHandle, plugin: i32) -> BackendResult<()> {
        Status::check(unsafe { rprContextSetActivePlugin(ctx.as_ptr(), plugin) })
    }

    fn context_info_string(&self, ctx: RawHandle, key: u32) -> BackendResult<String> {
        let size = self.context_info_size(ctx, key)?;
        let mut buffer = vec![0u8; size.max(1)];
        Status::check(unsafe {
            rprContextGetInfo(ctx.as_ptr(), key, buffer.len(), buffer.as_mut_ptr() as *mut c_void, null_mut())
        })?;
        let text = CStr::from_bytes_until_nul(&buffer).map_err(|_| Status(RPR_ERROR_INTERNAL_ERROR))?;
        Ok(text.to_string_lossy().into_owned())
    }

    fn context_created_objects(&self, ctx: RawHandle, kind: ObjectKind) -> BackendResult<usize> {
        let key = created_list_key(kind).ok_or(Status::INVALID_PARAMETER)?;
        Ok(self.context_info_size(ctx, key)? / size_of::<*mut c_void>())
    }

    fn context_set_parameter_1u(&self, ctx: RawHandle, key: u32, value: u32) -> BackendResult<()> {
        Status::check(unsafe { rprContextSetParameterByKey1u(ctx.as_ptr(), key, value) })
    }

    fn context_set_parameter_1f(&self, ctx: RawHandle, key: u32, value: f32) -> BackendResult<()> {
        Status::check(unsafe { rprContextSetParameterByKey1f(ctx.as_ptr(), key, value) })
    }

    fn context_set_scene(&self, ctx: RawHandle, scene: Option<RawHandle>) -> BackendResult<()> {
        Status::check(unsafe { rprContextSetScene(ctx.as_ptr(), opt_ptr(scene)) })
    }

    fn context_set_aov(&self, ctx: RawHandle, aov: u32, framebuffer: Option<RawHandle>) -> BackendResult<()> {
        Status::check(unsafe { rprContextSetAOV(ctx.as_ptr(), aov, opt_ptr(framebuffer)) })
    }

    fn context_render(&self, ctx: RawHandle) -> BackendResult<()> {
        Status::check(unsafe { rprContextRender(ctx.as_ptr()) })
    }

    fn context_resolve_framebuffer(
        &self,
        ctx: RawHandle,
        src: RawHandle,
        dst: RawHandle,
        no_display_gamma: bool,
    ) -> BackendResult<()> {
        Status::check(unsafe {
            rprContextResolveFrameBuffer(ctx.as_ptr(), src.as_ptr(), dst.as_ptr(), flag(no_display_gamma))
        })
    }

    fn context_create_scene(&self, ctx: RawHandle) -> BackendResult<RawHandle> {
        let mut out = null_mut();
        created(unsafe { rprContextCreateScene(ctx.as_ptr(), &mut out) }, out)
    }

    fn context_create_material_system(&self, ctx: RawHandle, kind: u32) -> BackendResult<RawHandle> {
        let mut out = null_mut();
        created(unsafe { rprContextCreateMaterialSystem(ctx.as_ptr(), kind, &mut out) }, out)
    }

    fn context_create_camera(&self, ctx: RawHandle) -> BackendResult<RawHandle> {
        let mut out = null_mut();
        created(unsafe { rprContextCreateCamera(ctx.as_ptr(), &mut out) }, out)
    }

    fn context_create_mesh(&self, ctx: RawHandle, mesh: &MeshArrays<'_>) -> BackendResult<RawHandle> {
        const VEC3_STRIDE: rpr_int = size_of::<[f32; 3]>() as rpr_int;
        const VEC2_STRIDE: rpr_int = size_of::<[f32; 2]>() as rpr_int;
        const INDEX_STRIDE: rpr_int = size_of::<rpr_int>() as rpr_int;

        let uv_layers = if mesh.uvs.is_empty() { 0 } else { 1 };
        let texcoords = [mesh.uvs.as_ptr() as *const rpr_float];
        let texcoord_counts = [mesh.uvs.len()];
        let texcoord_strides = [VEC2_STRIDE];
        let texcoord_indices = [mesh.uv_indices.as_ptr()];
        let texcoord_index_strides = [INDEX_STRIDE];
        let motion_properties = [RPR_MESH::MOTION_DIMENSION, mesh.motion_keys, 0];
        let properties = if mesh.motion_keys > 1 { motion_properties.as_ptr() } else { null() };

        let mut out = null_mut();
        let status = unsafe {
            rprContextCreateMeshEx2(
                ctx.as_ptr(),
                mesh.positions.as_ptr() as *const rpr_float,
                mesh.positions.len(),
                VEC3_STRIDE,
                mesh.normals.as_ptr() as *const rpr_float,
                mesh.normals.len(),
                VEC3_STRIDE,
                null(),
                0,
                0,
                uv_layers,
                texcoords.as_ptr(),
                texcoord_counts.as_ptr(),
                texcoord_strides.as_ptr(),
                mesh.position_indices.as_ptr(),
                INDEX_STRIDE,
                mesh.normal_indices.as_ptr(),
                INDEX_STRIDE,
                texcoord_indices.as_ptr(),
                texcoord_index_strides.as_ptr(),
                mesh.face_vertex_counts.as_ptr(),
                mesh.face_vertex_counts.len(),
                properties,
                &mut out,
            )
        };
        created(status, out)
    }

    fn context_create_instance(&self, ctx: RawHandle, prototype: RawHandle) -> BackendResult<RawHandle> {
        let mut out = null_mut();
        created(unsafe { rprContextCreateInstance(ctx.as_ptr(), prototype.as_ptr(), &mut out) }, out)
    }

    fn context_create_point_light(&self, ctx: RawHandle) -> BackendResult<RawHandle> {
        let mut out = null_mut();
        created(unsafe { rprContextCreatePointLight(ctx.as_ptr(), &mut out) }, out)
    }

    fn context_create_directional_light(&self, ctx: RawHandle) -> BackendResult<RawHandle> {
        let mut out = null_mut();
        created(unsafe { rprContextCreateDirectionalLight(ctx.as_ptr(), &mut out) }, out)
    }

    fn context_create_environment_light(&self, ctx: RawHandle) -> BackendResult<RawHandle> {
        let mut out = null_mut();
        created(unsafe { rprContextCreateEnvironmentLight(ctx.as_ptr(), &mut out) }, out)
    }

    fn context_create_image_from_file(&self, ctx: RawHandle, path: &CStr) -> BackendResult<RawHandle> {
        let mut out = null_mut();
        created(unsafe { rprContextCreateImageFromFile(ctx.as_ptr(), path.as_ptr(), &mut out) }, out)
    }

    fn context_create_framebuffer(
        &self,
        ctx: RawHandle,
        format: FramebufferFormatRaw,
        width: u32,
        height: u32,
    ) -> BackendResult<RawHandle> {
        let format = rpr_framebuffer_format {
            num_components: format.num_components,
            type_: format.component_type,
        };
        let desc = rpr_framebuffer_desc {
            fb_width: width,
            fb_height: height,
        };
        let mut out = null_mut();
        created(unsafe { rprContextCreateFrameBuffer(ctx.as_ptr(), format, &desc, &mut out) }, out)
    }

    fn camera_look_at(&self, camera: RawHandle, pos: [f32; 3], at: [f32; 3], up: [f32; 3]) -> BackendResult<()> {
        Status::check(unsafe {
            rprCameraLookAt(
                camera.as_ptr(),
                pos[0], pos[1], pos[2],
                at[0], at[1], at[2],
                up[0], up[1], up[2],
            )
        })
    }

    fn camera_set(&self, camera: RawHandle, parameter: CameraParameter) -> BackendResult<()> {
        let camera = camera.as_ptr();
        Status::check(unsafe {
            match parameter {
                CameraParameter::FocalLength(f) => rprCameraSetFocalLength(camera, f),
                CameraParameter::Exposure(e) => rprCameraSetExposure(camera, e),
                CameraParameter::FStop(f) => rprCameraSetFStop(camera, f),
                CameraParameter::FocusDistance(d) => rprCameraSetFocusDistance(camera, d),
                CameraParameter::ApertureBlades(n) => rprCameraSetApertureBlades(camera, n),
                CameraParameter::SensorSize(w, h) => rprCameraSetSensorSize(camera, w, h),
                CameraParameter::Mode(mode) => rprCameraSetMode(camera, mode),
                CameraParameter::OrthoWidth(w) => rprCameraSetOrthoWidth(camera, w),
            }
        })
    }

    fn scene_set_camera(&self, scene: RawHandle, camera: Option<RawHandle>) -> BackendResult<()> {
        Status::check(unsafe { rprSceneSetCamera(scene.as_ptr(), opt_ptr(camera)) })
    }

    fn scene_attach_shape(&self, scene: RawHandle, shape: RawHandle) -> BackendResult<()> {
        Status::check(unsafe { rprSceneAttachShape(scene.as_ptr(), shape.as_ptr()) })
    }

    fn scene_detach_shape(&self, scene: RawHandle, shape: RawHandle) -> BackendResult<()> {
        Status::check(unsafe { rprSceneDetachShape(scene.as_ptr(), shape.as_ptr()) })
    }

    fn scene_attach_light(&self, scene: RawHandle, light: RawHandle) -> BackendResult<()> {
        Status::check(unsafe { rprSceneAttachLight(scene.as_ptr(), light.as_ptr()) })
    }

    fn scene_detach_light(&self, scene: RawHandle, light: RawHandle) -> BackendResult<()> {
        Status::check(unsafe { rprSceneDetachLight(scene.as_ptr(), light.as_ptr()) })
    }

    fn shape_set(&self, shape: RawHandle, parameter: ShapeParameter) -> BackendResult<()> {
        let shape = shape.as_ptr();
        Status::check(unsafe {
            match parameter {
                ShapeParameter::Transform(m) => rprShapeSetTransform(shape, RPR_TRUE, m.as_ptr()),
                ShapeParameter::Material(node) => rprShapeSetMaterial(shape, opt_ptr(node)),
                ShapeParameter::MotionTransform(m, index) => {
                    rprShapeSetMotionTransform(shape, RPR_TRUE, m.as_ptr(), index)
                }
                ShapeParameter::MotionTransformCount(count) => rprShapeSetMotionTransformCount(shape, count),
                ShapeParameter::Visibility(visible) => rprShapeSetVisibility(shape, flag(visible)),
                ShapeParameter::ObjectId(id) => rprShapeSetObjectID(shape, id),
            }
        })
    }

    fn light_set(&self, light: RawHandle, parameter: LightParameter) -> BackendResult<()> {
        let light = light.as_ptr();
        Status::check(unsafe {
            match parameter {
                LightParameter::Transform(m) => rprLightSetTransform(light, RPR_TRUE, m.as_ptr()),
                LightParameter::PointRadiantPower([r, g, b]) => rprPointLightSetRadiantPower3f(light, r, g, b),
                LightParameter::DirectionalRadiantPower([r, g, b]) => {
                    rprDirectionalLightSetRadiantPower3f(light, r, g, b)
                }
                LightParameter::EnvironmentImage(image) => rprEnvironmentLightSetImage(light, image.as_ptr()),
                LightParameter::IntensityScale(scale) => rprEnvironmentLightSetIntensityScale(light, scale),
            }
        })
    }

    fn material_system_create_node(&self, system: RawHandle, node_type: u32) -> BackendResult<RawHandle> {
        let mut out = null_mut();
        created(unsafe { rprMaterialSystemCreateNode(system.as_ptr(), node_type, &mut out) }, out)
    }

    fn material_node_set_input(&self, node: RawHandle, key: u32, value: MaterialInputValue) -> BackendResult<()> {
        let node = node.as_ptr();
        Status::check(unsafe {
            match value {
                MaterialInputValue::Float4([x, y, z, w]) => rprMaterialNodeSetInputFByKey(node, key, x, y, z, w),
                MaterialInputValue::Uint(u) => rprMaterialNodeSetInputUByKey(node, key, u),
                MaterialInputValue::Node(input) => rprMaterialNodeSetInputNByKey(node, key, input.as_ptr()),
                MaterialInputValue::Image(image) => rprMaterialNodeSetInputImageDataByKey(node, key, image.as_ptr()),
            }
        })
    }

    fn framebuffer_clear(&self, framebuffer: RawHandle) -> BackendResult<()> {
        Status::check(unsafe { rprFrameBufferClear(framebuffer.as_ptr()) })
    }

    fn framebuffer_save_to_file(&self, framebuffer: RawHandle, path: &CStr) -> BackendResult<()> {
        Status::check(unsafe { rprFrameBufferSaveToFile(framebuffer.as_ptr(), path.as_ptr()) })
    }

    fn framebuffer_format(&self, framebuffer: RawHandle) -> BackendResult<(FramebufferFormatRaw, u32, u32)> {
        let format: rpr_framebuffer_format = self.framebuffer_info(framebuffer, RPR_FRAMEBUFFER::FORMAT)?;
        let desc: rpr_framebuffer_desc = self.framebuffer_info(framebuffer, RPR_FRAMEBUFFER::DESC)?;
        let format = FramebufferFormatRaw {
            num_components: format.num_components,
            component_type: format.type_,
        };
        Ok((format, desc.fb_width, desc.fb_height))
    }

    fn framebuffer_data(&self, framebuffer: RawHandle) -> BackendResult<Vec<f32>> {
        let mut size = 0usize;
        Status::check(unsafe {
            rprFrameBufferGetInfo(framebuffer.as_ptr(), RPR_FRAMEBUFFER::DATA, 0, null_mut(), &mut size)
        })?;
        let mut data = vec![0f32; size / size_of::<f32>()];
        Status::check(unsafe {
            rprFrameBufferGetInfo(
                framebuffer.as_ptr(),
                RPR_FRAMEBUFFER::DATA,
                data.len() * size_of::<f32>(),
                data.as_mut_ptr() as *mut c_void,
                null_mut(),
            )
        })?;
        Ok(data)
    }

    fn object_set_name(&self, object: RawHandle, name: &CStr) -> BackendResult<()> {
        Status::check(unsafe { rprObjectSetName(object.as_ptr(), name.as_ptr()) })
    }

    fn object_delete(&self, object: RawHandle) -> BackendResult<()> {
        Status::check(unsafe { rprObjectDelete(object.as_ptr()) })
    }

    fn rprs_create_context(&self) -> BackendResult<RawHandle> {
        let mut out = null_mut();
        created(unsafe { rprsCreateContext(&mut out) }, out)
    }

    fn rprs_delete_context(&self, import_ctx: RawHandle) -> BackendResult<()> {
        Status::check(unsafe { rprsDeleteContext(import_ctx.as_ptr()) })
    }

    fn rprs_import(
        &self,
        path: &CStr,
        ctx: RawHandle,
        material_system: RawHandle,
        scene: RawHandle,
        import_ctx: RawHandle,
    ) -> BackendResult<()> {
        let mut scene = scene.as_ptr();
        Status::check(unsafe {
            rprsImport(
                path.as_ptr(),
                ctx.as_ptr(),
                material_system.as_ptr(),
                &mut scene,
                true,
                import_ctx.as_ptr(),
            )
        })
    }

    fn rprs_delete_imported_objects(&self, import_ctx: RawHandle) -> BackendResult<()> {
        Status::check(unsafe { rprsDeleteListImportedObjects(import_ctx.as_ptr()) })
    }
}
