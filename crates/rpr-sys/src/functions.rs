use std::ffi::c_void;

use crate::*;

unsafe extern "C" {
    pub fn rprRegisterPlugin(path: *const rpr_char) -> rpr_int;

    pub fn rprCreateContext(
        api_version: rpr_int,
        pluginIDs: *const rpr_int,
        pluginCount: usize,
        creation_flags: rpr_creation_flags,
        props: *const rpr_context_properties,
        cache_path: *const rpr_char,
        out_context: *mut rpr_context,
    ) -> rpr_status;
    pub fn rprContextSetActivePlugin(context: rpr_context, pluginID: rpr_int) -> rpr_status;
    pub fn rprContextGetInfo(
        context: rpr_context,
        context_info: rpr_context_info,
        size: usize,
        data: *mut c_void,
        size_ret: *mut usize,
    ) -> rpr_status;
    pub fn rprContextSetParameterByKey1u(context: rpr_context, in_input: rpr_context_info, x: rpr_uint) -> rpr_status;
    pub fn rprContextSetParameterByKey1f(context: rpr_context, in_input: rpr_context_info, x: rpr_float) -> rpr_status;
    pub fn rprContextSetScene(context: rpr_context, scene: rpr_scene) -> rpr_status;
    pub fn rprContextSetAOV(context: rpr_context, aov: rpr_aov, frame_buffer: rpr_framebuffer) -> rpr_status;
    pub fn rprContextRender(context: rpr_context) -> rpr_status;
    pub fn rprContextResolveFrameBuffer(
        context: rpr_context,
        src_frame_buffer: rpr_framebuffer,
        dst_frame_buffer: rpr_framebuffer,
        noDisplayGamma: rpr_bool,
    ) -> rpr_status;

    pub fn rprContextCreateScene(context: rpr_context, out_scene: *mut rpr_scene) -> rpr_status;
    pub fn rprContextCreateMaterialSystem(
        in_context: rpr_context,
        type_: rpr_material_system_type,
        out_matsys: *mut rpr_material_system,
    ) -> rpr_status;
    pub fn rprContextCreateCamera(context: rpr_context, out_camera: *mut rpr_camera) -> rpr_status;
    pub fn rprContextCreateMeshEx2(
        context: rpr_context,
        vertices: *const rpr_float,
        num_vertices: usize,
        vertex_stride: rpr_int,
        normals: *const rpr_float,
        num_normals: usize,
        normal_stride: rpr_int,
        perVertexFlag: *const rpr_int,
        num_perVertexFlags: usize,
        perVertexFlag_stride: rpr_int,
        numberOfTexCoordLayers: rpr_int,
        texcoords: *const *const rpr_float,
        num_texcoords: *const usize,
        texcoord_stride: *const rpr_int,
        vertex_indices: *const rpr_int,
        vidx_stride: rpr_int,
        normal_indices: *const rpr_int,
        nidx_stride: rpr_int,
        texcoord_indices: *const *const rpr_int,
        tidx_stride: *const rpr_int,
        num_face_vertices: *const rpr_int,
        num_faces: usize,
        mesh_properties: *const rpr_mesh_info,
        out_mesh: *mut rpr_shape,
    ) -> rpr_status;
    pub fn rprContextCreateInstance(context: rpr_context, shape: rpr_shape, out_instance: *mut rpr_shape) -> rpr_status;
    pub fn rprContextCreatePointLight(context: rpr_context, out_light: *mut rpr_light) -> rpr_status;
    pub fn rprContextCreateDirectionalLight(context: rpr_context, out_light: *mut rpr_light) -> rpr_status;
    pub fn rprContextCreateEnvironmentLight(context: rpr_context, out_light: *mut rpr_light) -> rpr_status;
    pub fn rprContextCreateImageFromFile(context: rpr_context, path: *const rpr_char, out_image: *mut rpr_image) -> rpr_status;
    pub fn rprContextCreateFrameBuffer(
        context: rpr_context,
        format: rpr_framebuffer_format,
        fb_desc: *const rpr_framebuffer_desc,
        out_fb: *mut rpr_framebuffer,
    ) -> rpr_status;

    pub fn rprCameraLookAt(
        camera: rpr_camera,
        posx: rpr_float, posy: rpr_float, posz: rpr_float,
        atx: rpr_float, aty: rpr_float, atz: rpr_float,
        upx: rpr_float, upy: rpr_float, upz: rpr_float,
    ) -> rpr_status;
    pub fn rprCameraSetFocalLength(camera: rpr_camera, flength: rpr_float) -> rpr_status;
    pub fn rprCameraSetExposure(camera: rpr_camera, exposure: rpr_float) -> rpr_status;
    pub fn rprCameraSetFStop(camera: rpr_camera, fstop: rpr_float) -> rpr_status;
    pub fn rprCameraSetFocusDistance(camera: rpr_camera, fdist: rpr_float) -> rpr_status;
    pub fn rprCameraSetApertureBlades(camera: rpr_camera, num_blades: rpr_uint) -> rpr_status;
    pub fn rprCameraSetSensorSize(camera: rpr_camera, width: rpr_float, height: rpr_float) -> rpr_status;
    pub fn rprCameraSetMode(camera: rpr_camera, mode: rpr_camera_mode) -> rpr_status;
    pub fn rprCameraSetOrthoWidth(camera: rpr_camera, width: rpr_float) -> rpr_status;

    pub fn rprSceneSetCamera(scene: rpr_scene, camera: rpr_camera) -> rpr_status;
    pub fn rprSceneAttachShape(scene: rpr_scene, shape: rpr_shape) -> rpr_status;
    pub fn rprSceneDetachShape(scene: rpr_scene, shape: rpr_shape) -> rpr_status;
    pub fn rprSceneAttachLight(scene: rpr_scene, light: rpr_light) -> rpr_status;
    pub fn rprSceneDetachLight(scene: rpr_scene, light: rpr_light) -> rpr_status;

    pub fn rprShapeSetTransform(shape: rpr_shape, transpose: rpr_bool, transform: *const rpr_float) -> rpr_status;
    pub fn rprShapeSetMaterial(shape: rpr_shape, material: rpr_material_node) -> rpr_status;
    pub fn rprShapeSetMotionTransform(
        shape: rpr_shape,
        transpose: rpr_bool,
        transform: *const rpr_float,
        timeIndex: rpr_uint,
    ) -> rpr_status;
    pub fn rprShapeSetMotionTransformCount(shape: rpr_shape, timeIndex: rpr_uint) -> rpr_status;
    pub fn rprShapeSetVisibility(shape: rpr_shape, visible: rpr_bool) -> rpr_status;
    pub fn rprShapeSetObjectID(shape: rpr_shape, objectID: rpr_uint) -> rpr_status;

    pub fn rprLightSetTransform(light: rpr_light, transpose: rpr_bool, transform: *const rpr_float) -> rpr_status;
    pub fn rprPointLightSetRadiantPower3f(light: rpr_light, r: rpr_float, g: rpr_float, b: rpr_float) -> rpr_status;
    pub fn rprDirectionalLightSetRadiantPower3f(light: rpr_light, r: rpr_float, g: rpr_float, b: rpr_float) -> rpr_status;
    pub fn rprEnvironmentLightSetImage(env_light: rpr_light, image: rpr_image) -> rpr_status;
    pub fn rprEnvironmentLightSetIntensityScale(env_light: rpr_light, intensity_scale: rpr_float) -> rpr_status;

    pub fn rprMaterialSystemCreateNode(
        in_matsys: rpr_material_system,
        in_type: rpr_material_node_type,
        out_node: *mut rpr_material_node,
    ) -> rpr_status;
    pub fn rprMaterialNodeSetInputFByKey(
        in_node: rpr_material_node,
        in_input: rpr_material_node_input,
        in_value_x: rpr_float,
        in_value_y: rpr_float,
        in_value_z: rpr_float,
        in_value_w: rpr_float,
    ) -> rpr_status;
    pub fn rprMaterialNodeSetInputUByKey(
        in_node: rpr_material_node,
        in_input: rpr_material_node_input,
        in_value: rpr_uint,
    ) -> rpr_status;
    pub fn rprMaterialNodeSetInputNByKey(
        in_node: rpr_material_node,
        in_input: rpr_material_node_input,
        in_input_node: rpr_material_node,
    ) -> rpr_status;
    pub fn rprMaterialNodeSetInputImageDataByKey(
        in_node: rpr_material_node,
        in_input: rpr_material_node_input,
        image: rpr_image,
    ) -> rpr_status;

    pub fn rprFrameBufferClear(frame_buffer: rpr_framebuffer) -> rpr_status;
    pub fn rprFrameBufferSaveToFile(frame_buffer: rpr_framebuffer, file_path: *const rpr_char) -> rpr_status;
    pub fn rprFrameBufferGetInfo(
        framebuffer: rpr_framebuffer,
        info: rpr_framebuffer_info,
        size: usize,
        data: *mut c_void,
        size_ret: *mut usize,
    ) -> rpr_status;

    pub fn rprObjectSetName(node: *mut c_void, name: *const rpr_char) -> rpr_status;
    pub fn rprObjectDelete(obj: *mut c_void) -> rpr_status;

    pub fn rprsCreateContext(out_context: *mut RPRS_context) -> rpr_status;
    pub fn rprsDeleteContext(context: RPRS_context) -> rpr_status;
    pub fn rprsImport(
        rprsFileName: *const rpr_char,
        context: rpr_context,
        materialSystem: rpr_material_system,
        scene: *mut rpr_scene,
        useAlreadyExistingScene: bool,
        rprsCtx: RPRS_context,
    ) -> rpr_status;
    pub fn rprsDeleteListImportedObjects(rprsCtx: RPRS_context) -> rpr_status;
}
