use std::path::{Path, PathBuf};

use rpr_sys::RPR_API_VERSION;

use crate::{
    backend::{Backend, ContextCreateInfo, headless::{DEVICE_NAME, HeadlessBackend}},
    geometry::{Matrix4x4, Vec3},
    primitives, Aov, ArithmeticOp, Camera, ComponentType, Context, ContextDescriptor, ContextParameter, Engine, Error,
    FramebufferFormat, Light, MaterialInput, MaterialNode, MaterialSystem, NodeKind, ObjectKind,
    RenderLoop, Scene, Shape, Status,
};

const WIDTH: u32 = 64;
const HEIGHT: u32 = 48;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

fn context(engine: &Engine) -> Context<'_> {
    let plugin = engine.register_plugin(Path::new("libNorthstar64.so")).unwrap();
    engine.create_context(&ContextDescriptor::new(plugin)).unwrap()
}

fn status_of<T: std::fmt::Debug>(result: crate::Result<T>) -> Option<Status> {
    result.unwrap_err().status()
}

/// The two-shape, one-light scene every render test starts from.
struct Demo<'c> {
    scene: Scene<'c>,
    camera: Camera<'c>,
    materials: MaterialSystem<'c>,
    cube: Shape<'c>,
    plane: Shape<'c>,
    cube_material: MaterialNode<'c>,
    plane_material: MaterialNode<'c>,
    light: Light<'c>,
    render: RenderLoop<'c>,
}

impl<'c> Demo<'c> {
    fn new(ctx: &'c Context<'c>) -> Demo<'c> {
        let scene = ctx.create_scene().unwrap();
        ctx.set_scene(Some(&scene)).unwrap();

        let camera = ctx.create_camera().unwrap();
        camera
            .look_at(Vec3(0.0, 5.0, 20.0), Vec3(0.0, 1.0, 0.0), Vec3(0.0, 1.0, 0.0))
            .unwrap();
        camera.set_focal_length(75.0).unwrap();
        scene.set_camera(Some(&camera)).unwrap();

        let materials = ctx.create_material_system().unwrap();
        let cube = ctx.create_mesh(&primitives::cube()).unwrap();
        cube.set_transform(&Matrix4x4::translation(Vec3(-2.0, 1.0, 0.0))).unwrap();
        let cube_material = materials.diffuse([0.0, 0.5, 1.0, 0.0]).unwrap();
        cube.set_material(Some(&cube_material)).unwrap();
        scene.attach_shape(&cube).unwrap();

        let plane = ctx.create_mesh(&primitives::plane()).unwrap();
        let plane_material = materials.diffuse([1.0, 0.2, 0.0, 0.0]).unwrap();
        plane.set_material(Some(&plane_material)).unwrap();
        scene.attach_shape(&plane).unwrap();

        let light = ctx.create_point_light().unwrap();
        light.set_transform(&Matrix4x4::translation(Vec3(0.0, 8.0, 2.0))).unwrap();
        light.set_radiant_power(Vec3(200.0, 200.0, 200.0)).unwrap();
        scene.attach_light(&light).unwrap();

        ctx.set_parameter(ContextParameter::DisplayGamma(2.2)).unwrap();
        let render = RenderLoop::new(ctx, WIDTH, HEIGHT).unwrap();

        Demo {
            scene,
            camera,
            materials,
            cube,
            plane,
            cube_material,
            plane_material,
            light,
            render,
        }
    }

    fn frame(&self) -> Vec<f32> {
        self.render.frame(4).unwrap();
        self.render.resolved().data().unwrap()
    }
}

fn is_black(pixels: &[f32]) -> bool {
    pixels.chunks_exact(4).all(|p| p[0] == 0.0 && p[1] == 0.0 && p[2] == 0.0)
}

#[test]
fn every_kind_can_be_created_and_deleted() {
    let dir = tempfile::tempdir().unwrap();
    let texture = dir.path().join("texture.png");
    image::RgbImage::from_pixel(4, 2, image::Rgb([128, 128, 255])).save(&texture).unwrap();

    let engine = Engine::headless();
    let ctx = context(&engine);
    {
        let scene = ctx.create_scene().unwrap();
        let camera = ctx.create_camera().unwrap();
        let cube = ctx.create_mesh(&primitives::cube()).unwrap();
        let instance = cube.instance().unwrap();
        let point = ctx.create_point_light().unwrap();
        let directional = ctx.create_directional_light().unwrap();
        let environment = ctx.create_environment_light().unwrap();
        let materials = ctx.create_material_system().unwrap();
        let node = materials.create_node(NodeKind::Diffuse).unwrap();
        let image = ctx.create_image_from_file(&texture).unwrap();
        let framebuffer = ctx.create_framebuffer(FramebufferFormat::default(), 8, 8).unwrap();
        let import = ctx.create_import_context().unwrap();

        assert_eq!(ctx.leaked_objects().unwrap().len(), 8);

        import.delete().unwrap();
        instance.delete().unwrap();
        cube.delete().unwrap();
        point.delete().unwrap();
        directional.delete().unwrap();
        environment.delete().unwrap();
        camera.delete().unwrap();
        node.delete().unwrap();
        image.delete().unwrap();
        framebuffer.delete().unwrap();
        scene.delete().unwrap();
        materials.delete().unwrap();
    }
    assert!(ctx.check_no_leak().unwrap());
    ctx.destroy().unwrap();
}

#[test]
fn context_with_live_objects_cannot_be_deleted() {
    let backend = HeadlessBackend::new();
    let plugin = backend.register_plugin(c"libTahoe64.so");
    let ctx = backend
        .create_context(&ContextCreateInfo {
            api_version: RPR_API_VERSION,
            plugins: &[plugin],
            flags: crate::CreationFlags::GPU0.bits(),
            cache_path: None,
            precompiled_binary_path: None,
        })
        .unwrap();
    let scene = backend.context_create_scene(ctx).unwrap();

    assert_eq!(backend.object_delete(ctx), Err(Status::INVALID_CONTEXT));
    backend.object_delete(scene).unwrap();
    assert_eq!(backend.object_delete(scene), Err(Status::INVALID_OBJECT));
    backend.object_delete(ctx).unwrap();
    assert_eq!(backend.object_delete(ctx), Err(Status::INVALID_OBJECT));
    assert_eq!(backend.live_objects(), 0);
}

#[test]
fn context_needs_a_known_api_version_and_device() {
    let backend = HeadlessBackend::new();
    let plugin = backend.register_plugin(c"libNorthstar64.so");
    let mut info = ContextCreateInfo {
        api_version: RPR_API_VERSION - 1,
        plugins: &[plugin],
        flags: crate::CreationFlags::GPU0.bits(),
        cache_path: None,
        precompiled_binary_path: None,
    };
    assert_eq!(backend.create_context(&info), Err(Status::INVALID_API_VERSION));
    info.api_version = RPR_API_VERSION;
    info.flags = crate::CreationFlags::DEBUG.bits();
    assert_eq!(backend.create_context(&info), Err(Status::INVALID_PARAMETER));
}

#[test]
fn unknown_plugin_is_reported() {
    let engine = Engine::headless();
    let err = engine.register_plugin(Path::new("libNotARenderer.so")).unwrap_err();
    assert!(matches!(err, Error::PluginNotFound(_)));
}

#[test]
fn device_name_is_reported() {
    let engine = Engine::headless();
    let ctx = context(&engine);
    assert_eq!(ctx.device_name().unwrap(), DEVICE_NAME);
}

#[test]
fn orderly_teardown_leaves_nothing() {
    let engine = Engine::headless();
    let ctx = context(&engine);
    let demo = Demo::new(&ctx);
    demo.frame();
    assert!(!ctx.leaked_objects().unwrap().is_empty());
    drop(demo);
    assert_eq!(ctx.leaked_objects().unwrap(), vec![]);
    ctx.destroy().unwrap();
}

#[test]
fn scene_without_shapes_or_lights_renders_background_only() {
    let engine = Engine::headless();
    let ctx = context(&engine);
    let demo = Demo::new(&ctx);
    assert!(!is_black(&demo.frame()));

    demo.scene.detach_shape(&demo.cube).unwrap();
    demo.scene.detach_shape(&demo.plane).unwrap();
    demo.scene.detach_light(&demo.light).unwrap();
    assert!(is_black(&demo.frame()));
}

#[test]
fn detaching_twice_fails() {
    let engine = Engine::headless();
    let ctx = context(&engine);
    let demo = Demo::new(&ctx);
    demo.scene.detach_shape(&demo.cube).unwrap();
    assert_eq!(status_of(demo.scene.detach_shape(&demo.cube)), Some(Status::INVALID_PARAMETER));
}

#[test]
fn reattaching_reproduces_the_render() {
    let engine = Engine::headless();
    let ctx = context(&engine);
    let demo = Demo::new(&ctx);
    let before = demo.frame();

    demo.scene.detach_shape(&demo.cube).unwrap();
    let without_cube = demo.frame();
    assert_ne!(before, without_cube);

    demo.scene.attach_shape(&demo.cube).unwrap();
    assert_eq!(demo.frame(), before);
}

#[test]
fn renders_are_deterministic() {
    let first_engine = Engine::headless();
    let first_ctx = context(&first_engine);
    let second_engine = Engine::headless();
    let second_ctx = context(&second_engine);

    let first = Demo::new(&first_ctx).frame();
    let second = Demo::new(&second_ctx).frame();
    assert_eq!(first, second);
}

#[test]
fn deleting_a_material_unbinds_it() {
    let engine = Engine::headless();
    let ctx = context(&engine);
    let demo = Demo::new(&ctx);
    let with_material = demo.frame();

    demo.cube.set_material(None).unwrap();
    let without_material = demo.frame();
    assert_ne!(with_material, without_material);

    demo.cube.set_material(Some(&demo.plane_material)).unwrap();
    assert_ne!(demo.frame(), with_material);

    let replacement = demo.materials.diffuse([0.0, 0.5, 1.0, 0.0]).unwrap();
    demo.cube.set_material(Some(&replacement)).unwrap();
    assert_eq!(demo.frame(), with_material);
    replacement.delete().unwrap();
    assert_eq!(demo.frame(), without_material);
}

#[test]
fn material_graph_must_stay_acyclic() {
    let engine = Engine::headless();
    let ctx = context(&engine);
    let materials = ctx.create_material_system().unwrap();
    let a = materials.arithmetic(ArithmeticOp::Add).unwrap();
    let b = materials.arithmetic(ArithmeticOp::Mul).unwrap();
    let c = materials.create_node(NodeKind::ConstantTexture).unwrap();

    a.set_input_node(MaterialInput::Color0, &b).unwrap();
    b.set_input_node(MaterialInput::Color0, &c).unwrap();
    assert_eq!(
        status_of(c.set_input_node(MaterialInput::Value, &a)),
        Some(Status::INVALID_PARAMETER)
    );
    assert_eq!(
        status_of(a.set_input_node(MaterialInput::Color1, &a)),
        Some(Status::INVALID_PARAMETER)
    );
    // replacing an edge is fine as long as no loop appears
    a.set_input_node(MaterialInput::Color0, &c).unwrap();
}

#[test]
fn objects_from_another_context_are_rejected() {
    let engine = Engine::headless();
    let first = context(&engine);
    let second = context(&engine);
    let scene = first.create_scene().unwrap();
    let cube = second.create_mesh(&primitives::cube()).unwrap();
    assert_eq!(status_of(scene.attach_shape(&cube)), Some(Status::INVALID_PARAMETER));
}

#[test]
fn light_setters_check_the_light_kind() {
    let engine = Engine::headless();
    let ctx = context(&engine);
    let environment = ctx.create_environment_light().unwrap();
    assert_eq!(
        status_of(environment.set_radiant_power(Vec3(1.0, 1.0, 1.0))),
        Some(Status::INVALID_LIGHT)
    );
    let point = ctx.create_point_light().unwrap();
    assert_eq!(status_of(point.set_intensity_scale(2.0)), Some(Status::INVALID_LIGHT));
}

#[test]
fn invalid_meshes_never_reach_the_engine() {
    let engine = Engine::headless();
    let ctx = context(&engine);
    let mut mesh = primitives::plane();
    mesh.position_indices[0] = 99;
    assert!(matches!(ctx.create_mesh(&mesh), Err(Error::InvalidMesh(_))));
    assert!(ctx.check_no_leak().unwrap());
}

#[test]
fn environment_light_fills_the_background() {
    let dir = tempfile::tempdir().unwrap();
    let sky = dir.path().join("sky.png");
    image::RgbImage::from_pixel(8, 4, image::Rgb([255, 255, 255])).save(&sky).unwrap();

    let engine = Engine::headless();
    let ctx = context(&engine);
    let demo = Demo::new(&ctx);
    demo.scene.detach_shape(&demo.cube).unwrap();
    demo.scene.detach_shape(&demo.plane).unwrap();
    demo.scene.detach_light(&demo.light).unwrap();

    let image = ctx.create_image_from_file(&sky).unwrap();
    let environment = ctx.create_environment_light().unwrap();
    environment.set_image(&image).unwrap();
    environment.set_intensity_scale(0.5).unwrap();
    demo.scene.attach_light(&environment).unwrap();

    let pixels = demo.frame();
    let expected = 0.5f32.powf(1.0 / 2.2);
    assert!(pixels.chunks_exact(4).all(|p| (p[0] - expected).abs() < 1e-4));
}

#[test]
fn motion_blur_needs_exposure() {
    let engine = Engine::headless();
    let ctx = context(&engine);
    let demo = Demo::new(&ctx);
    demo.scene.detach_shape(&demo.cube).unwrap();

    let moving = ctx.create_mesh(&primitives::sheared_cube(0.3, 0.3)).unwrap();
    moving.set_transform(&Matrix4x4::translation(Vec3(-2.0, 1.0, 0.0))).unwrap();
    moving.set_material(Some(&demo.cube_material)).unwrap();
    demo.scene.attach_shape(&moving).unwrap();
    let still = demo.frame();

    demo.camera.set_exposure(1.0).unwrap();
    let blurred = demo.frame();
    assert_ne!(still, blurred);

    // transform motion on a rigid shape
    demo.camera.set_exposure(0.0).unwrap();
    demo.scene.detach_shape(&moving).unwrap();
    demo.scene.attach_shape(&demo.cube).unwrap();
    demo.cube
        .set_motion_transform(&Matrix4x4::translation(Vec3(0.0, 1.0, 0.0)))
        .unwrap();
    let rigid_still = demo.frame();
    demo.camera.set_exposure(1.0).unwrap();
    assert_ne!(demo.frame(), rigid_still);
}

#[test]
fn resolve_applies_display_gamma() {
    let engine = Engine::headless();
    let ctx = context(&engine);
    let demo = Demo::new(&ctx);
    let linear = ctx.create_framebuffer(FramebufferFormat::default(), WIDTH, HEIGHT).unwrap();
    demo.render.frame(2).unwrap();
    ctx.resolve(demo.render.accumulation(), &linear, true).unwrap();

    let linear = linear.data().unwrap();
    let corrected = demo.render.resolved().data().unwrap();
    let mut checked = 0;
    for (l, c) in linear.chunks_exact(4).zip(corrected.chunks_exact(4)) {
        if l[0] > 0.01 {
            assert!((c[0] - l[0].powf(1.0 / 2.2)).abs() < 1e-5);
            checked += 1;
        }
    }
    assert!(checked > 0);
}

#[test]
fn resolve_needs_matching_sizes() {
    let engine = Engine::headless();
    let ctx = context(&engine);
    let small = ctx.create_framebuffer(FramebufferFormat::default(), 4, 4).unwrap();
    let large = ctx.create_framebuffer(FramebufferFormat::default(), 8, 8).unwrap();
    assert_eq!(status_of(ctx.resolve(&small, &large, false)), Some(Status::INVALID_PARAMETER));
}

#[test]
fn framebuffer_data_follows_the_format() {
    let engine = Engine::headless();
    let ctx = context(&engine);
    let framebuffer = ctx
        .create_framebuffer(FramebufferFormat::new(3, ComponentType::Float32), 5, 2)
        .unwrap();
    assert_eq!(framebuffer.size(), (5, 2));
    assert_eq!(framebuffer.data().unwrap().len(), 30);
    assert!(ctx.create_framebuffer(FramebufferFormat::new(5, ComponentType::Uint8), 5, 2).is_err());
}

#[test]
fn non_color_outputs_can_be_bound() {
    let engine = Engine::headless();
    let ctx = context(&engine);
    let demo = Demo::new(&ctx);
    demo.cube.set_object_id(7).unwrap();
    let ids = ctx.create_framebuffer(FramebufferFormat::default(), WIDTH, HEIGHT).unwrap();
    ctx.set_aov(Aov::ObjectId, Some(&ids)).unwrap();
    demo.render.frame(1).unwrap();
    // accumulated, not yet resolved: value times weight in rgb, weight in alpha
    let data = ids.data().unwrap();
    assert!(data.chunks_exact(4).any(|p| p[0] / p[3] == 7.0));
}

#[test]
fn saved_png_can_be_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    let engine = Engine::headless();
    let ctx = context(&engine);
    let demo = Demo::new(&ctx);
    demo.render.render_to(2, &path).unwrap();

    let saved = image::open(&path).unwrap();
    assert_eq!((saved.width(), saved.height()), (WIDTH, HEIGHT));
    assert_eq!(
        status_of(demo.render.save(&dir.path().join("frame.unknown"))),
        Some(Status::UNSUPPORTED_IMAGE_FORMAT)
    );
}

#[test]
fn rprs_import_is_unsupported_and_leaves_the_scene_alone() {
    let engine = Engine::headless();
    let ctx = context(&engine);
    let demo = Demo::new(&ctx);
    let before = demo.frame();

    let mut import = ctx.create_import_context().unwrap();
    let result = import.import(Path::new("matball.rprs"), &demo.materials, &demo.scene);
    assert_eq!(status_of(result), Some(Status::UNSUPPORTED));
    assert_eq!(import.object_count(), 0);
    assert_eq!(demo.frame(), before);
    import.delete().unwrap();
}

#[test]
fn unknown_scene_extension_is_rejected() {
    let engine = Engine::headless();
    let ctx = context(&engine);
    let scene = ctx.create_scene().unwrap();
    let materials = ctx.create_material_system().unwrap();
    let mut import = ctx.create_import_context().unwrap();
    let result = import.import(Path::new("scene.obj"), &materials, &scene);
    assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
}

#[test]
fn gltf_import_populates_and_bulk_deletes() {
    let engine = Engine::headless();
    let ctx = context(&engine);
    let scene = ctx.create_scene().unwrap();
    ctx.set_scene(Some(&scene)).unwrap();
    let materials = ctx.create_material_system().unwrap();
    let render = RenderLoop::new(&ctx, WIDTH, HEIGHT).unwrap();

    let mut import = ctx.create_import_context().unwrap();
    import.import(&fixture("triangles.gltf"), &materials, &scene).unwrap();
    // one mesh used by two nodes
    assert_eq!(import.shapes().len(), 2);
    assert_eq!(import.lights().len(), 1);
    assert_eq!(import.cameras().len(), 1);

    render.frame(1).unwrap();
    assert!(!is_black(&render.resolved().data().unwrap()));

    import.delete_imported_objects().unwrap();
    assert_eq!(import.object_count(), 0);
    let leaks = ctx.leaked_objects().unwrap();
    assert!(leaks.iter().all(|(kind, _)| !matches!(kind, ObjectKind::Shape | ObjectKind::Light | ObjectKind::Camera)));

    render.frame(1).unwrap();
    assert!(is_black(&render.resolved().data().unwrap()));
    import.delete().unwrap();
}

#[test]
fn dropping_an_import_context_releases_what_it_imported() {
    let engine = Engine::headless();
    let ctx = context(&engine);
    {
        let scene = ctx.create_scene().unwrap();
        let materials = ctx.create_material_system().unwrap();
        let mut import = ctx.create_import_context().unwrap();
        import.import(&fixture("triangles.gltf"), &materials, &scene).unwrap();
        assert!(import.object_count() > 0);

        // never deleted, only dropped
        drop(import);
        let leaks = ctx.leaked_objects().unwrap();
        assert_eq!(leaks, vec![(ObjectKind::Scene, 1), (ObjectKind::MaterialSystem, 1)]);
    }
    assert_eq!(ctx.leaked_objects().unwrap(), vec![]);
    ctx.destroy().unwrap();
}

#[test]
fn importing_without_detaching_gives_the_union() {
    let engine = Engine::headless();
    let ctx = context(&engine);
    let demo = Demo::new(&ctx);
    let original = demo.frame();

    let mut import = ctx.create_import_context().unwrap();
    import.import(&fixture("triangles.gltf"), &demo.materials, &demo.scene).unwrap();
    demo.scene.set_camera(Some(&demo.camera)).unwrap();
    assert_ne!(demo.frame(), original);

    // taking the imported objects back out restores the original content
    for shape in import.shapes() {
        demo.scene.detach_shape(shape).unwrap();
    }
    for light in import.lights() {
        demo.scene.detach_light(light).unwrap();
    }
    assert_eq!(demo.frame(), original);
}
