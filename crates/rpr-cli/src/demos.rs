//! Built-in demonstration sequences.
//!
//! Every demo builds its own objects on the context it is handed and releases
//! them before returning, so demos can run back to back on one context.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use indicatif::ProgressStyle;
use rpr::{
    Aov, ArithmeticOp, Camera, Context, ContextParameter, Framebuffer, FramebufferFormat, Image, Light, LookupValue,
    MaterialInput, MaterialNode, MaterialSystem, NodeKind, RenderLoop, Scene, Shape, Status,
    geometry::{Matrix4x4, Vec3},
    primitives,
};
use tracing::{info, info_span, warn};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::settings::RenderSettings;

/// Where demos read resources from and write their images to.
pub struct DemoEnv {
    pub settings: RenderSettings,
    /// `Resources` folder of the SDK, when one was given.
    pub resources: Option<PathBuf>,
}

impl DemoEnv {
    pub fn output(&self, file_name: &str) -> PathBuf {
        self.settings.output_dir.join(file_name)
    }

    fn resource(&self, relative: &str) -> Option<PathBuf> {
        let path = self.resources.as_ref()?.join(relative);
        if path.exists() {
            Some(path)
        } else {
            warn!(path = %path.display(), "resource not found");
            None
        }
    }

    /// Resource texture, or a generated stand-in written next to the outputs.
    fn texture(
        &self,
        relative: &str,
        stand_in: &str,
        generate: fn(&Path) -> image::ImageResult<()>,
    ) -> anyhow::Result<PathBuf> {
        if let Some(path) = self.resource(relative) {
            return Ok(path);
        }
        let path = self.output(stand_in);
        generate(&path).with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "using a generated stand-in for {relative}");
        Ok(path)
    }
}

fn sky(path: &Path) -> image::ImageResult<()> {
    image::RgbImage::from_fn(64, 32, |_, y| {
        let t = y as f32 / 31.0;
        let mix = |top: f32, bottom: f32| ((top + (bottom - top) * t) * 255.0) as u8;
        image::Rgb([mix(0.45, 0.9), mix(0.6, 0.85), mix(1.0, 0.7)])
    })
    .save(path)
}

fn rust_checker(path: &Path) -> image::ImageResult<()> {
    image::RgbImage::from_fn(64, 64, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            image::Rgb([170, 110, 70])
        } else {
            image::Rgb([60, 50, 45])
        }
    })
    .save(path)
}

pub struct Demo {
    pub name: &'static str,
    pub description: &'static str,
    pub run: fn(&Context<'_>, &DemoEnv) -> anyhow::Result<Vec<PathBuf>>,
}

pub const fn all_demos() -> &'static [Demo] {
    &[
        Demo {
            name: "context_creation",
            description: "create a context and report the device it runs on",
            run: context_creation,
        },
        Demo {
            name: "basic_scene",
            description: "checkered cube, two planes and a point light",
            run: basic_scene,
        },
        Demo {
            name: "environment_light",
            description: "basic scene lit by an environment map instead of the point light",
            run: environment_light,
        },
        Demo {
            name: "deformation_motion_blur",
            description: "cube replaced by a mesh with a second, sheared motion key",
            run: deformation_motion_blur,
        },
        Demo {
            name: "transform_motion_blur",
            description: "cube moving along x during the exposure",
            run: transform_motion_blur,
        },
        Demo {
            name: "camera_dof",
            description: "wide-open aperture focused on the cube, floor and panel out of focus",
            run: camera_dof,
        },
        Demo {
            name: "framebuffer_access",
            description: "rendered pixels read back and reused as the cube's texture",
            run: framebuffer_access,
        },
        Demo {
            name: "aov",
            description: "object id, depth and uv outputs rendered next to the color",
            run: aov,
        },
        Demo {
            name: "instancing",
            description: "second cube drawn as an instance of the first",
            run: instancing,
        },
        Demo {
            name: "rprs_import",
            description: "matball archive imported into the emptied basic scene",
            run: rprs_import,
        },
        Demo {
            name: "gltf_import",
            description: "glTF scene imported into a fresh scene",
            run: gltf_import,
        },
    ]
}

pub fn find_demo(name: &str) -> Option<&'static Demo> {
    all_demos().iter().find(|demo| demo.name == name)
}

/// Runs one demo and reports objects it failed to release.
pub fn run_demo(ctx: &Context<'_>, env: &DemoEnv, demo: &Demo) -> anyhow::Result<Vec<PathBuf>> {
    info!(demo = demo.name, "running");
    let outputs = (demo.run)(ctx, env).with_context(|| format!("demo {} failed", demo.name))?;
    for path in &outputs {
        info!(path = %path.display(), "saved");
    }
    if !ctx.check_no_leak()? {
        warn!(demo = demo.name, "objects outlived the demo");
    }
    Ok(outputs)
}

fn render_frame(render: &RenderLoop<'_>, env: &DemoEnv, file_name: &str) -> anyhow::Result<PathBuf> {
    let path = env.output(file_name);
    let span = info_span!("frame", file = file_name);
    span.pb_set_style(&ProgressStyle::with_template("[{elapsed_precise}] {spinner} rendering {span_fields}")?);
    let _guard = span.enter();
    render
        .render_to(env.settings.iterations, &path)
        .with_context(|| format!("failed to render {}", path.display()))?;
    Ok(path)
}

/// Blend of two diffuse colors weighted by a checker pattern over scaled UVs.
///
/// Returns the blend node and the upstream nodes it reads from, which must
/// stay alive as long as the blend is in use.
fn checker_material<'c>(materials: &MaterialSystem<'c>) -> rpr::Result<(MaterialNode<'c>, Vec<MaterialNode<'c>>)> {
    let diffuse_a = materials.diffuse([0.0, 0.5, 1.0, 0.0])?;
    let diffuse_b = materials.diffuse([0.5, 0.2, 1.0, 0.0])?;

    let uv = materials.lookup(LookupValue::Uv)?;
    let uv_scaled = materials.arithmetic(ArithmeticOp::Mul)?;
    uv_scaled.set_input_node(MaterialInput::Color0, &uv)?;
    uv_scaled.set_input_f4(MaterialInput::Color1, [0.7, 0.7, 0.0, 0.0])?;

    let checker = materials.create_node(NodeKind::CheckerTexture)?;
    checker.set_input_node(MaterialInput::Uv, &uv_scaled)?;

    let layered = materials.create_node(NodeKind::Blend)?;
    layered.set_input_node(MaterialInput::Color0, &diffuse_a)?;
    layered.set_input_node(MaterialInput::Color1, &diffuse_b)?;
    layered.set_input_node(MaterialInput::Weight, &checker)?;
    layered.set_name("checker_blend")?;

    Ok((layered, vec![diffuse_a, diffuse_b, uv, uv_scaled, checker]))
}

/// The scene the tutorial sequences start from.
struct BasicScene<'c> {
    scene: Scene<'c>,
    camera: Camera<'c>,
    materials: MaterialSystem<'c>,
    cube: Shape<'c>,
    cube_material: MaterialNode<'c>,
    plane: Shape<'c>,
    textured_plane: Shape<'c>,
    light: Light<'c>,
    _nodes: Vec<MaterialNode<'c>>,
    _texture: Image<'c>,
    render: RenderLoop<'c>,
}

impl<'c> BasicScene<'c> {
    fn build(ctx: &'c Context<'c>, env: &DemoEnv) -> anyhow::Result<BasicScene<'c>> {
        let scene = ctx.create_scene()?;
        ctx.set_scene(Some(&scene))?;

        let camera = ctx.create_camera()?;
        camera.look_at(Vec3(0.0, 5.0, 20.0), Vec3(0.0, 1.0, 0.0), Vec3(0.0, 1.0, 0.0))?;
        camera.set_focal_length(75.0)?;
        scene.set_camera(Some(&camera))?;

        let materials = ctx.create_material_system()?;
        let (cube_material, mut nodes) = checker_material(&materials)?;

        let cube = ctx.create_mesh(&primitives::cube())?;
        cube.set_name("cube")?;
        cube.set_transform(&Matrix4x4::translation(Vec3(-2.0, 1.0, 0.0)))?;
        cube.set_material(Some(&cube_material))?;
        scene.attach_shape(&cube)?;

        let plane = ctx.create_mesh(&primitives::plane())?;
        plane.set_name("floor")?;
        let floor_material = materials.diffuse([1.0, 0.2, 0.0, 0.0])?;
        plane.set_material(Some(&floor_material))?;
        scene.attach_shape(&plane)?;
        nodes.push(floor_material);

        let texture_path = env.texture("Textures/lead_rusted_Base_Color.jpg", "stand_in_texture.png", rust_checker)?;
        let texture = ctx
            .create_image_from_file(&texture_path)
            .with_context(|| format!("failed to load {}", texture_path.display()))?;
        let texture_node = materials.image_texture(&texture)?;
        let textured_material = materials.create_node(NodeKind::Diffuse)?;
        textured_material.set_input_node(MaterialInput::Color, &texture_node)?;

        // small upright panel right of the cube
        #[rustfmt::skip]
        let panel = Matrix4x4::create(
            0.1001, 0.0, 0.0, 2.0,
            0.0, 0.0, -0.1, 2.0,
            0.0, 0.1, 0.0, 0.8,
            0.0, 0.0, 0.0, 1.0,
        );
        let textured_plane = ctx.create_mesh(&primitives::plane())?;
        textured_plane.set_name("panel")?;
        textured_plane.set_transform(&panel)?;
        textured_plane.set_material(Some(&textured_material))?;
        scene.attach_shape(&textured_plane)?;
        nodes.push(texture_node);
        nodes.push(textured_material);

        let light = ctx.create_point_light()?;
        light.set_transform(&Matrix4x4::translation(Vec3(0.0, 8.0, 2.0)))?;
        light.set_radiant_power(Vec3(200.0, 200.0, 200.0))?;
        scene.attach_light(&light)?;

        ctx.set_parameter(ContextParameter::DisplayGamma(env.settings.display_gamma))?;
        let render = RenderLoop::new(ctx, env.settings.width, env.settings.height)?;

        Ok(BasicScene {
            scene,
            camera,
            materials,
            cube,
            cube_material,
            plane,
            textured_plane,
            light,
            _nodes: nodes,
            _texture: texture,
            render,
        })
    }

    fn render_to(&self, env: &DemoEnv, file_name: &str) -> anyhow::Result<PathBuf> {
        render_frame(&self.render, env, file_name)
    }
}

/// Environment light over the SDK's HDR map or a generated sky.
fn environment<'c>(ctx: &'c Context<'c>, env: &DemoEnv) -> anyhow::Result<(Light<'c>, Image<'c>)> {
    let path = env.texture("Textures/turning_area_4k.hdr", "stand_in_sky.png", sky)?;
    let image = ctx
        .create_image_from_file(&path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    let light = ctx.create_environment_light()?;
    light.set_image(&image)?;
    light.set_intensity_scale(0.8)?;
    Ok((light, image))
}

fn context_creation(ctx: &Context<'_>, _env: &DemoEnv) -> anyhow::Result<Vec<PathBuf>> {
    let device = ctx.device_name().context("failed to query the device name")?;
    info!(device = %device, "context ready");
    Ok(Vec::new())
}

fn basic_scene(ctx: &Context<'_>, env: &DemoEnv) -> anyhow::Result<Vec<PathBuf>> {
    let demo = BasicScene::build(ctx, env)?;
    Ok(vec![demo.render_to(env, "basic_scene.png")?])
}

fn environment_light(ctx: &Context<'_>, env: &DemoEnv) -> anyhow::Result<Vec<PathBuf>> {
    let demo = BasicScene::build(ctx, env)?;
    demo.scene.detach_light(&demo.light)?;
    let (sky_light, _sky) = environment(ctx, env)?;
    demo.scene.attach_light(&sky_light)?;
    Ok(vec![demo.render_to(env, "environment_light.png")?])
}

fn deformation_motion_blur(ctx: &Context<'_>, env: &DemoEnv) -> anyhow::Result<Vec<PathBuf>> {
    let demo = BasicScene::build(ctx, env)?;
    demo.scene.detach_light(&demo.light)?;
    let (sky_light, _sky) = environment(ctx, env)?;
    demo.scene.attach_light(&sky_light)?;

    demo.scene.detach_shape(&demo.cube)?;
    let sheared = ctx.create_mesh(&primitives::sheared_cube(0.3, 0.3))?;
    sheared.set_transform(&Matrix4x4::translation(Vec3(-2.0, 1.0, 0.0)))?;
    sheared.set_material(Some(&demo.cube_material))?;
    demo.scene.attach_shape(&sheared)?;

    // blur only shows with a nonzero exposure
    demo.camera.set_exposure(1.0)?;
    Ok(vec![demo.render_to(env, "deformation_motion_blur.png")?])
}

fn transform_motion_blur(ctx: &Context<'_>, env: &DemoEnv) -> anyhow::Result<Vec<PathBuf>> {
    let demo = BasicScene::build(ctx, env)?;
    demo.camera.set_exposure(1.0)?;
    demo.cube
        .set_motion_transform(&Matrix4x4::translation(Vec3(-1.0, 1.0, 0.0)))?;
    Ok(vec![demo.render_to(env, "transform_motion_blur.png")?])
}

fn camera_dof(ctx: &Context<'_>, env: &DemoEnv) -> anyhow::Result<Vec<PathBuf>> {
    let demo = BasicScene::build(ctx, env)?;
    let eye = Vec3(0.0, 5.0, 20.0);
    let cube = Vec3(-2.0, 1.0, 0.0);
    demo.camera.look_at(eye, cube, Vec3(0.0, 1.0, 0.0))?;
    demo.camera.set_focal_length(50.0)?;
    demo.camera.set_sensor_size(36.0, 24.0)?;
    demo.camera.set_focus_distance((eye - cube).length())?;
    demo.camera.set_fstop(1.4)?;
    demo.camera.set_aperture_blades(5)?;
    Ok(vec![demo.render_to(env, "camera_dof.png")?])
}

/// Resolved pixels as an 8-bit image, rows from the top.
fn readback(framebuffer: &Framebuffer<'_>) -> anyhow::Result<image::RgbaImage> {
    let (width, height) = framebuffer.size();
    let components = framebuffer.format().components as usize;
    let data = framebuffer.data()?;
    let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
    for texel in data.chunks_exact(components) {
        let channel = |i: usize| texel.get(i).copied().unwrap_or(1.0);
        pixels.extend([channel(0), channel(1), channel(2), channel(3)].map(to_u8));
    }
    image::RgbaImage::from_raw(width, height, pixels).context("framebuffer data is shorter than its size")
}

fn framebuffer_access(ctx: &Context<'_>, env: &DemoEnv) -> anyhow::Result<Vec<PathBuf>> {
    let demo = BasicScene::build(ctx, env)?;
    demo.render.frame(env.settings.iterations)?;

    let first_pass = env.output("framebuffer_access_first_pass.png");
    readback(demo.render.resolved())?
        .save(&first_pass)
        .with_context(|| format!("failed to write {}", first_pass.display()))?;

    // the first render becomes the cube's texture for the second
    let rendered = ctx.create_image_from_file(&first_pass)?;
    let texture = demo.materials.image_texture(&rendered)?;
    let material = demo.materials.create_node(NodeKind::Diffuse)?;
    material.set_input_node(MaterialInput::Color, &texture)?;
    demo.cube.set_material(Some(&material))?;
    demo.camera
        .look_at(Vec3(30.0, 14.0, 30.0), Vec3(0.0, 2.5, 0.0), Vec3(0.0, 1.0, 0.0))?;

    let output = demo.render_to(env, "framebuffer_access.png")?;
    demo.cube.set_material(Some(&demo.cube_material))?;
    Ok(vec![first_pass, output])
}

fn aov(ctx: &Context<'_>, env: &DemoEnv) -> anyhow::Result<Vec<PathBuf>> {
    let demo = BasicScene::build(ctx, env)?;
    for (id, shape) in [&demo.cube, &demo.plane, &demo.textured_plane].into_iter().enumerate() {
        shape.set_object_id(id as u32 + 1)?;
    }

    let (width, height) = (env.settings.width, env.settings.height);
    let outputs = [(Aov::ObjectId, "aov_object_id.png"), (Aov::Depth, "aov_depth.png"), (Aov::Uv, "aov_uv.png")];
    let mut targets = Vec::with_capacity(outputs.len());
    for (kind, file_name) in outputs {
        let accumulation = ctx.create_framebuffer(FramebufferFormat::default(), width, height)?;
        let resolved = ctx.create_framebuffer(FramebufferFormat::default(), width, height)?;
        ctx.set_aov(kind, Some(&accumulation))?;
        targets.push((kind, file_name, accumulation, resolved));
    }

    let mut saved = vec![demo.render_to(env, "aov_color.png")?];
    for (kind, file_name, accumulation, resolved) in &targets {
        // data outputs are not display values
        ctx.resolve(accumulation, resolved, true)?;
        let path = env.output(file_name);
        resolved.save(&path)?;
        saved.push(path);
        ctx.set_aov(*kind, None)?;
    }
    Ok(saved)
}

fn instancing(ctx: &Context<'_>, env: &DemoEnv) -> anyhow::Result<Vec<PathBuf>> {
    let demo = BasicScene::build(ctx, env)?;
    let instance = demo.cube.instance()?;
    instance.set_transform(&Matrix4x4::translation(Vec3(2.0, 1.0, 0.0)))?;
    instance.set_material(Some(&demo.cube_material))?;
    demo.scene.attach_shape(&instance)?;
    Ok(vec![demo.render_to(env, "instancing.png")?])
}

fn rprs_import(ctx: &Context<'_>, env: &DemoEnv) -> anyhow::Result<Vec<PathBuf>> {
    let Some(archive) = env.resource("Meshes/matball.rprs") else {
        warn!("no matball archive available, skipping");
        return Ok(Vec::new());
    };

    let demo = BasicScene::build(ctx, env)?;
    demo.scene.detach_shape(&demo.cube)?;
    demo.scene.detach_shape(&demo.plane)?;
    demo.scene.detach_shape(&demo.textured_plane)?;
    demo.scene.detach_light(&demo.light)?;

    let mut import = ctx.create_import_context()?;
    match import.import(&archive, &demo.materials, &demo.scene) {
        Ok(()) => {}
        Err(err) if err.status() == Some(Status::UNSUPPORTED) => {
            warn!("this engine can't load .rprs archives, skipping");
            return Ok(Vec::new());
        }
        Err(err) => return Err(err).with_context(|| format!("failed to import {}", archive.display())),
    }

    let output = demo.render_to(env, "rprs_import.png")?;
    import.delete_imported_objects()?;
    import.delete()?;
    Ok(vec![output])
}

fn gltf_import(ctx: &Context<'_>, env: &DemoEnv) -> anyhow::Result<Vec<PathBuf>> {
    let Some(path) = env.resource("Meshes/gltf_teapot/cube_floor.gltf") else {
        warn!("no glTF sample available, skipping");
        return Ok(Vec::new());
    };
    Ok(vec![import_scene(ctx, env, &path)?])
}

/// Imports a scene file into a fresh scene and renders it to `<stem>.png`.
pub fn import_scene(ctx: &Context<'_>, env: &DemoEnv, path: &Path) -> anyhow::Result<PathBuf> {
    let materials = ctx.create_material_system()?;
    let scene = ctx.create_scene()?;
    ctx.set_scene(Some(&scene))?;

    // replaced when the file brings its own camera
    let camera = ctx.create_camera()?;
    camera.look_at(Vec3(0.0, 5.0, 20.0), Vec3(0.0, 1.0, 0.0), Vec3(0.0, 1.0, 0.0))?;
    scene.set_camera(Some(&camera))?;

    ctx.set_parameter(ContextParameter::DisplayGamma(env.settings.display_gamma))?;
    let render = RenderLoop::new(ctx, env.settings.width, env.settings.height)?;

    let mut import = ctx.create_import_context()?;
    import
        .import(path, &materials, &scene)
        .with_context(|| format!("failed to import {}", path.display()))?;
    info!(
        shapes = import.shapes().len(),
        lights = import.lights().len(),
        cameras = import.cameras().len(),
        "imported {}",
        path.display()
    );

    let stem = path.file_stem().and_then(|stem| stem.to_str()).unwrap_or("import");
    let output = render_frame(&render, env, &format!("{stem}.png"))?;

    import.delete_imported_objects()?;
    import.delete()?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rpr::{ContextDescriptor, Engine};

    use super::*;

    fn env(dir: &Path) -> DemoEnv {
        DemoEnv {
            settings: RenderSettings {
                width: 32,
                height: 24,
                iterations: 2,
                output_dir: dir.to_path_buf(),
                ..RenderSettings::default()
            },
            resources: None,
        }
    }

    fn with_context(f: impl FnOnce(&Context<'_>)) {
        let engine = Engine::headless();
        let plugin = engine.register_plugin(Path::new("libNorthstar64.so")).unwrap();
        let ctx = engine.create_context(&ContextDescriptor::new(plugin)).unwrap();
        f(&ctx);
        assert!(ctx.leaked_objects().unwrap().is_empty());
        ctx.destroy().unwrap();
    }

    #[test]
    fn demo_names_are_unique() {
        let names: HashSet<_> = all_demos().iter().map(|demo| demo.name).collect();
        assert_eq!(names.len(), all_demos().len());
        assert!(find_demo("basic_scene").is_some());
        assert!(find_demo("cornell_box").is_none());
    }

    #[test]
    fn every_demo_runs_headless_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let env = env(dir.path());
        with_context(|ctx| {
            for demo in all_demos() {
                let outputs = run_demo(ctx, &env, demo).unwrap();
                for path in &outputs {
                    let image = image::open(path).unwrap();
                    assert_eq!((image.width(), image.height()), (32, 24), "{}", path.display());
                }
            }
        });
        assert!(dir.path().join("basic_scene.png").exists());
        assert!(dir.path().join("deformation_motion_blur.png").exists());
        for name in ["camera_dof.png", "framebuffer_access_first_pass.png", "framebuffer_access.png", "aov_object_id.png"] {
            assert!(dir.path().join(name).exists(), "{name}");
        }
        // no SDK resources: the archive and glTF demos skip, textures are generated
        assert!(!dir.path().join("rprs_import.png").exists());
        assert!(dir.path().join("stand_in_sky.png").exists());
    }

    #[test]
    fn rprs_import_is_skipped_when_the_engine_cannot_load_it() {
        let dir = tempfile::tempdir().unwrap();
        let resources = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(resources.path().join("Meshes")).unwrap();
        std::fs::write(resources.path().join("Meshes/matball.rprs"), b"not an archive").unwrap();

        let mut env = env(dir.path());
        env.resources = Some(resources.path().to_path_buf());
        with_context(|ctx| {
            let outputs = rprs_import(ctx, &env).unwrap();
            assert!(outputs.is_empty());
        });
    }

    #[test]
    fn imported_gltf_is_rendered_and_released() {
        let dir = tempfile::tempdir().unwrap();
        let env = env(dir.path());
        let scene = Path::new(env!("CARGO_MANIFEST_DIR")).join("../rpr/tests/data/triangles.gltf");
        with_context(|ctx| {
            let output = import_scene(ctx, &env, &scene).unwrap();
            assert_eq!(output, dir.path().join("triangles.png"));
            assert!(output.exists());
        });
    }

    #[test]
    fn unknown_scene_format_fails() {
        let dir = tempfile::tempdir().unwrap();
        let env = env(dir.path());
        let scene = dir.path().join("scene.obj");
        std::fs::write(&scene, b"").unwrap();
        with_context(|ctx| {
            let err = import_scene(ctx, &env, &scene).unwrap_err();
            assert!(err.to_string().contains("failed to import"));
        });
    }
}
