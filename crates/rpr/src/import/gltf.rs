use std::{collections::HashMap, f32::consts::PI, path::Path};

use ::gltf::{
    camera::Projection,
    image::Source,
    khr_lights_punctual::Kind,
    mesh::Mode,
};
use tracing::{info, warn};

use super::ImportContext;
use crate::{
    camera::CameraMode,
    error::Result,
    geometry::{Matrix4x4, Vec3},
    material::{MaterialInput, MaterialSystem, NodeKind},
    scene::Scene,
    shape::MeshData,
};

// sensor height the vertical field of view is mapped onto
const SENSOR_HEIGHT_MM: f32 = 24.0;

fn node_matrix(node: &::gltf::Node) -> Matrix4x4 {
    // glTF stores columns, the engine wants rows
    Matrix4x4::from(node.transform().matrix()).transposed()
}

/// Reads one triangle primitive into engine mesh streams. Missing normals are
/// averaged from the faces, missing uvs are zero.
fn mesh_from_primitive(primitive: &::gltf::Primitive, buffers: &[::gltf::buffer::Data]) -> Option<MeshData> {
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    let indices: Vec<i32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().map(|i| i as i32).collect(),
        None => (0..positions.len() as i32).collect(),
    };
    let normals: Vec<[f32; 3]> = match reader.read_normals() {
        Some(normals) => normals.collect(),
        None => face_averaged_normals(&positions, &indices),
    };
    let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
        Some(uvs) => uvs.into_f32().collect(),
        None => vec![[0.0, 0.0]; positions.len()],
    };

    Some(MeshData {
        positions,
        normals,
        uvs,
        position_indices: indices.clone(),
        normal_indices: indices.clone(),
        face_vertex_counts: vec![3; indices.len() / 3],
        uv_indices: indices,
        motion_keys: 1,
    })
}

fn face_averaged_normals(positions: &[[f32; 3]], indices: &[i32]) -> Vec<[f32; 3]> {
    let mut sums = vec![Vec3::zero(); positions.len()];
    for tri in indices.chunks_exact(3) {
        let corners = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if corners.iter().any(|&c| c >= positions.len()) {
            continue;
        }
        let [a, b, c] = corners.map(|c| Vec3::from(positions[c]));
        // area weighted
        let n = Vec3::cross(b - a, c - a);
        for corner in corners {
            sums[corner] += n;
        }
    }
    sums.into_iter().map(|n| Vec3::normalized(n).into()).collect()
}

impl<'c> ImportContext<'c> {
    /// Rebuilds a glTF scene with engine objects and attaches it to `scene`.
    ///
    /// Meshes referenced by several nodes become instances of one shape. The
    /// last camera found replaces the scene camera.
    pub fn import_gltf(&mut self, path: &Path, materials: &MaterialSystem<'c>, scene: &Scene<'_>) -> Result<()> {
        let (document, buffers, _images) = ::gltf::import(path)?;
        let Some(gltf_scene) = document.default_scene().or_else(|| document.scenes().next()) else {
            warn!(path = %path.display(), "glTF file has no scene");
            return Ok(());
        };
        let base_dir = path.parent().unwrap_or(Path::new(""));
        let before = self.object_count();

        // glTF material index (None for the default material) to tracked node index
        let mut material_nodes: HashMap<Option<usize>, usize> = HashMap::new();
        // glTF mesh index to the tracked shapes of its primitives
        let mut instancing_map: HashMap<usize, Vec<(usize, Option<usize>)>> = HashMap::new();

        let mut stack: Vec<(::gltf::Node, Matrix4x4)> = gltf_scene
            .nodes()
            .map(|node| (node, Matrix4x4::identity()))
            .collect();
        while let Some((node, parent)) = stack.pop() {
            let world = Matrix4x4::matmul(parent, node_matrix(&node));
            stack.extend(node.children().map(|child| (child, world)));

            if let Some(gltf_mesh) = node.mesh() {
                let shapes = match instancing_map.get(&gltf_mesh.index()) {
                    Some(prototypes) => {
                        let mut shapes = Vec::with_capacity(prototypes.len());
                        for &(prototype, material) in prototypes {
                            let instance = self.shapes[prototype].instance()?;
                            self.shapes.push(instance);
                            shapes.push((self.shapes.len() - 1, material));
                        }
                        shapes
                    }
                    None => {
                        let mut shapes = Vec::new();
                        for primitive in gltf_mesh.primitives() {
                            if primitive.mode() != Mode::Triangles {
                                warn!(mesh = gltf_mesh.index(), mode = ?primitive.mode(), "skipping non-triangle primitive");
                                continue;
                            }
                            let Some(mesh) = mesh_from_primitive(&primitive, &buffers) else {
                                warn!(mesh = gltf_mesh.index(), "skipping primitive without positions");
                                continue;
                            };
                            let shape = self.ctx.create_mesh(&mesh)?;
                            self.shapes.push(shape);
                            let material = self.material_for(&primitive.material(), materials, base_dir, &mut material_nodes)?;
                            shapes.push((self.shapes.len() - 1, material));
                        }
                        instancing_map.insert(gltf_mesh.index(), shapes.clone());
                        shapes
                    }
                };
                for (shape, material) in shapes {
                    let shape = &self.shapes[shape];
                    shape.set_transform(&world)?;
                    shape.set_material(material.map(|m| &self.nodes[m]))?;
                    if let Some(name) = node.name() {
                        shape.set_name(name)?;
                    }
                    scene.attach_shape(shape)?;
                }
            }

            if let Some(gltf_camera) = node.camera() {
                let camera = self.ctx.create_camera()?;
                let position = world.translation_part();
                let forward = world.apply_vector(Vec3(0.0, 0.0, -1.0));
                let up = world.apply_vector(Vec3(0.0, 1.0, 0.0));
                camera.look_at(position, position + forward, up)?;
                match gltf_camera.projection() {
                    Projection::Perspective(perspective) => {
                        let focal = 0.5 * SENSOR_HEIGHT_MM / (0.5 * perspective.yfov()).tan();
                        camera.set_focal_length(focal)?;
                        if let Some(aspect) = perspective.aspect_ratio() {
                            camera.set_sensor_size(SENSOR_HEIGHT_MM * aspect, SENSOR_HEIGHT_MM)?;
                        }
                    }
                    Projection::Orthographic(orthographic) => {
                        camera.set_mode(CameraMode::Orthographic)?;
                        camera.set_ortho_width(2.0 * orthographic.xmag())?;
                    }
                }
                scene.set_camera(Some(&camera))?;
                self.cameras.push(camera);
            }

            if let Some(gltf_light) = node.light() {
                let color = Vec3::from(gltf_light.color()) * gltf_light.intensity();
                let light = match gltf_light.kind() {
                    // candela to watts over the full sphere
                    Kind::Point => {
                        let light = self.ctx.create_point_light()?;
                        light.set_radiant_power(color * 4.0 * PI)?;
                        light
                    }
                    Kind::Directional => {
                        let light = self.ctx.create_directional_light()?;
                        light.set_radiant_power(color)?;
                        light
                    }
                    Kind::Spot { .. } => {
                        warn!(node = node.index(), "spot lights are not supported, skipping");
                        continue;
                    }
                };
                light.set_transform(&world)?;
                scene.attach_light(&light)?;
                self.lights.push(light);
            }
        }

        info!(
            path = %path.display(),
            objects = self.object_count() - before,
            "imported glTF scene"
        );
        Ok(())
    }

    /// Diffuse node for the base color, emissive node when the material glows.
    fn material_for(
        &mut self,
        material: &::gltf::Material,
        materials: &MaterialSystem<'c>,
        base_dir: &Path,
        cache: &mut HashMap<Option<usize>, usize>,
    ) -> Result<Option<usize>> {
        if let Some(&node) = cache.get(&material.index()) {
            return Ok(Some(node));
        }

        let emission = material.emissive_factor();
        let node = if emission != [0.0; 3] {
            let node = materials.create_node(NodeKind::Emissive)?;
            node.set_input_f4(MaterialInput::Color, [emission[0], emission[1], emission[2], 1.0])?;
            node
        } else {
            let pbr = material.pbr_metallic_roughness();
            let node = materials.create_node(NodeKind::Diffuse)?;
            node.set_input_f4(MaterialInput::Color, pbr.base_color_factor())?;

            let texture_uri = pbr.base_color_texture().and_then(|info| match info.texture().source().source() {
                Source::Uri { uri, .. } => Some(uri.to_string()),
                Source::View { .. } => None,
            });
            match texture_uri {
                Some(uri) => {
                    let image = self.ctx.create_image_from_file(&base_dir.join(&uri))?;
                    let texture = materials.image_texture(&image)?;
                    node.set_input_node(MaterialInput::Color, &texture)?;
                    self.images.push(image);
                    self.nodes.push(texture);
                }
                None if pbr.base_color_texture().is_some() => {
                    warn!(material = ?material.index(), "embedded textures are not supported, using the base color");
                }
                None => {}
            }
            node
        };
        if let Some(name) = material.name() {
            node.set_name(name)?;
        }
        self.nodes.push(node);
        let index = self.nodes.len() - 1;
        cache.insert(material.index(), index);
        Ok(Some(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_normals_face_the_winding() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let normals = face_averaged_normals(&positions, &[0, 1, 2]);
        assert_eq!(normals, vec![[0.0, 0.0, 1.0]; 3]);
    }

    #[test]
    fn out_of_range_faces_are_ignored() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let normals = face_averaged_normals(&positions, &[0, 1, 5]);
        assert_eq!(normals, vec![[0.0, 0.0, 0.0]; 2]);
    }
}
