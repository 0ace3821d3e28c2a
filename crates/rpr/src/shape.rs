use bytemuck::{Pod, Zeroable};

use crate::{
    backend::{MeshArrays, ShapeParameter},
    error::{Checked, Error, Result},
    geometry::Matrix4x4,
    material::MaterialNode,
    object::{ObjectHandle, engine_object},
};

/// One interleaved vertex, laid out the way the engine's tutorial data is.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const FLOATS: usize = size_of::<Vertex>() / size_of::<f32>();

    /// Reinterprets a flat `x y z nx ny nz u v` float array as vertices.
    pub fn from_interleaved(data: &[f32]) -> Result<&[Vertex]> {
        bytemuck::try_cast_slice(data).map_err(|_| {
            Error::InvalidMesh(format!(
                "{} floats is not a whole number of {}-float vertices",
                data.len(),
                Vertex::FLOATS
            ))
        })
    }
}

/// Mesh streams with independent index buffers.
///
/// `positions` and `normals` hold one block per motion key; the first block is
/// the shape at shutter open, the last at shutter close.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub position_indices: Vec<i32>,
    pub normal_indices: Vec<i32>,
    pub uv_indices: Vec<i32>,
    pub face_vertex_counts: Vec<i32>,
    pub motion_keys: u32,
}

impl MeshData {
    /// All three streams share `indices`.
    pub fn from_vertices(vertices: &[Vertex], indices: &[i32], face_vertex_counts: &[i32]) -> MeshData {
        MeshData {
            positions: vertices.iter().map(|v| v.position).collect(),
            normals: vertices.iter().map(|v| v.normal).collect(),
            uvs: vertices.iter().map(|v| v.uv).collect(),
            position_indices: indices.to_vec(),
            normal_indices: indices.to_vec(),
            uv_indices: indices.to_vec(),
            face_vertex_counts: face_vertex_counts.to_vec(),
            motion_keys: 1,
        }
    }

    pub fn triangles(vertices: &[Vertex], indices: &[i32]) -> MeshData {
        let faces = vec![3; indices.len() / 3];
        MeshData::from_vertices(vertices, indices, &faces)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / self.motion_keys.max(1) as usize
    }

    /// Appends the positions and normals of one more point in time.
    pub fn add_motion_key(&mut self, positions: &[[f32; 3]], normals: &[[f32; 3]]) -> Result<()> {
        let per_key = self.vertex_count();
        let normals_per_key = self.normals.len() / self.motion_keys.max(1) as usize;
        if positions.len() != per_key || normals.len() != normals_per_key {
            return Err(Error::InvalidMesh(format!(
                "motion key has {} positions and {} normals, expected {per_key} and {normals_per_key}",
                positions.len(),
                normals.len()
            )));
        }
        self.positions.extend_from_slice(positions);
        self.normals.extend_from_slice(normals);
        self.motion_keys += 1;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let keys = self.motion_keys as usize;
        if keys == 0 {
            return Err(Error::InvalidMesh("mesh needs at least one motion key".into()));
        }
        if self.positions.is_empty() || self.positions.len() % keys != 0 {
            return Err(Error::InvalidMesh(format!(
                "{} positions can't be split into {keys} motion keys",
                self.positions.len()
            )));
        }
        if self.normals.len() % keys != 0 {
            return Err(Error::InvalidMesh(format!(
                "{} normals can't be split into {keys} motion keys",
                self.normals.len()
            )));
        }
        if self.face_vertex_counts.is_empty() {
            return Err(Error::InvalidMesh("mesh has no faces".into()));
        }
        if let Some(count) = self.face_vertex_counts.iter().find(|&&c| c < 3) {
            return Err(Error::InvalidMesh(format!("face with {count} vertices")));
        }
        let corners: usize = self.face_vertex_counts.iter().map(|&c| c as usize).sum();

        let streams = [
            ("position", &self.position_indices, self.positions.len() / keys, true),
            ("normal", &self.normal_indices, self.normals.len() / keys, !self.normals.is_empty()),
            ("uv", &self.uv_indices, self.uvs.len(), !self.uvs.is_empty()),
        ];
        for (name, indices, len, used) in streams {
            if !used {
                continue;
            }
            if indices.len() != corners {
                return Err(Error::InvalidMesh(format!(
                    "{} {name} indices for {corners} face corners",
                    indices.len()
                )));
            }
            if let Some(bad) = indices.iter().find(|&&i| i < 0 || i as usize >= len) {
                return Err(Error::InvalidMesh(format!("{name} index {bad} out of range 0..{len}")));
            }
        }
        Ok(())
    }

    pub(crate) fn arrays(&self) -> MeshArrays<'_> {
        MeshArrays {
            positions: &self.positions,
            normals: &self.normals,
            uvs: &self.uvs,
            position_indices: &self.position_indices,
            normal_indices: &self.normal_indices,
            uv_indices: &self.uv_indices,
            face_vertex_counts: &self.face_vertex_counts,
            motion_keys: self.motion_keys,
        }
    }
}

/// A mesh or an instance of one.
pub struct Shape<'c> {
    handle: ObjectHandle<'c>,
}

engine_object!(Shape);

impl<'c> Shape<'c> {
    pub(crate) fn new(handle: ObjectHandle<'c>) -> Shape<'c> {
        Shape { handle }
    }

    fn set(&self, parameter: ShapeParameter, call: &'static str) -> Result<()> {
        self.handle.backend().shape_set(self.raw(), parameter).checked(call)
    }

    /// New shape sharing this one's mesh data, with its own transform.
    pub fn instance(&self) -> Result<Shape<'c>> {
        self.handle.ctx().create_instance_of(self.raw())
    }

    pub fn set_transform(&self, transform: &Matrix4x4) -> Result<()> {
        self.set(ShapeParameter::Transform(transform.to_row_major()), "rprShapeSetTransform")
    }

    pub fn set_material(&self, material: Option<&MaterialNode<'_>>) -> Result<()> {
        self.set(ShapeParameter::Material(material.map(MaterialNode::raw)), "rprShapeSetMaterial")
    }

    /// Transform at shutter close. Takes effect together with a motion transform count of 1.
    pub fn set_motion_transform(&self, transform: &Matrix4x4) -> Result<()> {
        self.set(
            ShapeParameter::MotionTransform(transform.to_row_major(), 1),
            "rprShapeSetMotionTransform",
        )?;
        self.set(ShapeParameter::MotionTransformCount(1), "rprShapeSetMotionTransformCount")
    }

    pub fn clear_motion_transform(&self) -> Result<()> {
        self.set(ShapeParameter::MotionTransformCount(0), "rprShapeSetMotionTransformCount")
    }

    pub fn set_visibility(&self, visible: bool) -> Result<()> {
        self.set(ShapeParameter::Visibility(visible), "rprShapeSetVisibility")
    }

    pub fn set_object_id(&self, id: u32) -> Result<()> {
        self.set(ShapeParameter::ObjectId(id), "rprShapeSetObjectID")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> MeshData {
        let vertices = [
            Vertex { position: [0.0, 0.0, 0.0], normal: [0.0, 0.0, 1.0], uv: [0.0, 0.0] },
            Vertex { position: [1.0, 0.0, 0.0], normal: [0.0, 0.0, 1.0], uv: [1.0, 0.0] },
            Vertex { position: [1.0, 1.0, 0.0], normal: [0.0, 0.0, 1.0], uv: [1.0, 1.0] },
            Vertex { position: [0.0, 1.0, 0.0], normal: [0.0, 0.0, 1.0], uv: [0.0, 1.0] },
        ];
        MeshData::from_vertices(&vertices, &[0, 1, 2, 3], &[4])
    }

    #[test]
    fn interleaved_floats_become_vertices() {
        let data = [1.0, 2.0, 3.0, 0.0, 1.0, 0.0, 0.5, 0.25];
        let vertices = Vertex::from_interleaved(&data).unwrap();
        assert_eq!(vertices.len(), 1);
        assert_eq!(vertices[0].position, [1.0, 2.0, 3.0]);
        assert_eq!(vertices[0].uv, [0.5, 0.25]);

        assert!(matches!(Vertex::from_interleaved(&data[..7]), Err(Error::InvalidMesh(_))));
    }

    #[test]
    fn quad_is_valid() {
        quad().validate().unwrap();
    }

    #[test]
    fn index_out_of_range_is_rejected() {
        let mut mesh = quad();
        mesh.uv_indices[2] = 4;
        let err = mesh.validate().unwrap_err();
        assert!(err.to_string().contains("uv index 4"), "{err}");
    }

    #[test]
    fn face_counts_must_cover_indices() {
        let mut mesh = quad();
        mesh.face_vertex_counts = vec![3];
        assert!(matches!(mesh.validate(), Err(Error::InvalidMesh(_))));

        mesh.face_vertex_counts = vec![2, 2];
        assert!(matches!(mesh.validate(), Err(Error::InvalidMesh(_))));
    }

    #[test]
    fn motion_keys_extend_streams() {
        let mut mesh = quad();
        let moved: Vec<[f32; 3]> = mesh.positions.iter().map(|p| [p[0] + 1.0, p[1], p[2]]).collect();
        let normals = mesh.normals.clone();
        mesh.add_motion_key(&moved, &normals).unwrap();
        assert_eq!(mesh.motion_keys, 2);
        assert_eq!(mesh.vertex_count(), 4);
        mesh.validate().unwrap();

        assert!(mesh.add_motion_key(&moved[..3], &normals).is_err());
    }
}
