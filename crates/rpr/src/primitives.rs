//! Built-in geometry shared by the demos and tests.

use crate::shape::{MeshData, Vertex};

const fn v(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Vertex {
    Vertex { position, normal, uv }
}

/// Unit cube from -1 to 1, four vertices per face so normals stay flat.
pub const CUBE_VERTICES: [Vertex; 24] = [
    v([-1.0, 1.0, -1.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
    v([1.0, 1.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0]),
    v([1.0, 1.0, 1.0], [0.0, 1.0, 0.0], [1.0, 1.0]),
    v([-1.0, 1.0, 1.0], [0.0, 1.0, 0.0], [0.0, 1.0]),
    v([-1.0, -1.0, -1.0], [0.0, -1.0, 0.0], [0.0, 0.0]),
    v([1.0, -1.0, -1.0], [0.0, -1.0, 0.0], [1.0, 0.0]),
    v([1.0, -1.0, 1.0], [0.0, -1.0, 0.0], [1.0, 1.0]),
    v([-1.0, -1.0, 1.0], [0.0, -1.0, 0.0], [0.0, 1.0]),
    v([-1.0, -1.0, 1.0], [-1.0, 0.0, 0.0], [0.0, 0.0]),
    v([-1.0, -1.0, -1.0], [-1.0, 0.0, 0.0], [1.0, 0.0]),
    v([-1.0, 1.0, -1.0], [-1.0, 0.0, 0.0], [1.0, 1.0]),
    v([-1.0, 1.0, 1.0], [-1.0, 0.0, 0.0], [0.0, 1.0]),
    v([1.0, -1.0, 1.0], [1.0, 0.0, 0.0], [0.0, 0.0]),
    v([1.0, -1.0, -1.0], [1.0, 0.0, 0.0], [1.0, 0.0]),
    v([1.0, 1.0, -1.0], [1.0, 0.0, 0.0], [1.0, 1.0]),
    v([1.0, 1.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0]),
    v([-1.0, -1.0, -1.0], [0.0, 0.0, -1.0], [0.0, 0.0]),
    v([1.0, -1.0, -1.0], [0.0, 0.0, -1.0], [1.0, 0.0]),
    v([1.0, 1.0, -1.0], [0.0, 0.0, -1.0], [1.0, 1.0]),
    v([-1.0, 1.0, -1.0], [0.0, 0.0, -1.0], [0.0, 1.0]),
    v([-1.0, -1.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
    v([1.0, -1.0, 1.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
    v([1.0, 1.0, 1.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
    v([-1.0, 1.0, 1.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
];

pub const CUBE_INDICES: [i32; 36] = [
    3, 1, 0, 2, 1, 3, //
    6, 4, 5, 7, 4, 6, //
    11, 9, 8, 10, 9, 11, //
    14, 12, 13, 15, 12, 14, //
    19, 17, 16, 18, 17, 19, //
    22, 20, 21, 23, 20, 22,
];

/// 30 by 30 ground plane at y = 0, facing up.
pub const PLANE_VERTICES: [Vertex; 4] = [
    v([-15.0, 0.0, -15.0], [0.0, 1.0, 0.0], [0.0, 1.0]),
    v([-15.0, 0.0, 15.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
    v([15.0, 0.0, 15.0], [0.0, 1.0, 0.0], [1.0, 0.0]),
    v([15.0, 0.0, -15.0], [0.0, 1.0, 0.0], [1.0, 1.0]),
];

pub fn cube() -> MeshData {
    MeshData::triangles(&CUBE_VERTICES, &CUBE_INDICES)
}

pub fn plane() -> MeshData {
    MeshData::triangles(&PLANE_VERTICES, &CUBE_INDICES[..6])
}

/// Cube with a second motion key whose top face is pushed along x, and
/// whose top right edge is also lifted along y.
pub fn sheared_cube(shift_x: f32, shift_y: f32) -> MeshData {
    let mut mesh = cube();
    let sheared: Vec<[f32; 3]> = CUBE_VERTICES
        .iter()
        .map(|vertex| {
            let [x, y, z] = vertex.position;
            match (x > 0.0, y > 0.0) {
                (true, true) => [x + shift_x, y + shift_y, z],
                (false, true) => [x + shift_x, y, z],
                _ => [x, y, z],
            }
        })
        .collect();
    let normals: Vec<[f32; 3]> = CUBE_VERTICES.iter().map(|vertex| vertex.normal).collect();
    mesh.positions.extend(sheared);
    mesh.normals.extend(normals);
    mesh.motion_keys = 2;
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_meshes_validate() {
        cube().validate().unwrap();
        plane().validate().unwrap();
        sheared_cube(0.3, 0.3).validate().unwrap();
    }

    #[test]
    fn shear_moves_only_the_top() {
        let mesh = sheared_cube(0.3, 0.3);
        assert_eq!(mesh.motion_keys, 2);
        let second = &mesh.positions[24..];
        assert_eq!(second[0], [-0.7, 1.0, -1.0]);
        assert_eq!(second[1], [1.3, 1.3, -1.0]);
        assert_eq!(second[4], [-1.0, -1.0, -1.0]);
    }
}
