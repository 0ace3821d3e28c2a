use crate::*;

pub const RPR_API_VERSION: rpr_int = 0x00300102;

// status codes
pub const RPR_SUCCESS: rpr_status = 0;
pub const RPR_ERROR_COMPUTE_API_NOT_SUPPORTED: rpr_status = -1;
pub const RPR_ERROR_OUT_OF_SYSTEM_MEMORY: rpr_status = -2;
pub const RPR_ERROR_OUT_OF_VIDEO_MEMORY: rpr_status = -3;
pub const RPR_ERROR_INVALID_LIGHTPATH_EXPR: rpr_status = -5;
pub const RPR_ERROR_INVALID_IMAGE: rpr_status = -6;
pub const RPR_ERROR_INVALID_AA_METHOD: rpr_status = -7;
pub const RPR_ERROR_UNSUPPORTED_IMAGE_FORMAT: rpr_status = -8;
pub const RPR_ERROR_INVALID_GL_TEXTURE: rpr_status = -9;
pub const RPR_ERROR_INVALID_CL_IMAGE: rpr_status = -10;
pub const RPR_ERROR_INVALID_OBJECT: rpr_status = -11;
pub const RPR_ERROR_INVALID_PARAMETER: rpr_status = -12;
pub const RPR_ERROR_INVALID_TAG: rpr_status = -13;
pub const RPR_ERROR_INVALID_LIGHT: rpr_status = -14;
pub const RPR_ERROR_INVALID_CONTEXT: rpr_status = -15;
pub const RPR_ERROR_UNIMPLEMENTED: rpr_status = -16;
pub const RPR_ERROR_INVALID_API_VERSION: rpr_status = -17;
pub const RPR_ERROR_INTERNAL_ERROR: rpr_status = -18;
pub const RPR_ERROR_IO_ERROR: rpr_status = -19;
pub const RPR_ERROR_UNSUPPORTED_SHADER_PARAMETER_TYPE: rpr_status = -20;
pub const RPR_ERROR_MATERIAL_STACK_OVERFLOW: rpr_status = -21;
pub const RPR_ERROR_INVALID_PARAMETER_TYPE: rpr_status = -22;
pub const RPR_ERROR_UNSUPPORTED: rpr_status = -23;
pub const RPR_ERROR_OPENCL_OUT_OF_HOST_MEMORY: rpr_status = -24;
pub const RPR_ERROR_OPENGL: rpr_status = -25;
pub const RPR_ERROR_OPENCL: rpr_status = -26;
pub const RPR_ERROR_NULLPTR: rpr_status = -27;
pub const RPR_ERROR_NODETYPE: rpr_status = -28;
pub const RPR_ERROR_ABORTED: rpr_status = -29;

// returned by rprRegisterPlugin when the library can't be loaded
pub const RPR_INVALID_PLUGIN_ID: rpr_int = -1;

pub mod RPR_CREATION_FLAGS {
    pub type Type = crate::rpr_creation_flags;
    pub const ENABLE_GPU0: Type = 1 << 0;
    pub const ENABLE_GPU1: Type = 1 << 1;
    pub const ENABLE_GPU2: Type = 1 << 2;
    pub const ENABLE_GPU3: Type = 1 << 3;
    pub const ENABLE_CPU: Type = 1 << 4;
    pub const ENABLE_GL_INTEROP: Type = 1 << 5;
    pub const ENABLE_GPU4: Type = 1 << 6;
    pub const ENABLE_GPU5: Type = 1 << 7;
    pub const ENABLE_GPU6: Type = 1 << 8;
    pub const ENABLE_GPU7: Type = 1 << 9;
    pub const ENABLE_METAL: Type = 1 << 10;
    pub const ENABLE_HIP: Type = 1 << 19;
    pub const ENABLE_DEBUG: Type = 1 << 31;
}

pub mod RPR_CONTEXT {
    pub type Type = crate::rpr_context_info;
    pub const CREATION_FLAGS: Type = 0x102;
    pub const ITERATIONS: Type = 0x10B;
    pub const MAX_RECURSION: Type = 0x11B;
    pub const DISPLAY_GAMMA: Type = 0x124;
    pub const GPU0_NAME: Type = 0x127;
    pub const GPU1_NAME: Type = 0x128;
    pub const CPU_NAME: Type = 0x12B;
    pub const LIST_CREATED_CAMERAS: Type = 0x157;
    pub const LIST_CREATED_MATERIALNODES: Type = 0x158;
    pub const LIST_CREATED_LIGHTS: Type = 0x159;
    pub const LIST_CREATED_SHAPES: Type = 0x15A;
    pub const LIST_CREATED_POSTEFFECTS: Type = 0x15B;
    pub const LIST_CREATED_HETEROVOLUMES: Type = 0x15C;
    pub const LIST_CREATED_GRIDS: Type = 0x15D;
    pub const LIST_CREATED_BUFFERS: Type = 0x15E;
    pub const LIST_CREATED_IMAGES: Type = 0x15F;
    pub const LIST_CREATED_FRAMEBUFFERS: Type = 0x160;
    pub const LIST_CREATED_SCENES: Type = 0x161;
    pub const LIST_CREATED_CURVES: Type = 0x162;
    pub const LIST_CREATED_MATERIALSYSTEM: Type = 0x163;
    pub const LIST_CREATED_COMPOSITE: Type = 0x164;
    pub const LIST_CREATED_LUT: Type = 0x165;
    // context creation property, passed to rprCreateContext
    pub const PRECOMPILED_BINARY_PATH: Type = 0x19E;
}

pub mod RPR_MATERIAL_NODE {
    pub type Type = crate::rpr_material_node_type;
    pub const DIFFUSE: Type = 0x1;
    pub const MICROFACET: Type = 0x2;
    pub const REFLECTION: Type = 0x3;
    pub const EMISSIVE: Type = 0x7;
    pub const BLEND: Type = 0xA;
    pub const ARITHMETIC: Type = 0xB;
    pub const NORMAL_MAP: Type = 0xD;
    pub const IMAGE_TEXTURE: Type = 0xE;
    pub const CHECKER_TEXTURE: Type = 0x12;
    pub const CONSTANT_TEXTURE: Type = 0x13;
    pub const INPUT_LOOKUP: Type = 0x14;
}

pub mod RPR_MATERIAL_INPUT {
    pub type Type = crate::rpr_material_node_input;
    pub const COLOR: Type = 0x0;
    pub const COLOR0: Type = 0x1;
    pub const COLOR1: Type = 0x2;
    pub const NORMAL: Type = 0x3;
    pub const UV: Type = 0x4;
    pub const DATA: Type = 0x5;
    pub const ROUGHNESS: Type = 0x6;
    pub const IOR: Type = 0x7;
    pub const WEIGHT: Type = 0xB;
    pub const OP: Type = 0xC;
    pub const VALUE: Type = 0xF;
    pub const SCALE: Type = 0x11;
}

pub mod RPR_MATERIAL_NODE_OP {
    pub type Type = crate::rpr_uint;
    pub const ADD: Type = 0x00;
    pub const SUB: Type = 0x01;
    pub const MUL: Type = 0x02;
    pub const DIV: Type = 0x03;
    pub const AVERAGE: Type = 0x14;
    pub const MIN: Type = 0x15;
    pub const MAX: Type = 0x16;
}

pub mod RPR_MATERIAL_NODE_LOOKUP {
    pub type Type = crate::rpr_uint;
    pub const UV: Type = 0x0;
    pub const N: Type = 0x1;
    pub const P: Type = 0x2;
}

pub mod RPR_MATERIAL_SYSTEM_TYPE {
    pub type Type = crate::rpr_material_system_type;
    pub const DEFAULT: Type = 0x0;
}

pub mod RPR_AOV {
    pub type Type = crate::rpr_aov;
    pub const COLOR: Type = 0x0;
    pub const OPACITY: Type = 0x1;
    pub const WORLD_COORDINATE: Type = 0x2;
    pub const UV: Type = 0x3;
    pub const MATERIAL_ID: Type = 0x4;
    pub const GEOMETRIC_NORMAL: Type = 0x5;
    pub const SHADING_NORMAL: Type = 0x6;
    pub const DEPTH: Type = 0x7;
    pub const OBJECT_ID: Type = 0x8;
}

pub mod RPR_COMPONENT_TYPE {
    pub type Type = crate::rpr_component_type;
    pub const UINT8: Type = 0x1;
    pub const FLOAT16: Type = 0x2;
    pub const FLOAT32: Type = 0x3;
}

pub mod RPR_FRAMEBUFFER {
    pub type Type = crate::rpr_framebuffer_info;
    pub const FORMAT: Type = 0x1301;
    pub const DESC: Type = 0x1302;
    pub const DATA: Type = 0x1303;
}

pub mod RPR_CAMERA_MODE {
    pub type Type = crate::rpr_camera_mode;
    pub const PERSPECTIVE: Type = 0x1;
    pub const ORTHOGRAPHIC: Type = 0x2;
}

pub mod RPR_MESH {
    pub type Type = crate::rpr_mesh_info;
    pub const MOTION_DIMENSION: Type = 0x519;
}

#[cfg(test)]
mod tests {
    use super::*;

    // values from RadeonProRender.h
    #[test]
    fn creation_flags_match_the_header() {
        let flags = [
            (RPR_CREATION_FLAGS::ENABLE_GPU0, 0x1),
            (RPR_CREATION_FLAGS::ENABLE_GPU1, 0x2),
            (RPR_CREATION_FLAGS::ENABLE_GPU2, 0x4),
            (RPR_CREATION_FLAGS::ENABLE_GPU3, 0x8),
            (RPR_CREATION_FLAGS::ENABLE_CPU, 0x10),
            (RPR_CREATION_FLAGS::ENABLE_GL_INTEROP, 0x20),
            (RPR_CREATION_FLAGS::ENABLE_GPU4, 0x40),
            (RPR_CREATION_FLAGS::ENABLE_GPU5, 0x80),
            (RPR_CREATION_FLAGS::ENABLE_GPU6, 0x100),
            (RPR_CREATION_FLAGS::ENABLE_GPU7, 0x200),
            (RPR_CREATION_FLAGS::ENABLE_METAL, 0x400),
            (RPR_CREATION_FLAGS::ENABLE_HIP, 0x80000),
            (RPR_CREATION_FLAGS::ENABLE_DEBUG, 0x8000_0000),
        ];
        for (flag, expected) in flags {
            assert_eq!(flag, expected);
        }
    }

    #[test]
    fn context_keys_match_the_header() {
        let keys = [
            (RPR_CONTEXT::CREATION_FLAGS, 0x102),
            (RPR_CONTEXT::ITERATIONS, 0x10B),
            (RPR_CONTEXT::MAX_RECURSION, 0x11B),
            (RPR_CONTEXT::DISPLAY_GAMMA, 0x124),
            (RPR_CONTEXT::GPU0_NAME, 0x127),
            (RPR_CONTEXT::GPU1_NAME, 0x128),
            (RPR_CONTEXT::CPU_NAME, 0x12B),
            (RPR_CONTEXT::LIST_CREATED_CAMERAS, 0x157),
            (RPR_CONTEXT::LIST_CREATED_MATERIALNODES, 0x158),
            (RPR_CONTEXT::LIST_CREATED_LIGHTS, 0x159),
            (RPR_CONTEXT::LIST_CREATED_SHAPES, 0x15A),
            (RPR_CONTEXT::LIST_CREATED_IMAGES, 0x15F),
            (RPR_CONTEXT::LIST_CREATED_FRAMEBUFFERS, 0x160),
            (RPR_CONTEXT::LIST_CREATED_SCENES, 0x161),
            (RPR_CONTEXT::LIST_CREATED_MATERIALSYSTEM, 0x163),
            (RPR_CONTEXT::LIST_CREATED_LUT, 0x165),
        ];
        for (key, expected) in keys {
            assert_eq!(key, expected);
        }
    }

    #[test]
    fn object_keys_match_the_header() {
        assert_eq!(RPR_MESH::MOTION_DIMENSION, 0x519);
        assert_eq!(
            [RPR_FRAMEBUFFER::FORMAT, RPR_FRAMEBUFFER::DESC, RPR_FRAMEBUFFER::DATA],
            [0x1301, 0x1302, 0x1303]
        );
        assert_eq!(
            [RPR_COMPONENT_TYPE::UINT8, RPR_COMPONENT_TYPE::FLOAT16, RPR_COMPONENT_TYPE::FLOAT32],
            [0x1, 0x2, 0x3]
        );
        assert_eq!([RPR_CAMERA_MODE::PERSPECTIVE, RPR_CAMERA_MODE::ORTHOGRAPHIC], [0x1, 0x2]);
        assert_eq!([RPR_AOV::COLOR, RPR_AOV::DEPTH, RPR_AOV::OBJECT_ID], [0x0, 0x7, 0x8]);
        assert_eq!(
            [RPR_MATERIAL_NODE::IMAGE_TEXTURE, RPR_MATERIAL_NODE::CHECKER_TEXTURE, RPR_MATERIAL_NODE::INPUT_LOOKUP],
            [0xE, 0x12, 0x14]
        );
        assert_eq!([RPR_MATERIAL_INPUT::WEIGHT, RPR_MATERIAL_INPUT::OP, RPR_MATERIAL_INPUT::SCALE], [0xB, 0xC, 0x11]);
    }

    #[test]
    fn status_codes_match_the_header() {
        assert_eq!(RPR_ERROR_INVALID_OBJECT, -11);
        assert_eq!(RPR_ERROR_INVALID_CONTEXT, -15);
        assert_eq!(RPR_ERROR_UNSUPPORTED, -23);
        assert_eq!(RPR_ERROR_NODETYPE, -28);
        assert_eq!(RPR_ERROR_ABORTED, -29);
    }
}
