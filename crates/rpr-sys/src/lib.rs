//! Raw declarations for the Radeon ProRender C API and its scene loader (`rprs`).
//!
//! Nothing in here is safe to call directly; see the `rpr` crate for the owning
//! wrappers. Names follow the C header so that the SDK documentation applies 1:1.

#![allow(non_camel_case_types, non_upper_case_globals, non_snake_case)]

use std::ffi::{c_char, c_void};

mod constants;
mod functions;

pub use constants::*;
pub use functions::*;

pub type rpr_char = c_char;
pub type rpr_int = i32;
pub type rpr_uint = u32;
pub type rpr_float = f32;
pub type rpr_bool = u32;
pub type rpr_status = rpr_int;

pub type rpr_creation_flags = rpr_uint;
pub type rpr_context_info = rpr_uint;
pub type rpr_context_properties = *mut c_void;
pub type rpr_material_system_type = rpr_uint;
pub type rpr_material_node_type = rpr_uint;
pub type rpr_material_node_input = rpr_uint;
pub type rpr_framebuffer_info = rpr_uint;
pub type rpr_component_type = rpr_uint;
pub type rpr_aov = rpr_uint;
pub type rpr_camera_mode = rpr_uint;
pub type rpr_mesh_info = rpr_uint;

pub type rpr_context = *mut c_void;
pub type rpr_scene = *mut c_void;
pub type rpr_camera = *mut c_void;
pub type rpr_shape = *mut c_void;
pub type rpr_light = *mut c_void;
pub type rpr_image = *mut c_void;
pub type rpr_framebuffer = *mut c_void;
pub type rpr_material_system = *mut c_void;
pub type rpr_material_node = *mut c_void;
pub type RPRS_context = *mut c_void;

pub const RPR_TRUE: rpr_bool = 1;
pub const RPR_FALSE: rpr_bool = 0;

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct rpr_framebuffer_format {
    pub num_components: rpr_uint,
    pub type_: rpr_component_type,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct rpr_framebuffer_desc {
    pub fb_width: rpr_uint,
    pub fb_height: rpr_uint,
}
