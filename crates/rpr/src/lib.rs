//! Owning, status-checked wrappers over the Radeon ProRender API.
//!
//! Every engine object is a Rust value that releases its handle when dropped,
//! and every object borrows the [`Context`] it was created from, so the context
//! can only be destroyed after everything it owns:
//!
//! ```compile_fail
//! use rpr::{ContextDescriptor, Engine};
//!
//! let engine = Engine::headless();
//! let plugin = engine.register_plugin("libNorthstar64.so".as_ref()).unwrap();
//! let ctx = engine.create_context(&ContextDescriptor::new(plugin)).unwrap();
//! let scene = ctx.create_scene().unwrap();
//! ctx.destroy().unwrap(); // `scene` still borrows `ctx`
//! drop(scene);
//! ```
//!
//! The engine itself sits behind [`backend::Backend`]. [`Engine::headless`]
//! runs an in-process preview engine; with the `native` feature
//! [`Engine::native`] forwards to the vendor library.

pub mod backend;
mod camera;
mod context;
mod engine;
mod error;
mod framebuffer;
pub mod geometry;
mod image;
pub mod import;
mod light;
mod material;
mod object;
mod plugin;
pub mod primitives;
mod scene;
mod shape;

pub use camera::{Camera, CameraMode};
pub use context::{Aov, Context, ContextDescriptor, ContextParameter, CreationFlags};
pub use engine::Engine;
pub use error::{Error, Result, Status};
pub use framebuffer::{ComponentType, Framebuffer, FramebufferFormat, RenderLoop};
pub use image::Image;
pub use import::ImportContext;
pub use light::{Light, LightKind};
pub use material::{ArithmeticOp, LookupValue, MaterialInput, MaterialNode, MaterialSystem, NodeKind};
pub use plugin::{PluginId, PluginKind, SdkLayout};
pub use scene::Scene;
pub use shape::{MeshData, Shape, Vertex};

pub use backend::ObjectKind;

#[cfg(test)]
mod tests;
