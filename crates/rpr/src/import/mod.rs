//! Bulk scene population from files.
//!
//! `.rprs` archives are decoded by the engine's loader library; glTF files are
//! read here and rebuilt through the public API. Either way the created objects
//! are tracked by one [`ImportContext`] and released together.

mod gltf;

use std::path::Path;

use tracing::{debug, info, warn};

use crate::{
    backend::RawHandle,
    camera::Camera,
    context::Context,
    engine::c_path,
    error::{Checked, Error, Result},
    image::Image,
    light::Light,
    material::{MaterialNode, MaterialSystem},
    scene::Scene,
    shape::Shape,
};

/// Tracking scope for imported objects. Importing twice into the same scene
/// without detaching first yields the union of both imports.
pub struct ImportContext<'c> {
    ctx: &'c Context<'c>,
    raw: RawHandle,
    released: bool,
    shapes: Vec<Shape<'c>>,
    lights: Vec<Light<'c>>,
    cameras: Vec<Camera<'c>>,
    nodes: Vec<MaterialNode<'c>>,
    images: Vec<Image<'c>>,
}

impl<'c> ImportContext<'c> {
    pub(crate) fn new(ctx: &'c Context<'c>, raw: RawHandle) -> ImportContext<'c> {
        ImportContext {
            ctx,
            raw,
            released: false,
            shapes: Vec::new(),
            lights: Vec::new(),
            cameras: Vec::new(),
            nodes: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn raw(&self) -> RawHandle {
        self.raw
    }

    /// Picks the importer from the file extension.
    pub fn import(&mut self, path: &Path, materials: &MaterialSystem<'c>, scene: &Scene<'_>) -> Result<()> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("rprs") => self.import_rprs(path, materials, scene),
            Some("gltf") | Some("glb") => self.import_gltf(path, materials, scene),
            _ => Err(Error::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Loads an engine archive into the existing `scene`.
    pub fn import_rprs(&mut self, path: &Path, materials: &MaterialSystem<'c>, scene: &Scene<'_>) -> Result<()> {
        let c_path = c_path(path)?;
        self.ctx
            .backend()
            .rprs_import(&c_path, self.ctx.raw(), materials.raw(), scene.raw(), self.raw)
            .checked("rprsImport")?;
        info!(path = %path.display(), "imported archive");
        Ok(())
    }

    pub fn shapes(&self) -> &[Shape<'c>] {
        &self.shapes
    }

    pub fn lights(&self) -> &[Light<'c>] {
        &self.lights
    }

    pub fn cameras(&self) -> &[Camera<'c>] {
        &self.cameras
    }

    /// Objects created by glTF imports and still alive.
    pub fn object_count(&self) -> usize {
        self.shapes.len() + self.lights.len() + self.cameras.len() + self.nodes.len() + self.images.len()
    }

    /// Releases everything imported so far. The context stays usable.
    pub fn delete_imported_objects(&mut self) -> Result<()> {
        self.ctx
            .backend()
            .rprs_delete_imported_objects(self.raw)
            .checked("rprsDeleteListImportedObjects")?;

        debug!(count = self.object_count(), "deleting imported objects");
        let mut first_error = None;
        let mut keep = |result: Result<()>| {
            if let Err(err) = result {
                first_error.get_or_insert(err);
            }
        };
        self.shapes.drain(..).for_each(|o| keep(o.delete()));
        self.lights.drain(..).for_each(|o| keep(o.delete()));
        self.cameras.drain(..).for_each(|o| keep(o.delete()));
        self.nodes.drain(..).for_each(|o| keep(o.delete()));
        self.images.drain(..).for_each(|o| keep(o.delete()));
        first_error.map_or(Ok(()), Err)
    }

    /// Releases the imported objects and the tracking scope itself.
    pub fn delete(mut self) -> Result<()> {
        self.delete_imported_objects()?;
        self.released = true;
        self.ctx
            .backend()
            .rprs_delete_context(self.raw)
            .checked("rprsDeleteContext")
    }
}

impl Drop for ImportContext<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = self.delete_imported_objects() {
            warn!(handle = ?self.raw, %err, "failed to release imported objects");
        }
        if let Err(status) = self.ctx.backend().rprs_delete_context(self.raw) {
            warn!(handle = ?self.raw, %status, "failed to delete import context");
        }
    }
}

impl std::fmt::Debug for ImportContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportContext")
            .field("raw", &self.raw)
            .field("objects", &self.object_count())
            .finish()
    }
}
