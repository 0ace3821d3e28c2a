use std::path::{Path, PathBuf};

use crate::object::{ObjectHandle, engine_object};

/// Texture data loaded by the engine, usable by image texture nodes and environment lights.
pub struct Image<'c> {
    handle: ObjectHandle<'c>,
    path: PathBuf,
}

engine_object!(Image);

impl<'c> Image<'c> {
    pub(crate) fn new(handle: ObjectHandle<'c>, path: PathBuf) -> Image<'c> {
        Image { handle, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
