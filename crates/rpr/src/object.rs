use std::ffi::CString;

use tracing::{debug, warn};

use crate::{
    backend::{Backend, ObjectKind, RawHandle},
    context::Context,
    error::{Checked, Error, Result},
};

/// Owns one engine handle created against a context.
///
/// Released exactly once: either through [`ObjectHandle::release`], which
/// reports the status, or on drop, which can only log it.
pub(crate) struct ObjectHandle<'c> {
    ctx: &'c Context<'c>,
    raw: RawHandle,
    kind: ObjectKind,
    released: bool,
}

impl<'c> ObjectHandle<'c> {
    pub fn new(ctx: &'c Context<'c>, raw: RawHandle, kind: ObjectKind) -> ObjectHandle<'c> {
        debug!(handle = ?raw, kind = kind.name(), "created");
        ObjectHandle {
            ctx,
            raw,
            kind,
            released: false,
        }
    }

    pub fn raw(&self) -> RawHandle {
        self.raw
    }

    pub fn ctx(&self) -> &'c Context<'c> {
        self.ctx
    }

    pub fn backend(&self) -> &'c dyn Backend {
        self.ctx.backend()
    }

    pub fn set_name(&self, name: &str) -> Result<()> {
        let name = CString::new(name).map_err(|_| Error::InvalidName(name.to_string()))?;
        self.backend().object_set_name(self.raw, &name).checked("rprObjectSetName")
    }

    pub fn release(mut self) -> Result<()> {
        self.released = true;
        debug!(handle = ?self.raw, kind = self.kind.name(), "deleting");
        self.backend().object_delete(self.raw).checked("rprObjectDelete")
    }
}

impl Drop for ObjectHandle<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(status) = self.backend().object_delete(self.raw) {
            warn!(handle = ?self.raw, kind = self.kind.name(), %status, "failed to delete object");
        }
    }
}

/// Methods every owning wrapper shares.
macro_rules! engine_object {
    ($wrapper:ident) => {
        impl<'c> $wrapper<'c> {
            pub fn raw(&self) -> $crate::backend::RawHandle {
                self.handle.raw()
            }

            /// Debug name shown by engine tooling.
            pub fn set_name(&self, name: &str) -> $crate::Result<()> {
                self.handle.set_name(name)
            }

            /// Releases the handle now, reporting the engine status.
            pub fn delete(self) -> $crate::Result<()> {
                self.handle.release()
            }
        }

        impl std::fmt::Debug for $wrapper<'_> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($wrapper)).field(&self.handle.raw()).finish()
            }
        }
    };
}

pub(crate) use engine_object;
