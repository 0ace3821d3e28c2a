use std::{
    ffi::CString,
    path::Path,
};

use rpr_sys::{RPR_API_VERSION, RPR_INVALID_PLUGIN_ID};
use tracing::{debug, info};

use crate::{
    backend::{Backend, ContextCreateInfo, headless::HeadlessBackend},
    context::{Context, ContextDescriptor},
    error::{Checked, Error, Result},
    plugin::PluginId,
};

pub(crate) fn c_path(path: &Path) -> Result<CString> {
    path.to_str()
        .and_then(|s| CString::new(s).ok())
        .ok_or_else(|| Error::InvalidPath(path.to_path_buf()))
}

/// Entry point: a backend to register plugins with and create contexts on.
pub struct Engine {
    backend: Box<dyn Backend>,
}

impl Engine {
    pub fn new(backend: Box<dyn Backend>) -> Engine {
        Engine { backend }
    }

    pub fn headless() -> Engine {
        Engine::new(Box::new(HeadlessBackend::new()))
    }

    #[cfg(feature = "native")]
    pub fn native() -> Engine {
        Engine::new(Box::new(crate::backend::native::NativeBackend::new()))
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn register_plugin(&self, path: &Path) -> Result<PluginId> {
        let c_path = c_path(path)?;
        let id = self.backend.register_plugin(&c_path);
        if id == RPR_INVALID_PLUGIN_ID {
            return Err(Error::PluginNotFound(path.to_path_buf()));
        }
        debug!(id, path = %path.display(), "registered plugin");
        Ok(PluginId(id))
    }

    /// Creates a context for the descriptor's plugins and makes the first one active.
    pub fn create_context(&self, descriptor: &ContextDescriptor) -> Result<Context<'_>> {
        let cache_path = descriptor.cache_path.as_deref().map(c_path).transpose()?;
        let binary_path = descriptor
            .precompiled_binary_path
            .as_deref()
            .map(c_path)
            .transpose()?;
        let plugins: Vec<i32> = descriptor.plugins.iter().map(|p| p.0).collect();

        let raw = self
            .backend
            .create_context(&ContextCreateInfo {
                api_version: RPR_API_VERSION,
                plugins: &plugins,
                flags: descriptor.flags.bits(),
                cache_path: cache_path.as_deref(),
                precompiled_binary_path: binary_path.as_deref(),
            })
            .checked("rprCreateContext")?;
        let ctx = Context::from_raw(self, raw);

        let active = descriptor.active_plugin.or(descriptor.plugins.first().copied());
        if let Some(plugin) = active {
            self.backend
                .context_set_active_plugin(raw, plugin.0)
                .checked("rprContextSetActivePlugin")?;
        }
        info!(backend = self.backend.name(), flags = ?descriptor.flags, "context created");
        Ok(ctx)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").field("backend", &self.backend.name()).finish()
    }
}

