use std::{
    env,
    path::{Path, PathBuf},
};

/// Identifier handed out by plugin registration. Only valid for the engine
/// that returned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginId(pub(crate) i32);

impl PluginId {
    pub fn raw(self) -> i32 {
        self.0
    }
}

/// Rendering plugins shipped with the SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PluginKind {
    #[default]
    Northstar,
    Tahoe,
    Hybrid,
    HybridPro,
}

impl PluginKind {
    pub const ALL: [PluginKind; 4] = [PluginKind::Northstar, PluginKind::Tahoe, PluginKind::Hybrid, PluginKind::HybridPro];

    fn stem(self) -> &'static str {
        match self {
            PluginKind::Northstar => "Northstar64",
            PluginKind::Tahoe => "Tahoe64",
            PluginKind::Hybrid => "Hybrid",
            PluginKind::HybridPro => "HybridPro",
        }
    }

    /// Shared library name on the platform this was compiled for.
    pub fn file_name(self) -> String {
        if cfg!(target_os = "windows") {
            format!("{}.dll", self.stem())
        } else if cfg!(target_os = "macos") {
            format!("lib{}.dylib", self.stem())
        } else {
            format!("lib{}.so", self.stem())
        }
    }
}

/// Where things live inside an unpacked SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkLayout {
    root: PathBuf,
}

impl SdkLayout {
    pub const ENV_VAR: &'static str = "RPR_SDK_DIR";

    pub fn new(root: impl Into<PathBuf>) -> SdkLayout {
        SdkLayout { root: root.into() }
    }

    /// Reads the root from `RPR_SDK_DIR`.
    pub fn from_env() -> Option<SdkLayout> {
        env::var_os(Self::ENV_VAR).map(SdkLayout::new)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bin_dir(&self) -> PathBuf {
        let folder = if cfg!(target_os = "windows") {
            "binWin64"
        } else if cfg!(target_os = "macos") {
            "binMacOS"
        } else {
            "binUbuntu20"
        };
        self.root.join("RadeonProRender").join(folder)
    }

    pub fn plugin_path(&self, kind: PluginKind) -> PathBuf {
        self.bin_dir().join(kind.file_name())
    }

    /// Precompiled GPU kernels, passed at context creation.
    pub fn kernel_cache_dir(&self) -> PathBuf {
        self.root.join("hipbin")
    }

    pub fn resources_dir(&self) -> PathBuf {
        self.root.join("Resources")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_lives_in_platform_bin_dir() {
        let sdk = SdkLayout::new("/opt/rpr");
        let path = sdk.plugin_path(PluginKind::Tahoe);
        assert!(path.starts_with("/opt/rpr/RadeonProRender"));
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        assert!(name.contains("Tahoe64"), "{name}");
        assert_eq!(sdk.kernel_cache_dir(), Path::new("/opt/rpr/hipbin"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn linux_names() {
        assert_eq!(PluginKind::Northstar.file_name(), "libNorthstar64.so");
        assert!(SdkLayout::new("sdk").bin_dir().ends_with("binUbuntu20"));
    }
}
