use std::path::PathBuf;

/// Values every demo renders with. Command line flags override the defaults.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub iterations: u32,
    pub display_gamma: f32,
    pub output_dir: PathBuf,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            iterations: 100,
            display_gamma: 2.2,
            output_dir: PathBuf::from("output"),
        }
    }
}
