use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use clap::Parser;
use rpr::{ContextDescriptor, CreationFlags, Engine, PluginKind, SdkLayout};
use tracing::{info, warn};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod demos;
mod settings;

use demos::DemoEnv;
use settings::RenderSettings;

#[derive(Debug, clap::Parser)]
#[command(about = "Run Radeon ProRender demo sequences")]
struct CommandLineArguments {
    #[arg(long, value_enum, default_value_t = Backend::Headless, help = "Engine to drive")]
    backend: Backend,
    #[arg(long, env = "RPR_SDK_DIR", help = "Root of the Radeon ProRender SDK")]
    sdk_dir: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Plugin::Northstar, help = "Rendering plugin")]
    plugin: Plugin,

    #[arg(long, default_value_t = 0, help = "GPU index to render on (0-7)")]
    gpu: u32,
    #[arg(long, action, help = "Render on the CPU instead of a GPU")]
    cpu: bool,

    #[arg(short, long, help = "Iterations per frame")]
    iterations: Option<u32>,
    #[arg(long, help = "Output width in pixels")]
    width: Option<u32>,
    #[arg(long, help = "Output height in pixels")]
    height: Option<u32>,
    #[arg(long, help = "Display gamma applied on resolve")]
    gamma: Option<f32>,
    #[arg(short, long, help = "Directory rendered images are written to")]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum Backend {
    #[default]
    Headless,
    Native,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum Plugin {
    Northstar,
    Tahoe,
    Hybrid,
    HybridPro,
}

impl From<Plugin> for PluginKind {
    fn from(plugin: Plugin) -> Self {
        match plugin {
            Plugin::Northstar => PluginKind::Northstar,
            Plugin::Tahoe => PluginKind::Tahoe,
            Plugin::Hybrid => PluginKind::Hybrid,
            Plugin::HybridPro => PluginKind::HybridPro,
        }
    }
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    #[command(about = "Run one builtin demo by name")]
    Run {
        #[arg(help = "Demo name (see list-demos)")]
        name: String,
    },
    #[command(about = "Run every builtin demo in order")]
    All,
    #[command(about = "List all builtin demos as JSON")]
    ListDemos,
    #[command(about = "Import a .gltf/.glb/.rprs scene and render it")]
    Import {
        #[arg(help = "Scene file")]
        path: PathBuf,
    },
    #[command(about = "Print the device the context renders on")]
    Info,
}

impl CommandLineArguments {
    fn settings(&self) -> RenderSettings {
        let defaults = RenderSettings::default();
        RenderSettings {
            width: self.width.unwrap_or(defaults.width),
            height: self.height.unwrap_or(defaults.height),
            iterations: self.iterations.unwrap_or(defaults.iterations),
            display_gamma: self.gamma.unwrap_or(defaults.display_gamma),
            output_dir: self.output_dir.clone().unwrap_or(defaults.output_dir),
        }
    }

    fn creation_flags(&self) -> anyhow::Result<CreationFlags> {
        if self.cpu {
            return Ok(CreationFlags::CPU);
        }
        match CreationFlags::gpu(self.gpu as usize) {
            Some(flags) => Ok(flags),
            None => bail!("--gpu must be between 0 and 7, got {}", self.gpu),
        }
    }
}

fn init_tracing() {
    let indicatif_layer = IndicatifLayer::new();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif_layer.get_stderr_writer()))
        .with(indicatif_layer)
        .init();
}

fn engine(backend: Backend) -> anyhow::Result<Engine> {
    match backend {
        Backend::Headless => Ok(Engine::headless()),
        Backend::Native => {
            #[cfg(feature = "native")]
            {
                Ok(Engine::native())
            }
            #[cfg(not(feature = "native"))]
            {
                bail!("native backend not compiled (enable the 'native' feature)")
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli_args = CommandLineArguments::parse();
    init_tracing();

    if let Command::ListDemos = cli_args.command {
        let demos: Vec<&str> = demos::all_demos().iter().map(|demo| demo.name).collect();
        println!("{}", serde_json::to_string(&demos)?);
        return Ok(());
    }

    let layout = cli_args.sdk_dir.clone().map(SdkLayout::new);
    if matches!(cli_args.backend, Backend::Native) && layout.is_none() {
        bail!("the native backend needs --sdk-dir or {}", SdkLayout::ENV_VAR);
    }

    let engine = engine(cli_args.backend)?;
    let kind = PluginKind::from(cli_args.plugin);
    let plugin_path = match &layout {
        Some(layout) => layout.plugin_path(kind),
        None => PathBuf::from(kind.file_name()),
    };
    let plugin = engine
        .register_plugin(&plugin_path)
        .with_context(|| format!("failed to register {}", plugin_path.display()))?;

    let mut descriptor = ContextDescriptor::new(plugin).flags(cli_args.creation_flags()?);
    if let Some(layout) = &layout {
        descriptor = descriptor.precompiled_binary_path(layout.kernel_cache_dir());
    }
    let ctx = engine.create_context(&descriptor).context("failed to create context")?;

    let settings = cli_args.settings();
    std::fs::create_dir_all(&settings.output_dir)
        .with_context(|| format!("failed to create {}", settings.output_dir.display()))?;
    let env = DemoEnv {
        settings,
        resources: layout.as_ref().map(SdkLayout::resources_dir),
    };

    match &cli_args.command {
        Command::Run { name } => {
            let Some(demo) = demos::find_demo(name) else {
                bail!("no demo named {name:?} (see list-demos)");
            };
            demos::run_demo(&ctx, &env, demo)?;
        }
        Command::All => {
            for demo in demos::all_demos() {
                demos::run_demo(&ctx, &env, demo)?;
            }
        }
        Command::Import { path } => {
            let output = import(&ctx, &env, path)?;
            info!(path = %output.display(), "saved");
        }
        Command::Info => {
            println!("plugin: {}", plugin_path.display());
            println!("device: {}", ctx.device_name()?);
        }
        Command::ListDemos => unreachable!("handled before the context is created"),
    }

    if !ctx.check_no_leak()? {
        warn!("objects still alive at teardown");
    }
    ctx.destroy().context("failed to delete context")?;
    Ok(())
}

fn import(ctx: &rpr::Context<'_>, env: &DemoEnv, path: &Path) -> anyhow::Result<PathBuf> {
    if !path.exists() {
        bail!("{} does not exist", path.display());
    }
    demos::import_scene(ctx, env, path)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn arguments_are_consistent() {
        CommandLineArguments::command().debug_assert();
    }

    #[test]
    fn flags_override_default_settings() {
        let args =
            CommandLineArguments::try_parse_from(["rpr", "--width", "320", "--gamma", "1.0", "run", "basic_scene"])
                .unwrap();
        let settings = args.settings();
        assert_eq!((settings.width, settings.height), (320, 600));
        assert_eq!(settings.display_gamma, 1.0);
        assert_eq!(settings.iterations, RenderSettings::default().iterations);
        assert!(matches!(args.command, Command::Run { ref name } if name == "basic_scene"));
    }

    #[test]
    fn device_selection_maps_to_creation_flags() {
        let gpu = |extra: &[&str]| {
            let mut argv = vec!["rpr"];
            argv.extend_from_slice(extra);
            argv.push("info");
            CommandLineArguments::try_parse_from(argv).unwrap().creation_flags()
        };
        assert_eq!(gpu(&[]).unwrap(), CreationFlags::GPU0);
        assert_eq!(gpu(&["--gpu", "3"]).unwrap(), CreationFlags::GPU3);
        assert_eq!(gpu(&["--gpu", "4"]).unwrap(), CreationFlags::GPU4);
        assert_eq!(gpu(&["--gpu", "5"]).unwrap(), CreationFlags::GPU5);
        assert_eq!(gpu(&["--gpu", "6"]).unwrap(), CreationFlags::GPU6);
        assert_eq!(gpu(&["--gpu", "7"]).unwrap(), CreationFlags::GPU7);
        assert!(!gpu(&["--gpu", "4"]).unwrap().intersects(CreationFlags::CPU | CreationFlags::GL_INTEROP));
        assert_eq!(gpu(&["--cpu"]).unwrap(), CreationFlags::CPU);
        assert!(gpu(&["--gpu", "8"]).is_err());
    }
}
