use std::path::Path;

use rpr_sys::*;
use tracing::info;

use crate::{
    context::{Aov, Context, ContextParameter},
    engine::c_path,
    error::{Checked, Result},
    object::{ObjectHandle, engine_object},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ComponentType {
    Uint8,
    Float16,
    #[default]
    Float32,
}

impl ComponentType {
    pub fn raw(self) -> rpr_component_type {
        match self {
            ComponentType::Uint8 => RPR_COMPONENT_TYPE::UINT8,
            ComponentType::Float16 => RPR_COMPONENT_TYPE::FLOAT16,
            ComponentType::Float32 => RPR_COMPONENT_TYPE::FLOAT32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferFormat {
    /// 1 to 4.
    pub components: u32,
    pub component_type: ComponentType,
}

impl FramebufferFormat {
    pub fn new(components: u32, component_type: ComponentType) -> FramebufferFormat {
        FramebufferFormat {
            components,
            component_type,
        }
    }
}

impl Default for FramebufferFormat {
    fn default() -> Self {
        FramebufferFormat::new(4, ComponentType::Float32)
    }
}

pub struct Framebuffer<'c> {
    handle: ObjectHandle<'c>,
    format: FramebufferFormat,
    width: u32,
    height: u32,
}

engine_object!(Framebuffer);

impl<'c> Framebuffer<'c> {
    pub(crate) fn new(handle: ObjectHandle<'c>, format: FramebufferFormat, width: u32, height: u32) -> Framebuffer<'c> {
        Framebuffer {
            handle,
            format,
            width,
            height,
        }
    }

    pub fn format(&self) -> FramebufferFormat {
        self.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn clear(&self) -> Result<()> {
        self.handle
            .backend()
            .framebuffer_clear(self.raw())
            .checked("rprFrameBufferClear")
    }

    /// Output format follows the file extension.
    pub fn save(&self, path: &Path) -> Result<()> {
        let c_path = c_path(path)?;
        self.handle
            .backend()
            .framebuffer_save_to_file(self.raw(), &c_path)
            .checked("rprFrameBufferSaveToFile")?;
        info!(path = %path.display(), "saved framebuffer");
        Ok(())
    }

    /// Pixels row by row from the top, `components` floats each.
    pub fn data(&self) -> Result<Vec<f32>> {
        self.handle
            .backend()
            .framebuffer_data(self.raw())
            .checked("rprFrameBufferGetInfo")
    }
}

/// The clear, render, resolve, save cycle over an accumulation and a display framebuffer.
pub struct RenderLoop<'c> {
    ctx: &'c Context<'c>,
    accumulation: Framebuffer<'c>,
    resolved: Framebuffer<'c>,
    no_display_gamma: bool,
}

impl<'c> RenderLoop<'c> {
    /// Creates both framebuffers and binds the accumulation one as the color output.
    pub fn new(ctx: &'c Context<'c>, width: u32, height: u32) -> Result<RenderLoop<'c>> {
        let accumulation = ctx.create_framebuffer(FramebufferFormat::default(), width, height)?;
        let resolved = ctx.create_framebuffer(FramebufferFormat::default(), width, height)?;
        ctx.set_aov(Aov::Color, Some(&accumulation))?;
        Ok(RenderLoop {
            ctx,
            accumulation,
            resolved,
            no_display_gamma: false,
        })
    }

    pub fn accumulation(&self) -> &Framebuffer<'c> {
        &self.accumulation
    }

    pub fn resolved(&self) -> &Framebuffer<'c> {
        &self.resolved
    }

    pub fn set_no_display_gamma(&mut self, no_display_gamma: bool) {
        self.no_display_gamma = no_display_gamma;
    }

    /// Renders one frame from scratch with `iterations` samples and resolves it.
    pub fn frame(&self, iterations: u32) -> Result<()> {
        self.accumulation.clear()?;
        self.ctx.set_parameter(ContextParameter::Iterations(iterations))?;
        self.ctx.render()?;
        self.ctx
            .resolve(&self.accumulation, &self.resolved, self.no_display_gamma)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.resolved.save(path)
    }

    pub fn render_to(&self, iterations: u32, path: &Path) -> Result<()> {
        self.frame(iterations)?;
        self.save(path)
    }
}
