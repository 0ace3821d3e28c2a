use crate::{
    backend::LightParameter,
    error::{Checked, Result},
    geometry::{Matrix4x4, Vec3},
    image::Image,
    object::{ObjectHandle, engine_object},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Point,
    Directional,
    Environment,
}

/// A light source. Setters that don't apply to the light's kind fail with `INVALID_LIGHT`.
pub struct Light<'c> {
    handle: ObjectHandle<'c>,
    kind: LightKind,
}

engine_object!(Light);

impl<'c> Light<'c> {
    pub(crate) fn new(handle: ObjectHandle<'c>, kind: LightKind) -> Light<'c> {
        Light { handle, kind }
    }

    pub fn kind(&self) -> LightKind {
        self.kind
    }

    fn set(&self, parameter: LightParameter, call: &'static str) -> Result<()> {
        self.handle.backend().light_set(self.raw(), parameter).checked(call)
    }

    pub fn set_transform(&self, transform: &Matrix4x4) -> Result<()> {
        self.set(LightParameter::Transform(transform.to_row_major()), "rprLightSetTransform")
    }

    /// Radiant power in watts per channel, for point and directional lights.
    pub fn set_radiant_power(&self, power: Vec3) -> Result<()> {
        match self.kind {
            LightKind::Directional => self.set(
                LightParameter::DirectionalRadiantPower(power.into()),
                "rprDirectionalLightSetRadiantPower3f",
            ),
            _ => self.set(
                LightParameter::PointRadiantPower(power.into()),
                "rprPointLightSetRadiantPower3f",
            ),
        }
    }

    pub fn set_image(&self, image: &Image<'_>) -> Result<()> {
        self.set(LightParameter::EnvironmentImage(image.raw()), "rprEnvironmentLightSetImage")
    }

    pub fn set_intensity_scale(&self, scale: f32) -> Result<()> {
        self.set(LightParameter::IntensityScale(scale), "rprEnvironmentLightSetIntensityScale")
    }
}
