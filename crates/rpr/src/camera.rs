use rpr_sys::RPR_CAMERA_MODE;

use crate::{
    backend::CameraParameter,
    error::{Checked, Result},
    geometry::Vec3,
    object::{ObjectHandle, engine_object},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CameraMode {
    #[default]
    Perspective,
    Orthographic,
}

impl CameraMode {
    fn raw(self) -> u32 {
        match self {
            CameraMode::Perspective => RPR_CAMERA_MODE::PERSPECTIVE,
            CameraMode::Orthographic => RPR_CAMERA_MODE::ORTHOGRAPHIC,
        }
    }
}

/// Lengths are in millimeters except `focus_distance` and `ortho_width`, which are scene units.
pub struct Camera<'c> {
    handle: ObjectHandle<'c>,
}

engine_object!(Camera);

impl<'c> Camera<'c> {
    pub(crate) fn new(handle: ObjectHandle<'c>) -> Camera<'c> {
        Camera { handle }
    }

    fn set(&self, parameter: CameraParameter, call: &'static str) -> Result<()> {
        self.handle.backend().camera_set(self.raw(), parameter).checked(call)
    }

    pub fn look_at(&self, position: Vec3, target: Vec3, up: Vec3) -> Result<()> {
        self.handle
            .backend()
            .camera_look_at(self.raw(), position.into(), target.into(), up.into())
            .checked("rprCameraLookAt")
    }

    pub fn set_focal_length(&self, millimeters: f32) -> Result<()> {
        self.set(CameraParameter::FocalLength(millimeters), "rprCameraSetFocalLength")
    }

    /// Shutter open time as a fraction of a frame; non-zero enables motion blur.
    pub fn set_exposure(&self, exposure: f32) -> Result<()> {
        self.set(CameraParameter::Exposure(exposure), "rprCameraSetExposure")
    }

    pub fn set_fstop(&self, fstop: f32) -> Result<()> {
        self.set(CameraParameter::FStop(fstop), "rprCameraSetFStop")
    }

    pub fn set_focus_distance(&self, distance: f32) -> Result<()> {
        self.set(CameraParameter::FocusDistance(distance), "rprCameraSetFocusDistance")
    }

    pub fn set_aperture_blades(&self, blades: u32) -> Result<()> {
        self.set(CameraParameter::ApertureBlades(blades), "rprCameraSetApertureBlades")
    }

    pub fn set_sensor_size(&self, width: f32, height: f32) -> Result<()> {
        self.set(CameraParameter::SensorSize(width, height), "rprCameraSetSensorSize")
    }

    pub fn set_mode(&self, mode: CameraMode) -> Result<()> {
        self.set(CameraParameter::Mode(mode.raw()), "rprCameraSetMode")
    }

    pub fn set_ortho_width(&self, width: f32) -> Result<()> {
        self.set(CameraParameter::OrthoWidth(width), "rprCameraSetOrthoWidth")
    }
}
