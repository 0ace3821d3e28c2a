use crate::{
    camera::Camera,
    error::{Checked, Result},
    light::Light,
    object::{ObjectHandle, engine_object},
    shape::Shape,
};

/// Attachment set of shapes and lights plus the camera they are viewed through.
///
/// The scene does not own what is attached to it; deleting a shape or light
/// removes it from every scene.
pub struct Scene<'c> {
    handle: ObjectHandle<'c>,
}

engine_object!(Scene);

impl<'c> Scene<'c> {
    pub(crate) fn new(handle: ObjectHandle<'c>) -> Scene<'c> {
        Scene { handle }
    }

    pub fn set_camera(&self, camera: Option<&Camera<'_>>) -> Result<()> {
        self.handle
            .backend()
            .scene_set_camera(self.raw(), camera.map(Camera::raw))
            .checked("rprSceneSetCamera")
    }

    pub fn attach_shape(&self, shape: &Shape<'_>) -> Result<()> {
        self.handle
            .backend()
            .scene_attach_shape(self.raw(), shape.raw())
            .checked("rprSceneAttachShape")
    }

    pub fn detach_shape(&self, shape: &Shape<'_>) -> Result<()> {
        self.handle
            .backend()
            .scene_detach_shape(self.raw(), shape.raw())
            .checked("rprSceneDetachShape")
    }

    pub fn attach_light(&self, light: &Light<'_>) -> Result<()> {
        self.handle
            .backend()
            .scene_attach_light(self.raw(), light.raw())
            .checked("rprSceneAttachLight")
    }

    pub fn detach_light(&self, light: &Light<'_>) -> Result<()> {
        self.handle
            .backend()
            .scene_detach_light(self.raw(), light.raw())
            .checked("rprSceneDetachLight")
    }
}
