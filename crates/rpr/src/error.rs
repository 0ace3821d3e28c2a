use std::{fmt, path::PathBuf};

use rpr_sys::*;

/// Raw status code returned by every engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(pub rpr_status);

impl Status {
    pub const SUCCESS: Status = Status(RPR_SUCCESS);
    pub const INVALID_OBJECT: Status = Status(RPR_ERROR_INVALID_OBJECT);
    pub const INVALID_PARAMETER: Status = Status(RPR_ERROR_INVALID_PARAMETER);
    pub const INVALID_CONTEXT: Status = Status(RPR_ERROR_INVALID_CONTEXT);
    pub const INVALID_LIGHT: Status = Status(RPR_ERROR_INVALID_LIGHT);
    pub const INVALID_API_VERSION: Status = Status(RPR_ERROR_INVALID_API_VERSION);
    pub const INVALID_IMAGE: Status = Status(RPR_ERROR_INVALID_IMAGE);
    pub const IO_ERROR: Status = Status(RPR_ERROR_IO_ERROR);
    pub const UNSUPPORTED: Status = Status(RPR_ERROR_UNSUPPORTED);
    pub const UNSUPPORTED_IMAGE_FORMAT: Status = Status(RPR_ERROR_UNSUPPORTED_IMAGE_FORMAT);
    pub const INTERNAL_ERROR: Status = Status(RPR_ERROR_INTERNAL_ERROR);

    pub fn is_success(self) -> bool {
        self.0 == RPR_SUCCESS
    }

    /// Converts a C return value into a `Result`, keeping the code on failure.
    pub fn check(status: rpr_status) -> std::result::Result<(), Status> {
        if status == RPR_SUCCESS {
            Ok(())
        } else {
            Err(Status(status))
        }
    }

    pub fn name(self) -> &'static str {
        match self.0 {
            RPR_SUCCESS => "RPR_SUCCESS",
            RPR_ERROR_COMPUTE_API_NOT_SUPPORTED => "RPR_ERROR_COMPUTE_API_NOT_SUPPORTED",
            RPR_ERROR_OUT_OF_SYSTEM_MEMORY => "RPR_ERROR_OUT_OF_SYSTEM_MEMORY",
            RPR_ERROR_OUT_OF_VIDEO_MEMORY => "RPR_ERROR_OUT_OF_VIDEO_MEMORY",
            RPR_ERROR_INVALID_LIGHTPATH_EXPR => "RPR_ERROR_INVALID_LIGHTPATH_EXPR",
            RPR_ERROR_INVALID_IMAGE => "RPR_ERROR_INVALID_IMAGE",
            RPR_ERROR_INVALID_AA_METHOD => "RPR_ERROR_INVALID_AA_METHOD",
            RPR_ERROR_UNSUPPORTED_IMAGE_FORMAT => "RPR_ERROR_UNSUPPORTED_IMAGE_FORMAT",
            RPR_ERROR_INVALID_GL_TEXTURE => "RPR_ERROR_INVALID_GL_TEXTURE",
            RPR_ERROR_INVALID_CL_IMAGE => "RPR_ERROR_INVALID_CL_IMAGE",
            RPR_ERROR_INVALID_OBJECT => "RPR_ERROR_INVALID_OBJECT",
            RPR_ERROR_INVALID_PARAMETER => "RPR_ERROR_INVALID_PARAMETER",
            RPR_ERROR_INVALID_TAG => "RPR_ERROR_INVALID_TAG",
            RPR_ERROR_INVALID_LIGHT => "RPR_ERROR_INVALID_LIGHT",
            RPR_ERROR_INVALID_CONTEXT => "RPR_ERROR_INVALID_CONTEXT",
            RPR_ERROR_UNIMPLEMENTED => "RPR_ERROR_UNIMPLEMENTED",
            RPR_ERROR_INVALID_API_VERSION => "RPR_ERROR_INVALID_API_VERSION",
            RPR_ERROR_INTERNAL_ERROR => "RPR_ERROR_INTERNAL_ERROR",
            RPR_ERROR_IO_ERROR => "RPR_ERROR_IO_ERROR",
            RPR_ERROR_UNSUPPORTED_SHADER_PARAMETER_TYPE => "RPR_ERROR_UNSUPPORTED_SHADER_PARAMETER_TYPE",
            RPR_ERROR_MATERIAL_STACK_OVERFLOW => "RPR_ERROR_MATERIAL_STACK_OVERFLOW",
            RPR_ERROR_INVALID_PARAMETER_TYPE => "RPR_ERROR_INVALID_PARAMETER_TYPE",
            RPR_ERROR_UNSUPPORTED => "RPR_ERROR_UNSUPPORTED",
            RPR_ERROR_OPENCL_OUT_OF_HOST_MEMORY => "RPR_ERROR_OPENCL_OUT_OF_HOST_MEMORY",
            RPR_ERROR_OPENGL => "RPR_ERROR_OPENGL",
            RPR_ERROR_OPENCL => "RPR_ERROR_OPENCL",
            RPR_ERROR_NULLPTR => "RPR_ERROR_NULLPTR",
            RPR_ERROR_NODETYPE => "RPR_ERROR_NODETYPE",
            RPR_ERROR_ABORTED => "RPR_ERROR_ABORTED",
            _ => "unknown status",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{call} failed with {status}")]
    Status { call: &'static str, status: Status },
    #[error("rendering plugin could not be registered: {0}")]
    PluginNotFound(PathBuf),
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),
    #[error("path can't be passed across the engine boundary: {0}")]
    InvalidPath(PathBuf),
    #[error("name contains an interior nul byte: {0:?}")]
    InvalidName(String),
    #[error("unsupported scene file: {0}")]
    UnsupportedFormat(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Gltf(#[from] gltf::Error),
}

impl Error {
    /// The engine status behind this error, if it came from an engine call.
    pub fn status(&self) -> Option<Status> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Attaches the name of the failing engine call to a raw status.
pub(crate) trait Checked<T> {
    fn checked(self, call: &'static str) -> Result<T>;
}

impl<T> Checked<T> for std::result::Result<T, Status> {
    fn checked(self, call: &'static str) -> Result<T> {
        self.map_err(|status| Error::Status { call, status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_names_the_constant() {
        assert_eq!(Status::INVALID_OBJECT.to_string(), "RPR_ERROR_INVALID_OBJECT (-11)");
        assert_eq!(Status(-1000).name(), "unknown status");
    }

    #[test]
    fn check_maps_success_only() {
        assert!(Status::check(RPR_SUCCESS).is_ok());
        assert_eq!(Status::check(RPR_ERROR_IO_ERROR), Err(Status::IO_ERROR));
    }

    #[test]
    fn checked_keeps_call_name() {
        let err = Err::<(), _>(Status::UNSUPPORTED).checked("rprContextRender").unwrap_err();
        assert_eq!(err.status(), Some(Status::UNSUPPORTED));
        assert_eq!(err.to_string(), "rprContextRender failed with RPR_ERROR_UNSUPPORTED (-23)");
    }
}
