#[macro_export]
macro_rules! has_flag {
    ($value:expr, $flag:expr) => {
        ($value & $flag) == $flag
    };
}

pub mod adapter;
pub mod band_info;
pub mod config;
pub mod events;
pub mod logging;
pub mod options;
pub mod registration;
pub mod taskbar;
#[cfg(windows)]
pub mod win32;

pub use adapter::{BandAdapter, Desktop, LifecycleState, Site, Status, WindowHandle};
pub use band_info::{BandInfo, BandInfoField, BandInfoMask, ModeFlags, Point, ViewMode};
pub use options::{BandOptions, Options, Orientation, Size, SizePair};
pub use taskbar::{TaskbarEdge, TaskbarInfo, TaskbarOrientation, TaskbarState};

pub struct Error {
    pub(crate) message: String,
}

impl std::error::Error for Error {}

impl std::fmt::Debug for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = fmt.debug_struct("Error");
        debug.field("message", &self.message).finish()
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::write!(fmt, "{}", self.message)
    }
}

impl std::convert::From<&str> for Error {
    fn from(err: &str) -> Self {
        Error {
            message: String::from(err),
        }
    }
}

impl std::convert::From<String> for Error {
    fn from(message: String) -> Self {
        Error { message }
    }
}

impl std::convert::From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            message: err.to_string(),
        }
    }
}

impl std::convert::From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error {
            message: err.to_string(),
        }
    }
}

#[cfg(windows)]
impl std::convert::From<windows::core::Error> for Error {
    fn from(err: windows::core::Error) -> Self {
        Error {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
