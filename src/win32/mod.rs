use std::{ffi::c_void, path::PathBuf};

use log::{debug, error};
use windows::Win32::{
    Foundation::{HANDLE, HWND},
    System::Com::CoTaskMemFree,
    UI::{
        Shell::{FOLDERID_LocalAppData, SHGetKnownFolderPath, KF_FLAG_DEFAULT},
        WindowsAndMessaging::SetParent,
    },
};

use crate::{
    adapter::{Desktop, WindowHandle},
    taskbar::TaskbarState,
    Result,
};

pub mod com;
pub mod factory;
pub mod registry;
pub mod site;
pub mod taskbar;

pub use com::DeskBand;
pub use factory::{can_unload_now, get_class_object, BandFactory, BandHost};
pub use site::ShellSite;

pub fn to_hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.0)
}

pub fn set_parent(child: HWND, parent: HWND) {
    debug!("SetParent {child:?} -> {parent:?}");
    if unsafe { SetParent(child, parent) }.0 == 0 {
        error!(
            "Could not parent {child:?} to {parent:?}: {}",
            windows::core::Error::from_win32()
        );
    }
}

pub fn get_local_appdata_path() -> Result<PathBuf> {
    let wide_path = unsafe {
        SHGetKnownFolderPath(&FOLDERID_LocalAppData, KF_FLAG_DEFAULT, HANDLE::default())?
    };
    let path_str = unsafe { wide_path.to_string() };
    unsafe { CoTaskMemFree(Some(wide_path.0 as *const c_void)) };
    let path = PathBuf::from(path_str.map_err(|e| e.to_string())?);
    Ok(path)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Win32Desktop;

impl Desktop for Win32Desktop {
    fn set_parent(&self, child: WindowHandle, parent: WindowHandle) {
        set_parent(to_hwnd(child), to_hwnd(parent));
    }

    fn taskbar_state(&self) -> Option<TaskbarState> {
        taskbar::get_taskbar_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_reparent_is_reported_not_fatal() {
        set_parent(HWND(0), HWND(0));
        Win32Desktop.set_parent(WindowHandle::NULL, WindowHandle(0x1));
    }
}
