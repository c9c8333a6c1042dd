use std::mem::zeroed;

use log::debug;
use windows::{
    core::{IUnknown, Interface, GUID},
    Win32::System::{
        Ole::{IOleCommandTarget, IOleWindow},
        Variant::{VARIANT, VT_I4},
    },
};

use crate::{
    adapter::{Site, WindowHandle},
    Result,
};

/// Command group of deskband commands sent through `IOleCommandTarget::Exec`.
pub const CGID_DESKBAND: GUID = GUID::from_u128(0xEB0FE172_1A3A_11D0_89B3_00A0C90A90AC);
/// `DBID_BANDINFOCHANGED`
pub const DBID_BANDINFOCHANGED: u32 = 0;

/// The site the Shell hands to `SetSite`. Holds one reference that is
/// released when this value is dropped.
pub struct ShellSite(IUnknown);

impl ShellSite {
    pub fn new(unknown: &IUnknown) -> Self {
        ShellSite(unknown.clone())
    }

    pub fn unknown(&self) -> &IUnknown {
        &self.0
    }
}

impl Site for ShellSite {
    fn window(&self) -> Result<WindowHandle> {
        let ole_window: IOleWindow = self.0.cast()?;
        let hwnd = unsafe { ole_window.GetWindow()? };
        Ok(WindowHandle(hwnd.0))
    }

    fn band_info_changed(&self, band_id: u32) -> Result<()> {
        let target: IOleCommandTarget = self.0.cast()?;
        // The band id goes in as VT_I4
        let mut arg: VARIANT = unsafe { zeroed() };
        unsafe {
            (*arg.Anonymous.Anonymous).vt = VT_I4;
            (*arg.Anonymous.Anonymous).Anonymous.lVal = band_id as i32;
            target.Exec(
                &CGID_DESKBAND,
                DBID_BANDINFOCHANGED,
                0,
                &arg,
                std::ptr::null_mut(),
            )?;
        }
        Ok(())
    }
}

impl Drop for ShellSite {
    fn drop(&mut self) {
        debug!("Releasing shell site");
    }
}
