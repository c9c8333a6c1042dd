use std::{
    mem::size_of,
    slice,
};

use log::debug;
use windows::{
    core::{HSTRING, PCWSTR},
    Win32::System::Registry::{
        RegCloseKey, RegCreateKeyW, RegDeleteTreeW, RegSetValueExW, HKEY, HKEY_CLASSES_ROOT,
        REG_SZ,
    },
};

use crate::Result;

/// An open key below `HKEY_CLASSES_ROOT`, closed on drop.
struct ClassesKey(HKEY);

impl ClassesKey {
    fn create(path: &str) -> Result<Self> {
        let path = HSTRING::from(path);
        let mut key = HKEY::default();
        unsafe { RegCreateKeyW(HKEY_CLASSES_ROOT, PCWSTR(path.as_ptr()), &mut key) }.ok()?;
        Ok(ClassesKey(key))
    }

    fn set_string(&self, name: PCWSTR, value: &str) -> Result<()> {
        let wide: Vec<u16> = value.encode_utf16().chain(Some(0)).collect();
        let bytes = unsafe {
            slice::from_raw_parts(wide.as_ptr() as *const u8, wide.len() * size_of::<u16>())
        };
        unsafe { RegSetValueExW(self.0, name, 0, REG_SZ, Some(bytes)) }.ok()?;
        Ok(())
    }
}

impl Drop for ClassesKey {
    fn drop(&mut self) {
        let _ = unsafe { RegCloseKey(self.0) };
    }
}

pub fn create_key(path: &str) -> Result<()> {
    debug!("Creating HKCR\\{path}");
    ClassesKey::create(path).map(|_| ())
}

pub fn set_default_value(path: &str, value: &str) -> Result<()> {
    debug!("Setting HKCR\\{path} to {value:?}");
    let key = ClassesKey::create(path)?;
    key.set_string(PCWSTR::null(), value)
}

pub fn set_value(path: &str, name: &str, value: &str) -> Result<()> {
    debug!("Setting HKCR\\{path}\\{name} to {value:?}");
    let key = ClassesKey::create(path)?;
    let name = HSTRING::from(name);
    key.set_string(PCWSTR(name.as_ptr()), value)
}

/// Deletes `parent\child` and everything below it.
pub fn delete_tree(parent: &str, child: &str) -> Result<()> {
    debug!("Deleting HKCR\\{parent}\\{child}");
    let key = ClassesKey::create(parent)?;
    let child = HSTRING::from(child);
    unsafe { RegDeleteTreeW(key.0, PCWSTR(child.as_ptr())) }.ok()?;
    Ok(())
}
