use std::{
    ffi::c_void,
    ptr::null_mut,
    rc::Rc,
    sync::atomic::{AtomicU32, Ordering},
};

use log::{debug, error};
use windows::{
    core::{implement, IUnknown, Interface, Result, GUID, HRESULT},
    Win32::{
        Foundation::{BOOL, E_FAIL, E_POINTER, HWND, S_FALSE, S_OK},
        System::Com::{IClassFactory, IClassFactory_Impl},
    },
};

use super::com::{DeskBand, ShellBandAdapter};
use crate::options::Options;

const CLASS_E_NOAGGREGATION: HRESULT = HRESULT(0x80040110_u32 as i32);
const CLASS_E_CLASSNOTAVAILABLE: HRESULT = HRESULT(0x80040111_u32 as i32);

static LOCK_COUNT: AtomicU32 = AtomicU32::new(0);
static BAND_COUNT: AtomicU32 = AtomicU32::new(0);

pub(crate) fn count_band() {
    BAND_COUNT.fetch_add(1, Ordering::SeqCst);
}

pub(crate) fn uncount_band() {
    BAND_COUNT.fetch_sub(1, Ordering::SeqCst);
}

/// What the embedding DLL supplies for every band the Shell creates.
pub trait BandHost {
    fn create_window(&self) -> crate::Result<(HWND, Rc<Options>)>;

    fn band_created(&self, _adapter: &Rc<ShellBandAdapter>) {}
}

#[implement(IClassFactory)]
pub struct BandFactory {
    host: Box<dyn BandHost>,
}

impl BandFactory {
    pub fn new(host: impl BandHost + 'static) -> Self {
        BandFactory {
            host: Box::new(host),
        }
    }
}

impl IClassFactory_Impl for BandFactory {
    fn CreateInstance(
        &self,
        punkouter: Option<&IUnknown>,
        riid: *const GUID,
        ppvobject: *mut *mut c_void,
    ) -> Result<()> {
        if ppvobject.is_null() {
            return Err(E_POINTER.into());
        }
        unsafe { *ppvobject = null_mut() };
        if punkouter.is_some() {
            return Err(CLASS_E_NOAGGREGATION.into());
        }
        let (hwnd, options) = self.host.create_window().map_err(|e| {
            error!("Could not create the band window: {e}");
            windows::core::Error::from(E_FAIL)
        })?;
        let (band, adapter) = DeskBand::create(hwnd, options);
        self.host.band_created(&adapter);
        unsafe { band.query(riid, ppvobject) }.ok()
    }

    fn LockServer(&self, flock: BOOL) -> Result<()> {
        if flock.as_bool() {
            LOCK_COUNT.fetch_add(1, Ordering::SeqCst);
        } else {
            LOCK_COUNT.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Body of the embedding DLL's `DllGetClassObject` export.
///
/// # Safety
/// The pointers are the ones `DllGetClassObject` received.
pub unsafe fn get_class_object(
    clsid: &GUID,
    rclsid: *const GUID,
    riid: *const GUID,
    ppv: *mut *mut c_void,
    host: impl BandHost + 'static,
) -> HRESULT {
    if ppv.is_null() {
        return E_POINTER;
    }
    *ppv = null_mut();
    if rclsid.is_null() || *rclsid != *clsid {
        return CLASS_E_CLASSNOTAVAILABLE;
    }
    if riid.is_null() {
        return E_POINTER;
    }
    debug!("Handing out class factory for {clsid:?}");
    let factory: IClassFactory = BandFactory::new(host).into();
    factory.query(riid, ppv)
}

/// Body of the embedding DLL's `DllCanUnloadNow` export.
pub fn can_unload_now() -> HRESULT {
    if LOCK_COUNT.load(Ordering::SeqCst) == 0 && BAND_COUNT.load(Ordering::SeqCst) == 0 {
        S_OK
    } else {
        S_FALSE
    }
}
