use std::{ffi::c_void, mem::size_of, ptr::null_mut, rc::Rc};

use log::{debug, info};
use windows::{
    core::{implement, IUnknown, Interface, Result, GUID, HRESULT},
    Win32::{
        Foundation::{BOOL, E_FAIL, E_POINTER, HWND, RECT},
        System::Ole::{IObjectWithSite, IObjectWithSite_Impl, IOleWindow_Impl},
        UI::Shell::{
            IDeskBand2, IDeskBand2_Impl, IDeskBand_Impl, IDockingWindow_Impl, DESKBANDINFO,
        },
    },
};

use super::{site::ShellSite, Win32Desktop};
use crate::{
    adapter::{BandAdapter, Status, WindowHandle},
    band_info::{BandInfo, BandInfoField, BandInfoMask, ModeFlags, Point, ViewMode},
    options::Options,
};

pub type ShellBandAdapter = BandAdapter<ShellSite, Win32Desktop>;

const TITLE_LEN: usize = 256;

#[repr(C)]
#[derive(Clone, Copy)]
struct RawPoint {
    x: i32,
    y: i32,
}

/// Field for field the layout of `DESKBANDINFO`.
#[repr(C)]
struct RawBandInfo {
    mask: u32,
    min_size: RawPoint,
    max_size: RawPoint,
    integral: RawPoint,
    actual: RawPoint,
    title: [u16; TITLE_LEN],
    mode_flags: u32,
    background: u32,
}

const _: () = assert!(size_of::<RawBandInfo>() == size_of::<DESKBANDINFO>());

impl From<RawPoint> for Point {
    fn from(p: RawPoint) -> Self {
        Point::new(p.x, p.y)
    }
}

impl From<Point> for RawPoint {
    fn from(p: Point) -> Self {
        RawPoint { x: p.x, y: p.y }
    }
}

impl RawBandInfo {
    /// The title is not read back, it is only ever written.
    fn read(&self) -> BandInfo {
        BandInfo {
            mask: BandInfoMask::from_bits(self.mask),
            min_size: self.min_size.into(),
            max_size: self.max_size.into(),
            integral: self.integral.into(),
            actual: self.actual.into(),
            title: String::new(),
            mode_flags: ModeFlags::from_bits(self.mode_flags),
            background: self.background,
        }
    }

    fn write(&mut self, info: &BandInfo) {
        for field in info.mask.fields() {
            match field {
                BandInfoField::MinSize => self.min_size = info.min_size.into(),
                BandInfoField::MaxSize => self.max_size = info.max_size.into(),
                BandInfoField::Integral => self.integral = info.integral.into(),
                BandInfoField::Actual => self.actual = info.actual.into(),
                BandInfoField::Title => write_title(&mut self.title, &info.title),
                BandInfoField::ModeFlags => self.mode_flags = info.mode_flags.bits(),
                BandInfoField::BackgroundColor => {}
            }
        }
    }
}

fn write_title(buf: &mut [u16; TITLE_LEN], title: &str) {
    let mut len = 0;
    for (dst, src) in buf.iter_mut().zip(title.encode_utf16().take(TITLE_LEN - 1)) {
        *dst = src;
        len += 1;
    }
    // never end on half a surrogate pair
    if len > 0 && (0xD800..=0xDBFF).contains(&buf[len - 1]) {
        len -= 1;
    }
    buf[len] = 0;
}

fn status(status: Status) -> Result<()> {
    HRESULT(status.hresult()).ok()
}

/// A deskband presenting `hwnd`, ready to be handed to the Shell.
#[implement(IDeskBand2, IObjectWithSite)]
pub struct DeskBand {
    adapter: Rc<ShellBandAdapter>,
}

impl DeskBand {
    /// Returns the COM object together with the adapter, so the caller can
    /// subscribe to `visibility_changed` and `closed`.
    pub fn create(hwnd: HWND, options: Rc<Options>) -> (IDeskBand2, Rc<ShellBandAdapter>) {
        info!("Create deskband for {hwnd:?}");
        let adapter = BandAdapter::new(WindowHandle(hwnd.0), options, Win32Desktop);
        super::factory::count_band();
        let band: IDeskBand2 = DeskBand {
            adapter: Rc::clone(&adapter),
        }
        .into();
        (band, adapter)
    }
}

impl Drop for DeskBand {
    fn drop(&mut self) {
        debug!("Deskband object released");
        super::factory::uncount_band();
    }
}

impl IOleWindow_Impl for DeskBand {
    fn GetWindow(&self) -> Result<HWND> {
        Ok(super::to_hwnd(self.adapter.window()))
    }

    fn ContextSensitiveHelp(&self, fentermode: BOOL) -> Result<()> {
        status(self.adapter.context_sensitive_help(fentermode.as_bool()))
    }
}

impl IDockingWindow_Impl for DeskBand {
    fn ShowDW(&self, fshow: BOOL) -> Result<()> {
        status(self.adapter.show(fshow.as_bool()))
    }

    fn CloseDW(&self, _dwreserved: u32) -> Result<()> {
        status(self.adapter.close())
    }

    fn ResizeBorderDW(
        &self,
        _prcborder: *const RECT,
        _punktoolbarsite: Option<&IUnknown>,
        _freserved: BOOL,
    ) -> Result<()> {
        status(self.adapter.resize_border())
    }
}

impl IDeskBand_Impl for DeskBand {
    fn GetBandInfo(&self, dwbandid: u32, dwviewmode: u32, pdbi: *mut DESKBANDINFO) -> Result<()> {
        let view_mode = ViewMode::from_bits(dwviewmode);
        let raw = pdbi.cast::<RawBandInfo>();
        if raw.is_null() {
            // Nothing to fill, the taskbar mirror still gets refreshed
            let mut scratch = BandInfo::default();
            return status(self.adapter.get_band_info(dwbandid, view_mode, &mut scratch));
        }
        let raw = unsafe { &mut *raw };
        let mut info = raw.read();
        let res = self.adapter.get_band_info(dwbandid, view_mode, &mut info);
        raw.write(&info);
        status(res)
    }
}

impl IDeskBand2_Impl for DeskBand {
    fn CanRenderComposited(&self) -> Result<BOOL> {
        Ok(self.adapter.can_render_composited().into())
    }

    fn SetCompositionState(&self, fcompositionenabled: BOOL) -> Result<()> {
        status(
            self.adapter
                .set_composition_state(fcompositionenabled.as_bool()),
        )
    }

    fn GetCompositionState(&self) -> Result<BOOL> {
        Ok(self.adapter.composition_state().into())
    }
}

impl IObjectWithSite_Impl for DeskBand {
    fn SetSite(&self, punksite: Option<&IUnknown>) -> Result<()> {
        debug!("SetSite {}", if punksite.is_some() { "attach" } else { "detach" });
        status(self.adapter.set_site(punksite.map(ShellSite::new)))
    }

    /// Hands out a new reference through `QueryInterface`, as COM requires.
    fn GetSite(&self, riid: *const GUID, ppvsite: *mut *mut c_void) -> Result<()> {
        if ppvsite.is_null() {
            return Err(E_POINTER.into());
        }
        unsafe { *ppvsite = null_mut() };
        match self.adapter.site() {
            Some(site) => unsafe { site.unknown().query(riid, ppvsite) }.ok(),
            None => Err(E_FAIL.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> RawBandInfo {
        RawBandInfo {
            mask: 0,
            min_size: RawPoint { x: 0, y: 0 },
            max_size: RawPoint { x: 0, y: 0 },
            integral: RawPoint { x: 0, y: 0 },
            actual: RawPoint { x: 0, y: 0 },
            title: [0; TITLE_LEN],
            mode_flags: 0,
            background: 0,
        }
    }

    #[test]
    fn long_titles_are_truncated_and_terminated() {
        let mut raw = blank();
        raw.title = [b'x' as u16; TITLE_LEN];
        write_title(&mut raw.title, &"a".repeat(400));
        assert_eq!(raw.title[TITLE_LEN - 2], b'a' as u16);
        assert_eq!(raw.title[TITLE_LEN - 1], 0);

        write_title(&mut raw.title, "");
        assert_eq!(raw.title[0], 0);
    }

    #[test]
    fn truncation_does_not_split_surrogate_pairs() {
        let mut buf = [0; TITLE_LEN];
        let title = format!("{}\u{1F600}", "a".repeat(TITLE_LEN - 2));
        write_title(&mut buf, &title);
        assert_eq!(buf[TITLE_LEN - 3], b'a' as u16);
        assert_eq!(buf[TITLE_LEN - 2], 0);
        assert!(String::from_utf16(&buf[..TITLE_LEN - 2]).is_ok());

        let fits = format!("{}\u{1F600}", "a".repeat(TITLE_LEN - 3));
        write_title(&mut buf, &fits);
        assert_eq!(String::from_utf16(&buf[..TITLE_LEN - 1]).unwrap(), fits);
        assert_eq!(buf[TITLE_LEN - 1], 0);
    }

    #[test]
    fn only_requested_fields_are_written_back() {
        let mut raw = blank();
        raw.mask = BandInfoField::Actual.bit();
        raw.min_size = RawPoint { x: 7, y: 7 };
        let mut info = raw.read();
        info.actual = Point::new(1, 2);
        info.min_size = Point::new(9, 9);
        raw.write(&info);
        assert_eq!((raw.actual.x, raw.actual.y), (1, 2));
        assert_eq!((raw.min_size.x, raw.min_size.y), (7, 7));
    }
}
