use std::{
    cell::{Cell, Ref, RefCell},
    fmt,
    rc::{Rc, Weak},
};

use log::{debug, error, info};

use crate::{
    band_info::{BandInfo, ViewMode},
    events::{Event, SubscriptionId},
    options::Options,
    taskbar::{TaskbarInfo, TaskbarState},
    Result,
};

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

impl WindowHandle {
    pub const NULL: WindowHandle = WindowHandle(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WindowHandle({:#x})", self.0)
    }
}

/// The Shell supplied object a band is sited in. Dropping a `Site` releases
/// the underlying reference.
pub trait Site {
    fn window(&self) -> Result<WindowHandle>;
    fn band_info_changed(&self, band_id: u32) -> Result<()>;
}

pub trait Desktop {
    fn set_parent(&self, child: WindowHandle, parent: WindowHandle);
    fn taskbar_state(&self) -> Option<TaskbarState>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotImplemented,
}

impl Status {
    pub const S_OK: i32 = 0;
    pub const E_NOTIMPL: i32 = 0x8000_4001_u32 as i32;

    pub fn hresult(self) -> i32 {
        match self {
            Status::Ok => Status::S_OK,
            Status::NotImplemented => Status::E_NOTIMPL,
        }
    }

    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LifecycleState {
    #[default]
    Unattached,
    Attached,
    Closed,
}

pub struct BandAdapter<S: Site, D: Desktop> {
    window: WindowHandle,
    options: Rc<Options>,
    desktop: D,
    site: RefCell<Option<Rc<S>>>,
    parent_window: Cell<WindowHandle>,
    band_id: Cell<u32>,
    state: Cell<LifecycleState>,
    subscription: SubscriptionId,
    taskbar: TaskbarInfo,
    pub visibility_changed: Event<bool>,
    pub closed: Event<()>,
}

impl<S: Site + 'static, D: Desktop + 'static> BandAdapter<S, D> {
    pub fn new(window: WindowHandle, options: Rc<Options>, desktop: D) -> Rc<Self> {
        info!("Create deskband adapter for {window:?}");
        Rc::new_cyclic(|adapter: &Weak<Self>| {
            let adapter = Weak::clone(adapter);
            let subscription = options.subscribe(move || {
                if let Some(adapter) = adapter.upgrade() {
                    adapter.options_changed();
                }
            });
            BandAdapter {
                window,
                options,
                desktop,
                site: RefCell::new(None),
                parent_window: Cell::new(WindowHandle::NULL),
                band_id: Cell::new(0),
                state: Cell::new(LifecycleState::Unattached),
                subscription,
                taskbar: TaskbarInfo::new(),
                visibility_changed: Event::new(),
                closed: Event::new(),
            }
        })
    }
}

impl<S: Site, D: Desktop> BandAdapter<S, D> {
    pub fn state(&self) -> LifecycleState {
        self.state.get()
    }

    pub fn options(&self) -> &Rc<Options> {
        &self.options
    }

    pub fn taskbar(&self) -> &TaskbarInfo {
        &self.taskbar
    }

    pub fn band_id(&self) -> u32 {
        self.band_id.get()
    }

    pub fn parent_window(&self) -> WindowHandle {
        self.parent_window.get()
    }

    /// `IObjectWithSite::SetSite`. `None` means the band is being closed.
    pub fn set_site(&self, site: Option<S>) -> Status {
        if self.state.get() == LifecycleState::Closed {
            debug!("Band already closed, ignoring new site");
            return Status::Ok;
        }
        let previous = self.site.borrow_mut().take();
        if previous.is_some() {
            debug!("Releasing previous site");
        }
        drop(previous);
        self.parent_window.set(WindowHandle::NULL);

        let Some(site) = site else {
            info!("Closing deskband");
            self.enter_closed();
            return Status::Ok;
        };

        match site.window() {
            Ok(parent) => {
                debug!("Parenting {:?} to {parent:?}", self.window);
                self.parent_window.set(parent);
                self.desktop.set_parent(self.window, parent);
            }
            Err(e) => error!("Could not get window from site: {e}"),
        }
        *self.site.borrow_mut() = Some(Rc::new(site));
        self.state.set(LifecycleState::Attached);
        Status::Ok
    }

    pub fn site(&self) -> Option<Ref<'_, S>> {
        Ref::filter_map(self.site.borrow(), |site| site.as_deref()).ok()
    }

    pub fn window(&self) -> WindowHandle {
        self.window
    }

    pub fn context_sensitive_help(&self, _enter_mode: bool) -> Status {
        Status::NotImplemented
    }

    pub fn show(&self, visible: bool) -> Status {
        debug!("Deskband visibility changed to {visible}");
        self.visibility_changed.emit(&visible);
        Status::Ok
    }

    pub fn close(&self) -> Status {
        if self.state.get() == LifecycleState::Closed {
            return Status::Ok;
        }
        info!("Deskband closed by the shell");
        let site = self.site.borrow_mut().take();
        drop(site);
        self.parent_window.set(WindowHandle::NULL);
        self.enter_closed();
        Status::Ok
    }

    /// `IDockingWindow::ResizeBorderDW`. Deskbands must not handle this.
    pub fn resize_border(&self) -> Status {
        Status::NotImplemented
    }

    /// `IDeskBand::GetBandInfo`. Only the fields in `info.mask` are written.
    pub fn get_band_info(&self, band_id: u32, view_mode: ViewMode, info: &mut BandInfo) -> Status {
        self.band_id.set(band_id);
        debug!(
            "Band info {:#x} requested for band {band_id} in {:?} mode",
            info.mask.bits(),
            view_mode.orientation()
        );
        info.fill(&self.options.get(), view_mode);
        self.taskbar.refresh(self.desktop.taskbar_state());
        Status::Ok
    }

    pub fn can_render_composited(&self) -> bool {
        true
    }

    pub fn composition_state(&self) -> bool {
        true
    }

    pub fn set_composition_state(&self, _enabled: bool) -> Status {
        Status::Ok
    }

    fn enter_closed(&self) {
        self.state.set(LifecycleState::Closed);
        self.closed.emit(&());
    }

    /// The site is cloned out of the cell before `Exec`, so the Shell may
    /// close or replace it from inside the call. The last clone to go
    /// releases it.
    fn options_changed(&self) {
        let Some(site) = self.site.borrow().clone() else {
            return;
        };
        let band_id = self.band_id.get();
        debug!("Deskband options have changed, notifying band {band_id}");
        if let Err(e) = site.band_info_changed(band_id) {
            error!("Could not notify site of band info change: {e}");
        }
    }
}

impl<S: Site, D: Desktop> Drop for BandAdapter<S, D> {
    fn drop(&mut self) {
        self.options.unsubscribe(self.subscription);
    }
}

impl<S: Site, D: Desktop> fmt::Debug for BandAdapter<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BandAdapter")
            .field("window", &self.window)
            .field("parent_window", &self.parent_window.get())
            .field("band_id", &self.band_id.get())
            .field("state", &self.state.get())
            .field("has_site", &self.site.borrow().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        band_info::{BandInfoField, BandInfoMask, ModeFlags, Point},
        options::{BandOptions, Size, SizePair},
        taskbar::{TaskbarEdge, TaskbarOrientation},
    };
    use pretty_assertions::assert_eq;

    type Journal = Rc<RefCell<Vec<String>>>;

    struct MockSite {
        name: &'static str,
        hwnd: Option<isize>,
        journal: Journal,
        on_notify: Option<Box<dyn Fn()>>,
    }

    impl MockSite {
        fn new(name: &'static str, hwnd: isize, journal: &Journal) -> Self {
            MockSite {
                name,
                hwnd: Some(hwnd),
                journal: Rc::clone(journal),
                on_notify: None,
            }
        }
    }

    impl Site for MockSite {
        fn window(&self) -> Result<WindowHandle> {
            self.hwnd
                .map(WindowHandle)
                .ok_or_else(|| "no window".into())
        }

        fn band_info_changed(&self, band_id: u32) -> Result<()> {
            self.journal
                .borrow_mut()
                .push(format!("{} info changed {band_id}", self.name));
            if let Some(on_notify) = &self.on_notify {
                on_notify();
            }
            Ok(())
        }
    }

    impl Drop for MockSite {
        fn drop(&mut self) {
            self.journal
                .borrow_mut()
                .push(format!("{} released", self.name));
        }
    }

    struct MockDesktop {
        journal: Journal,
        taskbar: Cell<Option<TaskbarState>>,
        probes: Rc<Cell<usize>>,
    }

    impl Desktop for MockDesktop {
        fn set_parent(&self, child: WindowHandle, parent: WindowHandle) {
            self.journal
                .borrow_mut()
                .push(format!("parent {:#x} -> {:#x}", child.0, parent.0));
        }

        fn taskbar_state(&self) -> Option<TaskbarState> {
            self.probes.set(self.probes.get() + 1);
            self.taskbar.get()
        }
    }

    struct Fixture {
        adapter: Rc<BandAdapter<MockSite, MockDesktop>>,
        options: Rc<Options>,
        journal: Journal,
        probes: Rc<Cell<usize>>,
        closed: Rc<Cell<usize>>,
        visibility: Rc<RefCell<Vec<bool>>>,
    }

    fn fixture(options: BandOptions) -> Fixture {
        let journal = Journal::default();
        let probes = Rc::new(Cell::new(0));
        let options = Options::new(options);
        let desktop = MockDesktop {
            journal: Rc::clone(&journal),
            taskbar: Cell::new(Some(TaskbarState::new(TaskbarEdge::Left, Size::new(62, 1080)))),
            probes: Rc::clone(&probes),
        };
        let adapter = BandAdapter::new(WindowHandle(0x10), Rc::clone(&options), desktop);
        let closed = Rc::new(Cell::new(0));
        let c = Rc::clone(&closed);
        adapter.closed.subscribe(move |_| c.set(c.get() + 1));
        let visibility = Rc::new(RefCell::new(Vec::new()));
        let v = Rc::clone(&visibility);
        adapter
            .visibility_changed
            .subscribe(move |visible| v.borrow_mut().push(*visible));
        Fixture {
            adapter,
            options,
            journal,
            probes,
            closed,
            visibility,
        }
    }

    impl Fixture {
        fn site(&self, name: &'static str, hwnd: isize) -> MockSite {
            MockSite::new(name, hwnd, &self.journal)
        }

        fn entries(&self) -> Vec<String> {
            self.journal.borrow().clone()
        }
    }

    #[test]
    fn attach_reparents_to_site_window() {
        let f = fixture(BandOptions::default());
        assert_eq!(f.adapter.state(), LifecycleState::Unattached);
        assert_eq!(f.adapter.set_site(Some(f.site("a", 0x20))), Status::Ok);
        assert_eq!(f.adapter.state(), LifecycleState::Attached);
        assert_eq!(f.adapter.parent_window(), WindowHandle(0x20));
        assert_eq!(f.entries(), vec!["parent 0x10 -> 0x20"]);
        assert_eq!(f.adapter.site().map(|s| s.name), Some("a"));
    }

    #[test]
    fn detach_releases_once_and_closes_once() {
        let f = fixture(BandOptions::default());
        f.adapter.set_site(Some(f.site("a", 0x20)));
        f.adapter.set_site(None);
        assert_eq!(f.entries(), vec!["parent 0x10 -> 0x20", "a released"]);
        assert_eq!(f.closed.get(), 1);
        assert_eq!(f.adapter.state(), LifecycleState::Closed);
        assert!(f.adapter.site().is_none());

        f.adapter.set_site(None);
        f.adapter.close();
        assert_eq!(f.closed.get(), 1);
        assert_eq!(f.entries().len(), 2);
    }

    #[test]
    fn replacing_site_releases_old_before_parenting_new() {
        let f = fixture(BandOptions::default());
        f.adapter.set_site(Some(f.site("a", 0x20)));
        f.adapter.set_site(Some(f.site("b", 0x30)));
        assert_eq!(
            f.entries(),
            vec!["parent 0x10 -> 0x20", "a released", "parent 0x10 -> 0x30"]
        );
        assert_eq!(f.adapter.parent_window(), WindowHandle(0x30));
        assert_eq!(f.closed.get(), 0);
    }

    #[test]
    fn close_from_shell_releases_site() {
        let f = fixture(BandOptions::default());
        f.adapter.set_site(Some(f.site("a", 0x20)));
        assert_eq!(f.adapter.close(), Status::Ok);
        assert_eq!(f.entries(), vec!["parent 0x10 -> 0x20", "a released"]);
        assert_eq!(f.closed.get(), 1);

        // a site handed over after closing is dropped straight away
        f.adapter.set_site(Some(f.site("late", 0x40)));
        assert_eq!(f.entries().last().map(String::as_str), Some("late released"));
        assert_eq!(f.adapter.state(), LifecycleState::Closed);
    }

    #[test]
    fn detach_without_site_still_closes() {
        let f = fixture(BandOptions::default());
        f.adapter.set_site(None);
        assert_eq!(f.closed.get(), 1);
        assert!(f.entries().is_empty());
    }

    #[test]
    fn site_without_window_is_kept_for_release() {
        let f = fixture(BandOptions::default());
        let mut site = f.site("a", 0);
        site.hwnd = None;
        f.adapter.set_site(Some(site));
        assert!(f.entries().is_empty());
        assert_eq!(f.adapter.state(), LifecycleState::Attached);
        drop(f.adapter);
        assert_eq!(*f.journal.borrow(), vec!["a released"]);
    }

    #[test]
    fn option_changes_notify_only_when_sited() {
        let f = fixture(BandOptions::default());
        f.options.update(|o| o.title = "unsited".into());
        assert!(f.entries().is_empty());

        f.adapter.set_site(Some(f.site("a", 0x20)));
        let mut info = BandInfo::request(BandInfoMask::all());
        f.adapter.get_band_info(7, ViewMode::NORMAL, &mut info);
        f.options.update(|o| o.title = "sited".into());
        assert_eq!(
            f.entries(),
            vec!["parent 0x10 -> 0x20", "a info changed 7"]
        );
    }

    #[test]
    fn close_during_notification_releases_after_exec_returns() {
        let f = fixture(BandOptions::default());
        let mut site = f.site("a", 0x20);
        let adapter = Rc::downgrade(&f.adapter);
        let journal = Rc::clone(&f.journal);
        site.on_notify = Some(Box::new(move || {
            if let Some(adapter) = adapter.upgrade() {
                assert_eq!(adapter.close(), Status::Ok);
            }
            journal.borrow_mut().push("exec returned".into());
        }));
        f.adapter.set_site(Some(site));
        f.options.update(|o| o.title = "x".into());
        assert_eq!(
            f.entries(),
            vec![
                "parent 0x10 -> 0x20",
                "a info changed 0",
                "exec returned",
                "a released"
            ]
        );
        assert_eq!(f.adapter.state(), LifecycleState::Closed);
        assert_eq!(f.closed.get(), 1);
        assert!(f.adapter.site().is_none());
    }

    #[test]
    fn site_replaced_during_notification() {
        let f = fixture(BandOptions::default());
        let mut site = f.site("a", 0x20);
        let adapter = Rc::downgrade(&f.adapter);
        let journal = Rc::clone(&f.journal);
        site.on_notify = Some(Box::new(move || {
            if let Some(adapter) = adapter.upgrade() {
                adapter.set_site(Some(MockSite::new("b", 0x30, &journal)));
            }
        }));
        f.adapter.set_site(Some(site));
        f.options.update(|o| o.fixed = true);
        assert_eq!(
            f.entries(),
            vec![
                "parent 0x10 -> 0x20",
                "a info changed 0",
                "parent 0x10 -> 0x30",
                "a released"
            ]
        );
        assert_eq!(f.adapter.site().map(|s| s.name), Some("b"));
        assert_eq!(f.adapter.state(), LifecycleState::Attached);
    }

    #[test]
    fn dropped_adapter_stops_listening() {
        let f = fixture(BandOptions::default());
        let options = Rc::clone(&f.options);
        drop(f);
        options.update(|o| o.fixed = true);
    }

    #[test]
    fn band_info_reflects_options_and_refreshes_taskbar() {
        let f = fixture(BandOptions {
            min_size: SizePair::new(Size::new(5, 10), Size::new(5, 10)),
            title: "Clock".into(),
            size_increment: 4,
            fixed: true,
            ..Default::default()
        });
        let mut info = BandInfo::request(
            [
                BandInfoField::MinSize,
                BandInfoField::Integral,
                BandInfoField::Title,
                BandInfoField::ModeFlags,
            ]
            .into_iter()
            .collect(),
        );
        assert_eq!(
            f.adapter.get_band_info(3, ViewMode::VERTICAL, &mut info),
            Status::Ok
        );
        assert_eq!(info.min_size, Point::new(10, 5));
        assert_eq!(info.integral, Point::new(0, 4));
        assert_eq!(info.title, "Clock");
        assert_eq!(info.mode_flags, ModeFlags::FIXED | ModeFlags::NO_GRIPPER);
        assert_eq!(f.adapter.band_id(), 3);
        assert_eq!(f.probes.get(), 1);
        assert_eq!(f.adapter.taskbar().orientation(), TaskbarOrientation::Vertical);
    }

    #[test]
    fn taskbar_refreshes_even_for_empty_mask() {
        let f = fixture(BandOptions::default());
        let mut info = BandInfo::default();
        f.adapter.get_band_info(1, ViewMode::NORMAL, &mut info);
        f.adapter.get_band_info(1, ViewMode::NORMAL, &mut info);
        assert_eq!(f.probes.get(), 2);
        assert_eq!(info, BandInfo::default());
    }

    #[test]
    fn show_fires_visibility_without_state_change() {
        let f = fixture(BandOptions::default());
        f.adapter.show(true);
        f.adapter.show(false);
        assert_eq!(*f.visibility.borrow(), vec![true, false]);
        assert_eq!(f.adapter.state(), LifecycleState::Unattached);
    }

    #[test]
    fn fixed_answers() {
        let f = fixture(BandOptions::default());
        assert_eq!(f.adapter.window(), WindowHandle(0x10));
        for enter in [true, false] {
            assert_eq!(f.adapter.context_sensitive_help(enter), Status::NotImplemented);
        }
        assert_eq!(f.adapter.resize_border(), Status::NotImplemented);
        assert_eq!(Status::NotImplemented.hresult(), 0x8000_4001_u32 as i32);
        assert!(f.adapter.can_render_composited());
        for enabled in [false, true] {
            assert_eq!(f.adapter.set_composition_state(enabled), Status::Ok);
            assert!(f.adapter.composition_state());
        }
    }
}
