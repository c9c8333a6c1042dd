use std::mem::{size_of, zeroed};

use log::debug;
use windows::Win32::UI::Shell::{SHAppBarMessage, ABM_GETTASKBARPOS, APPBARDATA};

use crate::{
    options::Size,
    taskbar::{TaskbarEdge, TaskbarState},
};

pub fn get_taskbar_state() -> Option<TaskbarState> {
    let mut appbar: APPBARDATA = unsafe { zeroed() };
    appbar.cbSize = size_of::<APPBARDATA>() as u32;
    let res = unsafe { SHAppBarMessage(ABM_GETTASKBARPOS, &mut appbar) };
    if res == 0 {
        debug!("ABM_GETTASKBARPOS failed");
        return None;
    }
    let edge = TaskbarEdge::from_abe(appbar.uEdge)?;
    let rc = appbar.rc;
    Some(TaskbarState::new(
        edge,
        Size::new(rc.right - rc.left, rc.bottom - rc.top),
    ))
}
