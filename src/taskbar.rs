use std::cell::Cell;

use log::debug;

use crate::events::Event;
use crate::options::Size;

pub use crate::options::Orientation as TaskbarOrientation;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TaskbarEdge {
    Left,
    Top,
    Right,
    #[default]
    Bottom,
}

impl TaskbarEdge {
    pub fn from_abe(edge: u32) -> Option<Self> {
        match edge {
            0 => Some(TaskbarEdge::Left),
            1 => Some(TaskbarEdge::Top),
            2 => Some(TaskbarEdge::Right),
            3 => Some(TaskbarEdge::Bottom),
            _ => None,
        }
    }

    pub fn orientation(self) -> TaskbarOrientation {
        match self {
            TaskbarEdge::Left | TaskbarEdge::Right => TaskbarOrientation::Vertical,
            TaskbarEdge::Top | TaskbarEdge::Bottom => TaskbarOrientation::Horizontal,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskbarState {
    pub edge: TaskbarEdge,
    pub size: Size,
}

impl TaskbarState {
    pub fn new(edge: TaskbarEdge, size: Size) -> Self {
        TaskbarState { edge, size }
    }

    pub fn orientation(&self) -> TaskbarOrientation {
        self.edge.orientation()
    }
}

impl Default for TaskbarState {
    fn default() -> Self {
        TaskbarState::new(TaskbarEdge::Bottom, Size::default())
    }
}

/// Last known taskbar placement, refreshed every time the Shell asks for
/// band info.
#[derive(Debug, Default)]
pub struct TaskbarInfo {
    state: Cell<TaskbarState>,
    pub orientation_changed: Event<TaskbarOrientation>,
    pub edge_changed: Event<TaskbarEdge>,
    pub size_changed: Event<Size>,
}

impl TaskbarInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TaskbarState {
        self.state.get()
    }

    pub fn orientation(&self) -> TaskbarOrientation {
        self.state.get().orientation()
    }

    pub fn edge(&self) -> TaskbarEdge {
        self.state.get().edge
    }

    pub fn size(&self) -> Size {
        self.state.get().size
    }

    /// Stores a freshly probed state. `None` means the probe failed and the
    /// cached state is kept.
    pub fn refresh(&self, probed: Option<TaskbarState>) {
        let Some(new) = probed else {
            debug!("Taskbar position unavailable, keeping {:?}", self.state.get());
            return;
        };
        let old = self.state.replace(new);
        if old == new {
            return;
        }
        debug!("Taskbar moved from {old:?} to {new:?}");
        if old.orientation() != new.orientation() {
            self.orientation_changed.emit(&new.orientation());
        }
        if old.edge != new.edge {
            self.edge_changed.emit(&new.edge);
        }
        if old.size != new.size {
            self.size_changed.emit(&new.size);
        }
    }
}
