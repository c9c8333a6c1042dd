use std::{
    cell::{Ref, RefCell},
    rc::Rc,
};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::events::{Event, SubscriptionId};

pub const TASKBAR_HORIZONTAL_HEIGHT_LARGE: i32 = 40;
pub const TASKBAR_HORIZONTAL_HEIGHT_SMALL: i32 = 30;
pub const TASKBAR_VERTICAL_WIDTH: i32 = 62;
pub const NO_LIMIT: i32 = -1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Size { width, height }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SizePair {
    pub horizontal: Size,
    pub vertical: Size,
}

impl SizePair {
    pub const fn new(horizontal: Size, vertical: Size) -> Self {
        SizePair {
            horizontal,
            vertical,
        }
    }

    pub fn for_orientation(&self, orientation: Orientation) -> Size {
        match orientation {
            Orientation::Horizontal => self.horizontal,
            Orientation::Vertical => self.vertical,
        }
    }
}

/// What the band wants to look like. Nothing here is validated, keeping
/// `min_size <= actual_size <= max_size` is up to whoever fills it in.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BandOptions {
    pub min_size: SizePair,
    pub max_size: SizePair,
    pub actual_size: SizePair,
    pub title: String,
    pub show_title: bool,
    pub size_increment: i32,
    pub fixed: bool,
    pub always_show_gripper: bool,
    pub no_margins: bool,
    pub sunken: bool,
    pub undeletable: bool,
    pub variable_height: bool,
    pub add_to_front: bool,
    pub new_row: bool,
    pub top_align: bool,
}

impl Default for BandOptions {
    fn default() -> Self {
        BandOptions {
            min_size: SizePair::new(
                Size::new(100, TASKBAR_HORIZONTAL_HEIGHT_LARGE),
                Size::new(TASKBAR_VERTICAL_WIDTH, 100),
            ),
            max_size: SizePair::new(
                Size::new(NO_LIMIT, NO_LIMIT),
                Size::new(NO_LIMIT, NO_LIMIT),
            ),
            actual_size: SizePair::new(
                Size::new(200, TASKBAR_HORIZONTAL_HEIGHT_LARGE),
                Size::new(TASKBAR_VERTICAL_WIDTH, 200),
            ),
            title: String::new(),
            show_title: true,
            size_increment: 1,
            fixed: false,
            always_show_gripper: false,
            no_margins: false,
            sunken: false,
            undeletable: false,
            variable_height: false,
            add_to_front: false,
            new_row: false,
            top_align: false,
        }
    }
}

/// Every [`Options::update`] raises one `changed` signal, whatever field was
/// touched.
#[derive(Debug, Default)]
pub struct Options {
    value: RefCell<BandOptions>,
    changed: Event<()>,
}

impl Options {
    pub fn new(value: BandOptions) -> Rc<Self> {
        Rc::new(Options {
            value: RefCell::new(value),
            changed: Event::new(),
        })
    }

    pub fn get(&self) -> Ref<'_, BandOptions> {
        self.value.borrow()
    }

    pub fn snapshot(&self) -> BandOptions {
        self.value.borrow().clone()
    }

    pub fn update(&self, f: impl FnOnce(&mut BandOptions)) {
        f(&mut self.value.borrow_mut());
        debug!("Band options have changed");
        self.changed.emit(&());
    }

    pub fn replace(&self, value: BandOptions) {
        self.update(|options| *options = value);
    }

    pub fn subscribe(&self, listener: impl Fn() + 'static) -> SubscriptionId {
        self.changed.subscribe(move |_| listener())
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.changed.unsubscribe(id)
    }
}
