use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

use crate::options::{BandOptions, Orientation, Size};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BandInfoField {
    MinSize,
    MaxSize,
    Integral,
    Actual,
    Title,
    ModeFlags,
    BackgroundColor,
}

impl BandInfoField {
    pub const ALL: [BandInfoField; 7] = [
        BandInfoField::MinSize,
        BandInfoField::MaxSize,
        BandInfoField::Integral,
        BandInfoField::Actual,
        BandInfoField::Title,
        BandInfoField::ModeFlags,
        BandInfoField::BackgroundColor,
    ];

    pub const fn bit(self) -> u32 {
        match self {
            BandInfoField::MinSize => 0x0001,
            BandInfoField::MaxSize => 0x0002,
            BandInfoField::Integral => 0x0004,
            BandInfoField::Actual => 0x0008,
            BandInfoField::Title => 0x0010,
            BandInfoField::ModeFlags => 0x0020,
            BandInfoField::BackgroundColor => 0x0040,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BandInfoMask(u32);

impl BandInfoMask {
    pub const fn empty() -> Self {
        BandInfoMask(0)
    }

    pub fn all() -> Self {
        BandInfoField::ALL.iter().copied().collect()
    }

    /// Unknown bits are kept so they round-trip back to the caller.
    pub const fn from_bits(bits: u32) -> Self {
        BandInfoMask(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, field: BandInfoField) -> bool {
        has_flag!(self.0, field.bit())
    }

    pub fn with(self, field: BandInfoField) -> Self {
        BandInfoMask(self.0 | field.bit())
    }

    pub fn fields(self) -> impl Iterator<Item = BandInfoField> {
        BandInfoField::ALL
            .into_iter()
            .filter(move |f| self.contains(*f))
    }
}

impl FromIterator<BandInfoField> for BandInfoMask {
    fn from_iter<I: IntoIterator<Item = BandInfoField>>(iter: I) -> Self {
        iter.into_iter()
            .fold(BandInfoMask::empty(), |mask, field| mask.with(field))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewMode(u32);

impl ViewMode {
    pub const NORMAL: ViewMode = ViewMode(0x0000);
    pub const VERTICAL: ViewMode = ViewMode(0x0001);
    pub const FLOATING: ViewMode = ViewMode(0x0002);
    pub const TRANSPARENT: ViewMode = ViewMode(0x0004);

    pub const fn from_bits(bits: u32) -> Self {
        ViewMode(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn orientation(self) -> Orientation {
        if has_flag!(self.0, ViewMode::VERTICAL.0) {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        }
    }
}

impl BitOr for ViewMode {
    type Output = ViewMode;
    fn bitor(self, rhs: ViewMode) -> ViewMode {
        ViewMode(self.0 | rhs.0)
    }
}

impl From<Orientation> for ViewMode {
    fn from(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Horizontal => ViewMode::NORMAL,
            Orientation::Vertical => ViewMode::VERTICAL,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ModeFlags(u32);

impl ModeFlags {
    pub const NORMAL: ModeFlags = ModeFlags(0x0000);
    pub const FIXED: ModeFlags = ModeFlags(0x0001);
    pub const FIXEDBMP: ModeFlags = ModeFlags(0x0004);
    pub const VARIABLE_HEIGHT: ModeFlags = ModeFlags(0x0008);
    pub const UNDELETEABLE: ModeFlags = ModeFlags(0x0010);
    pub const DEBOSSED: ModeFlags = ModeFlags(0x0020);
    pub const BKCOLOR: ModeFlags = ModeFlags(0x0040);
    pub const USE_CHEVRON: ModeFlags = ModeFlags(0x0080);
    pub const BREAK: ModeFlags = ModeFlags(0x0100);
    pub const ADD_TO_FRONT: ModeFlags = ModeFlags(0x0200);
    pub const TOP_ALIGN: ModeFlags = ModeFlags(0x0400);
    pub const NO_GRIPPER: ModeFlags = ModeFlags(0x0800);
    pub const ALWAYS_GRIPPER: ModeFlags = ModeFlags(0x1000);
    pub const NO_MARGINS: ModeFlags = ModeFlags(0x2000);

    pub const fn from_bits(bits: u32) -> Self {
        ModeFlags(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: ModeFlags) -> bool {
        has_flag!(self.0, other.0)
    }

    /// Builds the mode flags for a set of options. A background color is
    /// never requested, whatever else is set.
    pub fn from_options(options: &BandOptions) -> Self {
        let table = [
            (options.always_show_gripper, ModeFlags::ALWAYS_GRIPPER),
            (options.fixed, ModeFlags::FIXED | ModeFlags::NO_GRIPPER),
            (options.no_margins, ModeFlags::NO_MARGINS),
            (options.sunken, ModeFlags::DEBOSSED),
            (options.undeletable, ModeFlags::UNDELETEABLE),
            (options.variable_height, ModeFlags::VARIABLE_HEIGHT),
            (options.add_to_front, ModeFlags::ADD_TO_FRONT),
            (options.new_row, ModeFlags::BREAK),
            (options.top_align, ModeFlags::TOP_ALIGN),
        ];
        let flags = table
            .iter()
            .filter(|(enabled, _)| *enabled)
            .fold(ModeFlags::NORMAL, |acc, (_, flag)| acc | *flag);
        flags & !ModeFlags::BKCOLOR
    }
}

impl BitOr for ModeFlags {
    type Output = ModeFlags;
    fn bitor(self, rhs: ModeFlags) -> ModeFlags {
        ModeFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ModeFlags {
    fn bitor_assign(&mut self, rhs: ModeFlags) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ModeFlags {
    type Output = ModeFlags;
    fn bitand(self, rhs: ModeFlags) -> ModeFlags {
        ModeFlags(self.0 & rhs.0)
    }
}

impl Not for ModeFlags {
    type Output = ModeFlags;
    fn not(self) -> ModeFlags {
        ModeFlags(!self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    /// Vertical bands grow along y, so the width the application thinks in
    /// becomes y.
    pub fn from_size(size: Size, orientation: Orientation) -> Self {
        match orientation {
            Orientation::Horizontal => Point::new(size.width, size.height),
            Orientation::Vertical => Point::new(size.height, size.width),
        }
    }
}

/// Response record for one band information query. Fields that were not
/// requested keep whatever the caller put there.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BandInfo {
    pub mask: BandInfoMask,
    pub min_size: Point,
    pub max_size: Point,
    pub integral: Point,
    pub actual: Point,
    pub title: String,
    pub mode_flags: ModeFlags,
    pub background: u32,
}

impl BandInfo {
    pub fn request(mask: BandInfoMask) -> Self {
        BandInfo {
            mask,
            ..Default::default()
        }
    }

    pub fn fill(&mut self, options: &BandOptions, view_mode: ViewMode) {
        let orientation = view_mode.orientation();
        for field in self.mask.fields() {
            match field {
                BandInfoField::MinSize => {
                    self.min_size =
                        Point::from_size(options.min_size.for_orientation(orientation), orientation)
                }
                BandInfoField::MaxSize => {
                    self.max_size =
                        Point::from_size(options.max_size.for_orientation(orientation), orientation)
                }
                // No horizontal increments
                BandInfoField::Integral => self.integral = Point::new(0, options.size_increment),
                BandInfoField::Actual => {
                    self.actual = Point::from_size(
                        options.actual_size.for_orientation(orientation),
                        orientation,
                    )
                }
                BandInfoField::Title => {
                    self.title = if options.show_title {
                        options.title.clone()
                    } else {
                        String::new()
                    }
                }
                BandInfoField::ModeFlags => self.mode_flags = ModeFlags::from_options(options),
                BandInfoField::BackgroundColor => {}
            }
        }
    }
}
