use log::info;
use serde::{Deserialize, Serialize};
use std::{fs::File, io::Read, path::Path};

use crate::{
    options::{BandOptions, SizePair},
    Result,
};

pub const DEFAULT_CONFIG: &str = "default.yaml";
pub const USER_TEMPLATE: &str = "user.yaml";
pub const USER_CONFIG: &str = "config.yaml";

/// Band options as read from YAML. Unset keys leave the current value alone.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub min_size: Option<SizePair>,
    pub max_size: Option<SizePair>,
    pub actual_size: Option<SizePair>,
    pub title: Option<String>,
    pub show_title: Option<bool>,
    pub size_increment: Option<i32>,
    pub fixed: Option<bool>,
    pub always_show_gripper: Option<bool>,
    pub no_margins: Option<bool>,
    pub sunken: Option<bool>,
    pub undeletable: Option<bool>,
    pub variable_height: Option<bool>,
    pub add_to_front: Option<bool>,
    pub new_row: Option<bool>,
    pub top_align: Option<bool>,
}

impl std::ops::Add for Config {
    type Output = Config;
    fn add(self, other: Config) -> Config {
        Config {
            min_size: other.min_size.or(self.min_size),
            max_size: other.max_size.or(self.max_size),
            actual_size: other.actual_size.or(self.actual_size),
            title: other.title.or(self.title),
            show_title: other.show_title.or(self.show_title),
            size_increment: other.size_increment.or(self.size_increment),
            fixed: other.fixed.or(self.fixed),
            always_show_gripper: other.always_show_gripper.or(self.always_show_gripper),
            no_margins: other.no_margins.or(self.no_margins),
            sunken: other.sunken.or(self.sunken),
            undeletable: other.undeletable.or(self.undeletable),
            variable_height: other.variable_height.or(self.variable_height),
            add_to_front: other.add_to_front.or(self.add_to_front),
            new_row: other.new_row.or(self.new_row),
            top_align: other.top_align.or(self.top_align),
        }
    }
}

impl Config {
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        let is_blank = text
            .lines()
            .map(str::trim)
            .all(|line| line.is_empty() || line.starts_with('#'));
        if is_blank {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(&text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        info!("Reading config file from {:?}", path);
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Reads `default.yaml` from `dir`, the directory the build copies it to.
    pub fn load_default(dir: &Path) -> Result<Self> {
        Self::from_path(&dir.join(DEFAULT_CONFIG))
    }

    /// Merges `%LOCALAPPDATA%\deskband\config.yaml` over `self`, seeding it
    /// from `user.yaml` in `template_dir` the first time.
    #[cfg(windows)]
    pub fn load_or_create_user_config(self, template_dir: &Path) -> Result<Self> {
        use std::fs::{copy, create_dir_all};

        let mut app_data_path = crate::win32::get_local_appdata_path()?;
        app_data_path.push(env!("CARGO_PKG_NAME"));
        if !app_data_path.exists() {
            create_dir_all(&app_data_path)?;
        }
        let user_config_path = app_data_path.join(USER_CONFIG);
        if !user_config_path.exists() {
            let template_path = template_dir.join(USER_TEMPLATE);
            info!("Creating {:?} from {:?}", user_config_path, template_path);
            copy(template_path, &user_config_path)?;
        }
        let user_config = Self::from_path(&user_config_path)?;
        Ok(self + user_config)
    }

    pub fn apply(&self, options: &mut BandOptions) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }
        set(&mut options.min_size, &self.min_size);
        set(&mut options.max_size, &self.max_size);
        set(&mut options.actual_size, &self.actual_size);
        set(&mut options.title, &self.title);
        set(&mut options.show_title, &self.show_title);
        set(&mut options.size_increment, &self.size_increment);
        set(&mut options.fixed, &self.fixed);
        set(&mut options.always_show_gripper, &self.always_show_gripper);
        set(&mut options.no_margins, &self.no_margins);
        set(&mut options.sunken, &self.sunken);
        set(&mut options.undeletable, &self.undeletable);
        set(&mut options.variable_height, &self.variable_height);
        set(&mut options.add_to_front, &self.add_to_front);
        set(&mut options.new_row, &self.new_row);
        set(&mut options.top_align, &self.top_align);
    }

    pub fn to_options(&self) -> BandOptions {
        let mut options = BandOptions::default();
        self.apply(&mut options);
        options
    }
}
