use std::path::Path;

use log::{error, info};
use uuid::Uuid;

use crate::Result;

/// `CATID_DeskBand`
pub const CATID_DESKBAND: Uuid = Uuid::from_u128(0x00021492_0000_0000_C000_000000000046);

pub const THREADING_MODEL: &str = "Apartment";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    clsid: Uuid,
    name: String,
}

fn registry_guid(guid: &Uuid) -> String {
    format!("{:X}", guid.braced())
}

impl Registration {
    /// `clsid` is accepted with or without braces, in any case.
    pub fn new(clsid: &str, name: &str) -> Result<Self> {
        let clsid =
            Uuid::parse_str(clsid.trim()).map_err(|e| format!("Invalid CLSID {clsid}: {e}"))?;
        Ok(Registration {
            clsid,
            name: name.to_string(),
        })
    }

    pub fn clsid(&self) -> String {
        registry_guid(&self.clsid)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class_key(&self) -> String {
        format!("CLSID\\{}", self.clsid())
    }

    pub fn server_key(&self) -> String {
        format!("{}\\InprocServer32", self.class_key())
    }

    pub fn category_key(&self) -> String {
        format!(
            "{}\\Implemented Categories\\{}",
            self.class_key(),
            registry_guid(&CATID_DESKBAND)
        )
    }

    /// `server` is the DLL the Shell loads the band from.
    #[cfg(windows)]
    pub fn register(&self, server: &Path) -> Result<()> {
        use crate::win32::registry;

        let res = server_path(server).and_then(|server| {
            registry::set_default_value(&self.class_key(), &self.name)?;
            registry::set_default_value(&self.server_key(), &server)?;
            registry::set_value(&self.server_key(), "ThreadingModel", THREADING_MODEL)?;
            registry::create_key(&self.category_key())
        });
        self.report("register", res)
    }

    #[cfg(windows)]
    pub fn unregister(&self) -> Result<()> {
        let res = crate::win32::registry::delete_tree("CLSID", &self.clsid());
        self.report("unregister", res)
    }

    #[cfg(not(windows))]
    pub fn register(&self, server: &Path) -> Result<()> {
        let res = server_path(server)
            .and_then(|_| Err("Deskbands can only be registered on Windows".into()));
        self.report("register", res)
    }

    #[cfg(not(windows))]
    pub fn unregister(&self) -> Result<()> {
        self.report("unregister", Err("Deskbands can only be unregistered on Windows".into()))
    }

    fn report(&self, action: &str, res: Result<()>) -> Result<()> {
        match &res {
            Ok(_) => {
                info!("Successfully {action}ed deskband {} - GUID: {}", self.name, self.clsid());
                println!("Successfully {action}ed deskband {} - GUID: {}", self.name, self.clsid());
            }
            Err(e) => {
                error!("Failed to {action} deskband {} - {e}", self.name);
                eprintln!("Failed to {action} deskband {} - {e}", self.name);
            }
        }
        res
    }
}

fn server_path(server: &Path) -> Result<String> {
    if !server.is_absolute() {
        return Err(format!("Server path {} is not absolute", server.display()).into());
    }
    server
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| format!("Server path {} is not valid unicode", server.display()).into())
}
