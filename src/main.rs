use std::path::PathBuf;

use clap::{Parser, Subcommand};
use deskband::{logging, registration::Registration, Result};
use log::LevelFilter;

/// Registers a deskband class with the Shell so it shows up in the taskbar's
/// toolbar menu.
#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    #[command(subcommand)]
    action: Action,

    /// Log every registry operation
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Write the class and its deskband category under HKEY_CLASSES_ROOT
    Register {
        /// Class id of the deskband, e.g. {46B3E9A1-0B2E-4C43-9C4A-7B1F0C6D2E11}
        #[arg(long)]
        clsid: String,
        /// Name shown in the taskbar's toolbar menu
        #[arg(long)]
        name: String,
        /// DLL that exports `DllGetClassObject` for the class
        #[arg(long)]
        dll: PathBuf,
    },
    /// Remove the class again
    Unregister {
        #[arg(long)]
        clsid: String,
        #[arg(long, default_value = "deskband")]
        name: String,
    },
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    logging::init_console(if opts.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });
    match opts.action {
        Action::Register { clsid, name, dll } => {
            let dll = std::env::current_dir()?.join(dll);
            Registration::new(&clsid, &name)?.register(&dll)
        }
        Action::Unregister { clsid, name } => Registration::new(&clsid, &name)?.unregister(),
    }
}
