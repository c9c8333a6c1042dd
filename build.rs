use copy_to_output::copy_to_output;
use embed_manifest::{embed_manifest, manifest::ExecutionLevel, new_manifest};
use std::env;

fn main() {
    copy_to_output("default.yaml", &env::var("PROFILE").unwrap()).expect("Could not copy");
    copy_to_output("user.yaml", &env::var("PROFILE").unwrap()).expect("Could not copy");
    // Registering under HKEY_CLASSES_ROOT needs an elevated install tool
    if env::var_os("CARGO_CFG_WINDOWS").is_some() {
        embed_manifest(
            new_manifest("Deskband.Install")
                .requested_execution_level(ExecutionLevel::RequireAdministrator),
        )
        .expect("Could not embed manifest");
    }
    println!("cargo:rerun-if-changed=default.yaml");
    println!("cargo:rerun-if-changed=user.yaml");
}
