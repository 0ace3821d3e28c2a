use std::env;
use std::path::PathBuf;

fn sdk_bin_folder() -> &'static str {
    match env::var("CARGO_CFG_TARGET_OS").as_deref() {
        Ok("windows") => "binWin64",
        Ok("macos") => "binMacOS",
        _ => "binUbuntu20",
    }
}

fn main() {
    println!("cargo::rerun-if-env-changed=RPR_SDK_DIR");

    // Declarations only are compiled without the SDK; linking happens once the
    // SDK location is known.
    let Ok(sdk_dir) = env::var("RPR_SDK_DIR") else {
        println!("cargo::warning=RPR_SDK_DIR not set, RadeonProRender libraries will not be linked");
        return;
    };

    let sdk_dir = PathBuf::from(sdk_dir);
    let lib_dir = sdk_dir.join("RadeonProRender").join(sdk_bin_folder());

    // pass lib folder which is being linked against to dependencies
    println!("cargo::metadata=lib={}", lib_dir.display());

    // Tell cargo to tell rustc to link the core library and the rprs loader
    println!("cargo::rustc-link-search=native={}", lib_dir.display());
    println!("cargo::rustc-link-lib=RadeonProRender64");
    println!("cargo::rustc-link-lib=RprLoadStore64");
}
