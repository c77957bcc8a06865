use std::{env, fs, path::PathBuf};

fn main() {
    let target = env::var("TARGET").unwrap();
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // 1) Pico 1 (thumbv6m): copy memory.x to OUT_DIR for the linker
    if target.starts_with("thumbv6m") {
        let memory_x = fs::read_to_string("memory.x").expect("Failed to read memory.x");
        fs::write(out_dir.join("memory.x"), memory_x).expect("Failed to write memory.x");
        println!("cargo:rustc-link-search={}", out_dir.display());
        println!("cargo:rustc-link-arg-bins=--nmagic");
        println!("cargo:rustc-link-arg-bins=-Tlink.x");
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
        println!("cargo:rerun-if-changed=memory.x");
    }

    // 2) Embed the power schedule; a missing file means no schedule
    let ini_path = env_or_default("WALLCLOCK_INI", "wallclock.ini");
    let ini = fs::read_to_string(&ini_path).unwrap_or_else(|_| {
        println!("cargo:warning=Settings file {ini_path} not found; embedding an empty schedule");
        String::new()
    });
    fs::write(out_dir.join("wallclock.ini"), ini).expect("Failed to write wallclock.ini");

    println!("cargo:rerun-if-env-changed=WALLCLOCK_INI");
    println!("cargo:rerun-if-changed={ini_path}");
}

fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
