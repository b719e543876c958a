fn main() {
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    match target_os.as_str() {
        // Windows already searches the application directory for bare names.
        "windows" => {}
        "macos" | "ios" => println!("cargo:rustc-link-arg-bins=-Wl,-rpath,@executable_path"),
        _ => println!("cargo:rustc-link-arg-bins=-Wl,-rpath,$ORIGIN"),
    }
}
