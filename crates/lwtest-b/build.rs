fn main() {
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os == "macos" {
        // lwtest_a records this name; @rpath resolves through its @loader_path entry.
        println!("cargo:rustc-cdylib-link-arg=-Wl,-install_name,@rpath/liblwtest_b.dylib");
    }
}
