use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=LWTEST_VARIANT");
    println!("cargo:rerun-if-env-changed=LWTEST_B_LIB_DIR");

    let raw = env::var("LWTEST_VARIANT").unwrap_or_default();
    let variant = lwtest_core::parse_variant(&raw)
        .unwrap_or_else(|err| panic!("LWTEST_VARIANT must be an integer, got {raw:?}: {err}"));
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    std::fs::write(
        out_dir.join("variant.rs"),
        format!("pub const LWTEST_VARIANT: i64 = {variant};\n"),
    )
    .unwrap();

    // OUT_DIR is <target>/<profile>/build/lwtest-a-<hash>/out.
    let lib_dir = match env::var_os("LWTEST_B_LIB_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => out_dir.ancestors().nth(3).unwrap().to_path_buf(),
    };
    println!("cargo:rustc-link-search=native={}", lib_dir.join("deps").display());
    println!("cargo:rustc-link-search=native={}", lib_dir.display());

    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    match target_os.as_str() {
        // Rust names the import library of a cdylib `lwtest_b.dll.lib` (`liblwtest_b.dll.a` on gnu).
        "windows" => println!("cargo:rustc-link-lib=dylib=lwtest_b.dll"),
        "macos" | "ios" => {
            println!("cargo:rustc-link-lib=dylib=lwtest_b");
            println!("cargo:rustc-cdylib-link-arg=-Wl,-rpath,@loader_path");
        }
        _ => {
            println!("cargo:rustc-link-lib=dylib=lwtest_b");
            println!("cargo:rustc-cdylib-link-arg=-Wl,-rpath,$ORIGIN");
        }
    }
}
