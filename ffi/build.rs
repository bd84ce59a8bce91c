use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    let Ok(crate_dir) = std::env::var("CARGO_MANIFEST_DIR") else {
        return;
    };
    let out = PathBuf::from(&crate_dir).join("include");
    if let Err(e) = std::fs::create_dir_all(&out) {
        println!("cargo:warning=cannot create {}: {e}", out.display());
        return;
    }

    // Settings come from cbindgen.toml next to Cargo.toml.
    match cbindgen::generate(&crate_dir) {
        Ok(bindings) => {
            bindings.write_to_file(out.join("hycom.h"));
        }
        Err(e) => println!("cargo:warning=cbindgen failed: {e}"),
    }
}
