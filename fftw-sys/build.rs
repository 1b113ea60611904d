use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=wrapper.h");

    // Install prefix of the FFTW build, exported by fft3d-fftw-src
    let root = PathBuf::from(env::var("DEP_FFTW3_ROOT").unwrap());

    let out_path = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Only the batched complex planner, new-array execution and plan destruction are bound
    let bindings = bindgen::Builder::default()
        .header("wrapper.h")
        .clang_arg(format!("-I{}", root.join("include").display()))
        .allowlist_type("^fftwf?_plan.*")
        .allowlist_var("^FFTW_.*")
        .allowlist_function("^fftwf?_plan_many_dft$")
        .allowlist_function("^fftwf?_execute_dft$")
        .allowlist_function("^fftwf?_destroy_plan$")
        .blocklist_type("FILE")
        .blocklist_type("fftw.*_complex")
        .default_enum_style(bindgen::EnumVariation::Rust {
            non_exhaustive: true,
        })
        .generate()
        .expect("Unable to generate FFTW bindings");

    bindings
        .write_to_file(out_path.join("bindings.rs"))
        .expect("Couldn't write FFTW bindings");
}
