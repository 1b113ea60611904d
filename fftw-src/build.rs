use std::{
    env::var,
    fs::canonicalize,
    path::{Path, PathBuf},
    process::Command,
};

/// Bundled FFTW release, unpacked next to this manifest.
const FFTW_VERSION: &str = "fftw-3.3.10";

fn run(command: &mut Command) {
    println!("Running: {:?}", command);
    match command.status() {
        Ok(status) => {
            if !status.success() {
                panic!("`{:?}` failed: {}", command, status);
            }
        }
        Err(error) => {
            panic!("failed to execute `{:?}`: {}", command, error);
        }
    }
}

/// Configure, compile and install one precision of FFTW into `prefix`.
fn build_fftw(src_dir: &Path, prefix: &Path, flags: &[&str]) {
    run(Command::new(canonicalize(src_dir.join("configure")).unwrap())
        .arg("--with-pic")
        .arg("--enable-static")
        .arg("--disable-shared")
        .arg("--disable-doc")
        .arg("--disable-fortran")
        .arg(format!("--prefix={}", prefix.display()))
        .args(flags)
        .current_dir(src_dir));

    let jobs = var("NUM_JOBS").unwrap_or_else(|_| "1".to_string());
    run(Command::new("make")
        .arg(format!("-j{}", jobs))
        .current_dir(src_dir));

    run(Command::new("make").arg("install").current_dir(src_dir));

    // The next precision is configured from a clean tree
    run(Command::new("make").arg("distclean").current_dir(src_dir));
}

fn main() {
    println!("cargo:rerun-if-env-changed=FFTW3_SOURCE_DIR");
    println!("cargo:rerun-if-env-changed=FFTW3_PREFIX");

    // An existing installation (headers in include/, static libraries in lib/) short-circuits the build
    if let Ok(prefix) = var("FFTW3_PREFIX") {
        let prefix = PathBuf::from(prefix);
        println!("cargo:rustc-link-search={}", prefix.join("lib").display());
        println!("cargo:rustc-link-lib=static=fftw3");
        println!("cargo:rustc-link-lib=static=fftw3f");
        println!("cargo:root={}", prefix.display());
        return;
    }

    let out_dir = PathBuf::from(var("OUT_DIR").unwrap());
    let src_dir = match var("FFTW3_SOURCE_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => PathBuf::from(var("CARGO_MANIFEST_DIR").unwrap()).join(FFTW_VERSION),
    };

    if !src_dir.join("configure").exists() {
        panic!(
            "FFTW sources not found at {}, set FFTW3_SOURCE_DIR or FFTW3_PREFIX",
            src_dir.display()
        );
    }

    // Out of source build, the manifest directory stays untouched
    let build_dir = out_dir.join("build");
    fs_extra::dir::copy(
        &src_dir,
        &build_dir,
        &fs_extra::dir::CopyOptions {
            overwrite: true,
            skip_exist: false,
            buffer_size: 64000,
            copy_inside: true,
            depth: 0,
            content_only: true,
        },
    )
    .unwrap();

    if !out_dir.join("lib/libfftw3.a").exists() {
        build_fftw(&build_dir, &out_dir, &[]);
    }

    if !out_dir.join("lib/libfftw3f.a").exists() {
        build_fftw(&build_dir, &out_dir, &["--enable-single"]);
    }

    println!("cargo:rustc-link-search={}", out_dir.join("lib").display());
    println!("cargo:rustc-link-lib=static=fftw3");
    println!("cargo:rustc-link-lib=static=fftw3f");
    println!("cargo:root={}", out_dir.display());
}
