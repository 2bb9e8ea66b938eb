// Build script for Vulkan shader compilation
//
// Compiles the GLSL sources in resources/shaders/ to SPIR-V under
// target/shaders/ so the binary can load them at startup.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Locate glslc: PATH first, then the Vulkan SDK
fn find_glslc() -> Option<PathBuf> {
    let candidate = if cfg!(target_os = "windows") {
        "glslc.exe"
    } else {
        "glslc"
    };

    if Command::new(candidate)
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
    {
        return Some(PathBuf::from(candidate));
    }

    let sdk = env::var("VULKAN_SDK").ok()?;
    let guess = if cfg!(target_os = "windows") {
        Path::new(&sdk).join("Bin").join("glslc.exe")
    } else {
        Path::new(&sdk).join("bin").join("glslc")
    };
    guess.exists().then_some(guess)
}

fn compile_shaders(shader_dir: &Path, out_dir: &Path, glslc: &Path) {
    let entries = match std::fs::read_dir(shader_dir) {
        Ok(entries) => entries,
        Err(_) => {
            eprintln!("info: no shader directory at {shader_dir:?}");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(ext) = path.extension() else {
            continue;
        };
        if ext != "vert" && ext != "frag" {
            continue;
        }

        // triangle.vert -> triangle.vert.spv
        let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
        let out_file = out_dir.join(format!("{file_name}.spv"));

        let status = Command::new(glslc)
            .arg(&path)
            .arg("-o")
            .arg(&out_file)
            .status();

        match status {
            Ok(s) if s.success() => {
                eprintln!("info: compiled {file_name} -> {out_file:?}");
            }
            Ok(s) => {
                eprintln!(
                    "error: glslc failed for {path:?} with exit code {}",
                    s.code().unwrap_or(-1)
                );
                panic!("Shader compilation failed");
            }
            Err(e) => {
                eprintln!("error: failed to run glslc for {path:?}: {e}");
                panic!("Failed to execute shader compiler");
            }
        }
    }
}

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let shader_dir = manifest_dir.join("../resources/shaders");

    println!("cargo:rerun-if-changed=../resources/shaders");
    println!("cargo:rerun-if-env-changed=VULKAN_SDK");

    if env::var("SKIP_SHADERS").is_ok() {
        eprintln!("info: skipping shader compilation (SKIP_SHADERS set)");
        return;
    }

    let Some(glslc) = find_glslc() else {
        eprintln!("warning: glslc not found (install the Vulkan SDK or set VULKAN_SDK)");
        eprintln!("warning: shader compilation skipped; the binary needs precompiled SPIR-V");
        return;
    };

    let out_dir = manifest_dir.join("../target/shaders");
    if let Err(e) = std::fs::create_dir_all(&out_dir) {
        eprintln!("warning: could not create {out_dir:?}: {e}");
        return;
    }

    compile_shaders(&shader_dir, &out_dir, &glslc);
}
