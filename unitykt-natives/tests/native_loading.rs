//! Integration tests for the native library loading pipeline.
//!
//! These tests run the full resolve → extract → load → cleanup flow:
//! - A real host shared library packaged as the decoder (Linux)
//! - A corrupt artifact that the host loader rejects
//! - Concurrent loads against a cold staging directory
//!
//! Run with: `cargo test --test native_loading`

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Barrier};
use std::thread;

use tempfile::TempDir;

use unitykt_natives::{
    CleanupPolicy, EmbeddedResources, LoaderConfig, NativeError, NativeLoader, Os, PlatformTag,
};

// ============================================================================
// Helper Functions
// ============================================================================

const CORRUPT_LIBRARY: &[u8] = b"\x7fELF but not really a shared object";

/// Loader over `resources` for a fixed platform, staging under `temp`.
fn make_loader(
    temp: &TempDir,
    platform: PlatformTag,
    resources: EmbeddedResources,
) -> NativeLoader {
    let config = LoaderConfig::new()
        .with_temp_root(temp.path())
        .with_platform(platform)
        .with_cleanup(CleanupPolicy::DeleteImmediately);
    NativeLoader::with_config(config, resources).unwrap()
}

fn linux_x86_64() -> PlatformTag {
    PlatformTag::new(Os::Linux, "x86_64")
}

fn staged_files(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

/// A shared library every glibc system has, used as a stand-in artifact.
#[cfg(target_os = "linux")]
fn host_libm() -> Option<Vec<u8>> {
    const CANDIDATES: &[&str] = &[
        "/lib/x86_64-linux-gnu/libm.so.6",
        "/usr/lib/x86_64-linux-gnu/libm.so.6",
        "/lib/aarch64-linux-gnu/libm.so.6",
        "/usr/lib/aarch64-linux-gnu/libm.so.6",
        "/lib64/libm.so.6",
        "/usr/lib64/libm.so.6",
        "/usr/lib/libm.so.6",
        "/lib/libm.so.6",
    ];
    CANDIDATES.iter().find_map(|path| fs::read(path).ok())
}

// ============================================================================
// Integration Tests
// ============================================================================

/// A platform with nothing packaged reports the exact path it looked for.
#[test]
fn test_missing_artifact_reports_resource_path() {
    let temp = TempDir::new().unwrap();
    let loader = make_loader(&temp, linux_x86_64(), EmbeddedResources::new());

    match loader.load_library_from_jar("texturedecoder") {
        Err(NativeError::LibraryResourceMissing { path, platform }) => {
            assert_eq!(path, "/natives/linux-x86_64/libtexturedecoder.so");
            assert_eq!(platform, linux_x86_64());
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("loaded a library that was never packaged"),
    }
}

/// A corrupt artifact fails to load and leaves nothing in the staging area.
#[test]
fn test_corrupt_artifact_fails_and_is_cleaned() {
    let temp = TempDir::new().unwrap();
    let resources = EmbeddedResources::new()
        .with_resource("/natives/linux-x86_64/libtexturedecoder.so", CORRUPT_LIBRARY);
    let loader = make_loader(&temp, linux_x86_64(), resources);

    let err = loader.load_library_from_jar("texturedecoder").unwrap_err();
    assert!(matches!(err, NativeError::LibraryLoadFailed { .. }), "{}", err);
    assert!(staged_files(loader.staging().path()).is_empty());
}

/// Concurrent loads share one staging directory and never share a file.
#[test]
fn test_concurrent_loads_initialize_staging_once() {
    const LOADS: usize = 8;

    let temp = TempDir::new().unwrap();
    let resources = EmbeddedResources::new()
        .with_resource("/natives/linux-x86_64/libtexturedecoder.so", CORRUPT_LIBRARY);
    let loader = Arc::new(make_loader(&temp, linux_x86_64(), resources));
    let barrier = Arc::new(Barrier::new(LOADS));

    let handles: Vec<_> = (0..LOADS)
        .map(|_| {
            let loader = Arc::clone(&loader);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                loader.extract("texturedecoder").unwrap().path().to_path_buf()
            })
        })
        .collect();

    let mut paths: Vec<PathBuf> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    paths.sort();
    paths.dedup();

    assert_eq!(paths.len(), LOADS, "extracted file names collided");
    assert_eq!(loader.staging().initializations(), 1);
    for path in &paths {
        assert_eq!(fs::read(path).unwrap(), CORRUPT_LIBRARY);
    }
}

/// End to end with a real shared object: resolve, extract, load, delete.
#[cfg(target_os = "linux")]
#[test]
fn test_real_library_loads_and_is_deleted() {
    let Some(libm) = host_libm() else {
        eprintln!("skipping: no libm.so.6 found on this host");
        return;
    };

    let temp = TempDir::new().unwrap();
    let platform = PlatformTag::detect().unwrap();
    let mut resources = EmbeddedResources::new();
    resources.insert(
        format!("/natives/{}/libtexturedecoder.so", platform),
        libm,
    );
    let loader = make_loader(&temp, platform, resources);

    let library = loader.load_library_from_jar("texturedecoder").unwrap();

    let staged = library.path();
    let name = staged.file_name().unwrap().to_str().unwrap();
    assert_eq!(staged.parent().unwrap(), temp.path().join("UnityKt_Deficuet"));
    assert!(name.starts_with("texturedecoder_") && name.ends_with(".so"), "{}", name);

    // Deleted before the call returned, yet the code stays mapped.
    assert!(!staged.exists());
    assert!(staged_files(loader.staging().path()).is_empty());
    assert!(library.has_symbol("cos"));
    assert!(!library.has_symbol("definitely_not_exported_anywhere"));
}

/// Each load re-extracts; nothing is cached between calls.
#[cfg(target_os = "linux")]
#[test]
fn test_repeated_loads_use_fresh_files() {
    let Some(libm) = host_libm() else {
        eprintln!("skipping: no libm.so.6 found on this host");
        return;
    };

    let temp = TempDir::new().unwrap();
    let platform = PlatformTag::detect().unwrap();
    let mut resources = EmbeddedResources::new();
    resources.insert(format!("/natives/{}/libfoo.so", platform), libm);
    let loader = make_loader(&temp, platform, resources);

    let first = loader.load_library_from_jar("foo").unwrap();
    let second = loader.load_library_from_jar("foo").unwrap();
    assert_ne!(first.path(), second.path());
}

/// Decoding a DXT1 block with the real packaged decoder.
///
/// Needs the built artifact under `natives/` in this crate.
#[test]
#[ignore = "requires the packaged texture decoder artifact"]
fn test_decoder_smoke_dxt1() {
    use unitykt_natives::{DirectoryResources, TextureDecoder};

    let resources = DirectoryResources::new(env!("CARGO_MANIFEST_DIR"));
    let loader = NativeLoader::new(resources).unwrap();
    let decoder = TextureDecoder::load_packaged(&loader).unwrap();
    assert!(decoder.missing_entry_points().is_empty());

    // Color 0 = red (RGB565 0xF800), color 1 = blue, all indices 0.
    let mut block = [0u8; 16];
    block[1] = 0xF8;
    block[2] = 0x1F;
    let mut out = [0u8; 64];

    decoder.decode_dxt1(&block, 4, 4, &mut out).unwrap();
    assert!(out.iter().any(|&b| b != 0));
}
