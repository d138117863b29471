//! Safe front end for the packaged texture decoder library.
//!
//! The decoding itself happens in native code. This module loads that
//! library, checks buffer sizes on the Rust side, and calls the C entry
//! points:
//!
//! ```text
//! decode_<format>(data, data_len, width, height, out, [extra]) -> i32
//! ```
//!
//! `extra` is the block size for ASTC, the 2bpp flag for PVRTC and the
//! Unity-crunch flag for crunched formats. A return of `1` means success.
//! Output is `width * height` 32-bit pixels.
//!
//! # Example
//!
//! ```ignore
//! use unitykt_natives::{DirectoryResources, NativeLoader, TextureDecoder};
//!
//! let loader = NativeLoader::new(DirectoryResources::beside_executable()?)?;
//! let decoder = TextureDecoder::load(&loader)?;
//!
//! let mut rgba = vec![0u8; 4 * 4 * 4];
//! decoder.decode_dxt1(&block, 4, 4, &mut rgba)?;
//! ```

mod error;
mod format;

pub use error::DecodeError;
pub use format::{TextureFormat, ASTC_BLOCK_SIZES, BYTES_PER_PIXEL};

use tracing::debug;

use crate::error::NativeResult;
use crate::loader::{NativeLibrary, NativeLoader};

/// Logical name of the decoder library.
pub const LIBRARY_NAME: &str = "texturedecoder";

/// Native return code for success.
pub const DECODE_SUCCESS: i32 = 1;

type DecodeFn = unsafe extern "C" fn(*const u8, usize, i32, i32, *mut u8) -> i32;
type DecodeAstcFn = unsafe extern "C" fn(*const u8, usize, i32, i32, *mut u8, i32) -> i32;
type DecodeFlagFn = unsafe extern "C" fn(*const u8, usize, i32, i32, *mut u8, bool) -> i32;

/// The loaded texture decoder.
#[derive(Debug)]
pub struct TextureDecoder {
    library: NativeLibrary,
}

impl TextureDecoder {
    /// Load the decoder, preferring a copy on the system library path and
    /// falling back to the packaged artifact.
    pub fn load(loader: &NativeLoader) -> NativeResult<Self> {
        let file_name = loader.platform().library_file_name(LIBRARY_NAME);
        match NativeLibrary::open_system(LIBRARY_NAME, &file_name) {
            Ok(library) => {
                debug!(file = %file_name, "Using system texture decoder");
                Ok(Self::from_library(library))
            }
            Err(e) => {
                debug!(file = %file_name, error = %e, "No system texture decoder, extracting");
                Self::load_packaged(loader)
            }
        }
    }

    /// Load the packaged artifact, skipping the system search.
    pub fn load_packaged(loader: &NativeLoader) -> NativeResult<Self> {
        Ok(Self::from_library(loader.load_library_from_jar(LIBRARY_NAME)?))
    }

    pub fn from_library(library: NativeLibrary) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &NativeLibrary {
        &self.library
    }

    /// Entry points the loaded library does not export.
    pub fn missing_entry_points(&self) -> Vec<&'static str> {
        TextureFormat::all_symbols()
            .into_iter()
            .filter(|symbol| !self.library.has_symbol(symbol))
            .collect()
    }

    /// Decode one of the [`TextureFormat::BLOCK_FORMATS`].
    ///
    /// ASTC, PVRTC and crunched formats need their extra parameter and are
    /// decoded through their dedicated methods; passing them here forwards
    /// with the parameter carried by the variant (`use_unity_crunch = false`).
    pub fn decode(
        &self,
        format: TextureFormat,
        data: &[u8],
        width: u32,
        height: u32,
        out: &mut [u8],
    ) -> Result<(), DecodeError> {
        match format {
            TextureFormat::Astc { block_size } => {
                return self.decode_astc(data, width, height, out, block_size)
            }
            TextureFormat::Pvrtc { is_2bpp } => {
                return self.decode_pvrtc(data, width, height, out, is_2bpp)
            }
            f if f.is_crunched() => {
                return self.decode_crunched(f, data, width, height, out, false)
            }
            _ => {}
        }

        let (w, h) = check_buffers(format, data, width, height, out)?;
        // SAFETY: symbol type matches the exported ABI; buffers were checked above.
        let code = unsafe {
            let decode = self.library.get::<DecodeFn>(format.symbol())?;
            decode(data.as_ptr(), data.len(), w, h, out.as_mut_ptr())
        };
        check_code(format, code)
    }

    pub fn decode_dxt1(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        out: &mut [u8],
    ) -> Result<(), DecodeError> {
        self.decode(TextureFormat::Dxt1, data, width, height, out)
    }

    pub fn decode_dxt5(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        out: &mut [u8],
    ) -> Result<(), DecodeError> {
        self.decode(TextureFormat::Dxt5, data, width, height, out)
    }

    pub fn decode_bc4(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        out: &mut [u8],
    ) -> Result<(), DecodeError> {
        self.decode(TextureFormat::Bc4, data, width, height, out)
    }

    pub fn decode_bc5(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        out: &mut [u8],
    ) -> Result<(), DecodeError> {
        self.decode(TextureFormat::Bc5, data, width, height, out)
    }

    pub fn decode_bc6(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        out: &mut [u8],
    ) -> Result<(), DecodeError> {
        self.decode(TextureFormat::Bc6, data, width, height, out)
    }

    pub fn decode_bc7(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        out: &mut [u8],
    ) -> Result<(), DecodeError> {
        self.decode(TextureFormat::Bc7, data, width, height, out)
    }

    pub fn decode_etc1(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        out: &mut [u8],
    ) -> Result<(), DecodeError> {
        self.decode(TextureFormat::Etc1, data, width, height, out)
    }

    pub fn decode_etc2(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        out: &mut [u8],
    ) -> Result<(), DecodeError> {
        self.decode(TextureFormat::Etc2, data, width, height, out)
    }

    pub fn decode_etc2a1(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        out: &mut [u8],
    ) -> Result<(), DecodeError> {
        self.decode(TextureFormat::Etc2A1, data, width, height, out)
    }

    pub fn decode_etc2a8(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        out: &mut [u8],
    ) -> Result<(), DecodeError> {
        self.decode(TextureFormat::Etc2A8, data, width, height, out)
    }

    /// Decode ASTC with a square `block_size` footprint (4, 5, 6, 8, 10 or 12).
    pub fn decode_astc(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        out: &mut [u8],
        block_size: u32,
    ) -> Result<(), DecodeError> {
        if !ASTC_BLOCK_SIZES.contains(&block_size) {
            return Err(DecodeError::InvalidBlockSize(block_size));
        }
        let format = TextureFormat::Astc { block_size };
        let (w, h) = check_buffers(format, data, width, height, out)?;
        // SAFETY: symbol type matches the exported ABI; buffers were checked above.
        let code = unsafe {
            let decode = self.library.get::<DecodeAstcFn>(format.symbol())?;
            decode(data.as_ptr(), data.len(), w, h, out.as_mut_ptr(), block_size as i32)
        };
        check_code(format, code)
    }

    /// Decode PVRTC at 2bpp (`is_2bpp`) or 4bpp.
    pub fn decode_pvrtc(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        out: &mut [u8],
        is_2bpp: bool,
    ) -> Result<(), DecodeError> {
        let format = TextureFormat::Pvrtc { is_2bpp };
        self.decode_with_flag(format, data, width, height, out, is_2bpp)
    }

    /// Decode a Crunch stream. `use_unity_crunch` selects Unity's fork of the
    /// format.
    pub fn decode_crunched(
        &self,
        format: TextureFormat,
        data: &[u8],
        width: u32,
        height: u32,
        out: &mut [u8],
        use_unity_crunch: bool,
    ) -> Result<(), DecodeError> {
        if !format.is_crunched() {
            return self.decode(format, data, width, height, out);
        }
        self.decode_with_flag(format, data, width, height, out, use_unity_crunch)
    }

    fn decode_with_flag(
        &self,
        format: TextureFormat,
        data: &[u8],
        width: u32,
        height: u32,
        out: &mut [u8],
        flag: bool,
    ) -> Result<(), DecodeError> {
        let (w, h) = check_buffers(format, data, width, height, out)?;
        // SAFETY: symbol type matches the exported ABI; buffers were checked above.
        let code = unsafe {
            let decode = self.library.get::<DecodeFlagFn>(format.symbol())?;
            decode(data.as_ptr(), data.len(), w, h, out.as_mut_ptr(), flag)
        };
        check_code(format, code)
    }
}

/// Validate dimensions and buffer sizes, returning the dimensions as the
/// native ABI's `i32`.
fn check_buffers(
    format: TextureFormat,
    data: &[u8],
    width: u32,
    height: u32,
    out: &[u8],
) -> Result<(i32, i32), DecodeError> {
    let invalid = || DecodeError::InvalidDimensions { width, height };
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    let w = i32::try_from(width).map_err(|_| invalid())?;
    let h = i32::try_from(height).map_err(|_| invalid())?;

    let output = TextureFormat::output_len(width, height).ok_or_else(invalid)?;
    if out.len() < output {
        return Err(DecodeError::OutputTooSmall {
            required: output,
            actual: out.len(),
        });
    }

    let required = if format.is_crunched() {
        1
    } else {
        format.required_input_len(width, height).ok_or_else(invalid)?
    };
    if data.len() < required {
        return Err(DecodeError::InputTooSmall {
            format,
            required,
            actual: data.len(),
        });
    }

    Ok((w, h))
}

fn check_code(format: TextureFormat, code: i32) -> Result<(), DecodeError> {
    if code == DECODE_SUCCESS {
        Ok(())
    } else {
        Err(DecodeError::DecodeFailed { format, code })
    }
}
