//! Compressed texture formats exposed by the native decoder.

use std::fmt;

/// Bytes per decoded pixel (32-bit color).
pub const BYTES_PER_PIXEL: usize = 4;

/// ASTC block sizes accepted by the decoder (square footprints).
pub const ASTC_BLOCK_SIZES: &[u32] = &[4, 5, 6, 8, 10, 12];

/// A format with a native `decode_*` entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Dxt1,
    Dxt5,
    Bc4,
    Bc5,
    Bc6,
    Bc7,
    Etc1,
    Etc2,
    Etc2A1,
    Etc2A8,
    AtcRgb4,
    AtcRgba8,
    EacR,
    EacRSigned,
    EacRg,
    EacRgSigned,
    /// ASTC with a square block footprint.
    Astc { block_size: u32 },
    /// PVRTC at 2 or 4 bits per pixel.
    Pvrtc { is_2bpp: bool },
    CrunchedDxt1,
    CrunchedDxt5,
    CrunchedEtc1,
    CrunchedEtc2A8,
}

impl TextureFormat {
    /// Formats with a fixed block layout and no extra parameters.
    pub const BLOCK_FORMATS: &'static [TextureFormat] = &[
        Self::Dxt1,
        Self::Dxt5,
        Self::Bc4,
        Self::Bc5,
        Self::Bc6,
        Self::Bc7,
        Self::Etc1,
        Self::Etc2,
        Self::Etc2A1,
        Self::Etc2A8,
        Self::AtcRgb4,
        Self::AtcRgba8,
        Self::EacR,
        Self::EacRSigned,
        Self::EacRg,
        Self::EacRgSigned,
    ];

    /// Exported symbol of the decode entry point.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Dxt1 => "decode_dxt1",
            Self::Dxt5 => "decode_dxt5",
            Self::Bc4 => "decode_bc4",
            Self::Bc5 => "decode_bc5",
            Self::Bc6 => "decode_bc6",
            Self::Bc7 => "decode_bc7",
            Self::Etc1 => "decode_etc1",
            Self::Etc2 => "decode_etc2",
            Self::Etc2A1 => "decode_etc2a1",
            Self::Etc2A8 => "decode_etc2a8",
            Self::AtcRgb4 => "decode_atc_rgb4",
            Self::AtcRgba8 => "decode_atc_rgba8",
            Self::EacR => "decode_eacr",
            Self::EacRSigned => "decode_eacr_signed",
            Self::EacRg => "decode_eacrg",
            Self::EacRgSigned => "decode_eacrg_signed",
            Self::Astc { .. } => "decode_astc",
            Self::Pvrtc { .. } => "decode_pvrtc",
            Self::CrunchedDxt1 => "decode_crunched_dxt1",
            Self::CrunchedDxt5 => "decode_crunched_dxt5",
            Self::CrunchedEtc1 => "decode_crunched_etc1",
            Self::CrunchedEtc2A8 => "decode_crunched_etc2a8",
        }
    }

    /// Every distinct entry point symbol.
    pub fn all_symbols() -> Vec<&'static str> {
        let mut symbols: Vec<&'static str> =
            Self::BLOCK_FORMATS.iter().map(|f| f.symbol()).collect();
        symbols.extend([
            Self::Astc { block_size: 4 }.symbol(),
            Self::Pvrtc { is_2bpp: false }.symbol(),
            Self::CrunchedDxt1.symbol(),
            Self::CrunchedDxt5.symbol(),
            Self::CrunchedEtc1.symbol(),
            Self::CrunchedEtc2A8.symbol(),
        ]);
        symbols
    }

    /// Whether the input is a Crunch stream rather than raw blocks.
    pub fn is_crunched(&self) -> bool {
        matches!(
            self,
            Self::CrunchedDxt1 | Self::CrunchedDxt5 | Self::CrunchedEtc1 | Self::CrunchedEtc2A8
        )
    }

    /// Block footprint (width, height) and bytes per block.
    ///
    /// `None` for crunched formats, whose streams are variable length.
    pub fn block_layout(&self) -> Option<(usize, usize, usize)> {
        match self {
            Self::Dxt1
            | Self::Bc4
            | Self::Etc1
            | Self::Etc2
            | Self::Etc2A1
            | Self::AtcRgb4
            | Self::EacR
            | Self::EacRSigned => Some((4, 4, 8)),
            Self::Dxt5
            | Self::Bc5
            | Self::Bc6
            | Self::Bc7
            | Self::Etc2A8
            | Self::AtcRgba8
            | Self::EacRg
            | Self::EacRgSigned => Some((4, 4, 16)),
            Self::Astc { block_size } => {
                let size = *block_size as usize;
                Some((size, size, 16))
            }
            Self::Pvrtc { is_2bpp: true } => Some((8, 4, 8)),
            Self::Pvrtc { is_2bpp: false } => Some((4, 4, 8)),
            Self::CrunchedDxt1
            | Self::CrunchedDxt5
            | Self::CrunchedEtc1
            | Self::CrunchedEtc2A8 => None,
        }
    }

    /// Minimum compressed input length for a `width` x `height` image.
    ///
    /// PVRTC always covers at least 2x2 blocks. Returns `None` for crunched
    /// formats or on overflow.
    pub fn required_input_len(&self, width: u32, height: u32) -> Option<usize> {
        let (block_w, block_h, block_bytes) = self.block_layout()?;
        if block_w == 0 || block_h == 0 {
            return None;
        }

        let mut blocks_x = (width as usize).div_ceil(block_w);
        let mut blocks_y = (height as usize).div_ceil(block_h);
        if matches!(self, Self::Pvrtc { .. }) {
            blocks_x = blocks_x.max(2);
            blocks_y = blocks_y.max(2);
        }

        blocks_x.checked_mul(blocks_y)?.checked_mul(block_bytes)
    }

    /// Decoded output length for a `width` x `height` image.
    pub fn output_len(width: u32, height: u32) -> Option<usize> {
        (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(BYTES_PER_PIXEL)
    }
}

impl fmt::Display for TextureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dxt1 => write!(f, "DXT1"),
            Self::Dxt5 => write!(f, "DXT5"),
            Self::Bc4 => write!(f, "BC4"),
            Self::Bc5 => write!(f, "BC5"),
            Self::Bc6 => write!(f, "BC6"),
            Self::Bc7 => write!(f, "BC7"),
            Self::Etc1 => write!(f, "ETC1"),
            Self::Etc2 => write!(f, "ETC2"),
            Self::Etc2A1 => write!(f, "ETC2A1"),
            Self::Etc2A8 => write!(f, "ETC2A8"),
            Self::AtcRgb4 => write!(f, "ATC RGB4"),
            Self::AtcRgba8 => write!(f, "ATC RGBA8"),
            Self::EacR => write!(f, "EAC R"),
            Self::EacRSigned => write!(f, "EAC R signed"),
            Self::EacRg => write!(f, "EAC RG"),
            Self::EacRgSigned => write!(f, "EAC RG signed"),
            Self::Astc { block_size } => write!(f, "ASTC {}x{}", block_size, block_size),
            Self::Pvrtc { is_2bpp: true } => write!(f, "PVRTC 2bpp"),
            Self::Pvrtc { is_2bpp: false } => write!(f, "PVRTC 4bpp"),
            Self::CrunchedDxt1 => write!(f, "Crunched DXT1"),
            Self::CrunchedDxt5 => write!(f, "Crunched DXT5"),
            Self::CrunchedEtc1 => write!(f, "Crunched ETC1"),
            Self::CrunchedEtc2A8 => write!(f, "Crunched ETC2A8"),
        }
    }
}
