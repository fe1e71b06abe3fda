//! Decoder for the fixed 32-byte header at the start of a ReBoot (PS1) `.TOM`
//! "Texel Object" model file.
//!
//! The format is only partially reverse-engineered. The header is eight
//! little-endian `u32` words; only a handful have a known meaning.

use winnow::Parser;
use winnow::binary::le_u32;

use crate::data::parser_utils::WResult;
use crate::error::DecodeError;

/// Number of bytes occupied by the header.
pub const HEADER_SIZE: usize = 32;

/// End offset used when the caller has no better estimate of where the
/// primary data block ends.
pub const DEFAULT_END_OFFSET: u32 = 0x1000;

/// The decoded `.TOM` header.
///
/// Fields are raw values. Nothing here checks that offsets fall inside the
/// file or that counts are plausible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TomHeader {
    /// Offset to the material list.
    pub material_list_offset: u32,
    /// Number of materials.
    pub num_materials: u32,
    pub unknown_offset_1: u32,
    pub unknown_offset_2: u32,
    /// Offset of the block that follows the header tables.
    ///
    /// One reading of the format treats this as the start of geometry data,
    /// another as the start of a CLUT (colour look-up table) index block.
    /// Which one is right has not been settled, so the field keeps a neutral
    /// name. See [`crate::report::PrimaryDataLabel`] for display.
    pub primary_data_offset: u32,
    pub unknown_offset_3: u32,
    /// Offset to the bone (skeleton) data.
    pub bone_data_offset: u32,
    /// Number of bones.
    pub bone_count: u32,
}

impl TomHeader {
    /// Field names and values in on-disk order.
    pub fn fields(&self) -> [(&'static str, u32); 8] {
        [
            ("material_list_offset", self.material_list_offset),
            ("num_materials", self.num_materials),
            ("unknown_offset_1", self.unknown_offset_1),
            ("unknown_offset_2", self.unknown_offset_2),
            ("primary_data_offset", self.primary_data_offset),
            ("unknown_offset_3", self.unknown_offset_3),
            ("bone_data_offset", self.bone_data_offset),
            ("bone_count", self.bone_count),
        ]
    }
}

/// The byte range between the primary data offset and a caller-chosen end.
///
/// `size` is signed: an end before the start produces a negative size rather
/// than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockSpan {
    pub start: u32,
    pub end: u32,
    pub size: i64,
}

impl BlockSpan {
    pub fn is_negative(&self) -> bool {
        self.size < 0
    }
}

/// A decoded header together with the span derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Inspection {
    pub header: TomHeader,
    pub span: BlockSpan,
    /// Length of the buffer the header was read from.
    pub input_len: usize,
}

fn parse_header(input: &mut &[u8]) -> WResult<TomHeader> {
    let material_list_offset = le_u32.parse_next(input)?;
    let num_materials = le_u32.parse_next(input)?;
    let unknown_offset_1 = le_u32.parse_next(input)?;
    let unknown_offset_2 = le_u32.parse_next(input)?;
    let primary_data_offset = le_u32.parse_next(input)?;
    let unknown_offset_3 = le_u32.parse_next(input)?;
    let bone_data_offset = le_u32.parse_next(input)?;
    let bone_count = le_u32.parse_next(input)?;
    Ok(TomHeader {
        material_list_offset,
        num_materials,
        unknown_offset_1,
        unknown_offset_2,
        primary_data_offset,
        unknown_offset_3,
        bone_data_offset,
        bone_count,
    })
}

/// Decode the header from the start of `bytes`.
///
/// Only the first [`HEADER_SIZE`] bytes are read; anything after them is
/// ignored. Fails with [`DecodeError::TooSmall`] if fewer are available.
pub fn decode(bytes: &[u8]) -> Result<TomHeader, DecodeError> {
    let len = bytes.len();
    if len < HEADER_SIZE {
        return Err(DecodeError::TooSmall { len });
    }

    let input = &mut &bytes[..HEADER_SIZE];
    parse_header(input).map_err(|_| DecodeError::TooSmall { len })
}

/// Span from `header.primary_data_offset` to `end_offset`. Never fails.
pub fn compute_block_span(header: &TomHeader, end_offset: u32) -> BlockSpan {
    let start = header.primary_data_offset;
    BlockSpan {
        start,
        end: end_offset,
        size: i64::from(end_offset) - i64::from(start),
    }
}

/// [`decode`] followed by [`compute_block_span`].
pub fn inspect(bytes: &[u8], end_offset: u32) -> Result<Inspection, DecodeError> {
    let header = decode(bytes)?;
    let span = compute_block_span(&header, end_offset);
    Ok(Inspection {
        header,
        span,
        input_len: bytes.len(),
    })
}
