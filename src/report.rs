//! Presentation of decoded headers: labels, option parsing, text rendering and
//! advisory observations.

use std::fmt;
use std::str::FromStr;

use bon::Builder;

use crate::error::ParseOffsetError;
use crate::models::tom::{BlockSpan, DEFAULT_END_OFFSET, Inspection, TomHeader};

/// How to name the header word at offset 16.
///
/// The same word has been read both as a geometry data offset and as a CLUT
/// offset. The decoder stays neutral; this only changes what gets printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PrimaryDataLabel {
    #[default]
    Primary,
    Geometry,
    Clut,
}

impl PrimaryDataLabel {
    /// Field name used in the header listing.
    pub fn field_name(&self) -> &'static str {
        match self {
            PrimaryDataLabel::Primary => "primary_data_offset",
            PrimaryDataLabel::Geometry => "geometry_data_offset",
            PrimaryDataLabel::Clut => "CLUT_offset",
        }
    }

    /// Title of the block span section.
    pub fn block_title(&self) -> &'static str {
        match self {
            PrimaryDataLabel::Primary => "Primary Data Block",
            PrimaryDataLabel::Geometry => "Geometry Block",
            PrimaryDataLabel::Clut => "CLUT Index Block",
        }
    }
}

impl FromStr for PrimaryDataLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "primary" | "neutral" => Ok(PrimaryDataLabel::Primary),
            "geometry" => Ok(PrimaryDataLabel::Geometry),
            "clut" => Ok(PrimaryDataLabel::Clut),
            other => Err(format!(
                "unknown label {other:?} (expected primary, geometry or clut)"
            )),
        }
    }
}

impl fmt::Display for PrimaryDataLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimaryDataLabel::Primary => "primary",
            PrimaryDataLabel::Geometry => "geometry",
            PrimaryDataLabel::Clut => "clut",
        };
        f.write_str(name)
    }
}

/// Caller-chosen settings for inspecting a file.
#[derive(Debug, Clone, Copy, Builder)]
pub struct InspectOptions {
    #[builder(default = DEFAULT_END_OFFSET)]
    pub end_offset: u32,
    #[builder(default)]
    pub label: PrimaryDataLabel,
}

impl Default for InspectOptions {
    fn default() -> Self {
        InspectOptions::builder().build()
    }
}

/// Parse an offset written either in decimal or as `0x`-prefixed hex.
pub fn parse_offset(input: &str) -> Result<u32, ParseOffsetError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseOffsetError::Empty);
    }
    if trimmed.starts_with('-') {
        return Err(ParseOffsetError::Negative(trimmed.to_owned()));
    }

    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => trimmed.parse::<u32>(),
    };

    parsed.map_err(|e| ParseOffsetError::Invalid {
        input: trimmed.to_owned(),
        reason: e.to_string(),
    })
}

/// Something about a header worth pointing out. These never fail decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Observation {
    OffsetPastEnd {
        field: &'static str,
        offset: u32,
        file_len: usize,
    },
    EndOffsetPastEnd {
        end: u32,
        file_len: usize,
    },
    NegativeBlockSize {
        size: i64,
    },
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observation::OffsetPastEnd {
                field,
                offset,
                file_len,
            } => write!(
                f,
                "{field} 0x{offset:08X} points past the end of the file ({file_len} bytes)"
            ),
            Observation::EndOffsetPastEnd { end, file_len } => write!(
                f,
                "end offset 0x{end:08X} is past the end of the file ({file_len} bytes)"
            ),
            Observation::NegativeBlockSize { size } => write!(
                f,
                "block size is negative ({size} bytes): end offset is before the start"
            ),
        }
    }
}

/// Collect observations about `header` and `span` for a file of `file_len` bytes.
pub fn observe(
    header: &TomHeader,
    span: &BlockSpan,
    file_len: usize,
    label: PrimaryDataLabel,
) -> Vec<Observation> {
    let offsets = [
        ("material_list_offset", header.material_list_offset),
        ("unknown_offset_1", header.unknown_offset_1),
        ("unknown_offset_2", header.unknown_offset_2),
        (label.field_name(), header.primary_data_offset),
        ("unknown_offset_3", header.unknown_offset_3),
        ("bone_data_offset", header.bone_data_offset),
    ];

    let mut observations: Vec<Observation> = offsets
        .into_iter()
        .filter(|(_, offset)| *offset as usize >= file_len)
        .map(|(field, offset)| Observation::OffsetPastEnd {
            field,
            offset,
            file_len,
        })
        .collect();

    if span.end as usize > file_len {
        observations.push(Observation::EndOffsetPastEnd {
            end: span.end,
            file_len,
        });
    }

    if span.is_negative() {
        observations.push(Observation::NegativeBlockSize { size: span.size });
    }

    observations
}

/// A rendered view of one inspected header.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HeaderReport {
    pub label: PrimaryDataLabel,
    pub header: TomHeader,
    pub span: BlockSpan,
    pub file_len: usize,
    pub observations: Vec<Observation>,
}

impl HeaderReport {
    pub fn new(inspection: &Inspection, label: PrimaryDataLabel) -> Self {
        let observations = observe(
            &inspection.header,
            &inspection.span,
            inspection.input_len,
            label,
        );
        HeaderReport {
            label,
            header: inspection.header,
            span: inspection.span,
            file_len: inspection.input_len,
            observations,
        }
    }
}

impl fmt::Display for HeaderReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== .TOM Header ==")?;
        for (name, value) in self.header.fields() {
            let name = if name == "primary_data_offset" {
                self.label.field_name()
            } else {
                name
            };
            writeln!(f, "{name:<24}: 0x{value:08X} ({value})")?;
        }

        writeln!(f)?;
        writeln!(f, "== {} ==", self.label.block_title())?;
        writeln!(f, "Start Offset        : 0x{:08X}", self.span.start)?;
        writeln!(
            f,
            "User End Offset     : 0x{:08X} ({})",
            self.span.end, self.span.end
        )?;
        writeln!(f, "Block Size          : {} bytes", self.span.size)?;

        for observation in &self.observations {
            writeln!(f, "note: {observation}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tom::{HEADER_SIZE, inspect};

    fn header_bytes(words: [u32; 8], total_len: usize) -> Vec<u8> {
        let mut bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        bytes.resize(total_len.max(HEADER_SIZE), 0);
        bytes
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("4096"), Ok(4096));
        assert_eq!(parse_offset("0x1000"), Ok(0x1000));
        assert_eq!(parse_offset("0XfF"), Ok(0xFF));
        assert_eq!(parse_offset(" 0 "), Ok(0));
        assert_eq!(parse_offset("0xFFFFFFFF"), Ok(u32::MAX));
        assert_eq!(parse_offset(""), Err(ParseOffsetError::Empty));
        assert!(matches!(
            parse_offset("-1"),
            Err(ParseOffsetError::Negative(_))
        ));
        assert!(matches!(
            parse_offset("0x100000000"),
            Err(ParseOffsetError::Invalid { .. })
        ));
        assert!(matches!(
            parse_offset("12ab"),
            Err(ParseOffsetError::Invalid { .. })
        ));
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!("clut".parse(), Ok(PrimaryDataLabel::Clut));
        assert_eq!("CLUT".parse(), Ok(PrimaryDataLabel::Clut));
        assert_eq!("geometry".parse(), Ok(PrimaryDataLabel::Geometry));
        assert_eq!("primary".parse(), Ok(PrimaryDataLabel::Primary));
        assert!("bones".parse::<PrimaryDataLabel>().is_err());
        assert_eq!(PrimaryDataLabel::Clut.to_string(), "clut");
    }

    #[test]
    fn test_default_options() {
        let opts = InspectOptions::default();
        assert_eq!(opts.end_offset, 0x1000);
        assert_eq!(opts.label, PrimaryDataLabel::Primary);

        let opts = InspectOptions::builder()
            .end_offset(0x20)
            .label(PrimaryDataLabel::Geometry)
            .build();
        assert_eq!(opts.end_offset, 0x20);
        assert_eq!(opts.label, PrimaryDataLabel::Geometry);
    }

    #[test]
    fn test_text_layout() {
        let bytes = header_bytes([4, 2, 0, 0, 16, 0, 0, 0], 64);
        let inspection = inspect(&bytes, 0x20).unwrap();
        let report = HeaderReport::new(&inspection, PrimaryDataLabel::Clut);
        let text = report.to_string();

        let expected = "\
== .TOM Header ==
material_list_offset    : 0x00000004 (4)
num_materials           : 0x00000002 (2)
unknown_offset_1        : 0x00000000 (0)
unknown_offset_2        : 0x00000000 (0)
CLUT_offset             : 0x00000010 (16)
unknown_offset_3        : 0x00000000 (0)
bone_data_offset        : 0x00000000 (0)
bone_count              : 0x00000000 (0)

== CLUT Index Block ==
Start Offset        : 0x00000010
User End Offset     : 0x00000020 (32)
Block Size          : 16 bytes
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_geometry_label_text() {
        let bytes = header_bytes([0; 8], 0x2000);
        let inspection = inspect(&bytes, 0x1000).unwrap();
        let text = HeaderReport::new(&inspection, PrimaryDataLabel::Geometry).to_string();
        assert!(text.contains("geometry_data_offset    : 0x00000000 (0)"));
        assert!(text.contains("== Geometry Block =="));
        assert!(text.contains("Block Size          : 4096 bytes"));
        assert!(!text.contains("note:"));
    }

    #[test]
    fn test_negative_size_is_observed() {
        let bytes = header_bytes([0, 0, 0, 0, 0x40, 0, 0, 0], 0x100);
        let inspection = inspect(&bytes, 0x20).unwrap();
        let report = HeaderReport::new(&inspection, PrimaryDataLabel::Primary);

        assert_eq!(
            report.observations,
            vec![Observation::NegativeBlockSize { size: -0x20 }]
        );
        let text = report.to_string();
        assert!(text.contains("Block Size          : -32 bytes"));
        assert!(text.contains("note: block size is negative (-32 bytes)"));
    }

    #[test]
    fn test_offsets_past_end_are_observed() {
        let bytes = header_bytes([0x10, 1, 0, 0, 0x500, 0, 0x800, 3], 0x400);
        let inspection = inspect(&bytes, 0x1000).unwrap();
        let observations = observe(
            &inspection.header,
            &inspection.span,
            inspection.input_len,
            PrimaryDataLabel::Clut,
        );

        assert_eq!(
            observations,
            vec![
                Observation::OffsetPastEnd {
                    field: "CLUT_offset",
                    offset: 0x500,
                    file_len: 0x400
                },
                Observation::OffsetPastEnd {
                    field: "bone_data_offset",
                    offset: 0x800,
                    file_len: 0x400
                },
                Observation::EndOffsetPastEnd {
                    end: 0x1000,
                    file_len: 0x400
                },
            ]
        );
    }
}
