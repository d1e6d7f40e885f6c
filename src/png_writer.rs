use crate::distance_field::DistanceField;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};

pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureFormat {
    Png,
}

/// Encoded field plus the metadata a front-end needs to upload it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigilTexture {
    #[serde(skip)]
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

pub fn has_png_signature(bytes: &[u8]) -> bool {
    bytes.starts_with(&PNG_SIGNATURE)
}

/// Encode the field as an opaque RGBA8 PNG with the gray value in every color channel.
pub fn encode_png(field: &DistanceField) -> Result<SigilTexture> {
    let (w, h) = (field.width(), field.height());
    let rgba: Vec<[u8; 4]> = field.values().iter().map(|&v| [v, v, v, 255]).collect();

    let mut data = Vec::new();
    let mut encoder = png::Encoder::new(&mut data, w, h);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(bytemuck::cast_slice(&rgba))?;
    writer.finish()?;

    Ok(SigilTexture {
        data,
        width: w,
        height: h,
        format: TextureFormat::Png,
    })
}

pub fn save_png(path: &std::path::Path, texture: &SigilTexture) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut wtr = BufWriter::new(file);
    wtr.write_all(&texture.data)?;
    wtr.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deadline::Deadline;
    use crate::distance_field::{BoundedSearch, DistanceFieldBuilder};
    use crate::grid::OccupancyGrid;

    fn ihdr_size(data: &[u8]) -> (u32, u32) {
        // Signature (8) + chunk length (4) + "IHDR" (4), then width and height.
        assert_eq!(&data[12..16], b"IHDR");
        let width = u32::from_be_bytes(data[16..20].try_into().unwrap());
        let height = u32::from_be_bytes(data[20..24].try_into().unwrap());
        (width, height)
    }

    #[test]
    fn encodes_signature_and_size() {
        let mut grid = OccupancyGrid::new(12, 7);
        grid.set(3, 3, true);
        let field = BoundedSearch::new(4)
            .build(&grid, &Deadline::unbounded())
            .unwrap();
        let texture = encode_png(&field).unwrap();
        assert!(has_png_signature(&texture.data));
        assert_eq!((texture.width, texture.height), (12, 7));
        assert_eq!(ihdr_size(&texture.data), (12, 7));
        // Color type 6 (RGBA) at bit depth 8.
        assert_eq!(texture.data[24], 8);
        assert_eq!(texture.data[25], 6);
        assert_eq!(texture.format, TextureFormat::Png);
    }

    #[test]
    fn encoding_is_deterministic() {
        let grid = OccupancyGrid::new(16, 16);
        let field = BoundedSearch::new(2)
            .build(&grid, &Deadline::unbounded())
            .unwrap();
        assert_eq!(encode_png(&field).unwrap(), encode_png(&field).unwrap());
    }

    #[test]
    fn signature_check() {
        assert!(!has_png_signature(b"GIF89a"));
        assert!(!has_png_signature(&PNG_SIGNATURE[..4]));
    }
}
