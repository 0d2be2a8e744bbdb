use crate::common::errors::AppError;
use crate::document::Flowchart;
use crate::xlsx::drawing::PictureAnchor;
use crate::xlsx::TemplateWorkbook;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::debug;

// A flowchart payload that decoded to a supported raster format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub extension: &'static str,
}

pub struct FlowchartImage;

impl FlowchartImage {
    pub fn decode(flowchart: &Flowchart) -> Result<DecodedImage, AppError> {
        // Accepts `data:<mime>;base64,<payload>` as well as a bare payload.
        let payload = Self::strip_data_url(&flowchart.data);
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(AppError::InvalidImage(format!(
                "flowchart payload is empty: {}",
                flowchart.file_name
            )));
        }

        let bytes = STANDARD.decode(compact.as_bytes())?;
        let extension = Self::sniff_extension(&bytes).ok_or_else(|| {
            AppError::InvalidImage(format!(
                "{} ({}) is not a PNG, JPEG or GIF image",
                flowchart.file_name, flowchart.mime_type
            ))
        })?;
        Ok(DecodedImage { bytes, extension })
    }

    fn strip_data_url(data: &str) -> &str {
        let trimmed = data.trim();
        if trimmed.starts_with("data:") {
            trimmed.split_once(',').map(|(_, rest)| rest).unwrap_or("")
        } else {
            trimmed
        }
    }

    pub fn sniff_extension(bytes: &[u8]) -> Option<&'static str> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some("png")
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some("jpeg")
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some("gif")
        } else {
            None
        }
    }

    // Returns whether anything was embedded. A payload that does not decode is
    // skipped; only package errors propagate.
    pub fn insert(
        workbook: &mut TemplateWorkbook,
        flowchart: &Flowchart,
        anchor: PictureAnchor,
    ) -> Result<bool, AppError> {
        let image = match Self::decode(flowchart) {
            Ok(image) => image,
            Err(err) => {
                debug!(file = %flowchart.file_name, error = %err, "flowchart skipped");
                return Ok(false);
            }
        };
        workbook.add_image(&image.bytes, image.extension, anchor)?;
        Ok(true)
    }
}
