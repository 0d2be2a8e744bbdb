use crate::common::errors::AppError;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

// Every part of an OOXML zip package, kept in archive order.
#[derive(Debug, Clone, Default)]
pub struct XlsxPackage {
    parts: Vec<(String, Vec<u8>)>,
}

impl XlsxPackage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AppError> {
        let mut zip = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = Vec::with_capacity(zip.len());

        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            let name = file.name().to_string();
            // ZIP files do not require explicit directory entries.
            if name.ends_with('/') {
                continue;
            }
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            parts.push((name, data));
        }

        let package = Self { parts };
        if !package.has_part(CONTENT_TYPES_PART) {
            return Err(AppError::InvalidXlsxFormat(
                "missing [Content_Types].xml".to_string(),
            ));
        }
        Ok(package)
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.parts.iter().any(|(n, _)| n == name)
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(n, _)| n.as_str())
    }

    pub fn read_part_string(&self, name: &str) -> Result<String, AppError> {
        let data = self
            .part(name)
            .ok_or_else(|| AppError::InvalidXlsxFormat(format!("missing part: {name}")))?;
        Ok(String::from_utf8(data.to_vec())?)
    }

    pub fn read_optional_part_string(&self, name: &str) -> Result<Option<String>, AppError> {
        match self.part(name) {
            Some(data) => Ok(Some(String::from_utf8(data.to_vec())?)),
            None => Ok(None),
        }
    }

    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = data,
            None => self.parts.push((name.to_string(), data)),
        }
    }

    pub fn remove_part(&mut self, name: &str) -> bool {
        let before = self.parts.len();
        self.parts.retain(|(n, _)| n != name);
        before != self.parts.len()
    }

    pub fn next_free_part_name(&self, prefix: &str, suffix: &str) -> String {
        let mut n = 1usize;
        loop {
            let candidate = format!("{prefix}{n}{suffix}");
            if !self.has_part(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, AppError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        // Consumers sniff the content types part first, so it always leads the archive.
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        if let Some(content_types) = self.part(CONTENT_TYPES_PART) {
            writer.start_file(CONTENT_TYPES_PART, deflated)?;
            writer.write_all(content_types)?;
        }

        for (name, data) in &self.parts {
            if name == CONTENT_TYPES_PART {
                continue;
            }
            writer.start_file(name.as_str(), deflated)?;
            writer.write_all(data)?;
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }
}
