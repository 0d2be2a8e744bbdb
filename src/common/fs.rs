use crate::common::errors::AppError;
use std::path::{Path, PathBuf};

pub struct FsUtil;

impl FsUtil {
    // Normalizes relative paths and enforces the .xlsx extension contract.
    pub fn resolve_xlsx_path(path: &str) -> Result<PathBuf, AppError> {
        if path.trim().is_empty() {
            return Err(AppError::InvalidPath("path is empty".to_string()));
        }
        let input = Path::new(path);
        let abs = if input.is_absolute() {
            input.to_path_buf()
        } else {
            std::env::current_dir()?.join(input)
        };
        let ext = abs
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if ext != "xlsx" {
            return Err(AppError::InvalidPath(format!(
                "expected .xlsx extension: {}",
                abs.display()
            )));
        }
        Ok(abs)
    }

    pub fn read_xlsx(path: &str) -> Result<Vec<u8>, AppError> {
        let resolved = Self::resolve_xlsx_path(path)?;
        if !resolved.exists() {
            return Err(AppError::FileNotFound(resolved.display().to_string()));
        }
        Ok(std::fs::read(resolved)?)
    }

    pub fn write_xlsx(path: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
        let resolved = Self::resolve_xlsx_path(path)?;
        std::fs::write(&resolved, bytes)?;
        Ok(resolved)
    }
}
