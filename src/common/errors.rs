use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("file not found: {0}")]
    FileNotFound(String),
    #[error("invalid xlsx format: {0}")]
    InvalidXlsxFormat(String),
    #[error("sheet not found: {0}")]
    SheetNotFound(String),
    #[error("invalid cell address: {0}")]
    InvalidCellAddress(String),
    #[error("xml parse error: {0}")]
    XmlParseError(String),
    #[error("zip error: {0}")]
    ZipError(String),
    #[error("io error: {0}")]
    IoError(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("merge conflict: {0}")]
    MergeConflict(String),
    #[error("anchor not found: {0}")]
    AnchorNotFound(String),
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

impl AppError {
    pub fn code(&self) -> i32 {
        match self {
            AppError::InvalidPath(_) => 1001,
            AppError::FileNotFound(_) => 1002,
            AppError::InvalidXlsxFormat(_) => 1004,
            AppError::SheetNotFound(_) => 1005,
            AppError::InvalidCellAddress(_) => 1007,
            AppError::XmlParseError(_) => 1008,
            AppError::ZipError(_) => 1009,
            AppError::IoError(_) => 1010,
            AppError::InvalidInput(_) => 1011,
            AppError::MergeConflict(_) => 1012,
            AppError::AnchorNotFound(_) => 1013,
            AppError::InvalidImage(_) => 1014,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::IoError(value.to_string())
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(value: zip::result::ZipError) -> Self {
        Self::ZipError(value.to_string())
    }
}

impl From<quick_xml::Error> for AppError {
    fn from(value: quick_xml::Error) -> Self {
        Self::XmlParseError(value.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for AppError {
    fn from(value: quick_xml::events::attributes::AttrError) -> Self {
        Self::XmlParseError(value.to_string())
    }
}

impl From<std::string::FromUtf8Error> for AppError {
    fn from(value: std::string::FromUtf8Error) -> Self {
        Self::InvalidXlsxFormat(value.to_string())
    }
}

impl From<base64::DecodeError> for AppError {
    fn from(value: base64::DecodeError) -> Self {
        Self::InvalidImage(value.to_string())
    }
}
