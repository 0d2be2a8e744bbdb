use crate::common::errors::AppError;
use crate::xlsx::xml::XmlUtil;
use quick_xml::events::Event;
use quick_xml::Reader;

pub const DRAWING_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.drawing+xml";

// Minimal editor for `[Content_Types].xml`: new entries are spliced in before `</Types>`.
#[derive(Debug, Clone)]
pub struct ContentTypes {
    xml: String,
    defaults: Vec<String>,
    overrides: Vec<String>,
}

impl ContentTypes {
    pub fn parse(xml: &str) -> Result<Self, AppError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let mut defaults = Vec::new();
        let mut overrides = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e)
                    if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"Default") =>
                {
                    if let Some(ext) = XmlUtil::attr_value(&e, b"Extension")? {
                        defaults.push(ext.to_ascii_lowercase());
                    }
                }
                Event::Start(e) | Event::Empty(e)
                    if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"Override") =>
                {
                    if let Some(part) = XmlUtil::attr_value(&e, b"PartName")? {
                        overrides.push(part);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Self {
            xml: xml.to_string(),
            defaults,
            overrides,
        })
    }

    pub fn has_default(&self, extension: &str) -> bool {
        self.defaults
            .iter()
            .any(|d| d.eq_ignore_ascii_case(extension))
    }

    pub fn has_override(&self, part_name: &str) -> bool {
        let wanted = Self::part_name(part_name);
        self.overrides.iter().any(|o| *o == wanted)
    }

    pub fn ensure_default(&mut self, extension: &str, content_type: &str) -> Result<(), AppError> {
        if self.has_default(extension) {
            return Ok(());
        }
        let entry = format!(
            r#"<Default Extension="{}" ContentType="{}"/>"#,
            XmlUtil::escape_attr(extension),
            XmlUtil::escape_attr(content_type)
        );
        self.insert_entry(&entry)?;
        self.defaults.push(extension.to_ascii_lowercase());
        Ok(())
    }

    pub fn ensure_override(&mut self, part_name: &str, content_type: &str) -> Result<(), AppError> {
        if self.has_override(part_name) {
            return Ok(());
        }
        let wanted = Self::part_name(part_name);
        let entry = format!(
            r#"<Override PartName="{}" ContentType="{}"/>"#,
            XmlUtil::escape_attr(&wanted),
            XmlUtil::escape_attr(content_type)
        );
        self.insert_entry(&entry)?;
        self.overrides.push(wanted);
        Ok(())
    }

    pub fn remove_override(&mut self, part_name: &str) {
        let wanted = Self::part_name(part_name);
        let needle = format!("PartName=\"{wanted}\"");
        let Some(attr_pos) = self.xml.find(&needle) else {
            return;
        };
        let Some(start) = self.xml[..attr_pos].rfind('<') else {
            return;
        };
        let Some(end_rel) = self.xml[attr_pos..].find("/>") else {
            return;
        };
        self.xml.replace_range(start..attr_pos + end_rel + 2, "");
        self.overrides.retain(|o| *o != wanted);
    }

    pub fn into_xml(self) -> String {
        self.xml
    }

    fn insert_entry(&mut self, entry: &str) -> Result<(), AppError> {
        let close = self.xml.rfind("</Types>").ok_or_else(|| {
            AppError::InvalidXlsxFormat("content types part has no </Types>".to_string())
        })?;
        self.xml.insert_str(close, entry);
        Ok(())
    }

    fn part_name(part: &str) -> String {
        if part.starts_with('/') {
            part.to_string()
        } else {
            format!("/{part}")
        }
    }
}

pub fn image_content_type(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "jpeg" | "jpg" => "image/jpeg",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}
