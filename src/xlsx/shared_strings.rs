use crate::common::errors::AppError;
use crate::xlsx::xml::XmlUtil;
use quick_xml::events::Event;
use quick_xml::Reader;

// Read-only view of `xl/sharedStrings.xml`; rich-text runs are flattened to plain text.
#[derive(Debug, Clone, Default)]
pub struct SharedStrings {
    items: Vec<String>,
}

impl SharedStrings {
    pub fn parse(xml: &str) -> Result<Self, AppError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut items = Vec::new();
        let mut current: Option<String> = None;
        let mut in_text = false;
        // Phonetic runs repeat the base text as furigana; skip them.
        let mut phonetic_depth = 0usize;

        loop {
            match reader.read_event()? {
                Event::Start(e) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"si") => {
                    current = Some(String::new());
                }
                Event::Empty(e) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"si") => {
                    items.push(String::new());
                }
                Event::End(e) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"si") => {
                    items.push(current.take().unwrap_or_default());
                }
                Event::Start(e) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"rPh") => {
                    phonetic_depth += 1;
                }
                Event::End(e) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"rPh") => {
                    phonetic_depth = phonetic_depth.saturating_sub(1);
                }
                Event::Start(e) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"t") => {
                    in_text = phonetic_depth == 0;
                }
                Event::End(e) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"t") => {
                    in_text = false;
                }
                Event::Text(text) if in_text => {
                    if let Some(item) = current.as_mut() {
                        item.push_str(&text.unescape()?);
                    }
                }
                Event::CData(data) if in_text => {
                    if let Some(item) = current.as_mut() {
                        item.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Self { items })
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
