use crate::common::errors::AppError;
use quick_xml::events::BytesStart;

pub struct XmlUtil;

impl XmlUtil {
    // Compares element/attribute names ignoring any namespace prefix.
    pub fn is_local_name_bytes(name: &[u8], local: &[u8]) -> bool {
        Self::local_name(name) == local
    }

    pub fn local_name(name: &[u8]) -> &[u8] {
        match name.iter().rposition(|b| *b == b':') {
            Some(idx) => &name[idx + 1..],
            None => name,
        }
    }

    pub fn prefix_of(name: &[u8]) -> Option<String> {
        name.iter()
            .position(|b| *b == b':')
            .map(|idx| String::from_utf8_lossy(&name[..idx]).into_owned())
    }

    pub fn qualified(prefix: Option<&str>, local: &str) -> String {
        match prefix {
            Some(p) if !p.is_empty() => format!("{p}:{local}"),
            _ => local.to_string(),
        }
    }

    pub fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, AppError> {
        for attr in e.attributes() {
            let attr = attr?;
            if Self::is_local_name_bytes(attr.key.as_ref(), key) {
                return Ok(Some(attr.unescape_value()?.into_owned()));
            }
        }
        Ok(None)
    }

    pub fn attrs(e: &BytesStart<'_>) -> Result<Vec<(String, String)>, AppError> {
        let mut out = Vec::new();
        for attr in e.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            out.push((key, attr.unescape_value()?.into_owned()));
        }
        Ok(out)
    }

    pub fn with_attr(
        e: &BytesStart<'_>,
        key: &str,
        value: &str,
    ) -> Result<BytesStart<'static>, AppError> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let mut out = BytesStart::new(name);
        let mut replaced = false;
        for (k, v) in Self::attrs(e)? {
            if k == key {
                out.push_attribute((k.as_str(), value));
                replaced = true;
            } else {
                out.push_attribute((k.as_str(), v.as_str()));
            }
        }
        if !replaced {
            out.push_attribute((key, value));
        }
        Ok(out)
    }

    pub fn escape_attr(value: &str) -> String {
        value
            .replace('&', "&amp;")
            .replace('"', "&quot;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    }

    // XML 1.0 forbids most control characters; spreadsheet apps refuse the part otherwise.
    pub fn sanitize_text(value: &str) -> String {
        value
            .chars()
            .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
            .collect()
    }
}
