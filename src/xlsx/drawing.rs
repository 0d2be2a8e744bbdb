use crate::common::errors::AppError;
use crate::xlsx::relationships::REL_NS;
use crate::xlsx::xml::XmlUtil;
use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

pub const XDR_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing";
pub const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const EMU_PER_PIXEL: u64 = 9525;

// Where and how large a picture is placed; row and column are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PictureAnchor {
    pub row: u32,
    pub col: u32,
    pub width_px: u32,
    pub height_px: u32,
}

pub struct SheetDrawing;

impl SheetDrawing {
    pub fn empty_part() -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<xdr:wsDr xmlns:xdr="{XDR_NS}" xmlns:a="{A_NS}" xmlns:r="{REL_NS}"></xdr:wsDr>"#
        )
    }

    // Moves every `from`/`to` marker at or below the inserted rows.
    // Markers are zero-based, so inserting before 1-based row `at` moves rows `>= at - 1`.
    pub fn shift_anchor_rows(xml: &str, at: u32, count: u32) -> Result<String, AppError> {
        if count == 0 {
            return Ok(xml.to_string());
        }
        let first_moved = at.saturating_sub(1);

        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        let mut stack: Vec<Vec<u8>> = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    stack.push(XmlUtil::local_name(e.name().as_ref()).to_vec());
                    writer.write_event(Event::Start(e))?;
                }
                Event::End(e) => {
                    stack.pop();
                    writer.write_event(Event::End(e))?;
                }
                Event::Text(text) if Self::in_marker_row(&stack) => {
                    let raw = text.unescape()?.into_owned();
                    match raw.trim().parse::<u32>() {
                        Ok(row) if row >= first_moved => {
                            let shifted = (row + count).to_string();
                            writer.write_event(Event::Text(BytesText::new(&shifted)))?;
                        }
                        _ => writer.write_event(Event::Text(text))?,
                    }
                }
                Event::Eof => break,
                other => writer.write_event(other)?,
            }
        }

        Ok(String::from_utf8(writer.into_inner().into_inner())?)
    }

    fn in_marker_row(stack: &[Vec<u8>]) -> bool {
        let n = stack.len();
        n >= 2
            && stack[n - 1].as_slice() == b"row"
            && matches!(stack[n - 2].as_slice(), b"from" | b"to")
    }

    // Appends a one-cell anchored picture (moves with cells, keeps its size).
    pub fn append_picture(
        xml: &str,
        anchor: &PictureAnchor,
        embed_rel_id: &str,
    ) -> Result<String, AppError> {
        let object_id = Self::next_object_id(xml)?;
        let mut out = Self::with_namespaces(xml)?;
        let close = out.rfind("</").ok_or_else(|| {
            AppError::InvalidXlsxFormat("drawing part has no closing root tag".to_string())
        })?;
        out.insert_str(close, &Self::one_cell_anchor_xml(object_id, anchor, embed_rel_id));
        Ok(out)
    }

    fn one_cell_anchor_xml(object_id: u32, anchor: &PictureAnchor, embed_rel_id: &str) -> String {
        let cx = u64::from(anchor.width_px) * EMU_PER_PIXEL;
        let cy = u64::from(anchor.height_px) * EMU_PER_PIXEL;
        let col = anchor.col.saturating_sub(1);
        let row = anchor.row.saturating_sub(1);
        format!(
            concat!(
                "<xdr:oneCellAnchor>",
                "<xdr:from><xdr:col>{col}</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>{row}</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>",
                r#"<xdr:ext cx="{cx}" cy="{cy}"/>"#,
                r#"<xdr:pic><xdr:nvPicPr><xdr:cNvPr id="{id}" name="Picture {id}"/><xdr:cNvPicPr><a:picLocks noChangeAspect="1"/></xdr:cNvPicPr></xdr:nvPicPr>"#,
                r#"<xdr:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></xdr:blipFill>"#,
                r#"<xdr:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></xdr:spPr></xdr:pic>"#,
                "<xdr:clientData/></xdr:oneCellAnchor>"
            ),
            col = col,
            row = row,
            cx = cx,
            cy = cy,
            id = object_id,
            rel = XmlUtil::escape_attr(embed_rel_id),
        )
    }

    fn next_object_id(xml: &str) -> Result<u32, AppError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let mut max_id = 0u32;

        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e)
                    if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"cNvPr") =>
                {
                    if let Some(id) = XmlUtil::attr_value(&e, b"id")? {
                        max_id = max_id.max(id.trim().parse().unwrap_or(0));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(max_id + 1)
    }

    // Existing drawings may bind other prefixes; the appended anchor uses xdr/a/r.
    fn with_namespaces(xml: &str) -> Result<String, AppError> {
        let root_start = Self::root_start(xml)?;
        let root_len = xml[root_start..].find('>').ok_or_else(|| {
            AppError::InvalidXlsxFormat("drawing root tag is not closed".to_string())
        })?;
        let root_end = root_start + root_len;
        let root_tag = &xml[root_start..root_end];

        let mut missing = String::new();
        for (prefix, ns) in [("xdr", XDR_NS), ("a", A_NS), ("r", REL_NS)] {
            if !root_tag.contains(&format!("xmlns:{prefix}=")) {
                missing.push_str(&format!(r#" xmlns:{prefix}="{ns}""#));
            }
        }

        let mut out = xml.to_string();
        let insert_at = if root_tag.ends_with('/') { root_end - 1 } else { root_end };
        out.insert_str(insert_at, &missing);

        // A self-closing root cannot take children.
        if root_tag.ends_with('/') {
            let name_end = root_tag
                .find(|c: char| c.is_whitespace() || c == '/')
                .unwrap_or(root_tag.len());
            let name = root_tag[1..name_end].to_string();
            let slash = insert_at + missing.len();
            out.replace_range(slash..slash + 2, &format!("></{name}>"));
        }
        Ok(out)
    }

    fn root_start(xml: &str) -> Result<usize, AppError> {
        let mut search = 0usize;
        while let Some(pos) = xml[search..].find('<') {
            let at = search + pos;
            let next = xml[at + 1..].chars().next();
            if !matches!(next, Some('?') | Some('!')) {
                return Ok(at);
            }
            search = at + 1;
        }
        Err(AppError::InvalidXlsxFormat(
            "drawing part has no root element".to_string(),
        ))
    }
}
