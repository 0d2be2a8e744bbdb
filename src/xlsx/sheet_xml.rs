use crate::common::errors::AppError;
use crate::xlsx::cell_address::{CellAddress, CellRange};
use crate::xlsx::relationships::REL_NS;
use crate::xlsx::shared_strings::SharedStrings;
use crate::xlsx::sheet_model::{Cell, CellValue, Row, TemplateCell, Worksheet};
use crate::xlsx::xml::XmlUtil;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeMap;
use std::io::{Cursor, Write};

// Elements that must follow <mergeCells> in CT_Worksheet order.
const MERGE_CELLS_SUCCESSORS: &[&str] = &[
    "phoneticPr",
    "conditionalFormatting",
    "dataValidations",
    "hyperlinks",
    "printOptions",
    "pageMargins",
    "pageSetup",
    "headerFooter",
    "rowBreaks",
    "colBreaks",
    "customProperties",
    "cellWatches",
    "ignoredErrors",
    "smartTags",
    "drawing",
    "legacyDrawing",
    "legacyDrawingHF",
    "drawingHF",
    "picture",
    "oleObjects",
    "controls",
    "webPublishItems",
    "tableParts",
    "extLst",
];

pub const DRAWING_SUCCESSORS: &[&str] = &[
    "legacyDrawing",
    "legacyDrawingHF",
    "drawingHF",
    "picture",
    "oleObjects",
    "controls",
    "webPublishItems",
    "tableParts",
    "extLst",
];

// (element, attribute) pairs holding cell references that follow row insertion.
const ROW_REF_ATTRS: &[(&[u8], &[u8])] = &[
    (b"hyperlink", b"ref"),
    (b"conditionalFormatting", b"sqref"),
    (b"dataValidation", b"sqref"),
    (b"protectedRange", b"sqref"),
    (b"autoFilter", b"ref"),
];

pub struct SheetXml;

impl SheetXml {
    pub fn parse(xml: &str, shared: &SharedStrings) -> Result<Worksheet, AppError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut prefix = None;
        let mut depth = 0usize;
        let mut head_end = None;
        let mut data_end = None;
        let mut tail_end = None;
        let mut merge_start = None;
        let mut merge_span: Option<(usize, usize)> = None;
        let mut in_merges = false;
        let mut rows = BTreeMap::new();
        let mut merges = Vec::new();

        loop {
            let before = reader.buffer_position() as usize;
            let event = reader.read_event()?;
            let after = reader.buffer_position() as usize;

            match event {
                Event::Start(e) => {
                    depth += 1;
                    let name = e.name();
                    if depth == 1 {
                        prefix = XmlUtil::prefix_of(name.as_ref());
                    } else if depth == 2 && XmlUtil::is_local_name_bytes(name.as_ref(), b"sheetData") {
                        head_end = Some(before);
                        rows = Self::parse_sheet_data(&mut reader, xml, shared)?;
                        depth -= 1;
                        data_end = Some(reader.buffer_position() as usize);
                    } else if depth == 2
                        && XmlUtil::is_local_name_bytes(name.as_ref(), b"mergeCells")
                    {
                        merge_start = Some(before);
                        in_merges = true;
                    } else if in_merges && XmlUtil::is_local_name_bytes(name.as_ref(), b"mergeCell")
                    {
                        Self::push_merge(&e, &mut merges)?;
                    }
                }
                Event::Empty(e) => {
                    let name = e.name();
                    if depth == 1 && XmlUtil::is_local_name_bytes(name.as_ref(), b"sheetData") {
                        head_end = Some(before);
                        data_end = Some(after);
                    } else if depth == 1
                        && XmlUtil::is_local_name_bytes(name.as_ref(), b"mergeCells")
                    {
                        merge_span = Some((before, after));
                    } else if in_merges && XmlUtil::is_local_name_bytes(name.as_ref(), b"mergeCell")
                    {
                        Self::push_merge(&e, &mut merges)?;
                    }
                }
                Event::End(e) => {
                    if depth == 2 && XmlUtil::is_local_name_bytes(e.name().as_ref(), b"mergeCells") {
                        if let Some(start) = merge_start.take() {
                            merge_span = Some((start, after));
                        }
                        in_merges = false;
                    } else if depth == 1 {
                        tail_end = Some(before);
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        let (Some(head_end), Some(data_end), Some(tail_end)) = (head_end, data_end, tail_end) else {
            return Err(AppError::InvalidXlsxFormat(
                "worksheet has no sheetData".to_string(),
            ));
        };

        let tail = match merge_span {
            Some((start, end)) if start >= data_end && end <= tail_end => {
                format!("{}{}", &xml[data_end..start], &xml[end..tail_end])
            }
            _ => xml[data_end..tail_end].to_string(),
        };

        Ok(Worksheet {
            prefix,
            head: xml[..head_end].to_string(),
            tail,
            closing: xml[tail_end..].to_string(),
            rows,
            merges,
        })
    }

    pub fn render(sheet: &Worksheet) -> Result<String, AppError> {
        let prefix = sheet.prefix();
        let mut out = String::with_capacity(sheet.head.len() + sheet.tail.len() + 4096);
        out.push_str(&Self::with_dimension(&sheet.head, prefix, sheet.used_range()));
        out.push_str(&Self::render_sheet_data(sheet)?);

        if sheet.merges.is_empty() {
            out.push_str(&sheet.tail);
        } else {
            let merges = Self::render_merges(prefix, &sheet.merges);
            out.push_str(&Self::insert_tail_element(
                &sheet.tail,
                &merges,
                MERGE_CELLS_SUCCESSORS,
            )?);
        }

        out.push_str(&sheet.closing);
        Ok(out)
    }

    fn push_merge(e: &BytesStart<'_>, merges: &mut Vec<CellRange>) -> Result<(), AppError> {
        if let Some(reference) = XmlUtil::attr_value(e, b"ref")? {
            merges.push(CellRange::parse(&reference)?);
        }
        Ok(())
    }

    fn parse_sheet_data(
        reader: &mut Reader<&[u8]>,
        xml: &str,
        shared: &SharedStrings,
    ) -> Result<BTreeMap<u32, Row>, AppError> {
        let mut rows: BTreeMap<u32, Row> = BTreeMap::new();
        let mut current: Option<u32> = None;
        let mut last_row = 0u32;
        let mut last_col = 0u32;

        loop {
            match reader.read_event()? {
                Event::Start(e) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"row") => {
                    let (number, row) = Self::parse_row(&e, last_row)?;
                    rows.insert(number, row);
                    current = Some(number);
                    last_row = number;
                    last_col = 0;
                }
                Event::Empty(e) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"row") => {
                    let (number, row) = Self::parse_row(&e, last_row)?;
                    rows.insert(number, row);
                    last_row = number;
                }
                Event::End(e) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"row") => {
                    current = None;
                }
                Event::Start(e) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"c") => {
                    let row_number = current.ok_or_else(|| {
                        AppError::InvalidXlsxFormat("cell outside of a row".to_string())
                    })?;
                    let (col, style, attrs) = Self::parse_cell_attrs(&e, row_number, last_col)?;
                    let body = Self::read_cell_body(reader, xml)?;
                    let value = Self::decode_value(&attrs, body.v, body.inline, shared);
                    last_col = col;
                    if let Some(row) = rows.get_mut(&row_number) {
                        row.cells.insert(
                            col,
                            Cell {
                                value,
                                style,
                                template: Some(TemplateCell {
                                    attrs,
                                    inner: body.inner,
                                }),
                            },
                        );
                    }
                }
                Event::Empty(e) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"c") => {
                    let row_number = current.ok_or_else(|| {
                        AppError::InvalidXlsxFormat("cell outside of a row".to_string())
                    })?;
                    let (col, style, attrs) = Self::parse_cell_attrs(&e, row_number, last_col)?;
                    last_col = col;
                    if let Some(row) = rows.get_mut(&row_number) {
                        row.cells.insert(
                            col,
                            Cell {
                                value: CellValue::Empty,
                                style,
                                template: Some(TemplateCell {
                                    attrs,
                                    inner: String::new(),
                                }),
                            },
                        );
                    }
                }
                Event::End(e) if XmlUtil::is_local_name_bytes(e.name().as_ref(), b"sheetData") => {
                    return Ok(rows);
                }
                Event::Eof => {
                    return Err(AppError::InvalidXlsxFormat(
                        "unterminated sheetData".to_string(),
                    ))
                }
                _ => {}
            }
        }
    }

    fn parse_row(e: &BytesStart<'_>, previous: u32) -> Result<(u32, Row), AppError> {
        let mut number = previous + 1;
        let mut row = Row::default();

        for (key, value) in XmlUtil::attrs(e)? {
            match key.as_str() {
                "r" => {
                    number = value.trim().parse().map_err(|_| {
                        AppError::InvalidXlsxFormat(format!("invalid row number: {value}"))
                    })?;
                }
                "ht" => row.height = value.trim().parse().ok(),
                "customHeight" => row.custom_height = value == "1" || value == "true",
                "s" => row.style = value.trim().parse().ok(),
                "customFormat" => row.custom_format = value == "1" || value == "true",
                // Recomputed on render.
                "spans" => {}
                _ => row.extra_attrs.push((key, value)),
            }
        }

        Ok((number, row))
    }

    fn parse_cell_attrs(
        e: &BytesStart<'_>,
        row: u32,
        previous_col: u32,
    ) -> Result<(u32, Option<u32>, Vec<(String, String)>), AppError> {
        let mut col = previous_col + 1;
        let mut style = None;
        let mut attrs = Vec::new();

        for (key, value) in XmlUtil::attrs(e)? {
            match key.as_str() {
                "r" => {
                    let addr = CellAddress::parse(&value)?;
                    if addr.row != row {
                        return Err(AppError::InvalidXlsxFormat(format!(
                            "cell {value} listed under row {row}"
                        )));
                    }
                    col = addr.col;
                }
                "s" => style = value.trim().parse().ok(),
                _ => attrs.push((key, value)),
            }
        }

        Ok((col, style, attrs))
    }

    fn read_cell_body(reader: &mut Reader<&[u8]>, xml: &str) -> Result<CellBody, AppError> {
        let inner_start = reader.buffer_position() as usize;
        let mut depth = 0usize;
        let mut v: Option<String> = None;
        let mut inline: Option<String> = None;
        let mut in_v = false;
        let mut in_is = false;
        let mut in_t = false;
        let mut phonetic_depth = 0usize;

        loop {
            let before = reader.buffer_position() as usize;
            match reader.read_event()? {
                Event::Start(e) => {
                    depth += 1;
                    let name = e.name();
                    let local = XmlUtil::local_name(name.as_ref());
                    match local {
                        b"v" => {
                            in_v = true;
                            v.get_or_insert_with(String::new);
                        }
                        b"is" => in_is = true,
                        b"rPh" => phonetic_depth += 1,
                        b"t" if in_is && phonetic_depth == 0 => {
                            in_t = true;
                            inline.get_or_insert_with(String::new);
                        }
                        _ => {}
                    }
                }
                Event::Empty(e) => {
                    if in_is && XmlUtil::is_local_name_bytes(e.name().as_ref(), b"t") {
                        inline.get_or_insert_with(String::new);
                    }
                }
                Event::End(e) => {
                    if depth == 0 {
                        return Ok(CellBody {
                            inner: xml[inner_start..before].to_string(),
                            v,
                            inline,
                        });
                    }
                    depth -= 1;
                    let name = e.name();
                    match XmlUtil::local_name(name.as_ref()) {
                        b"v" => in_v = false,
                        b"is" => in_is = false,
                        b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                        b"t" => in_t = false,
                        _ => {}
                    }
                }
                Event::Text(text) => {
                    if in_v {
                        if let Some(v) = v.as_mut() {
                            v.push_str(&text.unescape()?);
                        }
                    } else if in_t {
                        if let Some(inline) = inline.as_mut() {
                            inline.push_str(&text.unescape()?);
                        }
                    }
                }
                Event::Eof => {
                    return Err(AppError::InvalidXlsxFormat("unterminated cell".to_string()))
                }
                _ => {}
            }
        }
    }

    fn decode_value(
        attrs: &[(String, String)],
        v: Option<String>,
        inline: Option<String>,
        shared: &SharedStrings,
    ) -> CellValue {
        let cell_type = attrs
            .iter()
            .find(|(k, _)| k == "t")
            .map(|(_, value)| value.as_str());

        match cell_type {
            Some("s") => v
                .and_then(|idx| idx.trim().parse::<usize>().ok())
                .and_then(|idx| shared.get(idx))
                .map(CellValue::text)
                .unwrap_or(CellValue::Empty),
            Some("inlineStr") => inline.map(CellValue::text).unwrap_or(CellValue::Empty),
            Some("str") | Some("e") => v.map(CellValue::text).unwrap_or(CellValue::Empty),
            Some("b") => v
                .map(|b| CellValue::Boolean(b.trim() == "1"))
                .unwrap_or(CellValue::Empty),
            _ => v
                .and_then(|n| n.trim().parse::<f64>().ok())
                .map(CellValue::Number)
                .unwrap_or(CellValue::Empty),
        }
    }

    fn render_sheet_data(sheet: &Worksheet) -> Result<String, AppError> {
        let prefix = sheet.prefix();
        let sheet_data_tag = XmlUtil::qualified(prefix, "sheetData");
        let row_tag = XmlUtil::qualified(prefix, "row");
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        let rows: Vec<(&u32, &Row)> = sheet
            .rows
            .iter()
            .filter(|(_, row)| Self::row_has_content(row))
            .collect();

        if rows.is_empty() {
            writer.write_event(Event::Empty(BytesStart::new(sheet_data_tag.as_str())))?;
        } else {
            writer.write_event(Event::Start(BytesStart::new(sheet_data_tag.as_str())))?;
            for (number, row) in rows {
                let mut start = BytesStart::new(row_tag.as_str());
                start.push_attribute(("r", number.to_string().as_str()));
                if let Some(style) = row.style {
                    start.push_attribute(("s", style.to_string().as_str()));
                    if row.custom_format {
                        start.push_attribute(("customFormat", "1"));
                    }
                }
                if let Some(height) = row.height {
                    start.push_attribute(("ht", height.to_string().as_str()));
                    if row.custom_height {
                        start.push_attribute(("customHeight", "1"));
                    }
                }
                for (key, value) in &row.extra_attrs {
                    start.push_attribute((key.as_str(), value.as_str()));
                }

                let cells: Vec<(&u32, &Cell)> =
                    row.cells.iter().filter(|(_, c)| !c.is_blank()).collect();
                if cells.is_empty() {
                    writer.write_event(Event::Empty(start))?;
                    continue;
                }

                writer.write_event(Event::Start(start))?;
                for (col, cell) in cells {
                    Self::write_cell(&mut writer, prefix, CellAddress::new(*number, *col), cell)?;
                }
                writer.write_event(Event::End(BytesEnd::new(row_tag.as_str())))?;
            }
            writer.write_event(Event::End(BytesEnd::new(sheet_data_tag.as_str())))?;
        }

        Ok(String::from_utf8(writer.into_inner().into_inner())?)
    }

    fn row_has_content(row: &Row) -> bool {
        row.height.is_some()
            || row.style.is_some()
            || !row.extra_attrs.is_empty()
            || row.cells.values().any(|c| !c.is_blank())
    }

    fn write_cell(
        writer: &mut Writer<Cursor<Vec<u8>>>,
        prefix: Option<&str>,
        addr: CellAddress,
        cell: &Cell,
    ) -> Result<(), AppError> {
        let cell_tag = XmlUtil::qualified(prefix, "c");
        let mut start = BytesStart::new(cell_tag.as_str());
        start.push_attribute(("r", addr.to_a1().as_str()));
        if let Some(style) = cell.style {
            start.push_attribute(("s", style.to_string().as_str()));
        }

        if let Some(template) = &cell.template {
            for (key, value) in &template.attrs {
                start.push_attribute((key.as_str(), value.as_str()));
            }
            if template.inner.is_empty() {
                writer.write_event(Event::Empty(start))?;
            } else {
                writer.write_event(Event::Start(start))?;
                writer.get_mut().write_all(template.inner.as_bytes())?;
                writer.write_event(Event::End(BytesEnd::new(cell_tag.as_str())))?;
            }
            return Ok(());
        }

        let value_tag = XmlUtil::qualified(prefix, "v");
        match &cell.value {
            CellValue::Empty => {
                writer.write_event(Event::Empty(start))?;
            }
            CellValue::String(text) => {
                let is_tag = XmlUtil::qualified(prefix, "is");
                let t_tag = XmlUtil::qualified(prefix, "t");
                start.push_attribute(("t", "inlineStr"));
                writer.write_event(Event::Start(start))?;
                writer.write_event(Event::Start(BytesStart::new(is_tag.as_str())))?;
                let mut t = BytesStart::new(t_tag.as_str());
                t.push_attribute(("xml:space", "preserve"));
                writer.write_event(Event::Start(t))?;
                let clean = XmlUtil::sanitize_text(text);
                writer.write_event(Event::Text(BytesText::new(&clean)))?;
                writer.write_event(Event::End(BytesEnd::new(t_tag.as_str())))?;
                writer.write_event(Event::End(BytesEnd::new(is_tag.as_str())))?;
                writer.write_event(Event::End(BytesEnd::new(cell_tag.as_str())))?;
            }
            CellValue::Number(number) => {
                writer.write_event(Event::Start(start))?;
                writer.write_event(Event::Start(BytesStart::new(value_tag.as_str())))?;
                writer.write_event(Event::Text(BytesText::new(&number.to_string())))?;
                writer.write_event(Event::End(BytesEnd::new(value_tag.as_str())))?;
                writer.write_event(Event::End(BytesEnd::new(cell_tag.as_str())))?;
            }
            CellValue::Boolean(flag) => {
                start.push_attribute(("t", "b"));
                writer.write_event(Event::Start(start))?;
                writer.write_event(Event::Start(BytesStart::new(value_tag.as_str())))?;
                writer.write_event(Event::Text(BytesText::new(if *flag { "1" } else { "0" })))?;
                writer.write_event(Event::End(BytesEnd::new(value_tag.as_str())))?;
                writer.write_event(Event::End(BytesEnd::new(cell_tag.as_str())))?;
            }
        }
        Ok(())
    }

    fn render_merges(prefix: Option<&str>, merges: &[CellRange]) -> String {
        let mut out = format!(
            r#"<{} count="{}">"#,
            XmlUtil::qualified(prefix, "mergeCells"),
            merges.len()
        );
        let merge_tag = XmlUtil::qualified(prefix, "mergeCell");
        for merge in merges {
            out.push_str(&format!(r#"<{merge_tag} ref="{merge}"/>"#));
        }
        out.push_str(&format!("</{}>", XmlUtil::qualified(prefix, "mergeCells")));
        out
    }

    fn with_dimension(head: &str, prefix: Option<&str>, used: Option<CellRange>) -> String {
        let tag = format!("<{}", XmlUtil::qualified(prefix, "dimension"));
        let reference = used.map(|r| r.to_a1()).unwrap_or_else(|| "A1".to_string());

        let Some(tag_start) = head.find(&tag) else {
            return head.to_string();
        };
        let Some(tag_len) = head[tag_start..].find('>') else {
            return head.to_string();
        };
        let tag_text = &head[tag_start..tag_start + tag_len];
        let Some(ref_pos) = tag_text.find("ref=\"") else {
            return head.to_string();
        };
        let value_start = tag_start + ref_pos + 5;
        let Some(value_len) = head[value_start..].find('"') else {
            return head.to_string();
        };

        let mut out = head.to_string();
        out.replace_range(value_start..value_start + value_len, &reference);
        out
    }

    pub fn ensure_relationship_namespace(sheet: &mut Worksheet) {
        let root = format!("<{}", XmlUtil::qualified(sheet.prefix(), "worksheet"));
        let Some(root_start) = sheet.head.find(&root) else {
            return;
        };
        let Some(root_len) = sheet.head[root_start..].find('>') else {
            return;
        };
        let root_end = root_start + root_len;
        if sheet.head[root_start..root_end].contains("xmlns:r=") {
            return;
        }
        sheet
            .head
            .insert_str(root_end, &format!(r#" xmlns:r="{REL_NS}""#));
    }

    pub fn shift_tail_refs(tail: &str, at: u32, count: u32) -> Result<String, AppError> {
        if tail.trim().is_empty() {
            return Ok(tail.to_string());
        }

        let mut reader = Reader::from_str(tail);
        reader.config_mut().trim_text(false);
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        loop {
            match reader.read_event()? {
                Event::Start(e) => match Self::shifted_ref_attrs(&e, at, count)? {
                    Some(shifted) => writer.write_event(Event::Start(shifted))?,
                    None => writer.write_event(Event::Start(e))?,
                },
                Event::Empty(e) => match Self::shifted_ref_attrs(&e, at, count)? {
                    Some(shifted) => writer.write_event(Event::Empty(shifted))?,
                    None => writer.write_event(Event::Empty(e))?,
                },
                Event::Eof => break,
                other => writer.write_event(other)?,
            }
        }

        Ok(String::from_utf8(writer.into_inner().into_inner())?)
    }

    fn shifted_ref_attrs(
        e: &BytesStart<'_>,
        at: u32,
        count: u32,
    ) -> Result<Option<BytesStart<'static>>, AppError> {
        let name = e.name();
        let Some((_, attr)) = ROW_REF_ATTRS
            .iter()
            .find(|(element, _)| XmlUtil::is_local_name_bytes(name.as_ref(), element))
        else {
            return Ok(None);
        };

        let mut rewritten: Option<BytesStart<'static>> = None;
        for (key, value) in XmlUtil::attrs(e)? {
            if !XmlUtil::is_local_name_bytes(key.as_bytes(), attr) {
                continue;
            }
            let shifted = value
                .split_whitespace()
                .map(|part| match CellRange::parse(part) {
                    Ok(range) => range.shifted_for_insert(at, count).to_a1(),
                    // Whole-column references and the like are row independent.
                    Err(_) => part.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" ");
            if shifted != value {
                rewritten = Some(XmlUtil::with_attr(e, &key, &shifted)?);
            }
        }
        Ok(rewritten)
    }

    // Splices `element` into the tail before the first top-level element named
    // in `successors`, or at the end when none is present.
    pub fn insert_tail_element(
        tail: &str,
        element: &str,
        successors: &[&str],
    ) -> Result<String, AppError> {
        let position = Self::first_top_level(tail, successors)?.unwrap_or(tail.len());
        let mut out = String::with_capacity(tail.len() + element.len());
        out.push_str(&tail[..position]);
        out.push_str(element);
        out.push_str(&tail[position..]);
        Ok(out)
    }

    pub fn tail_element_attr(
        tail: &str,
        local: &str,
        attr: &str,
    ) -> Result<Option<String>, AppError> {
        let mut reader = Reader::from_str(tail);
        reader.config_mut().trim_text(false);
        let mut depth = 0usize;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    if depth == 0 && XmlUtil::is_local_name_bytes(e.name().as_ref(), local.as_bytes())
                    {
                        return XmlUtil::attr_value(&e, attr.as_bytes());
                    }
                    depth += 1;
                }
                Event::Empty(e) => {
                    if depth == 0 && XmlUtil::is_local_name_bytes(e.name().as_ref(), local.as_bytes())
                    {
                        return XmlUtil::attr_value(&e, attr.as_bytes());
                    }
                }
                Event::End(_) => depth = depth.saturating_sub(1),
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    fn first_top_level(tail: &str, names: &[&str]) -> Result<Option<usize>, AppError> {
        let mut reader = Reader::from_str(tail);
        reader.config_mut().trim_text(false);
        let mut depth = 0usize;

        loop {
            let before = reader.buffer_position() as usize;
            match reader.read_event()? {
                Event::Start(e) => {
                    if depth == 0 && Self::is_one_of(e.name().as_ref(), names) {
                        return Ok(Some(before));
                    }
                    depth += 1;
                }
                Event::Empty(e) => {
                    if depth == 0 && Self::is_one_of(e.name().as_ref(), names) {
                        return Ok(Some(before));
                    }
                }
                Event::End(_) => depth = depth.saturating_sub(1),
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    fn is_one_of(name: &[u8], names: &[&str]) -> bool {
        names
            .iter()
            .any(|n| XmlUtil::is_local_name_bytes(name, n.as_bytes()))
    }
}

struct CellBody {
    inner: String,
    v: Option<String>,
    inline: Option<String>,
}
