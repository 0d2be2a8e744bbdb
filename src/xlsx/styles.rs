use crate::common::errors::AppError;
use crate::xlsx::xml::XmlUtil;
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use std::collections::HashMap;
use std::io::{Cursor, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderWeight {
    Thin,
    Medium,
}

impl BorderWeight {
    fn as_str(self) -> &'static str {
        match self {
            BorderWeight::Thin => "thin",
            BorderWeight::Medium => "medium",
        }
    }

    pub fn max(a: Option<Self>, b: Option<Self>) -> Option<Self> {
        match (a, b) {
            (Some(BorderWeight::Medium), _) | (_, Some(BorderWeight::Medium)) => {
                Some(BorderWeight::Medium)
            }
            (Some(BorderWeight::Thin), _) | (_, Some(BorderWeight::Thin)) => Some(BorderWeight::Thin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizontalAlign {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalAlign {
    Top,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FontStyle {
    pub name: String,
    pub size: f64,
    pub bold: bool,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BorderStyle {
    pub top: Option<BorderWeight>,
    pub right: Option<BorderWeight>,
    pub bottom: Option<BorderWeight>,
    pub left: Option<BorderWeight>,
    pub color: Option<String>,
}

impl BorderStyle {
    pub fn all(weight: BorderWeight, color: Option<String>) -> Self {
        Self {
            top: Some(weight),
            right: Some(weight),
            bottom: Some(weight),
            left: Some(weight),
            color,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alignment {
    pub horizontal: Option<HorizontalAlign>,
    pub vertical: Option<VerticalAlign>,
    pub wrap_text: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellStyle {
    pub font: FontStyle,
    // Solid pattern fill, ARGB.
    pub fill: Option<String>,
    pub border: BorderStyle,
    pub alignment: Alignment,
}

#[derive(Debug, Clone)]
pub struct StyleSheet {
    xml: String,
    prefix: Option<String>,
    existing: Counts,
    fonts: Vec<String>,
    fills: Vec<String>,
    borders: Vec<String>,
    xfs: Vec<String>,
    font_ids: HashMap<String, u32>,
    fill_ids: HashMap<String, u32>,
    border_ids: HashMap<String, u32>,
    xf_ids: HashMap<String, u32>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Counts {
    fonts: u32,
    fills: u32,
    borders: u32,
    cell_xfs: u32,
}

impl StyleSheet {
    pub fn parse(xml: &str) -> Result<Self, AppError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut prefix = None;
        let mut counts = Counts::default();
        let mut stack: Vec<Vec<u8>> = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = e.name();
                    if stack.is_empty() {
                        prefix = XmlUtil::prefix_of(name.as_ref());
                    }
                    Self::count_child(&stack, name.as_ref(), &mut counts);
                    stack.push(XmlUtil::local_name(name.as_ref()).to_vec());
                }
                Event::Empty(e) => {
                    Self::count_child(&stack, e.name().as_ref(), &mut counts);
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        for (local, found) in [("fonts", counts.fonts), ("fills", counts.fills), ("borders", counts.borders), ("cellXfs", counts.cell_xfs)] {
            if found == 0 {
                return Err(AppError::InvalidXlsxFormat(format!(
                    "styles part has no {local} entries"
                )));
            }
        }

        Ok(Self {
            xml: xml.to_string(),
            prefix,
            existing: counts,
            fonts: Vec::new(),
            fills: Vec::new(),
            borders: Vec::new(),
            xfs: Vec::new(),
            font_ids: HashMap::new(),
            fill_ids: HashMap::new(),
            border_ids: HashMap::new(),
            xf_ids: HashMap::new(),
        })
    }

    fn count_child(stack: &[Vec<u8>], name: &[u8], counts: &mut Counts) {
        // Direct children of the four collections only (stack = [styleSheet, collection]).
        if stack.len() != 2 {
            return;
        }
        let parent = stack[1].as_slice();
        let local = XmlUtil::local_name(name);
        match (parent, local) {
            (b"fonts", b"font") => counts.fonts += 1,
            (b"fills", b"fill") => counts.fills += 1,
            (b"borders", b"border") => counts.borders += 1,
            (b"cellXfs", b"xf") => counts.cell_xfs += 1,
            _ => {}
        }
    }

    pub fn register(&mut self, style: &CellStyle) -> u32 {
        let font_id = Self::intern(
            self.font_xml(&style.font),
            self.existing.fonts,
            &mut self.fonts,
            &mut self.font_ids,
        );
        let fill_id = match &style.fill {
            Some(argb) => Self::intern(
                self.fill_xml(argb),
                self.existing.fills,
                &mut self.fills,
                &mut self.fill_ids,
            ),
            None => 0,
        };
        let border_id = Self::intern(
            self.border_xml(&style.border),
            self.existing.borders,
            &mut self.borders,
            &mut self.border_ids,
        );
        let xf = self.xf_xml(font_id, fill_id, border_id, &style.alignment);
        Self::intern(xf, self.existing.cell_xfs, &mut self.xfs, &mut self.xf_ids)
    }

    fn intern(xml: String, base: u32, list: &mut Vec<String>, ids: &mut HashMap<String, u32>) -> u32 {
        if let Some(id) = ids.get(&xml) {
            return *id;
        }
        let id = base + list.len() as u32;
        list.push(xml.clone());
        ids.insert(xml, id);
        id
    }

    fn tag(&self, local: &str) -> String {
        XmlUtil::qualified(self.prefix.as_deref(), local)
    }

    fn font_xml(&self, font: &FontStyle) -> String {
        let mut out = format!("<{}>", self.tag("font"));
        if font.bold {
            out.push_str(&format!("<{}/>", self.tag("b")));
        }
        out.push_str(&format!(r#"<{} val="{}"/>"#, self.tag("sz"), font.size));
        if let Some(color) = &font.color {
            out.push_str(&format!(
                r#"<{} rgb="{}"/>"#,
                self.tag("color"),
                XmlUtil::escape_attr(color)
            ));
        }
        out.push_str(&format!(
            r#"<{} val="{}"/>"#,
            self.tag("name"),
            XmlUtil::escape_attr(&font.name)
        ));
        out.push_str(&format!(r#"<{} val="2"/>"#, self.tag("family")));
        out.push_str(&format!("</{}>", self.tag("font")));
        out
    }

    fn fill_xml(&self, argb: &str) -> String {
        format!(
            r#"<{fill}><{pattern} patternType="solid"><{fg} rgb="{color}"/><{bg} indexed="64"/></{pattern}></{fill}>"#,
            fill = self.tag("fill"),
            pattern = self.tag("patternFill"),
            fg = self.tag("fgColor"),
            bg = self.tag("bgColor"),
            color = XmlUtil::escape_attr(argb),
        )
    }

    fn border_xml(&self, border: &BorderStyle) -> String {
        let mut out = format!("<{}>", self.tag("border"));
        // CT_Border child order.
        for (side, weight) in [
            ("left", border.left),
            ("right", border.right),
            ("top", border.top),
            ("bottom", border.bottom),
        ] {
            let tag = self.tag(side);
            match weight {
                Some(weight) => {
                    out.push_str(&format!(r#"<{tag} style="{}">"#, weight.as_str()));
                    match &border.color {
                        Some(color) => out.push_str(&format!(
                            r#"<{} rgb="{}"/>"#,
                            self.tag("color"),
                            XmlUtil::escape_attr(color)
                        )),
                        None => out.push_str(&format!(r#"<{} indexed="64"/>"#, self.tag("color"))),
                    }
                    out.push_str(&format!("</{tag}>"));
                }
                None => out.push_str(&format!("<{tag}/>")),
            }
        }
        out.push_str(&format!("<{}/>", self.tag("diagonal")));
        out.push_str(&format!("</{}>", self.tag("border")));
        out
    }

    fn xf_xml(&self, font_id: u32, fill_id: u32, border_id: u32, alignment: &Alignment) -> String {
        let mut out = format!(
            r#"<{} numFmtId="0" fontId="{font_id}" fillId="{fill_id}" borderId="{border_id}" xfId="0" applyFont="1" applyFill="1" applyBorder="1" applyAlignment="1">"#,
            self.tag("xf")
        );
        let mut align = format!("<{}", self.tag("alignment"));
        if let Some(horizontal) = alignment.horizontal {
            let value = match horizontal {
                HorizontalAlign::Left => "left",
                HorizontalAlign::Center => "center",
            };
            align.push_str(&format!(r#" horizontal="{value}""#));
        }
        if let Some(vertical) = alignment.vertical {
            let value = match vertical {
                VerticalAlign::Top => "top",
                VerticalAlign::Center => "center",
            };
            align.push_str(&format!(r#" vertical="{value}""#));
        }
        if alignment.wrap_text {
            align.push_str(r#" wrapText="1""#);
        }
        align.push_str("/>");
        out.push_str(&align);
        out.push_str(&format!("</{}>", self.tag("xf")));
        out
    }

    pub fn into_xml(self) -> Result<String, AppError> {
        if self.xfs.is_empty() {
            return Ok(self.xml);
        }

        let mut reader = Reader::from_str(&self.xml);
        reader.config_mut().trim_text(false);
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        let mut depth = 0usize;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    depth += 1;
                    let updated = if depth == 2 {
                        let name = e.name();
                        match self.section(XmlUtil::local_name(name.as_ref())) {
                            Some((base, added)) if !added.is_empty() => Some(XmlUtil::with_attr(
                                &e,
                                "count",
                                &(base + added.len() as u32).to_string(),
                            )?),
                            _ => None,
                        }
                    } else {
                        None
                    };
                    match updated {
                        Some(start) => writer.write_event(Event::Start(start))?,
                        None => writer.write_event(Event::Start(e))?,
                    }
                }
                Event::End(e) => {
                    if depth == 2 {
                        let name = e.name();
                        if let Some((_, added)) = self.section(XmlUtil::local_name(name.as_ref())) {
                            for entry in added {
                                writer.get_mut().write_all(entry.as_bytes())?;
                            }
                        }
                    }
                    depth = depth.saturating_sub(1);
                    writer.write_event(Event::End(e))?;
                }
                Event::Eof => break,
                other => writer.write_event(other)?,
            }
        }

        Ok(String::from_utf8(writer.into_inner().into_inner())?)
    }

    fn section(&self, local: &[u8]) -> Option<(u32, &[String])> {
        match local {
            b"fonts" => Some((self.existing.fonts, &self.fonts)),
            b"fills" => Some((self.existing.fills, &self.fills)),
            b"borders" => Some((self.existing.borders, &self.borders)),
            b"cellXfs" => Some((self.existing.cell_xfs, &self.xfs)),
            _ => None,
        }
    }
}
