use crate::common::errors::AppError;
use crate::xlsx::cell_address::{CellAddress, CellRange};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum CellValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Empty,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::String(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_text(&self) -> String {
        match self {
            CellValue::String(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Empty => String::new(),
        }
    }
}

// Cell XML exactly as the template stored it, minus `r` and `s`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TemplateCell {
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) inner: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub style: Option<u32>,
    pub(crate) template: Option<TemplateCell>,
}

impl Cell {
    pub fn empty() -> Self {
        Self {
            value: CellValue::Empty,
            style: None,
            template: None,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.template.is_none() && self.style.is_none() && self.value.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub height: Option<f64>,
    pub custom_height: bool,
    pub style: Option<u32>,
    // Without it spreadsheet apps ignore `style`.
    pub custom_format: bool,
    pub(crate) extra_attrs: Vec<(String, String)>,
    pub cells: BTreeMap<u32, Cell>,
}

#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    pub(crate) prefix: Option<String>,
    pub(crate) head: String,
    pub(crate) tail: String,
    pub(crate) closing: String,
    pub(crate) rows: BTreeMap<u32, Row>,
    pub(crate) merges: Vec<CellRange>,
}

impl Worksheet {
    pub fn cell(&self, addr: CellAddress) -> Option<&Cell> {
        self.rows.get(&addr.row).and_then(|r| r.cells.get(&addr.col))
    }

    pub fn value(&self, addr: CellAddress) -> CellValue {
        self.cell(addr)
            .map(|c| c.value.clone())
            .unwrap_or(CellValue::Empty)
    }

    pub fn text(&self, addr: CellAddress) -> String {
        self.cell(addr)
            .map(|c| c.value.as_text())
            .unwrap_or_default()
    }

    pub fn style(&self, addr: CellAddress) -> Option<u32> {
        self.cell(addr).and_then(|c| c.style)
    }

    fn cell_mut(&mut self, addr: CellAddress) -> &mut Cell {
        self.rows
            .entry(addr.row)
            .or_default()
            .cells
            .entry(addr.col)
            .or_insert_with(Cell::empty)
    }

    pub fn set_value(&mut self, addr: CellAddress, value: CellValue) {
        let cell = self.cell_mut(addr);
        cell.value = value;
        cell.template = None;
    }

    pub fn set_style(&mut self, addr: CellAddress, style: Option<u32>) {
        self.cell_mut(addr).style = style;
    }

    pub fn row(&self, row: u32) -> Option<&Row> {
        self.rows.get(&row)
    }

    pub fn row_height(&self, row: u32) -> Option<f64> {
        self.rows.get(&row).and_then(|r| r.height)
    }

    pub fn set_row_height(&mut self, row: u32, height: f64) {
        let entry = self.rows.entry(row).or_default();
        entry.height = Some(height);
        entry.custom_height = true;
    }

    pub fn merges(&self) -> &[CellRange] {
        &self.merges
    }

    pub fn merge_at(&self, addr: CellAddress) -> Option<CellRange> {
        self.merges.iter().copied().find(|m| m.contains(addr))
    }

    // Registers a merged range. Single cells are accepted and ignored.
    pub fn merge(&mut self, range: CellRange) -> Result<bool, AppError> {
        if range.is_single_cell() {
            return Ok(false);
        }
        if let Some(existing) = self.merges.iter().find(|m| m.intersects(&range)) {
            return Err(AppError::MergeConflict(format!(
                "{range} overlaps existing merge {existing}"
            )));
        }
        self.merges.push(range);
        Ok(true)
    }

    // Removes every merge containing `addr`; returns whether anything was removed.
    pub fn unmerge_at(&mut self, addr: CellAddress) -> bool {
        let before = self.merges.len();
        self.merges.retain(|m| !m.contains(addr));
        before != self.merges.len()
    }

    // Inserts `count` blank rows before row `at`, shifting rows, merges and
    // the `ref`/`sqref` attributes of the elements after `sheetData`.
    pub fn insert_rows(&mut self, at: u32, count: u32) -> Result<(), AppError> {
        if count == 0 {
            return Ok(());
        }

        let moved = self.rows.split_off(&at);
        for (row, data) in moved {
            self.rows.insert(row + count, data);
        }

        for merge in &mut self.merges {
            *merge = merge.shifted_for_insert(at, count);
        }

        self.tail = crate::xlsx::sheet_xml::SheetXml::shift_tail_refs(&self.tail, at, count)?;
        Ok(())
    }

    pub fn last_row(&self) -> u32 {
        self.rows
            .iter()
            .rev()
            .find(|(_, r)| r.cells.values().any(|c| !c.is_blank()))
            .map(|(row, _)| *row)
            .unwrap_or(0)
    }

    pub fn used_range(&self) -> Option<CellRange> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (row, data) in &self.rows {
            for (col, cell) in &data.cells {
                if cell.is_blank() {
                    continue;
                }
                bounds = Some(match bounds {
                    None => (*row, *col, *row, *col),
                    Some((sr, sc, er, ec)) => (sr.min(*row), sc.min(*col), er.max(*row), ec.max(*col)),
                });
            }
        }
        for merge in &self.merges {
            bounds = Some(match bounds {
                None => (merge.start.row, merge.start.col, merge.end.row, merge.end.col),
                Some((sr, sc, er, ec)) => (
                    sr.min(merge.start.row),
                    sc.min(merge.start.col),
                    er.max(merge.end.row),
                    ec.max(merge.end.col),
                ),
            });
        }
        bounds.map(|(sr, sc, er, ec)| CellRange::from_bounds(sr, sc, er, ec))
    }

    // Raw XML following `sheetData` (merges excluded).
    pub fn tail_xml(&self) -> &str {
        &self.tail
    }

    pub(crate) fn set_tail_xml(&mut self, tail: String) {
        self.tail = tail;
    }

    pub(crate) fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }
}
