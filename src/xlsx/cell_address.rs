use crate::common::errors::AppError;
use std::fmt;

// Last column Excel accepts (XFD).
pub const MAX_COLUMN: u32 = 16_384;
pub const MAX_ROW: u32 = 1_048_576;

pub fn column_letter_to_index(letter: &str) -> Result<u32, AppError> {
    let trimmed = letter.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidCellAddress(
            "column label is empty".to_string(),
        ));
    }

    let mut index: u32 = 0;
    for ch in trimmed.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(AppError::InvalidCellAddress(letter.to_string()));
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
        index = index
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .filter(|v| *v <= MAX_COLUMN)
            .ok_or_else(|| AppError::InvalidCellAddress(letter.to_string()))?;
    }
    Ok(index)
}

pub fn column_index_to_letter(index: u32) -> Result<String, AppError> {
    if index == 0 || index > MAX_COLUMN {
        return Err(AppError::InvalidCellAddress(format!(
            "column index out of range: {index}"
        )));
    }
    let mut col = index;
    let mut letters = String::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.insert(0, (b'A' + rem as u8) as char);
        col = (col - 1) / 26;
    }
    Ok(letters)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    pub row: u32,
    pub col: u32,
}

impl CellAddress {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    // Parses A1 notation (B3, $AA$10) into 1-based indexes.
    pub fn parse(input: &str) -> Result<Self, AppError> {
        if input.trim().is_empty() {
            return Err(AppError::InvalidCellAddress("address is empty".to_string()));
        }

        let mut letters = String::new();
        let mut digits = String::new();
        for ch in input.trim().chars() {
            if ch == '$' {
                continue;
            }
            if ch.is_ascii_alphabetic() {
                if !digits.is_empty() {
                    return Err(AppError::InvalidCellAddress(input.to_string()));
                }
                letters.push(ch);
            } else if ch.is_ascii_digit() {
                digits.push(ch);
            } else {
                return Err(AppError::InvalidCellAddress(input.to_string()));
            }
        }

        if letters.is_empty() || digits.is_empty() {
            return Err(AppError::InvalidCellAddress(input.to_string()));
        }

        let col = column_letter_to_index(&letters)?;
        let row: u32 = digits
            .parse()
            .map_err(|_| AppError::InvalidCellAddress(input.to_string()))?;
        if row == 0 || row > MAX_ROW {
            return Err(AppError::InvalidCellAddress(input.to_string()));
        }

        Ok(Self { row, col })
    }

    pub fn to_a1(self) -> String {
        let letters = column_index_to_letter(self.col).unwrap_or_default();
        format!("{}{}", letters, self.row)
    }

    pub fn offset_rows(self, delta: u32) -> Self {
        Self {
            row: self.row + delta,
            col: self.col,
        }
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

// An inclusive rectangle of cells, always stored with `start <= end` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl CellRange {
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        Self {
            start: CellAddress::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellAddress::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    pub fn from_bounds(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> Self {
        Self::new(
            CellAddress::new(start_row, start_col),
            CellAddress::new(end_row, end_col),
        )
    }

    pub fn column_span(col: u32, start_row: u32, end_row: u32) -> Self {
        Self::from_bounds(start_row, col, end_row, col)
    }

    pub fn parse(input: &str) -> Result<Self, AppError> {
        match input.trim().split_once(':') {
            Some((a, b)) => Ok(Self::new(CellAddress::parse(a)?, CellAddress::parse(b)?)),
            None => {
                let single = CellAddress::parse(input)?;
                Ok(Self::new(single, single))
            }
        }
    }

    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, addr: CellAddress) -> bool {
        addr.row >= self.start.row
            && addr.row <= self.end.row
            && addr.col >= self.start.col
            && addr.col <= self.end.col
    }

    pub fn intersects(&self, other: &CellRange) -> bool {
        self.start.row <= other.end.row
            && other.start.row <= self.end.row
            && self.start.col <= other.end.col
            && other.start.col <= self.end.col
    }

    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    pub fn cells(&self) -> impl Iterator<Item = CellAddress> + '_ {
        (self.start.row..=self.end.row).flat_map(move |row| {
            (self.start.col..=self.end.col).map(move |col| CellAddress::new(row, col))
        })
    }

    // Applies an insertion of `count` rows at `at`: ranges below move, ranges crossing grow.
    pub fn shifted_for_insert(self, at: u32, count: u32) -> Self {
        if self.start.row >= at {
            Self {
                start: self.start.offset_rows(count),
                end: self.end.offset_rows(count),
            }
        } else if self.end.row >= at {
            Self {
                start: self.start,
                end: self.end.offset_rows(count),
            }
        } else {
            self
        }
    }

    pub fn to_a1(&self) -> String {
        if self.is_single_cell() {
            self.start.to_a1()
        } else {
            format!("{}:{}", self.start.to_a1(), self.end.to_a1())
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}
