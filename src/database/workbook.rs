use crate::models::CellValue;
use crate::utils::error::{AppError, AppResult};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use rust_xlsxwriter::Workbook;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// A worksheet as plain rows, anchored at A1.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetGrid {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// Converts a calamine range into rows anchored at A1, with trailing empty
/// cells removed from each row.
fn range_to_rows(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    let (start_row, start_col) = match range.start() {
        Some(start) => start,
        None => return Vec::new(),
    };

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells: Vec<CellValue> = vec![CellValue::Empty; start_col as usize];
        cells.extend(row.iter().map(CellValue::from));
        while cells.last().map(CellValue::is_empty).unwrap_or(false) {
            cells.pop();
        }
        rows.push(cells);
    }
    rows
}

fn collect_sheets<RS: Read + Seek>(workbook: &mut Xlsx<RS>) -> Vec<SheetGrid> {
    workbook
        .worksheets()
        .into_iter()
        .map(|(name, range)| SheetGrid::new(name, range_to_rows(&range)))
        .collect()
}

pub fn read_workbook(path: &Path) -> AppResult<Vec<SheetGrid>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    Ok(collect_sheets(&mut workbook))
}

/// Parses an in-memory upload; used to reject files that are not xlsx.
pub fn parse_workbook(bytes: &[u8]) -> AppResult<Vec<SheetGrid>> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| AppError::InvalidRequest(format!("Not a valid .xlsx file: {}", e)))?;
    Ok(collect_sheets(&mut workbook))
}

pub fn write_workbook(path: &Path, sheets: &[SheetGrid]) -> AppResult<()> {
    let mut workbook = Workbook::new();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            let row_num = row_idx as u32;
            for (col_idx, cell) in row.iter().enumerate() {
                let col_num = col_idx as u16;
                match cell {
                    CellValue::Empty => {}
                    CellValue::String(s) if s.is_empty() => {}
                    CellValue::String(s) => {
                        worksheet.write_string(row_num, col_num, s)?;
                    }
                    CellValue::Number(n) => {
                        worksheet.write_number(row_num, col_num, *n)?;
                    }
                    CellValue::Bool(b) => {
                        worksheet.write_boolean(row_num, col_num, *b)?;
                    }
                }
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}
