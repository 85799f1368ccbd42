// ==================== USER DASHBOARD DATA ====================
// Each user owns a worksheet in data.xlsx named after their email.
//
// Layout:
//   row 0          company labels (first cell ignored)
//   row 1          summary row: [_, dashboardSummary, comparisonSummary]
//   row 2..marker  stats rows: [label, value1, value2, ...]
//   "Performance"  marker row (first cell, case-insensitive)
//   after marker   time series: [name, value1, value2, ...]

use crate::{
    database::SheetStore,
    models::{CellValue, ComparePoint, PerformancePoint, StatRow, UserData},
    utils::error::{AppError, AppResult},
};

const PERFORMANCE_MARKER: &str = "performance";

fn is_performance_marker(row: &[CellValue]) -> bool {
    row.first()
        .and_then(CellValue::as_str)
        .map(|s| s.trim().eq_ignore_ascii_case(PERFORMANCE_MARKER))
        .unwrap_or(false)
}

/// Turns a user's worksheet rows into the dashboard payload.
pub fn parse_user_sheet(rows: &[Vec<CellValue>]) -> UserData {
    let labels = rows
        .first()
        .map(|header| header.iter().skip(1).cloned().collect())
        .unwrap_or_default();

    let (dashboard_summary, comparison_summary) = match rows.get(1) {
        Some(summary) if summary.len() > 1 => (
            summary[1].or_empty_string(),
            summary.get(2).cloned().unwrap_or_default().or_empty_string(),
        ),
        _ => (CellValue::Empty.or_empty_string(), CellValue::Empty.or_empty_string()),
    };

    let mut compare_stats = Vec::new();
    let mut marker_index = None;

    for (idx, row) in rows.iter().enumerate().skip(2) {
        if row.is_empty() {
            continue;
        }
        if is_performance_marker(row) {
            marker_index = Some(idx);
            break;
        }
        compare_stats.push(StatRow {
            label: row[0].or_empty_string(),
            values: row[1..].iter().map(CellValue::or_zero).collect(),
        });
    }

    let mut performance = Vec::new();
    let mut compare_performance = Vec::new();

    if let Some(marker) = marker_index {
        for row in rows.iter().skip(marker + 1).filter(|row| !row.is_empty()) {
            let name = row[0].clone();
            let values = &row[1..];

            performance.push(PerformancePoint {
                name: name.clone(),
                value: values.first().map(CellValue::or_zero).unwrap_or(CellValue::Number(0.0)),
            });
            compare_performance.push(ComparePoint {
                name,
                values: values.iter().map(CellValue::or_zero).collect(),
            });
        }
    }

    UserData {
        labels,
        dashboard_summary,
        comparison_summary,
        compare_stats,
        performance,
        compare_performance,
    }
}

/// Starter layout written for every newly registered user.
pub fn default_user_rows() -> Vec<Vec<CellValue>> {
    fn row(cells: &[CellValue]) -> Vec<CellValue> {
        cells.to_vec()
    }
    let s = |v: &str| CellValue::from(v);
    let n = |v: f64| CellValue::Number(v);

    vec![
        row(&[CellValue::Empty, s("Company 1"), s("Company 2"), s("Company 3")]),
        row(&[s("Summary Row"), s("Dash Summ"), s("Compare Summ")]),
        row(&[s("Time Period"), n(2022.0), n(2023.0), n(2024.0)]),
        row(&[s("Annualized Return"), s("15%"), s("13%"), s("9%")]),
        row(&[s("Drawdown"), s("5%"), s("8%"), s("2%")]),
        row(&[s("DATA BY ME"), s("Hello"), s("SomeVal"), n(999.0)]),
        Vec::new(),
        row(&[s("Performance")]),
        row(&[s("Jan"), n(100.0), n(110.0), n(120.0)]),
        row(&[s("Feb"), n(200.0), n(210.0), n(220.0)]),
    ]
}

pub async fn get_user_data(store: &SheetStore, email: &str) -> AppResult<UserData> {
    let store = store.clone();
    let sheet_name = email.to_string();
    let rows = tokio::task::spawn_blocking(move || store.read_sheet(&sheet_name)).await??;

    match rows {
        None => Err(AppError::NotFound(format!("User sheet \"{}\" not found", email))),
        Some(rows) if rows.is_empty() => {
            Err(AppError::NotFound(format!("Sheet \"{}\" is empty.", email)))
        }
        Some(rows) => Ok(parse_user_sheet(&rows)),
    }
}

pub async fn create_user_data(store: &SheetStore, email: &str) -> AppResult<()> {
    let store = store.clone();
    let sheet_name = email.to_string();
    tokio::task::spawn_blocking(move || store.write_sheet(&sheet_name, default_user_rows()))
        .await??;

    log::info!("📄 Sheet \"{}\" created/updated", email);
    Ok(())
}
