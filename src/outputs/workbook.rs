//! Workbook export: one worksheet per time series.
//!
//! Every sheet has a bold `Week, Count` header followed by one row per week in
//! chronological order, the week written as `YYYY-MM-DD`.

use rust_xlsxwriter::{Format, Workbook};
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument};

use crate::errors::PipelineResult;
use crate::models::TimeSeriesSheet;
use crate::utils::WEEK_FORMAT;

pub const HEADER: [&str; 2] = ["Week", "Count"];

/// Longest worksheet name the format accepts.
const MAX_SHEET_NAME: usize = 31;
const FORBIDDEN: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Make `name` a valid worksheet name not yet in `taken` (compared
/// case-insensitively), and record it.
pub fn sanitize_sheet_name(name: &str, taken: &mut HashSet<String>) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if FORBIDDEN.contains(&c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'');
    let base: String = if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("history") {
        format!("Sheet {cleaned}").trim().to_string()
    } else {
        cleaned.to_string()
    };

    let mut candidate: String = base.chars().take(MAX_SHEET_NAME).collect();
    let mut n = 2;
    while taken.contains(&candidate.to_lowercase()) {
        let suffix = format!(" ({n})");
        let keep = MAX_SHEET_NAME - suffix.chars().count();
        candidate = base.chars().take(keep).collect::<String>() + &suffix;
        n += 1;
    }
    taken.insert(candidate.to_lowercase());
    candidate
}

/// Cell values for one sheet, header first.
pub fn sheet_rows(sheet: &TimeSeriesSheet) -> Vec<(String, u64)> {
    sheet
        .rows
        .iter()
        .map(|(week, count)| (week.format(WEEK_FORMAT).to_string(), *count))
        .collect()
}

/// Render `sheets` into an `.xlsx` file at `destination`, replacing it.
#[instrument(level = "info", skip(sheets), fields(sheets = sheets.len()))]
pub async fn export(sheets: &[TimeSeriesSheet], destination: &Path) -> PipelineResult<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let mut taken = HashSet::new();

    for sheet in sheets {
        let name = sanitize_sheet_name(&sheet.name, &mut taken);
        if name != sheet.name {
            debug!(original = %sheet.name, %name, "Renamed worksheet");
        }
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&name)?;
        worksheet.set_column_width(0, 12)?;
        for (col, title) in (0u16..).zip(HEADER) {
            worksheet.write_string_with_format(0, col, title, &bold)?;
        }
        for (row, (week, count)) in (1u32..).zip(sheet_rows(sheet)) {
            worksheet.write_string(row, 0, &week)?;
            worksheet.write_number(row, 1, count as f64)?;
        }
    }

    let bytes = workbook.save_to_buffer()?;
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(destination, bytes).await?;
    info!(path = %destination.display(), "Wrote workbook");
    Ok(())
}
