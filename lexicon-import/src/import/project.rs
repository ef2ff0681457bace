//! Row filter and column projection

use log::debug;

use super::error::{ImportError, RowError};
use super::types::{ProjectedBatch, RawBatch, SheetLayout, SkippedRow};

/// Filter and project one fetched sub-sheet
///
/// The header row is validated against `layout` and then skipped. Data rows
/// with a blank headword are dropped and recorded in `skipped`; the rest are
/// projected onto the normalizer columns in their original order.
pub fn project_batch(
    batch: &RawBatch,
    layout: SheetLayout,
) -> Result<ProjectedBatch, ImportError> {
    layout
        .validate_header(batch.header())
        .map_err(|source| ImportError::Header {
            sheet: batch.sheet.clone(),
            tab: batch.tab.clone(),
            source,
        })?;

    let mut projected = ProjectedBatch {
        sheet: batch.sheet.clone(),
        tab: batch.tab.clone(),
        ..Default::default()
    };

    for (line, row) in batch.data_rows() {
        let headword = row.first().map(|cell| cell.trim()).unwrap_or("");
        if headword.is_empty() {
            debug!(
                "Skipping line {} of '{}' / '{}': blank headword",
                line, batch.sheet, batch.tab
            );
            projected.skipped.push(SkippedRow {
                sheet: batch.sheet.clone(),
                tab: batch.tab.clone(),
                line,
                reason: RowError::EmptyHeadword,
            });
            continue;
        }

        projected.rows.push(layout.project(line, row));
    }

    debug!(
        "Projected '{}' / '{}': {} rows kept, {} skipped",
        batch.sheet,
        batch.tab,
        projected.rows.len(),
        projected.skipped.len()
    );

    Ok(projected)
}
