//! Excel export of quote history

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use renocost_types::{round2, ConfidenceSource, Error, Quote, Result, ServiceType};

fn excel_err(e: XlsxError) -> Error {
    Error::Excel(e.to_string())
}

/// Export quotes (newest first) to an `.xlsx` workbook with a summary and a
/// details sheet
pub fn export_quotes_to_excel(
    quotes: &[Quote],
    generated_at: DateTime<Utc>,
    output_path: &Path,
) -> Result<()> {
    let mut workbook = Workbook::new();

    let summary_sheet = workbook.add_worksheet();
    write_summary_sheet(summary_sheet, quotes, generated_at)?;

    let details_sheet = workbook.add_worksheet();
    write_details_sheet(details_sheet, quotes)?;

    workbook.save(output_path).map_err(excel_err)?;
    tracing::info!(quotes = quotes.len(), path = %output_path.display(), "excel report written");
    Ok(())
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct ServiceTotals {
    count: usize,
    total: f64,
    from_model: usize,
}

fn totals_by_service(quotes: &[Quote]) -> BTreeMap<ServiceType, ServiceTotals> {
    let mut totals: BTreeMap<ServiceType, ServiceTotals> = BTreeMap::new();
    for quote in quotes {
        let entry = totals.entry(quote.service_type).or_default();
        entry.count += 1;
        entry.total += quote.estimated_cost;
        if quote.confidence_source == ConfidenceSource::Model {
            entry.from_model += 1;
        }
    }
    totals
}

fn write_summary_sheet(
    sheet: &mut Worksheet,
    quotes: &[Quote],
    generated_at: DateTime<Utc>,
) -> Result<()> {
    sheet.set_name("Summary").map_err(excel_err)?;

    let header_format = Format::new().set_bold();
    let money_format = Format::new().set_num_format("#,##0.00");

    sheet
        .write_string_with_format(0, 0, "Renovation Quote Report", &header_format)
        .map_err(excel_err)?;

    sheet.write_string(2, 0, "Generated:").map_err(excel_err)?;
    sheet
        .write_string(2, 1, generated_at.to_rfc3339())
        .map_err(excel_err)?;

    sheet.write_string(3, 0, "Total Quotes:").map_err(excel_err)?;
    sheet
        .write_number(3, 1, quotes.len() as f64)
        .map_err(excel_err)?;

    let grand_total: f64 = quotes.iter().map(|q| q.estimated_cost).sum();
    sheet.write_string(4, 0, "Total Value (₹):").map_err(excel_err)?;
    sheet
        .write_number_with_format(4, 1, round2(grand_total), &money_format)
        .map_err(excel_err)?;

    let headers = ["Service", "Quotes", "Total (₹)", "Average (₹)", "Model-priced"];
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(6, col as u16, *header, &header_format)
            .map_err(excel_err)?;
    }

    let mut row = 7;
    for (service, totals) in totals_by_service(quotes) {
        sheet.write_string(row, 0, service.label()).map_err(excel_err)?;
        sheet
            .write_number(row, 1, totals.count as f64)
            .map_err(excel_err)?;
        sheet
            .write_number_with_format(row, 2, round2(totals.total), &money_format)
            .map_err(excel_err)?;
        sheet
            .write_number_with_format(
                row,
                3,
                round2(totals.total / totals.count as f64),
                &money_format,
            )
            .map_err(excel_err)?;
        sheet
            .write_number(row, 4, totals.from_model as f64)
            .map_err(excel_err)?;
        row += 1;
    }

    sheet.set_column_width(0, 20).map_err(excel_err)?;
    sheet.set_column_width(1, 26).map_err(excel_err)?;

    Ok(())
}

fn write_details_sheet(sheet: &mut Worksheet, quotes: &[Quote]) -> Result<()> {
    sheet.set_name("Details").map_err(excel_err)?;

    let header_format = Format::new().set_bold();
    let money_format = Format::new().set_num_format("#,##0.00");

    let headers = [
        "Quote ID",
        "Created",
        "Service",
        "Area (m²)",
        "Points",
        "Photos",
        "Estimated Cost (₹)",
        "Source",
        "Features",
    ];

    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(excel_err)?;
    }

    for (row_idx, quote) in quotes.iter().enumerate() {
        let row = (row_idx + 1) as u32;
        let features = &quote.input_features;

        sheet.write_string(row, 0, &quote.id).map_err(excel_err)?;
        sheet
            .write_string(row, 1, quote.created_at.format("%Y-%m-%d %H:%M").to_string())
            .map_err(excel_err)?;
        sheet
            .write_string(row, 2, quote.service_type.label())
            .map_err(excel_err)?;
        sheet
            .write_number(row, 3, features.area())
            .map_err(excel_err)?;
        sheet
            .write_number(row, 4, features.points() as f64)
            .map_err(excel_err)?;
        sheet
            .write_number(row, 5, quote.photo_refs.len() as f64)
            .map_err(excel_err)?;
        sheet
            .write_number_with_format(row, 6, quote.estimated_cost, &money_format)
            .map_err(excel_err)?;
        sheet
            .write_string(row, 7, quote.confidence_source.as_str())
            .map_err(excel_err)?;
        sheet
            .write_string(row, 8, serde_json::to_string(features)?)
            .map_err(excel_err)?;
    }

    sheet.set_column_width(0, 38).map_err(excel_err)?;
    sheet.set_column_width(1, 18).map_err(excel_err)?;
    sheet.set_column_width(2, 12).map_err(excel_err)?;
    sheet.set_column_width(6, 18).map_err(excel_err)?;
    sheet.set_column_width(8, 40).map_err(excel_err)?;

    Ok(())
}
