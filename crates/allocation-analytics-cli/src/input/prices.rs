use allocation_analytics_core::{ColumnLabel, PriceSeries};
use chrono::NaiveDate;
use rust_decimal::Decimal;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

/// Parse a price CSV: first column dates, one column per asset.
///
/// With `two_level_header` the first row holds asset classes and the second
/// row asset names; a blank class cell repeats the class to its left. Blank
/// price cells repeat the previous row's value.
pub fn parse_price_csv(
    text: &str,
    two_level_header: bool,
) -> Result<PriceSeries, Box<dyn std::error::Error>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = reader.records();

    let first = records.next().ok_or("Price file is empty")??;
    let columns: Vec<ColumnLabel> = if two_level_header {
        let second = records
            .next()
            .ok_or("Two-level header needs a second header row")??;
        let mut class = String::new();
        first
            .iter()
            .zip(second.iter())
            .skip(1)
            .map(|(c, a)| {
                if !c.is_empty() {
                    class = c.to_string();
                }
                ColumnLabel::new(class.clone(), a)
            })
            .collect()
    } else {
        first.iter().skip(1).map(ColumnLabel::flat).collect()
    };

    let mut dates = Vec::new();
    let mut rows: Vec<Vec<Decimal>> = Vec::new();
    for record in records {
        let record = record?;
        let raw_date = record.get(0).unwrap_or_default();
        if raw_date.is_empty() {
            continue;
        }
        let date = parse_date(raw_date)?;

        let mut row = Vec::with_capacity(columns.len());
        for (col, label) in columns.iter().enumerate() {
            let cell = record.get(col + 1).unwrap_or_default();
            let value = if cell.is_empty() {
                rows.last().map(|prev| prev[col]).ok_or_else(|| {
                    format!("{}: no value on {} and nothing to carry forward", label, date)
                })?
            } else {
                parse_number(cell)
                    .ok_or_else(|| format!("{}: '{}' on {} is not a number", label, cell, date))?
            };
            row.push(value);
        }
        dates.push(date);
        rows.push(row);
    }

    Ok(PriceSeries::new(dates, columns, rows)?)
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| format!("Unrecognised date '{}', use YYYY-MM-DD", raw).into())
}

fn parse_number(cell: &str) -> Option<Decimal> {
    cell.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(cell).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_flat_header() {
        let csv = "Date,MSCI World,Global Agg\n2024-01-31,100,100\n2024-02-29,101.5,99.8\n";
        let prices = parse_price_csv(csv, false).unwrap();
        assert_eq!(prices.columns()[1], ColumnLabel::flat("Global Agg"));
        assert_eq!(prices.rows()[1][0], dec!(101.5));
    }

    #[test]
    fn test_two_level_header_carries_class() {
        let csv = "Class,Equity,,Fixed Income\nDate,S&P 500,MSCI World,Treasury\n2024-01-31,100,100,100\n";
        let prices = parse_price_csv(csv, true).unwrap();
        assert_eq!(prices.columns()[1], ColumnLabel::new("Equity", "MSCI World"));
        assert_eq!(prices.columns()[2].class, "Fixed Income");
    }

    #[test]
    fn test_blank_cell_forward_filled() {
        let csv = "Date,A\n31/01/2024,100\n29/02/2024,\n";
        let prices = parse_price_csv(csv, false).unwrap();
        assert_eq!(prices.rows()[1][0], dec!(100));
    }

    #[test]
    fn test_leading_blank_is_error() {
        let csv = "Date,A\n2024-01-31,\n";
        assert!(parse_price_csv(csv, false).is_err());
    }
}
