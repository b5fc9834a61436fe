use anyhow::{Result, anyhow};
use tracing::debug;

use crate::atlas::{HeadDirectionRates, SimilarityMatrix};

/// Number of leading key columns in the head-direction rate table.
const RATE_KEY_COLUMNS: usize = 3;

/// Splits one CSV record, honouring double-quoted fields with `""` escapes.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(ch),
        }
    }
    fields.push(field);

    fields.into_iter().map(|field| field.trim().to_owned()).collect()
}

fn records(raw: &str) -> impl Iterator<Item = Vec<String>> + '_ {
    raw.lines()
        .map(|line| line.trim_start_matches('\u{feff}').trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(split_record)
}

/// Empty, unparsable or non-finite cells are missing data, never zero.
fn parse_cell(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|value| value.is_finite())
}

pub(super) fn parse_distance_matrix(raw: &str) -> Result<SimilarityMatrix> {
    let mut rows = records(raw);
    let header = rows
        .next()
        .ok_or_else(|| anyhow!("distance matrix CSV is empty"))?;
    let columns = header.get(1..).unwrap_or_default();
    if columns.is_empty() {
        return Err(anyhow!("distance matrix CSV header has no language columns"));
    }

    let mut matrix = SimilarityMatrix::new();
    let mut skipped = 0usize;

    for row in rows {
        let Some((language, cells)) = row.split_first() else {
            continue;
        };
        if language.is_empty() {
            continue;
        }

        for (column, cell) in columns.iter().zip(cells) {
            if column.is_empty() {
                continue;
            }
            match parse_cell(cell) {
                Some(distance) => matrix.insert(language, column, distance),
                None => skipped += 1,
            }
        }
    }

    if skipped > 0 {
        debug!(skipped, "distance matrix cells without a usable value");
    }

    Ok(matrix)
}

pub(super) fn parse_rate_table(raw: &str) -> Result<HeadDirectionRates> {
    let mut rows = records(raw);
    let header = rows
        .next()
        .ok_or_else(|| anyhow!("head direction rate CSV is empty"))?;
    let languages = header.get(RATE_KEY_COLUMNS..).unwrap_or_default();
    if languages.is_empty() {
        return Err(anyhow!(
            "head direction rate CSV header needs {RATE_KEY_COLUMNS} key columns followed by languages"
        ));
    }

    let mut rates = HeadDirectionRates::new();
    let mut skipped = 0usize;

    for row in rows {
        if row.len() < RATE_KEY_COLUMNS {
            skipped += 1;
            continue;
        }
        let key = row[..RATE_KEY_COLUMNS].join(",");

        for (language, cell) in languages.iter().zip(&row[RATE_KEY_COLUMNS..]) {
            match parse_cell(cell) {
                Some(rate) => rates.insert(&key, language, rate),
                None => skipped += 1,
            }
        }
    }

    if skipped > 0 {
        debug!(skipped, "head direction cells without a usable value");
    }

    Ok(rates)
}
