//! Writing tables out

use crate::discover::SubcorpusId;
use crate::error::{Result, TallyError};
use crate::pipeline::Interrogation;
use crate::tabulate::Table;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(TallyError::config(format!(
                "unknown output format {:?}, expected csv or json",
                s
            ))),
        }
    }
}

/// Writes a CSV cell, quoting it if required
fn quote_csv_cell<W: Write>(mut wtr: W, mut data: &[u8]) -> io::Result<()> {
    let mut output = [0; 4096];
    let mut writer = csv_core::Writer::new();
    loop {
        let (result, nin, nout) = writer.field(data, &mut output);
        wtr.write_all(&output[..nout])?;
        if result == csv_core::WriteResult::InputEmpty {
            break;
        }
        data = &data[nin..];
    }
    let (_, nout) = writer.finish(&mut output);
    wtr.write_all(&output[..nout])
}

fn write_csv_row<W: Write>(
    wtr: &mut W,
    label: &str,
    total: u64,
    counts: &[(SubcorpusId, u64)],
) -> io::Result<()> {
    quote_csv_cell(&mut *wtr, label.as_bytes())?;
    write!(wtr, ",{}", total)?;
    for (_, count) in counts {
        write!(wtr, ",{}", count)?;
    }
    writeln!(wtr)
}

/// `entry,total,<ids…>` header, one line per row, then a `Totals` line
pub fn write_csv<W: Write>(mut wtr: W, table: &Table) -> io::Result<()> {
    write!(wtr, "entry,total")?;
    for id in &table.subcorpora {
        write!(wtr, ",{}", id)?;
    }
    writeln!(wtr)?;

    for row in &table.rows {
        write_csv_row(&mut wtr, &row.entry, row.total, &row.counts)?;
    }
    write_csv_row(&mut wtr, "Totals", table.grand_total(), &table.totals)?;
    wtr.flush()
}

pub fn write_json<W: Write>(mut wtr: W, interrogation: &Interrogation) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut wtr, interrogation)?;
    writeln!(wtr)?;
    wtr.flush()
}

pub fn write<W: Write>(wtr: W, interrogation: &Interrogation, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Csv => write_csv(wtr, &interrogation.table),
        OutputFormat::Json => write_json(wtr, interrogation),
    }
}
