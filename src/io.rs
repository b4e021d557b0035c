//! CSV boundary: reading the raw table and writing the plot series.

use crate::dataset::RawTable;
use crate::error::Result;
use crate::evaluation::PlotSeries;
use csv::{ReaderBuilder, Writer};
use log::info;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Reads a headed, comma-separated table. Cells are kept as text and rows of
/// the wrong width are kept too; cleaning decides what survives. Bytes that
/// are not valid UTF-8 become U+FFFD, so such a cell fails to parse and only
/// its row is dropped.
pub fn read_raw_table<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = rdr.byte_headers()?.iter().map(lossy).collect();
    let mut table = RawTable::new(columns);
    for record in rdr.byte_records() {
        table.push_row(record?.iter().map(lossy));
    }
    Ok(table)
}

fn lossy(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}

pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let table = read_raw_table(File::open(path.as_ref())?)?;
    info!(
        "loaded {} rows x {} columns from {}",
        table.n_rows(),
        table.columns.len(),
        path.as_ref().display()
    );
    Ok(table)
}

pub fn write_plot_series<W: Write>(writer: W, series: &PlotSeries) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(["y_true", "y_pred"])?;
    for (t, p) in series.y_true.iter().zip(series.y_pred.iter()) {
        wtr.write_record([t.to_string(), p.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_plot_series<P: AsRef<Path>>(path: P, series: &PlotSeries) -> Result<()> {
    write_plot_series(File::create(path)?, series)
}
