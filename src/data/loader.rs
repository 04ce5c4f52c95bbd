use std::path::Path;

use encoding_rs::{Encoding, UTF_16LE, UTF_8};
use log::{debug, warn};

use super::model::{Channel, ChannelData, ChannelSet, DigitalBlock, Marker, Trace};
use crate::error::{Result, TraceError};

/// Column (0-based) holding the channel header once the matrix is transposed.
const HEADER_COLUMN: usize = 1;
/// First column carrying payload values.
const PAYLOAD_START: usize = 3;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and parse one ÄKTA export.
///
/// The file is read whole, decoded (UTF-16 unless a UTF-8 BOM says otherwise),
/// split on tabs, transposed and handed to [`parse_channel_table`].
pub fn load_file(path: &Path) -> Result<ChannelSet> {
    let unreadable = |reason: String| TraceError::FileUnreadable {
        path: path.to_path_buf(),
        reason,
    };

    let bytes = std::fs::read(path).map_err(|e| unreadable(e.to_string()))?;
    let text = decode_export(&bytes)
        .ok_or_else(|| unreadable("not valid UTF-16 or UTF-8 text".into()))?;
    let rows = split_records(&text).map_err(|e| unreadable(e.to_string()))?;
    debug!("{}: {} rows read", path.display(), rows.len());

    let channels = parse_channel_table(&transpose(rows))?;
    debug!(
        "{}: channels present: {:?}",
        path.display(),
        channels.present().collect::<Vec<_>>()
    );
    Ok(channels)
}

// ---------------------------------------------------------------------------
// Decoding and tokenising
// ---------------------------------------------------------------------------

/// Decode raw export bytes. Returns `None` on malformed input.
///
/// A BOM decides the encoding when present. Without one, UTF-16 LE is assumed
/// if the bytes look like it (the instrument software writes it that way),
/// UTF-8 otherwise.
pub fn decode_export(bytes: &[u8]) -> Option<String> {
    let (encoding, bom_len): (&'static Encoding, usize) = match Encoding::for_bom(bytes) {
        Some(found) => found,
        None if looks_like_utf16le(bytes) => (UTF_16LE, 0),
        None => (UTF_8, 0),
    };
    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
    if had_errors {
        return None;
    }
    Some(text.into_owned())
}

fn looks_like_utf16le(bytes: &[u8]) -> bool {
    if bytes.len() < 2 || bytes.len() % 2 != 0 {
        return false;
    }
    let sample = bytes.len().min(256) / 2;
    let zero_high = bytes
        .iter()
        .skip(1)
        .step_by(2)
        .take(sample)
        .filter(|&&b| b == 0)
        .count();
    zero_high * 2 > sample
}

/// Split tab-delimited text into rows of cells.
pub fn split_records(text: &str) -> std::result::Result<Vec<Vec<String>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes());

    reader
        .records()
        .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
        .collect()
}

/// Turn columns into rows. Short rows are padded with empty cells.
pub fn transpose(rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut out: Vec<Vec<String>> = (0..width).map(|_| Vec::with_capacity(rows.len())).collect();
    for row in rows {
        let mut cells = row.into_iter();
        for column in out.iter_mut() {
            column.push(cells.next().unwrap_or_default());
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Channel table
// ---------------------------------------------------------------------------

/// Recover every recognised channel from a transposed export matrix.
///
/// A row whose header cell names a channel holds that channel's x-values;
/// the row right after it holds the y-values. Channels that never appear are
/// simply absent from the result. The `Digital in 1` block is stored as found,
/// even when empty or ragged.
pub fn parse_channel_table(matrix: &[Vec<String>]) -> Result<ChannelSet> {
    let mut set = ChannelSet::new();

    for (n, row) in matrix.iter().enumerate() {
        let Some(channel) = row.get(HEADER_COLUMN).and_then(|h| Channel::from_header(h)) else {
            continue;
        };
        let values = matrix
            .get(n + 1)
            .ok_or_else(|| TraceError::malformed(channel.header(), "header has no value row"))?;

        match parse_channel(channel, row, values)? {
            Some(data) => {
                if set.insert(channel, data).is_some() {
                    warn!("'{channel}' appears more than once; keeping the later block");
                }
            }
            None => debug!("'{channel}' header present without data, treating as absent"),
        }
    }

    Ok(set)
}

fn parse_channel(channel: Channel, x_row: &[String], y_row: &[String]) -> Result<Option<ChannelData>> {
    let x_cells = payload(x_row);
    let y_cells = payload(y_row);
    if channel == Channel::DigitalIn1 {
        let owned =
            |cells: Vec<&str>| -> Vec<String> { cells.into_iter().map(str::to_string).collect() };
        let block = DigitalBlock::new(owned(x_cells), owned(y_cells));
        return Ok(Some(ChannelData::Digital(block)));
    }
    if x_cells.is_empty() && y_cells.is_empty() {
        return Ok(None);
    }

    let data = match channel {
        Channel::FractionMarks => {
            let labels = y_cells;
            if x_cells.len() < labels.len() {
                return Err(TraceError::malformed(
                    channel.header(),
                    format!("{} labels but only {} positions", labels.len(), x_cells.len()),
                ));
            }
            // trailing positions without a label are dropped
            let x = parse_floats(channel, &x_cells[..labels.len()])?;
            markers(x, &labels)
        }
        Channel::RunLog => {
            let x = parse_floats(channel, &x_cells)?;
            if x.len() != y_cells.len() {
                return Err(TraceError::malformed(
                    channel.header(),
                    format!("{} positions but {} log entries", x.len(), y_cells.len()),
                ));
            }
            markers(x, &y_cells)
        }
        _ => {
            let x = parse_floats(channel, &x_cells)?;
            let y = parse_floats(channel, &y_cells)?;
            ChannelData::Numeric(Trace::new(channel, x, y)?)
        }
    };

    if matches!(&data, ChannelData::Markers(m) if m.is_empty()) {
        return Ok(None);
    }
    Ok(Some(data))
}

/// Payload cells of a row with empty cells dropped.
fn payload(row: &[String]) -> Vec<&str> {
    row.iter()
        .skip(PAYLOAD_START)
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect()
}

fn parse_floats(channel: Channel, cells: &[&str]) -> Result<Vec<f64>> {
    cells
        .iter()
        .enumerate()
        .map(|(j, cell)| {
            cell.parse::<f64>().map_err(|_| {
                TraceError::malformed(channel.header(), format!("value {j} '{cell}' is not a number"))
            })
        })
        .collect()
}

fn markers(x: Vec<f64>, labels: &[&str]) -> ChannelData {
    ChannelData::Markers(
        x.into_iter()
            .zip(labels)
            .map(|(position, label)| Marker {
                position,
                label: (*label).to_string(),
            })
            .collect(),
    )
}
