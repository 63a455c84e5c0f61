use super::ColumnFileError;
use crate::core::models::curve::Curve;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

fn ensure_parent(path: &Path) -> Result<(), ColumnFileError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| ColumnFileError::io(parent, e))?;
        }
    }
    Ok(())
}

fn write_rows<W: Write>(
    writer: &mut W,
    rows: impl IntoIterator<Item = (f64, f64)>,
    separator: char,
) -> std::io::Result<()> {
    for (a, b) in rows {
        writeln!(writer, "{}{}{}", a, separator, b)?;
    }
    writer.flush()
}

fn open_for(path: &Path, append: bool) -> Result<BufWriter<File>, ColumnFileError> {
    ensure_parent(path)?;
    let file = if append {
        OpenOptions::new().create(true).append(true).open(path)
    } else {
        File::create(path)
    };
    file.map(BufWriter::new)
        .map_err(|e| ColumnFileError::io(path, e))
}

/// Writes `x y` rows, replacing any existing file.
pub fn write_curve(path: &Path, curve: &Curve) -> Result<(), ColumnFileError> {
    let mut writer = open_for(path, false)?;
    write_rows(&mut writer, curve.points(), ' ').map_err(|e| ColumnFileError::io(path, e))
}

/// Appends `x y` rows, creating the file if needed.
pub fn append_curve(path: &Path, curve: &Curve) -> Result<(), ColumnFileError> {
    let mut writer = open_for(path, true)?;
    write_rows(&mut writer, curve.points(), ' ').map_err(|e| ColumnFileError::io(path, e))
}

/// Appends one tab-separated `a\tb` line.
pub fn append_pair(path: &Path, a: f64, b: f64) -> Result<(), ColumnFileError> {
    let mut writer = open_for(path, true)?;
    write_rows(&mut writer, [(a, b)], '\t').map_err(|e| ColumnFileError::io(path, e))
}
