use super::ColumnFileError;
use crate::core::models::curve::Curve;
use crate::core::models::kind::DataKind;
use crate::core::models::series::{TimeSeries, Vec3};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

fn data_lines(reader: impl BufRead) -> impl Iterator<Item = std::io::Result<String>> {
    reader.lines().filter(|line| match line {
        Ok(l) => {
            let trimmed = l.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        }
        Err(_) => true,
    })
}

fn parse_fields<const N: usize>(line: &str) -> Option<[f64; N]> {
    let mut out = [0.0; N];
    let mut fields = line.split_whitespace();
    for slot in out.iter_mut() {
        *slot = fields.next()?.parse().ok().filter(|v: &f64| v.is_finite())?;
    }
    Some(out)
}

/// One scalar per line.
pub fn read_scalars(reader: impl BufRead) -> std::io::Result<Vec<f64>> {
    let mut values = Vec::new();
    for line in data_lines(reader) {
        if let Some([v]) = parse_fields::<1>(&line?) {
            values.push(v);
        }
    }
    Ok(values)
}

/// Whitespace-separated triplets, one vector per line. Extra columns are ignored.
pub fn read_vectors(reader: impl BufRead) -> std::io::Result<Vec<Vec3>> {
    let mut values = Vec::new();
    for line in data_lines(reader) {
        if let Some([x, y, z]) = parse_fields::<3>(&line?) {
            values.push(Vec3::new(x, y, z));
        }
    }
    Ok(values)
}

/// First two columns as a curve; a line contributes only if both fields parse to finite values.
pub fn read_xy(reader: impl BufRead) -> std::io::Result<Curve> {
    let mut points = Vec::new();
    for line in data_lines(reader) {
        if let Some([x, y]) = parse_fields::<2>(&line?) {
            points.push((x, y));
        }
    }
    Ok(Curve::from_points(points))
}

fn open(path: &Path) -> Result<BufReader<File>, ColumnFileError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| ColumnFileError::io(path, e))
}

/// Reads the observable stored at `path` in the layout `kind` prescribes.
pub fn read_time_series(path: &Path, kind: DataKind) -> Result<TimeSeries, ColumnFileError> {
    let reader = open(path)?;
    let series = match kind {
        DataKind::R2 => read_scalars(reader).map(TimeSeries::Scalar),
        DataKind::EndToEndVector => read_vectors(reader).map(TimeSeries::Vector),
    }
    .map_err(|e| ColumnFileError::io(path, e))?;
    if series.is_empty() {
        return Err(ColumnFileError::NoData {
            path: path.display().to_string(),
        });
    }
    Ok(series)
}

pub fn read_curve(path: &Path) -> Result<Curve, ColumnFileError> {
    let curve = read_xy(open(path)?).map_err(|e| ColumnFileError::io(path, e))?;
    if curve.is_empty() {
        return Err(ColumnFileError::NoData {
            path: path.display().to_string(),
        });
    }
    Ok(curve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn scalars_skip_comments_blanks_and_garbage() {
        let text = "# header\n1.5\n\n  2.0  \nnot-a-number\n-3e-1\n";
        let values = read_scalars(Cursor::new(text)).unwrap();
        assert_eq!(values, vec![1.5, 2.0, -0.3]);
    }

    #[test]
    fn vectors_need_three_fields() {
        let text = "1 2 3\n4\t5\t6\n7 8\n\n9 10 11 12\n";
        let values = read_vectors(Cursor::new(text)).unwrap();
        assert_eq!(
            values,
            vec![
                Vec3::new(1.0, 2.0, 3.0),
                Vec3::new(4.0, 5.0, 6.0),
                Vec3::new(9.0, 10.0, 11.0)
            ]
        );
    }

    #[test]
    fn xy_pairs_stay_aligned() {
        let text = "0 1\n1 x\n2\t4\n";
        let curve = read_xy(Cursor::new(text)).unwrap();
        assert_eq!(curve.x(), &[0.0, 2.0]);
        assert_eq!(curve.y(), &[1.0, 4.0]);
    }

    #[test]
    fn non_finite_fields_are_skipped() {
        let text = "0 1\nnan 2\n1 inf\n2 -infinity\n3 NaN\n4 5\n";
        let curve = read_xy(Cursor::new(text)).unwrap();
        assert_eq!(curve.x(), &[0.0, 4.0]);
        assert_eq!(curve.y(), &[1.0, 5.0]);

        let values = read_scalars(Cursor::new("1.0\nnan\ninf\n2.0\n")).unwrap();
        assert_eq!(values, vec![1.0, 2.0]);
    }

    #[test]
    fn read_time_series_by_kind() {
        let dir = tempdir().unwrap();
        let r2 = dir.path().join(DataKind::R2.file_name());
        let vec = dir.path().join(DataKind::EndToEndVector.file_name());
        std::fs::write(&r2, "1.0\n2.0\n").unwrap();
        std::fs::write(&vec, "1 0 0\n0 1 0\n").unwrap();

        assert_eq!(
            read_time_series(&r2, DataKind::R2).unwrap(),
            TimeSeries::Scalar(vec![1.0, 2.0])
        );
        assert_eq!(
            read_time_series(&vec, DataKind::EndToEndVector).unwrap().len(),
            2
        );
    }

    #[test]
    fn missing_and_empty_files_are_reported() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.dat");
        assert!(matches!(
            read_time_series(&missing, DataKind::R2),
            Err(ColumnFileError::Io { .. })
        ));

        let empty = dir.path().join("empty.dat");
        std::fs::write(&empty, "# only a comment\n").unwrap();
        assert!(matches!(
            read_curve(&empty),
            Err(ColumnFileError::NoData { .. })
        ));
    }
}
