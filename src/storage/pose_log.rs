//! Raw pose persistence.
//!
//! Recording sessions append semicolon-separated rows, one per ingested
//! frame, under a header line. The file is opened lazily on the first row, so
//! a session that never saw a frame leaves no file behind. Alongside the data
//! file, a companion `_ref.csv` holds the single head pose captured at
//! session start, which replay uses to rebuild the reference frame.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::pose::types::{Quat, Vec3};

/// Header of a recorded session file.
pub const POSE_LOG_HEADER: &str =
    "tracker;time;rawPosX;rawPosY;rawPosZ;rawRotX;rawRotY;rawRotZ;rawRotW";

/// Header of a session reference file.
pub const REFERENCE_HEADER: &str = "initPosX;initPosY;initPosZ;initRotX;initRotY;initRotZ;initRotW";

/// Writes one recording session's raw poses.
#[derive(Debug)]
pub struct PoseLogWriter {
    data_path: PathBuf,
    reference_path: PathBuf,
    reference_position: Vec3,
    reference_rotation: Quat,
    file: Option<BufWriter<File>>,
    rows: u64,
}

impl PoseLogWriter {
    /// Prepare a writer for one session. Nothing touches the filesystem
    /// until the first row arrives.
    pub fn new(
        data_path: PathBuf,
        reference_path: PathBuf,
        reference_position: Vec3,
        reference_rotation: Quat,
    ) -> Self {
        Self {
            data_path,
            reference_path,
            reference_position,
            reference_rotation,
            file: None,
            rows: 0,
        }
    }

    /// Append one raw pose row, opening the file (and writing the reference
    /// companion) on first use.
    pub fn record(
        &mut self,
        tracker: &str,
        time: f64,
        position: Vec3,
        rotation: Quat,
    ) -> crate::Result<()> {
        if self.file.is_none() {
            self.open()?;
        }
        // The open() call above guarantees a writer here
        if let Some(file) = self.file.as_mut() {
            writeln!(
                file,
                "{};{};{};{};{};{};{};{};{}",
                tracker,
                time,
                position.x,
                position.y,
                position.z,
                rotation.x,
                rotation.y,
                rotation.z,
                rotation.w
            )?;
            self.rows += 1;
        }
        Ok(())
    }

    fn open(&mut self) -> crate::Result<()> {
        let mut file = BufWriter::new(File::create(&self.data_path)?);
        writeln!(file, "{}", POSE_LOG_HEADER)?;
        self.file = Some(file);

        let p = self.reference_position;
        let r = self.reference_rotation;
        let mut reference = BufWriter::new(File::create(&self.reference_path)?);
        writeln!(reference, "{}", REFERENCE_HEADER)?;
        writeln!(
            reference,
            "{};{};{};{};{};{};{}",
            p.x, p.y, p.z, r.x, r.y, r.z, r.w
        )?;
        reference.flush()?;
        Ok(())
    }

    /// Rows written so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Flush and close, returning the number of rows written.
    pub fn finish(mut self) -> crate::Result<u64> {
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(self.rows)
    }
}

/// One parsed row of a recorded session.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseRow {
    pub tracker: String,
    pub time: f64,
    pub position: Vec3,
    pub rotation: Quat,
}

/// Parse a recorded session file back into its rows.
pub fn read_pose_log(path: &Path) -> crate::Result<Vec<PoseRow>> {
    let content = std::fs::read_to_string(path)?;
    let mut lines = content.lines();
    match lines.next() {
        Some(header) if header == POSE_LOG_HEADER => {}
        _ => {
            return Err(crate::Error::Storage(format!(
                "{} is not a recorded session file (bad header)",
                path.display()
            )));
        }
    }

    let mut rows = Vec::new();
    for (number, line) in lines.enumerate() {
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(';').collect();
        if fields.len() != 9 {
            return Err(crate::Error::Storage(format!(
                "malformed row {} in {}: expected 9 fields, got {}",
                number + 2,
                path.display(),
                fields.len()
            )));
        }
        let mut numbers = [0.0; 8];
        for (slot, field) in numbers.iter_mut().zip(&fields[1..]) {
            *slot = parse_field(field, number + 2, path)?;
        }
        rows.push(PoseRow {
            tracker: fields[0].to_string(),
            time: numbers[0],
            position: Vec3::new(numbers[1], numbers[2], numbers[3]),
            rotation: Quat::new(numbers[4], numbers[5], numbers[6], numbers[7]),
        });
    }
    Ok(rows)
}

/// Parse a session reference file back into the start pose.
pub fn read_reference(path: &Path) -> crate::Result<(Vec3, Quat)> {
    let content = std::fs::read_to_string(path)?;
    let mut lines = content.lines();
    match lines.next() {
        Some(header) if header == REFERENCE_HEADER => {}
        _ => {
            return Err(crate::Error::Storage(format!(
                "{} is not a session reference file (bad header)",
                path.display()
            )));
        }
    }
    let row = lines.next().ok_or_else(|| {
        crate::Error::Storage(format!("{} is missing its reference row", path.display()))
    })?;
    let fields: Vec<&str> = row.split(';').collect();
    if fields.len() != 7 {
        return Err(crate::Error::Storage(format!(
            "malformed reference row in {}: expected 7 fields, got {}",
            path.display(),
            fields.len()
        )));
    }
    let mut numbers = [0.0; 7];
    for (slot, field) in numbers.iter_mut().zip(&fields) {
        *slot = parse_field(field, 2, path)?;
    }
    Ok((
        Vec3::new(numbers[0], numbers[1], numbers[2]),
        Quat::new(numbers[3], numbers[4], numbers[5], numbers[6]),
    ))
}

fn parse_field(field: &str, line: usize, path: &Path) -> crate::Result<f64> {
    field.parse::<f64>().map_err(|_| {
        crate::Error::Storage(format!(
            "malformed number '{}' on line {} of {}",
            field,
            line,
            path.display()
        ))
    })
}

/// Companion reference path for a recorded session file.
pub fn reference_path_for(data_path: &Path) -> PathBuf {
    let stem = data_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    data_path.with_file_name(format!("{}_ref.csv", stem))
}
