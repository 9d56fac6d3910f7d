use crate::domain::model::{AttendanceRecord, AttendanceStatus, User};
use crate::utils::error::{HrmError, Result};
use serde::Serialize;
use std::io::Write;

const ATTENDANCE_HEADER: [&str; 7] = [
    "Date",
    "Employee ID",
    "Name",
    "Check-In",
    "Check-Out",
    "Status",
    "Late Reason",
];

/// Writes attendance rows as CSV; names are looked up in `users`.
pub fn export_attendance_csv<W: Write>(
    records: &[AttendanceRecord],
    users: &[User],
    writer: W,
) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(ATTENDANCE_HEADER)?;

    for record in records {
        let name = users
            .iter()
            .find(|u| u.id == record.user_id)
            .map(|u| u.name.as_str())
            .unwrap_or("");
        let status = match record.status {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Late => "Late",
            AttendanceStatus::Absent => "Absent",
        };
        csv_writer.write_record([
            record.date.to_string().as_str(),
            record.user_id.as_str(),
            name,
            record.check_in.as_str(),
            record.check_out.as_deref().unwrap_or(""),
            status,
            record.late_reason.as_deref().unwrap_or(""),
        ])?;
    }

    csv_writer.flush()?;
    tracing::info!("📄 exported {} attendance rows", records.len());
    Ok(())
}

pub fn attendance_csv_string(records: &[AttendanceRecord], users: &[User]) -> Result<String> {
    let mut buffer = Vec::new();
    export_attendance_csv(records, users, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| HrmError::ValidationError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub present: usize,
    pub late: usize,
    pub absent: usize,
    /// Share of days attended (present or late), in percent.
    pub attendance_rate: f64,
}

pub fn summarize_attendance(records: &[AttendanceRecord]) -> AttendanceSummary {
    let count = |status: AttendanceStatus| records.iter().filter(|r| r.status == status).count();
    let present = count(AttendanceStatus::Present);
    let late = count(AttendanceStatus::Late);
    let absent = count(AttendanceStatus::Absent);
    let attendance_rate = if records.is_empty() {
        0.0
    } else {
        (present + late) as f64 * 100.0 / records.len() as f64
    };

    AttendanceSummary {
        present,
        late,
        absent,
        attendance_rate,
    }
}
