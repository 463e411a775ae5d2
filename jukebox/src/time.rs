/// Format milliseconds as `mm:ss`
///
/// Both fields are zero padded to two digits; the minute field is unbounded,
/// so an hour renders as `60:00`.
pub fn format_time(milliseconds: u64) -> String {
    let total_seconds = milliseconds / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}", minutes, seconds)
}
