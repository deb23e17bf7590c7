/// Renders seconds as `HH:MM:SS`. Hours keep growing past two digits;
/// negative input renders as zero.
pub fn format_hms(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}
