use crate::error::{ChapterError, Result};

/// Renders a second count as `M:SS`. Minutes never roll over into hours.
pub fn seconds_to_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Parses a `M:SS` clock string back into seconds.
pub fn clock_to_seconds(clock: &str) -> Result<u64> {
    let parts: Vec<&str> = clock.split(':').collect();
    let [minutes, seconds] = parts[..] else {
        return Err(ChapterError::format(format!(
            "expected a minutes:seconds time, got \"{clock}\""
        )));
    };

    let parse_part = |part: &str| -> Result<u64> {
        part.trim().parse::<u64>().map_err(|_| {
            ChapterError::format(format!("\"{clock}\" is not a valid minutes:seconds time"))
        })
    };
    let minutes = parse_part(minutes)?;
    let seconds = parse_part(seconds)?;

    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or_else(|| ChapterError::format(format!("\"{clock}\" is too large")))
}
