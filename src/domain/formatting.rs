/// Format a number with thousand separators.
pub fn format_number(n: u64) -> String {
    if n < 1_000 {
        return n.to_string();
    }
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a video length as `m:ss` or `h:mm:ss`.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Pluralised video count, e.g. "1 video", "1,204 videos".
pub fn format_video_count(count: usize) -> String {
    if count == 1 {
        "1 video".to_string()
    } else {
        format!("{} videos", format_number(count as u64))
    }
}
