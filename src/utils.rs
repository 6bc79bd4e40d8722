//! Text formatting shared by logs, the run summary and alerts.

/// Compact count for log lines: `812`, `8.1K`, `1.3M`.
///
/// # Examples
/// ```
/// use birdroutes::utils::format_count;
/// assert_eq!(format_count(812), "812");
/// assert_eq!(format_count(8123), "8.1K");
/// assert_eq!(format_count(1_260_000), "1.3M");
/// ```
pub fn format_count(count: u64) -> String {
    match count {
        0..=999 => count.to_string(),
        1_000..=999_999 => format!("{:.1}K", count as f64 / 1e3),
        _ => format!("{:.1}M", count as f64 / 1e6),
    }
}

/// Exact count grouped by thousands, for address totals: `343,000,000`.
///
/// # Examples
/// ```
/// use birdroutes::utils::format_count_with_separator;
/// assert_eq!(format_count_with_separator(1u64 << 32), "4,294,967,296");
/// ```
pub fn format_count_with_separator(n: u64) -> String {
    let digits = n.to_string();
    let lead = match digits.len() % 3 {
        0 => 3,
        r => r,
    };
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    out.push_str(&digits[..lead]);
    for group in digits.as_bytes()[lead..].chunks(3) {
        out.push(',');
        // ASCII digits
        out.extend(group.iter().map(|&b| b as char));
    }
    out
}

/// Download size for log lines. Prefix lists stay well under the 10 MB cap,
/// so nothing beyond MB is needed.
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b >= KIB * KIB {
        format!("{:.1} MB", b / (KIB * KIB))
    } else if b >= KIB {
        format!("{:.1} KB", b / KIB)
    } else {
        format!("{} B", bytes)
    }
}

/// Cut `s` to at most `max_len` characters, marking the cut with `...`.
///
/// Counts characters, not bytes, so emoji and other multi-byte text in
/// alert messages is never split.
pub fn truncate(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        None => s.to_string(),
        Some(_) if max_len <= 3 => "...".to_string(),
        Some(_) => {
            let keep: String = s.chars().take(max_len - 3).collect();
            keep + "..."
        }
    }
}

/// Escape the characters Telegram's legacy Markdown treats as entities.
///
/// Error text and file paths routinely contain `_` and `*`; left bare they
/// make the API reject the whole message.
pub fn escape_markdown(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
