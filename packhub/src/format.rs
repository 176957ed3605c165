//! Human-readable formatting helpers.

/// Render a download count for display.
///
/// Counts below a thousand are shown as is. Larger counts are truncated to
/// one decimal with a `K` or `M` suffix, dropping a trailing `.0`.
///
/// ```
/// use packhub::format::format_downloads;
///
/// assert_eq!(format_downloads(999), "999");
/// assert_eq!(format_downloads(1_250), "1.2K");
/// assert_eq!(format_downloads(3_400_000), "3.4M");
/// ```
pub fn format_downloads(count: u64) -> String {
    const THOUSAND: u64 = 1_000;
    const MILLION: u64 = 1_000_000;

    let (unit, suffix) = match count {
        c if c < THOUSAND => return c.to_string(),
        c if c < MILLION => (THOUSAND, "K"),
        _ => (MILLION, "M"),
    };

    let whole = count / unit;
    let tenth = (count % unit) * 10 / unit;
    if tenth == 0 {
        format!("{}{}", whole, suffix)
    } else {
        format!("{}.{}{}", whole, tenth, suffix)
    }
}

/// "1 download", "2 downloads".
pub fn downloads_label(count: u64) -> String {
    let noun = if count == 1 { "download" } else { "downloads" };
    format!("{} {}", format_downloads(count), noun)
}
