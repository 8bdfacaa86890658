//! Human-addressable row and seat labels.

/// Zero-based row index to a spreadsheet-style label: A..Z, AA, AB, ...
pub fn row_label(index: u32) -> String {
    let mut n = u64::from(index) + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Row label joined with the 1-based in-row index: `A` + 3 = `A3`.
/// Labels that already end in a digit get a dash so `T3` + 1 = `T3-1`
/// stays distinguishable from `T31`.
pub fn seat_label(row: &str, index: u32) -> String {
    if row.ends_with(|c: char| c.is_ascii_digit()) {
        format!("{}-{}", row, index)
    } else {
        format!("{}{}", row, index)
    }
}

/// Trimmed, non-empty name or `None`.
pub(crate) fn given(name: Option<&str>) -> Option<&str> {
    name.map(str::trim).filter(|s| !s.is_empty())
}
