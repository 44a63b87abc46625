//! Compact rendering of row-number lists
//!
//! Consecutive runs of three or more rows collapse to `a - b`; shorter runs
//! are listed individually. `[5, 6, 7, 8]` renders as `[5 - 8]`.

/// Render row numbers in compact range notation
pub fn compact_rows(rows: &[usize]) -> String {
    let mut sorted = rows.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut parts: Vec<String> = Vec::new();
    let mut i = 0;
    while i < sorted.len() {
        let start = sorted[i];
        let mut end = i;
        while end + 1 < sorted.len() && sorted[end + 1] == sorted[end] + 1 {
            end += 1;
        }

        if end - i >= 2 {
            parts.push(format!("{} - {}", start, sorted[end]));
        } else {
            parts.extend(sorted[i..=end].iter().map(|r| r.to_string()));
        }
        i = end + 1;
    }

    format!("[{}]", parts.join(", "))
}
