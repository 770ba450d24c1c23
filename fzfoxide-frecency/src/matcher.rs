//! Edit-distance based string similarity.
//!
//! Both functions work on `char`s, so a multi-byte character counts as a
//! single edit. Comparison is case-sensitive; callers fold case themselves.

/// Minimum number of single-character insertions, deletions or substitutions
/// needed to turn `a` into `b`.
pub fn distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut table = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, row) in table.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in table[0].iter_mut().enumerate() {
        *cell = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            table[i][j] = if a[i - 1] == b[j - 1] {
                table[i - 1][j - 1]
            } else {
                1 + table[i - 1][j].min(table[i][j - 1]).min(table[i - 1][j - 1])
            };
        }
    }

    table[a.len()][b.len()]
}

/// Similarity of two strings as a percentage in `0.0..=100.0`.
///
/// Two empty strings are identical and score 100.
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 100.0;
    }
    (1.0 - distance(a, b) as f64 / max_len as f64) * 100.0
}
