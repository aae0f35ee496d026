/// Edit distance where a substitution costs two (one deletion plus one
/// insertion), using the two-row O(min(m,n)) space algorithm.
pub fn indel_distance(a: &[char], b: &[char]) -> usize {
    let (m, n) = (a.len(), b.len());

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Keep the shorter string in the outer loop to minimise allocation.
    let (a, b, m, n) = if m <= n { (a, b, m, n) } else { (b, a, n, m) };

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 2 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    let matched = total - indel_distance(a, b);
    (100.0 * matched as f64 / total as f64).round()
}

/// Best similarity (0-100) of the shorter string against every equally long
/// window of the longer one, so a short keyword can score 100 inside a longer
/// account name. Empty input scores 0.
pub fn partial_ratio(s1: &str, s2: &str) -> f64 {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let (shorter, longer) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    if shorter.len() == longer.len() {
        return ratio_chars(shorter, longer);
    }

    let width = shorter.len();
    let mut best = 0.0f64;
    for window in longer.windows(width) {
        let score = ratio_chars(shorter, window);
        if score > best {
            best = score;
            if best >= 100.0 {
                break;
            }
        }
    }
    best
}
