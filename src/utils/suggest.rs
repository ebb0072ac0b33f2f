fn normalize(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut curr = Vec::with_capacity(prev.len());
        curr.push(i + 1);
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            let best = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
            curr.push(best);
        }
        prev = curr;
    }
    prev[b_chars.len()]
}

fn distance(input: &str, candidate: &str) -> Option<usize> {
    let a = normalize(input);
    let b = normalize(candidate);
    if a.is_empty() || b.is_empty() {
        return None;
    }
    if a == b {
        return Some(0);
    }
    if a.contains(&b) || b.contains(&a) {
        return Some(1);
    }
    Some(edit_distance(&a, &b))
}

fn tolerance(input: &str) -> usize {
    match normalize(input).len() {
        0 => 0,
        1..=4 => 1,
        5..=8 => 2,
        len => (len / 3).max(3),
    }
}

/// Closest candidates to `input`, best first, for "did you mean" hints.
pub fn suggest<S: AsRef<str>>(input: &str, candidates: &[S], limit: usize) -> Vec<String> {
    let allowed = tolerance(input);
    let mut scored: Vec<(usize, &str)> = candidates
        .iter()
        .map(|candidate| candidate.as_ref())
        .filter_map(|candidate| {
            distance(input, candidate)
                .filter(|score| *score <= allowed)
                .map(|score| (score, candidate))
        })
        .collect();
    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    scored.dedup_by(|a, b| a.1 == b.1);
    scored
        .into_iter()
        .take(limit.max(1))
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}
