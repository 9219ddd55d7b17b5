use strsim::levenshtein;

/// Closest defined method to a name tests call but nothing defines.
pub(crate) fn suggest_similar_method<'a>(
    called: &str,
    defined: impl IntoIterator<Item = &'a str>,
) -> Option<&'a str> {
    let target = called.to_lowercase();
    let mut scored: Vec<(i32, &'a str)> = defined
        .into_iter()
        .filter_map(|candidate| {
            let cand = candidate.to_lowercase();
            let dist = levenshtein(&target, &cand) as i32;
            let prefix = common_prefix_len(&target, &cand) as i32;
            let score = prefix - dist * 4;

            let max_dist = (target.len().max(cand.len()) / 3).max(2) as i32;
            let passes = dist <= max_dist || (prefix >= 5 && dist <= max_dist * 2);
            passes.then_some((score, candidate))
        })
        .collect();

    scored.sort_by(|(sa, a), (sb, b)| sb.cmp(sa).then_with(|| a.cmp(b)));
    scored.into_iter().next().map(|(_, name)| name)
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.bytes().zip(b.bytes()).take_while(|(x, y)| x == y).count()
}
