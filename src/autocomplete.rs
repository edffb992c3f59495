use std::cmp::Ordering;

/// Filter `items` whose `label` contains `query` (case-insensitive) and rank
/// them: exact matches on `name` first, then alphabetically by label.
/// An empty query keeps everything.
pub fn rank<'a, T, L, N>(items: &'a [T], query: &str, label: L, name: N) -> Vec<&'a T>
where
    L: Fn(&T) -> String,
    N: Fn(&T) -> &str,
{
    let needle = query.trim().to_lowercase();
    let mut matches: Vec<(bool, String, &T)> = items
        .iter()
        .filter_map(|item| {
            let text = label(item);
            let lower = text.to_lowercase();
            if !lower.contains(&needle) {
                return None;
            }
            let exact = !needle.is_empty() && name(item).to_lowercase() == needle;
            Some((exact, lower, item))
        })
        .collect();

    matches.sort_by(|(a_exact, a_label, _), (b_exact, b_label, _)| {
        match (a_exact, b_exact) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => a_label.cmp(b_label),
        }
    });
    matches.into_iter().map(|(_, _, item)| item).collect()
}
