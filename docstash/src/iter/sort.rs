use std::cmp::Ordering;
use std::collections::HashMap;

/// Turns a caller-supplied less-than function into a total [`Ordering`].
///
/// Pairs for which the function answers the same in both directions compare equal,
/// so a non-strict comparator (`<=`) still yields a consistent order.
#[inline]
fn ordering<A: ?Sized>(less: &impl Fn(&A, &A) -> bool, a: &A, b: &A) -> Ordering {
    match (less(a, b), less(b, a)) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Stable sort of `keys` by the documents they point at.
///
/// Pairs are built in `keys` order, so documents that compare equal keep that order.
/// Keys with no document in `values` are dropped.
pub(crate) fn sort_by_value<T, F>(keys: &[String], values: &HashMap<String, T>, less: F) -> Vec<String>
where
    F: Fn(&T, &T) -> bool,
{
    let mut pairs: Vec<(&String, &T)> = keys
        .iter()
        .filter_map(|key| values.get(key).map(|value| (key, value)))
        .collect();

    // slice::sort_by is a stable merge sort
    pairs.sort_by(|a, b| ordering(&less, a.1, b.1));
    pairs.into_iter().map(|(key, _)| key.clone()).collect()
}

/// Stable sort of `keys` by the keys themselves. The input slice is left untouched.
pub(crate) fn sort_by_key<F>(keys: &[String], less: F) -> Vec<String>
where
    F: Fn(&str, &str) -> bool,
{
    let mut sorted = keys.to_vec();
    sorted.sort_by(|a, b| ordering(&less, a.as_str(), b.as_str()));
    sorted
}
