//! Two-level grouping of flat joined rows (parent columns repeated per child row).

use std::collections::HashMap;
use std::hash::Hash;

/// Groups flat rows by a parent key, preserving the order in which groups are first seen.
///
/// `group_of` yields the parent key and the parent value built from the first row of each
/// group. `item_of` yields the child carried by a row, or `None` for rows produced by an
/// outer join with no child; such rows still create their group.
pub fn group_flat_rows<R, K, G, I, FG, FI>(
    rows: impl IntoIterator<Item = R>,
    mut group_of: FG,
    mut item_of: FI,
) -> Vec<(G, Vec<I>)>
where
    K: Eq + Hash,
    FG: FnMut(&R) -> (K, G),
    FI: FnMut(&R) -> Option<I>,
{
    let mut groups: Vec<(G, Vec<I>)> = Vec::new();
    let mut index: HashMap<K, usize> = HashMap::new();

    for row in rows {
        let (key, group) = group_of(&row);
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push((group, Vec::new()));
            groups.len() - 1
        });

        if let Some(item) = item_of(&row) {
            groups[slot].1.push(item);
        }
    }

    groups
}
