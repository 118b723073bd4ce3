//! 同一批次内按逻辑键去重

use std::collections::HashMap;
use std::hash::Hash;

/// 每个逻辑键只保留最后一次出现的条目
///
/// 输出保持各键最后一次出现的相对顺序；`key_of` 返回 `None` 的条目（没有逻辑键）原样保留，不参与合并。
pub fn unique_raws_by<T, K, F>(raws: Vec<T>, key_of: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> Option<K>,
{
    if raws.is_empty() {
        return raws;
    }

    let keys: Vec<Option<K>> = raws.iter().map(&key_of).collect();
    let mut last_index: HashMap<&K, usize> = HashMap::with_capacity(raws.len());
    for (index, key) in keys.iter().enumerate() {
        if let Some(key) = key {
            last_index.insert(key, index);
        }
    }

    let keep: Vec<bool> = keys
        .iter()
        .enumerate()
        .map(|(index, key)| match key {
            Some(key) => last_index.get(key) == Some(&index),
            None => true,
        })
        .collect();

    raws.into_iter()
        .zip(keep)
        .filter_map(|(raw, keep)| keep.then_some(raw))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(pair: &(&'static str, &'static str)) -> Option<&'static str> {
        (!pair.0.is_empty()).then_some(pair.0)
    }

    #[test]
    fn last_occurrence_wins() {
        let out = unique_raws_by(vec![("g1", "A"), ("g1", "B")], |p| key(p));
        assert_eq!(out, vec![("g1", "B")]);
    }

    #[test]
    fn order_follows_last_occurrences() {
        let raws = vec![("a", "1"), ("b", "1"), ("a", "2"), ("c", "1"), ("b", "2")];
        let out = unique_raws_by(raws, |p| key(p));
        assert_eq!(out, vec![("a", "2"), ("c", "1"), ("b", "2")]);
    }

    #[test]
    fn keyless_entries_are_never_collapsed() {
        let raws = vec![("", "x"), ("a", "1"), ("", "y")];
        let out = unique_raws_by(raws, |p| key(p));
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let out: Vec<(&str, &str)> = unique_raws_by(Vec::new(), |p| key(p));
        assert!(out.is_empty());
    }
}
