use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_put_and_query_both_directions() {
    let mut map = BidirectionalManyToOneMap::new();
    map.put(1u32, 10).unwrap();
    map.put(2, 10).unwrap();
    map.put(3, 20).unwrap();

    assert_eq!(map.get(&1), Some(10));
    assert_eq!(map.keys_for(&10).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(map.representative(&10), Some(1));
    assert_eq!(map.values(), vec![10, 20]);
    assert_eq!(map.len(), 3);
}

#[test]
fn test_rejects_chains_and_self_mappings() {
    let mut map = BidirectionalManyToOneMap::new();
    map.put(1u32, 10).unwrap();
    assert!(map.put(10, 30).is_err(), "value cannot become a key");
    assert!(map.put(5, 1).is_err(), "key cannot become a value");
    assert!(map.put(7, 7).is_err());
    assert!(map.put(1, 20).is_err(), "key is already mapped");
    assert_eq!(map.len(), 1);
}

#[test]
fn test_removing_representative_promotes_next_key() {
    let mut map = BidirectionalManyToOneMap::new();
    map.put(1u32, 10).unwrap();
    map.put(2, 10).unwrap();
    assert_eq!(map.remove_key(&1), Some(10));
    assert_eq!(map.representative(&10), Some(2));
    assert_eq!(map.remove_key(&2), Some(10));
    assert!(!map.contains_value(&10));
    assert_eq!(map.representative(&10), None);
}

#[test]
fn test_set_representative_requires_membership() {
    let mut map = BidirectionalManyToOneMap::new();
    map.put(1u32, 10).unwrap();
    map.put(2, 10).unwrap();
    map.set_representative(10, 2).unwrap();
    assert_eq!(map.representative(&10), Some(2));
    assert!(map.set_representative(10, 3).is_err());
}

#[test]
fn test_remove_value_drops_all_keys() {
    let mut map = BidirectionalManyToOneMap::new();
    map.put(1u32, 10).unwrap();
    map.put(2, 10).unwrap();
    map.put(3, 20).unwrap();
    assert_eq!(map.remove_value(&10), vec![1, 2]);
    assert_eq!(map.entries(), vec![(3, 20)]);
}

proptest! {
    #[test]
    fn forward_and_inverse_stay_consistent(
        ops in prop::collection::vec((0u32..40, 0u32..40, any::<bool>()), 0..60)
    ) {
        let mut map = BidirectionalManyToOneMap::new();
        for (key, value, remove) in ops {
            if remove {
                map.remove_key(&key);
            } else {
                let _ = map.put(key, value);
            }
        }
        for (key, value) in map.entries() {
            prop_assert_ne!(key, value);
            prop_assert!(!map.contains_key(&value), "chain through {}", value);
            prop_assert!(map.keys_for(&value).any(|k| k == key));
            let representative = map.representative(&value);
            prop_assert!(representative.is_some());
            prop_assert_eq!(map.get(&representative.unwrap()), Some(value));
        }
        let inverse_total: usize = map.values().iter().map(|v| map.keys_for(v).count()).sum();
        prop_assert_eq!(inverse_total, map.len());
    }
}
