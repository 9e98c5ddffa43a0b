use crate::observer::{Observer, Step};
use crate::types::Group;

/// Drains a whole demand pool into pieces of an unlimited-supply length.
pub trait FallbackPacker {
    fn pack(&self, demands: &[u32], capacity: u32, observer: &dyn Observer) -> Vec<Group>;
}

/// Single pass in the given order: an item joins the open piece if it still
/// fits, otherwise the open piece is closed and the item starts a new one.
///
/// Nothing is ever dropped. An item longer than `capacity` ends up alone in a
/// group whose `used` exceeds its `stock_length`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFitPacker;

impl FallbackPacker for FirstFitPacker {
    fn pack(&self, demands: &[u32], capacity: u32, observer: &dyn Observer) -> Vec<Group> {
        let mut groups = Vec::new();
        let mut current = Group::new(capacity);

        for &len in demands {
            if current.used.saturating_add(len) > capacity && !current.items.is_empty() {
                groups.push(std::mem::replace(&mut current, Group::new(capacity)));
            }
            current.push(len);
        }
        if !current.items.is_empty() {
            groups.push(current);
        }

        observer.on_step(&Step::Packed {
            capacity,
            items: demands.len(),
            groups: groups.len(),
        });
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;

    fn pack(demands: &[u32], capacity: u32) -> Vec<Group> {
        FirstFitPacker.pack(demands, capacity, &NoopObserver)
    }

    #[test]
    fn test_fills_pieces_in_order() {
        let groups = pack(&[3000, 2000, 1500, 1000, 500], 5850);
        let items: Vec<Vec<u32>> = groups.iter().map(|g| g.items.clone()).collect();
        // 1500 does not fit after 3000 + 2000, so the first piece closes.
        assert_eq!(items, vec![vec![3000, 2000], vec![1500, 1000, 500]]);
        assert!(groups.iter().all(|g| g.stock_length == 5850));
        assert_eq!(groups[1].used, 3000);
    }

    #[test]
    fn test_does_not_backfill_closed_pieces() {
        // 400 would fit next to 5000, but the first piece is already closed.
        let groups = pack(&[5000, 3000, 400], 5850);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].items, vec![3000, 400]);
    }

    #[test]
    fn test_two_small_items_share_one_piece() {
        let groups = pack(&[500, 500], 5850);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].items, vec![500, 500]);
        assert_eq!(groups[0].used, 1000);
    }

    #[test]
    fn test_oversized_item_kept_alone() {
        let groups = pack(&[9000, 1000], 5850);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].items, vec![9000]);
        assert!(groups[0].is_over_capacity());
        assert_eq!(groups[1].items, vec![1000]);
    }

    #[test]
    fn test_empty_pool_yields_no_groups() {
        assert!(pack(&[], 5850).is_empty());
    }

    #[test]
    fn test_every_item_placed_once() {
        let demands = [4000, 4000, 3000, 2500, 900, 900, 100];
        let groups = pack(&demands, 5850);
        let mut placed: Vec<u32> = groups.iter().flat_map(|g| g.items.clone()).collect();
        placed.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(placed, demands.to_vec());
        assert!(groups.iter().all(|g| g.used <= 5850));
    }
}
