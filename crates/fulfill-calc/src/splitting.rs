//! 超重批次分拆
//!
//! 單一出貨點的配置總重超過路線承重上限時，分拆為多個批次。
//! 單件重量大的商品先配，空批次至少裝一件以保證前進。

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use fulfill_core::Product;

/// 批次分拆器
pub struct ShipmentSplitter;

impl ShipmentSplitter {
    /// 依單批次重量上限將商品件數分組
    ///
    /// 總重在上限內回傳單一分組；分組內數量總和恆等於輸入。
    pub fn split(items: &[(Product, u32)], max_weight_kgs: Decimal) -> Vec<BTreeMap<i64, u32>> {
        let positive: Vec<(&Product, u32)> = items
            .iter()
            .filter(|(_, qty)| *qty > 0)
            .map(|(product, qty)| (product, *qty))
            .collect();
        if positive.is_empty() {
            return Vec::new();
        }

        let total_weight: Decimal = positive
            .iter()
            .map(|(product, qty)| product.unit_weight_kgs() * Decimal::from(*qty))
            .sum();
        if total_weight <= max_weight_kgs {
            return vec![positive
                .iter()
                .map(|(product, qty)| (product.id, *qty))
                .collect()];
        }

        let mut trackers = positive;
        trackers.sort_by(|a, b| {
            b.0.unit_weight_kgs()
                .cmp(&a.0.unit_weight_kgs())
                .then(a.0.id.cmp(&b.0.id))
        });

        let mut groups: Vec<BTreeMap<i64, u32>> = Vec::new();
        while trackers.iter().any(|(_, remaining)| *remaining > 0) {
            let mut group: BTreeMap<i64, u32> = BTreeMap::new();
            let mut group_weight = Decimal::ZERO;

            for (product, remaining) in trackers.iter_mut() {
                if *remaining == 0 {
                    continue;
                }
                let unit_weight = product.unit_weight_kgs();
                let capacity = max_weight_kgs - group_weight;

                let mut units_fit = if capacity <= Decimal::ZERO {
                    0
                } else if unit_weight > Decimal::ZERO {
                    (capacity / unit_weight).floor().to_u32().unwrap_or(0)
                } else {
                    *remaining
                };

                // 空批次至少裝一件，確保每輪都有進度
                if units_fit == 0 && group.is_empty() {
                    units_fit = 1;
                }

                let take = (*remaining).min(units_fit);
                if take > 0 {
                    *group.entry(product.id).or_insert(0) += take;
                    group_weight += unit_weight * Decimal::from(take);
                    *remaining -= take;
                }
            }

            groups.push(group);
        }

        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn product(id: i64, weight_kgs: i64) -> Product {
        Product::new(id, format!("P{id}")).with_weight(Decimal::from(weight_kgs))
    }

    fn total_of(groups: &[BTreeMap<i64, u32>], product_id: i64) -> u32 {
        groups
            .iter()
            .map(|g| g.get(&product_id).copied().unwrap_or(0))
            .sum()
    }

    #[rstest]
    #[case(2, 10, 100, 1)] // 總重在上限內：單一分組
    #[case(40, 10, 100, 5)] // 每批 2 件
    #[case(50, 3, 100, 2)] // 2 + 1
    #[case(120, 2, 100, 2)] // 單件超重：每批一件
    fn test_split_group_counts(
        #[case] unit_weight: i64,
        #[case] qty: u32,
        #[case] limit: i64,
        #[case] expected_groups: usize,
    ) {
        let items = vec![(product(101, unit_weight), qty)];
        let groups = ShipmentSplitter::split(&items, Decimal::from(limit));
        assert_eq!(groups.len(), expected_groups);
        assert_eq!(total_of(&groups, 101), qty);
    }

    #[test]
    fn test_split_overweight_multiple_groups() {
        // 40 公斤 × 10 件 = 400 公斤，上限 100 → 4 批各 2 件餘 2 批...
        let items = vec![(product(101, 40), 10)];
        let groups = ShipmentSplitter::split(&items, Decimal::from(100));

        assert!(groups.len() > 1);
        // 守恆
        assert_eq!(total_of(&groups, 101), 10);
        // 每批不超過上限（單件即超重除外）
        for group in &groups {
            let weight: u32 = group.values().map(|q| q * 40).sum();
            assert!(weight <= 100);
        }
        assert_eq!(groups.len(), 5);
    }

    #[test]
    fn test_split_heaviest_first() {
        // 重的商品先配：首批應以 60 公斤商品開頭
        let items = vec![(product(101, 10), 4), (product(102, 60), 1)];
        let groups = ShipmentSplitter::split(&items, Decimal::from(80));

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0][&102], 1);
        // 剩餘容量 20 公斤 → 再裝 2 件 10 公斤
        assert_eq!(groups[0][&101], 2);
        assert_eq!(total_of(&groups, 101), 4);
    }

    #[test]
    fn test_split_single_overweight_unit_still_ships() {
        // 單件 120 公斤超過上限 100：仍需成批（每批一件）
        let items = vec![(product(101, 120), 2)];
        let groups = ShipmentSplitter::split(&items, Decimal::from(100));
        assert_eq!(groups.len(), 2);
        assert_eq!(total_of(&groups, 101), 2);
    }

    #[test]
    fn test_split_ignores_zero_quantities() {
        let items = vec![(product(101, 1), 0)];
        assert!(ShipmentSplitter::split(&items, Decimal::from(100)).is_empty());
    }
}
