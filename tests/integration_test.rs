//! 集成測試

use std::collections::BTreeMap;

use fulfill::{
    FulfillmentRequest, InMemoryCatalog, OptimizationResult, Optimizer, PackageSpec,
    PickupLocation, Product, RateQuote, RateSource,
};
use rust_decimal::Decimal;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// 固定費率的測試來源：重量不超過上限即回覆報價
struct FlatRateSource {
    max_weight_kgs: Decimal,
    rate: Decimal,
}

impl FlatRateSource {
    fn new(max_weight_kgs: i64, rate: i64) -> Self {
        Self {
            max_weight_kgs: Decimal::from(max_weight_kgs),
            rate: Decimal::from(rate),
        }
    }
}

impl RateSource for FlatRateSource {
    fn acquire_token(&self) -> fulfill::Result<()> {
        Ok(())
    }

    fn available_options(
        &self,
        _pickup: &str,
        _delivery: &str,
        weight_kgs: Decimal,
        _cod: bool,
    ) -> fulfill::Result<Vec<RateQuote>> {
        if weight_kgs <= self.max_weight_kgs {
            Ok(vec![RateQuote::new("Budget Express", self.rate)])
        } else {
            Ok(Vec::new())
        }
    }
}

struct NoRateSource;

impl RateSource for NoRateSource {
    fn acquire_token(&self) -> fulfill::Result<()> {
        Ok(())
    }

    fn available_options(
        &self,
        _pickup: &str,
        _delivery: &str,
        _weight_kgs: Decimal,
        _cod: bool,
    ) -> fulfill::Result<Vec<RateQuote>> {
        Ok(Vec::new())
    }
}

fn widget() -> Product {
    Product::new(101, "Widget")
        .with_dimensions(Decimal::from(10), Decimal::from(10), Decimal::from(10))
        .with_weight(Decimal::from(2))
}

fn medium_box(id: i64) -> PackageSpec {
    PackageSpec::new(
        id,
        "Medium Box",
        Decimal::from(30),
        Decimal::from(30),
        Decimal::from(30),
        Decimal::from(8),
    )
}

fn request(entries: &[(i64, u32)]) -> FulfillmentRequest {
    FulfillmentRequest::new(entries.iter().copied().collect(), "560001")
}

#[test]
fn test_single_location_full_fulfillment() {
    init_tracing();

    // 場景：單一出貨點、庫存與包材充足、路線有報價
    let catalog = InMemoryCatalog::new()
        .with_product(widget())
        .with_location(PickupLocation::new(1, "Bangalore Depot").with_postcode("110001"))
        .with_product_stock(101, 1, 10)
        .with_package(medium_box(7))
        .with_package_stock(7, 1, 5);
    let rates = FlatRateSource::new(500, 10);

    let result = Optimizer::new(&catalog, &rates).optimize(&request(&[(101, 2)]));

    assert!(result.success);
    assert!(result.can_fulfill_order);
    assert!(result.all_couriers_available);
    assert_eq!(result.shipment_count, 1);
    assert_eq!(result.shortfall, 0);
    assert_eq!(
        result.description.as_deref(),
        Some("All from Bangalore Depot")
    );

    let shipment = &result.shipments[0];
    assert_eq!(shipment.total_quantity, 2);
    assert_eq!(shipment.selected_courier.as_deref(), Some("Budget Express"));
    assert_eq!(shipment.shipping_cost, Decimal::from(10));
    assert_eq!(
        result.total_cost,
        result.total_packaging_cost + result.total_shipping_cost
    );
}

#[test]
fn test_rejects_when_package_stock_is_zero() {
    init_tracing();

    // 場景：有庫存但所有包材數量為零
    let catalog = InMemoryCatalog::new()
        .with_product(widget())
        .with_location(PickupLocation::new(1, "Bangalore Depot").with_postcode("110001"))
        .with_product_stock(101, 1, 10)
        .with_package(medium_box(7))
        .with_package_stock(7, 1, 0);
    let rates = FlatRateSource::new(500, 10);

    let result = Optimizer::new(&catalog, &rates).optimize(&request(&[(101, 2)]));

    assert!(!result.success);
    assert_eq!(
        result.message.as_deref(),
        Some(
            "Product 'Widget' cannot be packaged. Stock available: 10, but no packages are \
             available at pickup locations (all packages have 0 quantity). Requested: 2"
        )
    );
    assert!(result.shipments.is_empty());
}

#[test]
fn test_rejects_custom_allocation_with_all_zero_quantities() {
    init_tracing();

    let catalog = InMemoryCatalog::new()
        .with_product(widget())
        .with_location(PickupLocation::new(1, "Bangalore Depot").with_postcode("110001"))
        .with_product_stock(101, 1, 10)
        .with_package(medium_box(7))
        .with_package_stock(7, 1, 5);
    let rates = FlatRateSource::new(500, 10);

    let mut custom: BTreeMap<i64, BTreeMap<i64, u32>> = BTreeMap::new();
    custom.insert(101, [(1i64, 0u32)].into_iter().collect());
    let req = request(&[(101, 2)]).with_custom_allocations(custom);

    let result = Optimizer::new(&catalog, &rates).optimize(&req);

    assert!(!result.success);
    assert_eq!(
        result.message.as_deref(),
        Some("No valid allocations specified")
    );
}

#[test]
fn test_overweight_order_splits_into_multiple_shipments() {
    init_tracing();

    // 場景：4 件 × 40 公斤 = 160 公斤，路線上限 100 公斤 → 兩批
    let catalog = InMemoryCatalog::new()
        .with_product(
            Product::new(201, "Anvil")
                .with_dimensions(Decimal::from(20), Decimal::from(20), Decimal::from(20))
                .with_weight(Decimal::from(40)),
        )
        .with_location(PickupLocation::new(1, "Chennai Depot").with_postcode("600001"))
        .with_product_stock(201, 1, 10)
        .with_package(PackageSpec::new(
            9,
            "Crate",
            Decimal::from(60),
            Decimal::from(60),
            Decimal::from(60),
            Decimal::from(20),
        ))
        .with_package_stock(9, 1, 10);
    let rates = FlatRateSource::new(100, 25);

    let result = Optimizer::new(&catalog, &rates).optimize(&request(&[(201, 4)]));

    assert!(result.success);
    assert_eq!(result.shipment_count, 2);
    assert_eq!(
        result.description.as_deref(),
        Some("All from Chennai Depot (2 shipments)")
    );

    // 件數守恆，且每批皆在路線上限內
    let shipped: u32 = result.shipments.iter().map(|s| s.total_quantity).sum();
    assert_eq!(shipped, 4);
    for shipment in &result.shipments {
        assert!(shipment.total_weight_kgs <= Decimal::from(100));
        assert!(shipment.selected_courier.is_some());
    }
}

#[test]
fn test_split_across_locations_description() {
    init_tracing();

    // 場景：兩種商品各只在一個出貨點有庫存
    let catalog = InMemoryCatalog::new()
        .with_product(widget())
        .with_product(
            Product::new(102, "Gadget")
                .with_dimensions(Decimal::from(5), Decimal::from(5), Decimal::from(5))
                .with_weight(Decimal::ONE),
        )
        .with_location(PickupLocation::new(1, "North").with_postcode("110001"))
        .with_location(PickupLocation::new(2, "South").with_postcode("600001"))
        .with_product_stock(101, 1, 10)
        .with_product_stock(102, 2, 10)
        .with_package(medium_box(7))
        .with_package_stock(7, 1, 5)
        .with_package_stock(7, 2, 5);
    let rates = FlatRateSource::new(500, 10);

    let result = Optimizer::new(&catalog, &rates).optimize(&request(&[(101, 2), (102, 1)]));

    assert!(result.success);
    assert_eq!(result.shipment_count, 2);
    assert_eq!(
        result.description.as_deref(),
        Some("Split: North (2 items) + South (1 items)")
    );
    // 成本高的批次在前
    assert!(result.shipments[0].total_cost() >= result.shipments[1].total_cost());
}

#[test]
fn test_no_shipping_options_degrades_but_still_packs() {
    init_tracing();

    // 全路線皆無報價：批次照常裝箱，結果降級為部分可運
    let catalog = InMemoryCatalog::new()
        .with_product(widget())
        .with_location(PickupLocation::new(1, "Bangalore Depot").with_postcode("110001"))
        .with_product_stock(101, 1, 10)
        .with_package(medium_box(7))
        .with_package_stock(7, 1, 5);

    let result = Optimizer::new(&catalog, &NoRateSource).optimize(&request(&[(101, 2)]));

    assert!(result.success);
    assert!(!result.all_couriers_available);
    assert_eq!(result.shipment_count, 1);
    assert_eq!(
        result.message.as_deref(),
        Some(
            "No shipping options available for any fulfillment strategy. This may be due to \
             weight limits or route restrictions."
        )
    );
    assert_eq!(
        result.unavailability_reason.as_deref(),
        Some(
            "No courier options available between pickup location Bangalore Depot [110001] and \
             delivery postcode [560001] (no alternative locations available)"
        )
    );

    let shipment = &result.shipments[0];
    assert_eq!(shipment.total_quantity, 2);
    assert!(shipment.selected_courier.is_none());
    assert_eq!(shipment.shipping_cost, Decimal::ZERO);
    assert!(result.total_packaging_cost > Decimal::ZERO);
}

#[test]
fn test_optimization_is_deterministic() {
    init_tracing();

    let catalog = InMemoryCatalog::new()
        .with_product(widget())
        .with_location(PickupLocation::new(1, "North").with_postcode("110001"))
        .with_location(PickupLocation::new(2, "South").with_postcode("600001"))
        .with_product_stock(101, 1, 10)
        .with_product_stock(101, 2, 10)
        .with_package(medium_box(7))
        .with_package_stock(7, 1, 5)
        .with_package_stock(7, 2, 5);
    let rates = FlatRateSource::new(500, 10);
    let optimizer = Optimizer::new(&catalog, &rates);

    let first = optimizer.optimize(&request(&[(101, 3)]));
    let second = optimizer.optimize(&request(&[(101, 3)]));

    // 批次ID由出貨點與序號導出：整個結果逐欄位相等
    assert_eq!(first, second);
    assert!(first.success);
    assert_eq!(first.shipment_count, 1);
}

#[test]
fn test_result_serializes_to_json() -> anyhow::Result<()> {
    init_tracing();

    let catalog = InMemoryCatalog::new()
        .with_product(widget())
        .with_location(PickupLocation::new(1, "Bangalore Depot").with_postcode("110001"))
        .with_product_stock(101, 1, 10)
        .with_package(medium_box(7))
        .with_package_stock(7, 1, 5);
    let rates = FlatRateSource::new(500, 10);

    let result = Optimizer::new(&catalog, &rates).optimize(&request(&[(101, 2)]));

    let json = serde_json::to_string(&result)?;
    let parsed: OptimizationResult = serde_json::from_str(&json)?;
    assert_eq!(parsed, result);
    Ok(())
}
