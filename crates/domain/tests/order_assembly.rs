//! Integration tests for turning a request into an order without any store.

use chrono::Utc;
use domain::{
    CatalogProduct, Customer, Money, NewOrder, OrderError, OrderId, ProductId, ProductResolution,
    RequestedLine, StockDecrement, requested_product_ids, stock_decrements,
};

fn catalog() -> Vec<CatalogProduct> {
    vec![
        CatalogProduct::new("SKU-001", "Widget", Money::from_cents(1000), 5),
        CatalogProduct::new("SKU-002", "Gadget", Money::from_cents(2000), 5),
        CatalogProduct::new("SKU-003", "Gizmo", Money::from_cents(350), 0),
    ]
}

/// Filters the catalog the way a store answers a bulk lookup.
fn lookup(ids: &[ProductId]) -> Vec<CatalogProduct> {
    catalog()
        .into_iter()
        .filter(|p| ids.contains(&p.id))
        .collect()
}

fn assemble(lines: &[RequestedLine]) -> Result<NewOrder, OrderError> {
    let customer = Customer::new("Alice", "alice@example.com");
    let resolution = ProductResolution::new(lookup(&requested_product_ids(lines)))?;
    let priced = resolution.check_and_price(lines)?;
    Ok(NewOrder::new(&customer, priced))
}

#[test]
fn test_request_becomes_priced_order() {
    let lines = vec![
        RequestedLine::new("SKU-001", 2),
        RequestedLine::new("SKU-002", 1),
    ];

    let order = assemble(&lines)
        .unwrap()
        .into_order(OrderId::new(), Utc::now());

    assert_eq!(order.total(), Money::from_cents(4000));
    assert_eq!(
        order.line(&ProductId::new("SKU-002")).map(|l| l.price),
        Some(Money::from_cents(2000))
    );
    assert_eq!(
        stock_decrements(&lines),
        vec![
            StockDecrement::new("SKU-001", 2),
            StockDecrement::new("SKU-002", 1),
        ]
    );
}

#[test]
fn test_rejections_surface_in_workflow_order() {
    let cases = [
        (
            vec![RequestedLine::new("nope", 1)],
            OrderError::NoValidProducts,
        ),
        (
            vec![
                RequestedLine::new("SKU-001", 1),
                RequestedLine::new("nope", 1),
                RequestedLine::new("SKU-003", 1),
            ],
            OrderError::InvalidProductInList {
                product_id: ProductId::new("nope"),
            },
        ),
        (
            vec![
                RequestedLine::new("SKU-003", 1),
                RequestedLine::new("SKU-001", 9),
            ],
            OrderError::InsufficientStock {
                product_id: ProductId::new("SKU-001"),
                requested: 9,
                available: 5,
            },
        ),
    ];

    for (lines, expected) in cases {
        assert_eq!(assemble(&lines).unwrap_err(), expected);
    }
}

#[test]
fn test_order_serializes_with_plain_ids() {
    let order = assemble(&[RequestedLine::new("SKU-001", 1)])
        .unwrap()
        .into_order(OrderId::new(), Utc::now());

    let json = serde_json::to_value(&order).unwrap();

    assert_eq!(json["id"], order.id.to_string());
    assert_eq!(json["customer_id"], order.customer_id.to_string());
    assert_eq!(json["lines"][0]["product_id"], "SKU-001");

    let back: domain::Order = serde_json::from_value(json).unwrap();
    assert_eq!(back, order);
}
