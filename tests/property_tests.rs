//! Property tests for the cart arithmetic feeding the checkout flow.

use proptest::prelude::*;

use storefront_api::services::checkout::{CheckoutIntent, CheckoutQuery};

fn query(amount: Option<String>, quantity: Option<String>) -> CheckoutQuery {
    CheckoutQuery {
        amount,
        quantity,
        ..Default::default()
    }
}

proptest! {
    /// For in-range inputs the total is exactly price times quantity and
    /// never negative.
    #[test]
    fn total_is_price_times_quantity(price in 0i64..=10_000_000, qty in 0i64..=10_000) {
        let q = query(Some(price.to_string()), Some(qty.to_string()));
        let intent = CheckoutIntent::from_query(&q, "usd");

        let total = intent.total_minor().unwrap();
        prop_assert_eq!(total, price * qty);
        prop_assert!(total >= 0);
    }

    /// Omitting the quantity always means a single item.
    #[test]
    fn missing_quantity_defaults_to_one(price in 1i64..=10_000_000) {
        let q = query(Some(price.to_string()), None);
        let intent = CheckoutIntent::from_query(&q, "usd");

        prop_assert_eq!(intent.quantity, 1);
        prop_assert_eq!(intent.total_minor(), Some(price));
    }

    /// Negative factors never produce a chargeable total.
    #[test]
    fn negative_inputs_never_yield_a_positive_total(
        price in i64::MIN..0,
        qty in proptest::option::of(-1_000i64..=1_000),
    ) {
        let q = query(Some(price.to_string()), qty.map(|v| v.to_string()));
        let intent = CheckoutIntent::from_query(&q, "usd");

        prop_assert!(intent.total_minor().map_or(true, |t| t <= 0));
    }

    /// Whatever junk arrives in the query string, derivation never panics
    /// and an unparseable amount collapses to zero.
    #[test]
    fn arbitrary_strings_never_panic(amount in "\\PC*", quantity in "\\PC*") {
        let q = query(Some(amount.clone()), Some(quantity));
        let intent = CheckoutIntent::from_query(&q, "usd");

        if amount.trim().parse::<i64>().is_err() {
            prop_assert_eq!(intent.unit_price_minor, 0);
        }
        let _ = intent.total_minor();
    }
}
