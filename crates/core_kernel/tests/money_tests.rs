//! Unit tests for the Money module
//!
//! Tests cover money creation, arithmetic, currency handling, hourly
//! labor rates and display formatting.

use core_kernel::{Money, Currency, MoneyError, HourlyRate};
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_creates_money_with_correct_amount() {
        let m = Money::new(dec!(975.00), Currency::USD);
        assert_eq!(m.amount(), dec!(975.00));
        assert_eq!(m.currency(), Currency::USD);
    }

    #[test]
    fn test_new_rounds_to_four_decimal_places() {
        let m = Money::new(dec!(100.123456789), Currency::USD);
        assert_eq!(m.amount(), dec!(100.1235));
    }

    #[test]
    fn test_zero_creates_zero_amount() {
        let m = Money::zero(Currency::CAD);
        assert!(m.is_zero());
        assert_eq!(m.currency(), Currency::CAD);
    }

    #[test]
    fn test_negative_amount_creation() {
        let m = Money::new(dec!(-100.00), Currency::USD);
        assert!(m.is_negative());
        assert!(!m.is_positive());
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_checked_add_currency_mismatch() {
        let a = Money::new(dec!(100.00), Currency::USD);
        let b = Money::new(dec!(50.00), Currency::EUR);
        let result = a.checked_add(&b);
        assert!(matches!(result, Err(MoneyError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn test_checked_sub_can_go_negative() {
        let a = Money::new(dec!(2850.00), Currency::USD);
        let b = Money::new(dec!(3200.00), Currency::USD);
        let result = a.checked_sub(&b).unwrap();
        assert_eq!(result.amount(), dec!(-350.00));
    }

    #[test]
    fn test_multiply_by_fractional_hours() {
        let m = Money::new(dec!(150.00), Currency::USD);
        assert_eq!(m.checked_multiply(dec!(1.5)).unwrap().amount(), dec!(225.00));
    }

    #[test]
    fn test_clamp_non_negative() {
        let negative = Money::new(dec!(-20), Currency::USD);
        let positive = Money::new(dec!(20), Currency::USD);
        assert!(negative.clamp_non_negative().is_zero());
        assert_eq!(positive.clamp_non_negative(), positive);
    }

    #[test]
    fn test_round_to_currency() {
        let m = Money::new(dec!(10.005), Currency::USD);
        assert_eq!(m.round_to_currency().amount(), dec!(10.00));
    }
}

mod hourly_rate {
    use super::*;

    #[test]
    fn test_standard_body_shop_rate() {
        let rate = HourlyRate::new(Money::new(dec!(150), Currency::USD)).unwrap();
        assert_eq!(rate.cost_for(dec!(1.5)).unwrap().amount(), dec!(225));
        assert_eq!(rate.cost_for(dec!(2.0)).unwrap().amount(), dec!(300));
        assert_eq!(rate.currency(), Currency::USD);
    }

    #[test]
    fn test_rate_display() {
        let rate = HourlyRate::new(Money::new(dec!(150), Currency::USD)).unwrap();
        assert_eq!(rate.to_string(), "$150.00/h");
    }
}

mod currency {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::USD);
        assert_eq!(" GBP ".parse::<Currency>().unwrap(), Currency::GBP);
    }

    #[test]
    fn test_parse_unknown() {
        assert!(matches!(
            "XYZ".parse::<Currency>(),
            Err(MoneyError::UnknownCurrency(_))
        ));
    }

    #[test]
    fn test_money_display() {
        let m = Money::new(dec!(2850), Currency::USD);
        assert_eq!(m.to_string(), "$2850.00");
    }

    #[test]
    fn test_serde_uppercase() {
        let json = serde_json::to_string(&Currency::EUR).unwrap();
        assert_eq!(json, "\"EUR\"");
    }
}
