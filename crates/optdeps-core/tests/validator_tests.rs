//! Tests for declaration validation

use optdeps_core::{OptionalPackage, is_valid_spec};
use proptest::prelude::*;
use rstest::rstest;
use serde_json::{Value, json};

#[rstest]
#[case(json!({"name": "x/a", "constraint": "^1.0"}), true)]
#[case(json!({"name": "x/a", "constraint": "^1.0", "dev": true, "module": true}), true)]
#[case(json!({"name": "x/a", "constraint": "^1.0", "unknown": "ignored"}), true)]
#[case(json!({"name": "x/a"}), false)]
#[case(json!({"constraint": "^1.0"}), false)]
#[case(json!({"name": "", "constraint": "^1.0"}), false)]
#[case(json!({"name": "x/a", "constraint": ""}), false)]
#[case(json!({"name": null, "constraint": "^1.0"}), false)]
#[case(json!({"name": "x/a", "constraint": 1}), false)]
#[case(json!([]), false)]
#[case(json!("x/a"), false)]
#[case(json!(null), false)]
fn test_is_valid_spec(#[case] declaration: Value, #[case] expected: bool) {
    assert_eq!(is_valid_spec(&declaration), expected);
}

#[rstest]
#[case("^1.0")]
#[case("~2.3")]
#[case(">=1.0,<2.0")]
#[case(">=1.0 <2.0 || ^3.0")]
#[case("1.0.*")]
#[case("dev-master")]
#[case("^2.0@beta")]
#[case("1.0 - 2.0")]
#[case("*")]
fn test_constraints_accepted_by_package(#[case] constraint: &str) {
    assert!(
        OptionalPackage::new("vendor/pkg", constraint).is_ok(),
        "constraint should be accepted: {constraint}"
    );
}

proptest! {
    #[test]
    fn prop_present_non_empty_fields_are_valid(name in ".+", constraint in ".+") {
        let declaration = json!({"name": name, "constraint": constraint});
        prop_assert!(is_valid_spec(&declaration));
    }

    #[test]
    fn prop_missing_constraint_is_invalid(name in ".*") {
        let declaration = json!({"name": name});
        prop_assert!(!is_valid_spec(&declaration));
    }

    #[test]
    fn prop_missing_name_is_invalid(constraint in ".*") {
        let declaration = json!({"constraint": constraint});
        prop_assert!(!is_valid_spec(&declaration));
    }

    #[test]
    fn prop_validation_is_idempotent(name in ".*", constraint in ".*", dev in any::<bool>()) {
        let declaration = json!({"name": name, "constraint": constraint, "dev": dev});
        prop_assert_eq!(is_valid_spec(&declaration), is_valid_spec(&declaration));
    }
}
