//! Validation of raw optional-package declarations.
//!
//! Declarations are read from the manifest's `extra.<tool-key>` array and are
//! untrusted. [`is_valid_spec`] is the gate every declaration passes before
//! the engine builds an [`OptionalPackage`](crate::OptionalPackage) from it.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Package names are a single token or `vendor/token`.
static PACKAGE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*(/[A-Za-z0-9][A-Za-z0-9_.-]*)?$")
        .expect("package name pattern is valid")
});

/// Returns `true` if the declaration has non-empty string `name` and
/// `constraint` fields.
///
/// Never panics. Missing keys, wrong types and non-object declarations all
/// yield `false`.
///
/// ```
/// use optdeps_core::is_valid_spec;
/// use serde_json::json;
///
/// assert!(is_valid_spec(&json!({"name": "vendor/pkg", "constraint": "^1.0"})));
/// assert!(!is_valid_spec(&json!({"name": "vendor/pkg"})));
/// assert!(!is_valid_spec(&json!("vendor/pkg")));
/// ```
pub fn is_valid_spec(declaration: &Value) -> bool {
    non_empty_str(declaration, "name").is_some()
        && non_empty_str(declaration, "constraint").is_some()
}

/// Check a package name against the name grammar.
pub fn is_valid_package_name(name: &str) -> bool {
    PACKAGE_NAME.is_match(name)
}

pub(crate) fn non_empty_str<'a>(declaration: &'a Value, key: &str) -> Option<&'a str> {
    declaration
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
