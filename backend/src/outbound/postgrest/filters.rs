//! PostgREST filter expressions for `parallel_users`.
//!
//! Values are always double-quoted inside `or=(...)` groups so commas,
//! parentheses and dots in user input cannot change the expression.

pub(super) const TABLE_PATH: &str = "rest/v1/parallel_users";

/// `"value"` with backslashes and quotes escaped.
pub(super) fn quoted(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Equality test usable inside a logical group.
pub(super) fn eq(column: &str, value: &str) -> String {
    format!("{column}.eq.{}", quoted(value))
}

/// `(echelon_id = id OR email = id)`.
pub(super) fn identifier_match(identifier: &str) -> String {
    format!(
        "({},{})",
        eq("echelon_id", identifier),
        eq("email", identifier)
    )
}

/// `((echelon_id = id AND password = pw) OR (email = id AND password = pw))`.
pub(super) fn credentials_match(identifier: &str, password: &str) -> String {
    let password = eq("password", password);
    format!(
        "(and({},{password}),and({},{password}))",
        eq("echelon_id", identifier),
        eq("email", identifier)
    )
}

/// Top-level equality filter value for a `column=eq.value` pair.
pub(super) fn eq_value(value: &str) -> String {
    format!("eq.{value}")
}
