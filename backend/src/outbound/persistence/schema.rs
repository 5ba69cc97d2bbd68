//! Diesel table definitions for the hosted user store.
//!
//! The table is provisioned outside this repository. Keep these definitions
//! aligned with the live schema; `diesel print-schema` regenerates them.

diesel::table! {
    /// Registered identities, one row per user.
    parallel_users (id) {
        id -> Int8,
        echelon_id -> Text,
        name -> Text,
        email -> Text,
        password -> Text,
        wallet_address -> Text,
    }
}
