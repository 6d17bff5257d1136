//! Property-based tests for parameter binding and template caching.
//!
//! These verify that:
//! - Any bound string round-trips through the database unchanged
//! - Alternating templates never corrupts results or the cache slot

use proptest::prelude::*;
use seshql::core::db::DbSession;

const MEMORY_URL: &str = "jdbc:sqlite::memory:";

fn connected_session() -> DbSession {
    let mut session = DbSession::new();
    assert!(session.connect(MEMORY_URL, "user", "secret"));
    assert_eq!(session.update("CREATE TABLE kv (k TEXT, v TEXT)"), 0);
    session
}

proptest! {
    #[test]
    fn bound_strings_round_trip(value in "[ -~]{1,60}") {
        let mut session = connected_session();

        prop_assert_eq!(
            session.update_with("INSERT INTO kv VALUES ('key', ?)", Some(&value)),
            1
        );

        let result = session
            .query_with("SELECT v FROM kv WHERE k = ?", Some("key"))
            .expect("lookup should succeed");
        prop_assert_eq!(result.row_count, 1);
        prop_assert_eq!(result.rows[0][0].clone(), value);
    }

    #[test]
    fn template_alternation_is_transparent(keys in prop::collection::vec("[a-z]{1,8}", 1..8)) {
        let mut session = connected_session();
        let insert = "INSERT INTO kv VALUES (?, 'x')";
        let lookup = "SELECT k FROM kv WHERE k = ?";

        for key in &keys {
            // Alternating between the two templates recompiles each
            // time; results must stay correct regardless.
            prop_assert_eq!(session.update_with(insert, Some(key)), 1);
            prop_assert_eq!(session.active_template(), Some(insert));

            let result = session
                .query_with(lookup, Some(key))
                .expect("lookup should succeed");
            prop_assert!(result.row_count >= 1);
            prop_assert_eq!(result.rows[0][0].as_str(), key.as_str());
            prop_assert_eq!(session.active_template(), Some(lookup));
        }
    }
}
