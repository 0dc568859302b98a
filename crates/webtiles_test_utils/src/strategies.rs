//! Proptest strategies for configuration testing.
//!
//! These strategies generate usernames, per-user path templates and game
//! keys shaped like the ones real deployments use.

use proptest::prelude::*;

/// Usernames accepted by the default nick pattern.
pub fn arb_username() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{3,20}"
}

/// Two different usernames.
pub fn arb_distinct_usernames() -> impl Strategy<Value = (String, String)> {
    (arb_username(), arb_username()).prop_filter("usernames must differ", |(a, b)| a != b)
}

/// Absolute path templates containing at least one `%n`.
pub fn arb_path_template() -> impl Strategy<Value = String> {
    ("(/[a-z0-9_.-]{1,8}){0,3}", "(/[a-z0-9_-]{1,8}){0,2}", any::<bool>()).prop_map(
        |(prefix, suffix, trailing_slash)| {
            let slash = if trailing_slash { "/" } else { "" };
            format!("{prefix}/%n{suffix}{slash}")
        },
    )
}

/// Game registry keys.
pub fn arb_game_key() -> impl Strategy<Value = String> {
    "(dcss|spr|tut|zd)-(git|0\\.[0-9]{2})"
}

/// A list of game keys that may repeat.
pub fn arb_game_keys(max_len: usize) -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(arb_game_key(), 1..max_len)
}
