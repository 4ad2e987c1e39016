//! Tokenizer properties: index/query symmetry, detokenizer round trips,
//! punctuation preservation, quote normalization.

use fubber_core::tokenizer::{detokenize, tokenize};

/// Any token-producing substring of a source tokenizes to a contiguous
/// substring of the source's tokenization.
#[test]
fn query_terms_share_the_index_vocabulary() {
    let sources = [
        "function getUserById($id) { return $this->users[$id]; }",
        "class OrderService:\n    def cancel_order(self, order_id): ...",
        "const fetchUser = async (id) => get(`/users/${id}`);",
        ".nav a:hover { color: #fff; }",
    ];
    let terms = [
        "getUserById",
        "cancel_order",
        "fetchUser",
        "OrderService",
        "users",
        "hover",
    ];

    for source in sources {
        let indexed = tokenize(source);
        for term in terms {
            if !source.contains(term) {
                continue;
            }
            let needle = tokenize(term);
            assert!(
                indexed.contains(&needle),
                "tokenize({term:?}) = {needle:?} not found in tokenize({source:?}) = {indexed:?}"
            );
        }
    }
}

/// Letters, digits and single spaces survive a full round trip.
#[test]
fn alphanumeric_round_trip() {
    for s in [
        "the quick brown fox",
        "error 404 not found",
        "a1 b2 c3",
        "singleword",
    ] {
        assert_eq!(detokenize(&tokenize(s)), s, "round trip of {s:?}");
    }
}

/// Every non-word character in the source survives as exactly one
/// decoded non-word character.
#[test]
fn punctuation_count_is_preserved() {
    let count = |s: &str| {
        s.chars()
            .filter(|c| !c.is_ascii_alphanumeric() && *c != '_' && !c.is_whitespace())
            .count()
    };
    for s in [
        "$user->profile['name']",
        "if (a != b) { c(); }",
        "SELECT * FROM t WHERE x = ?;",
        "régions: été",
    ] {
        let decoded = detokenize(&tokenize(s));
        assert_eq!(count(&decoded), count(s), "punctuation count of {s:?}");
    }
}

/// The two quote styles collapse into one token stream.
#[test]
fn quote_styles_are_one_vocabulary() {
    let double = r#"log("failed to save user")"#;
    let single = r#"log('failed to save user')"#;
    assert_eq!(tokenize(double), tokenize(single));
}

/// The documented end-to-end scenario.
#[test]
fn reference_tokenizations() {
    assert_eq!(tokenize("getUserById"), "get User By Id");
    assert_eq!(tokenize("$userId->name"), "T24K user Id T2d3eK name");
}
