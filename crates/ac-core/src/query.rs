//! The read-only query sublanguage evaluated against a frame state.
//!
//! Two resolver strategies sit behind one dispatch: general path
//! expressions (`.state.enemies[3].position.x`) walk the state's
//! JSON-equivalent tree, and legacy flat keywords (`bricks_remaining`)
//! hit a per-game table of named computed values. A query is routed to
//! the path walker when it carries structural syntax -- a leading `.`
//! or a `[` anywhere -- and to the keyword table otherwise.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Failure modes for a query. Each variant names the offending fragment
/// so callers can tell a typo from an out-of-range index. A query that
/// *succeeds* with a JSON `null` is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("no such query `{0}`")]
    NoSuchQuery(String),

    #[error("path does not resolve at `{fragment}`")]
    BadPath { fragment: String },

    #[error("index {index} out of bounds (len {len}) at `{fragment}`")]
    IndexOutOfBounds {
        fragment: String,
        index: usize,
        len: usize,
    },

    #[error("bad input argument: {0}")]
    BadInputArg(String),

    #[error("internal serialization failure: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for QueryError {
    fn from(e: serde_json::Error) -> QueryError {
        QueryError::Serialization(e.to_string())
    }
}

/// A named computed value in a game's legacy keyword table.
pub type KeywordFn<S> = fn(&S, &Value) -> Result<Value, QueryError>;

/// True when the query string carries path syntax and should bypass the
/// keyword table.
pub fn is_path_query(query: &str) -> bool {
    query.starts_with('.') || query.contains('[')
}

/// Route a query to the path walker or the keyword table.
///
/// `state` must serialize to the document the path grammar is defined
/// over (the `{config, state}` wrapper each game exposes).
pub fn run_query<S: Serialize>(
    state: &S,
    table: &[(&'static str, KeywordFn<S>)],
    query: &str,
    args: &Value,
) -> Result<Value, QueryError> {
    if is_path_query(query) {
        let doc = serde_json::to_value(state)?;
        eval_path(&doc, query)
    } else if let Some((_, f)) = table.iter().find(|(name, _)| *name == query) {
        f(state, args)
    } else {
        Err(QueryError::NoSuchQuery(query.to_string()))
    }
}

/// Evaluate a path expression against a JSON document.
///
/// Grammar: dot-separated field names, each followed by zero or more
/// `[integer]` index suffixes, applied left to right from the root.
pub fn eval_path(doc: &Value, path: &str) -> Result<Value, QueryError> {
    let mut current = doc;
    let body = path.strip_prefix('.').unwrap_or(path);
    for segment in body.split('.') {
        current = walk_segment(current, segment)?;
    }
    Ok(current.clone())
}

fn walk_segment<'a>(mut current: &'a Value, segment: &str) -> Result<&'a Value, QueryError> {
    let bad = |fragment: &str| QueryError::BadPath {
        fragment: fragment.to_string(),
    };

    let (name, mut rest) = match segment.find('[') {
        Some(pos) => (&segment[..pos], &segment[pos..]),
        None => (segment, ""),
    };

    if !name.is_empty() {
        current = match current {
            Value::Object(map) => map.get(name).ok_or_else(|| bad(name))?,
            _ => return Err(bad(name)),
        };
    } else if rest.is_empty() {
        // A bare empty segment (e.g. from "..") never resolves.
        return Err(bad(segment));
    }

    while !rest.is_empty() {
        let close = rest.find(']').ok_or_else(|| bad(rest))?;
        let index: usize = rest[1..close].parse().map_err(|_| bad(rest))?;
        rest = &rest[close + 1..];
        current = match current {
            Value::Array(items) => items.get(index).ok_or(QueryError::IndexOutOfBounds {
                fragment: segment.to_string(),
                index,
                len: items.len(),
            })?,
            _ => return Err(bad(segment)),
        };
    }

    Ok(current)
}

/// Read a non-negative integer argument, the common shape for keyword
/// queries that address one entity.
pub fn index_arg(args: &Value) -> Result<usize, QueryError> {
    args.as_u64()
        .map(|n| n as usize)
        .ok_or_else(|| QueryError::BadInputArg(format!("expected integer index, got {}", args)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "config": { "start_lives": 3 },
            "state": {
                "level": 1,
                "score": 0,
                "enemies": [
                    { "position": { "x": 4, "y": 7 } },
                    { "position": { "x": 9, "y": 2 } },
                ],
            },
        })
    }

    #[test]
    fn test_path_walks_fields_and_indices() {
        let d = doc();
        assert_eq!(eval_path(&d, ".state.level").unwrap(), json!(1));
        assert_eq!(
            eval_path(&d, ".state.enemies[1].position.x").unwrap(),
            json!(9)
        );
        assert_eq!(eval_path(&d, ".config.start_lives").unwrap(), json!(3));
    }

    #[test]
    fn test_path_without_root_marker_still_walks() {
        let d = doc();
        assert_eq!(eval_path(&d, "state.enemies[0].position.y").unwrap(), json!(7));
    }

    #[test]
    fn test_missing_field_names_the_fragment() {
        let d = doc();
        match eval_path(&d, ".state.bogus.x") {
            Err(QueryError::BadPath { fragment }) => assert_eq!(fragment, "bogus"),
            other => panic!("expected BadPath, got {:?}", other),
        }
    }

    #[test]
    fn test_index_out_of_bounds_reports_len() {
        let d = doc();
        match eval_path(&d, ".state.enemies[5]") {
            Err(QueryError::IndexOutOfBounds { index, len, .. }) => {
                assert_eq!((index, len), (5, 2));
            }
            other => panic!("expected IndexOutOfBounds, got {:?}", other),
        }
    }

    #[test]
    fn test_index_on_non_array_fails() {
        let d = doc();
        assert!(matches!(
            eval_path(&d, ".state.level[0]"),
            Err(QueryError::BadPath { .. })
        ));
    }

    #[test]
    fn test_malformed_index_fails() {
        let d = doc();
        assert!(matches!(
            eval_path(&d, ".state.enemies[x]"),
            Err(QueryError::BadPath { .. })
        ));
        assert!(matches!(
            eval_path(&d, ".state.enemies[0"),
            Err(QueryError::BadPath { .. })
        ));
    }

    #[test]
    fn test_sniffing_routes_keywords_to_table() {
        #[derive(Serialize)]
        struct S {
            n: i32,
        }
        const TABLE: &[(&str, KeywordFn<S>)] =
            &[("n_doubled", |s: &S, _| Ok(Value::from(s.n * 2)))];

        let s = S { n: 21 };
        assert_eq!(run_query(&s, TABLE, "n_doubled", &Value::Null).unwrap(), json!(42));
        assert_eq!(run_query(&s, TABLE, ".n", &Value::Null).unwrap(), json!(21));
        assert!(matches!(
            run_query(&s, TABLE, "nope", &Value::Null),
            Err(QueryError::NoSuchQuery(_))
        ));
    }

    #[test]
    fn test_index_arg_rejects_non_integers() {
        assert_eq!(index_arg(&json!(3)).unwrap(), 3);
        assert!(matches!(
            index_arg(&json!("three")),
            Err(QueryError::BadInputArg(_))
        ));
        assert!(matches!(
            index_arg(&Value::Null),
            Err(QueryError::BadInputArg(_))
        ));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// The path grammar rejects garbage with errors, never panics.
            #[test]
            fn prop_eval_path_never_panics(path in "[a-z0-9.\\[\\]]{0,40}") {
                let d = doc();
                let _ = eval_path(&d, &path);
            }
        }
    }
}
