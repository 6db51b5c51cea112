// eventscrub-core/src/path.rs
//! Dotted key paths and the resolver that finds their targets in an event.
//!
//! A key path such as `exception.values.[].stacktrace.frames.[].vars.password`
//! names a location inside a JSON event. Every segment but the last is walked;
//! the special `[]` segment fans out over every element of an array found at
//! that point. The resolver yields the *containers* (objects) that directly
//! hold the final key, so callers can replace the value in place.
//!
//! Absence is normal for heterogeneous events: a missing key, a scalar where an
//! object was expected, or `[]` over something that is not an array all end a
//! branch silently.
//!
//! License: MIT OR APACHE 2.0

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

/// The segment that means "every element of the array found here".
pub const ARRAY_WILDCARD: &str = "[]";

/// One step of a [`KeyPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Look up this key in an object.
    Key(String),
    /// Fan out over every element of an array.
    EachElement,
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if raw == ARRAY_WILDCARD {
            Segment::EachElement
        } else {
            Segment::Key(raw.to_string())
        }
    }

    /// The textual form of the segment, as written in a dotted path.
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Key(key) => key,
            Segment::EachElement => ARRAY_WILDCARD,
        }
    }
}

/// An immutable, pre-split dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeyPath {
    segments: Vec<Segment>,
}

impl KeyPath {
    /// Splits a dotted path on `.`. The empty string gives the empty path,
    /// which never resolves to anything.
    pub fn parse(dotted: &str) -> Self {
        if dotted.is_empty() {
            return Self::default();
        }
        Self {
            segments: dotted.split('.').map(Segment::parse).collect(),
        }
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            segments: segments.into_iter().map(|s| Segment::parse(s.as_ref())).collect(),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The key the targeted containers must hold. The last segment is always
    /// read as a literal key, even when it is spelled `[]`.
    pub fn final_key(&self) -> Option<&str> {
        self.segments.last().map(Segment::as_str)
    }
}

impl FromStr for KeyPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment.as_str())?;
        }
        Ok(())
    }
}

/// Lazily yields every object under `root` that holds `path`'s final key.
///
/// Each call starts a fresh walk; nothing is shared between iterators.
pub fn target_containers<'a>(root: &'a Value, path: &'a KeyPath) -> TargetContainers<'a> {
    TargetContainers {
        path: path.segments(),
        stack: vec![(root, 0)],
    }
}

/// Iterator returned by [`target_containers`].
///
/// Pending branches are kept on an explicit stack of `(node, next segment)`
/// frames; array elements are pushed in reverse so they come out in order.
#[derive(Debug)]
pub struct TargetContainers<'a> {
    path: &'a [Segment],
    stack: Vec<(&'a Value, usize)>,
}

impl<'a> Iterator for TargetContainers<'a> {
    type Item = &'a Map<String, Value>;

    fn next(&mut self) -> Option<Self::Item> {
        let (last, walk) = self.path.split_last()?;

        'frames: while let Some((mut node, mut idx)) = self.stack.pop() {
            while idx < walk.len() {
                match (&walk[idx], node) {
                    (Segment::EachElement, Value::Array(items)) => {
                        self.stack
                            .extend(items.iter().rev().map(|item| (item, idx + 1)));
                        continue 'frames;
                    }
                    (Segment::Key(key), Value::Object(map)) => match map.get(key) {
                        Some(child) => {
                            node = child;
                            idx += 1;
                        }
                        None => continue 'frames,
                    },
                    _ => continue 'frames,
                }
            }

            if let Value::Object(map) = node {
                if map.contains_key(last.as_str()) {
                    return Some(map);
                }
            }
        }
        None
    }
}

/// Mutable counterpart of [`target_containers`]: calls `visitor` on every
/// matching container, in the same order the iterator would yield them.
///
/// The walk itself never changes the event; only the visitor may. The first
/// error returned by the visitor stops the walk and is handed back.
pub fn visit_target_containers_mut<F, E>(
    root: &mut Value,
    path: &KeyPath,
    visitor: &mut F,
) -> Result<(), E>
where
    F: FnMut(&mut Map<String, Value>) -> Result<(), E>,
{
    visit_mut(root, path.segments(), visitor)
}

fn visit_mut<F, E>(mut node: &mut Value, segments: &[Segment], visitor: &mut F) -> Result<(), E>
where
    F: FnMut(&mut Map<String, Value>) -> Result<(), E>,
{
    let Some((last, walk)) = segments.split_last() else {
        return Ok(());
    };

    for (idx, segment) in walk.iter().enumerate() {
        match (segment, node) {
            (Segment::EachElement, Value::Array(items)) => {
                for item in items.iter_mut() {
                    visit_mut(item, &segments[idx + 1..], visitor)?;
                }
                return Ok(());
            }
            (Segment::Key(key), Value::Object(map)) => match map.get_mut(key) {
                Some(child) => node = child,
                None => return Ok(()),
            },
            _ => return Ok(()),
        }
    }

    if let Value::Object(map) = node {
        if map.contains_key(last.as_str()) {
            visitor(map)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collect<'a>(root: &'a Value, path: &'a KeyPath) -> Vec<&'a Map<String, Value>> {
        target_containers(root, path).collect()
    }

    #[test]
    fn test_parse_and_display() {
        let path = KeyPath::parse("exception.values.[].stacktrace");
        assert_eq!(
            path.segments(),
            &[
                Segment::Key("exception".to_string()),
                Segment::Key("values".to_string()),
                Segment::EachElement,
                Segment::Key("stacktrace".to_string()),
            ]
        );
        assert_eq!(path.to_string(), "exception.values.[].stacktrace");
        assert_eq!(path.final_key(), Some("stacktrace"));
        assert!(KeyPath::parse("").is_empty());
        assert_eq!(KeyPath::parse("").final_key(), None);
    }

    #[test]
    fn test_wildcard_fans_out_in_order() {
        let event = json!({"a": {"b": [{"c": 1}, {"c": 2}]}});
        let path = KeyPath::parse("a.b.[].c");
        let found = collect(&event, &path);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].get("c"), Some(&json!(1)));
        assert_eq!(found[1].get("c"), Some(&json!(2)));
    }

    #[test]
    fn test_absent_path_yields_nothing() {
        let event = json!({});
        let path = KeyPath::parse("x.y.z");
        assert!(collect(&event, &path).is_empty());
    }

    #[test]
    fn test_wildcard_over_object_dead_ends() {
        let event = json!({"a": {"not": "a list"}});
        let path = KeyPath::parse("a.[].b");
        assert!(collect(&event, &path).is_empty());
    }

    #[test]
    fn test_empty_path_yields_nothing() {
        let event = json!({"a": 1});
        let path = KeyPath::default();
        assert!(collect(&event, &path).is_empty());
    }

    #[test]
    fn test_single_segment_targets_root() {
        let event = json!({"token": "abc"});
        let path = KeyPath::parse("token");
        let found = collect(&event, &path);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("token"), Some(&json!("abc")));
    }

    #[test]
    fn test_scalar_in_the_middle_dead_ends() {
        let event = json!({"a": "string", "b": 7, "c": null});
        for dotted in ["a.x", "b.x", "c.x", "a.[].x"] {
            let path = KeyPath::parse(dotted);
            assert!(collect(&event, &path).is_empty(), "{} should not resolve", dotted);
        }
    }

    #[test]
    fn test_nested_wildcards_skip_non_matching_elements() {
        let event = json!({
            "exception": {"values": [
                {"stacktrace": {"frames": [
                    {"vars": {"password": "p1"}},
                    {"vars": {"other": 1}},
                    {"novars": true}
                ]}},
                "not an object",
                {"stacktrace": {"frames": [{"vars": {"password": "p2"}}]}}
            ]}
        });
        let path = KeyPath::parse("exception.values.[].stacktrace.frames.[].vars.password");
        let found: Vec<&Value> = collect(&event, &path)
            .into_iter()
            .filter_map(|m| m.get("password"))
            .collect();
        assert_eq!(found, vec![&json!("p1"), &json!("p2")]);
    }

    #[test]
    fn test_final_key_with_null_value_still_matches() {
        let event = json!({"vars": {"password": null}});
        let path = KeyPath::parse("vars.password");
        assert_eq!(collect(&event, &path).len(), 1);
    }

    #[test]
    fn test_iterator_is_restartable() {
        let event = json!({"a": [{"b": 1}, {"b": 2}]});
        let path = KeyPath::parse("a.[].b");
        assert_eq!(target_containers(&event, &path).count(), 2);
        assert_eq!(target_containers(&event, &path).count(), 2);
    }

    #[test]
    fn test_iterator_is_lazy() {
        let event = json!({"a": [{"b": 1}, {"b": 2}, {"b": 3}]});
        let path = KeyPath::parse("a.[].b");
        let mut iter = target_containers(&event, &path);
        assert_eq!(iter.next().and_then(|m| m.get("b")), Some(&json!(1)));
        assert_eq!(iter.stack.len(), 2);
    }

    #[test]
    fn test_visit_mut_matches_iterator_order() {
        let mut event = json!({"a": {"b": [{"c": 1}, {"x": 0}, {"c": 2}]}});
        let path = KeyPath::parse("a.b.[].c");
        let mut seen = Vec::new();
        visit_target_containers_mut(&mut event, &path, &mut |map: &mut Map<String, Value>| {
            seen.push(map["c"].clone());
            map.insert("c".to_string(), json!("masked"));
            Ok::<(), ()>(())
        })
        .unwrap();
        assert_eq!(seen, vec![json!(1), json!(2)]);
        assert_eq!(event, json!({"a": {"b": [{"c": "masked"}, {"x": 0}, {"c": "masked"}]}}));
    }

    #[test]
    fn test_visit_mut_stops_on_first_error() {
        let mut event = json!({"a": [{"b": 1}, {"b": 2}]});
        let path = KeyPath::parse("a.[].b");
        let mut calls = 0;
        let result = visit_target_containers_mut(&mut event, &path, &mut |_map: &mut Map<String, Value>| {
            calls += 1;
            Err("stop")
        });
        assert_eq!(result, Err("stop"));
        assert_eq!(calls, 1);
    }
}
