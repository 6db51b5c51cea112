// eventscrub-core/src/maskers.rs
//! Built-in redactors.
//!
//! * [`Scrub`] blanks out whatever it is given.
//! * [`CookieScrubber`] and [`QueryStringScrubber`] mask selected entries of
//!   cookie and query-string values, which error-report SDKs may hand over as
//!   a raw string, an object, or a list of `[name, value]` pairs. The output
//!   keeps the input's shape.
//!
//! For raw strings, a value is re-serialized only when something was actually
//! masked; otherwise the original string comes back untouched so ordering and
//! encoding of unrelated entries survive.
//!
//! Query strings embedded in a URL value are not looked at.
//!
//! License: MIT OR APACHE 2.0

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::errors::RedactError;
use crate::redactor::Redactor;

/// Replacement text for masked values.
pub const MASK_TEXT: &str = "[Scrubbed]";

/// Returns the mask token regardless of input.
pub fn scrub(_value: &Value) -> Result<Value, RedactError> {
    Ok(Value::String(MASK_TEXT.to_string()))
}

/// Redactor form of [`scrub`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Scrub;

impl Redactor for Scrub {
    fn name(&self) -> &str {
        "scrub"
    }

    fn redact(&self, value: &Value) -> Result<Value, RedactError> {
        scrub(value)
    }
}

/// Which entries of a cookie or query-string value to mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySelection {
    /// Every entry.
    All,
    /// Only entries with these names.
    Only(BTreeSet<String>),
}

impl KeySelection {
    pub fn only<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeySelection::Only(keys.into_iter().map(Into::into).collect())
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            KeySelection::All => true,
            KeySelection::Only(keys) => keys.contains(name),
        }
    }
}

/// Masks cookies given as `name=value; ...`, an object, or pairs.
#[derive(Debug, Clone)]
pub struct CookieScrubber {
    keys: KeySelection,
}

impl CookieScrubber {
    pub fn new(keys: KeySelection) -> Self {
        Self { keys }
    }
}

impl Redactor for CookieScrubber {
    fn name(&self) -> &str {
        "scrub_cookies"
    }

    fn redact(&self, value: &Value) -> Result<Value, RedactError> {
        mask_entries(value, &self.keys, mask_cookie_string)
    }
}

/// Masks query strings given as `a=1&b=2`, an object, or pairs.
#[derive(Debug, Clone)]
pub struct QueryStringScrubber {
    keys: KeySelection,
}

impl QueryStringScrubber {
    pub fn new(keys: KeySelection) -> Self {
        Self { keys }
    }
}

impl Redactor for QueryStringScrubber {
    fn name(&self) -> &str {
        "scrub_query_string"
    }

    fn redact(&self, value: &Value) -> Result<Value, RedactError> {
        mask_entries(value, &self.keys, mask_query_string)
    }
}

fn mask_value() -> Value {
    Value::String(MASK_TEXT.to_string())
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Shape dispatch shared by the cookie and query-string redactors.
fn mask_entries(
    value: &Value,
    keys: &KeySelection,
    mask_string: fn(&str, &KeySelection) -> Result<Value, RedactError>,
) -> Result<Value, RedactError> {
    if is_falsy(value) {
        return Ok(value.clone());
    }

    match value {
        Value::Object(map) => Ok(Value::Object(mask_object(map, keys))),
        Value::Array(items) => mask_pairs(items, keys),
        Value::String(raw) => mask_string(raw, keys),
        other => Err(RedactError::UnsupportedShape(type_name(other))),
    }
}

fn mask_object(map: &Map<String, Value>, keys: &KeySelection) -> Map<String, Value> {
    map.iter()
        .map(|(name, val)| {
            let val = if keys.matches(name) { mask_value() } else { val.clone() };
            (name.clone(), val)
        })
        .collect()
}

/// Masks `[name, value]` pairs. With an explicit key set, an element that is
/// not a pair cannot name a selected key and is kept as is; masking every
/// entry needs a name from each element, so there it is an error.
fn mask_pairs(items: &[Value], keys: &KeySelection) -> Result<Value, RedactError> {
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let name = match (item, keys) {
            (Value::Array(pair), _) if !pair.is_empty() => &pair[0],
            (_, KeySelection::Only(_)) => {
                out.push(item.clone());
                continue;
            }
            (_, KeySelection::All) => return Err(RedactError::MalformedPair(i)),
        };
        let selected = match keys {
            KeySelection::All => true,
            KeySelection::Only(_) => name.as_str().is_some_and(|n| keys.matches(n)),
        };
        if selected {
            out.push(Value::Array(vec![name.clone(), mask_value()]));
        } else {
            out.push(item.clone());
        }
    }
    Ok(Value::Array(out))
}

fn mask_cookie_string(raw: &str, keys: &KeySelection) -> Result<Value, RedactError> {
    let masked = try_mask_cookie_string(raw, keys)?;
    Ok(Value::String(masked.unwrap_or_else(|| raw.to_string())))
}

/// Parses and masks a raw cookie header. `Ok(None)` means nothing needed
/// masking.
pub fn try_mask_cookie_string(raw: &str, keys: &KeySelection) -> Result<Option<String>, RedactError> {
    let mut masked_any = false;
    let mut pairs = Vec::new();

    for piece in raw.split(';') {
        let (name, val) = piece
            .split_once('=')
            .ok_or_else(|| RedactError::MalformedCookie(piece.trim().to_string()))?;
        let name = name.trim();
        let mut val = val.trim();

        if keys.matches(name) && !val.is_empty() {
            val = MASK_TEXT;
            masked_any = true;
        }
        pairs.push(format!("{}={}", name, val));
    }

    if !masked_any {
        return Ok(None);
    }
    Ok(Some(pairs.join("; ")))
}

fn mask_query_string(raw: &str, keys: &KeySelection) -> Result<Value, RedactError> {
    let masked = try_mask_query_string(raw, keys);
    Ok(Value::String(masked.unwrap_or_else(|| raw.to_string())))
}

/// Parses and masks a form-encoded query string. `None` means nothing needed
/// masking.
pub fn try_mask_query_string(raw: &str, keys: &KeySelection) -> Option<String> {
    let mut masked_any = false;
    let mut pairs = Vec::new();

    for (name, val) in parse_query_pairs(raw) {
        if keys.matches(&name) && !val.is_empty() {
            masked_any = true;
            pairs.push((name, MASK_TEXT.to_string()));
        } else {
            pairs.push((name, val));
        }
    }

    if !masked_any {
        return None;
    }
    Some(
        pairs
            .iter()
            .map(|(name, val)| format!("{}={}", encode_form(name), encode_form(val)))
            .collect::<Vec<_>>()
            .join("&"),
    )
}

/// Splits on `&`, keeps blank values, and decodes `+` and percent escapes.
pub fn parse_query_pairs(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|piece| !piece.is_empty())
        .map(|piece| {
            let (name, val) = piece.split_once('=').unwrap_or((piece, ""));
            (decode_form(name), decode_form(val))
        })
        .collect()
}

fn decode_form(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned(),
    }
}

fn encode_form(raw: &str) -> String {
    urlencoding::encode(raw).replace("%20", "+")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cookies(keys: &[&str]) -> CookieScrubber {
        CookieScrubber::new(KeySelection::only(keys.iter().copied()))
    }

    fn query(keys: &[&str]) -> QueryStringScrubber {
        QueryStringScrubber::new(KeySelection::only(keys.iter().copied()))
    }

    #[test]
    fn test_scrub_ignores_input() {
        assert_eq!(scrub(&json!({"deep": [1, 2]})).unwrap(), json!(MASK_TEXT));
        assert_eq!(Scrub.redact(&json!(null)).unwrap(), json!(MASK_TEXT));
    }

    #[test]
    fn test_scrub_is_stable_under_remasking() {
        let once = Scrub.redact(&json!("secret")).unwrap();
        let twice = Scrub.redact(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_cookie_string_without_match_is_returned_unchanged() {
        let raw = "x=1;   y=2";
        assert_eq!(cookies(&["z"]).redact(&json!(raw)).unwrap(), json!(raw));
        assert_eq!(try_mask_cookie_string(raw, &KeySelection::only(["z"])).unwrap(), None);
    }

    #[test]
    fn test_cookie_string_masks_selected_key_in_place() {
        let masked = cookies(&["session"])
            .redact(&json!("name=alice; session=abc123"))
            .unwrap();
        assert_eq!(masked, json!("name=alice; session=[Scrubbed]"));
    }

    #[test]
    fn test_cookie_string_skips_empty_values() {
        let raw = "session=; name=alice";
        assert_eq!(cookies(&["session"]).redact(&json!(raw)).unwrap(), json!(raw));
    }

    #[test]
    fn test_cookie_string_mask_all() {
        let scrubber = CookieScrubber::new(KeySelection::All);
        let masked = scrubber.redact(&json!("a=1;b=2; c=")).unwrap();
        assert_eq!(masked, json!("a=[Scrubbed]; b=[Scrubbed]; c="));
    }

    #[test]
    fn test_cookie_string_keeps_equals_in_value() {
        let masked = cookies(&["token"]).redact(&json!("token=a=b; x=y=z")).unwrap();
        assert_eq!(masked, json!("token=[Scrubbed]; x=y=z"));
    }

    #[test]
    fn test_malformed_cookie_is_an_error() {
        let err = try_mask_cookie_string("a=1; broken", &KeySelection::All).unwrap_err();
        assert_eq!(err, RedactError::MalformedCookie("broken".to_string()));
    }

    #[test]
    fn test_cookie_object_masks_selected_keys() {
        let masked = cookies(&["sessionid", "missing"])
            .redact(&json!({"sessionid": "abc", "theme": "dark"}))
            .unwrap();
        assert_eq!(masked, json!({"sessionid": "[Scrubbed]", "theme": "dark"}));
    }

    #[test]
    fn test_cookie_object_mask_all() {
        let masked = CookieScrubber::new(KeySelection::All)
            .redact(&json!({"a": 1, "b": {"nested": true}}))
            .unwrap();
        assert_eq!(masked, json!({"a": "[Scrubbed]", "b": "[Scrubbed]"}));
    }

    #[test]
    fn test_cookie_pairs_mask_selected() {
        let masked = cookies(&["sessionid"])
            .redact(&json!([["sessionid", "abc"], ["theme", "dark"]]))
            .unwrap();
        assert_eq!(masked, json!([["sessionid", "[Scrubbed]"], ["theme", "dark"]]));
    }

    #[test]
    fn test_pairs_mask_all_keeps_names() {
        let masked = QueryStringScrubber::new(KeySelection::All)
            .redact(&json!([["a", "1"], [2, "x"]]))
            .unwrap();
        assert_eq!(masked, json!([["a", "[Scrubbed]"], [2, "[Scrubbed]"]]));
    }

    #[test]
    fn test_selected_keys_leave_non_pairs_alone() {
        let masked = cookies(&["a"])
            .redact(&json!([["a", "1"], "ab", [], 7]))
            .unwrap();
        assert_eq!(masked, json!([["a", "[Scrubbed]"], "ab", [], 7]));
    }

    #[test]
    fn test_mask_all_rejects_non_pairs() {
        let all = CookieScrubber::new(KeySelection::All);
        assert_eq!(all.redact(&json!([["a", "1"], "oops"])).unwrap_err(), RedactError::MalformedPair(1));
        assert_eq!(all.redact(&json!([[]])).unwrap_err(), RedactError::MalformedPair(0));
    }

    #[test]
    fn test_falsy_values_pass_through() {
        for value in [json!(null), json!(""), json!({}), json!([]), json!(false), json!(0)] {
            assert_eq!(cookies(&["a"]).redact(&value).unwrap(), value);
            assert_eq!(query(&["a"]).redact(&value).unwrap(), value);
        }
    }

    #[test]
    fn test_unsupported_shape_is_an_error() {
        assert_eq!(
            cookies(&["a"]).redact(&json!(12)).unwrap_err(),
            RedactError::UnsupportedShape("number")
        );
        assert_eq!(
            query(&["a"]).redact(&json!(true)).unwrap_err(),
            RedactError::UnsupportedShape("bool")
        );
    }

    #[test]
    fn test_query_string_without_match_is_returned_unchanged() {
        let raw = "b=2&a=%7e&c";
        assert_eq!(query(&["z"]).redact(&json!(raw)).unwrap(), json!(raw));
    }

    #[test]
    fn test_query_string_masks_and_reencodes() {
        let masked = query(&["code"])
            .redact(&json!("q=hello+world&code=s3cr%2Ft&empty="))
            .unwrap();
        assert_eq!(masked, json!("q=hello+world&code=%5BScrubbed%5D&empty="));
    }

    #[test]
    fn test_query_string_blank_values_not_masked() {
        let raw = "code=&x=1";
        assert_eq!(query(&["code"]).redact(&json!(raw)).unwrap(), json!(raw));
    }

    #[test]
    fn test_query_string_mask_all() {
        let masked = QueryStringScrubber::new(KeySelection::All)
            .redact(&json!("a=1&&b=two%20words&flag"))
            .unwrap();
        assert_eq!(masked, json!("a=%5BScrubbed%5D&b=%5BScrubbed%5D&flag="));
    }

    #[test]
    fn test_parse_query_pairs() {
        assert_eq!(
            parse_query_pairs("a=1&b=x+y&c&d=%E2%9C%93&&e=%ZZ"),
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "x y".to_string()),
                ("c".to_string(), String::new()),
                ("d".to_string(), "\u{2713}".to_string()),
                ("e".to_string(), "%ZZ".to_string()),
            ]
        );
    }

    #[test]
    fn test_redactor_names() {
        assert_eq!(Scrub.name(), "scrub");
        assert_eq!(cookies(&[]).name(), "scrub_cookies");
        assert_eq!(query(&[]).name(), "scrub_query_string");
    }
}
