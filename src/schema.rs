use alloc::borrow::Cow;
use chrono::{DateTime, FixedOffset};

use crate::number::{
    format_float, parse_base10, parse_base16, parse_base2, parse_base60, parse_base8,
    parse_float, parse_unsigned_base10, parse_unsigned_base16, parse_unsigned_base2,
    parse_unsigned_base60, parse_unsigned_base8,
};
use crate::timestamp::{format_timestamp, is_timestamp, parse_timestamp};
use crate::{
    EventData, SchemaError, ScalarStyle, BOOL_TAG, FLOAT_TAG, INT_TAG, MAP_TAG, NULL_TAG,
    SEQ_TAG, STR_TAG, TIMESTAMP_TAG, YAML_TAG_PREFIX,
};

/// A fully expanded tag.
///
/// Tags of the YAML type repository are stored borrowed; custom tags own
/// their text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagName(Cow<'static, str>);

impl TagName {
    pub const NULL: TagName = TagName(Cow::Borrowed(NULL_TAG));
    pub const BOOL: TagName = TagName(Cow::Borrowed(BOOL_TAG));
    pub const STR: TagName = TagName(Cow::Borrowed(STR_TAG));
    pub const INT: TagName = TagName(Cow::Borrowed(INT_TAG));
    pub const FLOAT: TagName = TagName(Cow::Borrowed(FLOAT_TAG));
    pub const TIMESTAMP: TagName = TagName(Cow::Borrowed(TIMESTAMP_TAG));
    pub const SEQ: TagName = TagName(Cow::Borrowed(SEQ_TAG));
    pub const MAP: TagName = TagName(Cow::Borrowed(MAP_TAG));

    const WELL_KNOWN: [TagName; 8] = [
        TagName::NULL,
        TagName::BOOL,
        TagName::STR,
        TagName::INT,
        TagName::FLOAT,
        TagName::TIMESTAMP,
        TagName::SEQ,
        TagName::MAP,
    ];

    fn well_known(tag: &str) -> Option<TagName> {
        TagName::WELL_KNOWN
            .into_iter()
            .find(|known| known.as_str() == tag)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Is this a `tag:yaml.org,2002:` tag?
    pub fn is_yaml_tag(&self) -> bool {
        self.0.starts_with(YAML_TAG_PREFIX)
    }
}

impl From<&str> for TagName {
    fn from(tag: &str) -> Self {
        TagName::well_known(tag).unwrap_or_else(|| TagName(Cow::Owned(String::from(tag))))
    }
}

impl From<String> for TagName {
    fn from(tag: String) -> Self {
        TagName::well_known(&tag).unwrap_or(TagName(Cow::Owned(tag)))
    }
}

impl PartialEq<str> for TagName {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for TagName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl core::fmt::Display for TagName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The native value of a scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int(i64),
    /// An integer above `i64::MAX`.
    UInt(u64),
    Float(f64),
    Str(String),
    Timestamp(DateTime<FixedOffset>),
}

impl ScalarValue {
    /// The tag a value of this kind carries.
    pub fn tag(&self) -> TagName {
        match self {
            ScalarValue::Null => TagName::NULL,
            ScalarValue::Bool(_) => TagName::BOOL,
            ScalarValue::Int(_) | ScalarValue::UInt(_) => TagName::INT,
            ScalarValue::Float(_) => TagName::FLOAT,
            ScalarValue::Str(_) => TagName::STR,
            ScalarValue::Timestamp(_) => TagName::TIMESTAMP,
        }
    }
}

/// A scalar together with the tag it was resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedScalar {
    pub tag: TagName,
    pub value: ScalarValue,
}

/// An implicit resolution rule: plain scalars accepted by `matches` get
/// `tag`.
#[derive(Debug, Clone)]
pub struct Rule {
    pub tag: TagName,
    pub matches: fn(&str) -> bool,
}

/// A set of tag resolution rules and scalar codecs.
///
/// Implementors provide the rule table and the text to value conversion;
/// everything else has a default built on those.
pub trait Schema {
    fn name(&self) -> &'static str;

    /// Resolution rules for untagged plain scalars, most specific first.
    fn rules(&self) -> &[Rule];

    /// Convert `text` to the native value of `tag`.
    fn parse_value(&self, tag: &TagName, text: &str) -> Result<ScalarValue, SchemaError>;

    /// Can scalars be explicitly tagged with `tag` under this schema?
    fn supports(&self, tag: &TagName) -> bool {
        *tag == TagName::STR
            || *tag == TagName::SEQ
            || *tag == TagName::MAP
            || self.rules().iter().any(|rule| rule.tag == *tag)
    }

    /// Convert a native value back to text. Strings come back verbatim, so
    /// the text only resolves to the same value as a plain scalar when
    /// [`Schema::requires_quoting`] is false.
    fn format_value(&self, value: &ScalarValue) -> String {
        format_scalar(value)
    }

    /// Would the formatted `value` resolve to something else if it were
    /// written as a plain scalar?
    fn requires_quoting(&self, value: &ScalarValue) -> bool {
        match value {
            ScalarValue::Str(text) => self.resolve_plain(text) != TagName::STR,
            _ => false,
        }
    }

    /// The tag an untagged plain scalar with this content gets.
    fn resolve_plain(&self, text: &str) -> TagName {
        self.rules()
            .iter()
            .find(|rule| (rule.matches)(text))
            .map_or(TagName::STR, |rule| rule.tag.clone())
    }

    /// The tag a node event would get if it carried none. Depends only on
    /// the content and style of the event.
    fn default_tag(&self, event: &EventData) -> Option<TagName> {
        match event {
            EventData::Scalar { value, style, .. } => Some(if is_plain(*style) {
                self.resolve_plain(value)
            } else {
                TagName::STR
            }),
            EventData::SequenceStart { .. } => Some(TagName::SEQ),
            EventData::MappingStart { .. } => Some(TagName::MAP),
            _ => None,
        }
    }

    /// Expand the `!!` shorthand to a full tag.
    fn expand_tag(&self, tag: &str) -> TagName {
        match tag.strip_prefix("!!") {
            Some(suffix) => TagName::from(format!("{YAML_TAG_PREFIX}{suffix}")),
            None => TagName::from(tag),
        }
    }

    /// Inverse of [`expand_tag`](Schema::expand_tag).
    fn shorten_tag(&self, tag: &str) -> String {
        match tag.strip_prefix(YAML_TAG_PREFIX) {
            Some(suffix) if !suffix.is_empty() => format!("!!{suffix}"),
            _ => String::from(tag),
        }
    }

    /// Resolve a scalar to its tag and native value.
    ///
    /// The non-specific tag `!` and quoted styles give strings; plain
    /// scalars go through the rule table. Explicit custom tags are kept
    /// with the text as a string value.
    fn resolve(
        &self,
        value: &str,
        style: ScalarStyle,
        tag: Option<&str>,
    ) -> Result<ResolvedScalar, SchemaError> {
        let tag = match tag {
            Some("!") => TagName::STR,
            Some(tag) => {
                let tag = self.expand_tag(tag);
                if !tag.is_yaml_tag() {
                    return Ok(ResolvedScalar {
                        tag,
                        value: ScalarValue::Str(String::from(value)),
                    });
                }
                if !self.supports(&tag) {
                    return Err(SchemaError::UnsupportedTag {
                        tag: tag.to_string(),
                        schema: self.name(),
                    });
                }
                tag
            }
            None if is_plain(style) => self.resolve_plain(value),
            None => TagName::STR,
        };
        let value = self.parse_value(&tag, value)?;
        Ok(ResolvedScalar { tag, value })
    }

    fn try_parse(
        &self,
        value: &str,
        style: ScalarStyle,
        tag: Option<&str>,
    ) -> Option<ResolvedScalar> {
        self.resolve(value, style, tag).ok()
    }
}

fn is_plain(style: ScalarStyle) -> bool {
    matches!(style, ScalarStyle::Plain | ScalarStyle::Any)
}

fn invalid(tag: &TagName, text: &str) -> SchemaError {
    SchemaError::InvalidValue {
        tag: tag.to_string(),
        value: String::from(text),
    }
}

fn unsupported(schema: &dyn Schema, tag: &TagName) -> SchemaError {
    SchemaError::UnsupportedTag {
        tag: tag.to_string(),
        schema: schema.name(),
    }
}

fn strip_sign(text: &str) -> &str {
    text.strip_prefix(['-', '+']).unwrap_or(text)
}

/// Non-empty run of `radix` digits, possibly separated by `_`.
fn is_digits(text: &str, radix: u32) -> bool {
    text.chars().any(|ch| ch.is_digit(radix)) && text.chars().all(|ch| ch == '_' || ch.is_digit(radix))
}

/// Signed parse with a fallback to `u64` for large non-negative values.
fn integer(
    text: &str,
    signed: fn(&str) -> Result<i64, SchemaError>,
    unsigned: fn(&str) -> Result<u64, SchemaError>,
) -> Result<ScalarValue, SchemaError> {
    match signed(text) {
        Ok(value) => Ok(ScalarValue::Int(value)),
        Err(SchemaError::Overflow { .. }) if !text.starts_with('-') => {
            unsigned(text).map(ScalarValue::UInt)
        }
        Err(err) => Err(err),
    }
}

/// `(\.[0-9]+|[0-9]+(\.[0-9]*)?)([eE][-+]?[0-9]+)?`, optionally with `_`
/// between the mantissa digits.
fn is_decimal(body: &str, separators: bool, require_dot: bool) -> bool {
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(at) => (&body[..at], Some(&body[at + 1..])),
        None => (body, None),
    };
    // Empty, or digits with `_` only between them.
    let group = |part: &str| {
        part.is_empty()
            || part.starts_with(|ch: char| ch.is_ascii_digit())
                && part.ends_with(|ch: char| ch.is_ascii_digit())
                && part.chars().all(|ch| ch.is_ascii_digit() || (separators && ch == '_'))
    };
    let (whole, fraction) = match mantissa.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (mantissa, None),
    };
    if require_dot && fraction.is_none() {
        return false;
    }
    group(whole)
        && fraction.map_or(true, group)
        && mantissa.chars().any(|ch| ch.is_ascii_digit())
        && exponent.map_or(true, |exponent| {
            let exponent = strip_sign(exponent);
            !exponent.is_empty() && exponent.bytes().all(|b| b.is_ascii_digit())
        })
}

fn is_infinity(body: &str) -> bool {
    matches!(body, ".inf" | ".Inf" | ".INF")
}

fn is_nan(text: &str) -> bool {
    matches!(text, ".nan" | ".NaN" | ".NAN")
}

/// The failsafe schema: every scalar is a string.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailsafeSchema;

impl Schema for FailsafeSchema {
    fn name(&self) -> &'static str {
        "failsafe"
    }

    fn rules(&self) -> &[Rule] {
        &[]
    }

    fn parse_value(&self, tag: &TagName, text: &str) -> Result<ScalarValue, SchemaError> {
        if *tag == TagName::STR {
            Ok(ScalarValue::Str(String::from(text)))
        } else {
            Err(unsupported(self, tag))
        }
    }
}

/// The JSON schema. Only the exact JSON literals resolve to non-string
/// values.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchema;

static JSON_RULES: [Rule; 4] = [
    Rule {
        tag: TagName::NULL,
        matches: is_json_null,
    },
    Rule {
        tag: TagName::BOOL,
        matches: is_json_bool,
    },
    Rule {
        tag: TagName::INT,
        matches: is_json_int,
    },
    Rule {
        tag: TagName::FLOAT,
        matches: is_json_float,
    },
];

fn is_json_null(text: &str) -> bool {
    text == "null"
}

fn is_json_bool(text: &str) -> bool {
    matches!(text, "true" | "false")
}

/// Consume `-?(0|[1-9][0-9]*)` and return the rest.
fn json_integer_prefix(text: &str) -> Option<&str> {
    let body = text.strip_prefix('-').unwrap_or(text);
    let len = body.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 || (len > 1 && body.starts_with('0')) {
        return None;
    }
    Some(&body[len..])
}

fn is_json_int(text: &str) -> bool {
    json_integer_prefix(text) == Some("")
}

fn is_json_float(text: &str) -> bool {
    let Some(rest) = json_integer_prefix(text) else {
        return false;
    };
    let rest = match rest.strip_prefix('.') {
        Some(fraction) => fraction.trim_start_matches(|ch: char| ch.is_ascii_digit()),
        None => rest,
    };
    if rest.is_empty() {
        return true;
    }
    rest.strip_prefix(['e', 'E']).map_or(false, |exponent| {
        let exponent = strip_sign(exponent);
        !exponent.is_empty() && exponent.bytes().all(|b| b.is_ascii_digit())
    })
}

impl Schema for JsonSchema {
    fn name(&self) -> &'static str {
        "json"
    }

    fn rules(&self) -> &[Rule] {
        &JSON_RULES
    }

    fn parse_value(&self, tag: &TagName, text: &str) -> Result<ScalarValue, SchemaError> {
        match tag.as_str() {
            STR_TAG => Ok(ScalarValue::Str(String::from(text))),
            NULL_TAG if is_json_null(text) => Ok(ScalarValue::Null),
            BOOL_TAG if is_json_bool(text) => Ok(ScalarValue::Bool(text == "true")),
            INT_TAG if is_json_int(text) => integer(text, parse_base10, parse_unsigned_base10),
            FLOAT_TAG if is_json_float(text) => parse_float(text).map(ScalarValue::Float),
            _ if self.supports(tag) => Err(invalid(tag, text)),
            _ => Err(unsupported(self, tag)),
        }
    }
}

/// Canonical text for `value`. Strings are returned as they are.
pub fn format_scalar(value: &ScalarValue) -> String {
    match value {
        ScalarValue::Null => String::from("null"),
        ScalarValue::Bool(value) => value.to_string(),
        ScalarValue::Int(value) => value.to_string(),
        ScalarValue::UInt(value) => value.to_string(),
        ScalarValue::Float(value) => format_float(*value),
        ScalarValue::Str(value) => value.clone(),
        ScalarValue::Timestamp(value) => format_timestamp(value),
    }
}

/// The YAML 1.2 core schema, the default for documents without a `%YAML 1.1`
/// directive.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreSchema;

static CORE_RULES: [Rule; 4] = [
    Rule {
        tag: TagName::NULL,
        matches: is_core_null,
    },
    Rule {
        tag: TagName::BOOL,
        matches: is_core_bool,
    },
    Rule {
        tag: TagName::INT,
        matches: is_core_int,
    },
    Rule {
        tag: TagName::FLOAT,
        matches: is_core_float,
    },
];

fn is_core_null(text: &str) -> bool {
    matches!(text, "null" | "Null" | "NULL" | "~" | "")
}

fn core_bool(text: &str) -> Option<bool> {
    match text {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

fn is_core_bool(text: &str) -> bool {
    core_bool(text).is_some()
}

fn is_core_int(text: &str) -> bool {
    let body = strip_sign(text);
    if let Some(digits) = body.strip_prefix("0x") {
        is_digits(digits, 16)
    } else if let Some(digits) = body.strip_prefix("0o") {
        is_digits(digits, 8)
    } else {
        body.starts_with(|ch: char| ch.is_ascii_digit()) && is_digits(body, 10)
    }
}

fn is_core_float(text: &str) -> bool {
    let body = strip_sign(text);
    is_infinity(body) || is_nan(text) || is_decimal(body, true, false)
}

fn parse_core_int(text: &str) -> Result<ScalarValue, SchemaError> {
    let body = strip_sign(text);
    if body.starts_with("0x") {
        integer(text, parse_base16, parse_unsigned_base16)
    } else if body.starts_with("0o") {
        integer(text, parse_base8, parse_unsigned_base8)
    } else {
        integer(text, parse_base10, parse_unsigned_base10)
    }
}

impl Schema for CoreSchema {
    fn name(&self) -> &'static str {
        "core"
    }

    fn rules(&self) -> &[Rule] {
        &CORE_RULES
    }

    fn supports(&self, tag: &TagName) -> bool {
        *tag == TagName::TIMESTAMP
            || *tag == TagName::STR
            || *tag == TagName::SEQ
            || *tag == TagName::MAP
            || CORE_RULES.iter().any(|rule| rule.tag == *tag)
    }

    fn parse_value(&self, tag: &TagName, text: &str) -> Result<ScalarValue, SchemaError> {
        match tag.as_str() {
            STR_TAG => Ok(ScalarValue::Str(String::from(text))),
            NULL_TAG if is_core_null(text) => Ok(ScalarValue::Null),
            BOOL_TAG => core_bool(text)
                .map(ScalarValue::Bool)
                .ok_or_else(|| invalid(tag, text)),
            INT_TAG if is_core_int(text) => parse_core_int(text),
            FLOAT_TAG if is_core_float(text) => parse_float(text).map(ScalarValue::Float),
            TIMESTAMP_TAG => parse_timestamp(text).map(ScalarValue::Timestamp),
            _ if self.supports(tag) => Err(invalid(tag, text)),
            _ => Err(unsupported(self, tag)),
        }
    }
}

/// The YAML 1.1 type repository: the core types plus binary and legacy
/// octal integers, sexagesimal numbers, the `yes`/`no`/`on`/`off` booleans
/// and implicit timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct Yaml11Schema;

static YAML11_RULES: [Rule; 5] = [
    Rule {
        tag: TagName::NULL,
        matches: is_core_null,
    },
    Rule {
        tag: TagName::BOOL,
        matches: is_yaml11_bool,
    },
    Rule {
        tag: TagName::INT,
        matches: is_yaml11_int,
    },
    Rule {
        tag: TagName::FLOAT,
        matches: is_yaml11_float,
    },
    Rule {
        tag: TagName::TIMESTAMP,
        matches: is_timestamp,
    },
];

fn yaml11_bool(text: &str) -> Option<bool> {
    match text {
        "y" | "Y" | "yes" | "Yes" | "YES" | "on" | "On" | "ON" => Some(true),
        "n" | "N" | "no" | "No" | "NO" | "off" | "Off" | "OFF" => Some(false),
        _ => core_bool(text),
    }
}

fn is_yaml11_bool(text: &str) -> bool {
    yaml11_bool(text).is_some()
}

/// `[0-5]?[0-9]`
fn is_sexagesimal_group(group: &str) -> bool {
    match group.as_bytes() {
        [digit] => digit.is_ascii_digit(),
        [tens, units] => matches!(tens, b'0'..=b'5') && units.is_ascii_digit(),
        _ => false,
    }
}

/// `[1-9][0-9_]*(:[0-5]?[0-9])+` without the sign.
fn is_sexagesimal_int(body: &str) -> bool {
    let mut groups = body.split(':');
    let leading = groups.next().unwrap_or_default();
    leading.starts_with(|ch: char| matches!(ch, '1'..='9'))
        && is_digits(leading, 10)
        && body.contains(':')
        && groups.all(is_sexagesimal_group)
}

fn is_yaml11_int(text: &str) -> bool {
    let body = strip_sign(text);
    if let Some(digits) = body.strip_prefix("0b") {
        is_digits(digits, 2)
    } else if let Some(digits) = body.strip_prefix("0x") {
        is_digits(digits, 16)
    } else if body.contains(':') {
        is_sexagesimal_int(body)
    } else if let Some(digits) = body.strip_prefix('0') {
        digits.is_empty() || is_digits(digits, 8)
    } else {
        body.starts_with(|ch: char| ch.is_ascii_digit()) && is_digits(body, 10)
    }
}

fn is_yaml11_float(text: &str) -> bool {
    let body = strip_sign(text);
    if is_infinity(body) || is_nan(text) {
        return true;
    }
    match body.rsplit_once(':') {
        // `[0-9][0-9_]*(:[0-5]?[0-9])+\.[0-9_]*`
        Some((head, last)) => {
            let Some((seconds, fraction)) = last.split_once('.') else {
                return false;
            };
            let mut groups = head.split(':');
            let leading = groups.next().unwrap_or_default();
            leading.starts_with(|ch: char| ch.is_ascii_digit())
                && is_digits(leading, 10)
                && groups.all(is_sexagesimal_group)
                && is_sexagesimal_group(seconds)
                && fraction.chars().all(|ch| ch == '_' || ch.is_ascii_digit())
        }
        None => is_decimal(body, true, true),
    }
}

fn parse_yaml11_int(text: &str) -> Result<ScalarValue, SchemaError> {
    let body = strip_sign(text);
    if body.starts_with("0b") {
        integer(text, parse_base2, parse_unsigned_base2)
    } else if body.starts_with("0x") {
        integer(text, parse_base16, parse_unsigned_base16)
    } else if body.contains(':') {
        integer(text, parse_base60, parse_unsigned_base60)
    } else if body.len() > 1 && body.starts_with('0') {
        integer(text, parse_base8, parse_unsigned_base8)
    } else {
        integer(text, parse_base10, parse_unsigned_base10)
    }
}

impl Schema for Yaml11Schema {
    fn name(&self) -> &'static str {
        "yaml-1.1"
    }

    fn rules(&self) -> &[Rule] {
        &YAML11_RULES
    }

    fn parse_value(&self, tag: &TagName, text: &str) -> Result<ScalarValue, SchemaError> {
        match tag.as_str() {
            STR_TAG => Ok(ScalarValue::Str(String::from(text))),
            NULL_TAG if is_core_null(text) => Ok(ScalarValue::Null),
            BOOL_TAG => yaml11_bool(text)
                .map(ScalarValue::Bool)
                .ok_or_else(|| invalid(tag, text)),
            INT_TAG if is_yaml11_int(text) => parse_yaml11_int(text),
            FLOAT_TAG if is_yaml11_int(text) => match parse_yaml11_int(text)? {
                ScalarValue::Int(value) => Ok(ScalarValue::Float(value as f64)),
                ScalarValue::UInt(value) => Ok(ScalarValue::Float(value as f64)),
                _ => Err(invalid(tag, text)),
            },
            FLOAT_TAG if is_yaml11_float(text) => parse_float(text).map(ScalarValue::Float),
            TIMESTAMP_TAG => parse_timestamp(text).map(ScalarValue::Timestamp),
            _ if self.supports(tag) => Err(invalid(tag, text)),
            _ => Err(unsupported(self, tag)),
        }
    }

    fn format_value(&self, value: &ScalarValue) -> String {
        match value {
            ScalarValue::Null => String::from("~"),
            other => format_scalar(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain(schema: &dyn Schema, text: &str) -> ResolvedScalar {
        schema.resolve(text, ScalarStyle::Plain, None).unwrap()
    }

    fn scalar_event(value: &str, style: ScalarStyle) -> EventData {
        EventData::Scalar {
            anchor: None,
            tag: None,
            value: String::from(value),
            plain_implicit: style == ScalarStyle::Plain,
            quoted_implicit: style != ScalarStyle::Plain,
            style,
        }
    }

    #[test]
    fn core_plain_scalars() {
        let schema = CoreSchema;
        assert_eq!(plain(&schema, "null").value, ScalarValue::Null);
        assert_eq!(plain(&schema, "~").value, ScalarValue::Null);
        assert_eq!(plain(&schema, "").value, ScalarValue::Null);
        assert_eq!(plain(&schema, "TRUE").value, ScalarValue::Bool(true));
        assert_eq!(plain(&schema, "0x10").value, ScalarValue::Int(16));
        assert_eq!(plain(&schema, "0o17").value, ScalarValue::Int(15));
        assert_eq!(plain(&schema, "1_000").value, ScalarValue::Int(1000));
        assert_eq!(plain(&schema, "5.5").value, ScalarValue::Float(5.5));
        assert_eq!(plain(&schema, "1e3").value, ScalarValue::Float(1000.0));
        assert_eq!(plain(&schema, ".inf").value, ScalarValue::Float(f64::INFINITY));
        assert_eq!(
            plain(&schema, "-.INF").value,
            ScalarValue::Float(f64::NEG_INFINITY)
        );
        assert_eq!(plain(&schema, "yes").tag, TagName::STR);
        assert_eq!(plain(&schema, "0b101").tag, TagName::STR);
        assert_eq!(plain(&schema, "2001-12-14").tag, TagName::STR);
        assert_eq!(plain(&schema, "1_000.5").value, ScalarValue::Float(1000.5));
        for text in ["_1", "_1.5", "1__e3", "1._5", "-_1", "._"] {
            assert_eq!(plain(&schema, text).tag, TagName::STR, "{text}");
        }
    }

    #[test]
    fn default_tag_is_deterministic() {
        let schema = CoreSchema;
        let event = scalar_event("0x10", ScalarStyle::Plain);
        assert_eq!(schema.default_tag(&event), Some(TagName::INT));
        assert_eq!(schema.default_tag(&event), schema.default_tag(&event.clone()));
        assert_eq!(
            schema.default_tag(&scalar_event("0x10", ScalarStyle::SingleQuoted)),
            Some(TagName::STR)
        );
        assert_eq!(schema.default_tag(&EventData::StreamEnd), None);
    }

    #[test]
    fn json_is_strict() {
        let schema = JsonSchema;
        assert_eq!(
            schema
                .resolve("true", ScalarStyle::DoubleQuoted, None)
                .unwrap()
                .tag,
            TagName::STR
        );
        assert_eq!(plain(&schema, "true").value, ScalarValue::Bool(true));
        assert_eq!(plain(&schema, "True").tag, TagName::STR);
        assert_eq!(plain(&schema, "-12").value, ScalarValue::Int(-12));
        assert_eq!(plain(&schema, "012").tag, TagName::STR);
        assert_eq!(plain(&schema, "0x10").tag, TagName::STR);
        assert_eq!(plain(&schema, "1.5e-3").value, ScalarValue::Float(0.0015));
        assert_eq!(plain(&schema, "~").tag, TagName::STR);
        assert_eq!(plain(&schema, "hello").tag, TagName::STR);
    }

    #[test]
    fn failsafe_only_knows_strings() {
        let schema = FailsafeSchema;
        for text in ["null", "true", "12", "1.5"] {
            assert_eq!(plain(&schema, text).tag, TagName::STR);
        }
        assert_eq!(
            schema.resolve("12", ScalarStyle::Plain, Some(INT_TAG)),
            Err(SchemaError::UnsupportedTag {
                tag: String::from(INT_TAG),
                schema: "failsafe",
            })
        );
        assert_eq!(
            schema.default_tag(&EventData::SequenceStart {
                anchor: None,
                tag: None,
                implicit: true,
                style: crate::SequenceStyle::Block,
            }),
            Some(TagName::SEQ)
        );
    }

    #[test]
    fn yaml11_extras() {
        let schema = Yaml11Schema;
        assert_eq!(plain(&schema, "on").value, ScalarValue::Bool(true));
        assert_eq!(plain(&schema, "N").value, ScalarValue::Bool(false));
        assert_eq!(plain(&schema, "0b1010").value, ScalarValue::Int(10));
        assert_eq!(plain(&schema, "017").value, ScalarValue::Int(15));
        assert_eq!(plain(&schema, "0").value, ScalarValue::Int(0));
        assert_eq!(plain(&schema, "190:20:30").value, ScalarValue::Int(685_230));
        assert_eq!(plain(&schema, "1.5").value, ScalarValue::Float(1.5));
        assert_eq!(plain(&schema, "1e3").tag, TagName::STR);
        assert_eq!(plain(&schema, "190:20:30.15").tag, TagName::FLOAT);
        assert_eq!(plain(&schema, "2001-12-14").tag, TagName::TIMESTAMP);
        assert_eq!(plain(&schema, "1:60").tag, TagName::STR);
        assert_eq!(plain(&schema, "_1.5").tag, TagName::STR);
    }

    #[test]
    fn yaml11_integers_as_floats() {
        let schema = Yaml11Schema;
        let float = |text: &str| {
            schema
                .resolve(text, ScalarStyle::Plain, Some("!!float"))
                .unwrap()
                .value
        };
        assert_eq!(float("017"), ScalarValue::Float(15.0));
        assert_eq!(float("0x10"), ScalarValue::Float(16.0));
        assert_eq!(float("0b11"), ScalarValue::Float(3.0));
        assert_eq!(float("-1:30"), ScalarValue::Float(-90.0));
        assert_eq!(float("12"), ScalarValue::Float(12.0));
        assert_eq!(float("1.5"), ScalarValue::Float(1.5));
    }

    #[test]
    fn explicit_tags() {
        let schema = CoreSchema;
        assert_eq!(
            schema
                .resolve("12", ScalarStyle::DoubleQuoted, Some("!!int"))
                .unwrap()
                .value,
            ScalarValue::Int(12)
        );
        assert_eq!(
            schema
                .resolve("12", ScalarStyle::Plain, Some("!"))
                .unwrap()
                .value,
            ScalarValue::Str(String::from("12"))
        );
        assert_eq!(
            schema.resolve("abc", ScalarStyle::Plain, Some(INT_TAG)),
            Err(SchemaError::InvalidValue {
                tag: String::from(INT_TAG),
                value: String::from("abc"),
            })
        );
        let custom = schema
            .resolve("x", ScalarStyle::Plain, Some("tag:example.com,2000:thing"))
            .unwrap();
        assert_eq!(custom.tag, "tag:example.com,2000:thing");
        assert_eq!(custom.value, ScalarValue::Str(String::from("x")));
        assert!(matches!(
            schema
                .resolve("2001-12-14", ScalarStyle::Plain, Some(TIMESTAMP_TAG))
                .unwrap()
                .value,
            ScalarValue::Timestamp(_)
        ));
        assert!(schema
            .try_parse("x", ScalarStyle::Plain, Some("!!binary"))
            .is_none());
    }

    #[test]
    fn large_integers_become_unsigned() {
        assert_eq!(
            plain(&CoreSchema, "18446744073709551615").value,
            ScalarValue::UInt(u64::MAX)
        );
        assert!(matches!(
            CoreSchema.resolve("-9223372036854775809", ScalarStyle::Plain, None),
            Err(SchemaError::Overflow { .. })
        ));
    }

    #[test]
    fn tag_shorthand() {
        let schema = CoreSchema;
        assert_eq!(schema.expand_tag("!!int"), TagName::INT);
        assert_eq!(schema.expand_tag("!local"), "!local");
        assert_eq!(schema.shorten_tag(INT_TAG), "!!int");
        assert_eq!(schema.shorten_tag("!local"), "!local");
    }

    #[test]
    fn values_format_back() {
        let cases: [(&dyn Schema, &str); 6] = [
            (&CoreSchema, "0x10"),
            (&CoreSchema, "2.5"),
            (&CoreSchema, "-.inf"),
            (&Yaml11Schema, "off"),
            (&Yaml11Schema, "2001-12-14 21:59:43.10 -5"),
            (&JsonSchema, "null"),
        ];
        for (schema, text) in cases {
            let resolved = plain(schema, text);
            let formatted = schema.format_value(&resolved.value);
            assert_eq!(plain(schema, &formatted), resolved);
            assert!(!schema.requires_quoting(&resolved.value));
        }
    }

    #[test]
    fn strings_that_look_like_other_types() {
        let number = ScalarValue::Str(String::from("123"));
        assert_eq!(CoreSchema.format_value(&number), "123");
        assert!(CoreSchema.requires_quoting(&number));
        assert!(!FailsafeSchema.requires_quoting(&number));

        let yes = ScalarValue::Str(String::from("yes"));
        assert!(Yaml11Schema.requires_quoting(&yes));
        assert!(!CoreSchema.requires_quoting(&yes));
        assert!(!CoreSchema.requires_quoting(&ScalarValue::Str(String::from("text"))));
    }
}
