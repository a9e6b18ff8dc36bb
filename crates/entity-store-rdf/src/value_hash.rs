//! Value-node MD5 hashing (spec §4.G), grounded on
//! `hashing/value_node_hasher.py`'s `ValueNodeHasher`.
//!
//! The canonical strings built here are exactly what gets MD5-hashed to
//! produce a `wdv:<32-hex>` value-node URI; identical values across
//! statements, qualifiers, and references must produce byte-identical
//! input strings so they collapse onto the same node (the deduplication
//! contract in [`crate::dedupe`]).

use md5::{Digest as _, Md5};

fn hex_digest(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Formats a floating-point precision value in scientific notation with a
/// fixed one-digit mantissa and no leading zero in the exponent (`1.0E-5`,
/// never `1E-5` or `1.0E-05`), matching `_format_precision` byte-for-byte.
#[must_use]
pub fn format_precision(precision: f64) -> String {
    let formatted = format!("{precision:.1E}");
    formatted.replace("E-0", "E-")
}

/// Builds the canonical string for a time value and its MD5 digest.
///
/// `"t:"+value[with leading '+' stripped iff timezone==0]+":"+precision+
/// ":"+timezone[+":"+before if before!=0][+":"+after if after!=0]+":"+
/// calendarmodel`
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn hash_time_value(
    value: &str,
    precision: u8,
    timezone: i32,
    before: u32,
    after: u32,
    calendarmodel: &str,
) -> String {
    let value = if timezone == 0 {
        value.strip_prefix('+').unwrap_or(value)
    } else {
        value
    };

    let mut parts = vec!["t:".to_owned() + value, precision.to_string(), timezone.to_string()];
    if before != 0 {
        parts.push(before.to_string());
    }
    if after != 0 {
        parts.push(after.to_string());
    }
    parts.push(calendarmodel.to_owned());

    hex_digest(&parts.join(":"))
}

/// `"q:"+amount+":"+unit[+":"+upper][+":"+lower]`
#[must_use]
pub fn hash_quantity_value(
    amount: &str,
    unit: &str,
    upper_bound: Option<&str>,
    lower_bound: Option<&str>,
) -> String {
    let mut input = format!("q:{amount}:{unit}");
    if let Some(upper) = upper_bound {
        input.push(':');
        input.push_str(upper);
    }
    if let Some(lower) = lower_bound {
        input.push(':');
        input.push_str(lower);
    }
    hex_digest(&input)
}

/// `"g:"+latitude+":"+longitude+":"+precision(scientific)+":"+globe`
#[must_use]
pub fn hash_globe_coordinate_value(latitude: f64, longitude: f64, precision: f64, globe: &str) -> String {
    let input = format!(
        "g:{latitude}:{longitude}:{}:{globe}",
        format_precision(precision)
    );
    hex_digest(&input)
}

/// Entity-reference values (`wikibase-item`, `wikibase-property`,
/// `entity-schema`) hash the raw referenced id directly.
#[must_use]
pub fn hash_entity_value(raw_value: &str) -> String {
    hex_digest(raw_value)
}

/// Blank-node local name for a property's no-value OWL restriction:
/// `md5("owl:complementOf-<repository-name>-<property-id>")`.
#[must_use]
pub fn no_value_blank_node(repository_name: &str, property_id: &str) -> String {
    hex_digest(&format!("owl:complementOf-{repository_name}-{property_id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_hash_strips_leading_plus_at_utc() {
        let a = hash_time_value("+2021-01-01T00:00:00Z", 11, 0, 0, 0, "http://www.wikidata.org/entity/Q1985727");
        let b = hash_time_value("2021-01-01T00:00:00Z", 11, 0, 0, 0, "http://www.wikidata.org/entity/Q1985727");
        assert_eq!(a, b);
    }

    #[test]
    fn time_hash_keeps_leading_plus_with_nonzero_timezone() {
        let a = hash_time_value("+2021-01-01T00:00:00Z", 11, 60, 0, 0, "http://www.wikidata.org/entity/Q1985727");
        let b = hash_time_value("2021-01-01T00:00:00Z", 11, 60, 0, 0, "http://www.wikidata.org/entity/Q1985727");
        assert_ne!(a, b);
    }

    #[test]
    fn quantity_hash_differs_with_and_without_bounds() {
        let plain = hash_quantity_value("12", "1", None, None);
        let bounded = hash_quantity_value("12", "1", Some("13"), Some("11"));
        assert_ne!(plain, bounded);
    }

    #[test]
    fn format_precision_has_no_leading_zero_in_exponent() {
        assert!(!format_precision(0.00001).contains("E-0"));
    }

    #[test]
    fn format_precision_forces_a_one_digit_mantissa() {
        assert_eq!(format_precision(0.00001), "1.0E-5");
    }
}
