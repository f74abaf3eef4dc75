//! Lossless reformatting of backend fixed-point decimal objects.
//!
//! The backend serializes money and area fields as `{ "s": sign, "e": exponent,
//! "d": [digits] }` where each element of `d` is one decimal digit and `e` is
//! the power of ten of the first digit:
//!
//! ```text
//! { s: 1,  e: 1,  d: [2, 5] }  ->  "25"
//! { s: -1, e: -2, d: [3, 4] }  ->  "-0.034"
//! ```
//!
//! Conversion never goes through floating point.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::NormalizeError;

/// Largest accepted magnitude of the exponent.
pub const MAX_EXPONENT: i64 = 1_000;

/// A decimal value held as sign, significant digits and exponent.
///
/// Always canonical: no leading or trailing zero digits, and zero has no sign.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decimal {
    negative: bool,
    digits: Vec<u8>,
    exponent: i64,
}

impl Decimal {
    pub fn zero() -> Self {
        Self {
            negative: false,
            digits: Vec::new(),
            exponent: 0,
        }
    }

    /// Build from a sign (`1` or `-1`), an exponent and a digit array.
    pub fn from_parts(sign: i64, exponent: i64, digits: &[u8]) -> Result<Self, NormalizeError> {
        if sign != 1 && sign != -1 {
            return Err(NormalizeError::Decimal(format!("sign must be 1 or -1, got {sign}")));
        }
        if let Some(bad) = digits.iter().find(|d| **d > 9) {
            return Err(NormalizeError::Decimal(format!("digit out of range: {bad}")));
        }

        let leading = digits.iter().take_while(|d| **d == 0).count();
        let significant = &digits[leading..];
        let trailing = significant.iter().rev().take_while(|d| **d == 0).count();
        let significant = &significant[..significant.len() - trailing];
        if significant.is_empty() {
            return Ok(Self::zero());
        }

        let exponent = i64::try_from(leading)
            .ok()
            .and_then(|leading| exponent.checked_sub(leading))
            .filter(|e| e.unsigned_abs() <= MAX_EXPONENT.unsigned_abs())
            .ok_or_else(|| {
                NormalizeError::Decimal(format!("exponent {exponent} exceeds +/-{MAX_EXPONENT}"))
            })?;

        Ok(Self {
            negative: sign == -1,
            digits: significant.to_vec(),
            exponent,
        })
    }

    /// Interpret `value` as a `{s, e, d}` object.
    ///
    /// Returns `Ok(None)` when the value does not have exactly those three
    /// keys, and an error when it does but the fields are malformed.
    pub fn from_wire(value: &Value) -> Result<Option<Self>, NormalizeError> {
        let Some(map) = value.as_object() else {
            return Ok(None);
        };
        if !is_triple_shaped(map) {
            return Ok(None);
        }

        let sign = map["s"]
            .as_i64()
            .ok_or_else(|| NormalizeError::Decimal(format!("sign is not an integer: {}", map["s"])))?;
        let exponent = map["e"].as_i64().ok_or_else(|| {
            NormalizeError::Decimal(format!("exponent is not an integer: {}", map["e"]))
        })?;
        let digits = map["d"]
            .as_array()
            .ok_or_else(|| NormalizeError::Decimal(format!("digits are not an array: {}", map["d"])))?
            .iter()
            .map(|d| {
                d.as_u64()
                    .and_then(|d| u8::try_from(d).ok())
                    .ok_or_else(|| NormalizeError::Decimal(format!("digit out of range: {d}")))
            })
            .collect::<Result<Vec<u8>, _>>()?;

        Self::from_parts(sign, exponent, &digits).map(Some)
    }

    /// Wire representation (`{s, e, d}`) of this value.
    pub fn to_wire(&self) -> Value {
        let mut map = Map::new();
        map.insert("s".into(), Value::from(if self.negative { -1 } else { 1 }));
        map.insert("e".into(), Value::from(self.exponent));
        map.insert(
            "d".into(),
            Value::Array(self.digits.iter().map(|d| Value::from(*d)).collect()),
        );
        Value::Object(map)
    }

    pub fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }
}

fn is_triple_shaped(map: &Map<String, Value>) -> bool {
    map.len() == 3 && map.contains_key("s") && map.contains_key("e") && map.contains_key("d")
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        let mut out = String::with_capacity(self.digits.len() + 4);
        if self.negative {
            out.push('-');
        }
        let digits: String = self.digits.iter().map(|d| char::from(b'0' + d)).collect();
        let len = digits.len() as i64;
        let e = self.exponent;

        if e < 0 {
            out.push_str("0.");
            out.extend(std::iter::repeat('0').take((-e - 1) as usize));
            out.push_str(&digits);
        } else if e >= len - 1 {
            out.push_str(&digits);
            out.extend(std::iter::repeat('0').take((e - (len - 1)) as usize));
        } else {
            let split = (e + 1) as usize;
            out.push_str(&digits[..split]);
            out.push('.');
            out.push_str(&digits[split..]);
        }
        f.write_str(&out)
    }
}

impl FromStr for Decimal {
    type Err = NormalizeError;

    /// Parse plain (`-0.034`) or scientific (`2.5e1`) notation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NormalizeError::Decimal(format!("not a decimal string: '{s}'"));
        let trimmed = s.trim();
        let (sign, unsigned) = match trimmed.as_bytes().first() {
            Some(b'-') => (-1, &trimmed[1..]),
            Some(b'+') => (1, &trimmed[1..]),
            _ => (1, trimmed),
        };
        let (mantissa, exp_part) = match unsigned.find(['e', 'E']) {
            Some(pos) => (&unsigned[..pos], Some(&unsigned[pos + 1..])),
            None => (unsigned, None),
        };
        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((i, f)) => (i, f),
            None => (mantissa, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let shift: i64 = match exp_part {
            Some(e) => e.parse().map_err(|_| invalid())?,
            None => 0,
        };

        let digits: Vec<u8> = int_part
            .bytes()
            .chain(frac_part.bytes())
            .map(|b| b - b'0')
            .collect();
        let exponent = i64::try_from(int_part.len())
            .ok()
            .and_then(|len| (len - 1).checked_add(shift))
            .ok_or_else(invalid)?;
        Self::from_parts(sign, exponent, &digits)
    }
}

/// Replace every `{s, e, d}` object in `value` with its decimal string.
pub fn normalize_decimals(value: &mut Value) -> Result<(), NormalizeError> {
    match value {
        Value::Object(map) => {
            if is_triple_shaped(map) {
                if let Some(decimal) = Decimal::from_wire(value)? {
                    *value = Value::String(decimal.to_string());
                }
                return Ok(());
            }
            for child in map.values_mut() {
                normalize_decimals(child)?;
            }
            Ok(())
        }
        Value::Array(items) => items.iter_mut().try_for_each(normalize_decimals),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn wire(v: Value) -> String {
        Decimal::from_wire(&v).unwrap().unwrap().to_string()
    }

    #[test]
    fn integer_value() {
        assert_eq!(wire(json!({ "s": 1, "e": 1, "d": [2, 5] })), "25");
    }

    #[test]
    fn negative_fraction() {
        assert_eq!(wire(json!({ "s": -1, "e": -2, "d": [3, 4] })), "-0.034");
    }

    #[test]
    fn trailing_integer_zeros() {
        assert_eq!(wire(json!({ "s": 1, "e": 6, "d": [4, 5] })), "4500000");
    }

    #[test]
    fn mixed_value() {
        assert_eq!(wire(json!({ "s": 1, "e": 2, "d": [1, 2, 3, 4, 5] })), "123.45");
    }

    #[test]
    fn zero_has_no_sign() {
        assert_eq!(wire(json!({ "s": -1, "e": 0, "d": [0] })), "0");
        assert_eq!(wire(json!({ "s": 1, "e": 0, "d": [] })), "0");
    }

    #[test]
    fn leading_and_trailing_zero_digits_are_canonicalized() {
        assert_eq!(wire(json!({ "s": 1, "e": 1, "d": [0, 7, 5, 0] })), "7.5");
    }

    #[test]
    fn malformed_triples_are_rejected() {
        assert!(Decimal::from_wire(&json!({ "s": 2, "e": 0, "d": [1] })).is_err());
        assert!(Decimal::from_wire(&json!({ "s": 1, "e": 0, "d": [12] })).is_err());
        assert!(Decimal::from_wire(&json!({ "s": null, "e": null, "d": null })).is_err());
    }

    #[test]
    fn non_triples_are_ignored() {
        assert!(Decimal::from_wire(&json!({ "s": 1, "e": 0 })).unwrap().is_none());
        assert!(Decimal::from_wire(&json!({ "s": 1, "e": 0, "d": [1], "x": 0 }))
            .unwrap()
            .is_none());
        assert!(Decimal::from_wire(&json!("12.5")).unwrap().is_none());
    }

    #[test]
    fn parse_plain_and_scientific() {
        assert_eq!("-0.034".parse::<Decimal>().unwrap().to_string(), "-0.034");
        assert_eq!("2.5e1".parse::<Decimal>().unwrap().to_string(), "25");
        assert_eq!("000120.500".parse::<Decimal>().unwrap().to_string(), "120.5");
        assert_eq!(".5".parse::<Decimal>().unwrap().to_string(), "0.5");
        assert!("12a".parse::<Decimal>().is_err());
        assert!("-".parse::<Decimal>().is_err());
    }

    #[test]
    fn extreme_exponents_are_errors() {
        let err = Decimal::from_wire(&json!({ "s": 1, "e": i64::MIN, "d": [0, 1] })).unwrap_err();
        assert!(matches!(err, NormalizeError::Decimal(_)));
        assert!(Decimal::from_wire(&json!({ "s": -1, "e": i64::MAX, "d": [5] })).is_err());
        assert!("12e9223372036854775807".parse::<Decimal>().is_err());
        assert!("1e-9223372036854775808".parse::<Decimal>().is_err());
        assert!("1e1001".parse::<Decimal>().is_err());
        assert_eq!("1e1000".parse::<Decimal>().unwrap().to_wire()["e"], 1000);
    }

    #[test]
    fn nested_objects_are_rewritten() {
        let mut value = json!({
            "id": "r1",
            "price": { "s": 1, "e": 6, "d": [3, 5] },
            "fees": [{ "amount": { "s": 1, "e": 4, "d": [1, 5] } }]
        });
        normalize_decimals(&mut value).unwrap();
        assert_eq!(value["price"], "3500000");
        assert_eq!(value["fees"][0]["amount"], "15000");
        assert_eq!(value["id"], "r1");
    }

    proptest! {
        #[test]
        fn wire_triple_round_trips_through_string(
            negative in any::<bool>(),
            exponent in -40i64..40,
            digits in proptest::collection::vec(0u8..10, 0..24),
        ) {
            let sign = if negative { -1 } else { 1 };
            let original = Decimal::from_parts(sign, exponent, &digits).unwrap();
            let rendered = original.to_string();
            let reparsed: Decimal = rendered.parse().unwrap();
            prop_assert_eq!(&reparsed, &original);
            prop_assert_eq!(Decimal::from_wire(&original.to_wire()).unwrap(), Some(original));
        }
    }
}
