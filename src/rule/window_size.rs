//! (de)serializes the evaluation window as an ISO 8601 duration (`PT15M`),
//! the representation the management api uses for time spans
use std::{fmt, time::Duration};

use serde::{de, Deserializer, Serializer};

/// render `duration` as `PT..H..M..S`, leaving out zero components
pub fn to_iso8601(duration: Duration) -> String {
	let secs = duration.as_secs();
	let nanos = duration.subsec_nanos();

	if secs == 0 && nanos == 0 {
		return String::from("PT0S");
	}

	let (hours, minutes, seconds) = (secs / 3600, secs % 3600 / 60, secs % 60);

	let mut out = String::from("PT");
	if hours > 0 {
		out.push_str(&format!("{hours}H"));
	}
	if minutes > 0 {
		out.push_str(&format!("{minutes}M"));
	}
	if nanos > 0 {
		let fraction = format!("{nanos:09}");
		out.push_str(&format!("{seconds}.{}S", fraction.trim_end_matches('0')));
	} else if seconds > 0 {
		out.push_str(&format!("{seconds}S"));
	}

	out
}

/// parse a day-time ISO 8601 duration (`P1DT2H`, `PT15M`, `PT0.5S`)
///
/// years, months and weeks are rejected, they have no fixed length
pub fn from_iso8601(value: &str) -> Result<Duration, String> {
	let rest = value.strip_prefix('P').ok_or_else(|| format!("`{value}` doesn't start with `P`"))?;

	let (date, time) = match rest.split_once('T') {
		Some((date, time)) => (date, Some(time)),
		None => (rest, None),
	};

	if date.is_empty() && time.map_or(true, str::is_empty) {
		return Err(format!("`{value}` has no components"));
	}

	let mut total = Duration::ZERO;

	let date = components(date, &['D']).map_err(|err| format!("{err} in `{value}`"))?;
	let time = components(time.unwrap_or_default(), &['H', 'M', 'S'])
		.map_err(|err| format!("{err} in `{value}`"))?;

	for (number, unit) in date.into_iter().chain(time) {
		let component = match unit {
			'D' => scaled(number, 86400)?,
			'H' => scaled(number, 3600)?,
			'M' => scaled(number, 60)?,
			_ => number
				.parse::<f64>()
				.map_err(|err| err.to_string())
				.and_then(|secs| Duration::try_from_secs_f64(secs).map_err(|err| err.to_string()))
				.map_err(|err| format!("invalid seconds `{number}`: {err}"))?,
		};

		total = total.checked_add(component).ok_or_else(|| format!("`{value}` is too long"))?;
	}

	Ok(total)
}

/// split `1H30M` into `[("1", 'H'), ("30", 'M')]`, `units` in the order they
/// have to appear, each at most once
fn components<'a>(part: &'a str, units: &[char]) -> Result<Vec<(&'a str, char)>, String> {
	let mut out = Vec::new();
	let mut start = 0;
	let mut next_unit = 0;

	for (idx, c) in part.char_indices() {
		if c.is_ascii_digit() || c == '.' {
			continue;
		}
		if start == idx {
			return Err(format!("missing number before `{c}`"));
		}

		let unit = units
			.iter()
			.position(|unit| *unit == c)
			.ok_or_else(|| format!("unsupported component `{c}`"))?;
		if unit < next_unit {
			return Err(format!("component `{c}` out of order or repeated"));
		}
		next_unit = unit + 1;

		out.push((&part[start..idx], c));
		start = idx + c.len_utf8();
	}

	if start != part.len() {
		return Err(format!("trailing number `{}` without unit", &part[start..]));
	}

	Ok(out)
}

/// `number` units of `secs` seconds each
fn scaled(number: &str, secs: u64) -> Result<Duration, String> {
	let number: u64 = number.parse().map_err(|err| format!("invalid number `{number}`: {err}"))?;

	number
		.checked_mul(secs)
		.map(Duration::from_secs)
		.ok_or_else(|| format!("`{number}` is too large"))
}

pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	serializer.serialize_str(&to_iso8601(*duration))
}

struct WindowSizeVisitor();

impl<'de> de::Visitor<'de> for WindowSizeVisitor {
	type Value = Duration;

	fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
		formatter.write_str("an ISO 8601 duration like `PT15M`")
	}

	fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
	where
		E: de::Error,
	{
		from_iso8601(value).map_err(E::custom)
	}
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
	D: Deserializer<'de>,
{
	deserializer.deserialize_str(WindowSizeVisitor())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn formats_minutes_and_hours() {
		assert_eq!(to_iso8601(Duration::from_secs(15 * 60)), "PT15M");
		assert_eq!(to_iso8601(Duration::from_secs(300 * 60)), "PT5H");
		assert_eq!(to_iso8601(Duration::from_secs(5415)), "PT1H30M15S");
		assert_eq!(to_iso8601(Duration::from_millis(1500)), "PT1.5S");
		assert_eq!(to_iso8601(Duration::ZERO), "PT0S");
	}

	#[test]
	fn parses_what_it_formats() {
		for secs in [1, 59, 60, 900, 3600, 5415, 18000, 86400 + 61] {
			let duration = Duration::from_secs(secs);
			assert_eq!(from_iso8601(&to_iso8601(duration)), Ok(duration));
		}
	}

	#[test]
	fn parses_days_and_fractions() {
		assert_eq!(from_iso8601("P1DT1H"), Ok(Duration::from_secs(90000)));
		assert_eq!(from_iso8601("P2D"), Ok(Duration::from_secs(172800)));
		assert_eq!(from_iso8601("PT0.25S"), Ok(Duration::from_millis(250)));
	}

	#[test]
	fn rejects_garbage() {
		assert!(from_iso8601("15M").is_err());
		assert!(from_iso8601("P").is_err());
		assert!(from_iso8601("PT").is_err());
		assert!(from_iso8601("P1Y").is_err());
		assert!(from_iso8601("PT15").is_err());
		assert!(from_iso8601("PTM").is_err());
		assert!(from_iso8601("PT1.5H").is_err());
	}

	#[test]
	fn rejects_misordered_and_repeated_components() {
		assert!(from_iso8601("PT1M1H").is_err());
		assert!(from_iso8601("PT1M1M").is_err());
		assert!(from_iso8601("PT1S1M").is_err());
		assert!(from_iso8601("P1D1D").is_err());
		assert!(from_iso8601("PT1D").is_err());
		assert_eq!(from_iso8601("PT1H1S"), Ok(Duration::from_secs(3601)));
	}

	#[test]
	fn oversized_durations_are_errors() {
		assert!(from_iso8601("P999999999999999999D").is_err());
		assert!(from_iso8601("PT999999999999999999H").is_err());
		assert!(from_iso8601("P213503982334601DT18446744073709551S").is_err());
		assert!(from_iso8601("PT1e300S").is_err());

		let err = deserialize(serde_json::json!("P999999999999999999D")).unwrap_err();
		assert!(err.to_string().contains("too large"), "{err}");
	}
}
