//! Introspection response models and their decoders.
//!
//! Keycloak (and RFC 7662 in general) allows the `aud` claim to be either one string or an array
//! of strings. [`Audience::from_value`] accepts exactly those two shapes, tried in that order,
//! and reports anything else as an [`AudienceFormatError`] carrying the offending JSON.

// std
use std::ops::Deref;
// crates.io
use serde::{Deserializer, Serializer};
use serde_json::Value;
// self
use crate::{_prelude::*, error::DecodeError};

/// Result types the introspection operation can decode a response body into.
pub trait IntrospectionResponse
where
	Self: Sized,
{
	/// Decodes a raw JSON response body.
	fn decode(body: &[u8]) -> Result<Self, DecodeError>;
}

/// Minimal RFC 7662 result: whether the token is active.
///
/// A response without `active`, or with `"active": null`, decodes as inactive: the provider did
/// not assert validity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntrospectionResult {
	/// Whether the token was active when the provider answered.
	#[serde(default, deserialize_with = "null_as_inactive")]
	pub active: bool,
}
impl IntrospectionResponse for IntrospectionResult {
	fn decode(body: &[u8]) -> Result<Self, DecodeError> {
		from_slice(body)
	}
}

/// Introspection result including expiry, issue time, and audience.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedIntrospectionResult {
	/// Expiry in epoch seconds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub exp: Option<i64>,
	/// Issue time in epoch seconds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iat: Option<i64>,
	/// Whether the token was active when the provider answered.
	#[serde(default)]
	pub active: bool,
	/// Intended recipients, normalized to a sequence.
	#[serde(default, rename = "aud")]
	pub audience: Audience,
}
impl ExtendedIntrospectionResult {
	/// Converts `exp` into a timestamp, when present and representable.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.exp.and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
	}

	/// Converts `iat` into a timestamp, when present and representable.
	pub fn issued_at(&self) -> Option<OffsetDateTime> {
		self.iat.and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
	}
}
impl IntrospectionResponse for ExtendedIntrospectionResult {
	fn decode(body: &[u8]) -> Result<Self, DecodeError> {
		let wire: ExtendedWire = from_slice(body)?;
		let audience = match wire.aud {
			Some(value) => Audience::from_value(&value)?,
			None => Audience::default(),
		};

		Ok(Self { exp: wire.exp, iat: wire.iat, active: wire.active, audience })
	}
}

/// Token endpoint response subset used to obtain tokens for introspection.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
	/// Issued access token.
	pub access_token: String,
}

/// Ordered audience list; wire order is preserved.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Audience(Vec<String>);
impl Audience {
	/// Wraps an already normalized list.
	pub fn new<I, S>(values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self(values.into_iter().map(Into::into).collect())
	}

	/// Normalizes a raw `aud` claim.
	///
	/// `null` is treated as an absent claim and yields an empty audience.
	pub fn from_value(value: &Value) -> Result<Self, AudienceFormatError> {
		if value.is_null() {
			return Ok(Self::default());
		}
		if let Ok(many) = Vec::<String>::deserialize(value) {
			return Ok(Self(many));
		}
		if let Some(single) = value.as_str() {
			return Ok(Self(vec![single.to_owned()]));
		}

		Err(AudienceFormatError { raw: value.to_string() })
	}

	/// Returns `true` when `audience` is one of the recipients.
	pub fn contains(&self, audience: &str) -> bool {
		self.0.iter().any(|value| value == audience)
	}

	/// Consumes the wrapper and returns the inner list.
	pub fn into_inner(self) -> Vec<String> {
		self.0
	}
}
impl Deref for Audience {
	type Target = [String];

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl From<Vec<String>> for Audience {
	fn from(values: Vec<String>) -> Self {
		Self(values)
	}
}
impl Serialize for Audience {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		self.0.serialize(serializer)
	}
}
impl<'de> Deserialize<'de> for Audience {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = Value::deserialize(deserializer)?;

		Self::from_value(&value).map_err(serde::de::Error::custom)
	}
}

/// The `aud` claim matched neither accepted shape.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Invalid audience format: {raw}.")]
pub struct AudienceFormatError {
	/// Compact JSON text of the rejected value.
	pub raw: String,
}

#[derive(Deserialize)]
struct ExtendedWire {
	#[serde(default)]
	exp: Option<i64>,
	#[serde(default)]
	iat: Option<i64>,
	#[serde(default, deserialize_with = "null_as_inactive")]
	active: bool,
	#[serde(default)]
	aud: Option<Value>,
}

fn null_as_inactive<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
}

fn from_slice<T>(body: &[u8]) -> Result<T, DecodeError>
where
	T: for<'de> Deserialize<'de>,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|e| DecodeError::body(e, body))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn extended(body: &str) -> Result<ExtendedIntrospectionResult, DecodeError> {
		ExtendedIntrospectionResult::decode(body.as_bytes())
	}

	#[test]
	fn minimal_result_reads_active_flag() {
		let active = IntrospectionResult::decode(br#"{"active":true}"#)
			.expect("Active response should decode.");
		let inactive = IntrospectionResult::decode(br#"{"active":false}"#)
			.expect("Inactive response should decode.");

		assert!(active.active);
		assert!(!inactive.active);
	}

	#[test]
	fn missing_active_defaults_to_inactive() {
		let result = IntrospectionResult::decode(br#"{"client_id":"svc"}"#)
			.expect("Response without active should decode.");

		assert!(!result.active);
	}

	#[test]
	fn null_active_is_treated_as_absent() {
		let minimal = IntrospectionResult::decode(br#"{"active":null}"#)
			.expect("Null active should decode in the minimal result.");
		let extended = extended(r#"{"active":null,"aud":"svc-a"}"#)
			.expect("Null active should decode in the extended result.");

		assert!(!minimal.active);
		assert!(!extended.active);
		assert_eq!(extended.audience.into_inner(), vec!["svc-a"]);
	}

	#[test]
	fn malformed_bodies_surface_typed_errors() {
		let err = IntrospectionResult::decode(b"<html>bad gateway</html>")
			.expect_err("Non-JSON body should fail.");

		assert!(matches!(&err, DecodeError::Body { preview, .. } if preview.contains("bad gateway")));

		let err = IntrospectionResult::decode(br#"{"active":"yes"}"#)
			.expect_err("Wrongly typed active should fail.");

		match err {
			DecodeError::Body { source, .. } => assert_eq!(source.path().to_string(), "active"),
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn single_string_audience_is_wrapped() {
		let result = extended(
			r#"{"active":true,"exp":1999999999,"iat":1999999000,"aud":"https://api.example"}"#,
		)
		.expect("String audience should decode.");

		assert!(result.active);
		assert_eq!(result.exp, Some(1_999_999_999));
		assert_eq!(result.iat, Some(1_999_999_000));
		assert_eq!(&*result.audience, ["https://api.example".to_owned()]);
	}

	#[test]
	fn array_audience_preserves_order() {
		let result = extended(r#"{"active":true,"aud":["svc-b","svc-a"]}"#)
			.expect("Array audience should decode.");

		assert_eq!(result.audience.clone().into_inner(), vec!["svc-b", "svc-a"]);
		assert!(result.audience.contains("svc-a"));
		assert_eq!(result.exp, None);
	}

	#[test]
	fn other_audience_shapes_are_rejected_with_raw_value() {
		for (body, raw) in [
			(r#"{"active":true,"aud":42}"#, "42"),
			(r#"{"active":true,"aud":{"x":1}}"#, r#"{"x":1}"#),
			(r#"{"active":true,"aud":["ok",7]}"#, r#"["ok",7]"#),
		] {
			match extended(body).expect_err("Unsupported audience should fail.") {
				DecodeError::Audience(err) => {
					assert_eq!(err.raw, raw);
					assert!(err.to_string().contains(raw));
				},
				other => panic!("Unexpected error variant: {other:?}."),
			}
		}
	}

	#[test]
	fn absent_or_null_audience_is_empty() {
		assert!(extended(r#"{"active":false}"#).expect("Should decode.").audience.is_empty());
		assert!(
			extended(r#"{"active":false,"aud":null}"#).expect("Should decode.").audience.is_empty()
		);
	}

	#[test]
	fn audience_survives_serialization_as_array() {
		let audience = Audience::new(["svc-a", "svc-b", "svc-c"]);
		let json = serde_json::to_string(&audience).expect("Audience should serialize.");

		assert_eq!(json, r#"["svc-a","svc-b","svc-c"]"#);

		let back: Audience = serde_json::from_str(&json).expect("Audience should deserialize.");

		assert_eq!(back, audience);
	}

	#[test]
	fn timestamps_convert_to_offset_date_time() {
		let result = extended(r#"{"active":true,"exp":1999999999,"iat":0}"#)
			.expect("Timestamps should decode.");

		assert_eq!(result.issued_at(), Some(OffsetDateTime::UNIX_EPOCH));
		assert_eq!(
			result.expires_at().map(OffsetDateTime::unix_timestamp),
			Some(1_999_999_999)
		);
	}

	#[test]
	fn token_response_reads_access_token() {
		let token: TokenResponse =
			serde_json::from_str(r#"{"access_token":"abc","expires_in":300}"#)
				.expect("Token response should decode.");

		assert_eq!(token.access_token, "abc");
	}
}
