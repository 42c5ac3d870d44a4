use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaError;

/// Text encoding of a schema document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaFormat {
	/// JSON text.
	#[default]
	Json,
	/// YAML text.
	Yaml,
}

impl SchemaFormat {
	/// Lowercase tag used by the format switch in the UI.
	pub fn as_str(self) -> &'static str {
		match self {
			SchemaFormat::Json => "json",
			SchemaFormat::Yaml => "yaml",
		}
	}
}

impl fmt::Display for SchemaFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for SchemaFormat {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"json" => Ok(SchemaFormat::Json),
			"yaml" | "yml" => Ok(SchemaFormat::Yaml),
			other => Err(format!("unknown schema format '{other}'")),
		}
	}
}

/// Parse schema text into a JSON value. Object key order is kept.
pub fn parse_schema(text: &str, format: SchemaFormat) -> Result<Value, SchemaError> {
	match format {
		SchemaFormat::Json => Ok(serde_json::from_str(text)?),
		SchemaFormat::Yaml => Ok(serde_yaml::from_str(text)?),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn parses_json_and_yaml_to_the_same_value() {
		let from_json = parse_schema(
			r#"{"type":"object","properties":{"id":{"type":"string"}}}"#,
			SchemaFormat::Json,
		)
		.unwrap();
		let from_yaml = parse_schema(
			"type: object\nproperties:\n  id:\n    type: string\n",
			SchemaFormat::Yaml,
		)
		.unwrap();
		assert_eq!(from_json, from_yaml);
		assert_eq!(
			from_json,
			json!({"type": "object", "properties": {"id": {"type": "string"}}})
		);
	}

	#[test]
	fn keeps_declaration_order() {
		let value = parse_schema(r#"{"b":1,"a":2,"c":3}"#, SchemaFormat::Json).unwrap();
		let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
		assert_eq!(keys, ["b", "a", "c"]);
	}

	#[test]
	fn reports_syntax_errors() {
		assert!(matches!(
			parse_schema("{", SchemaFormat::Json),
			Err(SchemaError::Json(_))
		));
		assert!(matches!(
			parse_schema("a: [1, 2", SchemaFormat::Yaml),
			Err(SchemaError::Yaml(_))
		));
	}

	#[test]
	fn format_from_str() {
		assert_eq!("YAML".parse::<SchemaFormat>(), Ok(SchemaFormat::Yaml));
		assert_eq!("yml".parse::<SchemaFormat>(), Ok(SchemaFormat::Yaml));
		assert_eq!("json".parse::<SchemaFormat>(), Ok(SchemaFormat::Json));
		assert!("toml".parse::<SchemaFormat>().is_err());
	}
}
