use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{AstNode, KeywordValue};

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

const TRUE_SCHEMA_COLOR: &str = "#2ca02c";
const FALSE_SCHEMA_COLOR: &str = "#d62728";

/// Classification of a schema node, used for styling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SchemaKind {
	/// `type: object`
	Object,
	/// `type: array`
	Array,
	/// `type: string`
	String,
	/// `type: number`
	Number,
	/// `type: integer`
	Integer,
	/// `type: boolean`
	Boolean,
	/// `type: null`
	Null,
	/// Untyped schema with a `$ref`.
	Reference,
	/// Untyped schema with `allOf`/`anyOf`/`oneOf`/`not`.
	Combinator,
	/// `true` or `false` schema.
	BooleanSchema(bool),
	/// Nothing to go by.
	Unknown,
}

impl SchemaKind {
	/// Kind of a subschema, from its first `type` or else its shape.
	pub fn classify(node: &AstNode) -> Self {
		let entries = match node {
			AstNode::Boolean(b) => return SchemaKind::BooleanSchema(*b),
			AstNode::Keywords(entries) => entries,
		};

		let declared = entries.iter().find_map(|entry| match (&*entry.keyword, &entry.value) {
			("type", KeywordValue::Literal(Value::String(name))) => Self::from_type_name(name),
			// multi-typed schemas are classified by their first type
			("type", KeywordValue::Literal(Value::Array(names))) => {
				names.first().and_then(Value::as_str).and_then(Self::from_type_name)
			}
			_ => None,
		});
		if let Some(kind) = declared {
			return kind;
		}

		let has = |names: &[&str]| entries.iter().any(|e| names.contains(&e.keyword.as_str()));
		if entries
			.iter()
			.any(|e| matches!(e.value, KeywordValue::Reference(_)))
		{
			SchemaKind::Reference
		} else if has(&["allOf", "anyOf", "oneOf", "not"]) {
			SchemaKind::Combinator
		} else if has(&[
			"properties",
			"patternProperties",
			"additionalProperties",
			"required",
			"propertyNames",
		]) {
			SchemaKind::Object
		} else if has(&["items", "prefixItems", "contains", "minItems", "maxItems"]) {
			SchemaKind::Array
		} else if has(&["minLength", "maxLength", "pattern"]) {
			SchemaKind::String
		} else if has(&["minimum", "maximum", "exclusiveMinimum", "exclusiveMaximum", "multipleOf"]) {
			SchemaKind::Number
		} else {
			SchemaKind::Unknown
		}
	}

	fn from_type_name(name: &str) -> Option<Self> {
		Some(match name {
			"object" => SchemaKind::Object,
			"array" => SchemaKind::Array,
			"string" => SchemaKind::String,
			"number" => SchemaKind::Number,
			"integer" => SchemaKind::Integer,
			"boolean" => SchemaKind::Boolean,
			"null" => SchemaKind::Null,
			_ => return None,
		})
	}

	/// Palette colour of the kind.
	pub fn color(self) -> &'static str {
		let slot = match self {
			SchemaKind::BooleanSchema(true) => return TRUE_SCHEMA_COLOR,
			SchemaKind::BooleanSchema(false) => return FALSE_SCHEMA_COLOR,
			SchemaKind::Object => 0,
			SchemaKind::Array => 1,
			SchemaKind::String => 4,
			SchemaKind::Number => 5,
			SchemaKind::Integer => 6,
			SchemaKind::Boolean => 8,
			SchemaKind::Null => 7,
			SchemaKind::Reference => 9,
			SchemaKind::Combinator => 3,
			SchemaKind::Unknown => 7,
		};
		COLORS[slot]
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schema::compile_schema;
	use serde_json::json;

	fn kind_of(schema: Value) -> SchemaKind {
		let ast = compile_schema(&schema, "https://x/s").unwrap();
		SchemaKind::classify(ast.root().unwrap())
	}

	#[test]
	fn declared_type_wins() {
		assert_eq!(kind_of(json!({"type": "string", "items": {}})), SchemaKind::String);
		assert_eq!(kind_of(json!({"type": ["integer", "null"]})), SchemaKind::Integer);
	}

	#[test]
	fn inferred_from_keywords() {
		assert_eq!(kind_of(json!({"$ref": "#"})), SchemaKind::Reference);
		assert_eq!(kind_of(json!({"oneOf": [true]})), SchemaKind::Combinator);
		assert_eq!(kind_of(json!({"required": ["a"]})), SchemaKind::Object);
		assert_eq!(kind_of(json!({"prefixItems": [true]})), SchemaKind::Array);
		assert_eq!(kind_of(json!({"title": "x"})), SchemaKind::Unknown);
		assert_eq!(kind_of(json!(false)), SchemaKind::BooleanSchema(false));
	}

	#[test]
	fn colors_are_stable_per_kind() {
		assert_eq!(SchemaKind::Object.color(), SchemaKind::Object.color());
		assert_ne!(SchemaKind::Object.color(), SchemaKind::Array.color());
		assert_ne!(
			SchemaKind::BooleanSchema(true).color(),
			SchemaKind::BooleanSchema(false).color()
		);
	}
}
