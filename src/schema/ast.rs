use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Compiled schema: every subschema keyed by its absolute URI.
///
/// `nodes` keeps the order in which subschemas were first reached while
/// compiling, parents before children.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SchemaAst {
	/// URI of the document root.
	pub root_uri: String,
	/// Subschemas in first-reached order.
	pub nodes: Vec<(String, AstNode)>,
	/// JSON pointer of each subschema from the document root.
	///
	/// Differs from the URI fragment inside embedded `$id` resources, whose
	/// fragments restart at the resource.
	pub document_pointers: BTreeMap<String, String>,
}

impl SchemaAst {
	/// Look up a subschema by URI.
	pub fn get(&self, uri: &str) -> Option<&AstNode> {
		self.nodes
			.iter()
			.find_map(|(key, node)| (key == uri).then_some(node))
	}

	/// Pointer of the subschema at `uri` relative to the document root.
	pub fn document_pointer(&self, uri: &str) -> Option<&str> {
		self.document_pointers.get(uri).map(String::as_str)
	}

	/// The root subschema.
	pub fn root(&self) -> Option<&AstNode> {
		self.get(&self.root_uri)
	}

	/// Number of subschemas.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether no subschema was compiled.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

/// One subschema.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum AstNode {
	/// `true` / `false` schema.
	Boolean(bool),
	/// Object schema, keywords in declaration order until ordered.
	Keywords(Vec<KeywordEntry>),
}

/// A keyword of an object schema.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct KeywordEntry {
	/// Keyword name as written.
	pub keyword: String,
	/// Absolute URI of the keyword inside the document.
	pub location: String,
	/// Payload.
	pub value: KeywordValue,
}

impl KeywordEntry {
	/// Ordering bucket of this keyword.
	pub fn class(&self) -> KeywordClass {
		KeywordClass::of(&self.keyword)
	}
}

/// Payload of a keyword, already split by shape.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum KeywordValue {
	/// Plain data (`type`, `minLength`, `enum`, `title`, ...).
	Literal(Value),
	/// One subschema (`items`, `not`, `if`, `additionalProperties`, ...).
	Subschema(String),
	/// Positional subschemas (`allOf`, `anyOf`, `oneOf`, `prefixItems`).
	SubschemaList(Vec<String>),
	/// Named subschemas (`properties`, `$defs`, `patternProperties`, ...).
	SubschemaMap(Vec<(String, String)>),
	/// Resolved target of `$ref` / `$dynamicRef`.
	Reference(String),
}

/// Ordering bucket of a keyword. Variants are declared in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum KeywordClass {
	/// `$id`, `type`, `$ref`, `enum`, ...
	Identity,
	/// Validation constraints such as `minLength` or `required`.
	Assertion,
	/// `allOf`, `anyOf`, `oneOf`, `not`.
	Combinator,
	/// Keywords holding child schemas: `properties`, `items`, `$defs`, ...
	Structural,
	/// `if`, `then`, `else`.
	Conditional,
	/// Annotations: `title`, `description`, `default`, ...
	Metadata,
	/// Anything else, including vendor extensions.
	Unknown,
}

impl KeywordClass {
	/// Class of a keyword name.
	pub fn of(keyword: &str) -> Self {
		match keyword {
			"$schema" | "$id" | "$anchor" | "$dynamicAnchor" | "$recursiveAnchor"
			| "$vocabulary" | "$ref" | "$dynamicRef" | "$recursiveRef" | "type" | "const"
			| "enum" => KeywordClass::Identity,
			"minLength" | "maxLength" | "pattern" | "format" | "minimum" | "maximum"
			| "exclusiveMinimum" | "exclusiveMaximum" | "multipleOf" | "minItems"
			| "maxItems" | "uniqueItems" | "minContains" | "maxContains" | "minProperties"
			| "maxProperties" | "required" | "dependentRequired" | "contentEncoding"
			| "contentMediaType" => KeywordClass::Assertion,
			"allOf" | "anyOf" | "oneOf" | "not" => KeywordClass::Combinator,
			"properties" | "patternProperties" | "additionalProperties" | "propertyNames"
			| "items" | "prefixItems" | "additionalItems" | "contains" | "unevaluatedItems"
			| "unevaluatedProperties" | "dependentSchemas" | "dependencies" | "contentSchema"
			| "$defs" | "definitions" => KeywordClass::Structural,
			"if" | "then" | "else" => KeywordClass::Conditional,
			"title" | "description" | "default" | "examples" | "deprecated" | "readOnly"
			| "writeOnly" | "$comment" => KeywordClass::Metadata,
			_ => KeywordClass::Unknown,
		}
	}
}
