//! Error types for schema input and graph construction.

use thiserror::Error;

/// Failures while turning schema text into a [`crate::schema::SchemaAst`].
#[derive(Error, Debug)]
pub enum SchemaError {
	/// Input is not valid JSON.
	#[error("invalid JSON: {0}")]
	Json(#[from] serde_json::Error),

	/// Input is not valid YAML.
	#[error("invalid YAML: {0}")]
	Yaml(#[from] serde_yaml::Error),

	/// A base URI or `$id`/`$ref` value does not parse.
	#[error("invalid base URI '{uri}': {source}")]
	InvalidBaseUri {
		/// The offending text.
		uri: String,
		/// Parser error.
		#[source]
		source: url::ParseError,
	},

	/// A schema-valued keyword holds something else.
	#[error("'{keyword}' at {location} must hold {expected}")]
	InvalidSubschema {
		/// Keyword name.
		keyword: String,
		/// URI of the value.
		location: String,
		/// Shape the keyword requires.
		expected: &'static str,
	},
}

/// Failures raised by the graph pipeline.
#[derive(Error, Debug)]
pub enum GraphError {
	/// The schema could not be read.
	#[error(transparent)]
	Schema(#[from] SchemaError),

	/// The AST lacks a subschema it refers to.
	#[error("malformed schema AST at {location}: {reason}")]
	MalformedAst {
		/// URI of the missing subschema.
		location: String,
		/// What referred to it.
		reason: String,
	},

	/// Collision resolution was asked for before every node was measured.
	#[error("collision resolution needs measured sizes, node '{node}' has none")]
	LayoutPrecondition {
		/// Id of an unmeasured node.
		node: String,
	},
}
