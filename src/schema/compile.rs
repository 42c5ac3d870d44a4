use std::collections::{BTreeMap, HashMap};

use log::debug;
use serde_json::{Map, Value};
use url::Url;

use super::ast::{AstNode, KeywordEntry, KeywordValue, SchemaAst};
use super::pointer::{escape_token, percent_decode};
use crate::error::SchemaError;

/// Retrieval URI used when the schema has no `$id` of its own.
pub const DEFAULT_BASE_URI: &str = "https://schema-graph.local/schema";

/// How a keyword's value is laid out.
enum Shape {
	Map,
	Single,
	List,
	Reference,
	Literal,
}

fn shape_of(keyword: &str, value: &Value) -> Shape {
	match keyword {
		"properties" | "patternProperties" | "$defs" | "definitions" | "dependentSchemas" => {
			Shape::Map
		}
		"allOf" | "anyOf" | "oneOf" | "prefixItems" => Shape::List,
		// draft-04 tuple form
		"items" if value.is_array() => Shape::List,
		"items" | "additionalProperties" | "propertyNames" | "additionalItems" | "contains"
		| "unevaluatedItems" | "unevaluatedProperties" | "contentSchema" | "not" | "if"
		| "then" | "else" => Shape::Single,
		// draft-07: all members schemas, otherwise property lists shown as data
		"dependencies"
			if value
				.as_object()
				.is_some_and(|deps| deps.values().all(|dep| dep.is_object() || dep.is_boolean())) =>
		{
			Shape::Map
		}
		"$ref" | "$dynamicRef" | "$recursiveRef" => Shape::Reference,
		_ => Shape::Literal,
	}
}

/// Compile a parsed schema into a [`SchemaAst`].
///
/// Every subschema gets the URI `document#/json/pointer`. A `$id` inside the
/// document starts a new resource, `$ref`s are resolved against the resource
/// they appear in, and `$anchor` names are rewritten to pointer URIs.
pub fn compile_schema(schema: &Value, base_uri: &str) -> Result<SchemaAst, SchemaError> {
	let mut base = parse_uri(base_uri)?;
	if let Some(id) = schema.get("$id").and_then(Value::as_str) {
		base = join(&base, id)?;
	}
	base.set_fragment(None);

	let mut compiler = AstCompiler::default();
	let root_uri = compiler.walk(schema, &base, "", "", "(root)")?;
	compiler.rewrite_anchors();

	debug!(
		"compiled schema {} into {} subschemas",
		root_uri,
		compiler.nodes.len()
	);
	Ok(SchemaAst {
		root_uri,
		nodes: compiler.nodes,
		document_pointers: compiler.document_pointers,
	})
}

#[derive(Default)]
struct AstCompiler {
	nodes: Vec<(String, AstNode)>,
	document_pointers: BTreeMap<String, String>,
	anchors: HashMap<String, String>,
}

impl AstCompiler {
	/// `pointer` is relative to the current resource, `document` to the
	/// document root.
	fn walk(
		&mut self,
		value: &Value,
		base: &Url,
		pointer: &str,
		document: &str,
		keyword: &str,
	) -> Result<String, SchemaError> {
		let (base, pointer) = match value.get("$id").and_then(Value::as_str) {
			Some(id) if !pointer.is_empty() => {
				let mut embedded = join(base, id)?;
				embedded.set_fragment(None);
				(embedded, String::new())
			}
			_ => (base.clone(), pointer.to_string()),
		};
		let uri = format!("{base}#{pointer}");
		self.document_pointers.insert(uri.clone(), document.to_string());

		let object = match value {
			Value::Bool(b) => {
				self.nodes.push((uri.clone(), AstNode::Boolean(*b)));
				return Ok(uri);
			}
			Value::Object(object) => object,
			_ => {
				return Err(SchemaError::InvalidSubschema {
					keyword: keyword.to_string(),
					location: uri,
					expected: "a schema object or boolean",
				});
			}
		};

		// reserve the slot so parents precede their children
		let slot = self.nodes.len();
		self.nodes.push((uri.clone(), AstNode::Keywords(Vec::new())));

		if let Some(anchor) = object.get("$anchor").and_then(Value::as_str) {
			self.anchors.insert(format!("{base}#{anchor}"), uri.clone());
		}

		let entries = self.keywords(object, &base, &pointer, document)?;
		self.nodes[slot].1 = AstNode::Keywords(entries);
		Ok(uri)
	}

	fn keywords(
		&mut self,
		object: &Map<String, Value>,
		base: &Url,
		pointer: &str,
		document: &str,
	) -> Result<Vec<KeywordEntry>, SchemaError> {
		let mut entries = Vec::with_capacity(object.len());
		for (keyword, value) in object {
			let token = escape_token(keyword);
			let here = format!("{pointer}/{token}");
			let in_document = format!("{document}/{token}");
			let location = format!("{base}#{here}");

			let value = match shape_of(keyword, value) {
				Shape::Literal => KeywordValue::Literal(value.clone()),
				Shape::Single => {
					KeywordValue::Subschema(self.walk(value, base, &here, &in_document, keyword)?)
				}
				Shape::List => {
					let items = value.as_array().ok_or_else(|| SchemaError::InvalidSubschema {
						keyword: keyword.clone(),
						location: location.clone(),
						expected: "an array of subschemas",
					})?;
					let mut uris = Vec::with_capacity(items.len());
					for (i, item) in items.iter().enumerate() {
						let (item_pointer, item_document) = (format!("{here}/{i}"), format!("{in_document}/{i}"));
						uris.push(self.walk(item, base, &item_pointer, &item_document, keyword)?);
					}
					KeywordValue::SubschemaList(uris)
				}
				Shape::Map => {
					let members = value.as_object().ok_or_else(|| SchemaError::InvalidSubschema {
						keyword: keyword.clone(),
						location: location.clone(),
						expected: "an object of subschemas",
					})?;
					let mut named = Vec::with_capacity(members.len());
					for (name, member) in members {
						let name_token = escape_token(name);
						let (member_pointer, member_document) =
							(format!("{here}/{name_token}"), format!("{in_document}/{name_token}"));
						named.push((
							name.clone(),
							self.walk(member, base, &member_pointer, &member_document, keyword)?,
						));
					}
					KeywordValue::SubschemaMap(named)
				}
				Shape::Reference => {
					let reference = value.as_str().ok_or_else(|| SchemaError::InvalidSubschema {
						keyword: keyword.clone(),
						location: location.clone(),
						expected: "a URI reference",
					})?;
					KeywordValue::Reference(resolve_reference(base, reference)?)
				}
			};

			entries.push(KeywordEntry {
				keyword: keyword.clone(),
				location,
				value,
			});
		}
		Ok(entries)
	}

	fn rewrite_anchors(&mut self) {
		if self.anchors.is_empty() {
			return;
		}
		for (_, node) in &mut self.nodes {
			let AstNode::Keywords(entries) = node else {
				continue;
			};
			for entry in entries {
				if let KeywordValue::Reference(target) = &mut entry.value {
					if let Some(resolved) = self.anchors.get(target.as_str()) {
						*target = resolved.clone();
					}
				}
			}
		}
	}
}

fn parse_uri(uri: &str) -> Result<Url, SchemaError> {
	Url::parse(uri).map_err(|source| SchemaError::InvalidBaseUri {
		uri: uri.to_string(),
		source,
	})
}

fn join(base: &Url, reference: &str) -> Result<Url, SchemaError> {
	base.join(reference)
		.map_err(|source| SchemaError::InvalidBaseUri {
			uri: reference.to_string(),
			source,
		})
}

/// Resolve `reference` against `base` into the `document#fragment` form used
/// for AST keys. Percent escapes in the fragment are decoded.
fn resolve_reference(base: &Url, reference: &str) -> Result<String, SchemaError> {
	let mut target = join(base, reference)?;
	let fragment = target
		.fragment()
		.map(percent_decode)
		.unwrap_or_default();
	target.set_fragment(None);
	Ok(format!("{target}#{fragment}"))
}
