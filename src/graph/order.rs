use crate::schema::{AstNode, SchemaAst};

/// Return a copy of `ast` with every keyword list in canonical order.
///
/// Keywords are grouped by [`crate::schema::KeywordClass`] (identity,
/// assertions, combinators, structural containers, conditionals, metadata,
/// then anything unrecognised). The sort is stable, so keywords of the same
/// class keep their declaration order. Named and positional subschemas are
/// left in declaration order.
pub fn order_ast(ast: &SchemaAst) -> SchemaAst {
	let nodes = ast
		.nodes
		.iter()
		.map(|(uri, node)| {
			let node = match node {
				AstNode::Boolean(b) => AstNode::Boolean(*b),
				AstNode::Keywords(entries) => {
					let mut entries = entries.clone();
					entries.sort_by_key(|entry| entry.class());
					AstNode::Keywords(entries)
				}
			};
			(uri.clone(), node)
		})
		.collect();

	SchemaAst {
		root_uri: ast.root_uri.clone(),
		nodes,
		document_pointers: ast.document_pointers.clone(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schema::{KeywordValue, compile_schema};
	use pretty_assertions::assert_eq;
	use serde_json::json;

	fn root_keywords(ast: &SchemaAst) -> Vec<&str> {
		match ast.root() {
			Some(AstNode::Keywords(entries)) => {
				entries.iter().map(|e| e.keyword.as_str()).collect()
			}
			_ => Vec::new(),
		}
	}

	#[test]
	fn groups_keywords_by_class_keeping_declaration_order() {
		let schema = json!({
			"description": "d",
			"x-extension": 1,
			"properties": { "b": {}, "a": {} },
			"if": true,
			"title": "t",
			"allOf": [true],
			"required": ["a"],
			"type": "object",
			"$id": "https://x/s",
			"x-other": 2
		});
		let ast = compile_schema(&schema, "https://x/s").unwrap();
		let ordered = order_ast(&ast);
		assert_eq!(
			root_keywords(&ordered),
			[
				"type",
				"$id",
				"required",
				"allOf",
				"properties",
				"if",
				"description",
				"title",
				"x-extension",
				"x-other"
			]
		);

		// member order of named subschemas is untouched
		let Some(AstNode::Keywords(entries)) = ordered.root() else {
			panic!("root should have keywords");
		};
		let properties = entries.iter().find(|e| e.keyword == "properties").unwrap();
		let KeywordValue::SubschemaMap(members) = &properties.value else {
			panic!("properties should be a subschema map");
		};
		let names: Vec<_> = members.iter().map(|(name, _)| name.as_str()).collect();
		assert_eq!(names, ["b", "a"]);
	}

	#[test]
	fn does_not_mutate_input_and_is_idempotent() {
		let schema = json!({ "title": "t", "type": "string" });
		let ast = compile_schema(&schema, "https://x/s").unwrap();
		let before = ast.clone();
		let once = order_ast(&ast);
		assert_eq!(ast, before);
		assert_eq!(order_ast(&once), once);
		assert_eq!(once.len(), ast.len());
	}
}
