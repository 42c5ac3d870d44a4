//! JSON-pointer fragments of node ids (`base#/seg1/seg2`).

use serde::Serialize;
use serde_json::Value;

/// Escape a member name for use as a pointer token (`~` → `~0`, `/` → `~1`).
pub fn escape_token(token: &str) -> String {
	token.replace('~', "~0").replace('/', "~1")
}

/// Inverse of [`escape_token`].
pub fn unescape_token(token: &str) -> String {
	token.replace("~1", "/").replace("~0", "~")
}

/// Split `base#fragment` into its parts. The fragment is `None` without a `#`.
pub fn split_uri(uri: &str) -> (&str, Option<&str>) {
	match uri.split_once('#') {
		Some((base, fragment)) => (base, Some(fragment)),
		None => (uri, None),
	}
}

/// Decode `%XX` escapes, replacing invalid UTF-8.
///
/// Only for `$ref` values, which are URI references. Node ids carry member
/// names verbatim.
pub fn percent_decode(text: &str) -> String {
	String::from_utf8_lossy(&urlencoding::decode_binary(text.as_bytes())).into_owned()
}

/// Unescaped tokens of a JSON pointer (`/a/b~1c`).
pub fn pointer_tokens(pointer: &str) -> Vec<String> {
	pointer
		.split('/')
		.filter(|segment| !segment.is_empty())
		.map(unescape_token)
		.collect()
}

/// Unescaped pointer tokens of a URI's fragment.
pub fn fragment_tokens(uri: &str) -> Vec<String> {
	let (_, fragment) = split_uri(uri);
	pointer_tokens(fragment.unwrap_or_default())
}

/// Last pointer token of a URI, or `None` for a document root.
pub fn last_token(uri: &str) -> Option<String> {
	fragment_tokens(uri).pop()
}

/// One step of a breadcrumb trail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
	/// Unescaped segment, or `root`.
	pub label: String,
	/// Node id of the prefix.
	pub id: String,
}

/// Decompose a node id into the ids of its successive prefixes.
///
/// The first crumb is the document root (`base#`); each following crumb adds
/// one raw fragment segment, so every crumb id is a node id the compiler
/// could have produced.
pub fn breadcrumbs(uri: &str) -> Vec<Breadcrumb> {
	let (base, fragment) = split_uri(uri);
	let Some(fragment) = fragment else {
		return vec![Breadcrumb {
			label: "root".into(),
			id: uri.to_string(),
		}];
	};

	let mut trail = vec![Breadcrumb {
		label: "root".into(),
		id: format!("{base}#"),
	}];
	let mut prefix = String::new();
	for segment in fragment.split('/').filter(|s| !s.is_empty()) {
		prefix.push('/');
		prefix.push_str(segment);
		trail.push(Breadcrumb {
			label: unescape_token(segment),
			id: format!("{base}#{prefix}"),
		});
	}
	trail
}

/// Follow a JSON pointer from the document root.
///
/// Node ids are not pointers from the root once an embedded `$id` restarts
/// the fragment, so callers pass [`GraphNode::pointer`].
///
/// [`GraphNode::pointer`]: crate::graph::GraphNode::pointer
pub fn resolve_pointer<'a>(root: &'a Value, pointer: &str) -> Option<&'a Value> {
	pointer_tokens(pointer)
		.iter()
		.try_fold(root, |current, token| match current {
			Value::Object(map) => map.get(token),
			Value::Array(items) => token.parse::<usize>().ok().and_then(|i| items.get(i)),
			_ => None,
		})
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use serde_json::json;

	#[test]
	fn escaping_round_trips_special_characters() {
		assert_eq!(escape_token("a/b~c"), "a~1b~0c");
		assert_eq!(unescape_token("a~1b~0c"), "a/b~c");
		// `~01` is a literal "~1", not a slash
		assert_eq!(unescape_token("~01"), "~1");
	}

	#[test]
	fn breadcrumbs_walk_fragment_prefixes() {
		let trail = breadcrumbs("https://x/s#/properties/a~1b/items");
		assert_eq!(
			trail,
			vec![
				Breadcrumb { label: "root".into(), id: "https://x/s#".into() },
				Breadcrumb { label: "properties".into(), id: "https://x/s#/properties".into() },
				Breadcrumb {
					label: "a/b".into(),
					id: "https://x/s#/properties/a~1b".into()
				},
				Breadcrumb {
					label: "items".into(),
					id: "https://x/s#/properties/a~1b/items".into()
				},
			]
		);
	}

	#[test]
	fn breadcrumbs_without_fragment() {
		assert_eq!(breadcrumbs("https://x/s").len(), 1);
		assert_eq!(breadcrumbs("https://x/s#").len(), 1);
	}

	#[test]
	fn resolves_pointers_into_objects_and_arrays() {
		let schema = json!({
			"properties": { "a/b": { "type": "string" } },
			"allOf": [ true, { "minimum": 3 } ],
		});
		assert_eq!(
			resolve_pointer(&schema, "/properties/a~1b/type"),
			Some(&json!("string"))
		);
		assert_eq!(resolve_pointer(&schema, "/allOf/1/minimum"), Some(&json!(3)));
		assert_eq!(resolve_pointer(&schema, ""), Some(&schema));
		assert_eq!(resolve_pointer(&schema, "/allOf/9"), None);
	}

	#[test]
	fn node_id_fragments_are_taken_verbatim() {
		// `%41` is part of the member name, not an escape
		let id = "https://x/s#/properties/a%41";
		assert_eq!(fragment_tokens(id), ["properties", "a%41"]);
		assert_eq!(last_token(id).as_deref(), Some("a%41"));
		assert_eq!(breadcrumbs(id)[2].label, "a%41");
		assert_eq!(last_token("https://x/s#"), None);

		let schema = json!({ "properties": { "a%41": { "type": "string" }, "aA": false } });
		assert_eq!(
			resolve_pointer(&schema, "/properties/a%41"),
			Some(&json!({ "type": "string" }))
		);
	}

	#[test]
	fn percent_decoding_is_explicit() {
		assert_eq!(percent_decode("first%20name"), "first name");
		assert_eq!(percent_decode("plain"), "plain");
	}
}
