use serde::{Deserialize, Serialize};

use super::style::SchemaKind;

/// A point in graph coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Point {
	/// Point at `(x, y)`.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Width and height of a node box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
	/// Horizontal extent.
	pub width: f64,
	/// Vertical extent.
	pub height: f64,
}

impl Size {
	/// Size of `width` by `height`.
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// Both sides strictly positive.
	pub fn is_positive(&self) -> bool {
		self.width > 0.0 && self.height > 0.0
	}
}

/// Side of a node box an edge attaches to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlePosition {
	/// Left edge, targets in left-to-right layouts.
	Left,
	/// Right edge, sources in left-to-right layouts.
	Right,
	/// Top edge, targets in top-to-bottom layouts.
	Top,
	/// Bottom edge, sources in top-to-bottom layouts.
	Bottom,
}

/// Attachment point of an edge on a node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handle {
	/// Unique within the graph.
	pub handle_id: String,
	/// Side of the node box.
	pub position: HandlePosition,
	/// Flattened data row this handle is drawn next to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub row: Option<usize>,
}

/// A single data point or a homogeneous list shown as stacked rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeValue {
	/// A single row.
	One(String),
	/// One row per item.
	Many(Vec<String>),
}

/// Value of one keyword row on a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDataEntry {
	/// Full value.
	pub value: NodeValue,
	/// Shortened display text when `value` is too long to show inline.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ellipsis: Option<String>,
}

impl NodeDataEntry {
	/// Single-row entry.
	pub fn one(value: impl Into<String>) -> Self {
		Self {
			value: NodeValue::One(value.into()),
			ellipsis: None,
		}
	}

	/// Multi-row entry.
	pub fn many(values: Vec<String>) -> Self {
		Self {
			value: NodeValue::Many(values),
			ellipsis: None,
		}
	}

	/// Replace the shortened display text.
	pub fn with_ellipsis(mut self, ellipsis: Option<String>) -> Self {
		self.ellipsis = ellipsis;
		self
	}

	/// Text rows as they appear on the node.
	pub fn display_rows(&self) -> Vec<&str> {
		match (&self.value, &self.ellipsis) {
			(NodeValue::One(_), Some(short)) => vec![short.as_str()],
			(NodeValue::One(value), None) => vec![value.as_str()],
			(NodeValue::Many(values), _) => values.iter().map(String::as_str).collect(),
		}
	}
}

/// Keyword rows of a node, in display order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeData(Vec<(String, NodeDataEntry)>);

impl NodeData {
	/// Append a row for `key`.
	pub fn push(&mut self, key: impl Into<String>, entry: NodeDataEntry) {
		self.0.push((key.into(), entry));
	}

	/// Entry of `key`.
	pub fn get(&self, key: &str) -> Option<&NodeDataEntry> {
		self.0.iter().find_map(|(k, entry)| (k == key).then_some(entry))
	}

	/// Keys in display order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(|(k, _)| k.as_str())
	}

	/// Entries in display order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeDataEntry)> {
		self.0.iter().map(|(k, entry)| (k.as_str(), entry))
	}

	/// Number of keys.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Number of rows drawn for all entries.
	pub fn row_count(&self) -> usize {
		self.0.iter().map(|(_, entry)| entry.display_rows().len().max(1)).sum()
	}

	/// Flattened display row of `key`, or of `item` within a list value.
	pub fn row_index(&self, key: &str, item: Option<&str>) -> Option<usize> {
		let mut row = 0;
		for (k, entry) in &self.0 {
			if k == key {
				return match (item, &entry.value) {
					(Some(item), NodeValue::Many(values)) => {
						values.iter().position(|v| v == item).map(|i| row + i)
					}
					_ => Some(row),
				};
			}
			row += entry.display_rows().len().max(1);
		}
		None
	}

	/// Whether the node has no keyword rows.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Visual style of a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStyle {
	/// CSS colour of the header and border.
	pub color: String,
}

/// One subschema on the canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
	/// Unique id, normally the subschema URI.
	pub id: String,
	/// JSON pointer of the subschema from the document root.
	#[serde(default)]
	pub pointer: String,
	/// Edge distance from the root along the edge that created the node.
	pub depth: usize,
	/// Top-left corner.
	pub position: Point,
	/// Header text.
	#[serde(rename = "nodeLabel")]
	pub label: String,
	/// Keyword rows.
	#[serde(rename = "nodeData")]
	pub data: NodeData,
	/// Colours.
	#[serde(rename = "nodeStyle")]
	pub style: NodeStyle,
	/// Classification driving the colour.
	pub kind: SchemaKind,
	/// `true`/`false` schema.
	pub is_boolean_node: bool,
	/// Incoming attachment points. Empty for the root.
	pub target_handles: Vec<Handle>,
	/// Outgoing attachment points, one per relation.
	pub source_handles: Vec<Handle>,
	/// Box as measured by the renderer.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub measured: Option<Size>,
	/// Currently selected.
	#[serde(default)]
	pub selected: bool,
}

impl GraphNode {
	/// Measured box if known, otherwise the nominal layout size.
	pub fn size_or(&self, nominal: Size) -> Size {
		self.measured.filter(Size::is_positive).unwrap_or(nominal)
	}
}

/// Visual data of an edge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeData {
	/// Stroke colour, taken from the source node.
	pub color: String,
}

/// A traversed parent-to-child relation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
	/// Unique id, see [`GraphEdge::edge_id`].
	pub id: String,
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Handle on the source node.
	pub source_handle: String,
	/// `None` when the target is the root, which has no target handle.
	pub target_handle: Option<String>,
	/// Keyword label of the traversed relation (`items`, a property name, ...).
	pub label: String,
	/// `$ref` edges render dashed.
	pub is_reference: bool,
	/// Colours.
	pub data: EdgeData,
	/// Touches the selected node.
	#[serde(default)]
	pub selected: bool,
}

impl GraphEdge {
	/// Id of the edge from `source` to `target` through `source_handle`.
	pub fn edge_id(source: &str, target: &str, source_handle: &str) -> String {
		format!("{source}->{target}@{source_handle}")
	}
}
