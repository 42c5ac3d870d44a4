use serde::{Deserialize, Serialize};

use super::layout::{NODE_HEIGHT, NODE_WIDTH};
use super::types::{GraphNode, Point};

/// How long the no-match notice stays up.
pub const FEEDBACK_DISMISS_MS: i32 = 3000;

/// Step direction through search matches. Both wrap around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavDirection {
	/// Following match.
	Next,
	/// Preceding match.
	Prev,
}

/// A node whose label contains the query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMatch {
	/// Matched node.
	pub node_id: String,
	/// Its label.
	pub label: String,
	/// Its depth, the primary sort key.
	pub depth: usize,
	/// Point the camera centres on.
	pub center: Point,
}

/// Result of [`SearchIndex::search`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOutcome {
	/// Blank query, previous matches dropped.
	Cleared,
	/// No label contains the query.
	NoMatch {
		/// Trimmed query.
		query: String,
	},
	/// At least one match, the cursor is on the first.
	Found {
		/// Number of matches.
		count: usize,
	},
}

impl SearchOutcome {
	/// Transient notice for the user, if any.
	pub fn feedback(&self) -> Option<String> {
		match self {
			SearchOutcome::NoMatch { query } => Some(format!("{query} is not in schema")),
			_ => None,
		}
	}
}

#[derive(Clone, Debug)]
struct Entry {
	needle: String,
	hit: SearchMatch,
}

/// Label index over a laid-out node set with a cursor over the last query.
#[derive(Clone, Debug, Default)]
pub struct SearchIndex {
	entries: Vec<Entry>,
	matches: Vec<SearchMatch>,
	current: usize,
}

impl SearchIndex {
	/// Index the labels of `nodes`.
	pub fn new(nodes: &[GraphNode]) -> Self {
		let entries = nodes
			.iter()
			.map(|node| Entry {
				needle: node.label.to_lowercase(),
				hit: SearchMatch {
					node_id: node.id.clone(),
					label: node.label.clone(),
					depth: node.depth,
					center: Point::new(
						node.position.x + NODE_WIDTH / 2.0,
						node.position.y + NODE_HEIGHT / 2.0,
					),
				},
			})
			.collect();
		Self {
			entries,
			matches: Vec::new(),
			current: 0,
		}
	}

	/// Replace the match set with the nodes whose label contains `query`.
	///
	/// Matches are shallowest first, then in compile order. The cursor moves
	/// to the first match.
	pub fn search(&mut self, query: &str) -> SearchOutcome {
		self.current = 0;
		let needle = query.trim().to_lowercase();
		if needle.is_empty() {
			self.matches.clear();
			return SearchOutcome::Cleared;
		}

		self.matches = self
			.entries
			.iter()
			.filter(|entry| entry.needle.contains(&needle))
			.map(|entry| entry.hit.clone())
			.collect();
		// stable, so compile order breaks ties
		self.matches.sort_by_key(|hit| hit.depth);

		if self.matches.is_empty() {
			SearchOutcome::NoMatch {
				query: query.trim().to_string(),
			}
		} else {
			SearchOutcome::Found {
				count: self.matches.len(),
			}
		}
	}

	/// Step the cursor cyclically. No-op without matches.
	pub fn navigate(&mut self, direction: NavDirection) -> Option<&SearchMatch> {
		let len = self.matches.len();
		if len == 0 {
			return None;
		}
		self.current = match direction {
			NavDirection::Next => (self.current + 1) % len,
			NavDirection::Prev => (self.current + len - 1) % len,
		};
		self.matches.get(self.current)
	}

	/// Match under the cursor.
	pub fn current(&self) -> Option<&SearchMatch> {
		self.matches.get(self.current)
	}

	/// Position of the cursor, `None` without matches.
	pub fn current_index(&self) -> Option<usize> {
		(!self.matches.is_empty()).then_some(self.current)
	}

	/// Number of matches of the last query.
	pub fn match_count(&self) -> usize {
		self.matches.len()
	}

	/// Matches in display order.
	pub fn matches(&self) -> &[SearchMatch] {
		&self.matches
	}

	/// Rebuild the index for moved nodes, re-running the current query so
	/// match centres follow the new positions. The cursor is kept.
	pub fn reindex(&mut self, nodes: &[GraphNode]) {
		let current = self.current;
		let ids: Vec<String> = self.matches.iter().map(|hit| hit.node_id.clone()).collect();
		*self = Self::new(nodes);
		self.matches = ids
			.iter()
			.filter_map(|id| self.entries.iter().find(|e| &e.hit.node_id == id))
			.map(|entry| entry.hit.clone())
			.collect();
		if current < self.matches.len() {
			self.current = current;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::style::SchemaKind;
	use crate::graph::types::{NodeData, NodeStyle};
	use pretty_assertions::assert_eq;

	fn node(id: &str, label: &str, depth: usize) -> GraphNode {
		GraphNode {
			id: id.to_string(),
			pointer: String::new(),
			depth,
			position: Point::new(depth as f64 * 322.0, 10.0),
			label: label.to_string(),
			data: NodeData::default(),
			style: NodeStyle {
				color: SchemaKind::Unknown.color().to_string(),
			},
			kind: SchemaKind::Unknown,
			is_boolean_node: false,
			target_handles: Vec::new(),
			source_handles: Vec::new(),
			measured: None,
			selected: false,
		}
	}

	fn index() -> SearchIndex {
		SearchIndex::new(&[
			node("#", "root", 0),
			node("#/properties/user", "user", 1),
			node("#/properties/user/properties/firstName", "firstName", 2),
			node("#/properties/name", "name", 1),
			node("#/properties/user/properties/lastName", "lastName", 2),
		])
	}

	fn ids(index: &SearchIndex) -> Vec<&str> {
		index.matches().iter().map(|m| m.node_id.as_str()).collect()
	}

	#[test]
	fn substring_match_ignores_case_and_orders_by_depth() {
		let mut index = index();
		assert_eq!(index.search("NAME"), SearchOutcome::Found { count: 3 });
		assert_eq!(
			ids(&index),
			[
				"#/properties/name",
				"#/properties/user/properties/firstName",
				"#/properties/user/properties/lastName"
			]
		);
		assert_eq!(index.current_index(), Some(0));
	}

	#[test]
	fn match_centre_is_position_plus_half_nominal_size() {
		let mut index = index();
		index.search("user");
		let hit = index.current().unwrap();
		assert_eq!(hit.center, Point::new(322.0 + 86.0, 10.0 + 18.0));
	}

	#[test]
	fn navigation_wraps_both_ways() {
		let mut index = index();
		index.search("name");
		assert_eq!(index.navigate(NavDirection::Prev).unwrap().label, "lastName");
		assert_eq!(index.navigate(NavDirection::Next).unwrap().label, "name");
		assert_eq!(index.navigate(NavDirection::Next).unwrap().label, "firstName");
		assert_eq!(index.current_index(), Some(1));
	}

	#[test]
	fn no_match_reports_feedback() {
		let mut index = index();
		let outcome = index.search(" zip ");
		assert_eq!(outcome.feedback().as_deref(), Some("zip is not in schema"));
		assert_eq!(index.match_count(), 0);
		assert_eq!(index.navigate(NavDirection::Next), None);
		assert_eq!(index.current_index(), None);
	}

	#[test]
	fn blank_query_clears_matches() {
		let mut index = index();
		index.search("user");
		assert_eq!(index.search("   "), SearchOutcome::Cleared);
		assert_eq!(index.match_count(), 0);
		assert_eq!(SearchOutcome::Cleared.feedback(), None);
	}

	#[test]
	fn reindex_follows_moved_nodes() {
		let mut nodes = vec![node("a", "alpha", 0), node("b", "alphabet", 1)];
		let mut index = SearchIndex::new(&nodes);
		index.search("alpha");
		index.navigate(NavDirection::Next);

		nodes[1].position.y = 500.0;
		index.reindex(&nodes);
		assert_eq!(index.match_count(), 2);
		assert_eq!(index.current().unwrap().center.y, 518.0);
	}
}
