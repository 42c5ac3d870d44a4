use leptos::prelude::*;

use crate::components::schema_graph::GraphCommand;
use crate::graph::{GraphNode, NodeDataEntry, NodeValue, SchemaKind};

/// Full text of a data row, without the on-node shortening.
pub fn entry_text(entry: &NodeDataEntry) -> String {
	match &entry.value {
		NodeValue::One(value) => value.clone(),
		NodeValue::Many(values) => values.join(", "),
	}
}

pub fn kind_label(kind: SchemaKind) -> &'static str {
	match kind {
		SchemaKind::Object => "object",
		SchemaKind::Array => "array",
		SchemaKind::String => "string",
		SchemaKind::Number => "number",
		SchemaKind::Integer => "integer",
		SchemaKind::Boolean => "boolean",
		SchemaKind::Null => "null",
		SchemaKind::Reference => "reference",
		SchemaKind::Combinator => "combinator",
		SchemaKind::BooleanSchema(true) => "always valid",
		SchemaKind::BooleanSchema(false) => "never valid",
		SchemaKind::Unknown => "schema",
	}
}

/// Side panel for the selected node: its keywords and the raw subschema.
#[component]
pub fn NodeDetails(
	#[prop(into)] node: Signal<Option<GraphNode>>,
	#[prop(into)] subschema: Signal<Option<String>>,
	commands: WriteSignal<Option<GraphCommand>>,
) -> impl IntoView {
	move || {
		node.get().map(|node| {
			let rows = node
				.data
				.iter()
				.map(|(key, entry)| {
					let (key, value) = (key.to_string(), entry_text(entry));
					view! {
						<tr>
							<th>{key}</th>
							<td>{value}</td>
						</tr>
					}
				})
				.collect_view();

			view! {
				<aside class="node-details">
					<header style=format!("border-color: {}", node.style.color)>
						<h2>{node.label.clone()}</h2>
						<span class="node-kind">{kind_label(node.kind)}</span>
						<button
							title="Close"
							on:click=move |_| commands.set(Some(GraphCommand::ClearSelection))
						>
							"×"
						</button>
					</header>
					<p class="node-id">{node.id.clone()}</p>
					<table class="node-data">{rows}</table>
					{move || subschema.get().map(|json| view! { <pre class="subschema">{json}</pre> })}
				</aside>
			}
		})
	}
}
