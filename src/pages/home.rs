use leptos::prelude::*;

use crate::components::schema_graph::SchemaGraphView;
use crate::graph::LayoutDirection;
use crate::schema::SchemaFormat;

/// Schema shown on first load.
const SAMPLE_SCHEMA: &str = r##"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "$id": "https://example.com/order.schema.json",
  "title": "Order",
  "type": "object",
  "required": ["id", "customer", "items"],
  "properties": {
    "id": { "type": "string", "format": "uuid" },
    "customer": { "$ref": "#/$defs/person" },
    "items": {
      "type": "array",
      "minItems": 1,
      "items": {
        "type": "object",
        "properties": {
          "sku": { "type": "string", "pattern": "^[A-Z]{3}-\\d{4}$" },
          "quantity": { "type": "integer", "minimum": 1 },
          "price": { "type": "number", "exclusiveMinimum": 0 }
        }
      }
    },
    "status": { "enum": ["pending", "paid", "shipped", "cancelled"] },
    "note": { "anyOf": [{ "type": "string", "maxLength": 280 }, { "type": "null" }] }
  },
  "$defs": {
    "person": {
      "type": "object",
      "properties": {
        "name": { "type": "string" },
        "email": { "type": "string", "format": "email" },
        "referredBy": { "$ref": "#/$defs/person" }
      }
    }
  }
}"##;

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let schema = RwSignal::new(SAMPLE_SCHEMA.to_string());
	let format = RwSignal::new(SchemaFormat::Json);
	let direction = RwSignal::new(LayoutDirection::default());

	let on_format = move |ev: web_sys::Event| {
		if let Ok(parsed) = event_target_value(&ev).parse::<SchemaFormat>() {
			format.set(parsed);
		}
	};
	let direction_label = move || match direction.get() {
		LayoutDirection::LeftToRight => "Top to bottom",
		LayoutDirection::TopToBottom => "Left to right",
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<SchemaGraphView schema=schema format=format direction=direction />
				<div class="graph-overlay">
					<h1>"Schema Graph"</h1>
					<p class="subtitle">
						"Click a node to inspect it. Scroll to zoom. Drag background to pan."
					</p>
					<div class="schema-controls">
						<select prop:value=move || format.get().as_str() on:change=on_format>
							<option value="json">"JSON"</option>
							<option value="yaml">"YAML"</option>
						</select>
						<button on:click=move |_| direction.update(|d| *d = d.toggled())>
							{direction_label}
						</button>
					</div>
					<textarea
						class="schema-input"
						spellcheck="false"
						prop:value=move || schema.get()
						on:input=move |ev| schema.set(event_target_value(&ev))
					/>
				</div>
			</div>
		</ErrorBoundary>
	}
}
