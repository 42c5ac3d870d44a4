use leptos::prelude::*;

use crate::components::schema_graph::GraphCommand;
use crate::schema::pointer::breadcrumbs;

/// Path from the root to the selected node. Each crumb focuses its node.
#[component]
pub fn Breadcrumbs(
	#[prop(into)] selected: Signal<Option<String>>,
	commands: WriteSignal<Option<GraphCommand>>,
) -> impl IntoView {
	let trail = move || {
		selected.get().map(|id| {
			breadcrumbs(&id)
				.into_iter()
				.enumerate()
				.map(|(i, crumb)| {
					let (target, title) = (crumb.id.clone(), crumb.id);
					view! {
						{(i > 0).then(|| view! { <span class="crumb-sep">"/"</span> })}
						<button
							class="crumb"
							title=title
							on:click=move |_| commands.set(Some(GraphCommand::Focus(target.clone())))
						>
							{crumb.label}
						</button>
					}
				})
				.collect_view()
		})
	};

	view! { <nav class="breadcrumbs">{trail}</nav> }
}
