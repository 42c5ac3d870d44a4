use leptos::prelude::*;
use web_sys::KeyboardEvent;

use crate::components::schema_graph::{GraphCommand, MatchStatus};
use crate::graph::NavDirection;

/// `"2 / 5"` style position, empty without matches.
pub fn match_label(status: MatchStatus) -> String {
	match status.current {
		Some(current) if status.count > 0 => format!("{} / {}", current + 1, status.count),
		_ => String::new(),
	}
}

/// Command for Enter in the search box.
///
/// Steps through the current matches when `query` is what was last searched,
/// otherwise searches again. Shift steps backwards.
pub fn enter_command(query: &str, searched: Option<&str>, count: usize, shift: bool) -> GraphCommand {
	if shift {
		return GraphCommand::Navigate(NavDirection::Prev);
	}
	if searched == Some(query) && count > 0 {
		GraphCommand::Navigate(NavDirection::Next)
	} else {
		GraphCommand::Search(query.to_string())
	}
}

/// Node search with previous/next stepping.
///
/// Every edit re-runs the query. Enter steps to the next match, Shift+Enter
/// steps back, Escape clears.
#[component]
pub fn SearchBar(
	commands: WriteSignal<Option<GraphCommand>>,
	#[prop(into)] matches: Signal<MatchStatus>,
	#[prop(into)] feedback: Signal<Option<String>>,
) -> impl IntoView {
	let query = RwSignal::new(String::new());
	let searched = RwSignal::new(None::<String>);

	let step = move |direction: NavDirection| commands.set(Some(GraphCommand::Navigate(direction)));
	let run = move |text: String| {
		searched.set(Some(text.clone()));
		commands.set(Some(GraphCommand::Search(text)));
	};

	let on_keydown = move |ev: KeyboardEvent| match ev.key().as_str() {
		"Enter" => {
			let text = query.get_untracked();
			let count = matches.get_untracked().count;
			let command = searched
				.with_untracked(|last| enter_command(&text, last.as_deref(), count, ev.shift_key()));
			if let GraphCommand::Search(text) = &command {
				searched.set(Some(text.clone()));
			}
			commands.set(Some(command));
		}
		"Escape" => {
			query.set(String::new());
			run(String::new());
		}
		_ => {}
	};

	let no_matches = move || matches.get().count == 0;

	view! {
		<div class="search-bar">
			<input
				type="search"
				placeholder="Search nodes"
				prop:value=move || query.get()
				on:input=move |ev| {
					let text = event_target_value(&ev);
					query.set(text.clone());
					run(text);
				}
				on:keydown=on_keydown
			/>
			<button
				title="Previous match"
				disabled=no_matches
				on:click=move |_| step(NavDirection::Prev)
			>
				"‹"
			</button>
			<span class="match-count">{move || match_label(matches.get())}</span>
			<button
				title="Next match"
				disabled=no_matches
				on:click=move |_| step(NavDirection::Next)
			>
				"›"
			</button>
			{move || feedback.get().map(|text| view! { <div class="search-feedback">{text}</div> })}
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn label_is_one_based() {
		assert_eq!(match_label(MatchStatus { current: Some(0), count: 3 }), "1 / 3");
		assert_eq!(match_label(MatchStatus { current: Some(2), count: 3 }), "3 / 3");
	}

	#[test]
	fn enter_steps_through_an_unchanged_query() {
		assert_eq!(
			enter_command("name", Some("name"), 3, false),
			GraphCommand::Navigate(NavDirection::Next)
		);
		assert_eq!(
			enter_command("name", Some("name"), 3, true),
			GraphCommand::Navigate(NavDirection::Prev)
		);
	}

	#[test]
	fn enter_searches_a_new_or_fruitless_query() {
		assert_eq!(
			enter_command("nam", Some("name"), 3, false),
			GraphCommand::Search("nam".into())
		);
		assert_eq!(enter_command("zip", Some("zip"), 0, false), GraphCommand::Search("zip".into()));
		assert_eq!(enter_command("id", None, 0, false), GraphCommand::Search("id".into()));
	}

	#[test]
	fn label_is_empty_without_matches() {
		assert_eq!(match_label(MatchStatus::default()), "");
		assert_eq!(match_label(MatchStatus { current: None, count: 0 }), "");
	}
}
