//! Browser entry point: mounts the schema viewer.

use leptos::prelude::*;
use schema_graph_canvas::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(App);
}
