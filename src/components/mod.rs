pub mod breadcrumbs;
pub mod node_details;
pub mod schema_graph;
pub mod search_bar;
