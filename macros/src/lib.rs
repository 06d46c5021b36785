mod form;
mod route;

use proc_macro::TokenStream;

/// Creates a new documentation function for the route, named after the original function with the suffix `_docs`.
///
/// The first line of the doc comment becomes the summary, the rest becomes the description.
#[proc_macro_attribute]
pub fn route(args: TokenStream, input: TokenStream) -> TokenStream {
	route::from_input(args, input)
}

/// Creates a `XForm` struct holding the fields of the model that a user may submit.
/// Fields with #[serde(skip_deserializing)] or #[serde(skip)] are left out, all
/// other fields are included verbatim (including attributes).
#[proc_macro_attribute]
pub fn form(_args: TokenStream, input: TokenStream) -> TokenStream {
	form::from_input(input)
}
