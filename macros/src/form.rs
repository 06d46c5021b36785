use darling::{ast, FromDeriveInput, FromField};
use proc_macro2::TokenTree;
use quote::{format_ident, quote, ToTokens};
use syn::Meta;

#[derive(Debug, FromDeriveInput)]
#[darling(supports(struct_named), forward_attrs)]
struct FormInputReceiver {
	ident: syn::Ident,

	generics: syn::Generics,

	data: ast::Data<(), FormFieldReceiver>,

	attrs: Vec<syn::Attribute>,
}

#[derive(Debug, FromField)]
#[darling(forward_attrs)]
struct FormFieldReceiver {
	ident: Option<syn::Ident>,

	ty: syn::Type,
	vis: syn::Visibility,

	attrs: Vec<syn::Attribute>,
}

/// Returns `true` if the attribute is `#[serde(...)]` containing `skip` or `skip_deserializing`.
fn is_skipped(attr: &syn::Attribute) -> bool {
	let Meta::List(ref list) = attr.meta else {
		return false;
	};

	if !list.path.is_ident("serde") {
		return false;
	}

	list.tokens.to_token_stream().into_iter().any(|token| {
		matches!(token, TokenTree::Ident(ref ident) if ident == "skip_deserializing" || ident == "skip")
	})
}

pub fn from_input(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
	let input = syn::parse_macro_input!(input as syn::DeriveInput);
	let receiver = match FormInputReceiver::from_derive_input(&input) {
		Ok(x) => x,
		Err(e) => return e.write_errors().into(),
	};

	let ident = &receiver.ident;
	let vis = &input.vis;
	let generics = &receiver.generics;
	let form_ident = format_ident!("{}Form", ident);
	let doc = format!("The user-submitted fields of [`{ident}`].");

	// The model's own doc comment describes the model, not the form
	let attrs = receiver
		.attrs
		.iter()
		.filter(|attr| !attr.path().is_ident("doc"));

	let Some(fields) = receiver.data.take_struct() else {
		return syn::Error::new_spanned(ident, "#[form] only supports structs with named fields")
			.into_compile_error()
			.into();
	};

	let fields = fields.iter().filter_map(|field| {
		let ident = field.ident.as_ref()?;
		let ty = &field.ty;
		let attrs = &field.attrs;
		let vis = &field.vis;

		if attrs.iter().any(is_skipped) {
			return None;
		}

		Some(quote! {
			#(#attrs)*
			#vis #ident: #ty,
		})
	});

	quote! {
		#input

		#[doc = #doc]
		#(#attrs)*
		#vis struct #form_ident #generics {
			#(
				#fields
			)*
		}
	}
	.into()
}
