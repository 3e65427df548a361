//! Procedural macros for promised-thunk

use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Container-level input for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: syn::Ident,
    generics: syn::Generics,
    data: darling::ast::Data<ActionVariant, ()>,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: syn::Ident,
    fields: darling::ast::Fields<()>,

    /// Name reported by `Action::name()` instead of the variant name
    #[darling(default)]
    rename: Option<String>,
}

/// Derive macro for the Action trait
///
/// Generates a `name()` method that returns the variant name as a static string.
/// Use `#[action(rename = "...")]` on a variant to report a different name,
/// for example to group related variants under one log filter pattern.
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// enum MyAction {
///     Increment,
///     SetValue(i32),
///     #[action(rename = "DidLoad")]
///     Loaded { items: Vec<String> },
/// }
///
/// assert_eq!(MyAction::Increment.name(), "Increment");
/// assert_eq!(MyAction::Loaded { items: vec![] }.name(), "DidLoad");
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Action can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let name_arms: Vec<TokenStream2> = variants
        .iter()
        .map(|v| {
            let variant_name = &v.ident;
            let variant_str = v
                .rename
                .clone()
                .unwrap_or_else(|| variant_name.to_string());

            match &v.fields.style {
                darling::ast::Style::Unit => quote! {
                    Self::#variant_name => #variant_str
                },
                darling::ast::Style::Tuple => quote! {
                    Self::#variant_name(..) => #variant_str
                },
                darling::ast::Style::Struct => quote! {
                    Self::#variant_name { .. } => #variant_str
                },
            }
        })
        .collect();

    // An empty enum has no values to name.
    let body: TokenStream2 = if name_arms.is_empty() {
        quote! { match *self {} }
    } else {
        quote! {
            match self {
                #(#name_arms),*
            }
        }
    };

    let expanded = quote! {
        impl #impl_generics promised_thunk::Action for #name #ty_generics #where_clause {
            fn name(&self) -> &'static str {
                #body
            }
        }
    };

    TokenStream::from(expanded)
}
