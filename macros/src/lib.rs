extern crate proc_macro;
mod hierarchy_attr;

use crate::hierarchy_attr::{parse_hierarchy_attr, HierarchyAttr};
use proc_macro::TokenStream;
use proc_macro_error::proc_macro_error;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Implements `strata::HierarchyType`, a type without `parent` becomes a hierarchy root.
///
/// ```ignore
/// #[derive(HierarchyType)]
/// #[hierarchy(parent = Animal, table_name = "dogs")]
/// struct Dog;
/// ```
#[proc_macro_derive(HierarchyType, attributes(hierarchy))]
#[proc_macro_error]
pub fn derive_hierarchy_type(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match parse_hierarchy_attr(&input) {
        Ok(attr) => expand(&input, attr).into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput, attr: HierarchyAttr) -> proc_macro2::TokenStream {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let type_name = attr.name.unwrap_or_else(|| ident.to_string());

    let superclass = match &attr.parent {
        Some(parent) => quote! { ::strata::Superclass::of::<#parent>() },
        None => quote! { ::strata::Superclass::Base },
    };

    let mut options = vec![quote! { ::strata::RegisterOptions::default() }];
    if let Some(column) = &attr.type_column {
        options.push(quote! { .identity_column_name(#column) });
    }
    if let Some(table) = &attr.table_name {
        options.push(quote! { .read_table_name(#table) });
    }
    if let Some(table) = &attr.writable_table {
        options.push(quote! { .writable_table(#table) });
    }

    quote! {
        impl #impl_generics ::strata::hierarchy::HierarchyType for #ident #ty_generics #where_clause {
            fn declaration() -> ::strata::TypeDecl {
                ::strata::TypeDecl::new(#type_name, #superclass)
            }

            fn options() -> ::strata::RegisterOptions {
                #(#options)*
            }
        }
    }
}
