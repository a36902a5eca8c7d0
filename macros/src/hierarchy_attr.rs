use syn::spanned::Spanned;
use syn::{DeriveInput, LitStr, Path};

/// Parsed `#[hierarchy(...)]` arguments of a derived type.
#[derive(Default)]
pub struct HierarchyAttr {
    pub parent: Option<Path>,
    pub name: Option<String>,
    pub table_name: Option<String>,
    pub type_column: Option<String>,
    pub writable_table: Option<String>,
}

pub fn parse_hierarchy_attr(input: &DeriveInput) -> Result<HierarchyAttr, syn::Error> {
    let mut result = HierarchyAttr::default();
    let mut seen = false;
    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("hierarchy")) {
        if seen {
            return Err(syn::Error::new(attr.path().span(), "Multiple `#[hierarchy]` attributes found; only one is allowed"));
        }
        seen = true;
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("parent") {
                result.parent = Some(nested.value()?.parse::<Path>()?);
            } else if nested.path.is_ident("name") {
                result.name = Some(non_empty(nested.value()?.parse::<LitStr>()?)?);
            } else if nested.path.is_ident("table_name") {
                result.table_name = Some(non_empty(nested.value()?.parse::<LitStr>()?)?);
            } else if nested.path.is_ident("type_column") {
                result.type_column = Some(non_empty(nested.value()?.parse::<LitStr>()?)?);
            } else if nested.path.is_ident("writable_table") {
                result.writable_table = Some(non_empty(nested.value()?.parse::<LitStr>()?)?);
            } else {
                return Err(nested.error("Unsupported hierarchy argument, expected one of `parent`, `name`, `table_name`, `type_column`, `writable_table`"));
            }
            Ok(())
        })?;
    }
    if result.parent.is_none() && result.writable_table.is_some() {
        return Err(syn::Error::new(input.ident.span(), "`writable_table` is only allowed on types with a `parent`"));
    }
    Ok(result)
}

fn non_empty(lit: LitStr) -> Result<String, syn::Error> {
    let value = lit.value();
    if value.trim().is_empty() {
        Err(syn::Error::new(lit.span(), "Expected a non-empty string"))
    } else {
        Ok(value)
    }
}
