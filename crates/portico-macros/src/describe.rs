//! `#[derive(Describe)]` expansion.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_quote, Data, DeriveInput, Field, Fields, GenericParam};

use crate::parse::{ContainerAttrs, FieldAttrs};

/// Expands `#[derive(Describe)]` into `Describe` and `TypeInfo` impls.
pub fn expand_describe(input: DeriveInput) -> syn::Result<TokenStream> {
    let container = ContainerAttrs::from_attrs(&input.attrs)?;
    let krate = container
        .crate_path
        .clone()
        .unwrap_or_else(|| parse_quote!(::portico_schema));

    let fields: Vec<&Field> = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Describe can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Describe can only be derived for structs",
            ))
        }
    };

    let mut field_defs = Vec::with_capacity(fields.len());
    for field in fields {
        if let Some(def) = field_def(field, &container, &krate)? {
            field_defs.push(def);
        }
    }

    let ident = &input.ident;
    let name = ident.to_string();
    let title = container.title.as_ref().map(|t| quote!(.title(#t)));
    let description = container
        .description
        .as_ref()
        .map(|d| quote!(.description(#d)));

    let mut generics = input.generics.clone();
    for param in &mut generics.params {
        if let GenericParam::Type(ty) = param {
            ty.bounds.push(parse_quote!(#krate::TypeInfo));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #krate::Describe for #ident #ty_generics #where_clause {
            fn describe() -> #krate::Shape {
                #krate::Shape::new(#name)
                    #title
                    #description
                    #(.field(#field_defs))*
            }
        }

        impl #impl_generics #krate::TypeInfo for #ident #ty_generics #where_clause {
            fn type_info() -> #krate::TypeDescriptor {
                #krate::TypeDescriptor::object(<Self as #krate::Describe>::describe())
            }
        }
    })
}

fn field_def(
    field: &Field,
    container: &ContainerAttrs,
    krate: &syn::Path,
) -> syn::Result<Option<TokenStream>> {
    let attrs = FieldAttrs::from_attrs(&field.attrs)?;
    if attrs.skip || attrs.serde_skip {
        return Ok(None);
    }

    let Some(ident) = field.ident.as_ref() else {
        return Err(syn::Error::new_spanned(field, "expected a named field"));
    };
    let raw = ident.to_string();
    let raw = raw.strip_prefix("r#").unwrap_or(&raw);
    let key = match (&attrs.serde_rename, container.rename_all) {
        (Some(rename), _) => rename.clone(),
        (None, Some(rule)) => rule.apply(raw),
        (None, None) => raw.to_string(),
    };

    let ty = &field.ty;
    let mut def = if attrs.embed || attrs.flatten {
        let flatten = attrs.flatten.then(|| quote!(.flatten()));
        quote!(#krate::FieldDef::embed(#key, <#ty as #krate::Describe>::describe()) #flatten)
    } else {
        quote!(#krate::FieldDef::new(#key, <#ty as #krate::TypeInfo>::type_info()))
    };

    for tag in &attrs.tags {
        let variant = syn::Ident::new(tag.variant, proc_macro2::Span::call_site());
        let name = &tag.name;
        def.extend(quote!(.tag(#krate::ParamLocation::#variant, #name)));
    }
    if attrs.required {
        def.extend(quote!(.required()));
    }
    if let Some(n) = attrs.min_length {
        def.extend(quote!(.min_length(#n)));
    }
    if let Some(n) = attrs.max_length {
        def.extend(quote!(.max_length(#n)));
    }
    if let Some(n) = attrs.minimum {
        def.extend(quote!(.minimum(#n)));
    }
    if let Some(n) = attrs.maximum {
        def.extend(quote!(.maximum(#n)));
    }
    if let Some(p) = &attrs.pattern {
        def.extend(quote!(.pattern(#p)));
    }
    if let Some(f) = &attrs.format {
        def.extend(quote!(.format(#f)));
    }
    if let Some(e) = &attrs.enumeration {
        def.extend(quote!(.enum_literal(#e)));
    }
    if let Some(d) = &attrs.default {
        def.extend(quote!(.default_literal(#d)));
    }
    if let Some(e) = &attrs.example {
        def.extend(quote!(.example_literal(#e)));
    }
    if let Some(t) = &attrs.title {
        def.extend(quote!(.title(#t)));
    }
    if let Some(d) = &attrs.description {
        def.extend(quote!(.description(#d)));
    }
    if attrs.deprecated {
        def.extend(quote!(.deprecated()));
    }
    Ok(Some(def))
}
