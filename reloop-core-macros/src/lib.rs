use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, LitStr};

/// Derives `reloop_core::Action`, using the variant name (enums) or the type
/// name (structs) as the discriminator. `#[action(rename = "...")]` overrides
/// it on either.
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident.clone();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match input.data {
        Data::Struct(_) => match discriminator(&input.attrs, &name) {
            Ok(tag) => quote! { #tag },
            Err(err) => return err.to_compile_error().into(),
        },
        Data::Enum(ref data) => match enum_arms(&name, data) {
            Ok(arms) => quote! {
                match self {
                    #(#arms),*
                }
            },
            Err(err) => return err.to_compile_error().into(),
        },
        Data::Union(_) => {
            return syn::Error::new_spanned(name, "Action derive does not support unions")
                .to_compile_error()
                .into();
        }
    };

    quote! {
        impl #impl_generics ::reloop_core::Action for #name #ty_generics #where_clause {
            fn action_type(&self) -> &str {
                #body
            }
        }
    }
    .into()
}

fn discriminator(attrs: &[Attribute], ident: &syn::Ident) -> syn::Result<LitStr> {
    let mut renamed = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("action")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                renamed = Some(meta.value()?.parse::<LitStr>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported action attribute, expected `rename`"))
            }
        })?;
    }
    Ok(renamed.unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span())))
}

fn enum_arms(name: &syn::Ident, data: &syn::DataEnum) -> syn::Result<Vec<proc_macro2::TokenStream>> {
    data.variants
        .iter()
        .map(|v| {
            let vident = &v.ident;
            let tag = discriminator(&v.attrs, vident)?;
            Ok(match &v.fields {
                Fields::Unit => quote! { #name::#vident => #tag },
                Fields::Unnamed(_) => quote! { #name::#vident(..) => #tag },
                Fields::Named(_) => quote! { #name::#vident { .. } => #tag },
            })
        })
        .collect()
}
