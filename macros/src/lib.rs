//! Procedural macros for `config_bridge`.
//!
//! This crate provides `#[derive(Injectable)]`, which turns `#[inject]` field
//! markers into a static injection plan plus one setter per marked field.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::parse::ParseStream;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Ident, LitStr, Token};

/// Derives `config_bridge::Injectable` for a struct with named fields.
///
/// # Attributes
///
/// - `#[inject("service.id")]` - resolve this field from the container entry `service.id`
/// - `#[inject(service = "service.id")]` - the same, spelled out
///
/// Marked fields must be slots the injector can write: `Option<Arc<T>>` or
/// `Arc<T>`, where `T` may be a trait object. Unmarked fields are never touched.
///
/// # Example
///
/// ```ignore
/// use config_bridge::Injectable;
/// use std::sync::Arc;
///
/// #[derive(Default, Injectable)]
/// pub struct ReportService {
///     #[inject("app.mailer")]
///     mailer: Option<Arc<dyn Mailer>>,
///
///     retries: u32,
/// }
/// ```
///
/// This generates:
///
/// ```ignore
/// impl config_bridge::Injectable for ReportService {
///     fn injection_points() -> &'static [config_bridge::InjectionPoint] {
///         const POINTS: &[config_bridge::InjectionPoint] =
///             &[config_bridge::InjectionPoint::new("mailer", "app.mailer")];
///         POINTS
///     }
///
///     fn inject_point(
///         &mut self,
///         point: &config_bridge::InjectionPoint,
///         container: &config_bridge::Container,
///     ) -> config_bridge::Result<()> {
///         match point.field() {
///             "mailer" => config_bridge::Slot::fill(&mut self.mailer, container, "ReportService", point),
///             _ => Ok(()),
///         }
///     }
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
  let input = parse_macro_input!(input as DeriveInput);
  expand_injectable(input)
    .unwrap_or_else(|err| err.to_compile_error())
    .into()
}

struct Marker {
  ident: Ident,
  field: String,
  service: LitStr,
}

fn expand_injectable(input: DeriveInput) -> syn::Result<TokenStream2> {
  let fields = match &input.data {
    Data::Struct(data) => match &data.fields {
      Fields::Named(named) => &named.named,
      _ => {
        return Err(syn::Error::new_spanned(
          &input.ident,
          "Injectable can only be derived for structs with named fields",
        ))
      }
    },
    _ => {
      return Err(syn::Error::new_spanned(
        &input.ident,
        "Injectable can only be derived for structs",
      ))
    }
  };

  let mut markers = Vec::new();
  for field in fields {
    let mut service = None;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("inject")) {
      if service.is_some() {
        return Err(syn::Error::new_spanned(attr, "duplicate #[inject] marker"));
      }
      service = Some(parse_marker(attr)?);
    }
    if let (Some(service), Some(ident)) = (service, field.ident.clone()) {
      let field = ident.unraw().to_string();
      markers.push(Marker {
        ident,
        field,
        service,
      });
    }
  }

  let name = &input.ident;
  let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

  let points = markers.iter().map(|m| {
    let field = &m.field;
    let service = &m.service;
    quote! { ::config_bridge::InjectionPoint::new(#field, #service) }
  });
  let arms = markers.iter().map(|m| {
    let ident = &m.ident;
    let field = &m.field;
    quote! {
      #field => ::config_bridge::Slot::fill(
        &mut self.#ident,
        container,
        ::std::any::type_name::<Self>(),
        point,
      )
    }
  });

  Ok(quote! {
    impl #impl_generics ::config_bridge::Injectable for #name #ty_generics #where_clause {
      fn injection_points() -> &'static [::config_bridge::InjectionPoint] {
        const POINTS: &[::config_bridge::InjectionPoint] = &[#(#points),*];
        POINTS
      }

      #[allow(unused_variables)]
      fn inject_point(
        &mut self,
        point: &::config_bridge::InjectionPoint,
        container: &::config_bridge::Container,
      ) -> ::config_bridge::Result<()> {
        match point.field() {
          #(#arms,)*
          _ => ::core::result::Result::Ok(()),
        }
      }
    }
  })
}

/// Parses `#[inject("id")]` or `#[inject(service = "id")]`.
fn parse_marker(attr: &Attribute) -> syn::Result<LitStr> {
  let service = attr.parse_args_with(|input: ParseStream| {
    if input.peek(LitStr) {
      return input.parse::<LitStr>();
    }
    let key: Ident = input.parse()?;
    if key != "service" {
      return Err(syn::Error::new(
        key.span(),
        "expected #[inject(\"service.id\")] or #[inject(service = \"service.id\")]",
      ));
    }
    input.parse::<Token![=]>()?;
    input.parse::<LitStr>()
  })?;

  if service.value().trim().is_empty() {
    return Err(syn::Error::new(service.span(), "service id must not be empty"));
  }
  Ok(service)
}
