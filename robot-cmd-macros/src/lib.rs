use darling::FromDeriveInput;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(subsystem), supports(struct_any))]
struct SubsystemReceiver {
  ident: syn::Ident,
  generics: syn::Generics,
  #[darling(default)]
  id: Option<String>,
}

fn snake_case(ident: &str) -> String {
  let mut out = String::new();
  for (i, c) in ident.chars().enumerate() {
    if c.is_uppercase() {
      if i != 0 { out.push('_'); }
      out.extend(c.to_lowercase());
    } else {
      out.push(c);
    }
  }
  out
}

/// Gives a subsystem struct its scheduler identity. The id defaults to the snake-cased
/// struct name and can be overridden with `#[subsystem(id = "...")]`.
#[proc_macro_derive(NamedSubsystem, attributes(subsystem))]
pub fn derive_named_subsystem(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
  let input = parse_macro_input!(input as DeriveInput);

  let receiver = match SubsystemReceiver::from_derive_input(&input) {
    Ok(r) => r,
    Err(e) => return e.write_errors().into(),
  };

  let ident = receiver.ident;
  let id = receiver.id.unwrap_or_else(|| snake_case(&ident.to_string()));
  let (impl_generics, ty_generics, where_clause) = receiver.generics.split_for_impl();

  quote! {
    impl #impl_generics ::robot_cmd::subsystem::NamedSubsystem for #ident #ty_generics #where_clause {
      const ID: ::robot_cmd::subsystem::SubsystemId = #id;
    }
  }.into()
}
