use proc_macro::TokenStream;
use quote::quote;
use syn::{parse::Parse, parse_macro_input};

struct VariableList {
    pub variables: Vec<syn::Ident>,
}

impl Parse for VariableList {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let punctuated =
            syn::punctuated::Punctuated::<syn::Ident, syn::token::Comma>::parse_terminated(input)?;

        Ok(VariableList {
            variables: punctuated.into_iter().collect(),
        })
    }
}

/// Bind one local pattern variable per identifier.
///
/// `pattern_vars!(x, y)` expands to
/// `let x = hyast::prelude::Value::var("x"); let y = hyast::prelude::Value::var("y");`
/// so patterns can be written with the variables as plain Rust bindings.
#[proc_macro]
pub fn pattern_vars(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as VariableList);

    let mut generated_lines = Vec::new();
    for variable in input.variables.iter() {
        let name = variable.to_string();
        let line = quote! {
            let #variable = hyast::prelude::Value::var(#name);
        };
        generated_lines.push(line);
    }

    let expanded = quote! {
        #(#generated_lines)*
    };
    TokenStream::from(expanded)
}
