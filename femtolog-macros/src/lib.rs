//! Compile-time validation for femtolog's logging macros.
//!
//! `check_format!("fmt", arg0, arg1, …)` verifies that the number of `{}`
//! placeholders in the literal matches the number of argument expressions
//! and that the literal uses nothing beyond the positional `{}`
//! mini-language (no `{0}`, no `{:x}`). Errors point at the format literal.
//! The expansion is `()`; the argument expressions are never evaluated.

use proc_macro::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{parse_macro_input, Expr, LitStr, Token};

struct CheckFormatInput {
  format: LitStr,
  args: Vec<Expr>,
}

impl Parse for CheckFormatInput {
  fn parse(input: ParseStream) -> syn::Result<Self> {
    let format: LitStr = input.parse()?;
    let mut args = Vec::new();
    while input.peek(Token![,]) {
      input.parse::<Token![,]>()?;
      if input.is_empty() {
        break;
      }
      args.push(input.parse::<Expr>()?);
    }
    Ok(Self { format, args })
  }
}

#[proc_macro]
pub fn check_format(input: TokenStream) -> TokenStream {
  let input = parse_macro_input!(input as CheckFormatInput);

  let placeholders = match placeholder_count(&input.format.value()) {
    Ok(count) => count,
    Err(message) => {
      return syn::Error::new(input.format.span(), message)
        .to_compile_error()
        .into();
    },
  };

  if placeholders != input.args.len() {
    let message = format!(
      "format string expects {} argument{}, but {} {} supplied",
      placeholders,
      if placeholders == 1 { "" } else { "s" },
      input.args.len(),
      if input.args.len() == 1 { "was" } else { "were" },
    );
    return syn::Error::new(input.format.span(), message)
      .to_compile_error()
      .into();
  }

  quote!(()).into()
}

/// Counts `{}` placeholders, honoring `{{` / `}}` escapes. Anything else
/// between braces is outside the supported mini-language.
fn placeholder_count(format: &str) -> Result<usize, String> {
  let bytes = format.as_bytes();
  let mut i = 0;
  let mut count = 0usize;

  while i < bytes.len() {
    match bytes[i] {
      b'{' => {
        if i + 1 < bytes.len() && bytes[i + 1] == b'{' {
          i += 2;
        } else if i + 1 < bytes.len() && bytes[i + 1] == b'}' {
          count += 1;
          i += 2;
        } else {
          return Err(String::from(
            "only positional `{}` placeholders are supported (use `{{` for a literal brace)",
          ));
        }
      },
      b'}' => {
        if i + 1 < bytes.len() && bytes[i + 1] == b'}' {
          i += 2;
        } else {
          return Err(String::from(
            "unmatched `}` (use `}}` for a literal brace)",
          ));
        }
      },
      _ => i += 1,
    }
  }

  Ok(count)
}
