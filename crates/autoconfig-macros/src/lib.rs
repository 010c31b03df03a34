//! Marker attributes for autoconfig.
//!
//! These attributes carry no behavior of their own: they exist so that marked
//! sources compile, and so the discovery pass (`autoconfig-scan`) can find
//! them by name. Each attribute checks that it sits on a `const` item and
//! passes the item through unchanged. Everything else (argument validation,
//! key derivation, default coercion, conflict detection) happens at scan
//! time, before the program ever runs.
//!
//! Two idioms are recognized:
//!
//! ```ignore
//! // General marker: type is an explicit argument.
//! #[auto_register(type = "int", default = "6")]
//! pub const RETRY_LIMIT: &str = "net.retry_limit";
//!
//! // Shorthand marker: type implied by the attribute itself.
//! #[auto_register_bool(default = "false")]
//! pub const VERBOSE: &str = "log.verbose";
//! ```
//!
//! When no `key` argument is given, the configuration key is the marked
//! const's own string-literal value.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Error, Item};

fn passthrough(item: TokenStream) -> TokenStream {
    let parsed = parse_macro_input!(item as Item);
    match parsed {
        Item::Const(item) => quote!(#item).into(),
        other => Error::new_spanned(other, "autoconfig markers may only be placed on const items")
            .to_compile_error()
            .into(),
    }
}

/// General marker: `#[auto_register(type = "...", default = "...", key = "...")]`.
///
/// `type` is required; `default` and `key` are optional. When `key` is absent
/// the const's string-literal value is used.
#[proc_macro_attribute]
pub fn auto_register(_args: TokenStream, item: TokenStream) -> TokenStream {
    passthrough(item)
}

/// Shorthand for an `int` entry: `#[auto_register_int(default = "6")]`.
#[proc_macro_attribute]
pub fn auto_register_int(_args: TokenStream, item: TokenStream) -> TokenStream {
    passthrough(item)
}

/// Shorthand for a `long` entry.
#[proc_macro_attribute]
pub fn auto_register_long(_args: TokenStream, item: TokenStream) -> TokenStream {
    passthrough(item)
}

/// Shorthand for a `float` entry.
#[proc_macro_attribute]
pub fn auto_register_float(_args: TokenStream, item: TokenStream) -> TokenStream {
    passthrough(item)
}

/// Shorthand for a `double` entry.
#[proc_macro_attribute]
pub fn auto_register_double(_args: TokenStream, item: TokenStream) -> TokenStream {
    passthrough(item)
}

/// Shorthand for a `bool` entry.
#[proc_macro_attribute]
pub fn auto_register_bool(_args: TokenStream, item: TokenStream) -> TokenStream {
    passthrough(item)
}

/// Shorthand for a `string` entry.
#[proc_macro_attribute]
pub fn auto_register_string(_args: TokenStream, item: TokenStream) -> TokenStream {
    passthrough(item)
}
