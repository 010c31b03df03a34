//! The marker model: the attributes the scanner recognizes and the rule by
//! which each resolves to a registration entry.
//!
//! Markers sit on `const` items of type `&str`. The general marker names its
//! type explicitly; the shorthand markers imply it:
//!
//! ```ignore
//! #[auto_register(type = "int", default = "6")]
//! pub const RETRY_LIMIT: &str = "net.retry_limit";
//!
//! #[auto_register_bool(default = "false")]
//! pub const VERBOSE: &str = "log.verbose";
//! ```
//!
//! Key derivation rule (the same for every marker kind): an explicit
//! `key = "..."` argument wins; otherwise the key is the const's own
//! string-literal value. A marked const with no `key` argument and a
//! non-literal (or empty) initializer fails the scan. All argument values
//! are written as string literals; defaults are kept in textual form and
//! only validated against the declared type here.

use proc_macro2::{TokenStream, TokenTree};
use std::path::Path;
use syn::spanned::Spanned;
use syn::{Expr, ItemConst, Lit, Meta};

use autoconfig_common::{coerce, RegistrationEntry, TypeTag};

use crate::error::{DiscoveryError, MarkerSite};

/// Name of the general marker attribute.
pub const GENERAL_MARKER: &str = "auto_register";

/// The shorthand marker names and the type each one implies.
pub const SHORTHAND_MARKERS: [(&str, TypeTag); 6] = [
    ("auto_register_int", TypeTag::Int),
    ("auto_register_long", TypeTag::Long),
    ("auto_register_float", TypeTag::Float),
    ("auto_register_double", TypeTag::Double),
    ("auto_register_bool", TypeTag::Bool),
    ("auto_register_string", TypeTag::String),
];

/// Returns the type implied by a shorthand marker name, if it is one.
#[must_use]
pub fn shorthand_type(name: &str) -> Option<TypeTag> {
    SHORTHAND_MARKERS
        .iter()
        .find(|(marker, _)| *marker == name)
        .map(|(_, tag)| *tag)
}

/// Whether `name` is any recognized marker attribute.
#[must_use]
pub fn is_marker(name: &str) -> bool {
    name == GENERAL_MARKER || shorthand_type(name).is_some()
}

/// One marker resolved against its declaration site.
#[derive(Debug, Clone)]
pub struct ResolvedMarker {
    /// The canonical registration this marker encodes.
    pub entry: RegistrationEntry,
    /// Where the marker was written, for conflict reporting.
    pub site: MarkerSite,
}

#[derive(Debug, Default)]
struct MarkerArgs {
    key: Option<String>,
    type_tag: Option<String>,
    default: Option<String>,
}

/// Resolves every recognized marker on a const item (usually zero or one).
///
/// # Errors
///
/// Returns a [`DiscoveryError`] for malformed arguments, unsupported types,
/// underivable keys, or defaults that do not coerce.
pub fn resolve_markers(
    item: &ItemConst,
    file: &Path,
) -> Result<Vec<ResolvedMarker>, DiscoveryError> {
    let mut resolved = Vec::new();

    for attr in &item.attrs {
        let Some(ident) = attr.path().get_ident() else {
            continue;
        };
        let name = ident.to_string();
        if !is_marker(&name) {
            continue;
        }

        let site = MarkerSite {
            file: file.to_path_buf(),
            line: attr.span().start().line,
            const_name: item.ident.to_string(),
        };

        let args = parse_args(attr.meta.clone(), &site)?;
        let type_tag = resolve_type(&name, &args, &site)?;
        let key = resolve_key(&args, item, &site)?;

        if let Some(default) = &args.default {
            coerce(type_tag, default).map_err(|source| DiscoveryError::UnparseableDefault {
                key: key.clone(),
                site: site.clone(),
                source,
            })?;
        }

        resolved.push(ResolvedMarker {
            entry: RegistrationEntry {
                key,
                type_tag,
                default: args.default,
            },
            site,
        });
    }

    Ok(resolved)
}

fn resolve_type(
    name: &str,
    args: &MarkerArgs,
    site: &MarkerSite,
) -> Result<TypeTag, DiscoveryError> {
    if let Some(implied) = shorthand_type(name) {
        if args.type_tag.is_some() {
            return Err(DiscoveryError::InvalidMarker {
                site: site.clone(),
                message: format!("`{name}` implies its type and takes no `type` argument"),
            });
        }
        return Ok(implied);
    }

    let Some(tag) = &args.type_tag else {
        return Err(DiscoveryError::InvalidMarker {
            site: site.clone(),
            message: "missing required `type` argument".to_string(),
        });
    };
    tag.parse().map_err(|_| DiscoveryError::UnsupportedType {
        tag: tag.clone(),
        site: site.clone(),
    })
}

fn resolve_key(
    args: &MarkerArgs,
    item: &ItemConst,
    site: &MarkerSite,
) -> Result<String, DiscoveryError> {
    let key = match &args.key {
        Some(explicit) => explicit.clone(),
        None => match item.expr.as_ref() {
            Expr::Lit(lit) => match &lit.lit {
                Lit::Str(text) => text.value(),
                _ => String::new(),
            },
            _ => String::new(),
        },
    };

    if key.is_empty() {
        return Err(DiscoveryError::MissingKey { site: site.clone() });
    }
    Ok(key)
}

/// Parses `name = "value"` pairs out of a marker attribute.
///
/// Done over raw tokens rather than `syn`'s meta helpers because `type` is a
/// Rust keyword and must still be accepted as an argument name.
fn parse_args(meta: Meta, site: &MarkerSite) -> Result<MarkerArgs, DiscoveryError> {
    let invalid = |message: String| DiscoveryError::InvalidMarker {
        site: site.clone(),
        message,
    };

    let tokens = match meta {
        Meta::Path(_) => TokenStream::new(),
        Meta::List(list) => {
            if !matches!(list.delimiter, syn::MacroDelimiter::Paren(_)) {
                return Err(invalid("marker arguments must be parenthesized".to_string()));
            }
            list.tokens
        }
        Meta::NameValue(_) => {
            return Err(invalid(
                "expected a parenthesized argument list".to_string(),
            ))
        }
    };

    let mut args = MarkerArgs::default();
    let mut iter = tokens.into_iter();

    loop {
        let name = match iter.next() {
            None => break,
            Some(TokenTree::Ident(ident)) => ident.to_string(),
            Some(other) => {
                return Err(invalid(format!("expected argument name, found `{other}`")))
            }
        };

        match iter.next() {
            Some(TokenTree::Punct(punct)) if punct.as_char() == '=' => {}
            _ => return Err(invalid(format!("expected `=` after `{name}`"))),
        }

        let value = match iter.next() {
            Some(TokenTree::Literal(lit)) => syn::parse_str::<syn::LitStr>(&lit.to_string())
                .map(|lit| lit.value())
                .map_err(|_| invalid(format!("`{name}` must be a string literal")))?,
            _ => return Err(invalid(format!("`{name}` must be a string literal"))),
        };

        let slot = match name.as_str() {
            "key" => &mut args.key,
            "type" => &mut args.type_tag,
            "default" => &mut args.default,
            other => return Err(invalid(format!("unknown argument `{other}`"))),
        };
        if slot.replace(value).is_some() {
            return Err(invalid(format!("duplicate argument `{name}`")));
        }

        match iter.next() {
            None => break,
            Some(TokenTree::Punct(punct)) if punct.as_char() == ',' => {}
            Some(other) => return Err(invalid(format!("expected `,`, found `{other}`"))),
        }
    }

    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn resolve_one(item: ItemConst) -> Result<ResolvedMarker, DiscoveryError> {
        let mut markers = resolve_markers(&item, &PathBuf::from("src/lib.rs"))?;
        assert_eq!(markers.len(), 1);
        Ok(markers.remove(0))
    }

    #[test]
    fn general_marker_resolves_explicit_type_and_default() {
        let marker = resolve_one(syn::parse_quote! {
            #[auto_register(type = "int", default = "6")]
            pub const TEST_KEY: &str = "test_key";
        })
        .unwrap();

        assert_eq!(marker.entry.key, "test_key");
        assert_eq!(marker.entry.type_tag, TypeTag::Int);
        assert_eq!(marker.entry.default.as_deref(), Some("6"));
        assert_eq!(marker.site.const_name, "TEST_KEY");
    }

    #[test]
    fn shorthand_marker_implies_its_type() {
        let marker = resolve_one(syn::parse_quote! {
            #[auto_register_bool(default = "false")]
            pub const VERBOSE: &str = "log.verbose";
        })
        .unwrap();

        assert_eq!(marker.entry.type_tag, TypeTag::Bool);
        assert_eq!(marker.entry.default.as_deref(), Some("false"));
    }

    #[test]
    fn both_idioms_resolve_to_the_same_entry() {
        let general = resolve_one(syn::parse_quote! {
            #[auto_register(type = "long", default = "10")]
            pub const A: &str = "k.long";
        })
        .unwrap();
        let shorthand = resolve_one(syn::parse_quote! {
            #[auto_register_long(default = "10")]
            pub const B: &str = "k.long";
        })
        .unwrap();

        assert_eq!(general.entry, shorthand.entry);
    }

    #[test]
    fn explicit_key_wins_over_the_literal() {
        let marker = resolve_one(syn::parse_quote! {
            #[auto_register_string(key = "explicit.key", default = "x")]
            pub const WHATEVER: &str = "ignored_value";
        })
        .unwrap();

        assert_eq!(marker.entry.key, "explicit.key");
    }

    #[test]
    fn marker_without_default_registers_none() {
        let marker = resolve_one(syn::parse_quote! {
            #[auto_register_double]
            pub const RATIO: &str = "math.ratio";
        })
        .unwrap();

        assert_eq!(marker.entry.default, None);
        assert_eq!(marker.entry.type_tag, TypeTag::Double);
    }

    #[test]
    fn unsupported_type_is_rejected() {
        let err = resolve_one(syn::parse_quote! {
            #[auto_register(type = "object")]
            pub const K: &str = "k";
        })
        .unwrap_err();

        assert!(matches!(err, DiscoveryError::UnsupportedType { tag, .. } if tag == "object"));
    }

    #[test]
    fn unparseable_default_is_rejected() {
        let err = resolve_one(syn::parse_quote! {
            #[auto_register_int(default = "abc")]
            pub const K: &str = "k";
        })
        .unwrap_err();

        assert!(matches!(err, DiscoveryError::UnparseableDefault { key, .. } if key == "k"));
    }

    #[test]
    fn non_literal_const_without_key_fails() {
        let err = resolve_one(syn::parse_quote! {
            #[auto_register_int(default = "1")]
            pub const K: &str = OTHER_CONST;
        })
        .unwrap_err();

        assert!(matches!(err, DiscoveryError::MissingKey { .. }));
    }

    #[test]
    fn shorthand_rejects_a_type_argument() {
        let err = resolve_one(syn::parse_quote! {
            #[auto_register_int(type = "int")]
            pub const K: &str = "k";
        })
        .unwrap_err();

        assert!(matches!(err, DiscoveryError::InvalidMarker { .. }));
    }

    #[test]
    fn unknown_and_duplicate_arguments_are_rejected() {
        let err = resolve_one(syn::parse_quote! {
            #[auto_register(type = "int", flavor = "spicy")]
            pub const K: &str = "k";
        })
        .unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidMarker { .. }));

        let err = resolve_one(syn::parse_quote! {
            #[auto_register(type = "int", type = "bool")]
            pub const K: &str = "k";
        })
        .unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidMarker { .. }));
    }

    #[test]
    fn unrelated_attributes_are_ignored() {
        let item: ItemConst = syn::parse_quote! {
            #[allow(dead_code)]
            pub const PLAIN: &str = "not_config";
        };
        let markers = resolve_markers(&item, &PathBuf::from("src/lib.rs")).unwrap();
        assert!(markers.is_empty());
    }
}
