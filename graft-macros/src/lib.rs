//! Derive macros for the graft mapping engine.
//!
//! Both derives generate a `TypeDescriptor` capability table (built lazily on
//! first access) plus the `Graft` and `Node` trait implementations.
//!
//! # Accepted field shapes
//!
//! - `Option<S>` where `S` is one of the scalar types (`bool`, `i16`, `i32`,
//!   `i64`, `Decimal`, `String`, `Vec<String>`, `Vec<u8>`, `NaiveDate`,
//!   `NaiveDateTime`)
//! - `Option<N>` where `N` derives `Bean` or `Record`
//! - `Vec<Option<E>>` with `E` a scalar or derived node type
//!
//! Any other field shape is rejected at compile time.
//!
//! # Field attributes
//!
//! - `#[graft(date_pattern = "...")]` — declarative date format pattern
//! - `#[graft(number_pattern = "...")]` — declarative number format pattern

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod emit;
mod parse;

/// Derive a mutable node: per-field accessor pairs and a no-argument
/// constructor. Requires `Default + Clone + Debug`.
///
/// ```ignore
/// use graft::Bean;
///
/// #[derive(Bean, Clone, Debug, Default)]
/// struct User {
///     name: Option<String>,
///     age: Option<i32>,
/// }
/// ```
#[proc_macro_derive(Bean, attributes(graft))]
pub fn derive_bean(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match emit::expand(&input, emit::Kind::Bean) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Derive an immutable node: readers plus an all-arguments constructor that
/// the engine invokes exactly once, bottom-up. Requires `Clone + Debug`.
///
/// ```ignore
/// use graft::Record;
///
/// #[derive(Record, Clone, Debug)]
/// struct Address {
///     city: Option<String>,
///     zip: Option<String>,
/// }
/// ```
#[proc_macro_derive(Record, attributes(graft))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match emit::expand(&input, emit::Kind::Record) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
