//! Field model extraction for the `Bean` / `Record` derives.

use syn::{
    Data, DeriveInput, Fields, GenericArgument, Ident, PathArguments, Type, spanned::Spanned,
};

/// The scalar types the engine knows, as seen in field syntax.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    I16,
    I32,
    I64,
    Decimal,
    Str,
    StrArray,
    Bytes,
    Date,
    DateTime,
}

/// How a field participates in the capability table.
pub enum FieldShape {
    /// `Option<S>`
    Scalar(ScalarKind),
    /// `Option<N>` for a derived node type
    Node(Type),
    /// `Vec<Option<S>>`
    ScalarList(ScalarKind),
    /// `Vec<Option<N>>`
    NodeList(Type),
}

/// One parsed field.
pub struct FieldModel {
    pub ident: Ident,
    pub name: String,
    pub shape: FieldShape,
    pub date_pattern: Option<String>,
    pub number_pattern: Option<String>,
}

/// The parsed derive input.
pub struct TypeModel {
    pub ident: Ident,
    pub fields: Vec<FieldModel>,
}

pub fn parse(input: &DeriveInput) -> syn::Result<TypeModel> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "generic types are not supported",
        ));
    }
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(
            input.ident.span(),
            "only structs can derive Bean or Record",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new(
            input.ident.span(),
            "only structs with named fields can derive Bean or Record",
        ));
    };

    let mut fields = Vec::with_capacity(named.named.len());
    for field in &named.named {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new(field.span(), "named field required"))?;
        let shape = classify(&field.ty).ok_or_else(|| {
            syn::Error::new(
                field.ty.span(),
                "field must be Option<scalar>, Option<node> or Vec<Option<element>>",
            )
        })?;

        let mut date_pattern = None;
        let mut number_pattern = None;
        for attr in &field.attrs {
            if !attr.path().is_ident("graft") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("date_pattern") {
                    let lit: syn::LitStr = meta.value()?.parse()?;
                    date_pattern = Some(lit.value());
                    Ok(())
                } else if meta.path.is_ident("number_pattern") {
                    let lit: syn::LitStr = meta.value()?.parse()?;
                    number_pattern = Some(lit.value());
                    Ok(())
                } else {
                    Err(meta.error("expected date_pattern or number_pattern"))
                }
            })?;
        }

        fields.push(FieldModel {
            name: ident.to_string(),
            ident,
            shape,
            date_pattern,
            number_pattern,
        });
    }

    Ok(TypeModel {
        ident: input.ident.clone(),
        fields,
    })
}

/// The single generic argument of `wrapper<...>`, if `ty` has that shape.
fn generic_arg<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(tp) = ty else { return None };
    if tp.qself.is_some() {
        return None;
    }
    let seg = tp.path.segments.last()?;
    if seg.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &seg.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

fn plain_ident(ty: &Type) -> Option<String> {
    let Type::Path(tp) = ty else { return None };
    if tp.qself.is_some() {
        return None;
    }
    let seg = tp.path.segments.last()?;
    if !seg.arguments.is_empty() {
        return None;
    }
    Some(seg.ident.to_string())
}

fn scalar_kind(ty: &Type) -> Option<ScalarKind> {
    if let Some(inner) = generic_arg(ty, "Vec") {
        return match plain_ident(inner)?.as_str() {
            "String" => Some(ScalarKind::StrArray),
            "u8" => Some(ScalarKind::Bytes),
            _ => None,
        };
    }
    match plain_ident(ty)?.as_str() {
        "bool" => Some(ScalarKind::Bool),
        "i16" => Some(ScalarKind::I16),
        "i32" => Some(ScalarKind::I32),
        "i64" => Some(ScalarKind::I64),
        "Decimal" => Some(ScalarKind::Decimal),
        "String" => Some(ScalarKind::Str),
        "NaiveDate" => Some(ScalarKind::Date),
        "NaiveDateTime" => Some(ScalarKind::DateTime),
        _ => None,
    }
}

fn classify(ty: &Type) -> Option<FieldShape> {
    if let Some(inner) = generic_arg(ty, "Option") {
        if let Some(kind) = scalar_kind(inner) {
            return Some(FieldShape::Scalar(kind));
        }
        // Vec inside Option that is not a known scalar is not a node type
        if generic_arg(inner, "Vec").is_some() {
            return None;
        }
        return Some(FieldShape::Node(inner.clone()));
    }
    if let Some(inner) = generic_arg(ty, "Vec") {
        let element = generic_arg(inner, "Option")?;
        if let Some(kind) = scalar_kind(element) {
            return Some(FieldShape::ScalarList(kind));
        }
        if generic_arg(element, "Vec").is_some() {
            return None;
        }
        return Some(FieldShape::NodeList(element.clone()));
    }
    None
}
