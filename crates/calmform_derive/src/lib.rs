use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::parse::Parse;
use syn::{
    Data, DeriveInput, Expr, ExprLit, ExprUnary, Field, Fields, GenericArgument, Lit, LitStr,
    PathArguments, Token, Type, UnOp, parenthesized, parse_macro_input,
};

#[proc_macro_derive(FormSchema, attributes(form))]
pub fn derive_form_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            input.ident,
            "FormSchema derive currently supports only non-generic structs",
        ));
    }

    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "FormSchema derive requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "FormSchema derive is only supported on structs",
            ));
        }
    };

    let calmform = calmform_path();
    let model_ident = input.ident;
    let mut entries = Vec::new();

    for field in named_fields {
        let Some(field_ident) = field.ident.clone() else {
            continue;
        };
        let attrs = FieldAttrs::parse(&field)?;
        if attrs.skip {
            continue;
        }
        let key = attrs
            .rename
            .clone()
            .unwrap_or_else(|| LitStr::new(&field_ident.to_string(), field_ident.span()));
        let node = schema_for(&calmform, &field.ty, &attrs)?;
        let node = match attrs.meta_tokens(&calmform) {
            Some(meta) => quote!(#node.register(registry, #meta)),
            None => node,
        };
        entries.push(quote! {
            fields.push((#key, #node));
        });
    }

    Ok(quote! {
        impl #calmform::schema::FormSchema for #model_ident {
            fn form_schema(
                registry: &mut #calmform::meta::MetadataRegistry,
            ) -> #calmform::schema::Schema {
                let _ = &registry;
                let mut fields: ::std::vec::Vec<(&'static str, #calmform::schema::Schema)> =
                    ::std::vec::Vec::new();
                #(#entries)*
                #calmform::schema::z::object(fields)
            }
        }
    })
}

#[derive(Default)]
struct FieldAttrs {
    rename: Option<LitStr>,
    skip: bool,
    label: Option<LitStr>,
    placeholder: Option<LitStr>,
    description: Option<LitStr>,
    kind: Option<LitStr>,
    half_width: bool,
    with_controls: bool,
    options: Vec<LitStr>,
    min_length: Option<Expr>,
    max_length: Option<Expr>,
    min: Option<Expr>,
    max: Option<Expr>,
    gt: Option<Expr>,
    lt: Option<Expr>,
    step: Option<Expr>,
    email: bool,
    url: bool,
    uuid: bool,
    mime: Vec<LitStr>,
    min_size: Option<Expr>,
    max_size: Option<Expr>,
}

impl FieldAttrs {
    fn parse(field: &Field) -> syn::Result<Self> {
        let mut attrs = Self::default();
        for attr in &field.attrs {
            if !attr.path().is_ident("form") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                let path = &meta.path;
                if path.is_ident("rename") {
                    attrs.rename = Some(meta.value()?.parse()?);
                } else if path.is_ident("skip") {
                    attrs.skip = true;
                } else if path.is_ident("label") {
                    attrs.label = Some(meta.value()?.parse()?);
                } else if path.is_ident("placeholder") {
                    attrs.placeholder = Some(meta.value()?.parse()?);
                } else if path.is_ident("description") {
                    attrs.description = Some(meta.value()?.parse()?);
                } else if path.is_ident("kind") {
                    attrs.kind = Some(meta.value()?.parse()?);
                } else if path.is_ident("half_width") {
                    attrs.half_width = true;
                } else if path.is_ident("with_controls") {
                    attrs.with_controls = true;
                } else if path.is_ident("options") {
                    attrs.options.extend(literal_list(&meta)?);
                } else if path.is_ident("min_length") {
                    attrs.min_length = Some(integer(meta.value()?.parse()?)?);
                } else if path.is_ident("max_length") {
                    attrs.max_length = Some(integer(meta.value()?.parse()?)?);
                } else if path.is_ident("min") {
                    attrs.min = Some(integer(meta.value()?.parse()?)?);
                } else if path.is_ident("max") {
                    attrs.max = Some(integer(meta.value()?.parse()?)?);
                } else if path.is_ident("gt") {
                    attrs.gt = Some(integer(meta.value()?.parse()?)?);
                } else if path.is_ident("lt") {
                    attrs.lt = Some(integer(meta.value()?.parse()?)?);
                } else if path.is_ident("step") {
                    attrs.step = Some(integer(meta.value()?.parse()?)?);
                } else if path.is_ident("email") {
                    attrs.email = true;
                } else if path.is_ident("url") {
                    attrs.url = true;
                } else if path.is_ident("uuid") {
                    attrs.uuid = true;
                } else if path.is_ident("min_size") {
                    attrs.min_size = Some(integer(meta.value()?.parse()?)?);
                } else if path.is_ident("max_size") {
                    attrs.max_size = Some(integer(meta.value()?.parse()?)?);
                } else if path.is_ident("mime") {
                    attrs.mime.extend(literal_list(&meta)?);
                } else {
                    return Err(meta.error("unsupported form attribute"));
                }
                Ok(())
            })?;
        }
        Ok(attrs)
    }

    fn meta_tokens(&self, calmform: &TokenStream2) -> Option<TokenStream2> {
        let mut calls = Vec::new();
        if let Some(label) = &self.label {
            calls.push(quote!(.label(#label)));
        }
        if let Some(placeholder) = &self.placeholder {
            calls.push(quote!(.placeholder(#placeholder)));
        }
        if let Some(description) = &self.description {
            calls.push(quote!(.description(#description)));
        }
        if let Some(kind) = &self.kind {
            calls.push(quote!(.field_type(#calmform::resolve::FieldType::from_name(#kind))));
        }
        if self.half_width {
            calls.push(quote!(.half_width(true)));
        }
        if self.with_controls {
            calls.push(quote!(.with_controls(true)));
        }
        if let Some(step) = &self.step {
            calls.push(quote!(.step((#step) as i64)));
        }
        if calls.is_empty() {
            return None;
        }
        Some(quote!(#calmform::meta::FieldMeta::new() #(#calls)*))
    }

    fn value_checks(&self) -> TokenStream2 {
        let mut calls = Vec::new();
        if self.email {
            calls.push(quote!(.email()));
        }
        if self.url {
            calls.push(quote!(.url()));
        }
        if self.uuid {
            calls.push(quote!(.uuid()));
        }
        if let Some(min) = &self.min {
            calls.push(quote!(.gte((#min) as i64)));
        }
        if let Some(max) = &self.max {
            calls.push(quote!(.lte((#max) as i64)));
        }
        if let Some(gt) = &self.gt {
            calls.push(quote!(.gt((#gt) as i64)));
        }
        if let Some(lt) = &self.lt {
            calls.push(quote!(.lt((#lt) as i64)));
        }
        if !self.mime.is_empty() {
            let mime = &self.mime;
            calls.push(quote!(.mime([#(#mime),*])));
        }
        if let Some(min_size) = &self.min_size {
            calls.push(quote!(.min_size((#min_size) as u64)));
        }
        if let Some(max_size) = &self.max_size {
            calls.push(quote!(.max_size((#max_size) as u64)));
        }
        quote!(#(#calls)*)
    }

    fn length_checks(&self) -> TokenStream2 {
        let mut calls = Vec::new();
        if let Some(min_length) = &self.min_length {
            calls.push(quote!(.min_length((#min_length) as usize)));
        }
        if let Some(max_length) = &self.max_length {
            calls.push(quote!(.max_length((#max_length) as usize)));
        }
        quote!(#(#calls)*)
    }
}

/// `options("free", "pro")` style lists of string literals.
fn literal_list(meta: &ParseNestedMeta) -> syn::Result<Vec<LitStr>> {
    let content;
    parenthesized!(content in meta.input);
    let values = content.parse_terminated(<LitStr as Parse>::parse, Token![,])?;
    Ok(values.into_iter().collect())
}

/// Integer literals only; `-` is allowed for bounds.
fn integer(expr: Expr) -> syn::Result<Expr> {
    let is_int = |expr: &Expr| {
        matches!(
            expr,
            Expr::Lit(ExprLit {
                lit: Lit::Int(_),
                ..
            })
        )
    };
    let valid = match &expr {
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr: inner,
            ..
        }) => is_int(inner),
        other => is_int(other),
    };
    if valid {
        Ok(expr)
    } else {
        Err(syn::Error::new_spanned(expr, "expected an integer literal"))
    }
}

/// Schema builder for a field type. `Option` wraps as optional, `Vec` as an
/// array whose element carries the value checks while lengths stay on the array.
fn schema_for(calmform: &TokenStream2, ty: &Type, attrs: &FieldAttrs) -> syn::Result<TokenStream2> {
    if let Some(inner) = generic_argument(ty, "Option") {
        let inner = schema_for(calmform, inner, attrs)?;
        return Ok(quote!(#inner.optional()));
    }
    if let Some(element) = generic_argument(ty, "Vec") {
        let element = scalar_schema(calmform, element, attrs)?;
        let values = attrs.value_checks();
        let lengths = attrs.length_checks();
        return Ok(quote!(#calmform::schema::z::array(#element #values) #lengths));
    }
    let scalar = scalar_schema(calmform, ty, attrs)?;
    let values = attrs.value_checks();
    let lengths = attrs.length_checks();
    Ok(quote!(#scalar #values #lengths))
}

fn scalar_schema(calmform: &TokenStream2, ty: &Type, attrs: &FieldAttrs) -> syn::Result<TokenStream2> {
    let Some(name) = last_segment(ty) else {
        return Err(syn::Error::new_spanned(ty, "unsupported field type for FormSchema"));
    };
    let z = quote!(#calmform::schema::z);
    let tokens = match name.to_string().as_str() {
        "String" | "SharedString" if !attrs.options.is_empty() => {
            let options = &attrs.options;
            quote!(#z::enumeration([#(#options),*]))
        }
        "String" | "SharedString" => quote!(#z::string()),
        "bool" => quote!(#z::boolean()),
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
        | "u128" | "usize" => quote!(#z::number().int()),
        "f32" | "f64" | "Decimal" => quote!(#z::number()),
        "NaiveDate" => quote!(#z::date()),
        "FileValue" => quote!(#z::file()),
        _ => {
            return Err(syn::Error::new_spanned(
                ty,
                "unsupported field type for FormSchema; expected a string, bool, number, date or file",
            ));
        }
    };
    Ok(tokens)
}

fn last_segment(ty: &Type) -> Option<&Ident> {
    match ty {
        Type::Path(path) if path.qself.is_none() => {
            path.path.segments.last().map(|segment| &segment.ident)
        }
        _ => None,
    }
}

fn generic_argument<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };
    arguments.args.iter().find_map(|argument| match argument {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}

fn calmform_path() -> TokenStream2 {
    match crate_name("calmform") {
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Ok(FoundCrate::Itself) => quote!(crate),
        Err(_) => quote!(::calmform),
    }
}
