use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Data, DeriveInput, Error, Field, Fields, Ident, Index, Lit, LitStr, Member, Result, Token, Type,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
};

pub(crate) fn expand_record(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new_spanned(
            input,
            "`Record` may only be derived on structs.",
        ))?
    };

    let fields: Vec<&Field> = match &data.fields {
        Fields::Named(fields) => fields.named.iter().collect(),
        Fields::Unnamed(fields) => fields.unnamed.iter().collect(),
        Fields::Unit => Vec::new(),
    };

    let fields = fields
        .into_iter()
        .enumerate()
        .map(|(i, field)| FieldMetadata::parse(i, field))
        .collect::<Result<Vec<_>>>()?;

    let name = &input.ident;
    let record = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let descriptors = fields.iter().map(FieldMetadata::descriptor);
    let layout = quote! {
        ::bytelayout::RecordLayout {
            name: #record,
            fields: &[#(#descriptors),*],
        }
    };

    let cases = fields
        .iter()
        .enumerate()
        .filter_map(|(index, field)| field.target(index, &record));

    let expanded = quote! {
        impl #impl_generics ::bytelayout::Shape for #name #ty_generics #where_clause {
            const DESCRIPTOR: ::bytelayout::TypeDescriptor =
                ::bytelayout::TypeDescriptor::Record(&#layout);
        }

        impl #impl_generics ::bytelayout::Decode for #name #ty_generics #where_clause {
            fn descriptor(&self) -> ::bytelayout::TypeDescriptor {
                <Self as ::bytelayout::Shape>::DESCRIPTOR
            }

            fn target(&mut self) -> ::bytelayout::Target<'_> {
                ::bytelayout::Target::Record(self)
            }
        }

        impl #impl_generics ::bytelayout::Record for #name #ty_generics #where_clause {
            fn layout(&self) -> &'static ::bytelayout::RecordLayout {
                const { &#layout }
            }

            fn field(
                &mut self,
                index: usize,
            ) -> ::core::result::Result<::bytelayout::FieldTarget<'_>, ::bytelayout::Error> {
                ::core::result::Result::Ok(match index {
                    #(#cases)*
                    _ => ::bytelayout::FieldTarget::Absent,
                })
            }
        }
    };

    Ok(expanded.into())
}

#[derive(Debug)]
struct FieldMetadata {
    member: Member,
    name: String,
    ty: Type,
    kind: FieldKind,
}

#[derive(Debug)]
enum FieldKind {
    Value,
    Padding,
    Ignored,
    Text(Option<usize>),
    Hook { encode: String, decode: Ident },
}

impl FieldMetadata {
    fn parse(i: usize, field: &Field) -> Result<Self> {
        let member = match &field.ident {
            Some(ident) => Member::Named(ident.clone()),
            None => Member::Unnamed(Index::from(i)),
        };

        let name = match &member {
            Member::Named(ident) => ident.to_string(),
            Member::Unnamed(index) => index.index.to_string(),
        };

        let mut attribute = FieldAttribute::default();
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("layout")) {
            attribute.merge(attr.parse_args()?);
        }

        let is_text = is_string(&field.ty);

        let modes = [attribute.ignore, attribute.padding, attribute.hook.is_some()];
        if modes.iter().filter(|m| **m).count() > 1 {
            Err(Error::new_spanned(
                field,
                "Only one of `ignore`, `padding` and `hook` may be applied to a field.",
            ))?
        }

        if let Some(span) = attribute.length_span {
            if !is_text || attribute.ignore || attribute.hook.is_some() {
                Err(Error::new(
                    span,
                    "`length` applies only to decoded `String` fields.",
                ))?
            }
        }

        let kind = if attribute.ignore {
            FieldKind::Ignored
        } else if attribute.padding {
            FieldKind::Padding
        } else if let Some(hook) = attribute.hook {
            parse_hook(&hook)?
        } else if is_text {
            FieldKind::Text(attribute.length)
        } else {
            FieldKind::Value
        };

        Ok(Self {
            member,
            name,
            ty: field.ty.clone(),
            kind,
        })
    }

    fn descriptor(&self) -> TokenStream2 {
        let Self { name, ty, kind, .. } = self;

        let kind = match kind {
            FieldKind::Value => quote! {
                ::bytelayout::FieldKind::Value(<#ty as ::bytelayout::Shape>::DESCRIPTOR)
            },
            FieldKind::Padding => quote! {
                ::bytelayout::FieldKind::Padding(<#ty as ::bytelayout::Shape>::DESCRIPTOR)
            },
            FieldKind::Ignored => quote! { ::bytelayout::FieldKind::Ignored },
            FieldKind::Text(Some(length)) => quote! {
                ::bytelayout::FieldKind::Text { length: ::core::option::Option::Some(#length) }
            },
            FieldKind::Text(None) => quote! {
                ::bytelayout::FieldKind::Text { length: ::core::option::Option::None }
            },
            FieldKind::Hook { encode, decode } => {
                let decode = decode.to_string();
                quote! {
                    ::bytelayout::FieldKind::Hook { encode: #encode, decode: #decode }
                }
            }
        };

        quote! {
            ::bytelayout::FieldDescriptor { name: #name, kind: #kind }
        }
    }

    /// Match arm handing out this field, if the decoder ever requests it.
    fn target(&self, index: usize, record: &str) -> Option<TokenStream2> {
        let member = &self.member;

        let target = match &self.kind {
            FieldKind::Value => quote! {
                ::bytelayout::FieldTarget::Value(&mut self.#member)
            },
            FieldKind::Text(_) => quote! {
                ::bytelayout::FieldTarget::Text(&mut self.#member)
            },
            FieldKind::Hook { decode, .. } => {
                let method = decode.to_string();
                quote! {
                    return ::bytelayout::hook::bind(self, Self::#decode, #record, #method)
                }
            }
            FieldKind::Padding | FieldKind::Ignored => return None,
        };

        Some(quote! { #index => #target, })
    }
}

fn is_string(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };

    path.qself.is_none()
        && path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "String" && segment.arguments.is_none())
}

fn parse_hook(hook: &LitStr) -> Result<FieldKind> {
    let value = hook.value();
    let names: Vec<&str> = value.split(',').map(str::trim).collect();

    let [encode, decode, ..] = names.as_slice() else {
        Err(Error::new_spanned(
            hook,
            "Specify two method names separated by a comma in `hook`.",
        ))?
    };

    let decode = syn::parse_str::<Ident>(decode)
        .map_err(|_| Error::new_spanned(hook, format!("`{decode}` is not a method name.")))?;

    Ok(FieldKind::Hook {
        encode: encode.to_string(),
        decode,
    })
}

#[derive(Debug, Default)]
struct FieldAttribute {
    ignore: bool,
    padding: bool,
    length: Option<usize>,
    length_span: Option<proc_macro2::Span>,
    hook: Option<LitStr>,
}

impl FieldAttribute {
    fn merge(&mut self, other: Self) {
        self.ignore |= other.ignore;
        self.padding |= other.padding;
        if other.length_span.is_some() {
            self.length = other.length;
            self.length_span = other.length_span;
        }
        if other.hook.is_some() {
            self.hook = other.hook;
        }
    }
}

/// A single `key` or `key = literal` entry of a `layout` attribute.
struct Entry {
    key: Ident,
    value: Option<Lit>,
}

impl Parse for Entry {
    fn parse(input: ParseStream) -> Result<Self> {
        let key = input.parse::<Ident>()?;

        let value = if input.peek(Token![=]) {
            input.parse::<Token![=]>()?;
            Some(input.parse::<Lit>()?)
        } else {
            None
        };

        Ok(Self { key, value })
    }
}

impl Parse for FieldAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attribute = Self::default();

        for Entry { key, value } in Punctuated::<Entry, Token![,]>::parse_terminated(input)? {
            if key == "ignore" {
                attribute.ignore = match value {
                    None => true,
                    Some(Lit::Bool(b)) => b.value,
                    // Unparsable strings leave the field decoded.
                    Some(Lit::Str(s)) => s.value().trim().parse().unwrap_or(false),
                    Some(other) => Err(Error::new_spanned(
                        other,
                        "`ignore` takes a boolean or a boolean string.",
                    ))?,
                };
            } else if key == "padding" {
                if let Some(value) = value {
                    Err(Error::new_spanned(value, "`padding` takes no value."))?
                }
                attribute.padding = true;
            } else if key == "length" {
                attribute.length = match &value {
                    Some(Lit::Int(n)) => Some(n.base10_parse::<usize>()?),
                    // Checked when decoding, as a missing length.
                    Some(Lit::Str(s)) => s.value().trim().parse().ok(),
                    _ => Err(Error::new(
                        key.span(),
                        "`length` takes an integer or an integer string.",
                    ))?,
                };
                attribute.length_span = Some(key.span());
            } else if key == "hook" {
                let Some(Lit::Str(hook)) = value else {
                    Err(Error::new(
                        key.span(),
                        "`hook` takes a string of two comma-separated method names.",
                    ))?
                };
                attribute.hook = Some(hook);
            } else {
                Err(Error::new(
                    key.span(),
                    format!("Unknown `layout` attribute `{key}`."),
                ))?
            }
        }

        Ok(attribute)
    }
}
