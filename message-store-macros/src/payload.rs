use crate::derive_utils::apply_derives;
use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Item, LitStr, Result, Token, parse::Parse, parse::ParseStream, parse_macro_input};

/// #[payload] 宏实现
/// - 支持结构体（具名、tuple 或单元）与枚举
/// - 合并/追加派生：Debug, Clone, PartialEq, Serialize, Deserialize
/// - 参数：`#[payload(name = "...")]`，默认使用类型名
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as PayloadAttrConfig);
    let mut input = parse_macro_input!(item as Item);

    let required: Vec<syn::Path> = vec![
        syn::parse_quote!(Debug),
        syn::parse_quote!(Clone),
        syn::parse_quote!(PartialEq),
        syn::parse_quote!(serde::Serialize),
        syn::parse_quote!(serde::Deserialize),
    ];

    let (ident, generics) = match &mut input {
        Item::Struct(st) => {
            apply_derives(&mut st.attrs, required);
            (st.ident.clone(), st.generics.clone())
        }
        Item::Enum(en) => {
            apply_derives(&mut en.attrs, required);
            (en.ident.clone(), en.generics.clone())
        }
        other => {
            return syn::Error::new(other.span(), "#[payload] only supports struct or enum")
                .to_compile_error()
                .into();
        }
    };

    if !generics.params.is_empty() {
        return syn::Error::new(generics.span(), "#[payload] does not support generic types")
            .to_compile_error()
            .into();
    }

    let name = cfg
        .name
        .unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));

    TokenStream::from(quote! {
        #input

        impl ::message_store::message::SerializablePayload for #ident {
            const PAYLOAD_TYPE: &'static str = #name;
        }
    })
}

// -------- parsing --------

struct PayloadAttrConfig {
    name: Option<LitStr>,
}

impl Parse for PayloadAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut name: Option<LitStr> = None;
        let pairs: Punctuated<PayloadAttrElem, Token![,]> = Punctuated::parse_terminated(input)?;

        for elem in pairs {
            match elem {
                PayloadAttrElem::Name(lit) => {
                    if name.is_some() {
                        return Err(syn::Error::new(
                            lit.span(),
                            "duplicate key 'name' in attribute",
                        ));
                    }
                    if lit.value().trim().is_empty() {
                        return Err(syn::Error::new(lit.span(), "payload name must not be empty"));
                    }
                    name = Some(lit);
                }
            }
        }
        Ok(Self { name })
    }
}

enum PayloadAttrElem {
    Name(LitStr),
}

impl Parse for PayloadAttrElem {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: syn::Ident = input.parse()?;
        if key == "name" {
            let _eq: Token![=] = input.parse()?;
            let lit: LitStr = input.parse().map_err(|err| {
                syn::Error::new(err.span(), "expected string literal for 'name'")
            })?;
            Ok(Self::Name(lit))
        } else {
            Err(syn::Error::new(
                key.span(),
                "unknown key in attribute; expected 'name'",
            ))
        }
    }
}
