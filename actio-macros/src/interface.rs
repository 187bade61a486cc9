//! The `#[interface]` attribute.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::{
    FnArg, Ident, ItemTrait, LitStr, Pat, PatIdent, PatType, ReturnType, Signature, Token,
    TraitItem, TraitItemFn, Type,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// Arguments for the `#[interface]` macro.
pub(crate) struct InterfaceArgs {
    pub name: Option<String>,
}

impl Parse for InterfaceArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut name = None;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "name" => {
                    let lit: LitStr = input.parse()?;
                    name = Some(lit.value());
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(InterfaceArgs { name })
    }
}

/// Implementation of the `#[interface]` attribute macro.
pub fn interface_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as InterfaceArgs);
    let input = parse_macro_input!(item as ItemTrait);

    match expand(&args, &input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(args: &InterfaceArgs, input: &ItemTrait) -> syn::Result<proc_macro2::TokenStream> {
    if !input.generics.params.is_empty() || input.generics.where_clause.is_some() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "interface traits cannot be generic",
        ));
    }

    let trait_name = &input.ident;
    let interface_name = args
        .name
        .clone()
        .unwrap_or_else(|| trait_name.to_string());
    let interface_name = LitStr::new(&interface_name, trait_name.span());

    let mut method_names = Vec::new();
    let mut forwarders = Vec::new();
    for item in &input.items {
        match item {
            TraitItem::Fn(method) => {
                method_names.push(LitStr::new(
                    &method.sig.ident.to_string(),
                    method.sig.ident.span(),
                ));
                forwarders.push(forwarder(method)?);
            }
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "interface traits may only contain methods",
                ));
            }
        }
    }

    Ok(quote! {
        #input

        impl ::actio::Interface for dyn #trait_name {
            const NAME: &'static str = #interface_name;
            const METHODS: &'static [&'static str] = &[#(#method_names),*];
        }

        impl #trait_name for ::actio::Proxy<dyn #trait_name> {
            #(#forwarders)*
        }
    })
}

/// Builds the proxy body of one trait method.
fn forwarder(method: &TraitItemFn) -> syn::Result<proc_macro2::TokenStream> {
    let sig = &method.sig;
    check_signature(sig)?;

    let mut forwarded = sig.clone();
    let mut captures = Vec::new();
    for (index, input) in forwarded.inputs.iter_mut().enumerate() {
        let FnArg::Typed(PatType { pat, ty, .. }) = input else {
            continue;
        };
        let arg = format_ident!("__arg{}", index);
        **pat = Pat::Ident(PatIdent {
            attrs: Vec::new(),
            by_ref: None,
            mutability: None,
            ident: arg.clone(),
            subpat: None,
        });
        captures.push(match &**ty {
            Type::Reference(_) => quote! {
                __args.push(::std::borrow::ToOwned::to_owned(#arg));
            },
            _ => quote! {
                __args.push(#arg);
            },
        });
    }

    let capacity = captures.len();
    let method_name = LitStr::new(&sig.ident.to_string(), sig.ident.span());
    let output = match &sig.output {
        ReturnType::Default => quote! { () },
        ReturnType::Type(_, ty) => quote! { #ty },
    };

    Ok(quote! {
        #[allow(unused_mut)]
        #forwarded {
            let mut __args = ::actio::MethodArgs::with_capacity(#capacity);
            #(#captures)*
            self.call_or_default::<#output>(#method_name, __args)
        }
    })
}

fn check_signature(sig: &Signature) -> syn::Result<()> {
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "interface methods cannot be async",
        ));
    }
    if let Some(unsafety) = &sig.unsafety {
        return Err(syn::Error::new_spanned(
            unsafety,
            "interface methods cannot be unsafe",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "interface methods cannot be generic",
        ));
    }

    match sig.inputs.first() {
        Some(FnArg::Receiver(receiver))
            if receiver.reference.is_some() && receiver.mutability.is_none() =>
        {
            Ok(())
        }
        Some(other) => Err(syn::Error::new_spanned(
            other,
            "interface methods must take `&self`",
        )),
        None => Err(syn::Error::new(
            Span::call_site(),
            format!("interface method `{}` must take `&self`", sig.ident),
        )),
    }
}
