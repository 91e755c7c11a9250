use super::*;

/// Memoize a function.
pub fn expand(mut func: syn::ItemFn) -> Result<proc_macro2::TokenStream> {
    if let Some(param) = func
        .sig
        .generics
        .params
        .iter()
        .find(|param| !matches!(param, syn::GenericParam::Lifetime(_)))
    {
        bail!(param, "generic functions are not supported")
    }

    if let Some(asyncness) = &func.sig.asyncness {
        bail!(asyncness, "async functions are not supported")
    }

    let mut args = vec![];
    let mut types = vec![];
    for input in &func.sig.inputs {
        let typed = match input {
            syn::FnArg::Typed(typed) => typed,
            syn::FnArg::Receiver(_) => {
                bail!(input, "methods are not supported")
            }
        };

        let name = match typed.pat.as_ref() {
            syn::Pat::Ident(syn::PatIdent {
                by_ref: None,
                mutability: None,
                ident,
                subpat: None,
                ..
            }) => ident,
            pat => bail!(pat, "only simple identifiers are supported"),
        };

        let ty = typed.ty.as_ref();
        args.push(name);
        types.push(ty);
    }

    let output: syn::Type = match &func.sig.output {
        syn::ReturnType::Default => parse_quote! { () },
        syn::ReturnType::Type(_, ty) => match ty.as_ref() {
            syn::Type::ImplTrait(_) => {
                bail!(ty, "`impl Trait` return types are not supported")
            }
            ty => ty.clone(),
        },
    };

    // Construct a tuple from all arguments.
    let arg_tuple = quote! { (#(#args,)*) };

    // Construct assertions that the arguments fulfill the necessary bounds.
    let bounds = types.iter().map(|ty| {
        quote! {
            ::pairmemo::internal::assert_hashable::<#ty>();
        }
    });

    // Construct the inner closure.
    let body = &func.block;
    let closure = quote! { |#arg_tuple| #body };

    // Adjust the function's body.
    let name = func.sig.ident.to_string();
    func.block = parse_quote! { {
        static __CACHE: ::pairmemo::internal::FnCache<#output> =
            ::pairmemo::internal::FnCache::new();
        #(#bounds)*
        ::pairmemo::internal::memoized(&__CACHE, #name, #arg_tuple, #closure)
    } };

    Ok(quote! { #func })
}
