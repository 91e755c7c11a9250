extern crate proc_macro;

macro_rules! bail {
    ($item:expr, $fmt:literal $($tts:tt)*) => {
        return Err(Error::new_spanned(
            &$item,
            format!(concat!("pairmemo: ", $fmt) $($tts)*)
        ))
    }
}

mod memoize;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_quote, Error, Result};

/// Memoize a pure function.
///
/// Every argument must be hashable and the return type must be
/// `Clone + Send + Sync + 'static`. The function body runs at most once per
/// distinct argument tuple; the results live in a cache private to the
/// function for the rest of the process.
///
/// ```ignore
/// #[memoize]
/// fn sum(a: u32, b: u32) -> u32 {
///     a + b
/// }
/// ```
#[proc_macro_attribute]
pub fn memoize(_: TokenStream, stream: TokenStream) -> TokenStream {
    let func = syn::parse_macro_input!(stream as syn::ItemFn);
    memoize::expand(func)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
