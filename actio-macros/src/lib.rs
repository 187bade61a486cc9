//! Procedural macros for actio.
//!
//! Use them through the `actio` crate; the generated code refers to
//! `::actio` paths.

use proc_macro::TokenStream;

mod interface;

/// Turns a trait into an interceptable callback interface.
///
/// The trait is kept as written. The macro adds:
///
/// - `impl actio::Interface for dyn Trait`, naming the interface and its methods
/// - `impl Trait for actio::Proxy<dyn Trait>`, forwarding every method to the
///   interception object behind the proxy
///
/// Arguments are captured into `MethodArgs` in declaration order; reference
/// arguments are stored as their owned form (`&str` becomes `String`). Return
/// types must implement `Default`: the value is taken from the prepare reply,
/// or defaulted when there is none.
///
/// # Options
///
/// - `name = "..."`: interface name used in logs and errors (defaults to the
///   trait name)
///
/// # Example
///
/// ```rust,ignore
/// #[actio::interface]
/// pub trait Clickable: Send + Sync {
///     fn on_click(&self, x: i32, y: i32) -> bool;
///     fn on_hover(&self, label: &str);
/// }
/// ```
#[proc_macro_attribute]
pub fn interface(attr: TokenStream, item: TokenStream) -> TokenStream {
    interface::interface_impl(attr, item)
}
