//! Resolver decorator macros for `armature-graphql`.
//!
//! `#[resolver]` turns an annotated inherent `impl` block into an
//! implementation of `armature_graphql::Resolver`.
//!
//! # Method attributes
//!
//! - `#[query]`, `#[query(name = "...")]`
//! - `#[mutation]`, `#[mutation(name = "...")]`
//! - `#[subscription]`, `#[subscription(name = "...", filter = expr)]`
//! - `#[field(type = "User")]`, `#[field(type = User, name = "...")]`
//!
//! A return type spelled `Result<..>` is treated as fallible; any other
//! return value is serialized as is. Methods returning a `Result` alias such
//! as `ResolveResult` take the `result` flag: `#[query(result)]`,
//! `#[mutation(name = "...", result)]`, `#[field(type = "User", result)]`.
//!
//! # Parameter attributes
//!
//! - `#[parent]`, `#[info]`
//! - `#[args]`, `#[args("key")]`
//! - `#[ctx]`, `#[ctx("key")]`
//!
//! Parameters are converted from JSON with `serde`; unbound parameters
//! receive `null`, so they should be `Option`s.
//!
//! ```rust,ignore
//! #[resolver]
//! impl UserResolver {
//!     #[query(name = "user")]
//!     async fn find(&self, #[args("id")] id: String) -> Result<User, ResolverError> {
//!         self.users.find(&id).await
//!     }
//!
//!     #[subscription(filter = same_room)]
//!     fn messages(&self) -> EventStream {
//!         self.events.stream()
//!     }
//! }
//! ```

use proc_macro::TokenStream;

mod attrs;
mod resolver_impl;

/// Generate the `Resolver` implementation of an annotated impl block.
///
/// Accepts `#[resolver(crate = path)]` when `armature_graphql` is reached
/// through a re-export.
#[proc_macro_attribute]
pub fn resolver(attr: TokenStream, item: TokenStream) -> TokenStream {
    resolver_impl::resolver_impl(attr, item)
}
