//! Triggers a GitHub Actions workflow through `workflow_dispatch` and finds the run it created.
//!
//! The GitHub REST API does not return a run id when dispatching, so the run is discovered by
//! listing the latest runs of the workflow after a grace period and matching them by workflow,
//! branch and creation time.
//!
//! See: [`dispatch::run`]

pub mod dispatch;
pub mod env;
pub mod error;
pub mod report;
pub mod workflow;

/// A shorthand to define a statically allocated variable using a [`std::sync::LazyLock`].
///
/// # Examples
///
/// ```rust
/// # use std::sync::LazyLock;
/// # use workflow_dispatch::static_lazy_lock;
/// static_lazy_lock! {
///     pub VAR_1: String = String::from("a static variable");
/// }
/// // ...equals to...
/// pub static VAR_2: LazyLock<String> = LazyLock::new(|| String::from("a static variable"));
/// ```
#[macro_export]
macro_rules! static_lazy_lock {
    ($(#[$meta:meta])* $vis:vis $name:ident: $type:ty = $expr:expr $(;)?) => {
        $(#[$meta])*
        $vis static $name: $crate::__priv_macro_use::LazyLock<$type> =
            $crate::__priv_macro_use::LazyLock::new(|| $expr);
    };
}

#[doc(hidden)]
pub mod __priv_macro_use {
    pub use std::sync::LazyLock;
}
