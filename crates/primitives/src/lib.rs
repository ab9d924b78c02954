//! Core value types shared by the registry and the dispatcher.

/// Fixed-width backend and caller handles.
pub mod address;
/// Call envelope routed through the dispatcher.
pub mod invocation;
/// Hex parsing shared by the fixed-width types.
pub mod parse;
/// Fixed-width operation identifiers.
pub mod selector;

pub use address::Address;
pub use invocation::Invocation;
pub use parse::ParseError;
pub use selector::Selector;
