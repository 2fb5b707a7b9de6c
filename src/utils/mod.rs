/*!
# Utilities

Helpers that are not part of the token pipeline itself, currently the
[`Reservoir`] used for uniform sampling from streams of unknown length.
*/

pub mod reservoir;

pub use reservoir::Reservoir;
