//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod convert;

pub(crate) use check::CheckArgs;
pub(crate) use convert::ConvertArgs;
