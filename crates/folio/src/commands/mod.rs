//! CLI command implementations.

pub(crate) mod bills;
pub(crate) mod render;

pub(crate) use bills::BillsArgs;
pub(crate) use render::RenderArgs;
