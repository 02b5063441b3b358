//! Stencil cells: which layer owns a terrain cell, and how strongly.

mod claim;
mod codec;

pub use claim::claim_stencil;
pub use codec::{STENCIL_WINDOW, StencilValue};
