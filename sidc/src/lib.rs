//! The `sidc` crate deals with MIL-STD-2525 symbol identification
//! codes: recognising which generation of the standard a code belongs
//! to, reading and writing its affiliation, status and amplifier
//! fields, normalizing it for lookup, and translating it between
//! 2525C, 2525D and 2525E.
//!
//! Nothing here knows how symbols are drawn; see the `symbology`
//! crate for that.

mod amplifier;
mod code;
mod generation;
mod identity;

pub mod normalize;
pub mod prelude;
pub mod table;
pub mod translate;

pub use amplifier::{amplifier, hq_tf_dummy, with_amplifier, with_hq_tf_dummy, Amplifier, HqTfDummy};
pub use code::{c_field, d_field, MalformedCode, SymbolCode};
pub use generation::{Generation, VERSION_2525D, VERSION_2525D_CHANGE_1, VERSION_2525E};
pub use identity::{
    affiliation, is_weather, status, with_affiliation, with_status, Affiliation, Context, Status,
};
