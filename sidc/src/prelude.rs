pub use super::normalize::{basic_code, normalize, validate};
pub use super::table::{CodePairTable, TableError};
pub use super::translate::{CodeTranslator, Reduction, Translation};
pub use super::{Affiliation, Amplifier, Generation, HqTfDummy, MalformedCode, Status, SymbolCode};
