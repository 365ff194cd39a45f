//! Load records, load combinations and the load vector assembler

mod assembler;
mod load_combo;
mod node_load;
mod resultant;

pub use assembler::{ElementaryLoad, LoadAssembler};
pub use load_combo::LoadCombination;
pub use node_load::LoadRecord;
pub use resultant::LoadResultant;
