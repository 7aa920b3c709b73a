pub mod backend;
pub mod error;
pub mod flag;
pub mod input;
pub mod invocation;
pub mod symbol;
pub mod triple;

pub use backend::Backend;
pub use error::LinkError;
pub use flag::Flag;
pub use input::{Input, LibKind, LibRef, ResolvedLib};
pub use invocation::{Invocation, LinkMode};
pub use symbol::{Symbol, SymbolKind, SymbolScope};
pub use triple::{Arch, EnvAbi, Os, Triple};
