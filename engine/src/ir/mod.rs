//! Intermediate representation: basic blocks of instructions over typed,
//! shared values, built from the AST in two phases so that a call to a
//! file-level function that hasn't been built yet can still resolve.
//!
//! Grounded on `services::unified_ast_engine`'s two-pass "register members,
//! then lower bodies" shape. The `Rc<RefCell<_>>` shared-node style for
//! `FunctionRef`/`FileRef` follows `dotandev-inference`'s
//! `symbol_table::ScopeRef` scope tree; the `Weak` back-reference from a
//! function to its owning file has no precedent in the retrieval pack and
//! is this crate's own choice to keep the Function↔File cycle from leaking.

pub mod builder;
pub mod disasm;
pub mod file;
pub mod function;
pub mod value;

pub use builder::{build_file, new_file, FileRef};
pub use disasm::disassemble;
pub use file::{ExternalMember, File, Member, Struct, StructRef};
pub use function::{Function, FunctionRef};
pub use value::{Value, ValueRef};
