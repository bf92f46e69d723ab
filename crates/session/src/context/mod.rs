//! Context assembly: rendering and budget fitting.

pub mod assembler;
pub mod render;

pub use assembler::{
    AssemblyInput, AssemblyResult, Budget, ContextAssembler, TooLargeCause, TooLargeReport,
};
