//! Code materialization: the bridge between chat-generated code and the
//! runnable Streamlit file.

pub mod materializer;
pub mod template;

pub use materializer::CodeMaterializer;
pub use template::{dedent, extract, indent, render};
