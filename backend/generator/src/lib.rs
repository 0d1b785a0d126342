pub mod providers;

pub use providers::mock::MockGenerator;
pub use providers::openai_compat::{GeneratorSettings, OpenAiCompatGenerator};
pub use providers::GeneratorRegistry;
