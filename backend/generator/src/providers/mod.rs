pub mod mock;
pub mod openai_compat;

use std::sync::Arc;

use appify_core::CodeGenerator;

use openai_compat::{GeneratorSettings, OpenAiCompatGenerator};

type KeyedBuilder = Box<dyn Fn(&str) -> Arc<dyn CodeGenerator> + Send + Sync>;

/// Picks the generator for a turn: the deployment's shared one, or one built
/// for the API key a user supplied.
pub struct GeneratorRegistry {
    shared: Option<Arc<dyn CodeGenerator>>,
    keyed: KeyedBuilder,
}

impl GeneratorRegistry {
    pub fn new(keyed: impl Fn(&str) -> Arc<dyn CodeGenerator> + Send + Sync + 'static) -> Self {
        Self {
            shared: None,
            keyed: Box::new(keyed),
        }
    }

    pub fn with_shared(mut self, generator: Arc<dyn CodeGenerator>) -> Self {
        self.shared = Some(generator);
        self
    }

    /// OpenAI-compatible generators; `shared_key` is the deployment's own key.
    pub fn openai(settings: GeneratorSettings, shared_key: Option<String>) -> Self {
        let keyed_settings = settings.clone();
        let registry = Self::new(move |key| {
            Arc::new(OpenAiCompatGenerator::new(key, keyed_settings.clone())) as Arc<dyn CodeGenerator>
        });
        match shared_key {
            Some(key) => registry.with_shared(Arc::new(OpenAiCompatGenerator::new(key, settings))),
            None => registry,
        }
    }

    /// One generator for every case; handy for tests and offline runs.
    pub fn fixed(generator: Arc<dyn CodeGenerator>) -> Self {
        let keyed = Arc::clone(&generator);
        Self::new(move |_| Arc::clone(&keyed)).with_shared(generator)
    }

    /// The generator to use given the session's API-key override.
    ///
    /// `None` when there is no override and the deployment has no shared key.
    pub fn resolve(&self, api_key: Option<&str>) -> Option<Arc<dyn CodeGenerator>> {
        match api_key {
            Some(key) => Some((self.keyed)(key)),
            None => self.shared.clone(),
        }
    }

    pub fn has_shared(&self) -> bool {
        self.shared.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock::MockGenerator;

    #[test]
    fn test_override_key_selects_keyed_generator() {
        let registry = GeneratorRegistry::new(|key| Arc::new(MockGenerator::new(format!("keyed:{key}"))) as Arc<dyn CodeGenerator>)
            .with_shared(Arc::new(MockGenerator::new("shared")));

        assert_eq!(registry.resolve(None).unwrap().name(), "shared");
        assert_eq!(registry.resolve(Some("sk-user")).unwrap().name(), "keyed:sk-user");
    }

    #[test]
    fn test_no_shared_generator_without_key() {
        let registry = GeneratorRegistry::openai(GeneratorSettings::default(), None);
        assert!(!registry.has_shared());
        assert!(registry.resolve(None).is_none());
        assert_eq!(registry.resolve(Some("sk-abc")).unwrap().name(), "openai");
    }
}
