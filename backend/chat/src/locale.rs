use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// App body installed on reset and for brand-new users.
pub const PLACEHOLDER_CODE: &str = "import streamlit as st\nst.title('This space is the sandbox.')";

const GREETING_EN: &str = "Hello {name}! I'm Appify. Describe the app you want and I'll write the \
Streamlit code for it, live next to this chat.\n\n\
Type `/undo` to revert my last change, `/reset` to start over, or `/save` to download the app.";

const GREETING_FR: &str = "Bonjour {name} ! Je suis Appify. Décrivez l'application que vous voulez \
et j'écrirai le code Streamlit correspondant, en direct à côté de cette discussion.\n\n\
Tapez `/undo` pour annuler ma dernière modification, `/reset` pour recommencer, ou `/save` pour \
télécharger l'application.";

/// Language of the seeded assistant greeting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl Locale {
    pub fn greeting(self, name: &str) -> String {
        let template = match self {
            Locale::En => GREETING_EN,
            Locale::Fr => GREETING_FR,
        };
        template.replace("{name}", name)
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "fr" => Ok(Locale::Fr),
            other => Err(format!("unsupported language `{other}` (expected `en` or `fr`)")),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Locale::En => "en",
            Locale::Fr => "fr",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_uses_name() {
        assert!(Locale::En.greeting("Ada").starts_with("Hello Ada!"));
        assert!(Locale::Fr.greeting("Ada").starts_with("Bonjour Ada !"));
    }

    #[test]
    fn test_parse() {
        assert_eq!("FR".parse::<Locale>().unwrap(), Locale::Fr);
        assert_eq!("en".parse::<Locale>().unwrap().to_string(), "en");
        assert!("de".parse::<Locale>().is_err());
    }
}
