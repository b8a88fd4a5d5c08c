use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifies the model served by the completion endpoint.
///
/// Known models carry a typed name; anything else the provider accepts can be
/// passed through as a custom identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Known model versions
    Known(KnownModel),

    /// Custom model identifier (for models not listed in [`KnownModel`])
    Custom(String),
}

/// Models hosted by the default OpenAI-compatible provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// Llama 3.3 70B, the versatile general-purpose model.
    #[serde(rename = "llama-3.3-70b-versatile")]
    Llama3370bVersatile,

    /// Llama 3.1 8B, the low-latency model.
    #[serde(rename = "llama-3.1-8b-instant")]
    Llama318bInstant,

    /// Gemma 2 9B instruction-tuned.
    #[serde(rename = "gemma2-9b-it")]
    Gemma29bIt,
}

impl KnownModel {
    const ALL: [KnownModel; 3] = [
        KnownModel::Llama3370bVersatile,
        KnownModel::Llama318bInstant,
        KnownModel::Gemma29bIt,
    ];

    /// The identifier sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownModel::Llama3370bVersatile => "llama-3.3-70b-versatile",
            KnownModel::Llama318bInstant => "llama-3.1-8b-instant",
            KnownModel::Gemma29bIt => "gemma2-9b-it",
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::Known(KnownModel::Llama3370bVersatile)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Known(known_model) => write!(f, "{}", known_model),
            Model::Custom(custom) => write!(f, "{}", custom),
        }
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(KnownModel::ALL
            .into_iter()
            .find(|known| known.as_str() == s)
            .map(Model::Known)
            .unwrap_or_else(|| Model::Custom(s.to_string())))
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        let Ok(model) = model.parse::<Model>();
        model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_model_serialization() {
        let model = Model::Known(KnownModel::Llama3370bVersatile);
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#""llama-3.3-70b-versatile""#);
    }

    #[test]
    fn model_deserialization() {
        let model: Model = serde_json::from_str(r#""llama-3.1-8b-instant""#).unwrap();
        assert_eq!(model, Model::Known(KnownModel::Llama318bInstant));

        let model: Model = serde_json::from_str(r#""mixtral-8x7b-32768""#).unwrap();
        assert_eq!(model, Model::Custom("mixtral-8x7b-32768".to_string()));
    }

    #[test]
    fn parse_and_display() {
        let model = Model::from("gemma2-9b-it");
        assert_eq!(model, Model::Known(KnownModel::Gemma29bIt));
        assert_eq!(model.to_string(), "gemma2-9b-it");

        let model = Model::from("my-finetune");
        assert_eq!(model.to_string(), "my-finetune");
        assert_eq!(Model::default().to_string(), "llama-3.3-70b-versatile");
    }
}
