// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SAÍDA DOS AGENTES DE FERRAMENTA
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Schema do resumo final produzido pelo modelo e o parser usado quando o
// modelo não aceita schema nativo.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::fmt;
use std::marker::PhantomData;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Resumo final de um agente de ferramenta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolAgentOutput {
    /// The summarized findings, formatted with headings and bullets where helpful
    pub output: String,
    /// Citations for the findings (report names or URLs)
    #[serde(default)]
    pub sources: Vec<String>,
}

impl ToolAgentOutput {
    /// JSON schema do tipo.
    pub fn json_schema() -> Value {
        schema_value::<Self>()
    }
}

/// JSON schema serializado de `T` (objeto vazio se a serialização falhar).
pub fn schema_value<T: JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T))
        .unwrap_or_else(|_| Value::Object(Default::default()))
}

/// Erro de parsing da saída do modelo.
#[derive(Debug, thiserror::Error)]
#[error("Failed to parse {type_name} from model output: {reason}. Output was: {excerpt}")]
pub struct OutputParseError {
    pub type_name: &'static str,
    pub reason: String,
    /// Primeiros caracteres da saída
    pub excerpt: String,
}

const EXCERPT_CHARS: usize = 500;

impl OutputParseError {
    fn new(type_name: &'static str, reason: impl Into<String>, raw: &str) -> Self {
        Self {
            type_name,
            reason: reason.into(),
            excerpt: raw.chars().take(EXCERPT_CHARS).collect(),
        }
    }
}

/// Parser tolerante de JSON vindo de texto livre.
///
/// Tenta, nesta ordem: o texto inteiro, um bloco ```json, um bloco ```
/// qualquer e o trecho entre o primeiro `{` e o último `}`.
pub struct TypeParser<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypeParser<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for TypeParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for TypeParser<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TypeParser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeParser<{}>", std::any::type_name::<T>())
    }
}

impl<T: DeserializeOwned> TypeParser<T> {
    pub fn parse(&self, raw: &str) -> Result<T, OutputParseError> {
        let type_name = std::any::type_name::<T>();
        let mut last_error = String::from("no JSON object found");

        for candidate in json_candidates(raw) {
            match serde_json::from_str::<T>(candidate) {
                Ok(value) => return Ok(value),
                Err(e) => last_error = e.to_string(),
            }
        }

        Err(OutputParseError::new(type_name, last_error, raw))
    }
}

/// Cria um parser para `T`.
pub fn create_type_parser<T: DeserializeOwned>() -> TypeParser<T> {
    TypeParser::new()
}

/// Parsing estrito: a saída inteira tem que ser o JSON de `T`.
pub fn parse_strict<T: DeserializeOwned>(raw: &str) -> Result<T, OutputParseError> {
    serde_json::from_str(raw.trim())
        .map_err(|e| OutputParseError::new(std::any::type_name::<T>(), e.to_string(), raw))
}

fn json_candidates(raw: &str) -> Vec<&str> {
    let mut candidates = vec![raw.trim()];

    if raw.contains("```json") {
        if let Some(block) = raw.split("```json").nth(1).and_then(|s| s.split("```").next()) {
            candidates.push(block.trim());
        }
    } else if raw.contains("```") {
        if let Some(block) = raw.split("```").nth(1) {
            candidates.push(block.trim());
        }
    }

    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
        if start < end {
            candidates.push(&raw[start..=end]);
        }
    }

    candidates
}
