//! Entrada dos agentes de ferramenta.

use serde::{Deserialize, Serialize};

/// Tarefa enviada pelo orquestrador a um agente de ferramenta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentTask {
    /// Lacuna de conhecimento que motivou a tarefa
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<String>,
    /// Agente destinatário
    pub agent: String,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_website: Option<String>,
}

impl AgentTask {
    /// Aceita o JSON de `AgentTask` ou uma query simples.
    ///
    /// Texto que não é um `AgentTask` válido vira a query de uma tarefa
    /// endereçada a `default_agent`.
    pub fn from_input(input: &str, default_agent: &str) -> Self {
        match serde_json::from_str::<AgentTask>(input.trim()) {
            Ok(task) => task,
            Err(_) => Self {
                gap: None,
                agent: default_agent.to_string(),
                query: input.trim().to_string(),
                entity_website: None,
            },
        }
    }
}
