//! # PPTX Research - Ferramentas de busca em relatórios PowerPoint
//!
//! Este crate expõe, para um orquestrador de pesquisa baseado em LLM, duas
//! ferramentas sobre um índice do **Azure AI Search** que contém relatórios
//! PowerPoint já fatiados por slide, e o agente que as empacota.
//!
//! ## Fluxo
//!
//! ```text
//! orquestrador → AzureSearchAgent → discover_powerpoint_reports(query)
//!                                 → retrieve_powerpoint_report(file_name, query)
//!              ← resumo em ToolAgentOutput
//! ```
//!
//! ## Componentes
//!
//! ### 1. Cliente de busca (`search`)
//! - **Descoberta**: busca full-text pelo nome do arquivo, deduplicada e
//!   ordenada por nome
//! - **Recuperação**: busca híbrida (texto + vetor) com ranking semântico,
//!   deduplicada por slide e ordenada numericamente
//! - Erros nunca escapam: viram `{"error": "..."}`
//!
//! ### 2. Ferramentas (`tools`)
//! A trait `AgentTool` com argumentos JSON e schema dos parâmetros.
//!
//! ### 3. Agente (`agent`)
//! Descritor com instruções, modelo rápido, ferramentas e contrato de
//! saída (schema nativo ou texto + parser).
//!
//! ## Exemplo de Uso
//!
//! ```rust,ignore
//! use pptx_research::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Arc::new(AzureSearchClient::from_env()?);
//!     let agent = init_azure_search_agent(&load_llm_config(), client.clone());
//!
//!     let reports = client.discover("customer satisfaction").await;
//!     println!("{}", serde_json::to_string_pretty(&reports)?);
//!     Ok(())
//! }
//! ```

#![warn(rust_2018_idioms)]

/// Tipos fundamentais: resultados de descoberta e recuperação, e o
/// formato de erro estruturado.
pub mod types;

/// Configuração do Azure AI Search e política de seleção de modelos.
///
/// **Azure AI Search:**
/// - `AZURE_SEARCH_ENDPOINT`: host do serviço
/// - `AZURE_SEARCH_KEY`: chave de API
/// - `AZURE_SEARCH_INDEX_NAME`: índice
/// - `AZURE_SEARCH_TIMEOUT_SECS`: timeout das requisições (padrão: 30)
///
/// **LLM:**
/// - `FAST_MODEL_PROVIDER` / `FAST_MODEL` (padrão: openai / gpt-4o-mini)
/// - `MAIN_MODEL_PROVIDER` / `MAIN_MODEL`
/// - `REASONING_MODEL_PROVIDER` / `REASONING_MODEL`
pub mod config;

/// Cliente do Azure AI Search.
///
/// Define a trait `SearchTransport` e implementações para:
/// - reqwest (produção)
/// - Mock com contador de chamadas (testes)
pub mod search;

/// Ferramentas chamáveis pelo modelo.
pub mod tools;

/// Agente de pesquisa: descritor, contrato de saída e parser.
pub mod agent;

// Re-exports principais
pub use agent::{init_azure_search_agent, AgentTask, OutputContract, ResearchAgent, ToolAgentOutput};
pub use config::{load_llm_config, LlmConfig, LlmProvider, ModelSpec, SearchConfig};
pub use search::{AzureSearchClient, SearchError};
pub use types::*;

/// Versão da biblioteca.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude com imports comuns para uso rápido.
///
/// Importar tudo de uma vez:
/// ```rust,ignore
/// use pptx_research::prelude::*;
/// ```
pub mod prelude {
    pub use crate::agent::{
        init_azure_search_agent, AgentTask, OutputContract, ResearchAgent, ToolAgentOutput,
    };
    pub use crate::config::{load_llm_config, LlmConfig, LlmProvider, ModelSpec, SearchConfig};
    pub use crate::search::{AzureSearchClient, SearchError, SearchTransport};
    pub use crate::tools::AgentTool;
    pub use crate::types::*;
    pub use std::sync::Arc;
}
