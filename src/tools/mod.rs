//! # Ferramentas do Agente
//!
//! Ferramentas chamáveis pelo modelo de linguagem. Cada ferramenta recebe
//! argumentos JSON e devolve dados JSON simples.
//!
//! ## Componentes
//!
//! - [`AgentTool`]: Interface comum das ferramentas
//! - [`DiscoverReportsTool`]: Descoberta de relatórios PowerPoint
//! - [`RetrieveReportTool`]: Recuperação de slides de um relatório

pub mod azure_search;

use async_trait::async_trait;
use serde_json::{json, Value};

pub use azure_search::{
    create_azure_search_tools, DiscoverArgs, DiscoverReportsTool, RetrieveArgs,
    RetrieveReportTool,
};

/// Trait para ferramentas do agente.
///
/// Define a interface que as ferramentas devem implementar
/// para serem usadas pelo agente de pesquisa.
#[async_trait]
pub trait AgentTool: Send + Sync {
    /// Nome da ferramenta.
    fn name(&self) -> &'static str;

    /// Descrição da ferramenta.
    fn description(&self) -> &'static str;

    /// JSON schema dos argumentos.
    fn parameters(&self) -> Value;

    /// Executa a ferramenta com os parâmetros fornecidos.
    ///
    /// `Err` apenas para argumentos inválidos.
    async fn execute(&self, params: Value) -> Result<Value, String>;

    /// Definição no formato de function calling.
    fn definition(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name(),
                "description": self.description(),
                "parameters": self.parameters(),
            }
        })
    }
}
