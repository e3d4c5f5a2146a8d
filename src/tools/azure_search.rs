//! # Azure Search Tools
//!
//! As duas ferramentas expostas ao agente sobre o índice de relatórios
//! PowerPoint:
//!
//! - `discover_powerpoint_reports`: encontra relatórios pelo nome do arquivo
//! - `retrieve_powerpoint_report`: recupera os slides de um relatório
//!
//! Falhas de busca nunca viram `Err`: chegam ao modelo como `{"error": ...}`.
//! `Err` fica reservado para argumentos inválidos na chamada da ferramenta.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::AgentTool;
use crate::agent::schema_value;
use crate::search::AzureSearchClient;

/// Argumentos de `discover_powerpoint_reports`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DiscoverArgs {
    /// The search query
    pub query: String,
}

/// Argumentos de `retrieve_powerpoint_report`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RetrieveArgs {
    /// The exact name of the PowerPoint report to retrieve
    pub file_name: String,
    /// The search query to find relevant content within the report
    pub query: String,
}

fn parse_args<T: for<'de> Deserialize<'de>>(tool: &str, params: Value) -> Result<T, String> {
    serde_json::from_value(params).map_err(|e| format!("Invalid arguments for {}: {}", tool, e))
}

/// Ferramenta de descoberta de relatórios.
pub struct DiscoverReportsTool {
    client: Arc<AzureSearchClient>,
}

impl DiscoverReportsTool {
    pub const NAME: &'static str = "discover_powerpoint_reports";

    pub fn new(client: Arc<AzureSearchClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AgentTool for DiscoverReportsTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Discover up to 750 relevant PowerPoint reports based on a query. \
        Returns a list of file_name and web_url for each discovered PowerPoint report."
    }

    fn parameters(&self) -> Value {
        schema_value::<DiscoverArgs>()
    }

    async fn execute(&self, params: Value) -> Result<Value, String> {
        let args: DiscoverArgs = parse_args(Self::NAME, params)?;
        let output = self.client.discover(&args.query).await;
        serde_json::to_value(output).map_err(|e| e.to_string())
    }
}

/// Ferramenta de recuperação do conteúdo de um relatório.
pub struct RetrieveReportTool {
    client: Arc<AzureSearchClient>,
}

impl RetrieveReportTool {
    pub const NAME: &'static str = "retrieve_powerpoint_report";

    pub fn new(client: Arc<AzureSearchClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AgentTool for RetrieveReportTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Retrieve up to 1000 chunks/slides of content from a specific PowerPoint report. \
        Returns the report file_name, web_url and its slides ordered by slide number."
    }

    fn parameters(&self) -> Value {
        schema_value::<RetrieveArgs>()
    }

    async fn execute(&self, params: Value) -> Result<Value, String> {
        let args: RetrieveArgs = parse_args(Self::NAME, params)?;
        let output = self.client.retrieve(&args.file_name, &args.query).await;
        serde_json::to_value(output).map_err(|e| e.to_string())
    }
}

/// Cria as duas ferramentas sobre o mesmo cliente, na ordem de uso.
pub fn create_azure_search_tools(client: Arc<AzureSearchClient>) -> Vec<Arc<dyn AgentTool>> {
    vec![
        Arc::new(DiscoverReportsTool::new(client.clone())),
        Arc::new(RetrieveReportTool::new(client)),
    ]
}
