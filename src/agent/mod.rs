// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// AGENTE DE PESQUISA NO AZURE AI SEARCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Descritor declarativo consumido pelo orquestrador: nome, instruções,
// modelo, ferramentas e contrato de saída. Não executa o modelo.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Schema de saída e parser tolerante.
pub mod output;
mod task;

pub use output::{create_type_parser, schema_value, OutputParseError, ToolAgentOutput, TypeParser};
pub use task::AgentTask;

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::{LlmConfig, ModelSpec};
use crate::search::AzureSearchClient;
use crate::tools::{create_azure_search_tools, AgentTool, DiscoverReportsTool};

/// Nome do agente de busca.
pub const AZURE_SEARCH_AGENT_NAME: &str = "AzureSearchAgent";

const INSTRUCTIONS_PREAMBLE: &str = "You are a research assistant that specializes in retrieving and summarizing information from the internal knowledge base of PowerPoint reports.

You have two main capabilities:
1. PowerPoint Report Discovery: Use the discover_powerpoint_reports tool to find the most relevant PowerPoint reports based on a query. This tool should always be used first to identify which reports exist and are relevant (it searches by file name and metadata).
2. Specific PowerPoint Report Retrieval: Use the retrieve_powerpoint_report tool to get the content of a specific PowerPoint report. Only use this tool after you have identified a relevant file name from the discovery step. This tool retrieves the actual content (slides and text) from the report.

When using these capabilities:
- Always start with discover_powerpoint_reports to find relevant file names
- Only use retrieve_powerpoint_report after you have a file name to get the content
- Always include citations/sources in your summaries
- Use headings and bullets to organize information when appropriate
- If a tool returns an error, read the message and either retry with a different query or report the failure

Only output JSON. Follow the JSON schema below. Do not output anything else. The output will be parsed against this schema, so output valid JSON only:
";

/// Instruções do agente, com o schema de `ToolAgentOutput` embutido.
pub fn azure_search_instructions() -> String {
    let schema = serde_json::to_string_pretty(&ToolAgentOutput::json_schema()).unwrap_or_default();
    format!("{}{}\n", INSTRUCTIONS_PREAMBLE, schema)
}

/// Como a saída final do modelo é obtida.
///
/// Escolhido uma vez, na criação do agente, pela capacidade do modelo.
#[derive(Debug, Clone)]
pub enum OutputContract {
    /// O modelo recebe o schema e devolve JSON conforme.
    NativeSchema(Value),
    /// O modelo devolve texto livre e o parser extrai o JSON.
    TextWithParser(TypeParser<ToolAgentOutput>),
}

impl OutputContract {
    /// Seleciona o contrato para o modelo.
    pub fn for_model(model: &ModelSpec) -> Self {
        if model.supports_structured_output() {
            Self::NativeSchema(ToolAgentOutput::json_schema())
        } else {
            Self::TextWithParser(create_type_parser())
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::NativeSchema(_))
    }

    /// Schema declarado ao modelo, se nativo.
    pub fn output_schema(&self) -> Option<&Value> {
        match self {
            Self::NativeSchema(schema) => Some(schema),
            Self::TextWithParser(_) => None,
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::NativeSchema(_) => "native-schema",
            Self::TextWithParser(_) => "text-plus-parser",
        }
    }

    /// Converte a resposta final do modelo em `ToolAgentOutput`.
    pub fn parse(&self, raw: &str) -> Result<ToolAgentOutput, OutputParseError> {
        match self {
            Self::NativeSchema(_) => output::parse_strict(raw),
            Self::TextWithParser(parser) => parser.parse(raw),
        }
    }
}

/// Descritor de um agente de pesquisa com ferramentas.
pub struct ResearchAgent {
    name: String,
    instructions: String,
    model: ModelSpec,
    tools: Vec<Arc<dyn AgentTool>>,
    output: OutputContract,
}

impl fmt::Debug for ResearchAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResearchAgent")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("tools", &self.tool_names())
            .field("output", &self.output.mode_name())
            .finish()
    }
}

impl ResearchAgent {
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        model: ModelSpec,
        tools: Vec<Arc<dyn AgentTool>>,
        output: OutputContract,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            model,
            tools,
            output,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn model(&self) -> &ModelSpec {
        &self.model
    }

    pub fn output_contract(&self) -> &OutputContract {
        &self.output
    }

    pub fn tools(&self) -> &[Arc<dyn AgentTool>] {
        &self.tools
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Busca uma ferramenta pelo nome.
    pub fn tool(&self, name: &str) -> Option<&Arc<dyn AgentTool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Definições das ferramentas no formato de function calling.
    pub fn tool_definitions(&self) -> Vec<Value> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Executa uma ferramenta a pedido do modelo.
    ///
    /// Falhas de busca voltam como valor; `Err` só para ferramenta
    /// desconhecida ou argumentos inválidos.
    pub async fn call_tool(&self, name: &str, args: Value) -> Result<Value, String> {
        let tool = self
            .tool(name)
            .ok_or_else(|| format!("Unknown tool: {}", name))?;

        log::debug!("{} -> {}", self.name, name);
        tool.execute(args).await
    }

    /// Lê a entrada do orquestrador como tarefa deste agente.
    ///
    /// Texto simples vira a query de uma tarefa endereçada a este agente.
    pub fn task_from_input(&self, input: &str) -> AgentTask {
        let task = AgentTask::from_input(input, &self.name);
        if task.agent != self.name {
            log::warn!("{}: task addressed to {}", self.name, task.agent);
        }
        task
    }

    /// Primeiro passo do protocolo: descoberta com a query da tarefa.
    pub async fn discover_for(&self, task: &AgentTask) -> Result<Value, String> {
        self.call_tool(DiscoverReportsTool::NAME, json!({ "query": task.query }))
            .await
    }

    /// Converte a resposta final do modelo.
    pub fn parse_output(&self, raw: &str) -> Result<ToolAgentOutput, OutputParseError> {
        self.output.parse(raw)
    }

    /// Resumo do descritor (sem instruções completas) para inspeção.
    pub fn describe(&self) -> Value {
        json!({
            "name": self.name,
            "model": self.model.name,
            "provider": self.model.provider.display_name(),
            "output_mode": self.output.mode_name(),
            "output_schema": self.output.output_schema(),
            "tools": self.tool_definitions(),
        })
    }
}

/// Cria o agente de busca de relatórios PowerPoint.
///
/// Usa o modelo rápido da configuração e liga as duas ferramentas ao
/// cliente fornecido.
///
/// # Exemplo
/// ```rust,ignore
/// let client = Arc::new(AzureSearchClient::from_env()?);
/// let agent = init_azure_search_agent(&load_llm_config(), client);
///
/// let result = agent
///     .call_tool("discover_powerpoint_reports", json!({"query": "pricing"}))
///     .await?;
/// ```
pub fn init_azure_search_agent(config: &LlmConfig, client: Arc<AzureSearchClient>) -> ResearchAgent {
    let model = config.fast_model.clone();
    let output = OutputContract::for_model(&model);

    log::info!(
        "{}: model={}, output={}",
        AZURE_SEARCH_AGENT_NAME,
        model,
        output.mode_name()
    );

    ResearchAgent::new(
        AZURE_SEARCH_AGENT_NAME,
        azure_search_instructions(),
        model,
        create_azure_search_tools(client),
        output,
    )
}
