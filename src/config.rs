// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CONFIGURAÇÃO DO AZURE AI SEARCH E DOS MODELOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Configurações lidas uma única vez das variáveis de ambiente.
// Todas as configurações podem ser definidas via .env
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::fmt;
use std::time::Duration;

/// Versão da API REST do Azure AI Search.
pub const API_VERSION: &str = "2024-07-01";

/// Perfil de ranking semântico configurado no índice.
pub const SEMANTIC_CONFIGURATION: &str = "default-semantic-config";

/// Campo vetorial do índice.
pub const VECTOR_FIELD: &str = "embedding";

/// Campos retornados na recuperação de um relatório.
pub const SELECT_FIELDS: &str =
    "embeddingContent, embeddingContext, fileName, webUrl, slideNumber, fileExtension";

/// Extensão dos documentos PowerPoint no índice.
pub const POWERPOINT_EXTENSION: &str = ".pptx";

/// Timeout padrão das chamadas HTTP (segundos).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Mensagem devolvida quando falta alguma das três variáveis obrigatórias.
pub const INCOMPLETE_CONFIG_MESSAGE: &str = "Azure AI Search configuration is incomplete. \
Please set AZURE_SEARCH_ENDPOINT, AZURE_SEARCH_KEY, and AZURE_SEARCH_INDEX_NAME environment variables.";

/// Configuração do Azure AI Search.
///
/// Imutável depois de carregada. Os três campos opcionais podem faltar:
/// nesse caso as ferramentas respondem com erro estruturado sem tocar a rede.
#[derive(Clone)]
pub struct SearchConfig {
    /// Host do serviço (ex: `my-service.search.windows.net`)
    pub endpoint: Option<String>,

    /// Chave de API (`api-key`)
    pub api_key: Option<String>,

    /// Nome do índice
    pub index_name: Option<String>,

    pub api_version: String,
    pub vector_field: String,
    pub select_fields: String,

    /// Extensão alvo do filtro (`.pptx`)
    pub document_extension: String,

    /// Timeout total de cada requisição.
    pub timeout: Duration,
}

/// Credenciais validadas, emprestadas da configuração.
#[derive(Debug, Clone, Copy)]
pub struct SearchCredentials<'a> {
    pub endpoint: &'a str,
    pub api_key: &'a str,
    pub index_name: &'a str,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            index_name: None,
            api_version: API_VERSION.to_string(),
            vector_field: VECTOR_FIELD.to_string(),
            select_fields: SELECT_FIELDS.to_string(),
            document_extension: POWERPOINT_EXTENSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("index_name", &self.index_name)
            .field("api_version", &self.api_version)
            .field("vector_field", &self.vector_field)
            .field("document_extension", &self.document_extension)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SearchConfig {
    /// Cria configuração completa com os valores padrão da integração.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        index_name: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            api_key: Some(api_key.into()),
            index_name: Some(index_name.into()),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Carrega a configuração das variáveis de ambiente.
    ///
    /// Variáveis suportadas:
    /// - `AZURE_SEARCH_ENDPOINT`
    /// - `AZURE_SEARCH_KEY`
    /// - `AZURE_SEARCH_INDEX_NAME`
    /// - `AZURE_SEARCH_TIMEOUT_SECS` (padrão: 30)
    ///
    /// Valores vazios contam como ausentes.
    pub fn from_env() -> Self {
        let mut config = Self {
            endpoint: non_empty_var("AZURE_SEARCH_ENDPOINT"),
            api_key: non_empty_var("AZURE_SEARCH_KEY"),
            index_name: non_empty_var("AZURE_SEARCH_INDEX_NAME"),
            ..Self::default()
        };

        if let Some(secs) = non_empty_var("AZURE_SEARCH_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(secs) if secs > 0 => {
                    config.timeout = Duration::from_secs(secs);
                    log::info!("AZURE_SEARCH_TIMEOUT_SECS={}", secs);
                }
                _ => log::warn!(
                    "Ignoring invalid AZURE_SEARCH_TIMEOUT_SECS={:?}, using {}s",
                    secs,
                    DEFAULT_TIMEOUT_SECS
                ),
            }
        }

        if !config.is_complete() {
            log::warn!("Azure AI Search configuration is incomplete; search tools will return errors");
        }

        config
    }

    /// Verifica se endpoint, chave e índice estão presentes.
    pub fn is_complete(&self) -> bool {
        self.credentials().is_some()
    }

    /// Retorna as credenciais se as três estiverem presentes e não vazias.
    pub fn credentials(&self) -> Option<SearchCredentials<'_>> {
        fn present(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.trim().is_empty())
        }

        Some(SearchCredentials {
            endpoint: present(&self.endpoint)?,
            api_key: present(&self.api_key)?,
            index_name: present(&self.index_name)?,
        })
    }

    /// URL de busca do índice.
    ///
    /// Aceita o endpoint como host puro ou com esquema/barra final. Sem
    /// esquema explícito, usa `https`; `http://` só é mantido quando
    /// configurado (emuladores locais).
    pub fn search_url(&self, credentials: &SearchCredentials<'_>) -> String {
        let endpoint = credentials.endpoint.trim();
        let (scheme, host) = match endpoint.strip_prefix("http://") {
            Some(host) => ("http", host),
            None => ("https", endpoint.strip_prefix("https://").unwrap_or(endpoint)),
        };
        let host = host.trim_end_matches('/');

        format!(
            "{}://{}/indexes/{}/docs/search?api-version={}",
            scheme, host, credentials.index_name, self.api_version
        )
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SELEÇÃO DE MODELOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Provedor de LLM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    #[default]
    OpenAi,
    Anthropic,
    AzureOpenAi,
    DeepSeek,
    OpenRouter,
    Gemini,
    Perplexity,
    HuggingFace,
    /// Servidor local compatível com OpenAI (`LOCAL_MODEL_URL`)
    Local,
}

impl LlmProvider {
    /// Converte string do .env para LlmProvider.
    ///
    /// Case-insensitive; valores desconhecidos caem em OpenAI.
    pub fn from_env(value: &str) -> Self {
        match value.to_lowercase().trim() {
            "anthropic" => Self::Anthropic,
            "azureopenai" | "azure_openai" | "azure" => Self::AzureOpenAi,
            "deepseek" => Self::DeepSeek,
            "openrouter" => Self::OpenRouter,
            "gemini" | "google" => Self::Gemini,
            "perplexity" => Self::Perplexity,
            "huggingface" | "hf" => Self::HuggingFace,
            "local" => Self::Local,
            _ => Self::OpenAi,
        }
    }

    /// URL base padrão do provedor.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Anthropic => "https://api.anthropic.com/v1/",
            Self::AzureOpenAi => "https://YOUR-RESOURCE.openai.azure.com/",
            Self::DeepSeek => "https://api.deepseek.com/v1",
            Self::OpenRouter => "https://openrouter.ai/api/v1",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai/",
            Self::Perplexity => "https://api.perplexity.ai/chat/completions",
            Self::HuggingFace => "https://api-inference.huggingface.co/v1/",
            Self::Local => "http://localhost:11434/v1",
        }
    }

    /// Retorna nome legível para logs.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::AzureOpenAi => "Azure OpenAI",
            Self::DeepSeek => "DeepSeek",
            Self::OpenRouter => "OpenRouter",
            Self::Gemini => "Gemini",
            Self::Perplexity => "Perplexity",
            Self::HuggingFace => "HuggingFace",
            Self::Local => "Local",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Modelo selecionado: provedor, nome e URL base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub provider: LlmProvider,
    pub name: String,
    pub base_url: String,
}

/// Hosts cujas APIs aceitam schema de saída nativo.
const STRUCTURED_OUTPUT_HOSTS: [&str; 2] = ["openai.com", "anthropic.com"];

impl ModelSpec {
    pub fn new(provider: LlmProvider, name: impl Into<String>) -> Self {
        Self {
            provider,
            name: name.into(),
            base_url: provider.default_base_url().to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// O modelo aceita declaração direta do schema de saída?
    ///
    /// Decidido pelo host da URL base, não pelo nome do modelo.
    pub fn supports_structured_output(&self) -> bool {
        STRUCTURED_OUTPUT_HOSTS
            .iter()
            .any(|host| self.base_url.contains(host))
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.provider)
    }
}

/// Política de seleção de modelos do pesquisador.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    /// Modelo para planejamento e raciocínio
    pub reasoning_model: ModelSpec,
    /// Modelo principal de escrita
    pub main_model: ModelSpec,
    /// Modelo rápido usado pelos agentes de ferramenta
    pub fast_model: ModelSpec,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            reasoning_model: ModelSpec::new(LlmProvider::OpenAi, "o3-mini"),
            main_model: ModelSpec::new(LlmProvider::OpenAi, "gpt-4o"),
            fast_model: ModelSpec::new(LlmProvider::OpenAi, "gpt-4o-mini"),
        }
    }
}

impl LlmConfig {
    /// Usa o mesmo modelo para os três papéis.
    pub fn uniform(model: ModelSpec) -> Self {
        Self {
            reasoning_model: model.clone(),
            main_model: model.clone(),
            fast_model: model,
        }
    }
}

/// Carrega a política de modelos das variáveis de ambiente.
///
/// Variáveis suportadas (cada par provedor/modelo):
/// - `REASONING_MODEL_PROVIDER` / `REASONING_MODEL` (padrão: openai / o3-mini)
/// - `MAIN_MODEL_PROVIDER` / `MAIN_MODEL` (padrão: openai / gpt-4o)
/// - `FAST_MODEL_PROVIDER` / `FAST_MODEL` (padrão: openai / gpt-4o-mini)
/// - `LOCAL_MODEL_URL`: URL base do provedor local
/// - `AZURE_OPENAI_ENDPOINT`: URL base do Azure OpenAI
pub fn load_llm_config() -> LlmConfig {
    let defaults = LlmConfig::default();

    let config = LlmConfig {
        reasoning_model: load_model_spec("REASONING", defaults.reasoning_model),
        main_model: load_model_spec("MAIN", defaults.main_model),
        fast_model: load_model_spec("FAST", defaults.fast_model),
    };

    log::info!(
        "LLM: reasoning={}, main={}, fast={}",
        config.reasoning_model,
        config.main_model,
        config.fast_model
    );

    config
}

fn load_model_spec(role: &str, default: ModelSpec) -> ModelSpec {
    let provider = non_empty_var(&format!("{}_MODEL_PROVIDER", role))
        .map(|p| LlmProvider::from_env(&p))
        .unwrap_or(default.provider);

    let name = non_empty_var(&format!("{}_MODEL", role)).unwrap_or(default.name);

    let spec = ModelSpec::new(provider, name);
    let override_url = match provider {
        LlmProvider::Local => non_empty_var("LOCAL_MODEL_URL"),
        LlmProvider::AzureOpenAi => non_empty_var("AZURE_OPENAI_ENDPOINT"),
        _ => None,
    };

    match override_url {
        Some(url) => spec.with_base_url(url),
        None => spec,
    }
}
