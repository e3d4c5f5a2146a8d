// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CLIENTE DE BUSCA (AZURE AI SEARCH)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Descoberta e recuperação de relatórios PowerPoint indexados.
// O ranking é inteiramente do serviço; aqui só montamos as queries,
// deduplicamos e ordenamos o resultado.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::config::{SearchConfig, INCOMPLETE_CONFIG_MESSAGE, SEMANTIC_CONFIGURATION};
use crate::types::{
    compare_slides, DiscoveryOutput, DiscoveryResult, RetrievalOutput, RetrievalResult,
    SlideRecord, UNKNOWN_SLIDE,
};

/// Máximo de linhas pedidas na descoberta.
pub const DISCOVERY_TOP: usize = 750;

/// Máximo de linhas (e vizinhos vetoriais) pedidos na recuperação.
pub const RETRIEVAL_TOP: usize = 1000;

/// Erros do cliente de busca
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Falta endpoint, chave ou índice.
    #[error("{0}")]
    ConfigError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    /// Resposta HTTP fora de 2xx.
    #[error("Search API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// Corpo da resposta malformado.
    #[error("Failed to parse search response: {0}")]
    ParseError(String),
}

impl SearchError {
    pub fn incomplete_config() -> Self {
        Self::ConfigError(INCOMPLETE_CONFIG_MESSAGE.to_string())
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SearchError::ParseError(err.to_string())
        } else {
            SearchError::NetworkError(err.to_string())
        }
    }
}

/// Transporte HTTP do índice.
///
/// Recebe a URL completa, a chave e o corpo JSON; devolve o corpo JSON
/// da resposta. Separado do cliente para permitir contagem de chamadas
/// e respostas simuladas nos testes.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    async fn post_search(
        &self,
        url: &str,
        api_key: &str,
        payload: &Value,
    ) -> Result<Value, SearchError>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TRANSPORTE REQWEST
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Transporte de produção sobre `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Cria o transporte com o timeout da configuração.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SearchError::NetworkError(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl SearchTransport for ReqwestTransport {
    async fn post_search(
        &self,
        url: &str,
        api_key: &str,
        payload: &Value,
    ) -> Result<Value, SearchError> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("api-key", api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÃO MOCK PARA TESTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Transporte mock: resposta fixa e contador de chamadas.
#[derive(Debug, Default)]
pub struct MockSearchTransport {
    response: Option<Value>,
    failure: Option<String>,
    calls: AtomicUsize,
    last_payload: Mutex<Option<Value>>,
}

impl MockSearchTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Responde com `{"value": rows}`.
    pub fn with_rows(rows: Vec<Value>) -> Self {
        Self {
            response: Some(json!({ "value": rows })),
            ..Self::default()
        }
    }

    /// Responde com um corpo arbitrário.
    pub fn with_body(body: Value) -> Self {
        Self {
            response: Some(body),
            ..Self::default()
        }
    }

    /// Falha como erro de rede.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Número de chamadas de rede recebidas.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Último corpo enviado.
    pub fn last_payload(&self) -> Option<Value> {
        self.last_payload.lock().ok().and_then(|p| p.clone())
    }
}

#[async_trait]
impl SearchTransport for MockSearchTransport {
    async fn post_search(
        &self,
        _url: &str,
        _api_key: &str,
        payload: &Value,
    ) -> Result<Value, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_payload.lock() {
            *last = Some(payload.clone());
        }

        if let Some(message) = &self.failure {
            return Err(SearchError::NetworkError(message.clone()));
        }

        Ok(self.response.clone().unwrap_or_else(|| json!({ "value": [] })))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CLIENTE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Corpo da resposta de `/docs/search`.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    value: Vec<Map<String, Value>>,
}

/// Cliente de busca de relatórios PowerPoint.
///
/// Sem estado mutável: pode ser compartilhado via `Arc` e chamado
/// concorrentemente.
///
/// # Exemplo
/// ```rust,ignore
/// use pptx_research::search::AzureSearchClient;
///
/// let client = AzureSearchClient::from_env()?;
///
/// // Descobrir relatórios
/// let reports = client.discover("brand tracking 2023").await;
///
/// // Recuperar slides de um relatório
/// let report = client.retrieve("Brand Tracker Q4.pptx", "awareness").await;
/// ```
pub struct AzureSearchClient {
    config: SearchConfig,
    transport: Arc<dyn SearchTransport>,
}

impl AzureSearchClient {
    /// Cria o cliente a partir do ambiente, com transporte reqwest.
    pub fn from_env() -> Result<Self, SearchError> {
        Self::new(SearchConfig::from_env())
    }

    /// Cria o cliente com transporte reqwest.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Cria o cliente com transporte customizado.
    pub fn with_transport(config: SearchConfig, transport: Arc<dyn SearchTransport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Descobre relatórios pelo nome do arquivo.
    ///
    /// Nunca falha: erros viram `[{"error": ...}]`.
    pub async fn discover(&self, query: &str) -> DiscoveryOutput {
        match self.try_discover(query).await {
            Ok(reports) => DiscoveryOutput::Reports(reports),
            Err(e) => {
                log::warn!("discover_powerpoint_reports failed: {}", e);
                DiscoveryOutput::failed(e.to_string())
            }
        }
    }

    /// Recupera os slides de um relatório.
    ///
    /// Nunca falha: erros viram `{"error": ...}`.
    pub async fn retrieve(&self, file_name: &str, query: &str) -> RetrievalOutput {
        match self.try_retrieve(file_name, query).await {
            Ok(report) => RetrievalOutput::Report(report),
            Err(e) => {
                log::warn!("retrieve_powerpoint_report failed for {:?}: {}", file_name, e);
                RetrievalOutput::failed(e.to_string())
            }
        }
    }

    /// Versão tipada de [`discover`](Self::discover).
    pub async fn try_discover(&self, query: &str) -> Result<Vec<DiscoveryResult>, SearchError> {
        let payload = discovery_payload(&self.config, query);
        let rows = self.post(&payload).await?;
        let reports = dedup_reports(&rows);

        log::info!(
            "Discovery: {} rows -> {} reports for {:?}",
            rows.len(),
            reports.len(),
            query
        );
        Ok(reports)
    }

    /// Versão tipada de [`retrieve`](Self::retrieve).
    pub async fn try_retrieve(
        &self,
        file_name: &str,
        query: &str,
    ) -> Result<RetrievalResult, SearchError> {
        let payload = retrieval_payload(&self.config, file_name, query);
        let rows = self.post(&payload).await?;

        let web_url = rows.first().map(|row| text_value(row, "webUrl")).unwrap_or_default();
        let slides = collect_slides(&rows);

        log::info!(
            "Retrieval: {} rows -> {} slides from {:?}",
            rows.len(),
            slides.len(),
            file_name
        );

        Ok(RetrievalResult {
            file_name: file_name.to_string(),
            web_url,
            slides,
        })
    }

    /// Valida a configuração e executa a busca.
    async fn post(&self, payload: &Value) -> Result<Vec<Map<String, Value>>, SearchError> {
        let credentials = self
            .config
            .credentials()
            .ok_or_else(SearchError::incomplete_config)?;
        let url = self.config.search_url(&credentials);

        log::debug!("POST search on index {}", credentials.index_name);

        let body = self
            .transport
            .post_search(&url, credentials.api_key, payload)
            .await?;

        let response: SearchResponse =
            serde_json::from_value(body).map_err(|e| SearchError::ParseError(e.to_string()))?;
        Ok(response.value)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PAYLOADS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Escapa um literal de string OData (`'` vira `''`).
pub fn odata_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Busca full-text restrita ao nome do arquivo.
pub fn discovery_payload(config: &SearchConfig, query: &str) -> Value {
    json!({
        "search": query,
        "select": "fileName,webUrl",
        "searchFields": "fileName",
        "filter": format!("fileExtension eq '{}'", odata_literal(&config.document_extension)),
        "top": DISCOVERY_TOP,
    })
}

/// Busca híbrida (texto + vetor) com ranking semântico, filtrada pelo arquivo.
pub fn retrieval_payload(config: &SearchConfig, file_name: &str, query: &str) -> Value {
    json!({
        "search": query,
        "vectorQueries": [{
            "text": query,
            "kind": "text",
            "fields": config.vector_field,
            "k": RETRIEVAL_TOP,
        }],
        "select": config.select_fields,
        "filter": format!(
            "fileName eq '{}' and fileExtension eq '{}'",
            odata_literal(file_name),
            odata_literal(&config.document_extension)
        ),
        "top": RETRIEVAL_TOP,
        "queryType": "semantic",
        "semanticConfiguration": SEMANTIC_CONFIGURATION,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PÓS-PROCESSAMENTO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Campo textual da linha; ausente, nulo ou vazio vira `None`.
fn non_empty_text(row: &Map<String, Value>, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn text_value(row: &Map<String, Value>, key: &str) -> String {
    non_empty_text(row, key).unwrap_or_default()
}

/// Deduplica por nome de arquivo (primeira ocorrência vence) e ordena.
pub fn dedup_reports(rows: &[Map<String, Value>]) -> Vec<DiscoveryResult> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut reports: Vec<DiscoveryResult> = Vec::new();

    for row in rows {
        let Some(file_name) = non_empty_text(row, "fileName") else {
            continue;
        };
        if !seen.insert(file_name.clone()) {
            continue;
        }
        reports.push(DiscoveryResult {
            web_url: text_value(row, "webUrl"),
            file_name,
        });
    }

    reports.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    reports
}

/// Normaliza o número do slide; ausente ou em branco vira `"Unknown"`.
pub fn normalize_slide_number(raw: Option<&Value>) -> String {
    let text = match raw {
        None | Some(Value::Null) => return UNKNOWN_SLIDE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    if text.trim().is_empty() {
        UNKNOWN_SLIDE.to_string()
    } else {
        text
    }
}

/// Conteúdo do slide: `embeddingContext` primeiro, depois `embeddingContent`.
pub fn resolve_content(row: &Map<String, Value>) -> Option<String> {
    non_empty_text(row, "embeddingContext").or_else(|| non_empty_text(row, "embeddingContent"))
}

/// Deduplica por número de slide e ordena.
///
/// Linhas sem conteúdo são descartadas e não reservam o número do slide.
pub fn collect_slides(rows: &[Map<String, Value>]) -> Vec<SlideRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut slides: Vec<SlideRecord> = Vec::new();

    for row in rows {
        let slide_number = normalize_slide_number(row.get("slideNumber"));
        if seen.contains(&slide_number) {
            continue;
        }
        let Some(content) = resolve_content(row) else {
            continue;
        };
        seen.insert(slide_number.clone());
        slides.push(SlideRecord {
            slide_number,
            content,
        });
    }

    // sort_by é estável: empates numéricos ("5" e "05") mantêm a ordem de entrada
    slides.sort_by(compare_slides);
    slides
}
