//! # Testes de Integração
//!
//! Este módulo valida o fluxo completo das ferramentas através da API pública:
//! - Descoberta: deduplicação, ordenação e formato de erro
//! - Recuperação: preferência de conteúdo, ordem dos slides e URL
//! - Configuração incompleta: nenhuma chamada de rede
//! - Agente: contrato de saída e despacho das ferramentas

use std::sync::Arc;
use std::time::Duration;

use pptx_research::agent::init_azure_search_agent;
use pptx_research::config::{LlmConfig, LlmProvider, ModelSpec, SearchConfig};
use pptx_research::search::{AzureSearchClient, MockSearchTransport, SearchTransport};
use pptx_research::types::{DiscoveryOutput, DiscoveryResult, RetrievalOutput};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn complete_config() -> SearchConfig {
    SearchConfig::new("svc.search.windows.net", "test-key", "reports")
}

fn client_over(transport: Arc<MockSearchTransport>) -> AzureSearchClient {
    AzureSearchClient::with_transport(complete_config(), transport)
}

// ============================================================================
// TESTE 1: Descoberta
// ============================================================================

#[tokio::test]
async fn test_discovery_happy_path() {
    let transport = Arc::new(MockSearchTransport::with_rows(vec![
        json!({"fileName": "A.pptx", "webUrl": "u1"}),
        json!({"fileName": "B.pptx", "webUrl": "u2"}),
        json!({"fileName": "A.pptx", "webUrl": "u3"}),
    ]));
    let client = client_over(transport.clone());

    let output = client.discover("reports").await;

    assert_eq!(
        output,
        DiscoveryOutput::Reports(vec![
            DiscoveryResult { file_name: "A.pptx".into(), web_url: "u1".into() },
            DiscoveryResult { file_name: "B.pptx".into(), web_url: "u2".into() },
        ])
    );
    assert_eq!(transport.call_count(), 1);

    let payload = transport.last_payload().unwrap();
    assert_eq!(payload["searchFields"], "fileName");
    assert_eq!(payload["top"], 750);
}

#[tokio::test]
async fn test_discovery_sort_is_permutation_independent() {
    let rows = vec![
        json!({"fileName": "Zeta.pptx", "webUrl": "z"}),
        json!({"fileName": "alpha.pptx", "webUrl": "a"}),
        json!({"fileName": "Beta.pptx", "webUrl": "b"}),
        json!({"fileName": "Alpha.pptx", "webUrl": "A"}),
    ];
    let mut reversed = rows.clone();
    reversed.reverse();

    let forward = client_over(Arc::new(MockSearchTransport::with_rows(rows)))
        .discover("q")
        .await;
    let backward = client_over(Arc::new(MockSearchTransport::with_rows(reversed)))
        .discover("q")
        .await;

    let names: Vec<_> = forward.reports().iter().map(|r| r.file_name.as_str()).collect();
    assert_eq!(names, vec!["Alpha.pptx", "Beta.pptx", "Zeta.pptx", "alpha.pptx"]);
    assert_eq!(forward, backward);
}

// ============================================================================
// TESTE 2: Recuperação
// ============================================================================

#[tokio::test]
async fn test_retrieval_fallback_content() {
    let transport = Arc::new(MockSearchTransport::with_rows(vec![json!({
        "slideNumber": 5,
        "embeddingContext": "",
        "embeddingContent": "fallback text",
        "webUrl": "https://sharepoint/deck"
    })]));
    let client = client_over(transport);

    let report = client.try_retrieve("Deck.pptx", "q").await.unwrap();

    assert_eq!(report.slides.len(), 1);
    assert_eq!(report.slides[0].slide_number, "5");
    assert_eq!(report.slides[0].content, "fallback text");
    assert_eq!(report.web_url, "https://sharepoint/deck");
}

#[tokio::test]
async fn test_retrieval_slide_order_and_dedup() {
    let transport = Arc::new(MockSearchTransport::with_rows(vec![
        json!({"slideNumber": "3", "embeddingContext": "three", "webUrl": "w"}),
        json!({"slideNumber": "1", "embeddingContext": "one"}),
        json!({"slideNumber": null, "embeddingContent": "unknown"}),
        json!({"slideNumber": "2", "embeddingContent": "two"}),
        json!({"slideNumber": "1", "embeddingContext": "duplicate"}),
        json!({"slideNumber": "4", "embeddingContext": "", "embeddingContent": ""}),
    ]));
    let client = client_over(transport);

    let output = client.retrieve("Deck.pptx", "q").await;
    let report = output.report().expect("retrieval should succeed");

    let order: Vec<_> = report.slides.iter().map(|s| s.slide_number.as_str()).collect();
    assert_eq!(order, vec!["1", "2", "3", "Unknown"]);
    assert_eq!(report.slides[0].content, "one");
    assert!(report.slides.iter().all(|s| !s.content.is_empty()));
}

#[tokio::test]
async fn test_retrieval_payload_targets_file() {
    let transport = Arc::new(MockSearchTransport::new());
    let client = client_over(transport.clone());

    client.retrieve("Q3 Results.pptx", "margins").await;

    let payload = transport.last_payload().unwrap();
    assert_eq!(
        payload["filter"],
        "fileName eq 'Q3 Results.pptx' and fileExtension eq '.pptx'"
    );
    assert_eq!(payload["queryType"], "semantic");
    assert_eq!(payload["semanticConfiguration"], "default-semantic-config");
    assert_eq!(payload["vectorQueries"][0]["text"], "margins");
}

// ============================================================================
// TESTE 3: Configuração incompleta
// ============================================================================

#[tokio::test]
async fn test_missing_config_makes_zero_calls() {
    let strip: [fn(&mut SearchConfig); 3] = [
        |c| c.endpoint = None,
        |c| c.api_key = None,
        |c| c.index_name = Some(String::new()),
    ];

    for remove in strip {
        let mut config = complete_config();
        remove(&mut config);

        let transport = Arc::new(MockSearchTransport::with_rows(vec![
            json!({"fileName": "A.pptx", "webUrl": "u1"}),
        ]));
        let client = AzureSearchClient::with_transport(config, transport.clone());

        let discovered = client.discover("q").await;
        let retrieved = client.retrieve("A.pptx", "q").await;

        let message = discovered.error_message().unwrap();
        assert!(message.contains("AZURE_SEARCH_ENDPOINT"));
        assert!(message.contains("AZURE_SEARCH_KEY"));
        assert!(message.contains("AZURE_SEARCH_INDEX_NAME"));
        assert_eq!(retrieved.error_message(), Some(message));
        assert_eq!(transport.call_count(), 0);
    }
}

// ============================================================================
// TESTE 4: Falhas HTTP
// ============================================================================

#[tokio::test]
async fn test_simulated_connection_error() {
    let transport = Arc::new(MockSearchTransport::failing("connection refused"));
    let client = client_over(transport);

    let retrieved = client.retrieve("A.pptx", "q").await;
    assert_eq!(
        retrieved,
        RetrievalOutput::failed("Network error: connection refused")
    );

    let discovered = serde_json::to_value(client.discover("q").await).unwrap();
    assert_eq!(discovered, json!([{"error": "Network error: connection refused"}]));
}

#[tokio::test]
async fn test_real_transport_connection_error() {
    // Porta 1 em loopback: conexão recusada, sem depender de rede externa
    let config = SearchConfig::new("127.0.0.1:1", "key", "reports")
        .with_timeout(Duration::from_secs(2));
    let client = AzureSearchClient::new(config).unwrap();

    let output = client.retrieve("A.pptx", "q").await;
    assert!(output.is_error());
    assert!(!output.error_message().unwrap().is_empty());
}

/// Servidor HTTP mínimo em loopback: responde `connections` requisições com
/// o status e corpo dados e devolve o texto bruto de cada requisição.
async fn serve_fixed_response(
    status_line: &'static str,
    body: &'static str,
    connections: usize,
) -> (String, tokio::task::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for _ in 0..connections {
            let (mut socket, _) = listener.accept().await.unwrap();
            requests.push(read_request(&mut socket).await);

            let response = format!(
                "{}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        }
        requests
    });

    (endpoint, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let read = socket.read(&mut chunk).await.unwrap();
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);

        let text = String::from_utf8_lossy(&buffer).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buffer.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buffer).to_string()
}

#[tokio::test]
async fn test_real_transport_non_success_status() {
    let (endpoint, server) =
        serve_fixed_response("HTTP/1.1 500 Internal Server Error", "index unavailable", 2).await;
    let config = SearchConfig::new(endpoint, "secret-key", "reports")
        .with_timeout(Duration::from_secs(5));
    let client = AzureSearchClient::new(config).unwrap();

    let retrieved = client.retrieve("A.pptx", "q").await;
    assert_eq!(
        retrieved,
        RetrievalOutput::failed("Search API error (500): index unavailable")
    );

    let discovered = serde_json::to_value(client.discover("q").await).unwrap();
    assert_eq!(
        discovered,
        json!([{"error": "Search API error (500): index unavailable"}])
    );

    let requests = server.await.unwrap();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        let lowered = request.to_lowercase();
        assert!(lowered.starts_with("post /indexes/reports/docs/search?api-version=2024-07-01 "));
        assert!(lowered.contains("api-key: secret-key"));
        assert!(lowered.contains("content-type: application/json"));
    }
    assert!(requests[0].contains("fileName eq 'A.pptx'"));
}

// ============================================================================
// TESTE 5: Concorrência
// ============================================================================

#[tokio::test]
async fn test_concurrent_calls_share_client() {
    let transport = Arc::new(MockSearchTransport::with_rows(vec![
        json!({"fileName": "A.pptx", "webUrl": "u1", "slideNumber": 1, "embeddingContent": "c"}),
    ]));
    let client = Arc::new(client_over(transport.clone()));

    let (a, b, c) = tokio::join!(
        client.discover("one"),
        client.discover("two"),
        client.retrieve("A.pptx", "three"),
    );

    assert_eq!(a, b);
    assert!(!c.is_error());
    assert_eq!(transport.call_count(), 3);
}

#[test]
fn test_blocking_use_of_client() {
    let transport: Arc<dyn SearchTransport> = Arc::new(MockSearchTransport::new());
    let client = AzureSearchClient::with_transport(complete_config(), transport);

    let output = tokio_test::block_on(client.discover("q"));
    assert_eq!(output, DiscoveryOutput::Reports(vec![]));
}

// ============================================================================
// TESTE 6: Agente
// ============================================================================

#[tokio::test]
async fn test_agent_dispatches_tools() {
    let transport = Arc::new(MockSearchTransport::with_rows(vec![
        json!({"fileName": "A.pptx", "webUrl": "u1", "slideNumber": 2, "embeddingContext": "ctx"}),
    ]));
    let client = Arc::new(client_over(transport.clone()));
    let agent = init_azure_search_agent(&LlmConfig::default(), client);

    let discovered = agent
        .call_tool("discover_powerpoint_reports", json!({"query": "a"}))
        .await
        .unwrap();
    assert_eq!(discovered, json!([{"file_name": "A.pptx", "web_url": "u1"}]));

    let retrieved: Value = agent
        .call_tool(
            "retrieve_powerpoint_report",
            json!({"file_name": "A.pptx", "query": "a"}),
        )
        .await
        .unwrap();
    assert_eq!(retrieved["slides"][0]["content"], "ctx");
    assert_eq!(transport.call_count(), 2);
}

#[test]
fn test_agent_output_contract_branch() {
    let client = Arc::new(client_over(Arc::new(MockSearchTransport::new())));

    let native = init_azure_search_agent(&LlmConfig::default(), client.clone());
    assert!(native.output_contract().is_native());

    let deepseek = LlmConfig::uniform(ModelSpec::new(LlmProvider::DeepSeek, "deepseek-chat"));
    let parsed = init_azure_search_agent(&deepseek, client);
    assert!(!parsed.output_contract().is_native());

    let raw = "Here is the summary:\n{\"output\": \"# Findings\\n- point\", \"sources\": [\"A.pptx\"]}";
    let output = parsed.parse_output(raw).unwrap();
    assert_eq!(output.sources, vec!["A.pptx"]);
    assert!(native.parse_output(raw).is_err());
}
