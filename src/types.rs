// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TIPOS COMPARTILHADOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Resultados das ferramentas de descoberta e recuperação de relatórios
// PowerPoint, e o formato único de erro devolvido ao orquestrador.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Tipo de URL (alias para String)
pub type Url = String;

/// Token usado quando a linha não traz número de slide.
pub const UNKNOWN_SLIDE: &str = "Unknown";

/// Relatório encontrado na etapa de descoberta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    /// Nome do arquivo (chave de deduplicação)
    pub file_name: String,
    /// URL do arquivo na primeira ocorrência
    pub web_url: Url,
}

/// Conteúdo de um slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideRecord {
    /// Número do slide normalizado para string (ou `"Unknown"`)
    pub slide_number: String,
    /// Texto do slide, nunca vazio
    pub content: String,
}

impl SlideRecord {
    /// Posição numérica do slide, se o número for um inteiro.
    pub fn numeric_position(&self) -> Option<SlidePosition<'_>> {
        SlidePosition::parse(&self.slide_number)
    }
}

/// Inteiro de tamanho arbitrário, comparado sem conversão para tipo fixo.
///
/// Guarda o sinal e os dígitos sem zeros à esquerda; zero não tem sinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlidePosition<'a> {
    negative: bool,
    digits: &'a str,
}

impl<'a> SlidePosition<'a> {
    /// Aceita espaços em volta e sinal opcional (`"05"`, `" 7 "`, `"-1"`).
    pub fn parse(raw: &'a str) -> Option<Self> {
        let raw = raw.trim();
        let (negative, unsigned) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };

        if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let digits = unsigned.trim_start_matches('0');
        Some(Self {
            negative: negative && !digits.is_empty(),
            digits,
        })
    }
}

impl Ord for SlidePosition<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        let magnitude = self
            .digits
            .len()
            .cmp(&other.digits.len())
            .then_with(|| self.digits.cmp(other.digits));

        match (self.negative, other.negative) {
            (false, false) => magnitude,
            (true, true) => magnitude.reverse(),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
        }
    }
}

impl PartialOrd for SlidePosition<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ordem dos slides: numéricos primeiro (crescente), depois os demais
/// comparados como string.
pub fn compare_slides(a: &SlideRecord, b: &SlideRecord) -> Ordering {
    match (a.numeric_position(), b.numeric_position()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.slide_number.cmp(&b.slide_number),
    }
}

/// Conteúdo recuperado de um relatório específico.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub file_name: String,
    /// URL da primeira linha bruta retornada (vazio se não houve linhas)
    pub web_url: Url,
    pub slides: Vec<SlideRecord>,
}

/// Formato único de erro entregue ao modelo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
}

impl ErrorPayload {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Saída da ferramenta de descoberta.
///
/// Serializa como lista de relatórios ou como `[{"error": "..."}]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiscoveryOutput {
    /// Relatórios encontrados
    Reports(Vec<DiscoveryResult>),
    /// Lista com um único erro
    Failed(Vec<ErrorPayload>),
}

impl DiscoveryOutput {
    /// Cria a saída de erro (sempre lista de um elemento).
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(vec![ErrorPayload::new(message)])
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Mensagem de erro, se houver.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed(errors) => errors.first().map(|e| e.error.as_str()),
            Self::Reports(_) => None,
        }
    }

    pub fn reports(&self) -> &[DiscoveryResult] {
        match self {
            Self::Reports(reports) => reports,
            Self::Failed(_) => &[],
        }
    }
}

/// Saída da ferramenta de recuperação.
///
/// Serializa como o objeto do relatório ou como `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RetrievalOutput {
    Report(RetrievalResult),
    Failed(ErrorPayload),
}

impl RetrievalOutput {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(ErrorPayload::new(message))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed(payload) => Some(payload.error.as_str()),
            Self::Report(_) => None,
        }
    }

    pub fn report(&self) -> Option<&RetrievalResult> {
        match self {
            Self::Report(report) => Some(report),
            Self::Failed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide(n: &str) -> SlideRecord {
        SlideRecord {
            slide_number: n.into(),
            content: "x".into(),
        }
    }

    #[test]
    fn test_compare_slides_numeric_before_text() {
        let mut slides = vec![slide("10"), slide("Unknown"), slide("2"), slide("Appendix")];
        slides.sort_by(compare_slides);
        let order: Vec<_> = slides.iter().map(|s| s.slide_number.as_str()).collect();
        assert_eq!(order, vec!["2", "10", "Appendix", "Unknown"]);
    }

    #[test]
    fn test_compare_slides_beyond_machine_integers() {
        let mut slides = vec![
            slide("100000000000000000000"),
            slide("99999999999999999999"),
            slide("-3"),
            slide("007"),
        ];
        slides.sort_by(compare_slides);
        let order: Vec<_> = slides.iter().map(|s| s.slide_number.as_str()).collect();
        assert_eq!(
            order,
            vec!["-3", "007", "99999999999999999999", "100000000000000000000"]
        );
    }

    #[test]
    fn test_slide_position_parse() {
        assert_eq!(SlidePosition::parse(" 05 "), SlidePosition::parse("5"));
        assert_eq!(SlidePosition::parse("-0"), SlidePosition::parse("0"));
        assert!(SlidePosition::parse("5a").is_none());
        assert!(SlidePosition::parse("-").is_none());
        assert!(SlidePosition::parse("Unknown").is_none());
    }

    #[test]
    fn test_discovery_error_serialization() {
        let output = DiscoveryOutput::failed("boom");
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json, serde_json::json!([{ "error": "boom" }]));
        assert_eq!(output.error_message(), Some("boom"));
    }

    #[test]
    fn test_retrieval_serialization() {
        let output = RetrievalOutput::Report(RetrievalResult {
            file_name: "A.pptx".into(),
            web_url: "".into(),
            slides: vec![slide("1")],
        });
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["file_name"], "A.pptx");
        assert_eq!(json["slides"][0]["slide_number"], "1");

        let failed = serde_json::to_value(RetrievalOutput::failed("down")).unwrap();
        assert_eq!(failed, serde_json::json!({ "error": "down" }));
    }
}
