mod sanitizer;

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use kindred_llm::{ChatMessage, ChatParams, LlmClient, ResponseFormat};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

pub use sanitizer::sanitize_scores;

/// Hidden chain-of-thought for reasoning models eats into the completion
/// budget before any visible JSON is produced.
const ANALYSIS_MAX_COMPLETION_TOKENS: u32 = 10_000;

#[derive(Debug, Clone)]
pub struct AnswerAnalysisRequest {
    pub user_id: String,
    pub question_content: String,
    pub answer_text: String,
    pub question_category: String,
    pub question_tags: Vec<String>,
    pub question_tone: Option<String>,
    pub language: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerAnalysisResponse {
    pub summary: String,
    pub categories: Vec<String>,
    pub scores: Value,
    pub parse_ok: bool,
    pub analysis_version: String,
    pub created_at: DateTime<Utc>,
}

pub struct AnswerAnalyzer {
    client: Arc<dyn LlmClient>,
    model: String,
}

impl AnswerAnalyzer {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self { client, model: model.into() }
    }

    pub async fn analyze(&self, request: AnswerAnalysisRequest) -> Result<AnswerAnalysisResponse> {
        let prompt = build_prompt(&request);
        debug!(chars = prompt.len(), "answer analysis prompt built");

        let params = ChatParams {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system("당신은 JSON만 출력하는 분석기입니다. 어떤 경우에도 유효한 JSON 객체만 반환하세요."),
                ChatMessage::user(prompt),
            ],
            max_completion_tokens: ANALYSIS_MAX_COMPLETION_TOKENS,
            temperature: None,
            response_format: Some(ResponseFormat::JsonObject),
        };

        let raw_text = self.client.chat(params).await?;
        let parsed = parse_analysis_json(&raw_text);

        let (summary, categories, scores, parse_ok) = match parsed {
            Some(value) => (
                value.get("summary").and_then(Value::as_str).unwrap_or_default().to_string(),
                value
                    .get("categories")
                    .and_then(Value::as_array)
                    .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                    .unwrap_or_default(),
                value.get("scores").cloned().unwrap_or(Value::Null),
                true,
            ),
            None => {
                warn!("answer analysis response failed to parse as JSON, degrading to defaults");
                (String::new(), Vec::new(), Value::Null, false)
            }
        };

        let scores = sanitize_scores(&scores);
        let created_at = Utc::now();
        let analysis_version = format!("ans-v1.0:{}:{}", self.model, created_at.date_naive());

        Ok(AnswerAnalysisResponse { summary, categories, scores, parse_ok, analysis_version, created_at })
    }
}

fn build_prompt(request: &AnswerAnalysisRequest) -> String {
    let tags_line = if request.question_tags.is_empty() {
        "없음".to_string()
    } else {
        request.question_tags.join(", ")
    };
    let tone = request.question_tone.as_deref().unwrap_or("미지정");

    format!(
        "당신은 가족 대화 답변을 정량/정성적으로 분석하는 전문가입니다.\n\
다음 JSON 스키마로만 출력하세요(불필요한 텍스트 금지). 반드시 유효한 JSON 객체 1개만 출력하세요.\n\n\
입력 정보:\n\
- 언어: {language}\n\
- 질문 카테고리: {category}\n\
- 질문 태그: {tags_line}\n\
- 질문 톤: {tone}\n\
- 질문: {question}\n\
- 답변: {answer}\n\n\
출력(JSON) 스키마:\n\
{{\"summary\": \"string\", \"categories\": [\"string\"], \"scores\": {{\"sentiment\": -1.0, \"emotion\": {{\"joy\": 0, \"sadness\": 0, \"anger\": 0, \"fear\": 0, \"neutral\": 0}}, \"relevance_to_question\": 0, \"relevance_to_category\": 0, \"toxicity\": 0, \"length\": 0, \"keywords\": [\"string\"]}}}}",
        language = request.language,
        category = request.question_category,
        question = request.question_content,
        answer = request.answer_text,
    )
}

/// Tries a strict parse first, then falls back to scanning for the
/// outermost `{...}` span — models occasionally wrap the JSON in prose
/// despite instructions not to.
fn parse_analysis_json(raw_text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str(raw_text) {
        return Some(value);
    }

    let start = raw_text.find('{')?;
    let end = raw_text.rfind('}')?;
    if end <= start {
        return None;
    }

    serde_json::from_str(&raw_text[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StubLlm(String);

    #[async_trait]
    impl LlmClient for StubLlm {
        async fn chat(&self, _params: ChatParams) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    fn sample_request() -> AnswerAnalysisRequest {
        AnswerAnalysisRequest {
            user_id: "u1".into(),
            question_content: "오늘 뭐 했어?".into(),
            answer_text: "친구들과 놀았어요".into(),
            question_category: "일상".into(),
            question_tags: vec!["친구".into()],
            question_tone: None,
            language: "ko".into(),
        }
    }

    #[tokio::test]
    async fn clean_json_response_parses_directly() {
        let llm = Arc::new(StubLlm(
            r#"{"summary":"즐거운 하루","categories":["일상"],"scores":{"sentiment":0.734,"length":8}}"#.to_string(),
        ));
        let analyzer = AnswerAnalyzer::new(llm, "gpt-5-nano");
        let result = analyzer.analyze(sample_request()).await.unwrap();

        assert!(result.parse_ok);
        assert_eq!(result.summary, "즐거운 하루");
        assert_eq!(result.scores["sentiment"], 0.73);
        assert_eq!(result.scores["length"], 8);
    }

    #[tokio::test]
    async fn prose_wrapped_json_recovers_via_brace_scan() {
        let llm = Arc::new(StubLlm(
            "여기 결과입니다: {\"summary\":\"좋음\",\"categories\":[],\"scores\":{}} 감사합니다.".to_string(),
        ));
        let analyzer = AnswerAnalyzer::new(llm, "gpt-5-nano");
        let result = analyzer.analyze(sample_request()).await.unwrap();

        assert!(result.parse_ok);
        assert_eq!(result.summary, "좋음");
    }

    #[tokio::test]
    async fn unparseable_response_degrades_gracefully() {
        let llm = Arc::new(StubLlm("완전히 망가진 응답".to_string()));
        let analyzer = AnswerAnalyzer::new(llm, "gpt-5-nano");
        let result = analyzer.analyze(sample_request()).await.unwrap();

        assert!(!result.parse_ok);
        assert_eq!(result.summary, "");
        assert_eq!(result.scores, Value::Object(Default::default()));
    }
}
