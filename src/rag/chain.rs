//! Conversational retrieval chain.

use super::context::{format_chat_history, format_context_for_prompt};
use super::{ChatMessage, ChatModel, ChatTurn, Retriever};
use crate::config::Prompts;
use crate::error::{Result, TubeQaError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Answers questions about one video using its index and a hosted LLM.
pub struct QaChain {
    retriever: Retriever,
    llm: Arc<dyn ChatModel>,
    prompts: Prompts,
}

impl QaChain {
    /// Bind a retriever to a chat model.
    ///
    /// Fails with `QaChainUnavailable` if the retriever's index is empty or
    /// cannot be inspected.
    pub async fn new(retriever: Retriever, llm: Arc<dyn ChatModel>, prompts: Prompts) -> Result<Self> {
        let indexed = retriever
            .document_count()
            .await
            .map_err(|e| TubeQaError::QaChainUnavailable(e.to_string()))?;
        if indexed == 0 {
            return Err(TubeQaError::QaChainUnavailable(
                "retriever index is empty".to_string(),
            ));
        }
        if retriever.top_k() == 0 {
            return Err(TubeQaError::QaChainUnavailable(
                "retriever top_k must be positive".to_string(),
            ));
        }

        debug!("QA chain bound to {} ({} chunks)", llm.model(), indexed);
        Ok(Self {
            retriever,
            llm,
            prompts,
        })
    }

    /// Answer `question` given the prior turns of the conversation.
    ///
    /// Any failure is reported as `QueryFailed` carrying the underlying cause.
    #[instrument(skip(self, history), fields(history = history.len()))]
    pub async fn ask(&self, question: &str, history: &[ChatTurn]) -> Result<String> {
        self.answer(question, history)
            .await
            .map_err(|e| TubeQaError::QueryFailed(e.to_string()))
    }

    async fn answer(&self, question: &str, history: &[ChatTurn]) -> Result<String> {
        let standalone = if history.is_empty() {
            question.to_string()
        } else {
            self.condense(question, history).await?
        };

        let documents = self.retriever.retrieve(&standalone).await?;
        debug!("Retrieved {} chunks", documents.len());

        let mut vars = HashMap::new();
        vars.insert("context".to_string(), format_context_for_prompt(&documents));
        let system = self.prompts.render_with_custom(&self.prompts.qa.qa_system, &vars);

        let messages = [ChatMessage::system(system), ChatMessage::user(standalone)];
        let answer = self.llm.complete(&messages).await?;

        info!("Answer: {}", answer);
        Ok(answer)
    }

    /// Rewrite a follow-up question so it can be retrieved on without the history.
    async fn condense(&self, question: &str, history: &[ChatTurn]) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("chat_history".to_string(), format_chat_history(history));
        vars.insert("question".to_string(), question.to_string());
        let prompt = self.prompts.render_with_custom(&self.prompts.qa.condense, &vars);

        let rewritten = self.llm.complete(&[ChatMessage::user(prompt)]).await?;
        let rewritten = rewritten.trim();

        if rewritten.is_empty() {
            Ok(question.to_string())
        } else {
            debug!("Condensed question: {}", rewritten);
            Ok(rewritten.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Embedder;
    use crate::rag::ChatRole;
    use crate::vector_store::{build_index, MemoryVectorStore, VectorStore};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Embeds by keyword so retrieval is predictable.
    struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let text = text.to_lowercase();
            Ok(vec![
                if text.contains("borrow") { 1.0 } else { 0.0 },
                if text.contains("async") { 1.0 } else { 0.0 },
                0.1,
            ])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::new();
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }
    }

    /// Records every request and replies from a script.
    struct ScriptedModel {
        replies: Mutex<Vec<Result<String>>>,
        requests: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedModel {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
            self.requests.lock().unwrap().push(messages.to_vec());
            self.replies.lock().unwrap().remove(0)
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    async fn retriever() -> Retriever {
        let chunks = vec![
            "The borrow checker enforces ownership rules.".to_string(),
            "Async functions return futures.".to_string(),
        ];
        let store = build_index(chunks, &KeywordEmbedder).await.unwrap();
        Retriever::new(Arc::new(store), Arc::new(KeywordEmbedder)).with_top_k(1)
    }

    #[tokio::test]
    async fn test_first_question_skips_condense() {
        let model = Arc::new(ScriptedModel::new(vec![Ok("Ownership.".to_string())]));
        let chain = QaChain::new(retriever().await, model.clone(), Prompts::default())
            .await
            .unwrap();

        let answer = chain.ask("What does the borrow checker do?", &[]).await.unwrap();
        assert_eq!(answer, "Ownership.");

        let requests = model.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let messages = &requests[0];
        assert_eq!(messages[0].role, ChatRole::System);
        assert!(messages[0].content.contains("The borrow checker enforces ownership rules."));
        assert!(!messages[0].content.contains("futures"));
        assert_eq!(messages[1], ChatMessage::user("What does the borrow checker do?"));
    }

    #[tokio::test]
    async fn test_follow_up_is_condensed_before_retrieval() {
        let model = Arc::new(ScriptedModel::new(vec![
            Ok("  What do async functions return?  ".to_string()),
            Ok("Futures.".to_string()),
        ]));
        let chain = QaChain::new(retriever().await, model.clone(), Prompts::default())
            .await
            .unwrap();

        let history = vec![ChatTurn::new("What does the borrow checker do?", "Ownership.")];
        let answer = chain.ask("And the other topic?", &history).await.unwrap();
        assert_eq!(answer, "Futures.");

        let requests = model.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        let condense = &requests[0][0].content;
        assert!(condense.contains("Human: What does the borrow checker do?\nAssistant: Ownership."));
        assert!(condense.contains("Follow Up Input: And the other topic?"));

        let qa = &requests[1];
        assert!(qa[0].content.contains("Async functions return futures."));
        assert_eq!(qa[1], ChatMessage::user("What do async functions return?"));
    }

    #[tokio::test]
    async fn test_llm_failure_is_query_failure() {
        let model = Arc::new(ScriptedModel::new(vec![Err(TubeQaError::OpenAI(
            "rate limited".to_string(),
        ))]));
        let chain = QaChain::new(retriever().await, model, Prompts::default())
            .await
            .unwrap();

        match chain.ask("borrow?", &[]).await {
            Err(TubeQaError::QueryFailed(cause)) => assert!(cause.contains("rate limited")),
            other => panic!("expected QueryFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_index_is_unavailable() {
        let store: Arc<dyn VectorStore> = Arc::new(MemoryVectorStore::new());
        let retriever = Retriever::new(store, Arc::new(KeywordEmbedder));
        let model = Arc::new(ScriptedModel::new(Vec::new()));

        let result = QaChain::new(retriever, model, Prompts::default()).await;
        assert!(matches!(result, Err(TubeQaError::QaChainUnavailable(_))));
    }
}
