//! LLM 服务 - 业务能力层
//!
//! 只负责"把提示词发给大模型、拿回文本"，不关心题目格式
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 调用兼容 OpenAI API 的服务
//! - 使用 `reqwest` 调用本地 Ollama 的 `/api/generate`
//! - 通过 `TextGenerator` 抽象，流程层可以注入测试用的生成器

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use tracing::{debug, warn};

use crate::config::{Config, LlmProvider};
use crate::error::{AppError, AppResult};
use crate::services::ollama_client::OllamaClient;

/// 文本生成能力
#[allow(async_fn_in_trait)]
pub trait TextGenerator {
    /// 提供方名称（用于日志和错误信息）
    fn provider(&self) -> &str;

    /// 发送系统消息和用户消息，返回生成的文本
    async fn generate(&self, system_message: &str, user_message: &str) -> AppResult<String>;
}

/// LLM 服务（兼容 OpenAI API）
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    max_tokens: u32,
    temperature: f32,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            max_tokens: config.llm_max_tokens,
            temperature: config.llm_temperature,
        }
    }

    async fn send_to_llm(&self, system_message: &str, user_message: &str) -> anyhow::Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_message)
            .build()?;
        messages.push(ChatCompletionRequestMessage::System(system_msg));

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            anyhow::anyhow!("LLM API 调用失败: {}", e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("LLM 返回内容为空"))?;

        Ok(content.trim().to_string())
    }
}

impl TextGenerator for LlmService {
    fn provider(&self) -> &str {
        &self.model_name
    }

    async fn generate(&self, system_message: &str, user_message: &str) -> AppResult<String> {
        self.send_to_llm(system_message, user_message)
            .await
            .map_err(|e| AppError::upstream(format!("openai/{}", self.model_name), e.to_string()))
    }
}

/// 根据配置选择的生成器
pub enum Generator {
    OpenAi(LlmService),
    Ollama(OllamaClient),
}

impl Generator {
    pub fn from_config(config: &Config) -> Self {
        match config.llm_provider {
            LlmProvider::OpenAi => Generator::OpenAi(LlmService::new(config)),
            LlmProvider::Ollama => Generator::Ollama(OllamaClient::new(config)),
        }
    }
}

impl TextGenerator for Generator {
    fn provider(&self) -> &str {
        match self {
            Generator::OpenAi(service) => service.provider(),
            Generator::Ollama(client) => client.provider(),
        }
    }

    async fn generate(&self, system_message: &str, user_message: &str) -> AppResult<String> {
        match self {
            Generator::OpenAi(service) => service.generate(system_message, user_message).await,
            Generator::Ollama(client) => client.generate(system_message, user_message).await,
        }
    }
}
