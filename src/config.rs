use std::str::FromStr;

/// LLM 服务提供方
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LlmProvider {
    /// 兼容 OpenAI API 的服务
    OpenAi,
    /// 本地 Ollama 服务
    Ollama,
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(LlmProvider::OpenAi),
            "ollama" => Ok(LlmProvider::Ollama),
            other => Err(format!("未知的 LLM 提供方: {}", other)),
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// SQLite 题库文件路径
    pub database_path: String,
    /// 生成的试卷 PDF 存放目录
    pub output_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- LLM 配置 ---
    pub llm_provider: LlmProvider,
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub ollama_base_url: String,
    pub llm_max_tokens: u32,
    pub llm_temperature: f32,
    // --- 出题配置 ---
    /// 每个单元生成的 4 分题数量
    pub four_mark_per_unit: usize,
    /// 每个单元生成的 6 分题数量
    pub six_mark_per_unit: usize,
    // --- 组卷配置 ---
    /// 批量组卷时生成的试卷份数
    pub paper_count: usize,
    /// 同时渲染的 PDF 数量
    pub max_concurrent_renders: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "data/questions.db".to_string(),
            output_dir: "uploads".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            llm_provider: LlmProvider::Ollama,
            llm_api_key: String::new(),
            llm_api_base_url: "http://localhost:11434/v1".to_string(),
            llm_model_name: "llama3.1".to_string(),
            ollama_base_url: "http://localhost:11434".to_string(),
            llm_max_tokens: 4096,
            llm_temperature: 0.3,
            four_mark_per_unit: 3,
            six_mark_per_unit: 3,
            paper_count: 3,
            max_concurrent_renders: 4,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取配置，解析失败的项回退到默认值
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        Self {
            database_path: lookup("DATABASE_PATH").unwrap_or(default.database_path),
            output_dir: lookup("OUTPUT_DIR").unwrap_or(default.output_dir),
            verbose_logging: lookup("VERBOSE_LOGGING").and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: lookup("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            llm_provider: lookup("LLM_PROVIDER").and_then(|v| v.parse().ok()).unwrap_or(default.llm_provider),
            llm_api_key: lookup("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: lookup("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: lookup("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            ollama_base_url: lookup("OLLAMA_BASE_URL").unwrap_or(default.ollama_base_url),
            llm_max_tokens: lookup("LLM_MAX_TOKENS").and_then(|v| v.parse().ok()).unwrap_or(default.llm_max_tokens),
            llm_temperature: lookup("LLM_TEMPERATURE").and_then(|v| v.parse().ok()).unwrap_or(default.llm_temperature),
            four_mark_per_unit: lookup("FOUR_MARK_PER_UNIT").and_then(|v| v.parse().ok()).unwrap_or(default.four_mark_per_unit),
            six_mark_per_unit: lookup("SIX_MARK_PER_UNIT").and_then(|v| v.parse().ok()).unwrap_or(default.six_mark_per_unit),
            paper_count: lookup("PAPER_COUNT").and_then(|v| v.parse().ok()).unwrap_or(default.paper_count),
            max_concurrent_renders: lookup("MAX_CONCURRENT_RENDERS")
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(default.max_concurrent_renders),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_lookup_overrides_and_falls_back() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_PATH", "/tmp/q.db"),
            ("LLM_PROVIDER", "OpenAI"),
            ("PAPER_COUNT", "5"),
            ("LLM_MAX_TOKENS", "not-a-number"),
            ("MAX_CONCURRENT_RENDERS", "0"),
        ]);
        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.database_path, "/tmp/q.db");
        assert_eq!(config.llm_provider, LlmProvider::OpenAi);
        assert_eq!(config.paper_count, 5);
        // 解析失败回退默认值
        assert_eq!(config.llm_max_tokens, 4096);
        assert_eq!(config.max_concurrent_renders, 4);
        assert_eq!(config.output_dir, "uploads");
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        assert!("bedrock".parse::<LlmProvider>().is_err());
        assert_eq!(" ollama ".parse::<LlmProvider>(), Ok(LlmProvider::Ollama));
    }
}
