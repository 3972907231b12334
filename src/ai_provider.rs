use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    Claude,
    Codex,
    Gemini,
}

impl AiProvider {
    pub fn command_name(&self) -> &'static str {
        match self {
            AiProvider::Claude => "claude",
            AiProvider::Codex => "codex",
            AiProvider::Gemini => "gemini",
        }
    }

    /// 非対話モードでプロンプトを渡す引数
    pub fn prompt_args(&self, prompt: &str, model: Option<&str>) -> Vec<String> {
        let mut args = match self {
            AiProvider::Claude => vec![
                "-p".to_string(),
                prompt.to_string(),
                "--output-format".to_string(),
                "text".to_string(),
            ],
            AiProvider::Codex => vec!["exec".to_string(), prompt.to_string()],
            AiProvider::Gemini => vec!["-p".to_string(), prompt.to_string()],
        };
        if let Some(model) = model {
            args.push("--model".to_string());
            args.push(model.to_string());
        }
        args
    }
}

impl std::fmt::Display for AiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.command_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claude_args() {
        let args = AiProvider::Claude.prompt_args("hello", None);
        assert_eq!(args, vec!["-p", "hello", "--output-format", "text"]);
    }

    #[test]
    fn test_model_is_appended() {
        let args = AiProvider::Gemini.prompt_args("hello", Some("gemini-2.5-flash"));
        assert_eq!(args, vec!["-p", "hello", "--model", "gemini-2.5-flash"]);
    }

    #[test]
    fn test_codex_uses_exec() {
        let args = AiProvider::Codex.prompt_args("hello", None);
        assert_eq!(args[0], "exec");
    }
}
