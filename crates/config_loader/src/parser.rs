//! 配置解析模块
//!
//! 支持 TOML (主要) 和 JSON (可选) 格式。

use contracts::{ContractError, GatewayBlueprint};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// 解析 TOML 格式配置
pub fn parse_toml(content: &str) -> Result<GatewayBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 解析 JSON 格式配置
pub fn parse_json(content: &str) -> Result<GatewayBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<GatewayBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::WriterType;

    #[test]
    fn test_parse_toml_defaults() {
        let content = r#"
[[writers]]
name = "main"
writer_type = "tracing"
"#;
        let bp = parse_toml(content).unwrap();
        assert_eq!(bp.gateway_id, "log");
        assert_eq!(bp.writers.len(), 1);
        assert_eq!(bp.writers[0].writer_type, WriterType::Tracing);
        assert_eq!(bp.writers[0].logging.max_unwritten_logs, 0);
        assert_eq!(bp.writers[0].logging.write_period_secs, 60);
        assert!(bp.writers[0].filter.is_none());
    }

    #[test]
    fn test_parse_json_full() {
        let content = r#"{
            "gateway_id": "audit",
            "writers": [{
                "name": "file",
                "writer_type": "file",
                "max_unwritten_logs": 10,
                "write_period_secs": -1,
                "filter": { "exclude": ["debug"] },
                "params": { "path": "audit.log" }
            }]
        }"#;
        let bp = parse_json(content).unwrap();
        assert_eq!(bp.gateway_id, "audit");
        let writer = &bp.writers[0];
        assert_eq!(writer.logging.max_unwritten_logs, 10);
        assert_eq!(writer.logging.write_period(), None);
        assert_eq!(writer.filter.as_ref().unwrap().exclude, vec!["debug"]);
        assert_eq!(writer.params["path"], "audit.log");
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_unknown_writer_type_rejected() {
        let content = r#"
[[writers]]
name = "x"
writer_type = "kafka"
"#;
        assert!(parse_toml(content).is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("JSON"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
