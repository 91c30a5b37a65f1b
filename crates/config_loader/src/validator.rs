//! 配置校验模块
//!
//! 校验规则：
//! - gateway_id 非空
//! - writer name 非空且唯一
//! - file writer 必须提供 path 参数
//! - filter 列表不能包含空字符串

use std::collections::HashSet;

use contracts::{ContractError, GatewayBlueprint, WriterType};

/// 校验 GatewayBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &GatewayBlueprint) -> Result<(), ContractError> {
    validate_gateway_id(blueprint)?;
    validate_writer_names(blueprint)?;
    validate_writer_params(blueprint)?;
    validate_filters(blueprint)?;
    Ok(())
}

fn validate_gateway_id(blueprint: &GatewayBlueprint) -> Result<(), ContractError> {
    if blueprint.gateway_id.trim().is_empty() {
        return Err(ContractError::config_validation(
            "gateway_id",
            "gateway id cannot be empty",
        ));
    }
    Ok(())
}

/// 校验 writer name 唯一性
fn validate_writer_names(blueprint: &GatewayBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, writer) in blueprint.writers.iter().enumerate() {
        if writer.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("writers[{}].name", idx),
                "writer name cannot be empty",
            ));
        }
        if !seen.insert(writer.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("writers[name={}]", writer.name),
                "duplicate writer name",
            ));
        }
    }
    Ok(())
}

/// 校验类型特定参数
fn validate_writer_params(blueprint: &GatewayBlueprint) -> Result<(), ContractError> {
    for writer in &blueprint.writers {
        if writer.writer_type == WriterType::File
            && writer.params.get("path").is_none_or(|p| p.is_empty())
        {
            return Err(ContractError::config_validation(
                format!("writers[{}].params.path", writer.name),
                "file writer requires a non-empty 'path'",
            ));
        }
    }
    Ok(())
}

fn validate_filters(blueprint: &GatewayBlueprint) -> Result<(), ContractError> {
    for writer in &blueprint.writers {
        let Some(filter) = &writer.filter else {
            continue;
        };
        if filter.include.iter().chain(&filter.exclude).any(String::is_empty) {
            return Err(ContractError::config_validation(
                format!("writers[{}].filter", writer.name),
                "filter types cannot be empty strings",
            ));
        }
    }
    Ok(())
}
