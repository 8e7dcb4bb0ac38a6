use crate::utils::error::{PipelineError, Result};
use std::path::{Component, Path};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: &str, reason: impl Into<String>) -> PipelineError {
    PipelineError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// 資料目錄：不可為空、不可含 NUL
pub fn validate_data_dir(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field_name, path, "Data directory cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }
    Ok(())
}

/// 相對於資料目錄的檔名，副檔名比對不分大小寫
pub fn validate_table_file(field_name: &str, file: &str, extension: &str) -> Result<()> {
    validate_data_dir(field_name, file)?;

    match Path::new(file).extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case(extension) => Ok(()),
        Some(ext) => Err(invalid(
            field_name,
            file,
            format!("Expected a .{} file, got .{}", extension, ext),
        )),
        None => Err(invalid(
            field_name,
            file,
            format!("Expected a .{} file name", extension),
        )),
    }
}

fn normalized(file: &str) -> Vec<Component<'_>> {
    Path::new(file)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// 寫出的檔案不可覆蓋任何來源表
pub fn validate_output_target(field_name: &str, output: &str, inputs: &[&str]) -> Result<()> {
    let target = normalized(output);
    if inputs.iter().any(|input| normalized(input) == target) {
        return Err(invalid(
            field_name,
            output,
            "Output would overwrite one of the source tables",
        ));
    }
    Ok(())
}

pub fn validate_threshold(field_name: &str, threshold: i64) -> Result<()> {
    if threshold < 0 {
        return Err(invalid(
            field_name,
            &threshold.to_string(),
            "Points difference threshold must be zero or positive",
        ));
    }
    Ok(())
}

pub fn validate_label(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field_name, value, "Value cannot be empty or whitespace-only"));
    }
    Ok(())
}

pub fn require<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| PipelineError::MissingConfigError {
        field: field_name.to_string(),
    })
}
