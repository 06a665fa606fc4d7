use anyhow::{Context, Result, bail};
use argbind_schema::{CommandSchema, FieldSchema, SchemaArgs, ValueType};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SCHEMA_NAME: &str = "argbind.json";

/// Read and check a schema file.
pub fn load_schema(path: &Path) -> Result<CommandSchema> {
    if !path.exists() {
        bail!("schema not found: {}", path.display());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read schema: {}", path.display()))?;
    let schema = CommandSchema::from_json_str(&contents)
        .with_context(|| format!("failed to parse schema JSON: {}", path.display()))?;

    argbind::validate_schema(&mut SchemaArgs::new(schema.clone()))
        .with_context(|| format!("invalid schema: {}", path.display()))?;

    tracing::debug!("loaded schema '{}' with {} fields", schema.name, schema.fields.len());
    Ok(schema)
}

pub fn write_starter_schema(dir: &Path) -> Result<PathBuf> {
    let dest = dir.join(DEFAULT_SCHEMA_NAME);
    if dest.exists() {
        bail!("{DEFAULT_SCHEMA_NAME} already exists in {}", dir.display());
    }

    let name = dir
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "my-tool".to_string());
    let json = starter_schema(name).to_json_pretty();
    fs::write(&dest, json).with_context(|| format!("failed to write {}", dest.display()))?;
    Ok(dest)
}

fn starter_schema(name: String) -> CommandSchema {
    CommandSchema {
        name,
        help_args: None,
        extra_args_ok: Some(false),
        fields: vec![
            FieldSchema {
                name: "input".to_string(),
                positional: true,
                help: "file to read".to_string(),
                ..FieldSchema::default()
            },
            FieldSchema {
                name: "count".to_string(),
                value_type: ValueType::Uint,
                rename: Some("-n".to_string()),
                disallow_multiflag: true,
                ..FieldSchema::default()
            },
            FieldSchema {
                name: "tag".to_string(),
                multiple: true,
                ..FieldSchema::default()
            },
            FieldSchema {
                name: "verbose".to_string(),
                value_type: ValueType::Bool,
                ..FieldSchema::default()
            },
        ],
    }
}
