//! Configuration records described at runtime.
//!
//! A [`CommandSchema`] is the JSON twin of a `#[derive(Args)]` struct: an
//! ordered list of typed fields with their resolution options. Wrapping it in
//! [`SchemaArgs`] gives something `argbind` can resolve argv into, with the
//! results held as [`DynValue`]s.

use argbind::{Args, ArgsConfig, ArgValue, Descriptor, FieldOptions, Slot, ValueError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Scalar type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueType {
    Int,
    Uint,
    Float,
    Bool,
    #[default]
    String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type", default)]
    pub value_type: ValueType,
    #[serde(default)]
    pub positional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub disallow_multiflag: bool,
    /// Collect every occurrence into a list instead of keeping the last.
    #[serde(default)]
    pub multiple: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,
}

impl FieldSchema {
    pub fn options(&self) -> FieldOptions {
        FieldOptions {
            display_name: self.rename.clone(),
            disallow_multiflag: self.disallow_multiflag,
            required: self.required,
            positional: self.positional,
        }
    }

    /// `<name>` for positionals, the flag spelling otherwise.
    fn label(&self) -> String {
        let options = self.options();
        if options.positional {
            format!("<{}>", options.display_name(&self.name))
        } else {
            options.flag_spelling(&self.name)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct CommandSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_args: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_args_ok: Option<bool>,
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

impl CommandSchema {
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn to_json_pretty(&self) -> String {
        // Plain data with string keys; serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Parser settings, falling back to the `argbind` defaults.
    pub fn config(&self) -> ArgsConfig {
        let mut config = ArgsConfig::default();
        if let Some(help_args) = &self.help_args {
            config.help_args = help_args.clone();
        }
        if let Some(ok) = self.extra_args_ok {
            config.extra_args_ok = ok;
        }
        config
    }

    /// One aligned line per field that carries help text, under an
    /// `Arguments:` heading. Empty when no field has help.
    pub fn field_help(&self) -> String {
        let rows: Vec<(String, &str)> = self
            .fields
            .iter()
            .filter(|f| !f.help.is_empty())
            .map(|f| (f.label(), f.help.as_str()))
            .collect();
        let Some(width) = rows.iter().map(|(label, _)| label.len()).max() else {
            return String::new();
        };

        let mut out = String::from("Arguments:\n");
        for (label, help) in rows {
            out.push_str(&format!("  {label:<width$}  {help}\n"));
        }
        out
    }
}

/// A resolved field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DynValue {
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    String(String),
    List(Vec<DynValue>),
}

impl DynValue {
    fn parse(ty: ValueType, tokens: &[&str]) -> Result<(Self, usize), ValueError> {
        match ty {
            ValueType::Int => i64::parse_tokens(tokens).map(|(v, n)| (Self::Int(v), n)),
            ValueType::Uint => u64::parse_tokens(tokens).map(|(v, n)| (Self::Uint(v), n)),
            ValueType::Float => f64::parse_tokens(tokens).map(|(v, n)| (Self::Float(v), n)),
            ValueType::Bool => bool::parse_tokens(tokens).map(|(v, n)| (Self::Bool(v), n)),
            ValueType::String => String::parse_tokens(tokens).map(|(v, n)| (Self::String(v), n)),
        }
    }
}

struct DynSlot<'a> {
    ty: ValueType,
    multiple: bool,
    value: &'a mut Option<DynValue>,
}

impl Slot for DynSlot<'_> {
    fn store(&mut self, tokens: &[&str]) -> Result<usize, ValueError> {
        let (value, consumed) = DynValue::parse(self.ty, tokens)?;
        if !self.multiple {
            *self.value = Some(value);
            return Ok(consumed);
        }
        match &mut *self.value {
            Some(DynValue::List(items)) => items.push(value),
            slot => *slot = Some(DynValue::List(vec![value])),
        }
        Ok(consumed)
    }
}

/// A [`CommandSchema`] together with the values resolved into it.
#[derive(Debug, Clone)]
pub struct SchemaArgs {
    schema: CommandSchema,
    values: Vec<Option<DynValue>>,
}

impl SchemaArgs {
    pub fn new(schema: CommandSchema) -> Self {
        let values = vec![None; schema.fields.len()];
        Self { schema, values }
    }

    pub fn schema(&self) -> &CommandSchema {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<&DynValue> {
        let index = self.schema.fields.iter().position(|f| f.name == name)?;
        self.values[index].as_ref()
    }

    /// Field name -> value in declaration order; `None` for untouched fields.
    pub fn values(&self) -> IndexMap<&str, Option<&DynValue>> {
        self.schema
            .fields
            .iter()
            .zip(&self.values)
            .map(|(field, value)| (field.name.as_str(), value.as_ref()))
            .collect()
    }
}

impl Args for SchemaArgs {
    fn config(&self) -> ArgsConfig {
        self.schema.config()
    }

    fn descriptors(&mut self) -> Vec<Descriptor<'_>> {
        let mut out = Vec::with_capacity(self.schema.fields.len() * 2);
        for (field, value) in self.schema.fields.iter().zip(self.values.iter_mut()) {
            out.push(Descriptor::slot(
                &field.name,
                DynSlot {
                    ty: field.value_type,
                    multiple: field.multiple,
                    value,
                },
            ));
            let options = field.options();
            if options != FieldOptions::default() {
                out.push(Descriptor::options(&field.name, options));
            }
        }
        out
    }
}
