//! Per-field resolution options and the registry that indexes them.

use std::collections::HashMap;

use crate::descriptor::Descriptor;
use crate::error::SchemaError;

/// How a single field is matched against argv.
///
/// The default is an optional flag spelled `--<field name>` that may be given
/// any number of times.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOptions {
    /// Replaces the derived name. For flags this is the full spelling
    /// including any prefix (e.g. `--new-flag`).
    pub display_name: Option<String>,
    pub disallow_multiflag: bool,
    pub required: bool,
    pub positional: bool,
}

static DEFAULT_OPTIONS: FieldOptions = FieldOptions {
    display_name: None,
    disallow_multiflag: false,
    required: false,
    positional: false,
};

impl FieldOptions {
    pub fn positional() -> Self {
        Self {
            positional: true,
            ..Self::default()
        }
    }

    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn disallow_multiflag(mut self) -> Self {
        self.disallow_multiflag = true;
        self
    }

    /// The exact token that selects this field as a flag.
    pub fn flag_spelling(&self, field_name: &str) -> String {
        match &self.display_name {
            Some(name) => name.clone(),
            None => format!("--{field_name}"),
        }
    }

    /// The name shown for this field in usage text.
    pub fn display_name<'a>(&'a self, field_name: &'a str) -> &'a str {
        self.display_name.as_deref().unwrap_or(field_name)
    }
}

/// Field name -> options, built once per parse from the descriptor list.
#[derive(Debug, Clone, Default)]
pub struct Registry<'a> {
    options: HashMap<&'a str, FieldOptions>,
    positional_slots: usize,
}

impl<'a> Registry<'a> {
    /// Index the options descriptors of `descriptors`.
    ///
    /// Every options descriptor must name a data field, at most once. Data
    /// field names and resolved flag spellings must be unique.
    pub fn build(descriptors: &[Descriptor<'a>]) -> Result<Self, SchemaError> {
        let mut fields: Vec<&'a str> = Vec::new();
        for d in descriptors {
            if let Descriptor::Field(field) = d {
                if fields.contains(&field.name) {
                    return Err(SchemaError::DuplicateField {
                        name: field.name.to_string(),
                    });
                }
                fields.push(field.name);
            }
        }

        let mut options: HashMap<&'a str, FieldOptions> = HashMap::new();
        for d in descriptors {
            let Descriptor::Options { target, options: opts } = d else {
                continue;
            };
            if !fields.contains(target) {
                return Err(SchemaError::UnknownTarget {
                    target: target.to_string(),
                });
            }
            if options.insert(*target, opts.clone()).is_some() {
                return Err(SchemaError::DuplicateOptions {
                    target: target.to_string(),
                });
            }
        }

        let registry = Self {
            positional_slots: options.values().filter(|o| o.positional).count(),
            options,
        };

        let mut spellings: HashMap<String, &'a str> = HashMap::new();
        for &name in &fields {
            let opts = registry.get(name);
            if opts.positional {
                continue;
            }
            let spelling = opts.flag_spelling(name);
            if let Some(first) = spellings.insert(spelling.clone(), name) {
                return Err(SchemaError::DuplicateFlag {
                    spelling,
                    first: first.to_string(),
                    second: name.to_string(),
                });
            }
        }

        Ok(registry)
    }

    /// Options for `name`, or the defaults when none were declared.
    pub fn get(&self, name: &str) -> &FieldOptions {
        self.options.get(name).unwrap_or(&DEFAULT_OPTIONS)
    }

    /// Number of fields that must be filled by position.
    pub fn positional_slots(&self) -> usize {
        self.positional_slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spelling_defaults_to_double_dash_name() {
        let opts = FieldOptions::default();
        assert_eq!(opts.flag_spelling("flag"), "--flag");
        assert_eq!(opts.display_name("flag"), "flag");

        let opts = FieldOptions::default().rename("--new-flag");
        assert_eq!(opts.flag_spelling("flag"), "--new-flag");
        assert_eq!(opts.display_name("flag"), "--new-flag");
    }

    #[test]
    fn registry_keys_options_by_field() {
        let mut a = 0i32;
        let mut b = 0i32;
        let descriptors = vec![
            Descriptor::field("a", &mut a),
            Descriptor::options("a", FieldOptions::positional()),
            Descriptor::field("b", &mut b),
        ];
        let registry = Registry::build(&descriptors).unwrap();
        assert!(registry.get("a").positional);
        assert_eq!(registry.get("b"), &FieldOptions::default());
        assert_eq!(registry.positional_slots(), 1);
    }

    #[test]
    fn dangling_options_are_a_schema_error() {
        let mut a = 0i32;
        let descriptors = vec![
            Descriptor::field("a", &mut a),
            Descriptor::options("missing", FieldOptions::positional()),
        ];
        assert_eq!(
            Registry::build(&descriptors).unwrap_err(),
            SchemaError::UnknownTarget {
                target: "missing".to_string()
            }
        );
    }

    #[test]
    fn repeated_options_are_a_schema_error() {
        let mut a = 0i32;
        let descriptors = vec![
            Descriptor::field("a", &mut a),
            Descriptor::options("a", FieldOptions::positional()),
            Descriptor::options("a", FieldOptions::default().required()),
        ];
        assert!(matches!(
            Registry::build(&descriptors),
            Err(SchemaError::DuplicateOptions { .. })
        ));
    }

    #[test]
    fn colliding_flag_spellings_are_a_schema_error() {
        let mut a = 0i32;
        let mut b = 0i32;
        let descriptors = vec![
            Descriptor::field("a", &mut a),
            Descriptor::options("a", FieldOptions::default().rename("--b")),
            Descriptor::field("b", &mut b),
        ];
        assert_eq!(
            Registry::build(&descriptors).unwrap_err(),
            SchemaError::DuplicateFlag {
                spelling: "--b".to_string(),
                first: "a".to_string(),
                second: "b".to_string(),
            }
        );
    }

    #[test]
    fn positionals_may_share_a_display_name_with_flags() {
        let mut a = 0i32;
        let mut b = 0i32;
        let descriptors = vec![
            Descriptor::field("a", &mut a),
            Descriptor::options("a", FieldOptions::positional().rename("--b")),
            Descriptor::field("b", &mut b),
        ];
        assert!(Registry::build(&descriptors).is_ok());
    }
}
