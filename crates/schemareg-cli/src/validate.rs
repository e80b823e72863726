//! # Validate Subcommand
//!
//! Validates one document against a stored schema without a server. YAML
//! documents (`.yaml`/`.yml`) are converted to JSON first; everything else
//! is parsed as JSON. Null members are stripped exactly as over HTTP.
//!
//! Exit codes: 0 conforming, 2 non-conforming, 1 on any other failure.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Args;
use schemareg_core::SchemaId;
use schemareg_schema::Validation;
use serde_json::Value;

use crate::StoreArgs;

/// Exit code for a document that does not conform.
pub const EXIT_NONCONFORMING: u8 = 2;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Identifier of the schema to validate against.
    pub id: String,

    /// Document to validate (JSON, or YAML by extension).
    pub file: PathBuf,
}

pub fn run_validate(args: &ValidateArgs) -> anyhow::Result<u8> {
    let id = SchemaId::parse(args.id.as_str())?;
    let document = load_document(&args.file)?;
    let (_, store) = args.store.open()?;

    match store.validate_value(&id, document)? {
        Validation::Valid => {
            println!("OK: {} conforms to {id}", args.file.display());
            Ok(0)
        }
        Validation::Invalid(violations) => {
            println!(
                "FAIL: {} does not conform to {id} ({} violation(s))",
                args.file.display(),
                violations.len()
            );
            for violation in violations.violations() {
                println!("  - {violation}");
            }
            Ok(EXIT_NONCONFORMING)
        }
    }
}

/// Read a JSON or YAML document from disk.
pub fn load_document(path: &Path) -> anyhow::Result<Value> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    if is_yaml {
        let yaml: serde_yaml::Value = serde_yaml::from_slice(&bytes)
            .with_context(|| format!("invalid YAML in {}", path.display()))?;
        yaml_to_json_value(&yaml).with_context(|| format!("cannot convert {}", path.display()))
    } else {
        serde_json::from_slice(&bytes).with_context(|| format!("invalid JSON in {}", path.display()))
    }
}

/// Convert a YAML value to the JSON data model. YAML tags are dropped;
/// non-scalar mapping keys are rejected.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> anyhow::Result<Value> {
    Ok(match yaml {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(*b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else if let Some(f) = n.as_f64() {
                match serde_json::Number::from_f64(f) {
                    Some(n) => Value::Number(n),
                    None => bail!("cannot represent {f} in JSON"),
                }
            } else {
                bail!("unsupported YAML number: {n:?}")
            }
        }
        serde_yaml::Value::String(s) => Value::String(s.clone()),
        serde_yaml::Value::Sequence(seq) => Value::Array(
            seq.iter()
                .map(yaml_to_json_value)
                .collect::<anyhow::Result<_>>()?,
        ),
        serde_yaml::Value::Mapping(map) => {
            let mut object = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => bail!("unsupported YAML mapping key: {other:?}"),
                };
                object.insert(key, yaml_to_json_value(v)?);
            }
            Value::Object(object)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TRANSFER: &str = r#"{"type": "object", "properties": {"source": {"type": "string"}, "timeout": {"type": "integer"}}, "required": ["source"]}"#;

    fn setup() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("schemas")).unwrap();
        std::fs::write(tmp.path().join("schemas").join("TRANSFER"), TRANSFER).unwrap();
        tmp
    }

    fn args(tmp: &tempfile::TempDir, file: &str) -> ValidateArgs {
        ValidateArgs {
            store: StoreArgs {
                dir: Some(tmp.path().join("schemas")),
                ..StoreArgs::default()
            },
            id: "TRANSFER".to_string(),
            file: tmp.path().join(file),
        }
    }

    #[test]
    fn yaml_document_conforms() {
        let tmp = setup();
        std::fs::write(tmp.path().join("doc.yaml"), "source: /a\ntimeout: 30\n").unwrap();
        assert_eq!(run_validate(&args(&tmp, "doc.yaml")).unwrap(), 0);
    }

    #[test]
    fn null_members_are_stripped() {
        let tmp = setup();
        std::fs::write(tmp.path().join("doc.json"), r#"{"source": "/a", "timeout": null}"#)
            .unwrap();
        assert_eq!(run_validate(&args(&tmp, "doc.json")).unwrap(), 0);
    }

    #[test]
    fn nonconforming_exits_2() {
        let tmp = setup();
        std::fs::write(tmp.path().join("doc.json"), r#"{"timeout": "soon"}"#).unwrap();
        assert_eq!(
            run_validate(&args(&tmp, "doc.json")).unwrap(),
            EXIT_NONCONFORMING
        );
    }

    #[test]
    fn unknown_schema_is_an_error() {
        let tmp = setup();
        std::fs::write(tmp.path().join("doc.json"), "{}").unwrap();
        let mut a = args(&tmp, "doc.json");
        a.id = "MISSING".to_string();
        assert!(run_validate(&a).is_err());
    }

    #[test]
    fn default_draft_governs_schemas_without_dollar_schema() {
        let tmp = setup();
        std::fs::write(
            tmp.path().join("schemas").join("PAIR"),
            r#"{"type": "array", "items": [{"type": "string"}, {"type": "integer"}]}"#,
        )
        .unwrap();
        std::fs::write(tmp.path().join("doc.json"), r#"["a", "b"]"#).unwrap();

        let mut a = args(&tmp, "doc.json");
        a.id = "PAIR".to_string();
        a.store.default_draft = Some(schemareg_schema::DraftVersion::Draft7);
        assert_eq!(run_validate(&a).unwrap(), EXIT_NONCONFORMING);
    }

    #[test]
    fn yaml_conversion() {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str("a: 1\nb: [true, null, 2.5]\n3: x\n").unwrap();
        assert_eq!(
            yaml_to_json_value(&yaml).unwrap(),
            json!({"a": 1, "b": [true, null, 2.5], "3": "x"})
        );
    }
}
