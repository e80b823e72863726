//! # Check Subcommand
//!
//! Loads a schema directory exactly as the server would and lists every
//! schema with its size and SHA-256 digest. Any file that fails to load
//! fails the command.

use anyhow::Context;
use clap::Args;
use schemareg_core::SchemaId;
use schemareg_schema::SchemaStore;
use sha2::{Digest, Sha256};

use crate::StoreArgs;

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}

/// One line of the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDigest {
    pub id: SchemaId,
    pub size: usize,
    pub sha256: String,
}

/// Digest every stored schema, in identifier order.
pub fn digest_store(store: &SchemaStore) -> anyhow::Result<Vec<SchemaDigest>> {
    let mut listing = Vec::with_capacity(store.len());
    for id in store.ids() {
        let bytes = store
            .get(&id)
            .with_context(|| format!("failed to read schema {id}"))?
            .with_context(|| format!("schema {id} disappeared during check"))?;
        let sha256 = Sha256::digest(&bytes)
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();
        listing.push(SchemaDigest {
            id,
            size: bytes.len(),
            sha256,
        });
    }
    Ok(listing)
}

pub fn run_check(args: &CheckArgs) -> anyhow::Result<u8> {
    let (config, store) = args.store.open()?;
    for entry in digest_store(&store)? {
        println!("{}\t{}\tsha256:{}", entry.id, entry.size, entry.sha256);
    }
    println!(
        "OK: {} schema(s) loaded from {}",
        store.len(),
        config.schema_dir.display()
    );
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::open_store;
    use schemareg_schema::DraftVersion;

    fn args(dir: &std::path::Path) -> CheckArgs {
        CheckArgs {
            store: StoreArgs {
                dir: Some(dir.to_path_buf()),
                ..StoreArgs::default()
            },
        }
    }

    #[test]
    fn lists_schemas_in_order_with_digests() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("b"), "{}").unwrap();
        std::fs::write(tmp.path().join("a"), "true").unwrap();

        let store = open_store(tmp.path(), DraftVersion::default()).unwrap();
        let listing = digest_store(&store).unwrap();

        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].id.as_str(), "a");
        assert_eq!(listing[0].size, 4);
        assert_eq!(
            listing[1].sha256,
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn broken_directory_fails() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("bad"), "{not json").unwrap();
        let err = run_check(&args(tmp.path())).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load schemas"));
    }

    #[test]
    fn draft7_directory_loads_with_default_draft() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("TUPLE"),
            r#"{"type": "array", "items": [{"type": "string"}]}"#,
        )
        .unwrap();

        assert!(run_check(&args(tmp.path())).is_err());

        let mut draft7 = args(tmp.path());
        draft7.store.default_draft = Some(DraftVersion::Draft7);
        assert_eq!(run_check(&draft7).unwrap(), 0);
    }

    #[test]
    fn default_draft_read_from_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        let schemas = tmp.path().join("schemas");
        std::fs::create_dir(&schemas).unwrap();
        std::fs::write(schemas.join("TUPLE"), r#"{"items": [{"type": "string"}]}"#).unwrap();
        let file = tmp.path().join("schemareg.yaml");
        std::fs::write(
            &file,
            format!("schema_dir: {}\ndefault_draft: draft7\n", schemas.display()),
        )
        .unwrap();

        let args = CheckArgs {
            store: StoreArgs {
                config: Some(file),
                ..StoreArgs::default()
            },
        };
        assert_eq!(run_check(&args).unwrap(), 0);
    }
}
