use crate::cli::InitArgs;
use std::path::Path;

const TEMPLATE: &str = r#"version = "1"

# Project whose cache keys are invalidated. `--project` overrides it.
project_ref = "${PROJECT_REF}"

# Schema assumed when SQL does not name one.
default_schema = "public"

[output]
format = "table" # table | json
"#;

pub fn run(args: InitArgs) -> anyhow::Result<()> {
    write_template(&args.config)?;
    println!("wrote {}", args.config.display());
    Ok(())
}

fn write_template(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("refusing to overwrite existing file: {}", path.display());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!("failed to create directory {}: {e}", parent.display())
            })?;
        }
    }

    std::fs::write(path, TEMPLATE)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFile;

    #[test]
    fn template_parses() {
        // SAFETY: no other test reads PROJECT_REF.
        unsafe { std::env::set_var("PROJECT_REF", "template-test") };
        let file = ConfigFile::parse(TEMPLATE).unwrap();
        assert_eq!(file.default_schema.as_deref(), Some("public"));
    }

    #[test]
    fn refuses_to_overwrite() {
        let dir = std::env::temp_dir().join(format!("pginval-init-{}", std::process::id()));
        let path = dir.join("pginval.toml");
        let _ = std::fs::remove_dir_all(&dir);

        write_template(&path).unwrap();
        assert!(write_template(&path).is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
