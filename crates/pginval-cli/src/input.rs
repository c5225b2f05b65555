use std::collections::BTreeSet;
use std::io::Read;
use std::path::PathBuf;

/// One SQL input and where it came from.
#[derive(Debug, Clone)]
pub struct SqlSource {
    pub name: String,
    pub sql: String,
}

/// Read every file named by `patterns`, or stdin when there are none.
pub fn read_sources(patterns: &[String]) -> anyhow::Result<Vec<SqlSource>> {
    if patterns.is_empty() {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| anyhow::anyhow!("failed to read stdin: {e}"))?;

        if buf.trim().is_empty() {
            anyhow::bail!("no SQL provided (pass files or pipe SQL to stdin)");
        }
        return Ok(vec![SqlSource {
            name: "stdin".to_string(),
            sql: buf,
        }]);
    }

    expand_patterns(patterns)?
        .into_iter()
        .map(|path| {
            let sql = std::fs::read_to_string(&path)
                .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
            Ok(SqlSource {
                name: path.display().to_string(),
                sql,
            })
        })
        .collect()
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Plain paths are kept in argument order; glob matches are sorted.
fn expand_patterns(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    let mut seen: BTreeSet<PathBuf> = BTreeSet::new();

    for p in patterns {
        if !is_glob(p) {
            let path = PathBuf::from(p);
            if seen.insert(path.clone()) {
                files.push(path);
            }
            continue;
        }

        let mut matched: BTreeSet<PathBuf> = BTreeSet::new();
        for entry in glob::glob(p).map_err(|e| anyhow::anyhow!("invalid glob {p}: {e}"))? {
            let path = entry.map_err(|e| anyhow::anyhow!("glob error for {p}: {e}"))?;
            if path.is_file() {
                matched.insert(path);
            }
        }

        if matched.is_empty() {
            anyhow::bail!("glob pattern matched no files: {p}");
        }
        for path in matched {
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_glob_patterns() {
        assert!(is_glob("migrations/*.sql"));
        assert!(is_glob("db/2024-0?.sql"));
        assert!(is_glob("db/[ab].sql"));
        assert!(!is_glob("schema.sql"));
    }

    #[test]
    fn plain_paths_keep_order_and_dedup() {
        let files = expand_patterns(&[
            "b.sql".to_string(),
            "a.sql".to_string(),
            "b.sql".to_string(),
        ])
        .unwrap();
        assert_eq!(files, vec![PathBuf::from("b.sql"), PathBuf::from("a.sql")]);
    }

    #[test]
    fn glob_without_matches_is_an_error() {
        let err = expand_patterns(&["/nonexistent-pginval-dir/*.sql".to_string()]).unwrap_err();
        assert!(err.to_string().contains("matched no files"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_sources(&["/nonexistent-pginval-dir/x.sql".to_string()]).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
