//! Rewrite the default import alias across a generated project

use crate::error::{Result, ScaffoldError};
use std::future::Future;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;
use walkdir::WalkDir;

/// Upper bound on files being read or written at the same time
pub const MAX_CONCURRENT_REWRITES: usize = 8;

/// Prefix every shipped template imports with
pub const DEFAULT_ALIAS_PREFIX: &str = "@/";

const PATH_CONFIG_FILES: [&str; 2] = ["tsconfig.json", "jsconfig.json"];
const VCS_DIR: &str = ".git";
const FONTS_DIR: &str = "fonts";
const FAVICON: &str = "favicon.ico";

/// Strip wildcards from an alias pattern: `~/*` becomes `~/`
pub fn alias_prefix(import_alias: &str) -> String {
    import_alias.replace('*', "")
}

/// Whether a project-relative path must be left untouched
///
/// Covers the already-patched path configs at the root, version-control
/// metadata, anything under a `fonts` directory, and the favicon binary.
pub fn is_excluded(relative: &Path) -> bool {
    let mut components = relative.components().filter_map(|c| match c {
        Component::Normal(name) => name.to_str(),
        _ => None,
    });

    let Some(first) = components.next() else {
        return true;
    };
    let rest: Vec<&str> = components.collect();

    if rest.is_empty() && PATH_CONFIG_FILES.contains(&first) {
        return true;
    }
    if first == VCS_DIR {
        return true;
    }

    let file_name = rest.last().copied().unwrap_or(first);
    if file_name == FAVICON {
        return true;
    }

    // Any directory on the way to the file named `fonts`
    std::iter::once(first)
        .chain(rest.iter().copied())
        .take(rest.len())
        .any(|dir| dir == FONTS_DIR)
}

/// List every file under `root` eligible for rewriting, dotfiles included
pub fn eligible_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| entry.depth() != 1 || entry.file_name() != VCS_DIR);

    for entry in walker {
        let entry = entry.map_err(|e| ScaffoldError::AliasRewrite {
            path: root.to_path_buf(),
            source: io::Error::from(e),
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if !is_excluded(relative) {
            files.push(entry.path().to_path_buf());
        }
    }

    Ok(files)
}

/// Run `task` over every item with at most `limit` in flight
///
/// The dispatcher blocks on a permit before spawning each task, so no more
/// than `limit` tasks exist at once. The first failure is returned and the
/// rest are aborted; work that already finished stays done.
pub async fn run_bounded<T, F, Fut, R>(items: Vec<T>, limit: usize, task: F) -> Result<Vec<R>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R>> + Send + 'static,
    R: Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let mut set = JoinSet::new();
    let mut results = Vec::with_capacity(items.len());

    for item in items {
        let permit = semaphore.clone().acquire_owned().await?;

        // Surface failures from tasks that finished while we waited
        while let Some(joined) = set.try_join_next() {
            results.push(joined??);
        }

        let fut = task(item);
        set.spawn(async move {
            let result = fut.await;
            drop(permit);
            result
        });
    }

    while let Some(joined) = set.join_next().await {
        results.push(joined??);
    }

    Ok(results)
}

/// Replace every `from` with `to`, or `None` when `from` never occurs
fn replace_bytes(haystack: &[u8], from: &[u8], to: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(haystack.len());
    let mut rest = haystack;
    let mut replaced = false;

    while let Some(pos) = rest.windows(from.len()).position(|window| window == from) {
        out.extend_from_slice(&rest[..pos]);
        out.extend_from_slice(to);
        rest = &rest[pos + from.len()..];
        replaced = true;
    }

    if !replaced {
        return None;
    }
    out.extend_from_slice(rest);
    Some(out)
}

async fn rewrite_file(path: PathBuf, prefix: Arc<str>) -> Result<bool> {
    let to_error = |path: &Path, source: io::Error| ScaffoldError::AliasRewrite {
        path: path.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(&path).await.map_err(|e| to_error(&path, e))?;
    if !metadata.is_file() {
        return Ok(false);
    }

    let content = fs::read(&path).await.map_err(|e| to_error(&path, e))?;
    let from = DEFAULT_ALIAS_PREFIX.as_bytes();
    let Some(updated) = replace_bytes(&content, from, prefix.as_bytes()) else {
        return Ok(false);
    };

    fs::write(&path, updated)
        .await
        .map_err(|e| to_error(&path, e))?;
    Ok(true)
}

/// Replace `@/` with the requested alias prefix in every eligible file
///
/// Returns how many files changed. Contents are matched as raw bytes, so
/// files that are not UTF-8 pass through unless they contain `@/`.
pub async fn rewrite_import_aliases(root: &Path, import_alias: &str) -> Result<usize> {
    let root_owned = root.to_path_buf();
    let files = tokio::task::spawn_blocking(move || eligible_files(&root_owned)).await??;
    let prefix: Arc<str> = Arc::from(alias_prefix(import_alias));

    debug!(files = files.len(), prefix = %prefix, "rewriting import aliases");

    let changed = run_bounded(files, MAX_CONCURRENT_REWRITES, |path| {
        rewrite_file(path, Arc::clone(&prefix))
    })
    .await?;

    Ok(changed.into_iter().filter(|changed| *changed).count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &[u8]) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_alias_prefix() {
        assert_eq!(alias_prefix("~/*"), "~/");
        assert_eq!(alias_prefix("@acme/*"), "@acme/");
    }

    #[test]
    fn test_exclusions() {
        assert!(is_excluded(Path::new("tsconfig.json")));
        assert!(is_excluded(Path::new("jsconfig.json")));
        assert!(is_excluded(Path::new(".git/config")));
        assert!(is_excluded(Path::new(".git/refs/heads/main")));
        assert!(is_excluded(Path::new("app/fonts/GeistVF.woff")));
        assert!(is_excluded(Path::new("fonts/inter.woff2")));
        assert!(is_excluded(Path::new("app/favicon.ico")));
        assert!(is_excluded(Path::new("favicon.ico")));

        assert!(!is_excluded(Path::new("app/page.tsx")));
        assert!(!is_excluded(Path::new(".gitignore")));
        assert!(!is_excluded(Path::new("packages/web/tsconfig.json")));
        assert!(!is_excluded(Path::new("app/fonts.ts")));
    }

    #[tokio::test]
    async fn test_rewrites_text_and_skips_binary_favicon() {
        let dir = TempDir::new().unwrap();
        let favicon: &[u8] = &[0x00, 0x00, 0x01, 0x00, 0xff, 0xfe, b'@', b'/', 0xc3, 0x28];
        write(dir.path(), "app/page.tsx", b"import { Button } from \"@/components/button\";\n");
        write(dir.path(), "app/favicon.ico", favicon);
        write(dir.path(), "app/fonts/font.woff", &[0xff, b'@', b'/', 0x00]);
        write(dir.path(), "tsconfig.json", b"{ \"paths\": { \"@/*\": [\"./*\"] } }");
        write(dir.path(), ".git/HEAD", b"ref: refs/heads/@/main\n");

        let changed = rewrite_import_aliases(dir.path(), "~/*").await.unwrap();
        assert_eq!(changed, 1);

        let page = std::fs::read_to_string(dir.path().join("app/page.tsx")).unwrap();
        assert_eq!(page, "import { Button } from \"~/components/button\";\n");
        assert_eq!(std::fs::read(dir.path().join("app/favicon.ico")).unwrap(), favicon);
        assert!(std::fs::read_to_string(dir.path().join("tsconfig.json"))
            .unwrap()
            .contains("@/*"));
        assert!(std::fs::read_to_string(dir.path().join(".git/HEAD"))
            .unwrap()
            .contains("@/main"));
    }

    #[tokio::test]
    async fn test_replaces_every_occurrence() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "app/layout.tsx",
            b"import a from \"@/a\";\nimport b from \"@/b\";\n",
        );

        rewrite_import_aliases(dir.path(), "#/*").await.unwrap();

        let layout = std::fs::read_to_string(dir.path().join("app/layout.tsx")).unwrap();
        assert_eq!(layout, "import a from \"#/a\";\nimport b from \"#/b\";\n");
    }

    #[tokio::test]
    async fn test_binary_leftovers_pass_through() {
        let dir = TempDir::new().unwrap();
        let ds_store: &[u8] = &[0x00, 0x00, 0x00, 0x01, b'B', b'u', b'd', b'1', 0xff, 0xfe, 0x80];
        write(dir.path(), ".DS_Store", ds_store);
        write(dir.path(), "app/page.tsx", b"import x from \"@/x\";\n");

        let changed = rewrite_import_aliases(dir.path(), "~/*").await.unwrap();
        assert_eq!(changed, 1);
        assert_eq!(std::fs::read(dir.path().join(".DS_Store")).unwrap(), ds_store);
    }

    #[test]
    fn test_replace_bytes() {
        assert_eq!(replace_bytes(b"a@/b@/", b"@/", b"~/"), Some(b"a~/b~/".to_vec()));
        assert_eq!(
            replace_bytes(&[0xff, b'@', b'/', 0x80], b"@/", b"#/"),
            Some(vec![0xff, b'#', b'/', 0x80])
        );
        assert_eq!(replace_bytes(&[0xc3, 0x28], b"@/", b"~/"), None);
        assert_eq!(replace_bytes(b"", b"@/", b"~/"), None);
    }

    #[tokio::test]
    async fn test_closed_semaphore_is_an_error() {
        let semaphore = Arc::new(Semaphore::new(1));
        semaphore.close();
        let err: ScaffoldError = semaphore.acquire_owned().await.unwrap_err().into();
        assert!(matches!(err, ScaffoldError::Concurrency(_)));
    }

    #[tokio::test]
    async fn test_bounded_concurrency() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let items: Vec<usize> = (0..100).collect();
        let done = run_bounded(items, MAX_CONCURRENT_REWRITES, |_| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await
        .unwrap();

        assert_eq!(done.len(), 100);
        let peak = peak.load(Ordering::SeqCst);
        assert!(peak <= MAX_CONCURRENT_REWRITES, "peak was {peak}");
        assert!(peak > 1, "tasks never overlapped");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_bounded_concurrency_multi_thread() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        run_bounded((0..100).collect::<Vec<_>>(), MAX_CONCURRENT_REWRITES, |_| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(1)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await
        .unwrap();

        assert!(peak.load(Ordering::SeqCst) <= MAX_CONCURRENT_REWRITES);
    }

    #[tokio::test]
    async fn test_first_error_aborts() {
        let items: Vec<usize> = (0..20).collect();
        let err = run_bounded(items, 4, |i| async move {
            if i == 3 {
                Err(ScaffoldError::AliasRewrite {
                    path: PathBuf::from(format!("file-{i}")),
                    source: io::Error::new(io::ErrorKind::Other, "boom"),
                })
            } else {
                Ok(i)
            }
        })
        .await
        .unwrap_err();

        assert!(err.to_string().contains("file-3"));
    }
}
