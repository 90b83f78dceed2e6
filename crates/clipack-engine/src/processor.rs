use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::AsyncReadExt;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, warn};

use clipack_bundle::{FileRecord, ParseOptions, format_records, parse_with};
use clipack_selectors::FileFilter;
use clipack_utils::atomic_write::write_file_atomic;
use clipack_utils::error::{ClipackError, FileOperation, ValidationError};
use clipack_utils::logging::{log_file_event, log_operation_complete, operation_span};
use clipack_utils::paths::{SecurityOptions, SecurityVerdict, check_path_security, ensure_dir_all};

use crate::clipboard::{ClipboardTransport, SystemClipboard};
use crate::enumerate::list_files;
use crate::options::ProcessOptions;

const MODULE: &str = "processor";

fn join_error(e: tokio::task::JoinError) -> ClipackError {
    ClipackError::Unknown(format!("background task failed: {e}"))
}

/// Runs extract and pack with one set of options.
///
/// # Example
///
/// ```rust,no_run
/// use clipack_engine::{BundleProcessor, ProcessOptions};
///
/// # async fn demo() -> Result<(), clipack_utils::error::ClipackError> {
/// let processor = BundleProcessor::new(ProcessOptions {
///     output_dir: Some("out".into()),
///     ..ProcessOptions::default()
/// });
/// let records = processor.extract("// ./a.ts\n\nexport {};\n").await?;
/// assert_eq!(records[0].path, "a.ts");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BundleProcessor {
    options: ProcessOptions,
    parse_options: ParseOptions,
    filter: FileFilter,
    clipboard: Option<Arc<dyn ClipboardTransport>>,
}

impl std::fmt::Debug for BundleProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleProcessor")
            .field("options", &self.options)
            .field("parse_options", &self.parse_options)
            .field("filter", &self.filter)
            .field("clipboard", &self.clipboard.is_some())
            .finish()
    }
}

impl BundleProcessor {
    /// Processor with default parse options and the default file filter.
    #[must_use]
    pub fn new(options: ProcessOptions) -> Self {
        Self {
            options,
            parse_options: ParseOptions::default(),
            filter: FileFilter::default(),
            clipboard: None,
        }
    }

    #[must_use]
    pub fn with_parse_options(mut self, parse_options: ParseOptions) -> Self {
        self.parse_options = parse_options;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: FileFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Use `clipboard` instead of detecting the system clipboard.
    #[must_use]
    pub fn with_clipboard(mut self, clipboard: Arc<dyn ClipboardTransport>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    #[must_use]
    pub fn options(&self) -> &ProcessOptions {
        &self.options
    }

    fn clipboard(&self) -> Result<Arc<dyn ClipboardTransport>, ClipackError> {
        match &self.clipboard {
            Some(clipboard) => Ok(Arc::clone(clipboard)),
            None => Ok(Arc::new(SystemClipboard::detect()?)),
        }
    }

    /// Parse `text` and write each file under the output directory.
    ///
    /// Every path is checked before anything is written, so a bundle with
    /// one bad entry writes nothing. A dry run stops after the checks.
    /// Records are returned in bundle order.
    ///
    /// # Errors
    ///
    /// - `Validation` when no output directory is set
    /// - `Parse` for malformed bundle text
    /// - `Security` for traversal or a disallowed symlink
    /// - `FileOperation` when a directory or file cannot be written
    pub async fn extract(&self, text: &str) -> Result<Vec<FileRecord>, ClipackError> {
        let output_dir = self.options.require_output_dir()?.to_path_buf();
        let records = parse_with(text, self.parse_options)?;
        let dry_run = self.options.dry_run;
        let security = self.options.security_options();

        async move {
            let started = Instant::now();
            let records = tokio::task::spawn_blocking(move || {
                write_records(records, &output_dir, security, dry_run)
            })
            .await
            .map_err(join_error)??;

            log_operation_complete(MODULE, "extract", records.len(), started.elapsed().as_millis());
            Ok::<_, ClipackError>(records)
        }
        .instrument(operation_span(MODULE, "extract"))
        .await
    }

    /// Read every selected file under the input directory and format the bundle.
    ///
    /// Files are checked and read concurrently; the bundle keeps the sorted
    /// enumeration order. With `use_clipboard` the bundle is also copied to
    /// the clipboard unless this is a dry run.
    ///
    /// # Errors
    ///
    /// - `Validation` when no input directory is set or it is not a directory
    /// - `Security` for a disallowed symlink
    /// - `FileOperation` when a directory or file cannot be read, or the clipboard fails
    pub async fn pack(&self) -> Result<String, ClipackError> {
        let input_dir = self.options.require_input_dir()?.to_path_buf();
        if !input_dir.is_dir() {
            return Err(ValidationError::NotADirectory {
                path: input_dir.to_string(),
            }
            .into());
        }

        async move {
            let started = Instant::now();
            let records = self.read_selected(input_dir).await?;
            let bundle = format_records(&records);

            if self.options.use_clipboard {
                if self.options.dry_run {
                    debug!(module = MODULE, function = "pack", "Dry run, clipboard left untouched");
                } else {
                    let clipboard = self.clipboard()?;
                    let text = bundle.clone();
                    tokio::task::spawn_blocking(move || clipboard.write(&text))
                        .await
                        .map_err(join_error)??;
                }
            }

            log_operation_complete(MODULE, "pack", records.len(), started.elapsed().as_millis());
            Ok::<_, ClipackError>(bundle)
        }
        .instrument(operation_span(MODULE, "pack"))
        .await
    }

    async fn read_selected(&self, input_dir: Utf8PathBuf) -> Result<Vec<FileRecord>, ClipackError> {
        let listing_root = input_dir.clone();
        let candidates = tokio::task::spawn_blocking(move || list_files(&listing_root))
            .await
            .map_err(join_error)??;

        let selected: Vec<String> = candidates
            .into_iter()
            .filter(|path| {
                let keep = self.filter.is_target(path);
                if !keep {
                    log_file_event(MODULE, "pack", path, "filtered out");
                }
                keep
            })
            .collect();

        let security = self.options.security_options();
        let mut tasks = JoinSet::new();
        for (index, relative) in selected.into_iter().enumerate() {
            let base = input_dir.clone();
            tasks.spawn_blocking(move || {
                read_record(&relative, &base, security).map(|record| (index, record))
            });
        }

        let mut slots: Vec<Option<FileRecord>> = vec![None; tasks.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, record) = joined.map_err(join_error)??;
            slots[index] = Some(record);
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

fn read_record(
    relative: &str,
    base: &Utf8Path,
    security: SecurityOptions,
) -> Result<FileRecord, ClipackError> {
    let verdict = check_path_security(relative, base, security)?;
    let content = std::fs::read_to_string(&verdict.full_path)
        .map_err(|e| ClipackError::file_op(FileOperation::Read, relative, e))?;
    log_file_event(MODULE, "pack", relative, "read");
    Ok(FileRecord::new(relative, content))
}

fn write_records(
    records: Vec<FileRecord>,
    output_dir: &Utf8Path,
    security: SecurityOptions,
    dry_run: bool,
) -> Result<Vec<FileRecord>, ClipackError> {
    let verdicts = records
        .iter()
        .map(|record| check_path_security(&record.path, output_dir, security))
        .collect::<Result<Vec<SecurityVerdict>, _>>()?;

    if dry_run {
        for record in &records {
            log_file_event(MODULE, "extract", &record.path, "would write");
        }
        return Ok(records);
    }

    ensure_dir_all(output_dir)
        .map_err(|e| ClipackError::file_op(FileOperation::CreateDir, output_dir, e))?;

    for (record, verdict) in records.iter().zip(&verdicts) {
        let result = write_file_atomic(&verdict.full_path, &record.content)?;
        for warning in &result.warnings {
            warn!(module = MODULE, function = "extract", path = %record.path, "{warning}");
        }
        log_file_event(MODULE, "extract", &record.path, "write");
    }

    Ok(records)
}

/// Read bundle text for extract: from the clipboard when `use_clipboard`
/// is set, otherwise from stdin until EOF.
///
/// Without an explicit `clipboard` the system clipboard is detected.
///
/// # Errors
///
/// Returns `FileOperation` when stdin or the clipboard cannot be read.
pub async fn read_input(
    options: &ProcessOptions,
    clipboard: Option<Arc<dyn ClipboardTransport>>,
) -> Result<String, ClipackError> {
    if options.use_clipboard {
        let clipboard = match clipboard {
            Some(clipboard) => clipboard,
            None => Arc::new(SystemClipboard::detect()?),
        };
        return tokio::task::spawn_blocking(move || clipboard.read())
            .await
            .map_err(join_error)?;
    }

    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .map_err(|e| ClipackError::file_op(FileOperation::Stdin, "<stdin>", e))?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use clipack_utils::error::SecurityError;
    use clipack_utils::types::ErrorKind;
    use std::fs;
    use tempfile::TempDir;

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    fn extractor(out: Utf8PathBuf) -> BundleProcessor {
        BundleProcessor::new(ProcessOptions {
            output_dir: Some(out),
            ..ProcessOptions::default()
        })
    }

    fn packer(input: Utf8PathBuf) -> BundleProcessor {
        BundleProcessor::new(ProcessOptions {
            input_dir: Some(input),
            ..ProcessOptions::default()
        })
    }

    #[tokio::test]
    async fn test_extract_writes_files() {
        let dir = TempDir::new().unwrap();
        let out = utf8(&dir).join("out");

        let records = extractor(out.clone())
            .extract("// ./a.ts\n\nconst a = 1;\n// ./src/b.ts\n\nconst b = 2;\n")
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(fs::read_to_string(out.join("a.ts")).unwrap(), "const a = 1;\n");
        assert_eq!(fs::read_to_string(out.join("src/b.ts")).unwrap(), "const b = 2;\n");
    }

    #[tokio::test]
    async fn test_extract_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let out = utf8(&dir).join("out");
        let processor = BundleProcessor::new(ProcessOptions {
            output_dir: Some(out.clone()),
            dry_run: true,
            ..ProcessOptions::default()
        });

        let records = processor.extract("// ./a.ts\n\nx\n").await.unwrap();
        assert_eq!(records, vec![FileRecord::new("a.ts", "x\n")]);
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_extract_dry_run_still_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let processor = BundleProcessor::new(ProcessOptions {
            output_dir: Some(utf8(&dir)),
            dry_run: true,
            ..ProcessOptions::default()
        });

        let err = processor.extract("// ./../evil.ts\n\nx\n").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Security);
    }

    #[tokio::test]
    async fn test_extract_rejects_whole_bundle_on_traversal() {
        let dir = TempDir::new().unwrap();
        let out = utf8(&dir).join("out");

        let err = extractor(out.clone())
            .extract("// ./good.ts\n\nok\n// ./../../evil.ts\n\nbad\n")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClipackError::Security(SecurityError::DirectoryTraversal { .. })
        ));
        assert!(!out.join("good.ts").exists());
    }

    #[tokio::test]
    async fn test_extract_rejects_headers_naming_the_output_dir() {
        for bundle in ["// ./.\n\nx\n", "// ./src/..\n\nx\n"] {
            for dry_run in [true, false] {
                let dir = TempDir::new().unwrap();
                let out = utf8(&dir).join("out");
                fs::create_dir_all(&out).unwrap();
                let processor = BundleProcessor::new(ProcessOptions {
                    output_dir: Some(out.clone()),
                    dry_run,
                    ..ProcessOptions::default()
                });

                let err = processor.extract(bundle).await.unwrap_err();
                assert!(
                    matches!(
                        err,
                        ClipackError::Security(SecurityError::NotAFilePath { .. })
                    ),
                    "bundle: {bundle:?}, dry_run: {dry_run}, got {err:?}"
                );

                // Nothing lands beside or inside the output directory.
                let siblings: Vec<_> = fs::read_dir(utf8(&dir)).unwrap().collect();
                assert_eq!(siblings.len(), 1, "bundle: {bundle:?}");
                assert_eq!(fs::read_dir(&out).unwrap().count(), 0, "bundle: {bundle:?}");
            }
        }
    }

    #[tokio::test]
    async fn test_extract_requires_output_dir() {
        let err = BundleProcessor::new(ProcessOptions::default())
            .extract("// ./a.ts\n\nx\n")
            .await
            .unwrap_err();
        assert_eq!(err.to_exit_code().as_i32(), 64);
    }

    #[tokio::test]
    async fn test_extract_parse_error_before_any_write() {
        let dir = TempDir::new().unwrap();
        let out = utf8(&dir).join("out");
        let err = extractor(out.clone()).extract("hello\n// ./a.ts\nx").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_pack_selects_and_orders_files() {
        let dir = TempDir::new().unwrap();
        let root = utf8(&dir);
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("node_modules/x")).unwrap();
        fs::write(root.join("src/b.ts"), "b\n").unwrap();
        fs::write(root.join("a.js"), "\n\na\n\n").unwrap();
        fs::write(root.join("style.css"), "body {}").unwrap();
        fs::write(root.join("node_modules/x/index.js"), "x").unwrap();

        let bundle = packer(root).pack().await.unwrap();
        assert_eq!(bundle, "// ./a.js\n\na\n// ./src/b.ts\n\nb\n");
    }

    #[tokio::test]
    async fn test_pack_empty_directory() {
        let dir = TempDir::new().unwrap();
        assert_eq!(packer(utf8(&dir)).pack().await.unwrap(), "\n");
    }

    #[tokio::test]
    async fn test_pack_requires_directory() {
        let dir = TempDir::new().unwrap();
        let file = utf8(&dir).join("file.ts");
        fs::write(&file, "x").unwrap();

        let err = packer(file).pack().await.unwrap_err();
        assert!(matches!(
            err,
            ClipackError::Validation(ValidationError::NotADirectory { .. })
        ));

        let err = BundleProcessor::new(ProcessOptions::default())
            .pack()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Input directory must be specified"));
    }

    #[tokio::test]
    async fn test_pack_with_custom_filter() {
        let dir = TempDir::new().unwrap();
        let root = utf8(&dir);
        fs::write(root.join("lib.rs"), "fn main() {}\n").unwrap();
        fs::write(root.join("a.ts"), "a\n").unwrap();

        let filter = FileFilter::new(&["**/*.rs".to_string()], &[]).unwrap();
        let bundle = packer(root).with_filter(filter).pack().await.unwrap();
        assert_eq!(bundle, "// ./lib.rs\n\nfn main() {}\n");
    }

    #[tokio::test]
    async fn test_pack_copies_to_clipboard() {
        let dir = TempDir::new().unwrap();
        let root = utf8(&dir);
        fs::write(root.join("a.ts"), "a\n").unwrap();

        let clipboard = Arc::new(MemoryClipboard::default());
        let processor = BundleProcessor::new(ProcessOptions {
            input_dir: Some(root),
            use_clipboard: true,
            ..ProcessOptions::default()
        })
        .with_clipboard(clipboard.clone());

        let bundle = processor.pack().await.unwrap();
        assert_eq!(clipboard.contents(), bundle);
    }

    #[tokio::test]
    async fn test_pack_dry_run_leaves_clipboard_alone() {
        let dir = TempDir::new().unwrap();
        let root = utf8(&dir);
        fs::write(root.join("a.ts"), "a\n").unwrap();

        let clipboard = Arc::new(MemoryClipboard::new("untouched"));
        let processor = BundleProcessor::new(ProcessOptions {
            input_dir: Some(root),
            use_clipboard: true,
            dry_run: true,
            ..ProcessOptions::default()
        })
        .with_clipboard(clipboard.clone());

        processor.pack().await.unwrap();
        assert_eq!(clipboard.contents(), "untouched");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_pack_rejects_symlinked_file() {
        let dir = TempDir::new().unwrap();
        let root = utf8(&dir);
        fs::write(root.join("real.ts"), "r\n").unwrap();
        std::os::unix::fs::symlink(root.join("real.ts"), root.join("link.ts")).unwrap();

        let err = packer(root.clone()).pack().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Security);

        let processor = BundleProcessor::new(ProcessOptions {
            input_dir: Some(root),
            allow_symlinks: true,
            ..ProcessOptions::default()
        });
        let bundle = processor.pack().await.unwrap();
        assert_eq!(bundle, "// ./link.ts\n\nr\n// ./real.ts\n\nr\n");
    }

    #[tokio::test]
    async fn test_pack_then_extract_round_trip() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let root = utf8(&src);
        fs::create_dir_all(root.join("src/utils")).unwrap();
        fs::write(root.join("src/index.ts"), "import { a } from './utils/a';\n").unwrap();
        fs::write(root.join("src/utils/a.ts"), "export const a = 1;\n").unwrap();

        let bundle = packer(root).pack().await.unwrap();
        let out = utf8(&dst);
        extractor(out.clone()).extract(&bundle).await.unwrap();

        assert_eq!(
            fs::read_to_string(out.join("src/utils/a.ts")).unwrap(),
            "export const a = 1;\n"
        );
        assert_eq!(
            fs::read_to_string(out.join("src/index.ts")).unwrap(),
            "import { a } from './utils/a';\n"
        );
    }

    #[tokio::test]
    async fn test_read_input_from_clipboard() {
        let options = ProcessOptions {
            use_clipboard: true,
            ..ProcessOptions::default()
        };
        let clipboard: Arc<dyn ClipboardTransport> =
            Arc::new(MemoryClipboard::new("// ./a.ts\n\nx\n"));
        let text = read_input(&options, Some(clipboard)).await.unwrap();
        assert_eq!(text, "// ./a.ts\n\nx\n");
    }
}
