use crate::codec::RawInput;
use anyhow::Result;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub struct FileScanner;

impl FileScanner {
    /// ディレクトリを再帰的に走査し、画像ファイルのパスを返す（パス順）
    pub fn scan_directory(directory: &Path) -> Result<Vec<PathBuf>> {
        let mut file_paths = Vec::new();

        for entry in WalkDir::new(directory).sort_by_file_name() {
            let entry = entry?;

            if entry.file_type().is_file() && Self::mime_type_for(entry.path()).is_some() {
                file_paths.push(entry.path().to_path_buf());
            }
        }

        Ok(file_paths)
    }

    /// 拡張子から画像のMIMEタイプを判定
    pub fn mime_type_for(path: &Path) -> Option<&'static str> {
        ImageFormat::from_path(path)
            .ok()
            .map(|format| format.to_mime_type())
    }

    /// コマンドライン引数のパスからバッチ入力を組み立てる
    ///
    /// ディレクトリは再帰的に展開する。画像として認識できない拡張子は
    /// 警告してスキップする。存在しない画像パスはそのまま入力に含め、
    /// 読み込み時の失敗としてバッチ側で報告させる。
    pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<RawInput>> {
        let mut inputs = Vec::new();

        for path in paths {
            if path.is_dir() {
                let files = Self::scan_directory(path)?;
                debug!(directory = %path.display(), files = files.len(), "directory scanned");
                inputs.extend(files.into_iter().filter_map(|file| Self::input_for(&file)));
            } else {
                match Self::input_for(path) {
                    Some(input) => inputs.push(input),
                    None => warn!(path = %path.display(), "skipping non-image file"),
                }
            }
        }

        Ok(inputs)
    }

    fn input_for(path: &Path) -> Option<RawInput> {
        Self::mime_type_for(path).map(|mime| RawInput::from_path(path, mime))
    }
}
