use crate::codec::decode;
use crate::core::{AnnotationClient, BatchSummary, Phase, Unit, UnitId};
use crate::engine::BatchOrchestrator;
use crate::file_scanner::FileScanner;
use crate::services::{
    ConsoleBatchReporter, DefaultBatchConfig, GeminiAnnotationClient, GeminiConfig,
    UuidIdGenerator,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use image::ImageFormat;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration struct for caption command to reduce argument count
#[derive(Debug, Clone, Default)]
pub struct CaptionConfig {
    pub paths: Vec<PathBuf>,
    pub json: bool,
    pub export_dir: Option<PathBuf>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub quiet: bool,
}

impl CaptionConfig {
    /// 環境変数の設定にコマンドライン引数の上書きを適用
    pub fn gemini_config(&self) -> GeminiConfig {
        let mut gemini = GeminiConfig::from_env();
        if let Some(model) = &self.model {
            gemini = gemini.with_model(model);
        }
        if let Some(base_url) = &self.base_url {
            gemini = gemini.with_base_url(base_url);
        }
        if let Some(secs) = self.timeout_secs {
            gemini = gemini.with_timeout((secs > 0).then(|| Duration::from_secs(secs)));
        }
        gemini
    }
}

#[derive(Debug, Serialize)]
pub struct CaptionReport {
    pub summary: SummaryReport,
    /// 最新が先頭
    pub units: Vec<UnitReport>,
}

#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub submitted: usize,
    pub captioned: usize,
    pub failed: usize,
    pub discarded: usize,
    pub rejected: Vec<RejectedReport>,
    pub total_processing_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct RejectedReport {
    pub index: usize,
    pub name: Option<String>,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct UnitReport {
    pub id: UnitId,
    pub name: Option<String>,
    pub mime_type: String,
    pub phase: Phase,
    pub caption: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub encoded_bytes: usize,
}

impl CaptionReport {
    pub fn new(summary: &BatchSummary, units: &[Unit]) -> Self {
        Self {
            summary: SummaryReport {
                submitted: summary.submitted,
                captioned: summary.captioned,
                failed: summary.failed,
                discarded: summary.discarded,
                rejected: summary
                    .rejected
                    .iter()
                    .map(|r| RejectedReport {
                        index: r.index,
                        name: r.name.clone(),
                        error: r.error.to_string(),
                    })
                    .collect(),
                total_processing_time_ms: summary.total_processing_time_ms,
            },
            units: units
                .iter()
                .map(|unit| UnitReport {
                    id: unit.id().clone(),
                    name: unit.source_name().map(str::to_string),
                    mime_type: unit.mime_type().to_string(),
                    phase: unit.phase(),
                    caption: unit.annotation().map(str::to_string),
                    failure_reason: unit.failure_reason().map(str::to_string),
                    created_at: unit.created_at(),
                    encoded_bytes: unit.payload().encoded_len(),
                })
                .collect(),
        }
    }

    /// 人間向けのテキスト表示
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for unit in &self.units {
            let label = unit.name.as_deref().unwrap_or(unit.id.as_str());
            let line = match unit.phase {
                Phase::Ready => format!("✅ {label}: {}", unit.caption.as_deref().unwrap_or_default()),
                Phase::Failed => format!(
                    "❌ {label}: {}",
                    unit.failure_reason.as_deref().unwrap_or_default()
                ),
                Phase::Pending => format!("⏳ {label}: pending"),
            };
            out.push_str(&line);
            out.push('\n');
        }
        for rejected in &self.summary.rejected {
            let label = rejected.name.as_deref().unwrap_or("<input>");
            out.push_str(&format!("⚠️  {label}: {}\n", rejected.error));
        }
        out.push_str(&format!(
            "📊 {} captioned, {} failed, {} rejected ({} ms)\n",
            self.summary.captioned,
            self.summary.failed,
            self.summary.rejected.len(),
            self.summary.total_processing_time_ms
        ));
        out
    }
}

/// Caption images with the Gemini client configured from env and flags
pub async fn execute_caption(config: CaptionConfig) -> Result<()> {
    let client = GeminiAnnotationClient::new(config.gemini_config())
        .context("Gemini client configuration is invalid")?;
    tracing::info!(
        client = client.client_name(),
        model = %client.config().model,
        "annotation client ready"
    );
    let report = execute_caption_with_client(&config, client).await?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

/// Run one batch with the given client and export results if requested
pub async fn execute_caption_with_client<A>(config: &CaptionConfig, client: A) -> Result<CaptionReport>
where
    A: AnnotationClient + 'static,
{
    let inputs = FileScanner::collect_inputs(&config.paths)?;
    if inputs.is_empty() {
        anyhow::bail!("No image files found in the given paths");
    }

    // JSON出力時は進捗表示を抑制する
    let reporter = if config.quiet || config.json {
        ConsoleBatchReporter::quiet()
    } else {
        ConsoleBatchReporter::new()
    };
    let orchestrator = BatchOrchestrator::new(
        client,
        UuidIdGenerator::new(),
        DefaultBatchConfig::default(),
        reporter,
    );

    let summary = orchestrator.submit_batch(inputs).await;
    let units = orchestrator.snapshot();

    if let Some(dir) = &config.export_dir {
        let exported = export_units(&units, dir)?;
        if !config.quiet && !config.json {
            eprintln!("📁 Exported {exported} captioned photos to {}", dir.display());
        }
    }

    Ok(CaptionReport::new(&summary, &units))
}

/// 撮影データの拡張子（MIMEから判定できない場合は`bin`）
fn extension_for(mime_type: &str) -> &'static str {
    ImageFormat::from_mime_type(mime_type)
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or("bin")
}

/// Write decoded image bytes and caption text for every ready unit
pub fn export_units(units: &[Unit], dir: &Path) -> Result<usize> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {}", dir.display()))?;

    let mut exported = 0;
    for unit in units.iter().filter(|u| u.phase() == Phase::Ready) {
        let Some(caption) = unit.annotation() else {
            continue;
        };
        let (bytes, mime_type) = decode(unit.payload())
            .with_context(|| format!("Failed to decode payload of {}", unit.id()))?;

        let image_path = dir.join(format!("{}.{}", unit.id(), extension_for(&mime_type)));
        std::fs::write(&image_path, bytes)
            .with_context(|| format!("Failed to write {}", image_path.display()))?;

        let caption_path = dir.join(format!("{}.txt", unit.id()));
        std::fs::write(&caption_path, caption)
            .with_context(|| format!("Failed to write {}", caption_path.display()))?;

        exported += 1;
    }
    Ok(exported)
}
