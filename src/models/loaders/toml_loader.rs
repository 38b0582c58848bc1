use crate::error::{AppError, AppResult, FileError};
use crate::models::correction::{BatchResult, BatchSummary, CorrectionBatch, CorrectionRecord, Outcome};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 凭证号在表格导出的 TOML 里可能是文本、整数，甚至是 `66693215.0` 这样的浮点数
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl RawDocument {
    /// 统一为文本，空白凭证号返回 None
    fn normalize(self) -> Option<String> {
        let text = match self {
            RawDocument::Text(s) => s.trim().to_string(),
            RawDocument::Integer(n) => n.to_string(),
            RawDocument::Float(f) if f.is_finite() && f.fract() == 0.0 => format!("{}", f as i64),
            RawDocument::Float(f) => f.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct BatchRow {
    #[serde(default)]
    document: Option<RawDocument>,
    #[serde(default)]
    correction_text: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct BatchFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    records: Vec<BatchRow>,
}

#[derive(Debug, Serialize)]
struct SavedBatch<'a> {
    name: &'a str,
    records: &'a [CorrectionRecord],
}

#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    document: &'a str,
    correction_text: &'a str,
    status: &'a str,
    outcome: Outcome,
}

#[derive(Debug, Serialize)]
struct ResultFile<'a> {
    name: &'a str,
    generated_at: String,
    summary: BatchSummary,
    records: Vec<ResultRow<'a>>,
}

#[derive(Debug, Serialize)]
struct TemplateRow {
    document: &'static str,
    correction_text: &'static str,
}

#[derive(Debug, Serialize)]
struct TemplateFile {
    name: &'static str,
    records: Vec<TemplateRow>,
}

/// 从 TOML 文件加载一个批次
///
/// 没有凭证号的行直接丢弃；缺少 status 的行补空状态。
pub async fn load_batch(path: &Path) -> AppResult<CorrectionBatch> {
    let path_text = path.display().to_string();
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(&path_text, e))?;

    let file: BatchFile = toml::from_str(&content).map_err(|source| FileError::TomlParseFailed {
        path: path_text.clone(),
        source,
    })?;

    let row_count = file.records.len();
    let records: Vec<CorrectionRecord> = file
        .records
        .into_iter()
        .filter_map(|row| {
            let document = row.document?.normalize()?;
            Some(CorrectionRecord {
                document,
                correction_text: row.correction_text,
                status: row.status,
            })
        })
        .collect();

    if records.len() < row_count {
        tracing::warn!(
            "{}: 丢弃 {} 行没有凭证号的记录",
            path_text,
            row_count - records.len()
        );
    }

    let name = file.name.unwrap_or_else(|| {
        path.file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    });

    Ok(CorrectionBatch {
        name,
        records,
        file_path: Some(path_text),
    })
}

/// 从文件夹中加载所有批次文件
///
/// 单个文件解析失败只记录警告，不影响其他文件。
pub async fn load_all_batches(folder_path: &str) -> AppResult<Vec<CorrectionBatch>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut batches = Vec::new();
    for path in paths {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_batch(&path).await {
            Ok(batch) => {
                tracing::info!("成功加载 {} 条记录", batch.records.len());
                batches.push(batch);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(batches)
}

/// 把每条记录的状态重置为空
pub fn clear_statuses(records: &mut [CorrectionRecord]) {
    for record in records.iter_mut() {
        record.clear_status();
    }
}

/// 把批次（含当前状态）写回 TOML 文件
pub async fn save_batch(batch: &CorrectionBatch, path: &Path) -> AppResult<()> {
    let saved = SavedBatch {
        name: &batch.name,
        records: &batch.records,
    };
    let content = toml::to_string(&saved).map_err(FileError::from)?;
    write_file(path, content).await
}

/// 写出处理结果，文件名带时间戳，返回写入的路径
pub async fn write_result(
    batch: &CorrectionBatch,
    result: &BatchResult,
    output_folder: &str,
) -> AppResult<PathBuf> {
    let now = chrono::Local::now();
    let file_name = format!(
        "resultado_carta_correcao_{}_{}.toml",
        sanitize_file_stem(&batch.name),
        now.format("%Y%m%d_%H%M%S")
    );
    let path = Path::new(output_folder).join(file_name);

    let report = ResultFile {
        name: &batch.name,
        generated_at: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        summary: result.summary,
        records: result
            .entries
            .iter()
            .map(|entry| ResultRow {
                document: &entry.record.document,
                correction_text: &entry.record.correction_text,
                status: &entry.record.status,
                outcome: entry.outcome,
            })
            .collect(),
    };

    let content = toml::to_string(&report).map_err(FileError::from)?;
    write_file(&path, content).await?;
    Ok(path)
}

/// 生成示例批次文件
pub async fn write_template(path: &Path) -> AppResult<()> {
    let template = TemplateFile {
        name: "template_carta_correcao",
        records: vec![
            TemplateRow {
                document: "66693215",
                correction_text: "EM VOLUMES TRANSPORTADOS, EM PESO, CONSIDERAR: 1,50KG",
            },
            TemplateRow {
                document: "66693216",
                correction_text: "CORREÇÃO DE DADOS CADASTRAIS",
            },
            TemplateRow {
                document: "66693217",
                correction_text: "AJUSTE DE VALORES",
            },
        ],
    };
    let content = toml::to_string(&template).map_err(FileError::from)?;
    write_file(path, content).await
}

async fn write_file(path: &Path, content: String) -> AppResult<()> {
    let path_text = path.display().to_string();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::file_write_failed(&path_text, e))?;
    }
    fs::write(path, content)
        .await
        .map_err(|e| AppError::file_write_failed(&path_text, e))
}

fn sanitize_file_stem(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "lote".to_string()
    } else {
        cleaned
    }
}
