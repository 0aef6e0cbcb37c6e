use crate::core::store::ResultStore;
use crate::domain::model::FALLBACK_FILENAME;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::collections::HashSet;

/// 將所有已完成的檔案以建議檔名寫出原始內容，回傳實際寫入的檔名
pub async fn export_completed<S: Storage>(store: &ResultStore, storage: &S) -> Result<Vec<String>> {
    let mut used = HashSet::new();
    let mut written = Vec::new();

    for file in store.completed() {
        let Some(result) = file.result() else {
            continue;
        };

        let name = unique_name(&safe_file_name(&result.renamed_filename), &mut used);
        storage.write_file(&name, &file.file.bytes).await?;
        tracing::info!("💾 {} → {}", file.name, name);
        written.push(name);
    }

    Ok(written)
}

/// 只保留最後一段檔名，避免上游回傳的名稱帶有路徑
pub fn safe_file_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>();
    let base = base.trim();

    if base.is_empty() || base.chars().all(|c| c == '.') {
        FALLBACK_FILENAME.to_string()
    } else {
        base.to_string()
    }
}

/// 同一次匯出中重複的檔名加上 ` (n)`
fn unique_name(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }

    let (stem, extension) = match name.rfind('.') {
        Some(dot) if dot > 0 => (&name[..dot], &name[dot..]),
        _ => (name, ""),
    };

    let mut counter = 1;
    loop {
        let candidate = format!("{} ({}){}", stem, counter, extension);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}
