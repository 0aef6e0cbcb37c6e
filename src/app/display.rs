use crate::core::orchestrator::FileUpdate;
use crate::core::store::ResultStore;
use crate::domain::model::FileState;

pub fn status_label(status: &str) -> &'static str {
    match status {
        "processing" => "処理中",
        "completed" => "完了",
        "error" => "エラー",
        _ => "待機中",
    }
}

pub fn format_size_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}

/// 顯示整個檔案清單與統計
pub fn render(store: &ResultStore) -> String {
    let mut lines = Vec::with_capacity(store.len() + 1);

    for file in store.files() {
        let mut line = format!(
            "[{}] {} ({})",
            status_label(file.state().label()),
            file.name,
            format_size_mb(file.file.size)
        );
        match file.state() {
            FileState::Completed(result) => line.push_str(&format!(" → {}", result.renamed_filename)),
            FileState::Error(message) => line.push_str(&format!(" エラー: {}", message)),
            _ => {}
        }
        lines.push(line);
    }

    let stats = store.stats();
    lines.push(format!(
        "合計: {} / 処理済み: {} / 完了: {} / エラー: {}",
        stats.total, stats.processed, stats.completed, stats.errors
    ));

    lines.join("\n")
}

/// 顯示單一狀態轉換
pub fn render_update(update: &FileUpdate) -> String {
    let mut line = format!(
        "[{}] {} {}%",
        status_label(update.status),
        update.name,
        update.progress
    );
    if let Some(detail) = &update.detail {
        match update.status {
            "completed" => line.push_str(&format!(" → {}", detail)),
            "error" => line.push_str(&format!(" エラー: {}", detail)),
            _ => {}
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ExtractionResult, UploadFile};

    #[test]
    fn test_render_store() {
        let mut store = ResultStore::new();
        store.add(vec![
            UploadFile::new("a.pdf", "application/pdf", vec![0u8; 1024 * 1024]),
            UploadFile::new("b.pdf", "application/pdf", vec![0u8; 10]),
            UploadFile::new("c.pdf", "application/pdf", vec![0u8; 10]),
        ]);

        {
            let file = store.file_mut(0).unwrap();
            file.begin().unwrap();
            file.complete(ExtractionResult {
                renamed_filename: "acme.pdf".to_string(),
                company: "Acme".to_string(),
                ..ExtractionResult::default()
            })
            .unwrap();
        }
        {
            let file = store.file_mut(1).unwrap();
            file.begin().unwrap();
            file.fail("空のレスポンスが返されました").unwrap();
        }

        let output = render(&store);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "[完了] a.pdf (1.00 MB) → acme.pdf");
        assert_eq!(lines[1], "[エラー] b.pdf (0.00 MB) エラー: 空のレスポンスが返されました");
        assert_eq!(lines[2], "[待機中] c.pdf (0.00 MB)");
        assert_eq!(lines[3], "合計: 3 / 処理済み: 2 / 完了: 1 / エラー: 1");
    }

    #[test]
    fn test_render_update() {
        let update = FileUpdate {
            id: "1-0".to_string(),
            name: "a.pdf".to_string(),
            status: "processing",
            progress: 50,
            detail: None,
        };
        assert_eq!(render_update(&update), "[処理中] a.pdf 50%");
    }
}
