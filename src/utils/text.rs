/// 判斷回應內容是否為 HTML 頁面（閘道或代理回傳的錯誤頁）
pub fn looks_like_html(body: &str) -> bool {
    let head = body.trim_start().to_ascii_lowercase();
    head.contains("<!doctype") || head.contains("<html")
}

/// 取前 `max_chars` 個字元作為錯誤訊息中的預覽
pub fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
