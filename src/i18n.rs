// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持西班牙语（默认，与历史数据标签一致）和英文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 默认语言
pub const DEFAULT_LOCALE: &str = "es";

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"es" 或 "en"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use oee_shift_report::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use oee_shift_report::i18n::t_with_args;
/// let msg = t_with_args("import.file_not_found", &[("path", "/tmp/productos.csv")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // rust-i18n 的 locale 为全局状态，且 Rust 测试默认并行执行；
    // 为避免测试互相干扰，这里对 i18n 相关测试串行化。
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert_eq!(current_locale(), "en");

        set_locale(DEFAULT_LOCALE);
        assert_eq!(current_locale(), "es");
    }

    #[test]
    fn test_translate_simple() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("es");
        assert_eq!(t("waterfall.speed_loss"), "Pérdida de velocidad");

        set_locale("en");
        assert_eq!(t("waterfall.speed_loss"), "Speed Loss");

        set_locale(DEFAULT_LOCALE);
    }

    #[test]
    fn test_translate_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("es");
        let msg = t_with_args(
            "builder.justify_budget_exceeded",
            &[("minutes", "50"), ("remaining", "20")],
        );
        assert!(msg.contains("50 min"));
        assert!(msg.contains("20 min"));

        set_locale("en");
        let msg = t_with_args("builder.duplicate_item", &[("code", "A")]);
        assert_eq!(msg, "Product already added: A");

        set_locale(DEFAULT_LOCALE);
    }
}
