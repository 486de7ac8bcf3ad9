//! Настройка вывода логов для CLI.

use std::str::FromStr;

use tracing::Level;

/// Устанавливает глобальный подписчик `tracing` с заданным уровнем.
///
/// Нераспознанный уровень заменяется на `info`. Повторный вызов ничего не меняет.
pub fn init(log_level: &str) {
    let level = Level::from_str(log_level).unwrap_or(Level::INFO);
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(level)
        .compact()
        .finish();
    // Подписчик мог быть установлен раньше (например, в тестах).
    let _ = tracing::subscriber::set_global_default(subscriber);
}
