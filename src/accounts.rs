//! Справочник подсчетов WatCard.
//!
//! Портал обозначает подсчёт одним символом. Часть названий повторяется
//! (`5` и `6` оба `FLEXIBLE`), а коды `1` и `4` переименованы в `mealplan`
//! и `flex`, так как именно их чаще всего спрашивают.

/// Имя счёта питания.
pub const MEALPLAN: &str = "mealplan";
/// Имя счёта flex-долларов.
pub const FLEX: &str = "flex";

/// Пары «код — имя счёта».
pub static ACCOUNTS: [(char, &str); 12] = [
    ('1', MEALPLAN), // на портале «VILLAGE MEAL»
    ('2', "BEST BUY MEAL"),
    ('3', "FOOD PLAN"),
    ('4', FLEX), // на портале «FLEXIBLE»
    ('5', "FLEXIBLE"),
    ('6', "FLEXIBLE"),
    ('7', "TRANSFER MP"),
    ('8', "DONS VILLAGE"),
    ('9', "DONS NON VILLAGE"),
    ('A', "EXTRA"),
    ('B', "DEPT CHARGE"),
    ('C', "OVERDRAFT"),
];

/// Возвращает имя счёта по односимвольному коду.
pub fn account_name(code: char) -> Option<&'static str> {
    ACCOUNTS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Разбирает ячейку с кодом счёта: ровно один известный символ.
pub fn lookup_code(cell: &str) -> Option<(char, &'static str)> {
    let mut chars = cell.trim_end().chars();
    let code = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    account_name(code).map(|name| (code, name))
}

/// Код и имя счёта, для которого известен опорный баланс истории.
pub fn anchor_code(account: &str) -> Option<(char, &'static str)> {
    match account {
        MEALPLAN => Some(('1', MEALPLAN)),
        FLEX => Some(('4', FLEX)),
        _ => None,
    }
}
