//! Fixed reply texts. Kept in the original deployment language; the
//! delete-confirmation word ("да") is matched case-insensitively.

use crate::bot::storage::{Category, Expense};

pub const START_MESSAGE: &str = "Привет! Я твой финансовый помощник. Вот команды, которые я могу выполнить:
- /addexpense - Добавить расход
- /getexpenses - Показать все расходы
- /addcategory - Добавить новую категорию
- /setlimit - Установить лимит для категории
- /getcategories - Показать все категории
- /deletelastexpense - Удалить последний расход
- /help - Показать справку
";

pub const HELP_MESSAGE: &str = "Я могу помочь тебе управлять личными финансами. Вот список доступных команд:
- /addexpense - Добавить новый расход
- /getexpenses - Показать все расходы
- /addcategory - Добавить новую категорию
- /setlimit - Установить лимит для категории
- /getcategories - Показать все категории
- /deletelastexpense - Удалить последний расход
- /help - Показать это сообщение
";

pub const PROMPT_EXPENSE_CATEGORY: &str = "Введите категорию:";
pub const PROMPT_EXPENSE_AMOUNT: &str = "Введите сумму:";
pub const PROMPT_EXPENSE_NOTE: &str = "Введите заметку:";
pub const PROMPT_NEW_CATEGORY_NAME: &str = "Введите имя новой категории:";
pub const PROMPT_NEW_CATEGORY_LIMIT: &str = "Введите лимит для категории:";
pub const PROMPT_LIMIT_TARGET: &str =
    "Введите имя категории, для которой хотите установить лимит:";
pub const PROMPT_LIMIT_VALUE: &str = "Введите новый лимит для категории:";

pub const DEFAULT_CATEGORY_FALLBACK: &str =
    "Категория не найдена. Запись добавлена в категорию Общая.";
pub const INVALID_AMOUNT: &str =
    "Неверная сумма. Пожалуйста, введите число, например 100.50";
pub const INVALID_LIMIT: &str = "Неверный лимит. Пожалуйста, введите число.";

pub const EXPENSE_ADDED: &str = "Расход добавлен!";
pub const CATEGORY_ADDED: &str = "Категория добавлена!";
pub const LIMIT_SET: &str = "Лимит для категории установлен!";
pub const CATEGORY_NOT_FOUND: &str = "Категория не найдена. Попробуйте снова.";
pub const NO_EXPENSES: &str = "Расходы не найдены";

pub const DELETE_CONFIRM_PROMPT: &str =
    "Вы уверены, что хотите удалить последний расход? Введите 'Да' для подтверждения.";
pub const LAST_EXPENSE_DELETED: &str = "Последний расход удален.";
pub const DELETE_CANCELLED: &str = "Отмена удаления.";
pub const NOTHING_TO_DELETE: &str = "Нет расходов для удаления.";

pub const UNKNOWN_COMMAND: &str =
    "Неизвестная команда. Введите /help для получения списка доступных команд.";

pub const FAILED_TO_ADD_EXPENSE: &str = "Ошибка при добавлении расхода. Попробуйте снова.";
pub const FAILED_TO_ADD_CATEGORY: &str = "Ошибка при добавлении категории. Попробуйте снова.";
pub const FAILED_TO_SET_LIMIT: &str = "Ошибка при установке лимита. Попробуйте снова.";
pub const FAILED_TO_LIST_CATEGORIES: &str = "Ошибка при получении категорий. Попробуйте снова.";
pub const FAILED_TO_LIST_EXPENSES: &str = "Ошибка при получении расходов. Попробуйте снова.";
pub const FAILED_TO_DELETE: &str =
    "Ошибка при удалении последнего расхода. Попробуйте снова.";

/// The delete-confirmation word, compared after lowercasing the input.
pub const AFFIRMATIVE: &str = "да";

pub fn limit_exceeded(category: &Category, amount: f64) -> String {
    format!(
        "Превышен лимит категории '{}' ({:.2}). Расход {:.2} не добавлен.",
        category.name, category.limit, amount
    )
}

pub fn expense_list(expenses: &[Expense]) -> String {
    let mut response = String::from("Твои расходы:\n");
    for expense in expenses {
        response.push_str(&format!(
            "{:.2} - {} - {}\n",
            expense.amount, expense.date, expense.note
        ));
    }
    response
}

pub fn category_list(categories: &[Category]) -> String {
    let mut response = String::from("Ваши категории:\n");
    for category in categories {
        response.push_str(&format!(
            "Имя: {}, Лимит: {:.2}\n",
            category.name, category.limit
        ));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_exceeded_includes_category_and_amounts() {
        let category = Category {
            id: 1,
            user_id: 42,
            name: "Еда".to_string(),
            limit: 50.0,
        };
        let text = limit_exceeded(&category, 25.5);
        assert!(text.contains("'Еда'"));
        assert!(text.contains("50.00"));
        assert!(text.contains("25.50"));
    }

    #[test]
    fn test_expense_list_one_line_per_expense() {
        let expenses = vec![
            Expense {
                id: 1,
                amount: 30.0,
                date: "2026-08-06".to_string(),
                note: "обед".to_string(),
                category_id: 1,
            },
            Expense {
                id: 2,
                amount: 12.5,
                date: "2026-08-06".to_string(),
                note: "кофе".to_string(),
                category_id: 1,
            },
        ];
        let text = expense_list(&expenses);
        assert!(text.starts_with("Твои расходы:\n"));
        assert!(text.contains("30.00 - 2026-08-06 - обед\n"));
        assert!(text.contains("12.50 - 2026-08-06 - кофе\n"));
    }

    #[test]
    fn test_category_list_shows_name_and_limit() {
        let categories = vec![Category {
            id: 1,
            user_id: 42,
            name: "Food".to_string(),
            limit: 50.0,
        }];
        let text = category_list(&categories);
        assert_eq!(text, "Ваши категории:\nИмя: Food, Лимит: 50.00\n");
    }
}
