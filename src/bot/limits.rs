//! Category limit enforcement.

use crate::bot::storage::{Category, Storage};

/// Outcome of a pre-insert limit check.
#[derive(Debug)]
pub enum LimitCheck {
    Within,
    Exceeded { category: Category },
}

/// Whether spending `proposed` on top of `spent` breaks `limit`. Exactly
/// reaching the limit is allowed.
pub fn exceeds_limit(spent: f64, proposed: f64, limit: f64) -> bool {
    spent + proposed > limit
}

/// Check a proposed expense against its category's ceiling.
///
/// The sum is the user's lifetime total in the category, recomputed on
/// every check. Any error — including the category having vanished — means
/// the check cannot be verified, and the caller rejects the expense.
pub fn check(
    storage: &Storage,
    user_id: i64,
    category_id: i64,
    proposed: f64,
) -> rusqlite::Result<LimitCheck> {
    let Some(category) = storage.category_by_id(category_id)? else {
        return Err(rusqlite::Error::QueryReturnedNoRows);
    };
    let spent = storage.category_spend(user_id, category_id)?;
    if exceeds_limit(spent, proposed, category.limit) {
        Ok(LimitCheck::Exceeded { category })
    } else {
        Ok(LimitCheck::Within)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exceeds_limit_boundary() {
        // Strictly over the limit is exceeded; equality is not.
        assert!(exceeds_limit(30.0, 25.0, 50.0));
        assert!(!exceeds_limit(30.0, 20.0, 50.0));
        assert!(!exceeds_limit(0.0, 50.0, 50.0));
        assert!(exceeds_limit(0.0, 50.01, 50.0));
    }

    #[test]
    fn test_check_against_storage() {
        let storage = Storage::open_in_memory().unwrap();
        storage.create_category(1, "Food", 50.0).unwrap();
        let category = storage.find_category(1, "Food").unwrap().unwrap();
        storage
            .add_expense(1, category.id, 30.0, "2026-08-06", "обед")
            .unwrap();

        assert!(matches!(
            check(&storage, 1, category.id, 20.0).unwrap(),
            LimitCheck::Within
        ));
        match check(&storage, 1, category.id, 25.0).unwrap() {
            LimitCheck::Exceeded { category } => assert_eq!(category.name, "Food"),
            LimitCheck::Within => panic!("30 + 25 must exceed a limit of 50"),
        }
    }

    #[test]
    fn test_check_ignores_other_users_spend() {
        let storage = Storage::open_in_memory().unwrap();
        storage.create_category(1, "Food", 50.0).unwrap();
        let category = storage.find_category(1, "Food").unwrap().unwrap();
        storage
            .add_expense(2, category.id, 49.0, "2026-08-06", "чужое")
            .unwrap();

        assert!(matches!(
            check(&storage, 1, category.id, 50.0).unwrap(),
            LimitCheck::Within
        ));
    }

    #[test]
    fn test_missing_category_cannot_be_verified() {
        let storage = Storage::open_in_memory().unwrap();
        assert!(check(&storage, 1, 999, 10.0).is_err());
    }
}
