//! Pure calculations behind the dashboard: savings rate, trend months and
//! read-time budget alerts.

use std::collections::HashMap;

use time::{Date, Duration, Month};

use crate::{
    budget_alert::DEFAULT_ALERT_THRESHOLD,
    category::{Category, CategoryId, CategoryType},
};

/// The income, expense and savings figures for a calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlySummary {
    /// Total income for the month.
    pub income: f64,
    /// Total expenses for the month.
    pub expenses: f64,
    /// Income minus expenses.
    pub balance: f64,
    /// The share of income left over, as a percentage with one decimal.
    /// Zero when there is no income.
    pub savings_rate: f64,
}

impl MonthlySummary {
    /// Build the summary figures from monthly income and expense totals.
    pub fn new(income: f64, expenses: f64) -> Self {
        let balance = income - expenses;
        let savings_rate = if income > 0.0 {
            round_to_one_decimal(balance / income * 100.0)
        } else {
            0.0
        };

        Self {
            income,
            expenses,
            balance,
            savings_rate,
        }
    }
}

/// The severity of a computed budget alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    /// Spending is at or past the alert threshold.
    Warning,
    /// Spending is at or past the full budget.
    Danger,
}

/// A budget alert computed from the current month's spending.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetAlertEntry {
    /// The name of the category over its threshold.
    pub category_name: String,
    /// The emoji shown next to the category name.
    pub icon: String,
    /// Spending in the category so far this month.
    pub spent: f64,
    /// The category's monthly budget.
    pub budget: f64,
    /// Spending as a percentage of the budget, to one decimal.
    pub percentage: f64,
    /// Warning below the full budget, danger at or past it.
    pub level: AlertLevel,
}

/// Compute the budget alerts for the current month.
///
/// An alert is emitted for every expense category with a budget whose
/// spending has reached its threshold. The threshold is the active configured
/// one for that category, or 80 percent when none is configured.
pub fn build_alerts(
    categories: &[Category],
    spent_by_category: &HashMap<CategoryId, f64>,
    thresholds: &HashMap<CategoryId, f64>,
) -> Vec<BudgetAlertEntry> {
    let mut alerts = Vec::new();

    for category in categories {
        if category.category_type != CategoryType::Expense || category.monthly_budget <= 0.0 {
            continue;
        }

        let spent = spent_by_category.get(&category.id).copied().unwrap_or(0.0);
        let percentage = spent / category.monthly_budget * 100.0;
        let threshold = thresholds
            .get(&category.id)
            .copied()
            .unwrap_or(DEFAULT_ALERT_THRESHOLD);

        if percentage < threshold {
            continue;
        }

        let level = if percentage >= 100.0 {
            AlertLevel::Danger
        } else {
            AlertLevel::Warning
        };

        alerts.push(BudgetAlertEntry {
            category_name: category.name.clone(),
            icon: category.icon.clone(),
            spent,
            budget: category.monthly_budget,
            percentage: round_to_one_decimal(percentage),
            level,
        });
    }

    alerts
}

/// The six months shown in the spending trend, oldest first and ending with
/// the month containing `today`.
///
/// Earlier months are found by stepping back 30 days at a time from the first
/// of the current month, so around month boundaries a step can land in the
/// same month twice. This matches the label users have come to expect from
/// the trend chart.
pub fn trend_months(today: Date) -> Vec<Date> {
    let first_of_month = today.replace_day(1).unwrap_or(today);

    (0..6)
        .rev()
        .map(|months_back| first_of_month - Duration::days(30 * months_back))
        .collect()
}

/// The three-letter label for a month, e.g. "Aug".
pub fn month_label(date: Date) -> &'static str {
    match date.month() {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

fn round_to_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod monthly_summary_tests {
    use super::MonthlySummary;

    #[test]
    fn savings_rate_is_zero_without_income() {
        let summary = MonthlySummary::new(0.0, 250.0);

        assert_eq!(summary.balance, -250.0);
        assert_eq!(summary.savings_rate, 0.0);
    }

    #[test]
    fn savings_rate_is_rounded_to_one_decimal() {
        let summary = MonthlySummary::new(3000.0, 1000.0);
        assert_eq!(summary.savings_rate, 66.7);

        let summary = MonthlySummary::new(1000.0, 250.0);
        assert_eq!(summary.savings_rate, 75.0);
    }

    #[test]
    fn savings_rate_can_be_negative() {
        let summary = MonthlySummary::new(100.0, 150.0);

        assert_eq!(summary.savings_rate, -50.0);
    }
}

#[cfg(test)]
mod build_alerts_tests {
    use std::collections::HashMap;

    use time::OffsetDateTime;

    use crate::{
        category::{Category, CategoryType},
        user::UserId,
    };

    use super::{AlertLevel, build_alerts};

    fn expense_category(id: i64, name: &str, monthly_budget: f64) -> Category {
        Category {
            id,
            user_id: UserId::new(1),
            name: name.to_owned(),
            category_type: CategoryType::Expense,
            icon: "📦".to_owned(),
            monthly_budget,
            is_default: false,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn warning_at_default_threshold() {
        let categories = vec![expense_category(1, "Food", 100.0)];
        let spent = HashMap::from([(1, 85.0)]);

        let alerts = build_alerts(&categories, &spent, &HashMap::new());

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].category_name, "Food");
        assert_eq!(alerts[0].percentage, 85.0);
        assert_eq!(alerts[0].level, AlertLevel::Warning);
    }

    #[test]
    fn danger_at_or_past_full_budget() {
        let categories = vec![expense_category(1, "Food", 100.0)];
        let spent = HashMap::from([(1, 120.0)]);

        let alerts = build_alerts(&categories, &spent, &HashMap::new());

        assert_eq!(alerts[0].level, AlertLevel::Danger);
        assert_eq!(alerts[0].percentage, 120.0);
    }

    #[test]
    fn no_alert_below_threshold() {
        let categories = vec![expense_category(1, "Food", 100.0)];
        let spent = HashMap::from([(1, 79.9)]);

        let alerts = build_alerts(&categories, &spent, &HashMap::new());

        assert!(alerts.is_empty());
    }

    #[test]
    fn configured_threshold_overrides_default() {
        let categories = vec![expense_category(1, "Food", 100.0)];
        let spent = HashMap::from([(1, 60.0)]);
        let thresholds = HashMap::from([(1, 50.0)]);

        let alerts = build_alerts(&categories, &spent, &thresholds);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Warning);
    }

    #[test]
    fn zero_budget_categories_are_skipped() {
        let categories = vec![expense_category(1, "Food", 0.0)];
        let spent = HashMap::from([(1, 500.0)]);

        let alerts = build_alerts(&categories, &spent, &HashMap::new());

        assert!(alerts.is_empty());
    }

    #[test]
    fn income_categories_are_skipped() {
        let mut category = expense_category(1, "Salary", 100.0);
        category.category_type = CategoryType::Income;
        let spent = HashMap::from([(1, 500.0)]);

        let alerts = build_alerts(&[category], &spent, &HashMap::new());

        assert!(alerts.is_empty());
    }
}

#[cfg(test)]
mod trend_months_tests {
    use time::macros::date;

    use super::{month_label, trend_months};

    #[test]
    fn six_months_ending_with_current() {
        let months = trend_months(date!(2026 - 08 - 27));

        assert_eq!(months.len(), 6);
        assert_eq!(*months.last().unwrap(), date!(2026 - 08 - 01));
        assert!(months.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn labels_are_three_letters() {
        let months = trend_months(date!(2026 - 08 - 27));
        let labels: Vec<_> = months.iter().map(|month| month_label(*month)).collect();

        assert_eq!(labels.last(), Some(&"Aug"));
        assert!(labels.iter().all(|label| label.len() == 3));
    }
}
