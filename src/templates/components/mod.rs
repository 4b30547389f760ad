use crate::domain::metrics::{BudgetVariance, RenovationPremium};
use crate::domain::status::TemporalStatus;
use maud::{html, Markup};

pub mod error;

pub use error::html_error_response;

/// Titled panel; the heading doubles as the section anchor.
pub fn card(title: &str, body: Markup) -> Markup {
    let anchor = title.to_lowercase().replace(' ', "-");
    html! {
        section class="card" id=(format!("card-{anchor}")) {
            header class="card-header" { h2 { (title) } }
            div class="card-body" { (body) }
        }
    }
}

pub fn money(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as i64;
    let dollars = (cents / 100).to_string();

    let mut grouped = String::new();
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{:02}", cents % 100)
}

pub fn percent(value: f64) -> String {
    format!("{value:.1}%")
}

pub fn status_badge(status: TemporalStatus) -> Markup {
    let class = match status {
        TemporalStatus::NotStarted => "badge badge-idle",
        TemporalStatus::InProgress => "badge badge-active",
        TemporalStatus::Completed => "badge badge-done",
        TemporalStatus::Unknown => "badge badge-unknown",
    };
    html! { span class=(class) { (status.label()) } }
}

pub fn premium_cell(premium: RenovationPremium) -> Markup {
    html! {
        td {
            (money(premium.dollar_amount))
            @if let Some(pct) = premium.percentage {
                " (" (percent(pct)) ")"
            } @else {
                " (n/a)"
            }
        }
    }
}

/// Over budget renders with the warning class.
pub fn variance_cell(variance: BudgetVariance) -> Markup {
    let class = if variance.is_over_budget() {
        "over-budget"
    } else {
        "under-budget"
    };
    html! {
        td class=(class) {
            (money(variance.dollar_amount)) " (" (percent(variance.percentage)) ")"
        }
    }
}
