// templates/pages/job.rs

use crate::domain::kanban::Board;
use crate::domain::views::JobView;
use crate::templates::components::{money, percent, premium_cell, status_badge, variance_cell};
use crate::templates::{card, desktop_layout};
use maud::{html, Markup};

pub fn job_page(view: &JobView, board: &Board) -> Markup {
    desktop_layout(
        view.property_ref,
        html! {
            h1 { (view.property_ref) " " (status_badge(view.temporal_status)) }
            p {
                (view.start_date) " → " (view.end_date)
                @if let Some(days) = view.days_to_complete {
                    " (" (days) " days)"
                }
            }

            (card("Budget", summary(view)))
            (card("Units", units_table(view)))
            (card("Board", board_grid(board, view)))

            p { a href=(format!("/jobs/{}/budget.xlsx", view.id)) { "Download budget (XLSX)" } }
        },
    )
}

fn summary(view: &JobView) -> Markup {
    let s = &view.summary;
    html! {
        dl class="summary" {
            dt { "Total bid" } dd { (money(s.total_bid)) }
            dt { "Total budget" } dd { (money(s.total_budget)) }
            dt { "Total invoiced" } dd { (money(s.total_invoiced)) }
            dt { "Variance" }
            dd class=(if s.variance.is_over_budget() { "over-budget" } else { "under-budget" }) {
                (money(s.variance.dollar_amount)) " (" (percent(s.variance.percentage)) ")"
            }
            dt { "Average complete" } dd { (percent(s.average_percent_complete)) }
        }
    }
}

fn units_table(view: &JobView) -> Markup {
    html! {
        table id="units" {
            thead {
                tr {
                    th { "Unit" }
                    th { "Floor plan" }
                    th { "Status" }
                    th { "Budget" }
                    th { "Invoiced" }
                    th { "Variance" }
                    th { "Premium" }
                    th { "Complete" }
                }
            }
            tbody {
                @for unit in &view.units {
                    tr {
                        td { (unit.unit_number) }
                        td { (unit.floor_plan.unwrap_or("")) }
                        td { (unit.status.label()) }
                        td { (money(unit.total_budget)) }
                        td { (money(unit.total_invoiced)) }
                        (variance_cell(unit.variance))
                        (premium_cell(unit.premium))
                        td { (percent(unit.percent_complete)) }
                    }
                }
            }
        }
    }
}

fn board_grid(board: &Board, view: &JobView) -> Markup {
    let task_name = |id: &str| {
        view.units
            .iter()
            .flat_map(|u| u.tasks.iter())
            .find(|t| t.task.id == id)
            .map(|t| t.task.name.clone())
            .unwrap_or_default()
    };

    html! {
        div class="kanban" data-revision=(board.revision) {
            @for lane in &board.lanes {
                div class="kanban-lane" {
                    h4 { "Unit " (lane.unit_number) " · " (board.lane_task_count(&lane.unit_id)) " tasks" }
                    @for cell in &lane.cells {
                        div class="kanban-cell" id=(cell.cell_id) {
                            h5 { (cell.status.label()) " (" (cell.task_ids.len()) ")" }
                            ul {
                                @for task_id in &cell.task_ids {
                                    li draggable="true" data-task=(task_id) { (task_name(task_id)) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
