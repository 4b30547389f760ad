// templates/pages/home.rs

use crate::domain::views::{BidView, JobListItem};
use crate::templates::components::{money, percent, status_badge};
use crate::templates::{card, desktop_layout};
use maud::{html, Markup};

pub struct HomeVm<'a> {
    pub property_name: Option<String>,
    pub bids: Vec<BidView<'a>>,
    pub jobs: Vec<JobListItem<'a>>,
}

pub fn home_page(vm: &HomeVm) -> Markup {
    desktop_layout(
        "Overview",
        html! {
            h1 {
                @match &vm.property_name {
                    Some(name) => { (name) }
                    None => { "No property onboarded yet" }
                }
            }

            (card("Bids", bids_table(&vm.bids)))
            (card("Jobs", jobs_table(&vm.jobs)))
        },
    )
}

fn bids_table(bids: &[BidView]) -> Markup {
    html! {
        @if bids.is_empty() {
            p class="empty" { "No bids yet." }
        } @else {
            table id="bids" {
                thead {
                    tr {
                        th { "Requester" }
                        th { "Property" }
                        th { "Window" }
                        th { "Scope" }
                        th { "Status" }
                        th { "Schedule" }
                    }
                }
                tbody {
                    @for view in bids {
                        tr {
                            td { (view.bid.requester_name) }
                            td { (view.bid.property_ref) }
                            td { (view.bid.start_date) " → " (view.bid.end_date) }
                            td { (view.bid.scope_type.as_str()) }
                            td { (view.bid.status.as_str()) }
                            td { (status_badge(view.temporal_status)) }
                        }
                    }
                }
            }
        }
    }
}

fn jobs_table(jobs: &[JobListItem]) -> Markup {
    html! {
        @if jobs.is_empty() {
            p class="empty" { "No accepted bids yet." }
        } @else {
            table id="jobs" {
                thead {
                    tr {
                        th { "Job" }
                        th { "Units" }
                        th { "Budget" }
                        th { "Invoiced" }
                        th { "Complete" }
                        th { "Schedule" }
                    }
                }
                tbody {
                    @for job in jobs {
                        tr {
                            td { a href=(format!("/jobs/{}", job.id)) { (job.property_ref) } }
                            td { (job.summary.unit_count) }
                            td { (money(job.summary.total_budget)) }
                            td { (money(job.summary.total_invoiced)) }
                            td { (percent(job.summary.average_percent_complete)) }
                            td { (status_badge(job.temporal_status)) }
                        }
                    }
                }
            }
        }
    }
}
