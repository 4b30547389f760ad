use crate::domain::views::JobView;
use crate::errors::ServerError;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

const UNIT_HEADERS: [&str; 12] = [
    "Unit",
    "Floor Plan",
    "Status",
    "Total Bid",
    "Total Budget",
    "Total Invoiced",
    "Variance $",
    "Variance %",
    "Pre Rent",
    "Post Rent",
    "Premium $",
    "Premium %",
];

const TASK_HEADERS: [&str; 10] = [
    "Unit",
    "Job #",
    "Task",
    "Status",
    "Contractor",
    "Start",
    "End",
    "Budget",
    "Bid",
    "Invoiced",
];

fn xlsx_err(what: &str) -> impl Fn(rust_xlsxwriter::XlsxError) -> ServerError + '_ {
    move |e| ServerError::XlsxError(format!("Failed to write {what}: {e}"))
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str], bold: &Format) -> Result<(), ServerError> {
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, bold)
            .map_err(xlsx_err("header"))?;
    }
    Ok(())
}

/// Two sheets: one row per unit with its variance and premium, one row per task.
pub fn build_budget_workbook(view: &JobView) -> Result<Vec<u8>, ServerError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let units = workbook.add_worksheet();
    units.set_name("Units").map_err(xlsx_err("sheet name"))?;
    write_headers(units, &UNIT_HEADERS, &bold)?;

    for (i, unit) in view.units.iter().enumerate() {
        let r = (i + 1) as u32;

        units
            .write_string(r, 0, unit.unit_number)
            .map_err(xlsx_err("unit number"))?;
        units
            .write_string(r, 1, unit.floor_plan.unwrap_or(""))
            .map_err(xlsx_err("floor plan"))?;
        units
            .write_string(r, 2, unit.status.label())
            .map_err(xlsx_err("status"))?;

        let numbers = [
            unit.total_bid,
            unit.total_budget,
            unit.total_invoiced,
            unit.variance.dollar_amount,
            unit.variance.percentage,
            unit.pre_rent,
            unit.post_rent,
            unit.premium.dollar_amount,
        ];
        for (offset, value) in numbers.into_iter().enumerate() {
            units
                .write_number(r, 3 + offset as u16, value)
                .map_err(xlsx_err("amount"))?;
        }

        // No premium percentage without a pre-renovation rent.
        let written = match unit.premium.percentage {
            Some(pct) => units.write_number(r, 11, pct).map(|_| ()),
            None => units.write_string(r, 11, "n/a").map(|_| ()),
        };
        written.map_err(xlsx_err("premium"))?;
    }

    let tasks = workbook.add_worksheet();
    tasks.set_name("Tasks").map_err(xlsx_err("sheet name"))?;
    write_headers(tasks, &TASK_HEADERS, &bold)?;

    let mut r = 1u32;
    for unit in &view.units {
        for task in unit.tasks.iter().map(|t| t.task) {
            let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();

            tasks.write_string(r, 0, unit.unit_number).map_err(xlsx_err("unit"))?;
            tasks
                .write_number(r, 1, task.job_number as f64)
                .map_err(xlsx_err("job number"))?;
            tasks.write_string(r, 2, &task.name).map_err(xlsx_err("task"))?;
            tasks
                .write_string(r, 3, task.status.label())
                .map_err(xlsx_err("status"))?;
            tasks
                .write_string(r, 4, task.contractor_name.as_deref().unwrap_or(""))
                .map_err(xlsx_err("contractor"))?;
            tasks
                .write_string(r, 5, date(task.start_date))
                .map_err(xlsx_err("start"))?;
            tasks
                .write_string(r, 6, date(task.end_date))
                .map_err(xlsx_err("end"))?;
            tasks.write_number(r, 7, task.budget).map_err(xlsx_err("budget"))?;
            tasks.write_number(r, 8, task.bid_amount).map_err(xlsx_err("bid"))?;
            tasks
                .write_number(r, 9, task.invoiced_amount)
                .map_err(xlsx_err("invoiced"))?;
            r += 1;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| ServerError::XlsxError(format!("Failed to save workbook: {}", e)))
}
