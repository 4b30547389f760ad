pub mod export_xlsx;

pub use export_xlsx::build_budget_workbook;
