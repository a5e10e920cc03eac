pub mod csv_import;
pub mod tasks_json;

pub use csv_import::import_csv;
pub use tasks_json::load_tasks;
