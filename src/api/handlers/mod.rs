mod admin;
mod conversions;
mod records;

pub use admin::health;
pub use conversions::{convert_to_parquet, download_csv, view_parquet, view_raw};
pub use records::{
    delete_record, edit_form, list_records, update_record, upload_form, upload_record,
};
