pub mod report_writer;

pub use report_writer::{
    count_rows, format_percentage, percentage_rows, table_header, write_samples_csv,
    write_samples_file, OutputFormat, ReportSink, RoseReport, TableWriter,
};
