use std::fs::File;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use ibdecode::page::fil::PageType;
use ibdecode::page::index::IndexPage;
use ibdecode::reader::{PageReader, PhysicalPageSize, ReaderConfig};
use ibdecode::record::CompactDecoder;
use ibdecode::schema::parser::table_def_from_sql;
use ibdecode::schema::TableDef;

#[derive(Parser)]
#[command(name = "ibdecode", about = "Inspect InnoDB tablespace pages and records")]
struct Args {
    /// Path to the .ibd tablespace file
    file: PathBuf,

    /// Page number to inspect
    page: u32,

    /// CREATE TABLE statement describing the clustered index
    #[arg(long)]
    sql: Option<String>,

    /// Read the CREATE TABLE statement from a file
    #[arg(long, conflicts_with = "sql")]
    sql_file: Option<PathBuf>,

    /// Decode and print the record stream (needs --sql or --sql-file)
    #[arg(long)]
    records: bool,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,

    /// Physical page size for compressed tablespaces
    #[arg(long)]
    page_size: Option<usize>,

    /// Fail on sub-logical pages instead of decompressing
    #[arg(long)]
    no_decompress: bool,

    /// Cap on record traversal per page
    #[arg(long, default_value_t = 1000)]
    max_records: usize,

    /// Include INFIMUM / SUPREMUM in the record stream
    #[arg(long)]
    with_system: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(&args.file)?;
    let config = ReaderConfig {
        max_records: args.max_records,
        skip_system_records: !args.with_system,
        physical_page_size: match args.page_size {
            Some(n) => PhysicalPageSize::Bytes(n),
            None => PhysicalPageSize::Auto,
        },
        enable_decompression: !args.no_decompress,
    };
    let mut reader = PageReader::with_config(file, config)?;

    let page = reader.read_page(args.page)?;
    if page.page_type() != PageType::Index {
        if args.json {
            println!("{}", serde_json::to_string_pretty(&page.fil)?);
        } else {
            println!("page {}: {:?}", page.page_no, page.fil);
        }
        return Ok(());
    }

    let index = IndexPage::parse(page)?;
    let summary = index.summary();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    if args.records {
        let table = load_schema(args)?;
        print_records(args, &index, &table)?;
    }
    Ok(())
}

fn load_schema(args: &Args) -> Result<TableDef, Box<dyn std::error::Error>> {
    let sql = match (&args.sql, &args.sql_file) {
        (Some(sql), _) => sql.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => return Err("--records needs --sql or --sql-file".into()),
    };
    Ok(table_def_from_sql(&sql)?)
}

fn print_summary(summary: &ibdecode::page::index::PageSummary) {
    println!("page {} (space {})", summary.page_no, summary.space_id);
    println!(
        "  index {:#x}, level {}, {}{}",
        summary.index_id,
        summary.page_level,
        if summary.is_leaf { "leaf" } else { "internal" },
        if summary.is_root { ", root" } else { "" },
    );
    println!(
        "  {} user records, {} heap records, {} directory slots",
        summary.num_user_recs, summary.num_heap_recs, summary.num_dir_slots
    );
    println!(
        "  used {} bytes, garbage {}, lsn {:#x}",
        summary.used_bytes, summary.garbage_space, summary.last_mod_lsn
    );
    match (summary.prev, summary.next) {
        (Some(p), Some(n)) => println!("  neighbors: prev {p}, next {n}"),
        (Some(p), None) => println!("  neighbors: prev {p}"),
        (None, Some(n)) => println!("  neighbors: next {n}"),
        (None, None) => {}
    }
}

fn print_records(
    args: &Args,
    index: &IndexPage,
    table: &TableDef,
) -> Result<(), Box<dyn std::error::Error>> {
    let decoder = CompactDecoder::new(table);
    for slot in index.walk(args.max_records, !args.with_system) {
        let slot = slot?; // structural errors abort the page
        match decoder.decode(index, slot.origin) {
            Ok(record) => {
                if args.json {
                    println!("{}", serde_json::to_string(&record)?);
                } else {
                    let fields: Vec<String> = record
                        .values
                        .iter()
                        .map(|(name, value)| format!("{name}={value}"))
                        .collect();
                    println!("  [{}] {}", record.header.heap_number, fields.join(", "));
                }
            }
            // Decode errors are per record; keep walking
            Err(err) => eprintln!("  record at {}: {err}", slot.origin),
        }
    }
    Ok(())
}
