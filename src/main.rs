fn main() {
    if let Err(err) = region_report::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
