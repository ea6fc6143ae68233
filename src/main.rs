fn main() {
    if let Err(err) = met_etl::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
