fn main() {
    if let Err(err) = chart_labels::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
