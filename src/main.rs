fn main() {
    if let Err(e) = medsched_lib::run() {
        eprintln!("medsched: {e}");
        std::process::exit(1);
    }
}
