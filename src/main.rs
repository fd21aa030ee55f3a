fn main() {
    if let Err(e) = vendorai_lib::run() {
        eprintln!("vendorai: {:#}", e);
        std::process::exit(1);
    }
}
