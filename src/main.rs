fn main() {
    if let Err(err) = releve_export::run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}
