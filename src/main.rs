fn main() {
    if let Err(err) = akar_tree::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
