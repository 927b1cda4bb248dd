fn main() {
    if let Err(err) = nexly::cli::main() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
