use contract_cli::{main_entry, EXIT_FATAL};

fn main() {
    let code = match main_entry() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("contract-gate: {err:#}");
            EXIT_FATAL
        }
    };
    std::process::exit(code);
}
